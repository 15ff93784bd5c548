// staking/src/stake.rs

use scale::{Decode, Encode};

/// Token units.
pub type Balance = u128;
/// Whole seconds.
pub type Timestamp = u64;

/// An account's locked deposit plus its reward bookkeeping.
///
/// A stake exists only while `amount > 0`; withdrawing removes it from the
/// registry instead of zeroing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct Stake {
    /// Tokens currently locked
    pub amount: Balance,
    /// When the stake was created, never changes afterwards
    pub creation_timestamp: Timestamp,
    /// Reward checkpoint, 0 until the first claim that consumed a period
    pub last_reward_timestamp: Timestamp,
    /// Rewards paid out over the lifetime of this stake
    pub claimed_rewards: Balance,
}

impl Stake {
    pub fn new(amount: Balance, now: Timestamp) -> Self {
        Self {
            amount,
            creation_timestamp: now,
            last_reward_timestamp: 0,
            claimed_rewards: 0,
        }
    }

    /// Timestamp up to which rewards are accounted.
    pub fn checkpoint(&self) -> Timestamp {
        if self.last_reward_timestamp == 0 {
            self.creation_timestamp
        } else {
            self.last_reward_timestamp
        }
    }
}
