// staking/src/config.rs

use crate::stake::{Balance, Timestamp};
use scale::{Decode, Encode};
use shared::errors::Error;

pub const DEFAULT_CLAIM_REWARDS_DELAY: Timestamp = 60 * 60; // 1 hour
pub const DEFAULT_WITHDRAW_DELAY: Timestamp = 24 * 60 * 60; // 1 day
pub const DEFAULT_REWARD_PERIOD: Timestamp = 60 * 60; // 1 hour
pub const DEFAULT_REWARD_RATE_PER_PERIOD: Balance = 1_000; // 10% with the default denominator
pub const DEFAULT_REWARD_DENOMINATOR: Balance = 10_000;

/// Staking parameters fixed at deployment. All durations are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct StakingConfig {
    /// Minimum time between the reward checkpoint and a successful claim
    pub claim_rewards_delay: Timestamp,
    /// Minimum time between stake creation and a successful withdraw
    pub withdraw_delay: Timestamp,
    /// Length of one reward period
    pub reward_period: Timestamp,
    /// Reward per period is `amount * reward_rate_per_period / reward_denominator`
    pub reward_rate_per_period: Balance,
    pub reward_denominator: Balance,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            claim_rewards_delay: DEFAULT_CLAIM_REWARDS_DELAY,
            withdraw_delay: DEFAULT_WITHDRAW_DELAY,
            reward_period: DEFAULT_REWARD_PERIOD,
            reward_rate_per_period: DEFAULT_REWARD_RATE_PER_PERIOD,
            reward_denominator: DEFAULT_REWARD_DENOMINATOR,
        }
    }
}

impl StakingConfig {
    /// Rejects parameters the reward math divides by.
    pub fn validate(&self) -> Result<(), Error> {
        if self.reward_period == 0 || self.reward_denominator == 0 {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }
}
