//! Error taxonomy shared by every contract in the workspace.

use scale::{Decode, Encode};

/// Errors returned by the staking token.
///
/// The first six variants are precondition failures of the staking state
/// machine. Any of them aborts the call with no state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Error {
    /// Stake amount is zero.
    AmountZero,
    /// The caller already has an active stake.
    AlreadyStaked,
    /// The caller's balance does not cover the amount.
    InsufficientBalance,
    /// The caller has no active stake.
    NoStake,
    /// `claim_rewards_delay` has not elapsed since the last checkpoint.
    ClaimTooEarly,
    /// `withdraw_delay` has not elapsed since the stake was created.
    LockNotExpired,
    /// `transfer_from` exceeds the approved allowance.
    InsufficientAllowance,
    /// The pool cannot cover the principal being released.
    InsufficientPool,
    /// Checked arithmetic overflowed.
    Overflow,
    /// Reward period or denominator is zero.
    InvalidConfig,
    /// A guarded message was entered while another one was running.
    ReentrantCall,
}
