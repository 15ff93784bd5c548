// staking/src/rewards.rs

//! Period-based reward accrual.
//!
//! Rewards are re-derived from the stake's checkpoint on every call, so a
//! partial period that has not been claimed is never lost: it stays between
//! the checkpoint and `now` until enough time passes to complete it.

use crate::config::StakingConfig;
use crate::stake::{Balance, Stake, Timestamp};
use shared::errors::Error;

/// What a stake has earned at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accrual {
    /// Whole reward periods between the checkpoint and `now`
    pub full_periods: u64,
    /// Reward owed for those periods
    pub reward: Balance,
    /// Checkpoint after paying `reward`; the sub-period remainder stays unaccounted
    pub next_checkpoint: Timestamp,
}

/// Pure reward math over a [`StakingConfig`].
#[derive(Debug, Clone, Copy)]
pub struct RewardCalculator<'a> {
    config: &'a StakingConfig,
}

impl<'a> RewardCalculator<'a> {
    pub fn new(config: &'a StakingConfig) -> Self {
        Self { config }
    }

    /// Reward for a single full period, truncated.
    pub fn reward_per_period(&self, amount: Balance) -> Result<Balance, Error> {
        amount
            .checked_mul(self.config.reward_rate_per_period)
            .ok_or(Error::Overflow)?
            .checked_div(self.config.reward_denominator)
            .ok_or(Error::InvalidConfig)
    }

    /// Number of complete periods between the checkpoint and `now`.
    pub fn full_periods(&self, stake: &Stake, now: Timestamp) -> Result<u64, Error> {
        let elapsed = now.saturating_sub(stake.checkpoint());
        elapsed
            .checked_div(self.config.reward_period)
            .ok_or(Error::InvalidConfig)
    }

    pub fn accrue(&self, stake: &Stake, now: Timestamp) -> Result<Accrual, Error> {
        let full_periods = self.full_periods(stake, now)?;
        let reward = self
            .reward_per_period(stake.amount)?
            .checked_mul(Balance::from(full_periods))
            .ok_or(Error::Overflow)?;
        let next_checkpoint = full_periods
            .checked_mul(self.config.reward_period)
            .and_then(|advance| stake.checkpoint().checked_add(advance))
            .ok_or(Error::Overflow)?;

        Ok(Accrual {
            full_periods,
            reward,
            next_checkpoint,
        })
    }

    /// Unclaimed reward of `stake` at `now`; zero when there is no stake.
    pub fn pending_rewards(&self, stake: Option<&Stake>, now: Timestamp) -> Result<Balance, Error> {
        match stake {
            Some(stake) => Ok(self.accrue(stake, now)?.reward),
            None => Ok(0),
        }
    }
}
