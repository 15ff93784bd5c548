// staking/src/operations.rs

//! Stake / claim / withdraw transitions.
//!
//! Each operation checks every precondition and computes every new value
//! before its first write, so a failed call leaves both the registry and the
//! ledger exactly as they were.

use crate::config::StakingConfig;
use crate::ledger::TokenLedger;
use crate::registry::StakeRegistry;
use crate::rewards::RewardCalculator;
use crate::stake::{Balance, Stake, Timestamp};
use ink::primitives::AccountId;
use shared::errors::Error;

/// Outcome of a successful claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    /// Reward minted to the account, possibly zero
    pub reward: Balance,
    /// Full periods settled; zero means nothing was written
    pub periods: u64,
    /// Checkpoint after the claim
    pub checkpoint: Timestamp,
}

/// Outcome of a successful withdraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Withdrawal {
    pub principal: Balance,
    pub reward: Balance,
}

/// The staking state machine over an injected registry and token ledger.
pub struct StakingLedger<'a, R, L> {
    config: &'a StakingConfig,
    registry: &'a mut R,
    ledger: &'a mut L,
}

impl<'a, R: StakeRegistry, L: TokenLedger> StakingLedger<'a, R, L> {
    pub fn new(config: &'a StakingConfig, registry: &'a mut R, ledger: &'a mut L) -> Self {
        Self {
            config,
            registry,
            ledger,
        }
    }

    fn calculator(&self) -> RewardCalculator<'a> {
        RewardCalculator::new(self.config)
    }

    /// Locks `amount` of the account's tokens and opens its stake.
    ///
    /// Rejects an amount whose per-period reward does not fit in a `Balance`,
    /// since such a stake could never be claimed or withdrawn.
    pub fn stake(&mut self, account: AccountId, amount: Balance, now: Timestamp) -> Result<Stake, Error> {
        if amount == 0 {
            return Err(Error::AmountZero);
        }
        if self.registry.contains(account) {
            return Err(Error::AlreadyStaked);
        }
        if self.ledger.balance_of(account) < amount {
            return Err(Error::InsufficientBalance);
        }
        self.calculator().reward_per_period(amount)?;

        let stake = Stake::new(amount, now);
        self.ledger.lock(account, amount)?;
        self.registry.set(account, &stake);
        Ok(stake)
    }

    /// Pays out every full period since the checkpoint.
    ///
    /// The checkpoint moves forward by whole periods only, never to `now`, so
    /// the unfinished part of the current period carries over to the next claim.
    pub fn claim_rewards(&mut self, account: AccountId, now: Timestamp) -> Result<Claim, Error> {
        let mut stake = self.registry.get(account).ok_or(Error::NoStake)?;
        if now.saturating_sub(stake.checkpoint()) < self.config.claim_rewards_delay {
            return Err(Error::ClaimTooEarly);
        }

        let accrual = self.calculator().accrue(&stake, now)?;
        if accrual.full_periods > 0 {
            let claimed_rewards = stake
                .claimed_rewards
                .checked_add(accrual.reward)
                .ok_or(Error::Overflow)?;
            self.ledger.release(account, 0, accrual.reward)?;
            stake.last_reward_timestamp = accrual.next_checkpoint;
            stake.claimed_rewards = claimed_rewards;
            self.registry.set(account, &stake);
        }

        Ok(Claim {
            reward: accrual.reward,
            periods: accrual.full_periods,
            checkpoint: stake.checkpoint(),
        })
    }

    /// Closes the stake, paying principal plus everything accrued.
    ///
    /// Not subject to the claim delay.
    pub fn withdraw(&mut self, account: AccountId, now: Timestamp) -> Result<Withdrawal, Error> {
        let stake = self.registry.get(account).ok_or(Error::NoStake)?;
        if now.saturating_sub(stake.creation_timestamp) < self.config.withdraw_delay {
            return Err(Error::LockNotExpired);
        }

        let reward = self.calculator().accrue(&stake, now)?.reward;
        self.ledger.release(account, stake.amount, reward)?;
        self.registry.remove(account);

        Ok(Withdrawal {
            principal: stake.amount,
            reward,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    const HOUR: Timestamp = 3_600;
    const DAY: Timestamp = 24 * HOUR;
    const START: Timestamp = 1_700_000_000;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct MemoryRegistry(BTreeMap<AccountId, Stake>);

    impl StakeRegistry for MemoryRegistry {
        fn get(&self, account: AccountId) -> Option<Stake> {
            self.0.get(&account).copied()
        }

        fn set(&mut self, account: AccountId, stake: &Stake) {
            self.0.insert(account, *stake);
        }

        fn remove(&mut self, account: AccountId) {
            self.0.remove(&account);
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct MemoryLedger {
        balances: BTreeMap<AccountId, Balance>,
        pool: Balance,
        supply: Balance,
    }

    impl MemoryLedger {
        fn funded(account: AccountId, amount: Balance) -> Self {
            let mut ledger = Self::default();
            ledger.balances.insert(account, amount);
            ledger.supply = amount;
            ledger
        }

        fn holdings(&self) -> Balance {
            self.balances.values().sum::<Balance>() + self.pool
        }
    }

    impl TokenLedger for MemoryLedger {
        fn balance_of(&self, account: AccountId) -> Balance {
            self.balances.get(&account).copied().unwrap_or(0)
        }

        fn transfer(&mut self, from: AccountId, to: AccountId, amount: Balance) -> Result<(), Error> {
            let from_balance = self
                .balance_of(from)
                .checked_sub(amount)
                .ok_or(Error::InsufficientBalance)?;
            self.balances.insert(from, from_balance);
            *self.balances.entry(to).or_default() += amount;
            Ok(())
        }

        fn lock(&mut self, from: AccountId, amount: Balance) -> Result<(), Error> {
            let from_balance = self
                .balance_of(from)
                .checked_sub(amount)
                .ok_or(Error::InsufficientBalance)?;
            self.balances.insert(from, from_balance);
            self.pool += amount;
            Ok(())
        }

        fn release(&mut self, to: AccountId, principal: Balance, reward: Balance) -> Result<(), Error> {
            self.pool = self
                .pool
                .checked_sub(principal)
                .ok_or(Error::InsufficientPool)?;
            self.supply += reward;
            *self.balances.entry(to).or_default() += principal + reward;
            Ok(())
        }
    }

    fn alice() -> AccountId {
        AccountId::from([0x01; 32])
    }

    fn bob() -> AccountId {
        AccountId::from([0x02; 32])
    }

    struct Fixture {
        config: StakingConfig,
        registry: MemoryRegistry,
        ledger: MemoryLedger,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_config(StakingConfig::default())
        }

        fn with_config(config: StakingConfig) -> Self {
            Self {
                config,
                registry: MemoryRegistry::default(),
                ledger: MemoryLedger::funded(alice(), 1_000_000),
            }
        }

        fn staking(&mut self) -> StakingLedger<'_, MemoryRegistry, MemoryLedger> {
            StakingLedger::new(&self.config, &mut self.registry, &mut self.ledger)
        }

        fn snapshot(&self) -> (MemoryRegistry, MemoryLedger) {
            (self.registry.clone(), self.ledger.clone())
        }

        fn pending(&self, account: AccountId, now: Timestamp) -> Result<Balance, Error> {
            let stake = self.registry.get(account);
            RewardCalculator::new(&self.config).pending_rewards(stake.as_ref(), now)
        }
    }

    #[test]
    fn stake_locks_funds_without_rewards() {
        let mut fx = Fixture::new();
        let stake = fx.staking().stake(alice(), 10_000, START).unwrap();

        assert_eq!(stake, Stake::new(10_000, START));
        assert_eq!(fx.ledger.balance_of(alice()), 990_000);
        assert_eq!(fx.ledger.pool, 10_000);
        assert_eq!(fx.registry.get(alice()), Some(stake));
        assert_eq!(fx.pending(alice(), START), Ok(0));
    }

    #[test]
    fn stake_preconditions_are_checked_in_order() {
        let mut fx = Fixture::new();
        assert_eq!(fx.staking().stake(alice(), 0, START), Err(Error::AmountZero));
        assert_eq!(
            fx.staking().stake(alice(), 1_000_001, START),
            Err(Error::InsufficientBalance)
        );
        assert_eq!(
            fx.staking().stake(bob(), 1, START),
            Err(Error::InsufficientBalance)
        );

        fx.staking().stake(alice(), 10, START).unwrap();
        assert_eq!(
            fx.staking().stake(alice(), 10, START + 1),
            Err(Error::AlreadyStaked)
        );
        // AlreadyStaked wins over a balance shortfall
        assert_eq!(
            fx.staking().stake(alice(), 10_000_000, START + 1),
            Err(Error::AlreadyStaked)
        );
    }

    #[test]
    fn claim_and_withdraw_need_a_stake() {
        let mut fx = Fixture::new();
        assert_eq!(fx.staking().claim_rewards(alice(), START), Err(Error::NoStake));
        assert_eq!(fx.staking().withdraw(alice(), START), Err(Error::NoStake));
        assert_eq!(fx.pending(alice(), START), Ok(0));
    }

    #[test]
    fn claims_carry_partial_periods_over() {
        let mut fx = Fixture::new();
        fx.staking().stake(alice(), 10_000, START).unwrap();
        let one_period = 1_000;

        let first = fx.staking().claim_rewards(alice(), START + HOUR).unwrap();
        assert_eq!(first.reward, one_period);
        assert_eq!(first.checkpoint, START + HOUR);

        let second = fx
            .staking()
            .claim_rewards(alice(), START + HOUR + HOUR + HOUR / 2)
            .unwrap();
        assert_eq!(second.reward, one_period);
        assert_eq!(second.checkpoint, START + 2 * HOUR);

        let third = fx
            .staking()
            .claim_rewards(alice(), START + 3 * HOUR + HOUR / 2)
            .unwrap();
        assert_eq!(third.reward, one_period);
        assert_eq!(third.checkpoint, START + 3 * HOUR);

        let stake = fx.registry.get(alice()).unwrap();
        assert_eq!(stake.claimed_rewards, 3 * one_period);
        assert_eq!(stake.amount, 10_000);
        assert_eq!(stake.creation_timestamp, START);
        assert_eq!(fx.ledger.balance_of(alice()), 990_000 + 3 * one_period);
    }

    #[test]
    fn claim_before_delay_fails_without_changes() {
        let mut fx = Fixture::new();
        fx.staking().stake(alice(), 10_000, START).unwrap();
        let before = fx.snapshot();

        assert_eq!(
            fx.staking().claim_rewards(alice(), START + HOUR - 1),
            Err(Error::ClaimTooEarly)
        );
        assert_eq!(fx.snapshot(), before);

        fx.staking().claim_rewards(alice(), START + HOUR).unwrap();
        assert_eq!(
            fx.staking().claim_rewards(alice(), START + 2 * HOUR - 1),
            Err(Error::ClaimTooEarly)
        );
    }

    #[test]
    fn zero_reward_claim_changes_nothing() {
        // Claim delay shorter than a period lets a claim through with nothing accrued
        let mut fx = Fixture::with_config(StakingConfig {
            claim_rewards_delay: 60,
            ..StakingConfig::default()
        });
        let stake = fx.staking().stake(alice(), 10_000, START).unwrap();
        let before = fx.snapshot();

        let claim = fx.staking().claim_rewards(alice(), START + 60).unwrap();
        assert_eq!(claim.reward, 0);
        assert_eq!(claim.periods, 0);
        assert_eq!(claim.checkpoint, START);
        assert_eq!(fx.snapshot(), before);
        assert_eq!(fx.registry.get(alice()), Some(stake));
    }

    #[test]
    fn tiny_stake_still_consumes_periods() {
        let mut fx = Fixture::new();
        // 5 * 1000 / 10000 truncates to zero per period
        fx.staking().stake(alice(), 5, START).unwrap();

        let claim = fx.staking().claim_rewards(alice(), START + 2 * HOUR).unwrap();
        assert_eq!(claim.reward, 0);
        assert_eq!(claim.periods, 2);
        assert_eq!(claim.checkpoint, START + 2 * HOUR);
        assert_eq!(fx.registry.get(alice()).unwrap().claimed_rewards, 0);
    }

    #[test]
    fn pending_resets_to_remainder_after_claim() {
        let mut fx = Fixture::new();
        fx.staking().stake(alice(), 10_000, START).unwrap();

        let at = START + 2 * HOUR + HOUR / 2;
        assert_eq!(fx.pending(alice(), at), Ok(2_000));
        fx.staking().claim_rewards(alice(), at).unwrap();
        assert_eq!(fx.pending(alice(), at), Ok(0));
        // the half period left over completes half an hour later
        assert_eq!(fx.pending(alice(), START + 3 * HOUR), Ok(1_000));
    }

    #[test]
    fn withdraw_lock_boundary() {
        let mut fx = Fixture::new();
        fx.staking().stake(alice(), 10_000, START).unwrap();
        let before = fx.snapshot();

        assert_eq!(
            fx.staking().withdraw(alice(), START + DAY - 1),
            Err(Error::LockNotExpired)
        );
        assert_eq!(fx.snapshot(), before);

        let withdrawal = fx.staking().withdraw(alice(), START + DAY).unwrap();
        assert_eq!(withdrawal.principal, 10_000);
        assert_eq!(withdrawal.reward, 24 * 1_000);
        assert_eq!(fx.registry.get(alice()), None);
        assert_eq!(fx.ledger.pool, 0);
        assert_eq!(fx.ledger.balance_of(alice()), 1_000_000 + 24_000);
    }

    #[test]
    fn withdraw_ignores_claim_delay_and_pays_only_unclaimed() {
        let mut fx = Fixture::new();
        fx.staking().stake(alice(), 10_000, START).unwrap();
        fx.staking().claim_rewards(alice(), START + DAY - HOUR / 2).unwrap();

        // 23 periods already claimed, claim delay has not passed again
        let withdrawal = fx.staking().withdraw(alice(), START + DAY).unwrap();
        assert_eq!(withdrawal.reward, 1_000);
        assert_eq!(fx.ledger.balance_of(alice()), 1_000_000 + 24_000);
    }

    #[test]
    fn holdings_change_only_by_emitted_rewards() {
        let mut fx = Fixture::new();
        let initial = fx.ledger.holdings();
        let mut emitted = 0;

        fx.staking().stake(alice(), 50_000, START).unwrap();
        assert_eq!(fx.ledger.holdings(), initial);

        emitted += fx.staking().claim_rewards(alice(), START + 5 * HOUR).unwrap().reward;
        assert_eq!(fx.ledger.holdings(), initial + emitted);

        emitted += fx.staking().withdraw(alice(), START + DAY + 10).unwrap().reward;
        assert_eq!(fx.ledger.holdings(), initial + emitted);
        assert_eq!(fx.ledger.supply, fx.ledger.holdings());
        assert_eq!(emitted, 24 * 5_000);
    }

    #[test]
    fn restake_after_withdraw_starts_fresh() {
        let mut fx = Fixture::new();
        fx.staking().stake(alice(), 10_000, START).unwrap();
        fx.staking().claim_rewards(alice(), START + HOUR).unwrap();
        fx.staking().withdraw(alice(), START + DAY).unwrap();

        let later = START + DAY;
        let stake = fx.staking().stake(alice(), 20_000, later).unwrap();
        assert_eq!(stake.creation_timestamp, later);
        assert_eq!(stake.last_reward_timestamp, 0);
        assert_eq!(stake.claimed_rewards, 0);
        assert_eq!(fx.pending(alice(), later), Ok(0));
    }

    #[test]
    fn accounts_do_not_share_stakes() {
        let mut fx = Fixture::new();
        fx.ledger.transfer(alice(), bob(), 100_000).unwrap();

        fx.staking().stake(alice(), 10_000, START).unwrap();
        fx.staking().stake(bob(), 20_000, START + HOUR).unwrap();
        fx.staking().claim_rewards(alice(), START + 2 * HOUR).unwrap();

        let bob_stake = fx.registry.get(bob()).unwrap();
        assert_eq!(bob_stake, Stake::new(20_000, START + HOUR));
        assert_eq!(fx.pending(bob(), START + 2 * HOUR), Ok(2_000));
        assert_eq!(fx.ledger.pool, 30_000);
    }

    #[test]
    fn stake_rejects_amount_whose_reward_overflows() {
        let mut fx = Fixture::new();
        let amount = Balance::MAX / 1_000 + 1;
        fx.ledger = MemoryLedger::funded(alice(), Balance::MAX / 2);
        let before = fx.snapshot();

        assert_eq!(fx.staking().stake(alice(), amount, START), Err(Error::Overflow));
        assert_eq!(fx.snapshot(), before);

        // the largest accepted amount can still be withdrawn after a day
        fx.staking().stake(alice(), Balance::MAX / 1_000, START).unwrap();
        let withdrawal = fx.staking().withdraw(alice(), START + DAY).unwrap();
        assert_eq!(withdrawal.principal, Balance::MAX / 1_000);
        assert_eq!(fx.registry.get(alice()), None);
    }

    #[test]
    fn overflowing_claim_leaves_state_untouched() {
        let mut fx = Fixture::with_config(StakingConfig {
            reward_rate_per_period: Balance::MAX,
            ..StakingConfig::default()
        });
        fx.staking().stake(alice(), 1, START).unwrap();
        let before = fx.snapshot();

        // MAX / 10000 per period stops fitting after 10_000 periods
        let late = START + 10_001 * HOUR;
        assert_eq!(fx.staking().claim_rewards(alice(), late), Err(Error::Overflow));
        assert_eq!(fx.staking().withdraw(alice(), late), Err(Error::Overflow));
        assert_eq!(fx.snapshot(), before);
    }
}
