// staking/src/lib.rs

#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub mod config;
pub mod ledger;
pub mod operations;
pub mod registry;
pub mod rewards;
pub mod stake;

#[ink::contract]
mod staking_token {
    use crate::config::StakingConfig;
    use crate::ledger::{PoolLedger, TokenLedger};
    use crate::operations::{Claim, StakingLedger, Withdrawal};
    use crate::rewards::RewardCalculator;
    use crate::stake::Stake;
    use ink::prelude::string::String;
    use ink::storage::Mapping;
    use shared::errors::Error;
    use shared::non_reentrant;
    use shared::utils::reentrancy_guard::ReentrancyGuard;

    // Token metadata
    pub const TOKEN_NAME: &str = "MyTestCoin";
    pub const TOKEN_SYMBOL: &str = "MTC";
    pub const TOKEN_DECIMALS: u8 = 18;

    /// Block timestamps are in milliseconds, staking parameters in seconds
    pub const MILLIS_PER_SECOND: u64 = 1_000;

    // Events

    /// Event emitted when tokens move between accounts, are minted (`from` is
    /// `None`) or burned (`to` is `None`)
    #[ink(event)]
    pub struct Transfer {
        #[ink(topic)]
        pub from: Option<AccountId>,
        #[ink(topic)]
        pub to: Option<AccountId>,
        pub value: Balance,
    }

    /// Event emitted when an allowance is set
    #[ink(event)]
    pub struct Approval {
        #[ink(topic)]
        pub owner: AccountId,
        #[ink(topic)]
        pub spender: AccountId,
        pub value: Balance,
    }

    /// Event emitted when a stake is opened
    #[ink(event)]
    pub struct Staked {
        #[ink(topic)]
        pub account: AccountId,
        pub amount: Balance,
        pub timestamp: Timestamp,
    }

    /// Event emitted when rewards are claimed
    #[ink(event)]
    pub struct RewardsClaimed {
        #[ink(topic)]
        pub account: AccountId,
        pub amount: Balance,
        pub checkpoint: Timestamp,
    }

    /// Event emitted when a stake is closed
    #[ink(event)]
    pub struct Withdrawn {
        #[ink(topic)]
        pub account: AccountId,
        pub principal: Balance,
        pub reward: Balance,
    }

    /// Token with a built-in single-pool staking ledger.
    ///
    /// The contract is both the fungible token and the custodian of the
    /// staking pool: staked tokens leave the owner's balance and are counted
    /// in `total_staked`, rewards are minted on payout.
    #[ink(storage)]
    pub struct StakingToken {
        /// Balances per account
        balances: Mapping<AccountId, Balance>,
        /// Allowances per (owner, spender)
        allowances: Mapping<(AccountId, AccountId), Balance>,
        /// Tokens in existence, including the staked ones
        total_supply: Balance,
        /// Tokens locked in the pool
        total_staked: Balance,
        /// Stakes per account
        stakes: Mapping<AccountId, Stake>,
        /// Immutable staking parameters
        config: StakingConfig,
        /// Reentrancy guard
        reentrancy_guard: ReentrancyGuard,
    }

    impl StakingToken {
        /// Constructor with the default staking parameters; the caller
        /// receives `initial_supply`
        #[ink(constructor)]
        pub fn new(initial_supply: Balance) -> Self {
            Self::build(initial_supply, StakingConfig::default())
        }

        /// Constructor with custom staking parameters
        #[ink(constructor)]
        pub fn new_with_config(initial_supply: Balance, config: StakingConfig) -> Result<Self, Error> {
            config.validate()?;
            Ok(Self::build(initial_supply, config))
        }

        fn build(initial_supply: Balance, config: StakingConfig) -> Self {
            let caller = Self::env().caller();
            let mut balances = Mapping::default();
            balances.insert(caller, &initial_supply);

            Self::env().emit_event(Transfer {
                from: None,
                to: Some(caller),
                value: initial_supply,
            });

            Self {
                balances,
                allowances: Mapping::default(),
                total_supply: initial_supply,
                total_staked: 0,
                stakes: Mapping::default(),
                config,
                reentrancy_guard: ReentrancyGuard::new(),
            }
        }

        /// Current block time in whole seconds
        fn now(&self) -> Timestamp {
            self.env().block_timestamp() / MILLIS_PER_SECOND
        }

        // ===== TOKEN =====

        #[ink(message)]
        pub fn name(&self) -> String {
            String::from(TOKEN_NAME)
        }

        #[ink(message)]
        pub fn symbol(&self) -> String {
            String::from(TOKEN_SYMBOL)
        }

        #[ink(message)]
        pub fn decimals(&self) -> u8 {
            TOKEN_DECIMALS
        }

        #[ink(message)]
        pub fn total_supply(&self) -> Balance {
            self.total_supply
        }

        #[ink(message)]
        pub fn balance_of(&self, owner: AccountId) -> Balance {
            self.balances.get(owner).unwrap_or(0)
        }

        #[ink(message)]
        pub fn allowance(&self, owner: AccountId, spender: AccountId) -> Balance {
            self.allowances.get((owner, spender)).unwrap_or(0)
        }

        /// Transfer tokens from the caller to `to`
        #[ink(message)]
        pub fn transfer(&mut self, to: AccountId, value: Balance) -> Result<(), Error> {
            let from = self.env().caller();
            non_reentrant!(self, self.transfer_from_to(from, to, value))
        }

        /// Let `spender` move up to `value` of the caller's tokens
        #[ink(message)]
        pub fn approve(&mut self, spender: AccountId, value: Balance) -> Result<(), Error> {
            let owner = self.env().caller();
            self.allowances.insert((owner, spender), &value);
            self.env().emit_event(Approval {
                owner,
                spender,
                value,
            });
            Ok(())
        }

        /// Transfer tokens on behalf of `from` using the caller's allowance
        #[ink(message)]
        pub fn transfer_from(
            &mut self,
            from: AccountId,
            to: AccountId,
            value: Balance,
        ) -> Result<(), Error> {
            non_reentrant!(self, self.spend_allowance(from, to, value))
        }

        fn spend_allowance(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<(), Error> {
            let spender = self.env().caller();
            let remaining = self
                .allowance(from, spender)
                .checked_sub(value)
                .ok_or(Error::InsufficientAllowance)?;

            self.transfer_from_to(from, to, value)?;
            self.allowances.insert((from, spender), &remaining);
            Ok(())
        }

        fn transfer_from_to(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<(), Error> {
            PoolLedger::new(
                &mut self.balances,
                &mut self.total_supply,
                &mut self.total_staked,
            )
            .transfer(from, to, value)?;

            self.env().emit_event(Transfer {
                from: Some(from),
                to: Some(to),
                value,
            });
            Ok(())
        }

        // ===== STAKING =====

        /// Lock `amount` of the caller's tokens in the pool
        #[ink(message)]
        pub fn stake(&mut self, amount: Balance) -> Result<(), Error> {
            non_reentrant!(self, self.open_stake(amount))
        }

        /// Claim every full reward period accrued since the last checkpoint
        #[ink(message)]
        pub fn claim_rewards(&mut self) -> Result<(), Error> {
            non_reentrant!(self, self.pay_rewards())
        }

        /// Close the caller's stake, paying principal and accrued rewards
        #[ink(message)]
        pub fn withdraw(&mut self) -> Result<(), Error> {
            non_reentrant!(self, self.close_stake())
        }

        fn open_stake(&mut self, amount: Balance) -> Result<(), Error> {
            let caller = self.env().caller();
            let now = self.now();

            let mut ledger = PoolLedger::new(
                &mut self.balances,
                &mut self.total_supply,
                &mut self.total_staked,
            );
            let stake = StakingLedger::new(&self.config, &mut self.stakes, &mut ledger)
                .stake(caller, amount, now)?;

            self.env().emit_event(Staked {
                account: caller,
                amount: stake.amount,
                timestamp: stake.creation_timestamp,
            });
            Ok(())
        }

        fn pay_rewards(&mut self) -> Result<(), Error> {
            let caller = self.env().caller();
            let now = self.now();

            let mut ledger = PoolLedger::new(
                &mut self.balances,
                &mut self.total_supply,
                &mut self.total_staked,
            );
            let Claim {
                reward,
                periods,
                checkpoint,
            } = StakingLedger::new(&self.config, &mut self.stakes, &mut ledger)
                .claim_rewards(caller, now)?;

            // No full period yet: nothing was settled
            if periods == 0 {
                return Ok(());
            }
            if reward > 0 {
                self.env().emit_event(Transfer {
                    from: None,
                    to: Some(caller),
                    value: reward,
                });
            }
            self.env().emit_event(RewardsClaimed {
                account: caller,
                amount: reward,
                checkpoint,
            });
            Ok(())
        }

        fn close_stake(&mut self) -> Result<(), Error> {
            let caller = self.env().caller();
            let now = self.now();

            let mut ledger = PoolLedger::new(
                &mut self.balances,
                &mut self.total_supply,
                &mut self.total_staked,
            );
            let Withdrawal { principal, reward } =
                StakingLedger::new(&self.config, &mut self.stakes, &mut ledger)
                    .withdraw(caller, now)?;

            if reward > 0 {
                self.env().emit_event(Transfer {
                    from: None,
                    to: Some(caller),
                    value: reward,
                });
            }
            self.env().emit_event(Withdrawn {
                account: caller,
                principal,
                reward,
            });
            Ok(())
        }

        /// Unclaimed rewards of `account` at the current block time
        ///
        /// Saturates at `Balance::MAX` once the reward no longer fits, so the
        /// value never decreases while the stake is untouched.
        #[ink(message)]
        pub fn rewards(&self, account: AccountId) -> Balance {
            let stake = self.stakes.get(account);
            RewardCalculator::new(&self.config)
                .pending_rewards(stake.as_ref(), self.now())
                .unwrap_or(Balance::MAX)
        }

        /// View function to get account stake info
        #[ink(message)]
        pub fn stake_by_user(&self, account: AccountId) -> Option<Stake> {
            self.stakes.get(account)
        }

        /// Tokens locked in the pool
        #[ink(message)]
        pub fn total_staked(&self) -> Balance {
            self.total_staked
        }

        /// Earliest time (seconds) at which `account` may claim
        #[ink(message)]
        pub fn claimable_at(&self, account: AccountId) -> Option<Timestamp> {
            self.stakes.get(account).map(|stake| {
                stake
                    .checkpoint()
                    .saturating_add(self.config.claim_rewards_delay)
            })
        }

        /// Earliest time (seconds) at which `account` may withdraw
        #[ink(message)]
        pub fn withdrawable_at(&self, account: AccountId) -> Option<Timestamp> {
            self.stakes.get(account).map(|stake| {
                stake
                    .creation_timestamp
                    .saturating_add(self.config.withdraw_delay)
            })
        }

        // ===== CONFIGURATION =====

        #[ink(message)]
        pub fn config(&self) -> StakingConfig {
            self.config
        }

        #[ink(message)]
        pub fn withdraw_delay(&self) -> Timestamp {
            self.config.withdraw_delay
        }

        #[ink(message)]
        pub fn claim_rewards_delay(&self) -> Timestamp {
            self.config.claim_rewards_delay
        }

        #[ink(message)]
        pub fn reward_period(&self) -> Timestamp {
            self.config.reward_period
        }

        #[ink(message)]
        pub fn reward_rate_per_period(&self) -> Balance {
            self.config.reward_rate_per_period
        }

        #[ink(message)]
        pub fn reward_denominator(&self) -> Balance {
            self.config.reward_denominator
        }
    }

}
