// staking/src/ledger.rs

use crate::stake::Balance;
use ink::primitives::AccountId;
use ink::storage::traits::StorageKey;
use ink::storage::Mapping;
use shared::errors::Error;

/// Fungible-token balances plus custody of the staking pool.
///
/// Every method either applies its whole effect or fails without touching
/// any balance.
pub trait TokenLedger {
    fn balance_of(&self, account: AccountId) -> Balance;

    fn transfer(&mut self, from: AccountId, to: AccountId, amount: Balance) -> Result<(), Error>;

    /// Moves `amount` from `from`'s balance into the pool.
    fn lock(&mut self, from: AccountId, amount: Balance) -> Result<(), Error>;

    /// Returns `principal` from the pool to `to` and mints `reward` on top.
    fn release(&mut self, to: AccountId, principal: Balance, reward: Balance) -> Result<(), Error>;
}

/// [`TokenLedger`] over the contract's own storage.
///
/// The pool is a counter, not an account, so `total_supply` always equals
/// the sum of all balances plus `total_staked`.
pub struct PoolLedger<'a, KeyType: StorageKey> {
    balances: &'a mut Mapping<AccountId, Balance, KeyType>,
    total_supply: &'a mut Balance,
    total_staked: &'a mut Balance,
}

impl<'a, KeyType: StorageKey> PoolLedger<'a, KeyType> {
    pub fn new(
        balances: &'a mut Mapping<AccountId, Balance, KeyType>,
        total_supply: &'a mut Balance,
        total_staked: &'a mut Balance,
    ) -> Self {
        Self {
            balances,
            total_supply,
            total_staked,
        }
    }
}

impl<KeyType: StorageKey> TokenLedger for PoolLedger<'_, KeyType> {
    fn balance_of(&self, account: AccountId) -> Balance {
        self.balances.get(account).unwrap_or(0)
    }

    fn transfer(&mut self, from: AccountId, to: AccountId, amount: Balance) -> Result<(), Error> {
        let from_balance = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(Error::InsufficientBalance)?;
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(Error::Overflow)?;

        self.balances.insert(from, &from_balance);
        self.balances.insert(to, &to_balance);
        Ok(())
    }

    fn lock(&mut self, from: AccountId, amount: Balance) -> Result<(), Error> {
        let from_balance = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(Error::InsufficientBalance)?;
        let total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(Error::Overflow)?;

        self.balances.insert(from, &from_balance);
        *self.total_staked = total_staked;
        Ok(())
    }

    fn release(&mut self, to: AccountId, principal: Balance, reward: Balance) -> Result<(), Error> {
        let total_staked = self
            .total_staked
            .checked_sub(principal)
            .ok_or(Error::InsufficientPool)?;
        let total_supply = self
            .total_supply
            .checked_add(reward)
            .ok_or(Error::Overflow)?;
        let to_balance = principal
            .checked_add(reward)
            .and_then(|payout| self.balance_of(to).checked_add(payout))
            .ok_or(Error::Overflow)?;

        *self.total_staked = total_staked;
        *self.total_supply = total_supply;
        self.balances.insert(to, &to_balance);
        Ok(())
    }
}
