// staking/src/registry.rs

use crate::stake::Stake;
use ink::primitives::AccountId;
use ink::storage::traits::StorageKey;
use ink::storage::Mapping;

/// Per-account stake storage. At most one [`Stake`] per account.
pub trait StakeRegistry {
    fn get(&self, account: AccountId) -> Option<Stake>;

    fn set(&mut self, account: AccountId, stake: &Stake);

    fn remove(&mut self, account: AccountId);

    fn contains(&self, account: AccountId) -> bool {
        self.get(account).is_some()
    }
}

// The storage macro rewrites the key type of every `Mapping` field, so the
// impl has to cover all of them.
impl<KeyType: StorageKey> StakeRegistry for Mapping<AccountId, Stake, KeyType> {
    fn get(&self, account: AccountId) -> Option<Stake> {
        Mapping::get(self, account)
    }

    fn set(&mut self, account: AccountId, stake: &Stake) {
        self.insert(account, stake);
    }

    fn remove(&mut self, account: AccountId) {
        Mapping::remove(self, account);
    }

    fn contains(&self, account: AccountId) -> bool {
        Mapping::contains(self, account)
    }
}
