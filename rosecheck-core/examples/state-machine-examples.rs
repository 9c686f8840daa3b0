//! Real-world state machine testing examples.
//!
//! Each example runs a model-based property against a small system: actions
//! are generated from the current state, applied immediately, and a failing
//! run is shrunk by replaying shorter action sequences.

use rosecheck_core::combinator::{element_of, just, one_of, weighted_gen, Weighted};
use rosecheck_core::error::CheckError;
use rosecheck_core::gen::Gen;
use rosecheck_core::stateful::*;
use std::collections::{BTreeMap, HashMap};

/// Example 1: Bank account
///
/// Deposits and withdrawals against an account whose balance must never go
/// negative. The model tracks the expected balance.
pub mod bank {
    use super::*;

    #[derive(Debug, Clone, Default)]
    pub struct Account {
        pub balance: u64,
        pub history: Vec<i64>,
    }

    impl Account {
        pub fn deposit(&mut self, amount: u64) {
            self.balance += amount;
            self.history.push(amount as i64);
        }

        pub fn withdraw(&mut self, amount: u64) -> Result<(), String> {
            if amount > self.balance {
                return Err(format!("insufficient funds: {} < {amount}", self.balance));
            }
            self.balance -= amount;
            self.history.push(-(amount as i64));
            Ok(())
        }
    }

    fn actions(account: &Account, _: &u64) -> Gen<Action<Account, u64>> {
        let deposit = Gen::<u64>::interval(1, 100).map(|&amount| {
            Action::new(format!("deposit {amount}"), move |account: &mut Account, model: &mut u64| {
                account.deposit(amount);
                *model += amount;
            })
        });
        if account.balance == 0 {
            return deposit;
        }
        let withdraw = Gen::<u64>::interval(1, account.balance).map(|&amount| {
            Action::new(format!("withdraw {amount}"), move |account: &mut Account, model: &mut u64| {
                *model -= amount;
                account.withdraw(amount)
            })
        });
        one_of(vec![weighted_gen(deposit, 0.6), withdraw.into()])
            .unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn property() -> StatefulProperty<Account, u64> {
        stateful_property(just(Account::default()), |account: &Account| account.balance, actions)
            .set_post_check(|account: &Account, model: &u64| account.balance == *model)
    }
}

/// Example 2: Key-value cache with a capacity bug
///
/// The cache silently evicts everything once it grows past its capacity.
/// The model is an ordered map, so lookups start disagreeing after enough
/// distinct inserts.
pub mod cache {
    use super::*;

    const CAPACITY: usize = 3;

    #[derive(Debug, Clone, Default)]
    pub struct Cache {
        entries: HashMap<u8, u32>,
    }

    impl Cache {
        pub fn insert(&mut self, key: u8, value: u32) {
            self.entries.insert(key, value);
            if self.entries.len() > CAPACITY {
                self.entries.clear();
            }
        }

        pub fn get(&self, key: u8) -> Option<u32> {
            self.entries.get(&key).copied()
        }
    }

    type Model = BTreeMap<u8, u32>;

    fn actions(_: &Cache, model: &Model) -> Gen<Action<Cache, Model>> {
        let insert = Gen::<u8>::interval(0, 9).map(|&key| {
            Action::new(format!("insert {key}"), move |cache: &mut Cache, model: &mut Model| {
                cache.insert(key, key as u32 * 10);
                model.insert(key, key as u32 * 10);
            })
        });
        let known: Vec<u8> = model.keys().copied().collect();
        if known.is_empty() {
            return insert;
        }
        let lookup = element_of(known.into_iter().map(Weighted::from).collect())
            .unwrap_or_else(|err| panic!("{err}"))
            .map(|&key| {
                Action::new(format!("get {key}"), move |cache: &mut Cache, model: &mut Model| {
                    cache.get(key) == model.get(&key).copied()
                })
            });
        one_of(vec![insert.into(), lookup.into()]).unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn property() -> StatefulProperty<Cache, Model> {
        stateful_property(just(Cache::default()), |_: &Cache| Model::new(), actions)
            .set_min_actions(10)
            .set_max_actions(50)
    }
}

fn report(name: &str, result: Result<(), CheckError>) {
    match result {
        Ok(()) => println!("✓ {name}: passed"),
        Err(CheckError::StatefulFailed {
            actions,
            cause,
            seed,
            shrinks_performed,
            ..
        }) => {
            println!("✗ {name}: failed with seed {seed:?} after {shrinks_performed} shrinks");
            println!("  actions: {}", actions.join(", "));
            println!("  cause:   {cause}");
        }
        Err(err) => println!("! {name}: {err}"),
    }
}

fn main() {
    println!("=== State Machine Testing Examples ===\n");

    report("bank account", bank::property().set_seed("bank").go());
    report("capacity cache", cache::property().set_seed("cache").go());
}
