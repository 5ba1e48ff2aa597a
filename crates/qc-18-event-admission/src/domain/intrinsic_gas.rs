//! Intrinsic gas of a transaction, per revision
//!
//! The schedule is a versioned strategy: callers pass the `Revision` of the
//! epoch the event belongs to.

use super::rules::Revision;
use shared_types::Transaction;

/// Base cost of a message call.
pub const TX_GAS: u64 = 21_000;
/// Base cost of a contract creation.
pub const TX_GAS_CONTRACT_CREATION: u64 = 53_000;
/// Cost per zero data byte.
pub const TX_DATA_ZERO_GAS: u64 = 4;
/// Cost per non-zero data byte (EIP-2028).
pub const TX_DATA_NON_ZERO_GAS: u64 = 16;
/// Cost per access-list address.
pub const TX_ACCESS_LIST_ADDRESS_GAS: u64 = 2_400;
/// Cost per access-list storage key.
pub const TX_ACCESS_LIST_STORAGE_KEY_GAS: u64 = 1_900;
/// Cost per 32-byte word of init code (Allegro).
pub const INIT_CODE_WORD_GAS: u64 = 2;
/// Cost per set-code authorization (Allegro).
pub const PER_AUTHORIZATION_GAS: u64 = 25_000;

/// Intrinsic gas of `tx`, `None` on overflow.
pub fn intrinsic_gas(tx: &Transaction, revision: Revision) -> Option<u64> {
    let creation = tx.is_contract_creation();
    let mut gas = if creation {
        TX_GAS_CONTRACT_CREATION
    } else {
        TX_GAS
    };

    if !tx.data.is_empty() {
        let zero_bytes = tx.data.iter().filter(|b| **b == 0).count() as u64;
        let non_zero_bytes = tx.data.len() as u64 - zero_bytes;

        gas = gas.checked_add(non_zero_bytes.checked_mul(TX_DATA_NON_ZERO_GAS)?)?;
        gas = gas.checked_add(zero_bytes.checked_mul(TX_DATA_ZERO_GAS)?)?;

        if creation && revision == Revision::Allegro {
            let words = (tx.data.len() as u64).div_ceil(32);
            gas = gas.checked_add(words.checked_mul(INIT_CODE_WORD_GAS)?)?;
        }
    }

    let addresses = tx.access_list.len() as u64;
    let storage_keys: u64 = tx
        .access_list
        .iter()
        .map(|tuple| tuple.storage_keys.len() as u64)
        .sum();
    gas = gas.checked_add(addresses.checked_mul(TX_ACCESS_LIST_ADDRESS_GAS)?)?;
    gas = gas.checked_add(storage_keys.checked_mul(TX_ACCESS_LIST_STORAGE_KEY_GAS)?)?;

    if revision == Revision::Allegro {
        let authorizations = tx.authorizations.len() as u64;
        gas = gas.checked_add(authorizations.checked_mul(PER_AUTHORIZATION_GAS)?)?;
    }

    Some(gas)
}
