//! # Transactions
//!
//! EVM-style transactions as carried inside event payloads.
//!
//! Amounts are `U256`, so a negative value or gas price cannot survive
//! decoding and never reaches admission.

use crate::entities::{Address, Hash, U256};
use serde::{Deserialize, Serialize};
use shared_crypto::{Keccak256Hasher, RecoverableSignature};

/// EIP-2718 transaction type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
    /// Pre-typed transaction.
    #[default]
    Legacy,
    /// EIP-2930 access-list transaction.
    AccessList,
    /// EIP-1559 dynamic-fee transaction.
    DynamicFee,
    /// EIP-7702 set-code transaction.
    SetCode,
}

impl TxType {
    /// Wire type byte.
    pub fn as_u8(&self) -> u8 {
        match self {
            TxType::Legacy => 0,
            TxType::AccessList => 1,
            TxType::DynamicFee => 2,
            TxType::SetCode => 4,
        }
    }
}

/// Access-list entry: an address and the storage slots it touches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTuple {
    /// Accessed account.
    pub address: Address,
    /// Accessed storage slots.
    pub storage_keys: Vec<Hash>,
}

/// Set-code authorization tuple.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authorization {
    /// Chain the authorization is valid on (0 = any).
    pub chain_id: u64,
    /// Delegation target.
    pub address: Address,
    /// Authority nonce.
    pub nonce: u64,
    /// Authority signature.
    pub signature: RecoverableSignature,
}

/// A signed transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// Envelope type.
    pub tx_type: TxType,
    /// Chain id.
    pub chain_id: u64,
    /// Sender nonce.
    pub nonce: u64,
    /// Max priority fee per gas (equals the fee cap for legacy txs).
    pub gas_tip_cap: U256,
    /// Max fee per gas (the gas price for legacy txs).
    pub gas_fee_cap: U256,
    /// Gas limit.
    pub gas: u64,
    /// Recipient, `None` for contract creation.
    pub to: Option<Address>,
    /// Transferred value.
    pub value: U256,
    /// Call data or init code.
    pub data: Vec<u8>,
    /// EIP-2930 access list.
    pub access_list: Vec<AccessTuple>,
    /// EIP-7702 authorizations.
    pub authorizations: Vec<Authorization>,
    /// Sender signature over `signing_hash()`.
    pub signature: RecoverableSignature,
}

impl Transaction {
    /// Whether this transaction deploys a contract.
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }

    /// Hash the sender signs.
    pub fn signing_hash(&self) -> Hash {
        let mut hasher = Keccak256Hasher::new();
        hasher
            .update(&[self.tx_type.as_u8()])
            .update_u64(self.chain_id)
            .update_u64(self.nonce)
            .update(&u256_bytes(&self.gas_tip_cap))
            .update(&u256_bytes(&self.gas_fee_cap))
            .update_u64(self.gas);
        match &self.to {
            Some(to) => hasher.update(&[1]).update(to),
            None => hasher.update(&[0]),
        };
        hasher
            .update(&u256_bytes(&self.value))
            .update_u64(self.data.len() as u64)
            .update(&self.data)
            .update_u64(self.access_list.len() as u64);
        for tuple in &self.access_list {
            hasher
                .update(&tuple.address)
                .update_u64(tuple.storage_keys.len() as u64);
            for key in &tuple.storage_keys {
                hasher.update(key);
            }
        }
        hasher.update_u64(self.authorizations.len() as u64);
        for auth in &self.authorizations {
            hasher
                .update_u64(auth.chain_id)
                .update(&auth.address)
                .update_u64(auth.nonce)
                .update(&[auth.signature.v])
                .update(&auth.signature.r)
                .update(&auth.signature.s);
        }
        hasher.finalize()
    }

    /// Transaction hash (signing hash bound to the signature).
    pub fn hash(&self) -> Hash {
        let mut hasher = Keccak256Hasher::new();
        hasher
            .update(&self.signing_hash())
            .update(&[self.signature.v])
            .update(&self.signature.r)
            .update(&self.signature.s);
        hasher.finalize()
    }
}

fn u256_bytes(value: &U256) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes
}
