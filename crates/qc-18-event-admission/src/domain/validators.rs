//! Validator set and public key snapshots

use shared_crypto::{Keccak256Hasher, Secp256k1PublicKey};
use shared_types::{Epoch, Turn, ValidatorId, Weight};
use std::collections::HashMap;

/// Stake-weighted validator set of one epoch, sorted by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validators {
    ids: Vec<ValidatorId>,
    weights: Vec<Weight>,
    /// Lookup map for O(1) access
    index: HashMap<ValidatorId, usize>,
    total_weight: Weight,
}

impl Validators {
    /// Build from `(id, weight)` pairs. A repeated id keeps its last weight.
    pub fn new(entries: impl IntoIterator<Item = (ValidatorId, Weight)>) -> Self {
        let mut merged: Vec<(ValidatorId, Weight)> = entries
            .into_iter()
            .collect::<HashMap<_, _>>()
            .into_iter()
            .collect();
        merged.sort_unstable_by_key(|(id, _)| *id);

        let ids: Vec<ValidatorId> = merged.iter().map(|(id, _)| *id).collect();
        let weights: Vec<Weight> = merged.iter().map(|(_, w)| *w).collect();
        let index = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let total_weight = weights.iter().fold(0u64, |acc, w| acc.saturating_add(*w));

        Self {
            ids,
            weights,
            index,
            total_weight,
        }
    }

    /// Number of validators.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether `id` is a validator of this set.
    pub fn exists(&self, id: ValidatorId) -> bool {
        self.index.contains_key(&id)
    }

    /// Position of `id` in id order.
    pub fn get_idx(&self, id: ValidatorId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Stake weight of `id`, zero for non-validators.
    pub fn get(&self, id: ValidatorId) -> Weight {
        self.get_idx(id).map(|i| self.weights[i]).unwrap_or(0)
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> Weight {
        self.total_weight
    }

    /// Validator ids in ascending order.
    pub fn ids(&self) -> &[ValidatorId] {
        &self.ids
    }

    /// Iterate `(id, weight)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ValidatorId, Weight)> + '_ {
        self.ids.iter().copied().zip(self.weights.iter().copied())
    }

    /// Stake-weighted proposer of `turn` in `epoch`.
    ///
    /// A keccak-derived target in `[0, total_weight)` is located on the
    /// cumulative weight line walked in id order.
    pub fn proposer_for_turn(&self, epoch: Epoch, turn: Turn) -> Option<ValidatorId> {
        if self.total_weight == 0 {
            return None;
        }

        let mut hasher = Keccak256Hasher::new();
        hasher.update_u32(epoch).update_u32(turn);
        let seed = hasher.finalize();

        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&seed[..8]);
        let target = u64::from_be_bytes(prefix) % self.total_weight;

        let mut cumulative = 0u64;
        for (id, weight) in self.iter() {
            cumulative = cumulative.saturating_add(weight);
            if target < cumulative {
                return Some(id);
            }
        }
        None
    }
}

/// Public keys of the validators of one epoch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EpochPubKeys {
    /// Epoch the keys belong to.
    pub epoch: Epoch,
    keys: HashMap<ValidatorId, Secp256k1PublicKey>,
}

impl EpochPubKeys {
    /// Create a snapshot.
    pub fn new(epoch: Epoch, keys: HashMap<ValidatorId, Secp256k1PublicKey>) -> Self {
        Self { epoch, keys }
    }

    /// Key of `id`.
    pub fn get(&self, id: ValidatorId) -> Option<&Secp256k1PublicKey> {
        self.keys.get(&id)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
