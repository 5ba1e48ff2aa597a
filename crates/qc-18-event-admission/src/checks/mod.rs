//! # Admission Checks
//!
//! One module per stage. The synchronous stages implement `EventCheck` and
//! are composed by `Checkers`; the heavy stage runs on its own worker pool.
//!
//! | Stage | Reads | Rejects |
//! |-------|-------|---------|
//! | `basic` | nothing | malformed fields, bad transactions |
//! | `epoch` | validators, rules | foreign epoch, rule violations |
//! | `parents` | events, cheaters | DAG structure violations |
//! | `gas_power` | validation context | untruthful gas power left |
//! | `proposal` | rules, parent payloads | proposal protocol violations |
//! | `heavy` | public keys | signatures, payload hash |

pub mod basic;
pub mod epoch;
pub mod gas_power;
pub mod heavy;
pub mod parents;
pub mod proposal;

use crate::domain::{Result, Revision};
use shared_types::{DagEvent, Event};

pub use basic::BasicValidator;
pub use epoch::{calc_gas_power_used, EpochValidator};
pub use gas_power::{GasPowerAccountant, GasPowerValidator};
pub use heavy::{HeavyCheck, HeavyValidator};
pub use parents::ParentsValidator;
pub use proposal::ProposalValidator;

/// Input shared by every synchronous stage.
#[derive(Clone, Copy)]
pub struct CheckInput<'a> {
    /// Event under validation (signed or still being built).
    pub event: &'a dyn DagEvent,
    /// Declared self-parent, already admitted.
    pub self_parent: Option<&'a Event>,
    /// Intrinsic gas schedule of the active epoch.
    pub revision: Revision,
}

/// A synchronous admission stage.
pub trait EventCheck: Send + Sync {
    /// Stable stage name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Validate the input.
    fn check(&self, input: &CheckInput<'_>) -> Result<()>;
}
