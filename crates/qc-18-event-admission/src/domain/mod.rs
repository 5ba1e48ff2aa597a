//! Domain layer: pure admission logic, no I/O

pub mod error;
pub mod gas_power;
pub mod intrinsic_gas;
pub mod rules;
pub mod validators;

pub use error::{AdmissionError, ErrorKind, Result};
pub use gas_power::{
    calc_validator_gas_power, calc_validator_gas_power_per_sec, GasPowerConfig, PrevEpochEvent,
    ValidationContext, ValidatorState,
};
pub use intrinsic_gas::intrinsic_gas;
pub use rules::{BlocksRules, DagRules, EconomyRules, GasPowerRules, GasRules, Revision, Rules, Upgrades};
pub use validators::{EpochPubKeys, Validators};
