//! # Quantum-Chain Event Admission Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── admission_benchmarks.rs   # Criterion: gas power, checkers, heavy check
//! └── src/
//!     └── integration/              # Cross-crate admission flows
//!         ├── harness.rs            # Validator network fixture
//!         ├── admission_flow.rs     # Emit → submit → admit / reject
//!         └── epoch_transition.rs   # Snapshot swaps, carry-over, block votes
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qc-tests
//!
//! # By flow
//! cargo test -p qc-tests integration::admission_flow::
//! cargo test -p qc-tests integration::epoch_transition::
//!
//! # Benchmarks
//! cargo bench -p qc-tests
//! ```

#![allow(dead_code)]

pub mod integration;
