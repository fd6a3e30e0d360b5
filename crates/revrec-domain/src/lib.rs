//! revrec-domain
//!
//! Pure domain models for IFRS 15 revenue recognition (Contract, PerformanceObligation,
//! RevenueRecognitionEntry) and the value types they are built from.
//! No I/O, no logging, no storage. Only data types, invariants and state transitions.

pub mod common;
pub mod contract;
pub mod error;
pub mod money;
pub mod obligation;
pub mod period;
pub mod progress;
pub mod recognition;

pub use common::*;
pub use contract::*;
pub use error::DomainError;
pub use money::*;
pub use obligation::*;
pub use period::*;
pub use progress::*;
pub use recognition::*;
