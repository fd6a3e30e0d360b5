//! revrec-core
//!
//! Revenue recognition policy engine for revrec.
//! Depends on revrec-domain. No terminal I/O, no direct storage interactions; every
//! operation is a synchronous computation over in-memory aggregates.

pub mod allocation_service;
pub mod error;
pub mod lifecycle_service;
pub mod policy;
pub mod posting_service;
pub mod recognition_service;
pub mod storage;
pub mod summary_service;
pub mod time;
pub mod validation_service;


pub use allocation_service::*;
pub use error::{CoreError, Violation, ViolationCode};
pub use lifecycle_service::*;
pub use policy::RecognitionPolicy;
pub use posting_service::*;
pub use recognition_service::*;
pub use storage::{ContractRepository, RecognitionRepository};
pub use summary_service::*;
pub use time::{Clock, FixedClock};
pub use validation_service::*;
