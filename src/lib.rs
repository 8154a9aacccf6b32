//! Joinpoint - declarative method interception
//!
//! Attaches cross-cutting advice (logging, timing) to ordinary operations
//! without modifying them. Named pointcuts select operations by their static
//! identity; a weaver wraps each operation once at startup and runs the
//! matching advice before the call, after a normal return, after an error,
//! and unconditionally after.

pub mod advice;
pub mod assembly;
pub mod business;
pub mod config;
pub mod data;
pub mod joinpoint;
pub mod pointcut;
pub mod utils;
pub mod weaver;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advice::{advice_fn, Advice, AdviceBinding, AdviceError, AdviceFailurePolicy};
pub use joinpoint::{JoinPoint, OperationId, Outcome, Phase};
pub use pointcut::{Pointcut, PointcutError, PointcutRegistry};
pub use weaver::{AsyncWoven, WeaveError, Weaver, Woven};
