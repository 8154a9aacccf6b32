//! Aspect-oriented advice for cross-cutting concerns.
//!
//! Advice adds orthogonal behavior (logging, timing) to an operation
//! without touching the operation itself.
//!
//! # Architecture
//!
//! Advice is bound to a pointcut and a phase at composition time, not in
//! implementations:
//!
//! ```ignore
//! // Core implementation - pure business logic
//! let service = DataService::new();
//!
//! // Bind advice
//! let mut weaver = Weaver::new(AdviceFailurePolicy::default());
//! weaver.bind(Phase::Before, Pointcut::within("joinpoint::data")?, LoggingAdvice::shared());
//!
//! // Use the woven operation as normal - advice is transparent
//! let woven = weaver.wrap_infallible(DataService::retrieve_data_id(), move |_: &()| service.retrieve_data());
//! let data = woven.invoke(());
//! ```
//!
//! # Available Advice
//!
//! - [`LoggingAdvice`] - One log line per phase with arguments, result or error
//! - [`TimingAdvice`] - Elapsed time of operations carrying the `track_time` marker

mod catalog;
mod logging;
mod timing;

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::joinpoint::{JoinPoint, Phase};
use crate::pointcut::Pointcut;

pub use catalog::AdviceCatalog;
pub use logging::LoggingAdvice;
pub use timing::{TimingAdvice, TRACK_TIME};

/// Errors raised by advice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdviceError {
    #[error("Advice '{advice}' failed: {message}")]
    Failed { advice: String, message: String },
}

impl AdviceError {
    pub fn failed(advice: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            advice: advice.into(),
            message: message.into(),
        }
    }
}

/// Cross-cutting logic run at a phase of a woven call.
///
/// Advice observes the join point; it cannot alter arguments, results or
/// errors.
pub trait Advice: Send + Sync {
    /// Stable advice name, used in logs and configuration.
    fn name(&self) -> &str;

    /// Run the advice for one phase of one call.
    fn advise(&self, join_point: &JoinPoint<'_>) -> Result<(), AdviceError>;
}

/// Advice backed by a closure.
pub struct FnAdvice<F> {
    name: String,
    f: F,
}

impl<F> Advice for FnAdvice<F>
where
    F: Fn(&JoinPoint<'_>) -> Result<(), AdviceError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn advise(&self, join_point: &JoinPoint<'_>) -> Result<(), AdviceError> {
        (self.f)(join_point)
    }
}

/// Build shared advice from a closure.
pub fn advice_fn<F>(name: impl Into<String>, f: F) -> Arc<dyn Advice>
where
    F: Fn(&JoinPoint<'_>) -> Result<(), AdviceError> + Send + Sync + 'static,
{
    Arc::new(FnAdvice {
        name: name.into(),
        f,
    })
}

/// One advice bound to one pointcut at one phase.
#[derive(Clone)]
pub struct AdviceBinding {
    pub phase: Phase,
    pub pointcut: Pointcut,
    pub advice: Arc<dyn Advice>,
}

impl AdviceBinding {
    pub fn new(phase: Phase, pointcut: Pointcut, advice: Arc<dyn Advice>) -> Self {
        Self {
            phase,
            pointcut,
            advice,
        }
    }
}

impl fmt::Debug for AdviceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdviceBinding")
            .field("phase", &self.phase)
            .field("pointcut", &self.pointcut)
            .field("advice", &self.advice.name())
            .finish()
    }
}

/// What a woven call does when one of its advice fails.
///
/// The operation's own result or error always reaches the caller unchanged;
/// advice failures never do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceFailurePolicy {
    /// Log at warn and keep running the remaining advice.
    #[default]
    LogAndContinue,
    /// Log at error and skip every remaining advice of the call.
    Abort,
}
