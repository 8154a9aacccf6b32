//! Logging advice.
//!
//! Emits one `info` line per phase describing the call. The line is also
//! available through [`LoggingAdvice::render`] for callers that want the
//! text without going through `tracing`.

use std::sync::Arc;

use tracing::info;

use super::{Advice, AdviceError};
use crate::joinpoint::{JoinPoint, Phase};

/// Advice that logs every phase it is bound to.
///
/// Lines have the form:
/// - `Before - <op> is called with arguments: <args>`
/// - `After - <op> has executed`
/// - `AfterThrowing - <op> has thrown an exception <error>`
/// - `AfterReturning - <op> has returned <value>`
#[derive(Debug, Clone, Default)]
pub struct LoggingAdvice;

impl LoggingAdvice {
    pub const NAME: &'static str = "logging";

    pub fn new() -> Self {
        Self
    }

    pub fn shared() -> Arc<dyn Advice> {
        Arc::new(Self)
    }

    /// Render the log line for a join point.
    pub fn render(join_point: &JoinPoint<'_>) -> String {
        let phase = join_point.phase();
        match phase {
            Phase::Before => format!(
                "{phase} - {join_point} is called with arguments: {:?}",
                join_point.args()
            ),
            Phase::After => format!("{phase} - {join_point} has executed"),
            Phase::AfterThrowing => match join_point.thrown() {
                Some(error) => format!("{phase} - {join_point} has thrown an exception {error}"),
                None => format!("{phase} - {join_point} has thrown an exception"),
            },
            Phase::AfterReturning => match join_point.returned() {
                Some(value) => format!("{phase} - {join_point} has returned {value:?}"),
                None => format!("{phase} - {join_point} has returned"),
            },
        }
    }
}

impl Advice for LoggingAdvice {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn advise(&self, join_point: &JoinPoint<'_>) -> Result<(), AdviceError> {
        info!(
            invocation = %join_point.invocation_id(),
            operation = %join_point.operation().path(),
            phase = %join_point.phase(),
            "{}",
            Self::render(join_point)
        );
        Ok(())
    }
}
