//! Execution time advice for operations marked with [`TRACK_TIME`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::{Advice, AdviceError};
use crate::joinpoint::{JoinPoint, Phase};

/// Marker for operations whose execution time should be tracked.
pub const TRACK_TIME: &str = "track_time";

/// Logs how long a call took, measured from the start of the join point.
///
/// Only meaningful after the call; bound to `before` it does nothing.
#[derive(Debug, Clone, Default)]
pub struct TimingAdvice;

impl TimingAdvice {
    pub const NAME: &'static str = "track_time";

    pub fn new() -> Self {
        Self
    }

    pub fn shared() -> Arc<dyn Advice> {
        Arc::new(Self)
    }

    pub fn render(join_point: &JoinPoint<'_>, elapsed: Duration) -> String {
        format!("Time taken by {join_point} is {elapsed:?}")
    }
}

impl Advice for TimingAdvice {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn advise(&self, join_point: &JoinPoint<'_>) -> Result<(), AdviceError> {
        if join_point.phase() == Phase::Before {
            debug!(operation = %join_point.operation().path(), "Timing starts at invocation");
            return Ok(());
        }

        let elapsed = join_point.elapsed();
        info!(
            invocation = %join_point.invocation_id(),
            operation = %join_point.operation().path(),
            elapsed_us = elapsed.as_micros() as u64,
            "{}",
            Self::render(join_point, elapsed)
        );
        Ok(())
    }
}
