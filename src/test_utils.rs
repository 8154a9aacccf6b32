//! Test utilities: recording and failing advice.
//!
//! Recording advice captures what each phase observed so tests can assert
//! on order, arguments, results and errors without parsing log output.

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::advice::{Advice, AdviceError};
use crate::joinpoint::{JoinPoint, Phase};

/// What one advice invocation saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Name of the advice that recorded this.
    pub advice: String,
    pub phase: Phase,
    pub invocation_id: Uuid,
    /// Operation path (`namespace::component::method`).
    pub operation: String,
    /// Arguments rendered with `{:?}`.
    pub args: String,
    /// Returned value rendered with `{:?}`, if any.
    pub returned: Option<String>,
    /// Error rendered with `{}`, if any.
    pub thrown: Option<String>,
}

/// Shared, ordered log of observations across several advice.
#[derive(Debug, Clone, Default)]
pub struct ObservationLog {
    entries: Arc<Mutex<Vec<Observation>>>,
}

impl ObservationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, observation: Observation) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(observation);
    }

    pub fn entries(&self) -> Vec<Observation> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn phases(&self) -> Vec<Phase> {
        self.entries().iter().map(|o| o.phase).collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn in_phase(&self, phase: Phase) -> Vec<Observation> {
        self.entries()
            .into_iter()
            .filter(|o| o.phase == phase)
            .collect()
    }

    /// Advice that records into this log under `name`.
    pub fn recorder(&self, name: &str) -> Arc<dyn Advice> {
        Arc::new(RecordingAdvice {
            name: name.to_string(),
            log: self.clone(),
        })
    }
}

/// Advice that records every join point it sees.
pub struct RecordingAdvice {
    name: String,
    log: ObservationLog,
}

impl Advice for RecordingAdvice {
    fn name(&self) -> &str {
        &self.name
    }

    fn advise(&self, join_point: &JoinPoint<'_>) -> Result<(), AdviceError> {
        self.log.push(Observation {
            advice: self.name.clone(),
            phase: join_point.phase(),
            invocation_id: join_point.invocation_id(),
            operation: join_point.operation().path(),
            args: format!("{:?}", join_point.args()),
            returned: join_point.returned().map(|v| format!("{v:?}")),
            thrown: join_point.thrown().map(|e| e.to_string()),
        });
        Ok(())
    }
}

/// Advice that always fails.
pub struct FailingAdvice {
    name: String,
}

impl FailingAdvice {
    pub fn shared(name: &str) -> Arc<dyn Advice> {
        Arc::new(Self {
            name: name.to_string(),
        })
    }
}

impl Advice for FailingAdvice {
    fn name(&self) -> &str {
        &self.name
    }

    fn advise(&self, join_point: &JoinPoint<'_>) -> Result<(), AdviceError> {
        Err(AdviceError::failed(
            &self.name,
            format!("refused {} at {}", join_point.operation().path(), join_point.phase()),
        ))
    }
}
