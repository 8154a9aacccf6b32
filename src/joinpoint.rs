//! Operation identity and the per-call invocation record.
//!
//! An [`OperationId`] is the static identity that pointcuts match against.
//! A [`JoinPoint`] is created by a woven operation for each call and handed
//! to every advice that runs for that call.

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Separator between namespace segments, component and method.
pub const PATH_SEPARATOR: &str = "::";

/// Static identity of an interceptable operation.
///
/// Identity is declared once, next to the operation, and never depends on
/// call arguments.
///
/// ```ignore
/// let id = OperationId::new(module_path!(), "DataService", "retrieve_data")
///     .with_marker(TRACK_TIME);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationId {
    namespace: String,
    component: String,
    method: String,
    markers: BTreeSet<String>,
}

impl OperationId {
    /// Declare an operation by namespace (module path), component and method.
    pub fn new(
        namespace: impl Into<String>,
        component: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            component: component.into(),
            method: method.into(),
            markers: BTreeSet::new(),
        }
    }

    /// Attach a marker attribute.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.insert(marker.into());
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(String::as_str)
    }

    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers.contains(marker)
    }

    /// Fully qualified path: `namespace::component::method`.
    pub fn path(&self) -> String {
        [
            self.namespace.as_str(),
            self.component.as_str(),
            self.method.as_str(),
        ]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "execution({})", self.path())
    }
}

/// Lifecycle point at which advice runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Before the operation is invoked.
    Before,
    /// After the operation returned normally.
    AfterReturning,
    /// After the operation returned an error.
    AfterThrowing,
    /// After the operation, whatever the outcome.
    After,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 4] = [
        Phase::Before,
        Phase::AfterReturning,
        Phase::AfterThrowing,
        Phase::After,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Before => "Before",
            Phase::AfterReturning => "AfterReturning",
            Phase::AfterThrowing => "AfterThrowing",
            Phase::After => "After",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the wrapped operation. Exactly one variant per call.
#[derive(Clone, Copy)]
pub enum Outcome<'a> {
    /// Value returned by the operation.
    Returned(&'a dyn fmt::Debug),
    /// Error raised by the operation.
    Threw(&'a (dyn Error + 'static)),
}

impl fmt::Debug for Outcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Returned(value) => f.debug_tuple("Returned").field(value).finish(),
            Outcome::Threw(error) => f.debug_tuple("Threw").field(&format_args!("{error}")).finish(),
        }
    }
}

/// One concrete call of a woven operation, as seen by advice.
///
/// Owned by the woven operation for the duration of a single call. Arguments
/// are read-only; the outcome is only present in post-call phases.
#[derive(Clone, Copy)]
pub struct JoinPoint<'a> {
    invocation_id: Uuid,
    operation: &'a OperationId,
    args: &'a dyn fmt::Debug,
    started_at: Instant,
    phase: Phase,
    outcome: Option<Outcome<'a>>,
}

impl<'a> JoinPoint<'a> {
    pub(crate) fn start(operation: &'a OperationId, args: &'a dyn fmt::Debug) -> Self {
        Self {
            invocation_id: Uuid::new_v4(),
            operation,
            args,
            started_at: Instant::now(),
            phase: Phase::Before,
            outcome: None,
        }
    }

    /// Rebuild a join point for a call already in progress.
    pub(crate) fn resume(
        operation: &'a OperationId,
        args: &'a dyn fmt::Debug,
        invocation_id: Uuid,
        started_at: Instant,
    ) -> Self {
        Self {
            invocation_id,
            operation,
            args,
            started_at,
            phase: Phase::Before,
            outcome: None,
        }
    }

    pub(crate) fn started_at(&self) -> Instant {
        self.started_at
    }

    pub(crate) fn completed(self, outcome: Outcome<'a>) -> Self {
        let phase = match outcome {
            Outcome::Returned(_) => Phase::AfterReturning,
            Outcome::Threw(_) => Phase::AfterThrowing,
        };
        Self {
            phase,
            outcome: Some(outcome),
            ..self
        }
    }

    pub(crate) fn in_phase(self, phase: Phase) -> Self {
        Self { phase, ..self }
    }

    /// Unique id of this call, shared by every phase.
    pub fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    pub fn operation(&self) -> &'a OperationId {
        self.operation
    }

    pub fn args(&self) -> &'a dyn fmt::Debug {
        self.args
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn outcome(&self) -> Option<Outcome<'a>> {
        self.outcome
    }

    /// Value returned by the operation, if it has returned normally.
    pub fn returned(&self) -> Option<&'a dyn fmt::Debug> {
        match self.outcome {
            Some(Outcome::Returned(value)) => Some(value),
            _ => None,
        }
    }

    /// Error raised by the operation, if it failed.
    pub fn thrown(&self) -> Option<&'a (dyn Error + 'static)> {
        match self.outcome {
            Some(Outcome::Threw(error)) => Some(error),
            _ => None,
        }
    }

    /// Time since the call started.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl fmt::Debug for JoinPoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinPoint")
            .field("invocation_id", &self.invocation_id)
            .field("operation", &self.operation.path())
            .field("args", &self.args)
            .field("phase", &self.phase)
            .field("outcome", &self.outcome)
            .finish()
    }
}

impl fmt::Display for JoinPoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.operation, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    fn data_op() -> OperationId {
        OperationId::new("joinpoint::data", "DataService", "retrieve_data").with_marker("track_time")
    }

    #[test]
    fn test_operation_id_display() {
        assert_eq!(
            data_op().to_string(),
            "execution(joinpoint::data::DataService::retrieve_data)"
        );
    }

    #[test]
    fn test_operation_id_path_skips_empty_namespace() {
        let id = OperationId::new("", "Free", "function");
        assert_eq!(id.path(), "Free::function");
    }

    #[test]
    fn test_operation_id_markers() {
        let id = data_op();
        assert!(id.has_marker("track_time"));
        assert!(!id.has_marker("audited"));
        assert_eq!(id.markers().collect::<Vec<_>>(), vec!["track_time"]);
    }

    #[test]
    fn test_join_point_starts_without_outcome() {
        let id = data_op();
        let args = ();
        let jp = JoinPoint::start(&id, &args);

        assert_eq!(jp.phase(), Phase::Before);
        assert!(jp.outcome().is_none());
        assert!(jp.returned().is_none());
        assert!(jp.thrown().is_none());
        assert_eq!(format!("{:?}", jp.args()), "()");
    }

    #[test]
    fn test_join_point_returned_outcome_is_exclusive() {
        let id = data_op();
        let args = ();
        let value = vec![1, 2, 3];
        let jp = JoinPoint::start(&id, &args).completed(Outcome::Returned(&value));

        assert_eq!(jp.phase(), Phase::AfterReturning);
        assert_eq!(format!("{:?}", jp.returned().unwrap()), "[1, 2, 3]");
        assert!(jp.thrown().is_none());
    }

    #[test]
    fn test_join_point_threw_outcome_is_exclusive() {
        let id = data_op();
        let args = ();
        let error = Boom;
        let jp = JoinPoint::start(&id, &args).completed(Outcome::Threw(&error));

        assert_eq!(jp.phase(), Phase::AfterThrowing);
        assert!(jp.returned().is_none());
        assert!(jp.thrown().unwrap().downcast_ref::<Boom>().is_some());
    }

    #[test]
    fn test_join_point_keeps_invocation_id_across_phases() {
        let id = data_op();
        let args = ();
        let before = JoinPoint::start(&id, &args);
        let after = before.completed(Outcome::Returned(&1)).in_phase(Phase::After);

        assert_eq!(before.invocation_id(), after.invocation_id());
        assert_eq!(after.phase(), Phase::After);
        assert!(after.returned().is_some());
    }

    #[test]
    fn test_phase_display() {
        let names: Vec<_> = Phase::ALL.iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["Before", "AfterReturning", "AfterThrowing", "After"]);
    }
}
