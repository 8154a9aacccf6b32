//! Per-operation advice table and the per-call advice run.

use std::error::Error;
use std::fmt::Debug;
use std::sync::Arc;

use tracing::{error, warn};

use crate::advice::{Advice, AdviceBinding, AdviceFailurePolicy};
use crate::joinpoint::{JoinPoint, Outcome, Phase};

/// Advice matching one operation, grouped by phase in binding order.
#[derive(Clone, Default)]
pub(crate) struct AdviceTable {
    before: Vec<Arc<dyn Advice>>,
    after_returning: Vec<Arc<dyn Advice>>,
    after_throwing: Vec<Arc<dyn Advice>>,
    after: Vec<Arc<dyn Advice>>,
}

impl AdviceTable {
    /// Group bindings already selected for one operation.
    pub(crate) fn from_bindings<'b>(bindings: impl IntoIterator<Item = &'b AdviceBinding>) -> Self {
        let mut table = Self::default();
        for binding in bindings {
            table
                .phase_mut(binding.phase)
                .push(Arc::clone(&binding.advice));
        }
        table
    }

    pub(crate) fn phase(&self, phase: Phase) -> &[Arc<dyn Advice>] {
        match phase {
            Phase::Before => &self.before,
            Phase::AfterReturning => &self.after_returning,
            Phase::AfterThrowing => &self.after_throwing,
            Phase::After => &self.after,
        }
    }

    fn phase_mut(&mut self, phase: Phase) -> &mut Vec<Arc<dyn Advice>> {
        match phase {
            Phase::Before => &mut self.before,
            Phase::AfterReturning => &mut self.after_returning,
            Phase::AfterThrowing => &mut self.after_throwing,
            Phase::After => &mut self.after,
        }
    }

    pub(crate) fn len(&self) -> usize {
        Phase::ALL.iter().map(|p| self.phase(*p).len()).sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advice names per phase, for diagnostics.
    pub(crate) fn describe(&self) -> Vec<(Phase, Vec<String>)> {
        Phase::ALL
            .iter()
            .filter(|p| !self.phase(**p).is_empty())
            .map(|p| {
                let names = self.phase(*p).iter().map(|a| a.name().to_string()).collect();
                (*p, names)
            })
            .collect()
    }
}

/// Advice execution for a single call.
pub(crate) struct AdviceRun<'t> {
    table: &'t AdviceTable,
    policy: AdviceFailurePolicy,
    aborted: bool,
}

impl<'t> AdviceRun<'t> {
    pub(crate) fn new(table: &'t AdviceTable, policy: AdviceFailurePolicy) -> Self {
        Self {
            table,
            policy,
            aborted: false,
        }
    }

    /// Run the advice for the join point's current phase.
    pub(crate) fn run(&mut self, join_point: &JoinPoint<'_>) {
        if self.aborted {
            return;
        }
        for advice in self.table.phase(join_point.phase()) {
            let Err(e) = advice.advise(join_point) else {
                continue;
            };
            match self.policy {
                AdviceFailurePolicy::LogAndContinue => {
                    warn!(
                        invocation = %join_point.invocation_id(),
                        operation = %join_point.operation().path(),
                        phase = %join_point.phase(),
                        advice = %advice.name(),
                        error = %e,
                        "Advice failed, continuing"
                    );
                }
                AdviceFailurePolicy::Abort => {
                    error!(
                        invocation = %join_point.invocation_id(),
                        operation = %join_point.operation().path(),
                        phase = %join_point.phase(),
                        advice = %advice.name(),
                        error = %e,
                        "Advice failed, skipping remaining advice"
                    );
                    self.aborted = true;
                    return;
                }
            }
        }
    }

    /// Record the operation's outcome and run the post-call phases.
    pub(crate) fn complete<R, E>(&mut self, join_point: JoinPoint<'_>, result: &Result<R, E>)
    where
        R: Debug,
        E: Error + 'static,
    {
        let outcome = match result {
            Ok(value) => Outcome::Returned(value),
            Err(error) => Outcome::Threw(error),
        };
        let completed = join_point.completed(outcome);
        self.run(&completed);
        self.run(&completed.in_phase(Phase::After));
    }
}
