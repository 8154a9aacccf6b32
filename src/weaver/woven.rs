//! Woven operations: a target function plus the advice that matched it.

use std::convert::Infallible;
use std::error::Error;
use std::fmt::Debug;
use std::sync::Arc;

use futures::future::BoxFuture;

use super::table::{AdviceRun, AdviceTable};
use crate::advice::AdviceFailurePolicy;
use crate::joinpoint::{JoinPoint, OperationId};

pub(crate) type SyncTarget<A, R, E> = Arc<dyn Fn(&A) -> Result<R, E> + Send + Sync>;
pub(crate) type AsyncTarget<A, R, E> =
    Arc<dyn Fn(&A) -> BoxFuture<'static, Result<R, E>> + Send + Sync>;

/// A synchronous operation with its advice attached.
///
/// Callers see exactly the target's results and errors. Advice runs on the
/// caller's thread, in binding order, around each call.
pub struct Woven<A, R, E> {
    operation: Arc<OperationId>,
    advice: Arc<AdviceTable>,
    policy: AdviceFailurePolicy,
    target: SyncTarget<A, R, E>,
}

impl<A, R, E> Woven<A, R, E> {
    pub(crate) fn new(
        operation: OperationId,
        advice: AdviceTable,
        policy: AdviceFailurePolicy,
        target: SyncTarget<A, R, E>,
    ) -> Self {
        Self {
            operation: Arc::new(operation),
            advice: Arc::new(advice),
            policy,
            target,
        }
    }

    pub fn operation(&self) -> &OperationId {
        &self.operation
    }

    /// Whether any advice applies to this operation.
    pub fn is_advised(&self) -> bool {
        !self.advice.is_empty()
    }

    /// Number of advice bindings that matched.
    pub fn advice_count(&self) -> usize {
        self.advice.len()
    }
}

impl<A, R, E> Woven<A, R, E>
where
    A: Debug,
    R: Debug,
    E: Error + 'static,
{
    /// Call the operation, running matching advice around it.
    pub fn call(&self, args: A) -> Result<R, E> {
        if self.advice.is_empty() {
            return (self.target)(&args);
        }

        let mut run = AdviceRun::new(&self.advice, self.policy);
        let join_point = JoinPoint::start(&self.operation, &args);
        run.run(&join_point);

        let result = (self.target)(&args);

        run.complete(join_point, &result);
        result
    }
}

impl<A, R> Woven<A, R, Infallible>
where
    A: Debug,
    R: Debug,
{
    /// Call an infallible operation.
    pub fn invoke(&self, args: A) -> R {
        match self.call(args) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }
}

impl<A, R, E> Clone for Woven<A, R, E> {
    fn clone(&self) -> Self {
        Self {
            operation: Arc::clone(&self.operation),
            advice: Arc::clone(&self.advice),
            policy: self.policy,
            target: Arc::clone(&self.target),
        }
    }
}

impl<A, R, E> std::fmt::Debug for Woven<A, R, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Woven")
            .field("operation", &self.operation.path())
            .field("advice", &self.advice.describe())
            .field("policy", &self.policy)
            .finish()
    }
}

/// An async operation with its advice attached.
///
/// Advice runs synchronously before the target future is created and after
/// it resolves; no join point is held across the await.
pub struct AsyncWoven<A, R, E> {
    operation: Arc<OperationId>,
    advice: Arc<AdviceTable>,
    policy: AdviceFailurePolicy,
    target: AsyncTarget<A, R, E>,
}

impl<A, R, E> AsyncWoven<A, R, E> {
    pub(crate) fn new(
        operation: OperationId,
        advice: AdviceTable,
        policy: AdviceFailurePolicy,
        target: AsyncTarget<A, R, E>,
    ) -> Self {
        Self {
            operation: Arc::new(operation),
            advice: Arc::new(advice),
            policy,
            target,
        }
    }

    pub fn operation(&self) -> &OperationId {
        &self.operation
    }

    pub fn is_advised(&self) -> bool {
        !self.advice.is_empty()
    }

    pub fn advice_count(&self) -> usize {
        self.advice.len()
    }
}

impl<A, R, E> AsyncWoven<A, R, E>
where
    A: Debug,
    R: Debug,
    E: Error + 'static,
{
    /// Call the operation, running matching advice around the awaited target.
    pub async fn call(&self, args: A) -> Result<R, E> {
        if self.advice.is_empty() {
            return (self.target)(&args).await;
        }

        let mut run = AdviceRun::new(&self.advice, self.policy);
        let (invocation_id, started_at) = {
            let join_point = JoinPoint::start(&self.operation, &args);
            run.run(&join_point);
            (join_point.invocation_id(), join_point.started_at())
        };

        let result = (self.target)(&args).await;

        let join_point = JoinPoint::resume(&self.operation, &args, invocation_id, started_at);
        run.complete(join_point, &result);
        result
    }
}

impl<A, R, E> Clone for AsyncWoven<A, R, E> {
    fn clone(&self) -> Self {
        Self {
            operation: Arc::clone(&self.operation),
            advice: Arc::clone(&self.advice),
            policy: self.policy,
            target: Arc::clone(&self.target),
        }
    }
}

impl<A, R, E> std::fmt::Debug for AsyncWoven<A, R, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncWoven")
            .field("operation", &self.operation.path())
            .field("advice", &self.advice.describe())
            .field("policy", &self.policy)
            .finish()
    }
}
