//! Interception engine.
//!
//! A [`Weaver`] holds advice bindings and wraps operations. Matching is
//! decided once per operation at wrap time: the resulting [`Woven`] keeps a
//! table of the advice that applies to it and consults only that table on
//! each call. Operations that match nothing are called directly.
//!
//! ```ignore
//! let weaver = Weaver::from_config(&config.weaving, &AdviceCatalog::standard())?;
//! let retrieve = weaver.wrap_infallible(DataService::retrieve_data_id(), move |_: &()| {
//!     data.retrieve_data()
//! });
//! assert_eq!(retrieve.invoke(()), [111, 222, 333, 444, 555]);
//! ```

mod table;
mod woven;

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, info};

use crate::advice::{Advice, AdviceBinding, AdviceCatalog, AdviceFailurePolicy};
use crate::config::WeavingConfig;
use crate::joinpoint::{OperationId, Phase};
use crate::pointcut::{Pointcut, PointcutError, PointcutRegistry};

use table::AdviceTable;
use woven::{AsyncTarget, SyncTarget};
pub use woven::{AsyncWoven, Woven};

/// Errors from assembling a weaver.
#[derive(Debug, thiserror::Error)]
pub enum WeaveError {
    #[error(transparent)]
    Pointcut(#[from] PointcutError),

    #[error("Unknown advice: {0}")]
    UnknownAdvice(String),
}

/// Advice bindings plus the named rules they were declared against.
///
/// Bindings are fixed once operations are wrapped: each [`Woven`] snapshots
/// the bindings that matched it, so later `bind` calls do not affect
/// operations that were already woven.
#[derive(Debug, Default, Clone)]
pub struct Weaver {
    registry: PointcutRegistry,
    bindings: Vec<AdviceBinding>,
    policy: AdviceFailurePolicy,
}

impl Weaver {
    pub fn new(policy: AdviceFailurePolicy) -> Self {
        Self {
            registry: PointcutRegistry::new(),
            bindings: Vec::new(),
            policy,
        }
    }

    /// Build a weaver from declarative configuration.
    ///
    /// Pointcuts are registered in declaration order, so a pointcut may only
    /// reference pointcuts declared above it. Bindings name their pointcut and
    /// their advice; the advice is looked up in `catalog`.
    pub fn from_config(config: &WeavingConfig, catalog: &AdviceCatalog) -> Result<Self, WeaveError> {
        let mut weaver = Self::new(config.failure_policy);

        for pointcut in &config.pointcuts {
            let compiled = pointcut.rule.compile(&weaver.registry)?;
            weaver.registry.register(pointcut.name.clone(), compiled)?;
        }

        for binding in &config.bindings {
            if !weaver.registry.contains(&binding.pointcut) {
                return Err(PointcutError::UnknownRule(binding.pointcut.clone()).into());
            }
            let advice = catalog
                .get(&binding.advice)
                .ok_or_else(|| WeaveError::UnknownAdvice(binding.advice.clone()))?;
            weaver.bind_named(binding.phase, &binding.pointcut, advice)?;
        }

        info!(
            pointcuts = ?weaver.registry.names().collect::<Vec<_>>(),
            bindings = weaver.bindings.len(),
            policy = ?weaver.policy,
            "Weaver configured"
        );
        Ok(weaver)
    }

    pub fn policy(&self) -> AdviceFailurePolicy {
        self.policy
    }

    pub fn registry(&self) -> &PointcutRegistry {
        &self.registry
    }

    /// Mutable access to the named rules, for registration at startup.
    pub fn registry_mut(&mut self) -> &mut PointcutRegistry {
        &mut self.registry
    }

    pub fn bindings(&self) -> &[AdviceBinding] {
        &self.bindings
    }

    /// Bind advice to a pointcut at a phase. Bindings run in the order added.
    pub fn bind(&mut self, phase: Phase, pointcut: Pointcut, advice: Arc<dyn Advice>) -> &mut Self {
        debug!(phase = %phase, pointcut = ?pointcut, advice = %advice.name(), "Binding advice");
        self.bindings.push(AdviceBinding::new(phase, pointcut, advice));
        self
    }

    /// Bind advice to a registered pointcut by name.
    pub fn bind_named(
        &mut self,
        phase: Phase,
        pointcut: &str,
        advice: Arc<dyn Advice>,
    ) -> Result<&mut Self, WeaveError> {
        let rule = self.registry.resolve(pointcut)?;
        Ok(self.bind(phase, rule, advice))
    }

    /// Bindings whose pointcut selects the operation, in binding order.
    pub fn matching<'w>(&'w self, operation: &'w OperationId) -> impl Iterator<Item = &'w AdviceBinding> {
        self.bindings
            .iter()
            .filter(move |b| b.pointcut.matches(operation))
    }

    fn table_for(&self, operation: &OperationId) -> AdviceTable {
        let table = AdviceTable::from_bindings(self.matching(operation));
        if table.is_empty() {
            debug!(operation = %operation.path(), "No advice matches, calling directly");
        } else {
            debug!(
                operation = %operation.path(),
                advice = ?table.describe(),
                "Weaving operation"
            );
        }
        table
    }

    /// Wrap a fallible operation.
    pub fn wrap<A, R, E, F>(&self, operation: OperationId, target: F) -> Woven<A, R, E>
    where
        F: Fn(&A) -> Result<R, E> + Send + Sync + 'static,
    {
        let table = self.table_for(&operation);
        let target: SyncTarget<A, R, E> = Arc::new(target);
        Woven::new(operation, table, self.policy, target)
    }

    /// Wrap an operation that cannot fail. Call it with [`Woven::invoke`].
    pub fn wrap_infallible<A, R, F>(&self, operation: OperationId, target: F) -> Woven<A, R, Infallible>
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        self.wrap(operation, move |args: &A| Ok(target(args)))
    }

    /// Wrap an async operation.
    ///
    /// The target receives the arguments by reference and must return a
    /// future that owns whatever it needs from them.
    pub fn wrap_async<A, R, E, F, Fut>(&self, operation: OperationId, target: F) -> AsyncWoven<A, R, E>
    where
        F: Fn(&A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        let table = self.table_for(&operation);
        let target: AsyncTarget<A, R, E> =
            Arc::new(move |args: &A| -> BoxFuture<'static, Result<R, E>> { Box::pin(target(args)) });
        AsyncWoven::new(operation, table, self.policy, target)
    }
}
