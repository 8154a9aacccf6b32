//! Selection rules (pointcuts) and the named rule registry.
//!
//! A pointcut is a pure predicate over an operation's static identity. It
//! never sees call arguments, so whether an operation is advised is decided
//! once, when the operation is woven.
//!
//! ```ignore
//! let mut registry = PointcutRegistry::new();
//! registry.register("data_package", Pointcut::within("joinpoint::data")?)?;
//! registry.register("business_package", Pointcut::within("joinpoint::business")?)?;
//! registry.register(
//!     "business_and_data",
//!     Pointcut::any_of([
//!         registry.resolve("data_package")?,
//!         registry.resolve("business_package")?,
//!     ]),
//! )?;
//! ```

mod pattern;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::joinpoint::OperationId;

pub use pattern::{NamePattern, NamespacePattern};

/// Errors from building or resolving pointcuts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointcutError {
    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    #[error("Rule already registered: {0}")]
    DuplicateRule(String),

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Custom predicate over operation identity.
pub type Predicate = Arc<dyn Fn(&OperationId) -> bool + Send + Sync>;

/// A selection rule over operation identity.
#[derive(Clone)]
pub enum Pointcut {
    /// Operation's namespace matches the pattern.
    Within(NamespacePattern),
    /// Operation's component (type) name matches the glob.
    Component(NamePattern),
    /// Operation's method name matches the glob.
    Method(NamePattern),
    /// Operation carries the marker.
    Marker(String),
    /// Any of the rules matches. Empty matches nothing.
    AnyOf(Vec<Pointcut>),
    /// All of the rules match. Empty matches everything.
    AllOf(Vec<Pointcut>),
    /// The rule does not match.
    Not(Box<Pointcut>),
    /// Caller-supplied predicate.
    Custom(Predicate),
}

impl Pointcut {
    pub fn within(pattern: &str) -> Result<Self, PointcutError> {
        Ok(Self::Within(NamespacePattern::parse(pattern)?))
    }

    pub fn component(pattern: &str) -> Result<Self, PointcutError> {
        Ok(Self::Component(NamePattern::parse(pattern)?))
    }

    pub fn method(pattern: &str) -> Result<Self, PointcutError> {
        Ok(Self::Method(NamePattern::parse(pattern)?))
    }

    pub fn marker(marker: impl Into<String>) -> Self {
        Self::Marker(marker.into())
    }

    pub fn any_of(rules: impl IntoIterator<Item = Pointcut>) -> Self {
        Self::AnyOf(rules.into_iter().collect())
    }

    pub fn all_of(rules: impl IntoIterator<Item = Pointcut>) -> Self {
        Self::AllOf(rules.into_iter().collect())
    }

    pub fn negate(rule: Pointcut) -> Self {
        Self::Not(Box::new(rule))
    }

    /// Wrap a predicate. It must depend only on the operation's identity.
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&OperationId) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    /// Whether the rule selects the operation.
    pub fn matches(&self, operation: &OperationId) -> bool {
        match self {
            Pointcut::Within(pattern) => pattern.matches(operation.namespace()),
            Pointcut::Component(pattern) => pattern.matches(operation.component()),
            Pointcut::Method(pattern) => pattern.matches(operation.method()),
            Pointcut::Marker(marker) => operation.has_marker(marker),
            Pointcut::AnyOf(rules) => rules.iter().any(|r| r.matches(operation)),
            Pointcut::AllOf(rules) => rules.iter().all(|r| r.matches(operation)),
            Pointcut::Not(rule) => !rule.matches(operation),
            Pointcut::Custom(predicate) => predicate(operation),
        }
    }
}

impl fmt::Debug for Pointcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pointcut::Within(p) => write!(f, "within({p})"),
            Pointcut::Component(p) => write!(f, "component({p})"),
            Pointcut::Method(p) => write!(f, "method({p})"),
            Pointcut::Marker(m) => write!(f, "marker({m})"),
            Pointcut::AnyOf(rules) => f.debug_tuple("any_of").field(rules).finish(),
            Pointcut::AllOf(rules) => f.debug_tuple("all_of").field(rules).finish(),
            Pointcut::Not(rule) => f.debug_tuple("not").field(rule).finish(),
            Pointcut::Custom(_) => f.write_str("custom(..)"),
        }
    }
}

/// Named, reusable pointcuts.
///
/// Populated at startup, then only read. A rule can only reference rules
/// that were registered before it, so references never form cycles.
#[derive(Debug, Default, Clone)]
pub struct PointcutRegistry {
    rules: HashMap<String, Pointcut>,
    order: Vec<String>,
}

impl PointcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a named rule. Names are write-once.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        pointcut: Pointcut,
    ) -> Result<(), PointcutError> {
        let name = name.into();
        if self.rules.contains_key(&name) {
            return Err(PointcutError::DuplicateRule(name));
        }
        debug!(rule = %name, pointcut = ?pointcut, "Registering pointcut");
        self.order.push(name.clone());
        self.rules.insert(name, pointcut);
        Ok(())
    }

    /// Look up a rule by name.
    pub fn resolve(&self, name: &str) -> Result<Pointcut, PointcutError> {
        self.rules
            .get(name)
            .cloned()
            .ok_or_else(|| PointcutError::UnknownRule(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Rule names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
