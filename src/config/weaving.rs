//! Declarative pointcut and binding configuration.
//!
//! ```yaml
//! weaving:
//!   failure_policy: log_and_continue
//!   pointcuts:
//!     - name: data_package
//!       rule: { within: "joinpoint::data" }
//!     - name: services
//!       rule: { any_of: [ { ref: data_package }, { component: "*Service*" } ] }
//!   bindings:
//!     - phase: before
//!       pointcut: services
//!       advice: logging
//! ```

use serde::Deserialize;

use crate::advice::{AdviceFailurePolicy, LoggingAdvice, TimingAdvice, TRACK_TIME};
use crate::joinpoint::Phase;
use crate::pointcut::{Pointcut, PointcutError, PointcutRegistry};

/// Pointcut names used by the standard configuration.
pub const BUSINESS_AND_DATA_PACKAGE: &str = "business_and_data_package";
pub const BUSINESS_PACKAGE: &str = "business_package";
pub const DATA_PACKAGE: &str = "data_package";
pub const ALL_SERVICES_BY_COMPONENT: &str = "all_services_by_component";
pub const TRACK_TIME_MARKER: &str = "track_time_marker";

/// Pointcuts, bindings and the advice failure policy.
///
/// A declared `weaving` section replaces the standard setup as a whole:
/// fields it leaves out are empty, not filled from [`WeavingConfig::standard`].
#[derive(Debug, Clone, Deserialize)]
pub struct WeavingConfig {
    /// What a call does when one of its advice fails.
    #[serde(default)]
    pub failure_policy: AdviceFailurePolicy,
    /// Named pointcuts, registered in order.
    #[serde(default)]
    pub pointcuts: Vec<PointcutConfig>,
    /// Advice bindings, applied in order.
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

impl WeavingConfig {
    /// No pointcuts, no bindings: every operation is called directly.
    pub fn empty() -> Self {
        Self {
            failure_policy: AdviceFailurePolicy::default(),
            pointcuts: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Logging on every service, plus timing on `track_time` operations.
    pub fn standard() -> Self {
        let root = env!("CARGO_CRATE_NAME");
        Self {
            failure_policy: AdviceFailurePolicy::LogAndContinue,
            pointcuts: vec![
                PointcutConfig::new(BUSINESS_AND_DATA_PACKAGE, RuleConfig::Within(format!("{root}::*"))),
                PointcutConfig::new(BUSINESS_PACKAGE, RuleConfig::Within(format!("{root}::business"))),
                PointcutConfig::new(DATA_PACKAGE, RuleConfig::Within(format!("{root}::data"))),
                PointcutConfig::new(ALL_SERVICES_BY_COMPONENT, RuleConfig::Component("*Service*".to_string())),
                PointcutConfig::new(TRACK_TIME_MARKER, RuleConfig::Marker(TRACK_TIME.to_string())),
            ],
            bindings: vec![
                BindingConfig::new(Phase::Before, ALL_SERVICES_BY_COMPONENT, LoggingAdvice::NAME),
                BindingConfig::new(Phase::After, BUSINESS_PACKAGE, LoggingAdvice::NAME),
                BindingConfig::new(Phase::AfterThrowing, BUSINESS_AND_DATA_PACKAGE, LoggingAdvice::NAME),
                BindingConfig::new(Phase::AfterReturning, DATA_PACKAGE, LoggingAdvice::NAME),
                BindingConfig::new(Phase::After, TRACK_TIME_MARKER, TimingAdvice::NAME),
            ],
        }
    }
}

/// Used when the `weaving` section is absent altogether.
impl Default for WeavingConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// A named pointcut declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct PointcutConfig {
    pub name: String,
    pub rule: RuleConfig,
}

impl PointcutConfig {
    pub fn new(name: impl Into<String>, rule: RuleConfig) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }
}

/// Declarative form of a [`Pointcut`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleConfig {
    /// Namespace pattern, e.g. `joinpoint::data` or `joinpoint::*`.
    Within(String),
    /// Component name glob, e.g. `*Service*`.
    Component(String),
    /// Method name glob.
    Method(String),
    /// Marker attribute.
    Marker(String),
    AnyOf(Vec<RuleConfig>),
    AllOf(Vec<RuleConfig>),
    Not(Box<RuleConfig>),
    /// A pointcut registered earlier, by name.
    Ref(String),
}

impl RuleConfig {
    /// Compile into a pointcut, resolving references against `registry`.
    pub fn compile(&self, registry: &PointcutRegistry) -> Result<Pointcut, PointcutError> {
        Ok(match self {
            RuleConfig::Within(pattern) => Pointcut::within(pattern)?,
            RuleConfig::Component(pattern) => Pointcut::component(pattern)?,
            RuleConfig::Method(pattern) => Pointcut::method(pattern)?,
            RuleConfig::Marker(marker) => Pointcut::marker(marker.clone()),
            RuleConfig::AnyOf(rules) => Pointcut::any_of(
                rules
                    .iter()
                    .map(|r| r.compile(registry))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            RuleConfig::AllOf(rules) => Pointcut::all_of(
                rules
                    .iter()
                    .map(|r| r.compile(registry))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            RuleConfig::Not(rule) => Pointcut::negate(rule.compile(registry)?),
            RuleConfig::Ref(name) => registry.resolve(name)?,
        })
    }
}

/// Binds named advice to a named pointcut at a phase.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BindingConfig {
    pub phase: Phase,
    pub pointcut: String,
    pub advice: String,
}

impl BindingConfig {
    pub fn new(phase: Phase, pointcut: impl Into<String>, advice: impl Into<String>) -> Self {
        Self {
            phase,
            pointcut: pointcut.into(),
            advice: advice.into(),
        }
    }
}
