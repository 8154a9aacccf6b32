//! Advice looked up by name from configuration.

use std::collections::HashMap;
use std::sync::Arc;

use super::{Advice, LoggingAdvice, TimingAdvice};

/// Named advice available to configuration-driven bindings.
#[derive(Clone, Default)]
pub struct AdviceCatalog {
    advice: HashMap<String, Arc<dyn Advice>>,
}

impl AdviceCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the built-in `logging` and `track_time` advice.
    pub fn standard() -> Self {
        Self::new()
            .with(LoggingAdvice::shared())
            .with(TimingAdvice::shared())
    }

    /// Add advice under its own name, replacing any advice of the same name.
    pub fn with(mut self, advice: Arc<dyn Advice>) -> Self {
        self.insert(advice);
        self
    }

    pub fn insert(&mut self, advice: Arc<dyn Advice>) {
        self.advice.insert(advice.name().to_string(), advice);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Advice>> {
        self.advice.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.advice.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for AdviceCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdviceCatalog")
            .field("advice", &self.names())
            .finish()
    }
}
