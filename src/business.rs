//! Business service computing over the data service's output.

use std::sync::Arc;

use crate::joinpoint::OperationId;

/// Supplies the data the business service works on.
pub type DataSource = Arc<dyn Fn() -> Vec<i32> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusinessError {
    #[error("No data available to compute the maximum")]
    NoData,
}

/// Computes over whatever its data source returns.
#[derive(Clone)]
pub struct BusinessService {
    source: DataSource,
}

impl BusinessService {
    pub const COMPONENT: &'static str = "BusinessService";

    pub fn new(source: DataSource) -> Self {
        Self { source }
    }

    /// Largest value in the data set.
    pub fn calculate_max(&self) -> Result<i32, BusinessError> {
        (self.source)().into_iter().max().ok_or(BusinessError::NoData)
    }

    pub fn calculate_max_id() -> OperationId {
        OperationId::new(module_path!(), Self::COMPONENT, "calculate_max")
    }
}

impl std::fmt::Debug for BusinessService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusinessService").finish_non_exhaustive()
    }
}
