//! Data retrieval service.

use crate::advice::TRACK_TIME;
use crate::joinpoint::OperationId;

/// Fixed data set served by [`DataService::retrieve_data`].
pub const SAMPLE_DATA: [i32; 5] = [111, 222, 333, 444, 555];

/// Serves a fixed data set. Knows nothing about interception.
#[derive(Debug, Clone, Default)]
pub struct DataService;

impl DataService {
    pub const COMPONENT: &'static str = "DataService";

    pub fn new() -> Self {
        Self
    }

    pub fn retrieve_data(&self) -> Vec<i32> {
        SAMPLE_DATA.to_vec()
    }

    /// Identity of [`DataService::retrieve_data`], marked for timing.
    pub fn retrieve_data_id() -> OperationId {
        OperationId::new(module_path!(), Self::COMPONENT, "retrieve_data").with_marker(TRACK_TIME)
    }
}
