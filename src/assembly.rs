//! Composition root.
//!
//! Builds the weaver from configuration, wraps the services' operations and
//! hands out the woven versions. Callers never see an unwoven operation and
//! there is no global lookup: whoever needs an operation gets it from here.

use std::convert::Infallible;
use std::sync::Arc;

use tracing::info;

use crate::advice::AdviceCatalog;
use crate::business::{BusinessError, BusinessService};
use crate::config::Config;
use crate::data::DataService;
use crate::weaver::{WeaveError, Weaver, Woven};

/// Woven service operations.
#[derive(Debug, Clone)]
pub struct Services {
    pub retrieve_data: Woven<(), Vec<i32>, Infallible>,
    pub calculate_max: Woven<(), i32, BusinessError>,
}

impl Services {
    /// Wrap every service operation with `weaver`.
    ///
    /// The business service reads through the woven `retrieve_data`, so a
    /// `calculate_max` call also produces the data service's advice.
    pub fn weave(weaver: &Weaver) -> Self {
        let data = DataService::new();
        let retrieve_data = weaver.wrap_infallible(DataService::retrieve_data_id(), move |_: &()| {
            data.retrieve_data()
        });

        let source = retrieve_data.clone();
        let business = BusinessService::new(Arc::new(move || source.invoke(())));
        let calculate_max = weaver.wrap(BusinessService::calculate_max_id(), move |_: &()| {
            business.calculate_max()
        });

        info!(
            retrieve_data_advice = retrieve_data.advice_count(),
            calculate_max_advice = calculate_max.advice_count(),
            "Services woven"
        );

        Self {
            retrieve_data,
            calculate_max,
        }
    }
}

/// Build the weaver from `config` and weave the services.
pub fn assemble(config: &Config, catalog: &AdviceCatalog) -> Result<Services, WeaveError> {
    let weaver = Weaver::from_config(&config.weaving, catalog)?;
    Ok(Services::weave(&weaver))
}
