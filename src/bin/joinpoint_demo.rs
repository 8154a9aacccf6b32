//! joinpoint-demo: standard aspects around the sample services
//!
//! Builds the weaver from configuration, weaves the data and business
//! services and calls each once so every advice phase shows up in the log.
//!
//! ## Configuration
//! - JOINPOINT_CONFIG: Path to a YAML config file (optional)
//! - JOINPOINT_LOG: Log filter (default: info)
//!
//! Without a config file the standard pointcuts and bindings are used.

use tracing::{error, info};

use joinpoint::advice::AdviceCatalog;
use joinpoint::assembly::assemble;
use joinpoint::config::Config;
use joinpoint::utils::bootstrap::init_tracing;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let path = std::env::args().nth(1);
    let config = Config::load(path.as_deref())?;
    let services = assemble(&config, &AdviceCatalog::standard())?;

    let data = services.retrieve_data.invoke(());
    info!(?data, "retrieve_data returned");

    match services.calculate_max.call(()) {
        Ok(max) => info!(max, "calculate_max returned"),
        Err(e) => error!(error = %e, "calculate_max failed"),
    }

    Ok(())
}
