//! The standard aspect configuration end to end, observed through the log.

use std::sync::Arc;

use joinpoint::advice::AdviceCatalog;
use joinpoint::assembly::{assemble, Services};
use joinpoint::business::{BusinessError, BusinessService};
use joinpoint::config::Config;
use joinpoint::test_utils::ObservationLog;
use joinpoint::{Phase, Weaver};

use crate::common::LogCapture;

const RETRIEVE: &str = "execution(joinpoint::data::DataService::retrieve_data)";
const CALCULATE: &str = "execution(joinpoint::business::BusinessService::calculate_max)";

#[test]
fn test_retrieve_data_log_lines() {
    let capture = LogCapture::new();
    let data = capture.capture(|| {
        let services = assemble(&Config::default(), &AdviceCatalog::standard()).unwrap();
        services.retrieve_data.invoke(())
    });

    assert_eq!(data, vec![111, 222, 333, 444, 555]);
    assert_eq!(
        capture
            .matching(&format!("Before - {RETRIEVE} is called with arguments: ()"))
            .len(),
        1
    );
    assert_eq!(
        capture
            .matching(&format!(
                "AfterReturning - {RETRIEVE} has returned [111, 222, 333, 444, 555]"
            ))
            .len(),
        1
    );
    assert_eq!(capture.matching(&format!("Time taken by {RETRIEVE} is")).len(), 1);
    // `after` logging is bound to the business package only
    assert!(capture.matching(&format!("After - {RETRIEVE}")).is_empty());
}

#[test]
fn test_calculate_max_log_lines() {
    let capture = LogCapture::new();
    let max = capture.capture(|| {
        let services = assemble(&Config::default(), &AdviceCatalog::standard()).unwrap();
        services.calculate_max.call(())
    });

    assert_eq!(max, Ok(555));
    assert_eq!(capture.matching(&format!("Before - {CALCULATE}")).len(), 1);
    assert_eq!(capture.matching(&format!("After - {CALCULATE} has executed")).len(), 1);
    // Business package has no after_returning logging
    assert!(capture.matching(&format!("AfterReturning - {CALCULATE}")).is_empty());
    // The nested data call is advised too
    assert_eq!(capture.matching(&format!("Before - {RETRIEVE}")).len(), 1);
}

#[test]
fn test_business_failure_is_logged_and_passed_through() {
    let capture = LogCapture::new();
    let config = Config::default();

    let result = capture.capture(|| {
        let weaver = Weaver::from_config(&config.weaving, &AdviceCatalog::standard()).unwrap();
        let empty = BusinessService::new(Arc::new(Vec::<i32>::new));
        let woven = weaver.wrap(BusinessService::calculate_max_id(), move |_: &()| {
            empty.calculate_max()
        });
        woven.call(())
    });

    assert_eq!(result, Err(BusinessError::NoData));
    assert_eq!(
        capture
            .matching(&format!(
                "AfterThrowing - {CALCULATE} has thrown an exception No data available to compute the maximum"
            ))
            .len(),
        1
    );
    assert_eq!(capture.matching(&format!("After - {CALCULATE} has executed")).len(), 1);
}

#[test]
fn test_standard_bindings_by_phase() {
    let config = Config::default();
    let log = ObservationLog::new();

    // Swap every standard advice for a recorder under the same name
    let catalog = AdviceCatalog::new()
        .with(log.recorder("logging"))
        .with(log.recorder("track_time"));
    let weaver = Weaver::from_config(&config.weaving, &catalog).unwrap();
    let services = Services::weave(&weaver);

    assert_eq!(services.calculate_max.call(()), Ok(555));

    let summary: Vec<(String, Phase)> = log
        .entries()
        .into_iter()
        .map(|o| (o.operation, o.phase))
        .collect();
    let calc = "joinpoint::business::BusinessService::calculate_max".to_string();
    let data = "joinpoint::data::DataService::retrieve_data".to_string();
    assert_eq!(
        summary,
        vec![
            (calc.clone(), Phase::Before),
            (data.clone(), Phase::Before),
            (data.clone(), Phase::AfterReturning),
            (data, Phase::After),
            (calc, Phase::After),
        ]
    );
}

#[test]
fn test_config_without_bindings_is_transparent() {
    let log = ObservationLog::new();
    let services = assemble(&Config::for_test(), &AdviceCatalog::standard().with(log.recorder("unused")))
        .unwrap();

    assert_eq!(services.retrieve_data.invoke(()), vec![111, 222, 333, 444, 555]);
    assert_eq!(services.calculate_max.call(()), Ok(555));
    assert!(log.is_empty());
}
