//! The data service woven with a rule on its module.

use joinpoint::data::{DataService, SAMPLE_DATA};
use joinpoint::test_utils::ObservationLog;
use joinpoint::{Phase, Pointcut, Weaver};

fn woven_with(log: &ObservationLog) -> joinpoint::Woven<(), Vec<i32>, std::convert::Infallible> {
    let mut weaver = Weaver::default();
    let module = Pointcut::within("joinpoint::data").unwrap();
    weaver.bind(Phase::Before, module.clone(), log.recorder("before"));
    weaver.bind(Phase::AfterReturning, module, log.recorder("after_returning"));

    let service = DataService::new();
    weaver.wrap_infallible(DataService::retrieve_data_id(), move |_: &()| {
        service.retrieve_data()
    })
}

#[test]
fn test_returns_exact_data() {
    let log = ObservationLog::new();
    let woven = woven_with(&log);

    assert_eq!(woven.invoke(()), vec![111, 222, 333, 444, 555]);
    assert_eq!(woven.invoke(()), SAMPLE_DATA.to_vec());
}

#[test]
fn test_one_before_with_empty_arguments() {
    let log = ObservationLog::new();
    woven_with(&log).invoke(());

    let before = log.in_phase(Phase::Before);
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].args, "()");
    assert_eq!(
        before[0].operation,
        "joinpoint::data::DataService::retrieve_data"
    );
}

#[test]
fn test_one_after_returning_with_result() {
    let log = ObservationLog::new();
    woven_with(&log).invoke(());

    let returning = log.in_phase(Phase::AfterReturning);
    assert_eq!(returning.len(), 1);
    assert_eq!(
        returning[0].returned.as_deref(),
        Some("[111, 222, 333, 444, 555]")
    );
    assert_eq!(log.phases(), vec![Phase::Before, Phase::AfterReturning]);
}

#[test]
fn test_no_advice_for_other_module() {
    let log = ObservationLog::new();
    let mut weaver = Weaver::default();
    weaver.bind(
        Phase::Before,
        Pointcut::within("joinpoint::business").unwrap(),
        log.recorder("before"),
    );

    let service = DataService::new();
    let woven = weaver.wrap_infallible(DataService::retrieve_data_id(), move |_: &()| {
        service.retrieve_data()
    });

    assert_eq!(woven.invoke(()), SAMPLE_DATA.to_vec());
    assert!(log.is_empty());
}
