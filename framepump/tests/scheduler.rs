use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use framepump::{FrameDriver, FrameRequest, FrameScheduler, ManualDriver, PumpError, Registration};

fn setup() -> (FrameScheduler, Rc<ManualDriver>) {
    let driver = Rc::new(ManualDriver::new());
    let scheduler = FrameScheduler::new(driver.clone());
    (scheduler, driver)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Register an observer that logs "measure:<name>" and "react:<name>".
fn logging_observer(
    scheduler: &FrameScheduler,
    log: &Rc<RefCell<Vec<String>>>,
    name: &'static str,
) -> Registration {
    let measure_log = log.clone();
    let react_log = log.clone();
    scheduler.register(
        move || {
            measure_log.borrow_mut().push(format!("measure:{name}"));
            name
        },
        move |sample: &'static str, _time| {
            react_log.borrow_mut().push(format!("react:{sample}"));
        },
    )
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_new_scheduler_is_idle() {
    let (scheduler, driver) = setup();
    assert!(scheduler.is_idle());
    assert!(!scheduler.has_pending_frame());
    assert_eq!(driver.requests(), 0);
}

#[test]
fn test_first_registration_requests_frame() {
    let (scheduler, driver) = setup();
    let _reg = scheduler.register(|| 1, |_: i32, _| {});

    assert!(scheduler.has_pending_frame());
    assert!(driver.has_pending());
    assert_eq!(driver.requests(), 1);
}

#[test]
fn test_second_registration_does_not_request_again() {
    let (scheduler, driver) = setup();
    let _a = scheduler.register(|| 1, |_: i32, _| {});
    let _b = scheduler.register(|| 2, |_: i32, _| {});

    assert_eq!(driver.requests(), 1);
    assert_eq!(scheduler.observer_count(), 2);
}

#[test]
fn test_unregister_all_leaves_scheduler_idle() {
    let (scheduler, driver) = setup();
    let regs: Vec<_> = (0..5)
        .map(|i| scheduler.register(move || i, |_: i32, _| {}))
        .collect();
    assert_eq!(scheduler.observer_count(), 5);

    for reg in &regs {
        reg.unregister();
    }

    assert!(scheduler.is_idle());
    assert!(!driver.has_pending());
    assert_eq!(driver.cancellations(), 1);
}

#[test]
fn test_register_after_idle_restarts_pump() {
    let (scheduler, driver) = setup();
    let reg = scheduler.register(|| 1, |_: i32, _| {});
    reg.unregister();
    assert!(scheduler.is_idle());

    let _reg = scheduler.register(|| 2, |_: i32, _| {});
    assert!(scheduler.has_pending_frame());
    assert!(driver.has_pending());
    assert_eq!(driver.requests(), 2);
}

#[test]
fn test_unregister_is_idempotent() {
    let (scheduler, driver) = setup();
    let a = scheduler.register(|| 1, |_: i32, _| {});
    let _b = scheduler.register(|| 2, |_: i32, _| {});

    a.unregister();
    a.unregister();
    a.unregister();

    assert_eq!(scheduler.observer_count(), 1);
    assert!(!a.is_active());
    assert_eq!(driver.cancellations(), 0);
}

#[test]
fn test_drop_registration_unregisters() {
    let (scheduler, _driver) = setup();
    {
        let _reg = scheduler.register(|| 1, |_: i32, _| {});
        assert_eq!(scheduler.observer_count(), 1);
    }
    assert_eq!(scheduler.observer_count(), 0);
    assert!(scheduler.is_idle());
}

#[test]
fn test_registration_outliving_scheduler() {
    let (scheduler, _driver) = setup();
    let reg = scheduler.register(|| 1, |_: i32, _| {});
    drop(scheduler);

    assert!(!reg.is_active());
    reg.unregister();
}

/// A host driver that hands out its own request tokens.
#[derive(Default)]
struct HostDriver {
    next: Cell<u64>,
    cancelled: RefCell<Vec<u64>>,
}

impl FrameDriver for HostDriver {
    fn request_frame(&self) -> FrameRequest {
        self.next.set(self.next.get() + 100);
        FrameRequest::new(self.next.get())
    }

    fn cancel_frame(&self, request: FrameRequest) {
        self.cancelled.borrow_mut().push(request.raw());
    }
}

#[test]
fn test_host_driver_receives_its_own_tokens() {
    let driver = Rc::new(HostDriver::default());
    let scheduler = FrameScheduler::new(driver.clone());

    let reg = scheduler.register(|| (), |_: (), _| {});
    scheduler.pump(ms(16));
    reg.unregister();

    assert_eq!(*driver.cancelled.borrow(), vec![200]);
    assert!(scheduler.is_idle());
}

// =============================================================================
// Pump ordering
// =============================================================================

#[test]
fn test_pump_requests_next_frame() {
    let (scheduler, driver) = setup();
    let _reg = scheduler.register(|| 1, |_: i32, _| {});

    for frame in 1..=3 {
        assert!(driver.fire().is_some());
        scheduler.pump(ms(frame * 16));
        assert!(scheduler.has_pending_frame(), "frame {frame} should request the next");
    }
    assert_eq!(driver.requests(), 4);
    assert_eq!(scheduler.frames_pumped(), 3);
}

#[test]
fn test_all_measures_before_any_react() {
    let (scheduler, _driver) = setup();
    let log = Rc::new(RefCell::new(Vec::new()));
    let _a = logging_observer(&scheduler, &log, "a");
    let _b = logging_observer(&scheduler, &log, "b");
    let _c = logging_observer(&scheduler, &log, "c");

    scheduler.pump(ms(16));

    assert_eq!(
        *log.borrow(),
        vec![
            "measure:a",
            "measure:b",
            "measure:c",
            "react:a",
            "react:b",
            "react:c",
        ]
    );
}

#[test]
fn test_react_receives_own_sample_and_frame_time() {
    let (scheduler, _driver) = setup();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let counter = Rc::new(Cell::new(0));
    let regs: Vec<_> = (0..3)
        .map(|i| {
            let counter = counter.clone();
            let seen = seen.clone();
            scheduler.register(
                move || {
                    counter.set(counter.get() + 1);
                    (i, counter.get())
                },
                move |sample: (i32, i32), time| seen.borrow_mut().push((sample, time)),
            )
        })
        .collect();

    scheduler.pump(ms(42));

    assert_eq!(
        *seen.borrow(),
        vec![((0, 1), ms(42)), ((1, 2), ms(42)), ((2, 3), ms(42))]
    );
    drop(regs);
}

#[test]
fn test_register_inside_react_joins_next_frame() {
    let (scheduler, _driver) = setup();
    let log = Rc::new(RefCell::new(Vec::new()));
    let late: Rc<RefCell<Option<Registration>>> = Rc::new(RefCell::new(None));

    let _a = {
        let scheduler = scheduler.clone();
        let log = log.clone();
        let late = late.clone();
        scheduler.clone().register(
            || (),
            move |_: (), _| {
                if late.borrow().is_none() {
                    let reg = logging_observer(&scheduler, &log, "late");
                    *late.borrow_mut() = Some(reg);
                }
            },
        )
    };
    let _b = logging_observer(&scheduler, &log, "b");

    scheduler.pump(ms(16));
    assert_eq!(*log.borrow(), vec!["measure:b", "react:b"]);
    assert_eq!(scheduler.observer_count(), 3);

    log.borrow_mut().clear();
    scheduler.pump(ms(32));
    assert_eq!(
        *log.borrow(),
        vec!["measure:b", "measure:late", "react:b", "react:late"]
    );
}

#[test]
fn test_unregister_inside_react_skips_pending_react() {
    let (scheduler, _driver) = setup();
    let log = Rc::new(RefCell::new(Vec::new()));
    let victim: Rc<RefCell<Option<Registration>>> = Rc::new(RefCell::new(None));

    let _a = {
        let victim = victim.clone();
        scheduler.register(
            || (),
            move |_: (), _| {
                if let Some(reg) = victim.borrow().as_ref() {
                    reg.unregister();
                }
            },
        )
    };
    *victim.borrow_mut() = Some(logging_observer(&scheduler, &log, "victim"));
    let _c = logging_observer(&scheduler, &log, "c");

    let report = scheduler.pump(ms(16));

    // The snapshot already measured the victim; its react is skipped.
    assert_eq!(*log.borrow(), vec!["measure:victim", "measure:c", "react:c"]);
    assert_eq!(report.measured, 3);
    assert_eq!(report.reacted, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(scheduler.observer_count(), 2);
}

#[test]
fn test_unregister_last_inside_react_stops_pump() {
    let (scheduler, driver) = setup();
    let own: Rc<RefCell<Option<Registration>>> = Rc::new(RefCell::new(None));

    let reg = {
        let own = own.clone();
        scheduler.register(
            || (),
            move |_: (), _| {
                if let Some(reg) = own.borrow().as_ref() {
                    reg.unregister();
                }
            },
        )
    };
    *own.borrow_mut() = Some(reg);

    assert!(driver.fire().is_some());
    scheduler.pump(ms(16));

    assert!(scheduler.is_idle());
    assert!(!driver.has_pending());
}

#[test]
fn test_reentrant_pump_is_ignored() {
    let (scheduler, _driver) = setup();
    let inner_report = Rc::new(Cell::new(None));

    let _reg = {
        let scheduler = scheduler.clone();
        let inner_report = inner_report.clone();
        scheduler.clone().register(
            || (),
            move |_: (), _| inner_report.set(Some(scheduler.pump(ms(99)))),
        )
    };

    let report = scheduler.pump(ms(16));
    assert_eq!(report.reacted, 1);
    assert_eq!(inner_report.get().map(|r| r.frame), Some(0));
    assert_eq!(scheduler.frames_pumped(), 1);
}

// =============================================================================
// Failure isolation
// =============================================================================

#[test]
fn test_panicking_measure_does_not_stop_others() {
    let (scheduler, _driver) = setup();
    let log = Rc::new(RefCell::new(Vec::new()));
    let _a = logging_observer(&scheduler, &log, "a");
    let _bad = scheduler.register(|| -> i32 { panic!("measure exploded") }, |_: i32, _| {});
    let _c = logging_observer(&scheduler, &log, "c");

    let report = scheduler.pump(ms(16));

    assert_eq!(
        *log.borrow(),
        vec!["measure:a", "measure:c", "react:a", "react:c"]
    );
    assert_eq!(report.failed, 1);
    assert_eq!(report.reacted, 2);
}

#[test]
fn test_panicking_react_does_not_stop_others() {
    let (scheduler, _driver) = setup();
    let log = Rc::new(RefCell::new(Vec::new()));
    let _bad = scheduler.register(|| (), |_: (), _| panic!("react exploded"));
    let _b = logging_observer(&scheduler, &log, "b");

    let report = scheduler.pump(ms(16));

    assert_eq!(*log.borrow(), vec!["measure:b", "react:b"]);
    assert_eq!(report.failed, 1);
    assert!(scheduler.has_pending_frame());
}

#[test]
fn test_error_handler_receives_failures() {
    let driver = Rc::new(ManualDriver::new());
    let errors = Rc::new(RefCell::new(Vec::new()));
    let scheduler = {
        let errors = errors.clone();
        FrameScheduler::new(driver.clone()).on_error(move |err| errors.borrow_mut().push(err.clone()))
    };

    let bad = scheduler.register(|| (), |_: (), _| panic!("boom"));
    scheduler.pump(ms(16));

    let errors = errors.borrow();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        PumpError::ReactPanic { id, message } => {
            assert_eq!(*id, bad.id());
            assert_eq!(message, "boom");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(errors[0].to_string().contains("boom"));
}

#[test]
fn test_error_handler_set_after_sharing() {
    let (scheduler, _driver) = setup();
    let widget_handle = scheduler.clone();
    let messages = Rc::new(RefCell::new(Vec::new()));
    {
        let messages = messages.clone();
        let _ = scheduler
            .clone()
            .on_error(move |err| messages.borrow_mut().push(err.to_string()));
    }

    let _bad = widget_handle.register(|| -> i32 { panic!("measure broke") }, |_: i32, _| {});
    scheduler.pump(ms(16));

    let messages = messages.borrow();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("measure broke"));
}

#[test]
fn test_failed_observer_keeps_running_next_frame() {
    let (scheduler, _driver) = setup();
    let calls = Rc::new(Cell::new(0));
    let _flaky = {
        let calls = calls.clone();
        scheduler.register(
            move || {
                calls.set(calls.get() + 1);
                if calls.get() == 1 {
                    panic!("first frame only");
                }
            },
            |_: (), _| {},
        )
    };

    assert_eq!(scheduler.pump(ms(16)).failed, 1);
    let report = scheduler.pump(ms(32));
    assert_eq!(report.failed, 0);
    assert_eq!(report.reacted, 1);
}
