//! End-to-end runs through discovery, resolution, invocation, and the run
//! coordinator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;

use tagrun::check::Fault;
use tagrun::discover::{self, TestCaseDescriptor};
use tagrun::engine::{
    CancelSignal, CaseResult, Coordinator, Invocation, NullReport, Outcome, Report, RunState,
};
use tagrun::errors::EngineError;
use tagrun::registry::{Member, Module, ModuleSet, ParamKind};
use tagrun::resolve::{ContainerBuilder, Fixture, FixtureRef, StandIns};

trait Audit: Send + Sync {
    fn note(&self, entry: &str) -> usize;
}

/// Behaviorally inert stand-in implementation.
struct NullAudit;

impl Audit for NullAudit {
    fn note(&self, _entry: &str) -> usize {
        0
    }
}

/// The "real" implementation a fixture registers.
struct LiveAudit;

impl Audit for LiveAudit {
    fn note(&self, _entry: &str) -> usize {
        41
    }
}

#[derive(Default)]
struct AuditFixture;

impl Fixture for AuditFixture {
    fn configure(&mut self, builder: &mut ContainerBuilder) {
        builder.provide(|_| Ok(Arc::new(LiveAudit) as Arc<dyn Audit>));
    }
}

fn single_module(member: Member) -> ModuleSet {
    let mut module = Module::new("m");
    module.register(member);
    let mut modules = ModuleSet::new();
    modules.register(module);
    modules
}

fn audit_stand_ins() -> StandIns {
    let mut stand_ins = StandIns::new();
    stand_ins.provide(|| Arc::new(NullAudit) as Arc<dyn Audit>);
    stand_ins
}

/// Collects discovery and execution records in the order they arrive.
#[derive(Default)]
struct Recorder {
    discovered: Vec<String>,
    finished: Vec<String>,
}

impl Report for Recorder {
    fn case_discovered(&mut self, case: &TestCaseDescriptor) {
        self.discovered.push(case.id.clone());
    }

    fn case_finished(&mut self, result: &CaseResult) {
        self.finished.push(result.case.id.clone());
    }
}

#[tokio::test]
async fn skipped_member_is_never_invoked() {
    let invoked = Arc::new(AtomicUsize::new(0));
    let flag = invoked.clone();
    let modules = single_module(
        Member::builder("Calc", "flaky")
            .test()
            .skip(Some("known flaky"))
            .sync_body(move |_, _| {
                flag.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build(),
    );

    let record = Coordinator::from_modules(&modules)
        .execute(&mut NullReport)
        .await;

    assert_eq!(invoked.load(Ordering::SeqCst), 0);
    assert_eq!(record.results.len(), 1);
    assert_eq!(
        record.results[0].outcome,
        Outcome::Skipped("known flaky".to_string())
    );
    assert_eq!(record.results[0].duration, Duration::default());
    assert_eq!(record.state, RunState::Completed);
}

#[tokio::test]
async fn unregistered_capability_receives_a_stand_in() {
    let modules = single_module(
        Member::builder("Report", "bar")
            .test()
            .param::<Arc<dyn Audit>>("audit", ParamKind::Capability)
            .sync_body(|_, mut args| {
                let audit = args
                    .take::<Arc<dyn Audit>>(0)
                    .ok_or_else(|| Fault::assertion("audit parameter missing"))?;
                // The stand-in absorbs the call instead of faulting.
                audit.note("entry");
                Ok(())
            })
            .build(),
    );

    let record = Coordinator::from_modules(&modules)
        .with_stand_ins(audit_stand_ins())
        .execute(&mut NullReport)
        .await;

    assert_eq!(record.results[0].outcome, Outcome::Passed);
}

#[tokio::test]
async fn unregistered_concrete_parameter_reads_as_absent() {
    let modules = single_module(
        Member::builder("Calc", "counts")
            .test()
            .param::<u32>("count", ParamKind::Concrete)
            .sync_body(|_, mut args| {
                if !args.is_absent(0) || args.take::<u32>(0).is_some() {
                    return Err(Fault::assertion("expected an absent slot"));
                }
                Ok(())
            })
            .build(),
    );

    let record = Coordinator::from_modules(&modules)
        .execute(&mut NullReport)
        .await;

    // The soft miss never aborts the test.
    assert_eq!(record.results[0].outcome, Outcome::Passed);
}

#[tokio::test]
async fn fixture_registration_wins_over_the_stand_in() {
    let modules = single_module(
        Member::builder("Report", "quux")
            .test()
            .group(FixtureRef::of::<AuditFixture>())
            .param::<Arc<dyn Audit>>("audit", ParamKind::Capability)
            .sync_body(|_, mut args| {
                let audit = args
                    .take::<Arc<dyn Audit>>(0)
                    .ok_or_else(|| Fault::assertion("audit parameter missing"))?;
                if audit.note("entry") != 41 {
                    return Err(Fault::assertion("expected the registered implementation"));
                }
                Ok(())
            })
            .build(),
    );

    let record = Coordinator::from_modules(&modules)
        .with_stand_ins(audit_stand_ins())
        .execute(&mut NullReport)
        .await;

    assert_eq!(record.results[0].outcome, Outcome::Passed);
}

#[tokio::test]
async fn type_level_grouping_applies_when_the_member_has_none() {
    let mut module = Module::new("m");
    module.group_type("Report", FixtureRef::of::<AuditFixture>());
    module.register(
        Member::builder("Report", "grouped")
            .test()
            .param::<Arc<dyn Audit>>("audit", ParamKind::Capability)
            .sync_body(|_, mut args| {
                let audit = args
                    .take::<Arc<dyn Audit>>(0)
                    .ok_or_else(|| Fault::assertion("audit parameter missing"))?;
                if audit.note("entry") != 41 {
                    return Err(Fault::assertion("expected the registered implementation"));
                }
                Ok(())
            })
            .build(),
    );
    let mut modules = ModuleSet::new();
    modules.register(module);

    let record = Coordinator::from_modules(&modules)
        .execute(&mut NullReport)
        .await;

    assert_eq!(record.results[0].outcome, Outcome::Passed);
}

#[tokio::test]
async fn failed_provider_is_the_tests_failure_cause() {
    #[derive(Clone)]
    struct Needs;

    #[derive(Default)]
    struct BrokenFixture;

    impl Fixture for BrokenFixture {
        fn configure(&mut self, builder: &mut ContainerBuilder) {
            // `Needs`'s own dependency is never registered.
            builder.provide(|_| -> Result<Needs, EngineError> {
                Err(EngineError("`Clock` is not registered".to_string()))
            });
        }
    }

    let modules = single_module(
        Member::builder("Calc", "needs")
            .test()
            .group(FixtureRef::of::<BrokenFixture>())
            .param::<Needs>("needs", ParamKind::Concrete)
            .sync_body(|_, _| Ok(()))
            .build(),
    );

    let record = Coordinator::from_modules(&modules)
        .execute(&mut NullReport)
        .await;

    match &record.results[0].outcome {
        Outcome::Failed(fault) => assert_eq!(fault.kind, "resolution"),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn async_member_is_awaited_and_passes() {
    let modules = single_module(
        Member::builder("Calc", "foo")
            .test()
            .async_body(|_, _| {
                async {
                    tokio::time::delay_for(Duration::from_millis(10)).await;
                    Ok(())
                }
                .boxed()
            })
            .build(),
    );

    let record = Coordinator::from_modules(&modules)
        .execute(&mut NullReport)
        .await;

    assert_eq!(record.results[0].outcome, Outcome::Passed);
    assert!(record.results[0].duration > Duration::from_millis(1));
}

#[tokio::test]
async fn raised_fault_surfaces_with_its_kind() {
    let modules = single_module(
        Member::builder("Calc", "qux")
            .test()
            .sync_body(|_, _| Err(Fault::new("InvalidOperation", "division by zero")))
            .build(),
    );

    let record = Coordinator::from_modules(&modules)
        .execute(&mut NullReport)
        .await;

    match &record.results[0].outcome {
        Outcome::Failed(fault) => {
            assert_eq!(fault.kind, "InvalidOperation");
            assert_eq!(fault.message, "division by zero");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn nested_case_passes_when_the_parent_never_calls_back() {
    let mut module = Module::new("m");
    // The parent is not itself tagged, so only the nested case runs.
    module.register(
        Member::builder("Calc", "theory_parent")
            .param::<()>("check", ParamKind::Callback)
            .sync_body(|_, _| Ok(()))
            .build(),
    );
    module.register(
        Member::builder("Calc", "<theory_parent>g__check|0_0")
            .test()
            .sync_body(|_, _| Err(Fault::assertion("nested body must not run")))
            .build(),
    );
    let mut modules = ModuleSet::new();
    modules.register(module);

    let record = Coordinator::from_modules(&modules)
        .execute(&mut NullReport)
        .await;

    assert_eq!(record.results.len(), 1);
    assert_eq!(record.results[0].case.id, "Calc.<theory_parent>g__check|0_0");
    assert_eq!(record.results[0].outcome, Outcome::Passed);
}

#[tokio::test]
async fn nested_body_runs_inside_the_parent_invocation() {
    let hits = Arc::new(AtomicUsize::new(0));
    let nested_hits = hits.clone();

    let mut module = Module::new("m");
    module.register(
        Member::builder("Calc", "theory_parent")
            .param::<()>("check", ParamKind::Callback)
            .sync_body(|_, mut args| {
                let cb = args
                    .callback(0)
                    .ok_or_else(|| Fault::assertion("callback parameter missing"))?;
                match cb.call() {
                    Invocation::Sync(res) => res,
                    Invocation::Async(_) => Err(Fault::assertion("expected a sync callback")),
                }
            })
            .build(),
    );
    module.register(
        Member::builder("Calc", "<theory_parent>g__check|0_0")
            .test()
            .sync_body(move |_, _| {
                nested_hits.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build(),
    );
    let mut modules = ModuleSet::new();
    modules.register(module);

    let record = Coordinator::from_modules(&modules)
        .execute(&mut NullReport)
        .await;

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(record.results[0].outcome, Outcome::Passed);
}

#[tokio::test]
async fn nested_fault_is_attributed_to_the_nested_case() {
    let mut module = Module::new("m");
    module.register(
        Member::builder("Calc", "theory_parent")
            .param::<()>("check", ParamKind::Callback)
            .sync_body(|_, mut args| {
                let cb = args
                    .callback(0)
                    .ok_or_else(|| Fault::assertion("callback parameter missing"))?;
                match cb.call() {
                    Invocation::Sync(res) => res,
                    Invocation::Async(_) => Err(Fault::assertion("expected a sync callback")),
                }
            })
            .build(),
    );
    module.register(
        Member::builder("Calc", "<theory_parent>g__check|0_0")
            .test()
            .sync_body(|_, _| Err(Fault::new("InvalidOperation", "nested failure")))
            .build(),
    );
    let mut modules = ModuleSet::new();
    modules.register(module);

    let record = Coordinator::from_modules(&modules)
        .execute(&mut NullReport)
        .await;

    assert_eq!(record.results[0].case.id, "Calc.<theory_parent>g__check|0_0");
    match &record.results[0].outcome {
        Outcome::Failed(fault) => assert_eq!(fault.kind, "InvalidOperation"),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn round_trip_invokes_every_case_once_in_discovery_order() {
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let mut module = Module::new("m");
    for name in &["first", "second", "third"] {
        let name = *name;
        let log = log.clone();
        module.register(
            Member::builder("Calc", name)
                .test()
                .sync_body(move |_, _| {
                    log.lock().unwrap().push(name);
                    Ok(())
                })
                .build(),
        );
    }
    let mut modules = ModuleSet::new();
    modules.register(module);

    let discovered: Vec<String> = discover::build_cases(modules.load("m").unwrap())
        .into_iter()
        .map(|case| case.id)
        .collect();

    let coordinator = Coordinator::from_modules(&modules);
    let mut recorder = Recorder::default();
    coordinator.report_discovered(&mut recorder);
    assert_eq!(recorder.discovered, discovered);

    let record = coordinator.execute(&mut recorder).await;

    assert_eq!(recorder.finished, discovered);
    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    assert_eq!(record.summary.passed, 3);
}

#[tokio::test]
async fn cancellation_before_dispatch_leaves_no_records() {
    let mut module = Module::new("m");
    for name in vec!["first", "second"] {
        module.register(Member::builder("Calc", name).test().build());
    }
    let mut modules = ModuleSet::new();
    modules.register(module);

    let coordinator = Coordinator::from_modules(&modules);
    coordinator.cancel_signal().cancel();
    let record = coordinator.execute(&mut NullReport).await;

    assert!(record.results.is_empty());
    assert_eq!(record.summary.not_run, 2);
    assert_eq!(record.state, RunState::Cancelled);
}

#[tokio::test]
async fn cancellation_lets_the_in_flight_case_finish() {
    let cell: Arc<Mutex<Option<CancelSignal>>> = Arc::new(Mutex::new(None));

    let mut module = Module::new("m");
    let signal = cell.clone();
    module.register(
        Member::builder("Calc", "cancels")
            .test()
            .sync_body(move |_, _| {
                if let Some(signal) = &*signal.lock().unwrap() {
                    signal.cancel();
                }
                Ok(())
            })
            .build(),
    );
    module.register(Member::builder("Calc", "never_runs").test().build());
    let mut modules = ModuleSet::new();
    modules.register(module);

    let coordinator = Coordinator::from_modules(&modules);
    *cell.lock().unwrap() = Some(coordinator.cancel_signal());
    let record = coordinator.execute(&mut NullReport).await;

    // The cancelling case ran to completion; the next never started.
    assert_eq!(record.results.len(), 1);
    assert_eq!(record.results[0].outcome, Outcome::Passed);
    assert_eq!(record.summary.not_run, 1);
    assert_eq!(record.state, RunState::Cancelled);
}

#[tokio::test]
async fn unloadable_source_is_isolated_from_the_others() {
    let mut module = Module::new("good");
    module.register(Member::builder("Calc", "adds").test().build());
    let mut modules = ModuleSet::new();
    modules.register(module);

    let (coordinator, failures) = Coordinator::from_sources(
        &modules,
        &["missing".to_string(), "good".to_string()],
    );

    assert_eq!(failures.len(), 1);
    let record = coordinator.execute(&mut NullReport).await;
    assert_eq!(record.summary.passed, 1);
}

#[tokio::test]
async fn instance_members_get_a_fresh_instance_per_invocation() {
    struct Calc {
        seen: usize,
    }

    let mut module = Module::new("m");
    for name in vec!["first", "second"] {
        module.register(
            Member::builder("Calc", name)
                .test()
                .constructor(|| Calc { seen: 0 })
                .sync_body(|inst, _| {
                    let mut calc = inst
                        .and_then(|v| v.downcast::<Calc>().ok())
                        .ok_or_else(|| Fault::assertion("instance missing"))?;
                    // A reused instance would carry a non-zero count.
                    if calc.seen != 0 {
                        return Err(Fault::assertion("instance was shared across tests"));
                    }
                    calc.seen += 1;
                    Ok(())
                })
                .build(),
        );
    }
    let mut modules = ModuleSet::new();
    modules.register(module);

    let record = Coordinator::from_modules(&modules)
        .execute(&mut NullReport)
        .await;

    assert_eq!(record.summary.passed, 2);
}
