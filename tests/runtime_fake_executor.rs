// tests/runtime_fake_executor.rs

use std::error::Error;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use workchain::chain::Chain;
use workchain::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use workchain::exec::NoConstraints;
use workchain::scheduler::Scheduler;
use workchain::status::{StatusBus, StatusFilter};
use workchain::types::ExistingChainPolicy;
use workchain::work::{WorkState, WorkUnitSpec};
use workchain_test_utils::fake_executor::{ExecutorLog, FakeExecutor};
use workchain_test_utils::{init_tracing, states};

type TestResult = Result<(), Box<dyn Error>>;

fn simple_chain() -> Chain {
    Chain::begin(WorkUnitSpec::new("a").input("uri", "img://1"))
        .then(WorkUnitSpec::new("b"))
        .then(WorkUnitSpec::new("c"))
}

fn core(exit_when_idle: bool) -> CoreRuntime {
    CoreRuntime::new(
        Scheduler::new(Arc::new(NoConstraints), true),
        RuntimeOptions { exit_when_idle },
    )
}

#[tokio::test]
async fn runtime_with_fake_executor_runs_simple_chain() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let log = ExecutorLog::default();
    let executor = FakeExecutor::new(rt_tx.clone(), log.clone());
    let status = StatusBus::new();

    // Seed the submission before starting the runtime loop.
    rt_tx
        .send(RuntimeEvent::SubmitChain {
            name: "x".to_string(),
            policy: ExistingChainPolicy::Replace,
            chain: simple_chain(),
        })
        .await?;

    let runtime = Runtime::new(
        core(true),
        rt_rx,
        executor,
        status.clone(),
        Duration::from_millis(10),
    );

    // Enforce an upper bound on how long this test may run.
    match timeout(Duration::from_secs(3), runtime.run()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => return Err("runtime did not exit within timeout".into()),
    }

    assert_eq!(log.dispatched_labels(), vec!["x#0/a", "x#1/b", "x#2/c"]);

    let units = status.current(&StatusFilter::Chain("x".to_string()));
    assert_eq!(states(&units), vec![WorkState::Succeeded; 3]);

    // The fake echoes its input, so the URI travels down the whole chain.
    let last = units[2].output.as_ref().ok_or("missing output")?;
    assert_eq!(last.get_str("uri"), Some("img://1"));
    assert_eq!(last.get_str("ran"), Some("c"));

    Ok(())
}

#[tokio::test]
async fn runtime_stops_chain_at_failing_unit() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let log = ExecutorLog::default();
    let executor = FakeExecutor::new(rt_tx.clone(), log.clone()).failing("b");
    let status = StatusBus::new();

    rt_tx
        .send(RuntimeEvent::SubmitChain {
            name: "x".to_string(),
            policy: ExistingChainPolicy::Replace,
            chain: simple_chain(),
        })
        .await?;

    let runtime = Runtime::new(
        core(true),
        rt_rx,
        executor,
        status.clone(),
        Duration::from_millis(10),
    );
    timeout(Duration::from_secs(3), runtime.run()).await??;

    assert_eq!(log.dispatched_labels(), vec!["x#0/a", "x#1/b"]);
    assert_eq!(
        states(&status.current(&StatusFilter::All)),
        vec![WorkState::Succeeded, WorkState::Failed, WorkState::Cancelled]
    );

    Ok(())
}

#[tokio::test]
async fn runtime_exits_on_shutdown_request() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executor = FakeExecutor::new(rt_tx.clone(), ExecutorLog::default());
    let runtime = Runtime::new(
        core(false),
        rt_rx,
        executor,
        StatusBus::new(),
        Duration::from_millis(10),
    );

    rt_tx.send(RuntimeEvent::ShutdownRequested).await?;
    timeout(Duration::from_secs(3), runtime.run()).await??;
    Ok(())
}

#[tokio::test]
async fn runtime_does_not_exit_before_anything_was_submitted() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executor = FakeExecutor::new(rt_tx.clone(), ExecutorLog::default());
    let runtime = Runtime::new(
        core(true),
        rt_rx,
        executor,
        StatusBus::new(),
        Duration::from_millis(5),
    );

    // Several ticks go by with an empty registry; the loop must keep going.
    let result = timeout(Duration::from_millis(100), runtime.run()).await;
    assert!(result.is_err(), "runtime exited while idle before any submission");
    drop(rt_tx);
    Ok(())
}
