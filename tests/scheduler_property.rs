// tests/scheduler_property.rs

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;
use workchain::chain::{Chain, ChainState};
use workchain::engine::UnitOutcome;
use workchain::exec::NoConstraints;
use workchain::scheduler::Scheduler;
use workchain::types::ExistingChainPolicy;
use workchain::work::{UnitId, WorkData, WorkInfo, WorkState, WorkUnitSpec};

// Each chain is a list of "does this unit succeed?" flags.
fn chains_strategy() -> impl Strategy<Value = Vec<Vec<bool>>> {
    proptest::collection::vec(
        proptest::collection::vec(prop::bool::weighted(0.8), 1..6),
        1..5,
    )
}

/// Per-chain shape every snapshot must have: a run of SUCCEEDED units, at
/// most one RUNNING unit, ENQUEUED units after it; or, for a failed chain,
/// SUCCEEDED* FAILED CANCELLED*.
fn assert_chain_shape(units: &[WorkInfo]) {
    let running = units.iter().filter(|u| u.state == WorkState::Running).count();
    assert!(running <= 1, "more than one running unit: {units:?}");

    let mut seen_unfinished = false;
    let mut seen_failure = false;
    for u in units {
        match u.state {
            WorkState::Succeeded => {
                assert!(!seen_unfinished && !seen_failure, "{units:?}");
                assert!(u.output.is_some());
            }
            WorkState::Running | WorkState::Enqueued | WorkState::RequiresConstraints => {
                assert!(!seen_failure, "{units:?}");
                seen_unfinished = true;
                assert!(u.output.is_none());
            }
            WorkState::Failed => {
                assert!(!seen_unfinished && !seen_failure, "{units:?}");
                seen_failure = true;
                assert!(u.output.is_none());
            }
            WorkState::Cancelled => {
                assert!(seen_failure, "{units:?}");
                assert!(u.output.is_none());
            }
        }
    }
}

proptest! {
    #[test]
    fn chains_terminate_in_a_consistent_state(script in chains_strategy()) {
        let mut scheduler = Scheduler::new(Arc::new(NoConstraints), true);
        let mut plan: HashMap<UnitId, bool> = HashMap::new();

        for (i, flags) in script.iter().enumerate() {
            let chain = Chain::from_specs(flags.iter().map(|_| WorkUnitSpec::new("k"))).unwrap();
            for (unit, ok) in chain.units().iter().zip(flags) {
                plan.insert(unit.id(), *ok);
            }
            scheduler.submit(&format!("chain_{i}"), ExistingChainPolicy::Replace, &chain);
        }

        let max_steps = 100;
        let mut steps = 0;
        while !scheduler.is_idle() {
            steps += 1;
            prop_assert!(steps < max_steps, "scheduler did not terminate");

            let step = scheduler.tick();
            prop_assert!(!step.newly_scheduled.is_empty());

            for unit in step.newly_scheduled {
                let outcome = if plan[&unit.unit_id] {
                    UnitOutcome::Success(WorkData::new().with("index", unit.index as i64))
                } else {
                    UnitOutcome::Failed("scripted".to_string())
                };
                scheduler.complete(&unit.chain, unit.run_id, outcome);
            }

            for i in 0..script.len() {
                assert_chain_shape(&scheduler.query(&format!("chain_{i}")));
            }
        }

        for (i, flags) in script.iter().enumerate() {
            let name = format!("chain_{i}");
            let expected = match flags.iter().position(|ok| !ok) {
                None => ChainState::AllSucceeded,
                Some(_) => ChainState::Failed,
            };
            prop_assert_eq!(scheduler.chain_state(&name), Some(expected));

            let units = scheduler.query(&name);
            match flags.iter().position(|ok| !ok) {
                None => prop_assert!(units.iter().all(|u| u.state == WorkState::Succeeded)),
                Some(first_failure) => {
                    prop_assert_eq!(units[first_failure].state, WorkState::Failed);
                    prop_assert!(units[first_failure + 1..].iter().all(|u| u.state == WorkState::Cancelled));
                }
            }
        }
    }

    #[test]
    fn cancel_at_any_point_leaves_nothing_runnable(len in 1usize..6, cancel_after in 0usize..6) {
        let mut scheduler = Scheduler::new(Arc::new(NoConstraints), true);
        let chain = Chain::from_specs((0..len).map(|_| WorkUnitSpec::new("k"))).unwrap();
        scheduler.submit("x", ExistingChainPolicy::Replace, &chain);

        let mut last_running = None;
        for _ in 0..cancel_after.min(len - 1) {
            let step = scheduler.tick();
            if let Some(unit) = step.newly_scheduled.into_iter().next() {
                scheduler.complete(&unit.chain, unit.run_id, UnitOutcome::Success(WorkData::new()));
            }
        }
        if let Some(unit) = scheduler.tick().newly_scheduled.into_iter().next() {
            last_running = Some(unit);
        }

        scheduler.cancel("x");
        prop_assert!(scheduler.is_idle());
        prop_assert!(scheduler.tick().newly_scheduled.is_empty());

        if let Some(unit) = last_running {
            let late = scheduler.complete(&unit.chain, unit.run_id, UnitOutcome::Success(WorkData::new()));
            prop_assert!(!late.changed);
        }

        let units = scheduler.query("x");
        prop_assert!(units.iter().all(|u| matches!(u.state, WorkState::Succeeded | WorkState::Cancelled)));
        prop_assert!(units.iter().any(|u| u.state == WorkState::Cancelled));
    }
}
