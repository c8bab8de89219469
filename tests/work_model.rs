// tests/work_model.rs

use tokio_util::sync::CancellationToken;
use workchain::errors::WorkError;
use workchain::exec::{ConstraintChecker, DeviceState, WorkContext};
use workchain::types::Constraint;
use workchain::work::{UnitId, Value, WorkData, WorkState};

#[test]
fn overlay_prefers_the_upstream_value() {
    let own = WorkData::new().with("uri", "own").with("level", 3i64);
    let upstream = WorkData::new().with("uri", "upstream").with("extra", true);

    let merged = own.overlaid_with(&upstream);

    assert_eq!(merged.get_str("uri"), Some("upstream"));
    assert_eq!(merged.get("level"), Some(&Value::Int(3)));
    assert_eq!(merged.get("extra"), Some(&Value::Bool(true)));
    assert_eq!(merged.len(), 3);
    // Inputs are not mutated.
    assert_eq!(own.get_str("uri"), Some("own"));
}

#[test]
fn work_data_display_is_sorted_and_stable() {
    let data: WorkData = [("b", 2i64), ("a", 1i64)].into_iter().collect();
    assert_eq!(data.to_string(), "{a: 1, b: 2}");
}

#[test]
fn finished_states() {
    let finished: Vec<_> = [
        WorkState::Enqueued,
        WorkState::Running,
        WorkState::RequiresConstraints,
        WorkState::Succeeded,
        WorkState::Failed,
        WorkState::Cancelled,
    ]
    .into_iter()
    .filter(|s| s.is_finished())
    .collect();

    assert_eq!(
        finished,
        vec![WorkState::Succeeded, WorkState::Failed, WorkState::Cancelled]
    );
    assert_eq!(WorkState::RequiresConstraints.to_string(), "REQUIRES_CONSTRAINTS");
}

#[test]
fn device_state_flags_toggle_independently() {
    let device = DeviceState::new().with(Constraint::NetworkConnected, true);

    assert!(device.is_satisfied(Constraint::NetworkConnected));
    assert!(!device.is_satisfied(Constraint::Charging));

    device.set(Constraint::Charging, true);
    assert!(device.is_satisfied(Constraint::Charging));
    assert!(!device.is_satisfied(Constraint::DeviceIdle));

    device.set(Constraint::NetworkConnected, false);
    assert!(!device.get(Constraint::NetworkConnected));
}

#[test]
fn require_str_rejects_missing_and_empty_inputs() {
    let ctx = |input: WorkData| WorkContext::new("x", UnitId::new(), input, CancellationToken::new());

    let ok = ctx(WorkData::new().with("uri", "img://1"));
    assert_eq!(ok.require_str("uri").unwrap(), "img://1");

    let missing = ctx(WorkData::new());
    assert!(matches!(
        missing.require_str("uri"),
        Err(WorkError::InvalidInput(_))
    ));

    let empty = ctx(WorkData::new().with("uri", ""));
    assert!(matches!(
        empty.require_str("uri"),
        Err(WorkError::InvalidInput(_))
    ));

    let wrong_type = ctx(WorkData::new().with("uri", 7i64));
    assert!(wrong_type.require_str("uri").is_err());
}

#[test]
fn stop_token_is_visible_to_the_worker() {
    let token = CancellationToken::new();
    let ctx = WorkContext::new("x", UnitId::new(), WorkData::new(), token.clone());

    assert!(!ctx.is_stopped());
    token.cancel();
    assert!(ctx.is_stopped());
}
