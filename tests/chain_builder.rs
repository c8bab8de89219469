// tests/chain_builder.rs

use std::sync::Arc;

use workchain::chain::Chain;
use workchain::errors::WorkchainError;
use workchain::types::Constraint;
use workchain::work::{WorkUnitSpec, WorkUnit};
use workchain::workers::{image_pipeline, KEY_IMAGE_URI, KIND_BLUR, KIND_CLEANUP, KIND_SAVE};

fn kinds(chain: &Chain) -> Vec<String> {
    chain
        .units()
        .iter()
        .map(|u| u.kind().to_string())
        .collect()
}

#[test]
fn then_returns_new_chain_and_leaves_original_untouched() {
    let base = Chain::begin(WorkUnitSpec::new("a"));
    let extended = base.then(WorkUnitSpec::new("b"));

    assert_eq!(base.len(), 1);
    assert_eq!(extended.len(), 2);
    assert_eq!(kinds(&base), vec!["a"]);
    assert_eq!(kinds(&extended), vec!["a", "b"]);
}

#[test]
fn branches_share_their_common_prefix() {
    let base = Chain::begin(WorkUnitSpec::new("a")).then(WorkUnitSpec::new("b"));
    let left = base.then(WorkUnitSpec::new("left"));
    let right = base.then(WorkUnitSpec::new("right"));

    let l = left.units();
    let r = right.units();

    assert!(Arc::ptr_eq(&l[0], &r[0]));
    assert!(Arc::ptr_eq(&l[1], &r[1]));
    assert_eq!(l[0].id(), r[0].id());
    assert_ne!(l[2].id(), r[2].id());
    assert_eq!(kinds(&left), vec!["a", "b", "left"]);
    assert_eq!(kinds(&right), vec!["a", "b", "right"]);
}

#[test]
fn head_and_last_point_at_the_ends() {
    let chain = Chain::begin(WorkUnitSpec::new("first"))
        .then(WorkUnitSpec::new("middle"))
        .then(WorkUnitSpec::new("last"));

    assert_eq!(chain.head().kind().as_str(), "first");
    assert_eq!(chain.last().kind().as_str(), "last");
    assert!(!chain.is_empty());
}

#[test]
fn every_unit_gets_a_distinct_id() {
    let chain = Chain::begin(WorkUnitSpec::new("x"))
        .then(WorkUnitSpec::new("x"))
        .then(WorkUnitSpec::new("x"));

    let mut ids: Vec<_> = chain.units().iter().map(|u| u.id()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[test]
fn prebuilt_units_keep_their_id() {
    let unit: WorkUnit = WorkUnitSpec::new("a").tag("t").build();
    let id = unit.id();

    let chain = Chain::begin(unit);
    assert_eq!(chain.head().id(), id);
    assert!(chain.head().has_tag("t"));
}

#[test]
fn from_specs_rejects_empty_input() {
    let result = Chain::from_specs(Vec::new());
    match result {
        Err(WorkchainError::EmptyChain) => {}
        Err(e) => panic!("Expected EmptyChain, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn from_specs_preserves_order() {
    let chain = Chain::from_specs(vec![
        WorkUnitSpec::new("one"),
        WorkUnitSpec::new("two"),
        WorkUnitSpec::new("three"),
    ])
    .unwrap();

    assert_eq!(kinds(&chain), vec!["one", "two", "three"]);
}

#[test]
fn image_pipeline_layout() {
    let chain = image_pipeline("img://cat", 3);
    let units = chain.units();

    assert_eq!(
        kinds(&chain),
        vec![KIND_CLEANUP, KIND_BLUR, KIND_BLUR, KIND_BLUR, KIND_SAVE]
    );

    // Only the first blur carries the URI; later passes get it upstream.
    assert_eq!(units[1].input().get_str(KEY_IMAGE_URI), Some("img://cat"));
    assert!(units[2].input().is_empty());
    assert!(units[3].input().is_empty());

    assert!(units[1..4].iter().all(|u| u.has_tag("progress")));
    assert!(units[4].has_tag("output"));
    assert!(units[4].constraints().contains(&Constraint::Charging));
    assert!(units[0].constraints().is_empty());
}

#[test]
fn image_pipeline_without_blur_is_cleanup_then_save() {
    let chain = image_pipeline("img://cat", 0);
    assert_eq!(kinds(&chain), vec![KIND_CLEANUP, KIND_SAVE]);
}
