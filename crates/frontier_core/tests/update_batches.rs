use frontier_core::{
    update, Accumulators, BackoffSignal, CrawlError, Effect, Feature, ImageEvent, Outcome, Task,
    BATCH_SIZE,
};
use pretty_assertions::assert_eq;

fn ids(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}{i}")).collect()
}

fn feature_for(id: &str) -> Feature {
    Feature::new(id, id.len() as i64)
}

#[test]
fn partial_extract_requeues_only_missing_ids() {
    let mut acc = Accumulators::new();
    let all = ids("img", BATCH_SIZE + 1);
    acc.classify(&all.iter().map(ImageEvent::add).collect::<Vec<_>>());

    let batch = acc.drain_extract_batch().expect("batch of 50");
    assert_eq!(acc.snapshot().pending_extract, 1);

    let features: Vec<Feature> = batch[..48].iter().map(|id| feature_for(id)).collect();
    let effects = update(
        &mut acc,
        Outcome::Extracted {
            ids: batch.clone(),
            result: Ok(features.clone()),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::Warn(CrawlError::PartialBatchFailure {
                missing: 2,
                batch: BATCH_SIZE,
            }),
            Effect::Backoff(BackoffSignal::Success),
        ]
    );
    let snap = acc.snapshot();
    assert_eq!(snap.total_extracted, 48);
    assert_eq!(snap.pending_extract, 3);
    assert_eq!(snap.pending_save, 48);
    for id in &batch[48..] {
        assert!(acc.is_pending_extract(id));
    }
    let pending: Vec<_> = acc.pending_save().cloned().collect();
    assert_eq!(pending, features);
}

#[test]
fn full_extract_acknowledgement_only_shrinks_backoff() {
    let mut acc = Accumulators::new();
    let batch = ids("img", 3);
    let effects = update(
        &mut acc,
        Outcome::Extracted {
            ids: batch.clone(),
            result: Ok(batch.iter().map(|id| feature_for(id)).collect()),
        },
    );
    assert_eq!(effects, vec![Effect::Backoff(BackoffSignal::Success)]);
    assert_eq!(acc.snapshot().total_extracted, 3);
}

#[test]
fn failed_extract_call_retries_whole_batch_as_a_task() {
    let mut acc = Accumulators::new();
    let batch = ids("img", BATCH_SIZE);
    let err = CrawlError::Transient("connection reset".into());
    let effects = update(
        &mut acc,
        Outcome::Extracted {
            ids: batch.clone(),
            result: Err(err.clone()),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::Warn(err),
            Effect::Backoff(BackoffSignal::Failure),
            Effect::Enqueue(Task::Extract { ids: batch }),
        ]
    );
    assert_eq!(acc.snapshot().pending_extract, 0);
}

#[test]
fn rejected_save_goes_back_to_front_and_is_retried() {
    let mut acc = Accumulators::new();
    acc.push_features((0..BATCH_SIZE + 5).map(|i| Feature::new(format!("f{i}"), i as i64)));
    let batch = acc.drain_save_batch().expect("save batch");

    let effects = update(
        &mut acc,
        Outcome::Saved {
            features: batch.clone(),
            result: Err(CrawlError::Rejected { status: 503 }),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::Warn(CrawlError::Rejected { status: 503 }),
            Effect::Backoff(BackoffSignal::Failure),
            Effect::Enqueue(Task::Save {
                features: batch.clone()
            }),
        ]
    );
    let front: Vec<_> = acc.pending_save().take(BATCH_SIZE).cloned().collect();
    assert_eq!(front, batch);
    assert_eq!(acc.snapshot().pending_save, BATCH_SIZE + 5);
}

#[test]
fn successful_save_and_delete_are_counted() {
    let mut acc = Accumulators::new();
    let features = vec![Feature::new("a", 1), Feature::new("b", 2)];
    let effects = update(
        &mut acc,
        Outcome::Saved {
            features,
            result: Ok(()),
        },
    );
    assert_eq!(effects, vec![Effect::Backoff(BackoffSignal::Success)]);

    update(
        &mut acc,
        Outcome::Deleted {
            ids: ids("d", 3),
            result: Ok(()),
        },
    );
    let snap = acc.snapshot();
    assert_eq!(snap.saved, 2);
    assert_eq!(snap.deleted, 3);
}

#[test]
fn failed_delete_is_requeued_and_retried() {
    let mut acc = Accumulators::new();
    let batch = ids("d", 4);
    let err = CrawlError::Transient("timed out".into());
    let effects = update(
        &mut acc,
        Outcome::Deleted {
            ids: batch.clone(),
            result: Err(err.clone()),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::Warn(err),
            Effect::Backoff(BackoffSignal::Failure),
            Effect::Enqueue(Task::Delete { ids: batch.clone() }),
        ]
    );
    for id in &batch {
        assert!(acc.is_pending_delete(id));
    }
}

#[test]
fn unauthorized_batches_halt_and_leave_state_untouched() {
    let mut acc = Accumulators::new();
    let features = vec![Feature::new("a", 1)];
    let outcomes = vec![
        Outcome::Extracted {
            ids: ids("x", 2),
            result: Err(CrawlError::Unauthorized),
        },
        Outcome::Saved {
            features,
            result: Err(CrawlError::Unauthorized),
        },
        Outcome::Deleted {
            ids: ids("d", 2),
            result: Err(CrawlError::Unauthorized),
        },
    ];
    for outcome in outcomes {
        assert_eq!(
            update(&mut acc, outcome),
            vec![Effect::Halt(CrawlError::Unauthorized)]
        );
    }
    let snap = acc.snapshot();
    assert_eq!(snap.pending_save, 0);
    assert_eq!(snap.pending_delete, 0);
    assert_eq!(snap.pending_extract, 0);
}
