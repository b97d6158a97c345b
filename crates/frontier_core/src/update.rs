use std::collections::HashSet;

use crate::{Accumulators, BackoffSignal, CrawlError, Effect, Outcome, Task};

/// Pure transition: applies a task outcome to the accumulators and returns the
/// effects the worker must carry out.
///
/// Every retryable failure leads to re-queued work. Unauthorized halts the run
/// and touches no state.
pub fn update(state: &mut Accumulators, outcome: Outcome) -> Vec<Effect> {
    match outcome {
        Outcome::Collected { doc, result } => match result {
            Ok(step) if step.is_stalled(&doc) => {
                vec![Effect::CoolDown, Effect::Enqueue(Task::Collect { doc })]
            }
            Ok(step) => {
                state.classify(&step.events);
                vec![
                    Effect::Enqueue(Task::Collect { doc: step.next }),
                    Effect::Backoff(BackoffSignal::Success),
                ]
            }
            Err(err) => retry(err, Task::Collect { doc }),
        },
        Outcome::Extracted { ids, result } => match result {
            Ok(features) => {
                let acknowledged: HashSet<&str> =
                    features.iter().map(|feature| feature.id.as_str()).collect();
                let missing: Vec<String> = ids
                    .iter()
                    .filter(|id| !acknowledged.contains(id.as_str()))
                    .cloned()
                    .collect();

                state.mark_extracted(acknowledged.iter().copied());
                state.push_features(features);

                let mut effects = Vec::with_capacity(2);
                if !missing.is_empty() {
                    effects.push(Effect::Warn(CrawlError::PartialBatchFailure {
                        missing: missing.len(),
                        batch: ids.len(),
                    }));
                    state.requeue_extract(missing);
                }
                effects.push(Effect::Backoff(BackoffSignal::Success));
                effects
            }
            Err(err) => retry(err, Task::Extract { ids }),
        },
        Outcome::Saved { features, result } => match result {
            Ok(()) => {
                state.record_saved(features.len());
                vec![Effect::Backoff(BackoffSignal::Success)]
            }
            Err(err) if err.is_fatal() => vec![Effect::Halt(err)],
            Err(err) => {
                state.requeue_save(features.clone());
                retry(err, Task::Save { features })
            }
        },
        Outcome::Deleted { ids, result } => match result {
            Ok(()) => {
                state.record_deleted(ids.len());
                vec![Effect::Backoff(BackoffSignal::Success)]
            }
            Err(err) if err.is_fatal() => vec![Effect::Halt(err)],
            Err(err) => {
                state.requeue_delete(ids.iter().cloned());
                retry(err, Task::Delete { ids })
            }
        },
    }
}

fn retry(err: CrawlError, task: Task) -> Vec<Effect> {
    if err.is_fatal() {
        return vec![Effect::Halt(err)];
    }
    vec![
        Effect::Warn(err),
        Effect::Backoff(BackoffSignal::Failure),
        Effect::Enqueue(task),
    ]
}
