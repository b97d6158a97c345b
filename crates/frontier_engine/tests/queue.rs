use std::thread;
use std::time::Duration;

use frontier_core::{DocumentRef, Task};
use frontier_engine::{CancelToken, TaskQueue};

fn collect(id: &str) -> Task {
    Task::Collect {
        doc: DocumentRef::new("sport", id),
    }
}

#[test]
fn offer_keeps_the_reserve_free() {
    let queue = TaskQueue::bounded(4);
    assert!(queue.offer(collect("a"), 2).is_ok());
    assert!(queue.offer(collect("b"), 2).is_ok());
    let refused = queue.offer(collect("c"), 2).unwrap_err();
    assert_eq!(refused, collect("c"));
    assert_eq!(queue.len(), 2);

    assert!(queue.offer(collect("c"), 0).is_ok());
    assert!(queue.offer(collect("d"), 0).is_ok());
    assert!(queue.is_full());
    assert!(queue.offer(collect("e"), 0).is_err());
}

#[test]
fn push_waits_for_a_free_slot() {
    let queue = TaskQueue::bounded(2);
    let cancel = CancelToken::new();
    queue.push(collect("a"), &cancel).unwrap();
    queue.push(collect("b"), &cancel).unwrap();

    let producer = {
        let queue = queue.clone();
        let cancel = cancel.clone();
        thread::spawn(move || queue.push(collect("c"), &cancel))
    };
    thread::sleep(Duration::from_millis(80));
    assert!(!producer.is_finished());

    assert_eq!(queue.pop(&cancel), Some(collect("a")));
    assert!(producer.join().unwrap().is_ok());
    assert_eq!(queue.drain(), vec![collect("b"), collect("c")]);
}

#[test]
fn push_hands_the_task_back_when_cancelled() {
    let queue = TaskQueue::bounded(2);
    let cancel = CancelToken::new();
    queue.push(collect("a"), &cancel).unwrap();
    queue.push(collect("b"), &cancel).unwrap();

    let producer = {
        let queue = queue.clone();
        let cancel = cancel.clone();
        thread::spawn(move || queue.push(collect("c"), &cancel))
    };
    cancel.cancel();
    assert_eq!(producer.join().unwrap(), Err(collect("c")));
    assert_eq!(queue.len(), 2);
}

#[test]
fn pop_returns_none_once_cancelled() {
    let queue = TaskQueue::bounded(2);
    let cancel = CancelToken::new();

    let consumer = {
        let queue = queue.clone();
        let cancel = cancel.clone();
        thread::spawn(move || queue.pop(&cancel))
    };
    thread::sleep(Duration::from_millis(20));
    cancel.cancel();
    assert_eq!(consumer.join().unwrap(), None);
}

#[test]
fn many_consumers_share_one_queue() {
    let queue = TaskQueue::bounded(8);
    let cancel = CancelToken::new();
    for i in 0..8 {
        queue.push(collect(&i.to_string()), &cancel).unwrap();
    }

    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let queue = queue.clone();
            let cancel = cancel.clone();
            thread::spawn(move || {
                let mut taken = 0;
                while queue.pop(&cancel).is_some() {
                    taken += 1;
                    if queue.is_empty() {
                        break;
                    }
                }
                taken
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(100));
    cancel.cancel();
    let total: usize = consumers.into_iter().map(|c| c.join().unwrap()).sum();
    assert_eq!(total, 8);
}
