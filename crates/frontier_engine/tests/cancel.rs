use std::time::{Duration, Instant};

use frontier_engine::CancelToken;

#[test]
fn child_sees_parent_cancellation_but_not_the_reverse() {
    let root = CancelToken::new();
    let child = root.child();
    let grandchild = child.child();

    child.cancel();
    assert!(child.is_cancelled());
    assert!(grandchild.is_cancelled());
    assert!(!root.is_cancelled());

    let sibling = root.child();
    assert!(!sibling.is_cancelled());
    root.cancel();
    assert!(sibling.is_cancelled());
}

#[test]
fn sleep_runs_to_completion_when_not_cancelled() {
    let token = CancelToken::new();
    let started = Instant::now();
    assert!(token.sleep(Duration::from_millis(30)));
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[test]
fn sleep_returns_early_once_cancelled() {
    let token = CancelToken::new();
    let remote = token.clone();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(30));
        remote.cancel();
    });

    let started = Instant::now();
    assert!(!token.sleep(Duration::from_secs(10)));
    assert!(started.elapsed() < Duration::from_secs(5));
    canceller.join().unwrap();
}
