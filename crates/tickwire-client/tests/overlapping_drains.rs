//! Drain attempts from different threads sharing one inbound buffer.

#![cfg(not(target_arch = "wasm32"))]

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use tickwire_client::application::{DrainAttempt, DrainOutcome};
use tickwire_client::infrastructure::transport::mock::MockTransport;
use tickwire_core::InboundBuffer;

/// Runs one drain attempt per scripted frame on its own thread.
fn drain_all(
    transport: Arc<MockTransport>,
    inbox: Arc<InboundBuffer>,
    frames: usize,
    start: Arc<Barrier>,
) -> thread::JoinHandle<usize> {
    thread::spawn(move || {
        start.wait();
        let mut appended = 0;
        for _ in 0..frames {
            let attempt = DrainAttempt::starting_now(Duration::from_secs(1));
            if matches!(attempt.run(transport.as_ref(), &inbox), DrainOutcome::Appended) {
                appended += 1;
            }
        }
        appended
    })
}

#[test]
fn test_overlapping_drains_of_five_and_seven_make_twelve() {
    // Arrange
    let five = Arc::new(MockTransport::new());
    let seven = Arc::new(MockTransport::new());
    for i in 0..5 {
        five.push_frame(format!("a{i}"));
    }
    for i in 0..7 {
        seven.push_frame(format!("b{i}"));
    }
    let inbox = Arc::new(InboundBuffer::default());
    let start = Arc::new(Barrier::new(2));

    // Act
    let a = drain_all(five, Arc::clone(&inbox), 5, Arc::clone(&start));
    let b = drain_all(seven, Arc::clone(&inbox), 7, start);
    let appended = a.join().unwrap() + b.join().unwrap();

    // Assert: nothing lost, nothing duplicated, each drain's order kept
    let lines = inbox.snapshot();
    assert_eq!(appended, 12);
    assert_eq!(lines.len(), 12);
    let mut sorted = lines.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), 12);

    let from_a: Vec<String> = lines.iter().filter(|l| l.starts_with('a')).cloned().collect();
    let from_b: Vec<String> = lines.iter().filter(|l| l.starts_with('b')).cloned().collect();
    assert_eq!(from_a, (0..5).map(|i| format!("a{i}")).collect::<Vec<_>>());
    assert_eq!(from_b, (0..7).map(|i| format!("b{i}")).collect::<Vec<_>>());
}

#[test]
fn test_drains_stop_at_the_bound() {
    // Arrange: 30 frames waiting, a 25-line buffer
    let transport = Arc::new(MockTransport::new());
    for i in 1..=30 {
        transport.push_frame(i.to_string());
    }
    let inbox = InboundBuffer::default();

    // Act
    let mut outcomes = Vec::new();
    for _ in 0..30 {
        let attempt = DrainAttempt::starting_now(Duration::from_secs(1));
        outcomes.push(attempt.run(transport.as_ref(), &inbox));
    }

    // Assert: the last five attempts never read
    let expected: Vec<String> = (1..=25).map(|i| i.to_string()).collect();
    assert_eq!(inbox.snapshot(), expected);
    assert!(outcomes[25..].iter().all(|o| matches!(o, DrainOutcome::AtCapacity)));
    assert_eq!(transport.receive_calls.load(std::sync::atomic::Ordering::SeqCst), 25);
}
