//! Integration tests for the inbound buffer under concurrent writers.
//!
//! The buffer is written by whichever thread receives a frame (background
//! receiver, overlapping per-tick drain attempts, host callbacks) while the
//! render loop reads snapshots.  These tests hammer it from several threads
//! and check that the capacity bound and per-writer ordering always hold.

use std::sync::{Arc, Barrier};
use std::thread;

use tickwire_core::{InboundBuffer, OverflowPolicy};

/// Spawns one thread per `(tag, count)` pair, all released at once, each
/// pushing `"<tag>-<i>"` for `i` in `0..count`.
fn concurrent_writers(buffer: &Arc<InboundBuffer>, writers: &[(&'static str, usize)]) {
    let barrier = Arc::new(Barrier::new(writers.len()));
    let handles: Vec<_> = writers
        .iter()
        .map(|&(tag, count)| {
            let buffer = Arc::clone(buffer);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..count {
                    buffer.push(format!("{tag}-{i}"));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("writer thread panicked");
    }
}

#[test]
fn test_two_overlapping_writers_lose_nothing() {
    // Arrange: capacity comfortably above 5 + 7
    let buffer = Arc::new(InboundBuffer::with_capacity(25));

    // Act
    concurrent_writers(&buffer, &[("a", 5), ("b", 7)]);

    // Assert: every line present exactly once
    let mut lines = buffer.snapshot();
    assert_eq!(lines.len(), 12);
    lines.sort();
    lines.dedup();
    assert_eq!(lines.len(), 12, "no line may be duplicated");
    for i in 0..5 {
        assert!(lines.contains(&format!("a-{i}")));
    }
    for i in 0..7 {
        assert!(lines.contains(&format!("b-{i}")));
    }
}

#[test]
fn test_each_writer_keeps_its_own_order() {
    let buffer = Arc::new(InboundBuffer::with_capacity(1000));

    concurrent_writers(&buffer, &[("a", 200), ("b", 200), ("c", 200)]);

    let lines = buffer.snapshot();
    for tag in ["a", "b", "c"] {
        let mine: Vec<usize> = lines
            .iter()
            .filter_map(|l| l.strip_prefix(&format!("{tag}-")))
            .map(|n| n.parse().expect("numeric suffix"))
            .collect();
        assert_eq!(mine, (0..200).collect::<Vec<_>>(), "writer {tag} reordered");
    }
}

#[test]
fn test_capacity_holds_under_contention() {
    // Arrange: far more writes than room
    let buffer = Arc::new(InboundBuffer::with_capacity(25));

    // Act
    concurrent_writers(&buffer, &[("a", 100), ("b", 100), ("c", 100), ("d", 100)]);

    // Assert
    assert_eq!(buffer.len(), 25);
    assert_eq!(buffer.dropped(), 375);
}

#[test]
fn test_sliding_window_holds_under_contention() {
    let buffer = Arc::new(InboundBuffer::new(10, OverflowPolicy::EvictOldest));

    concurrent_writers(&buffer, &[("a", 50), ("b", 50)]);

    assert_eq!(buffer.len(), 10);
    assert_eq!(buffer.evicted(), 90);
    assert_eq!(buffer.dropped(), 0);
}
