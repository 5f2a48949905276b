//! Stress tests for concurrent dispatch
//!
//! The logger promises N * K handler invocations for N threads logging K
//! records each, with no torn records and no serialization of handlers.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use umbralog::{
    severity, AttributeList, BlockingHandler, Handler, Logger, MemorySink, PatternFormatter,
    Record, Result,
};

const THREADS: usize = 8;
const MESSAGES: usize = 100;

struct Counting {
    hits: Arc<AtomicUsize>,
}

impl Handler for Counting {
    fn execute(&self, _record: &Record<'_>) -> Result<()> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_concurrent_dispatch_invokes_every_handler_once_per_record() {
    let hits = Arc::new(AtomicUsize::new(0));
    let logger = Arc::new(
        Logger::builder()
            .handler(Counting {
                hits: Arc::clone(&hits),
            })
            .build(),
    );

    let mut handles = Vec::new();
    for _ in 0..THREADS {
        let logger = Arc::clone(&logger);
        handles.push(thread::spawn(move || {
            for i in 0..MESSAGES {
                logger.log(severity::INFO, &format!("message {}", i));
            }
        }));
    }

    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(hits.load(Ordering::SeqCst), THREADS * MESSAGES);
}

#[test]
fn test_no_torn_records_under_concurrency() {
    let sink = MemorySink::new();
    let formatter = PatternFormatter::new("{message}").unwrap();
    let logger = Arc::new(
        Logger::builder()
            .handler(BlockingHandler::new(formatter).sink(sink.clone()))
            .build(),
    );

    let (sender, receiver) = crossbeam_channel::unbounded::<String>();

    let mut handles = Vec::new();
    for t in 0..THREADS {
        let logger = Arc::clone(&logger);
        let sender = sender.clone();
        handles.push(thread::spawn(move || {
            for i in 0..MESSAGES {
                let line = format!("thread {} message {}", t, i);
                logger.log(severity::INFO, &line);
                sender.send(line).expect("channel open");
            }
        }));
    }
    drop(sender);

    for handle in handles {
        handle.join().expect("thread panicked");
    }

    let expected: HashSet<String> = receiver.iter().collect();
    let emitted: HashSet<String> = sink.strings().into_iter().collect();

    assert_eq!(sink.len(), THREADS * MESSAGES);
    assert_eq!(emitted, expected);
}

#[test]
fn test_filter_swaps_under_load_keep_the_logger_healthy() {
    let hits = Arc::new(AtomicUsize::new(0));
    let logger = Arc::new(
        Logger::builder()
            .handler(Counting {
                hits: Arc::clone(&hits),
            })
            .build(),
    );

    let writer = {
        let logger = Arc::clone(&logger);
        thread::spawn(move || {
            for i in 0..MESSAGES * 10 {
                logger.log(severity::INFO, &format!("message {}", i));
            }
        })
    };

    for round in 0..200 {
        if round % 2 == 0 {
            logger.filter(|_| false);
        } else {
            logger.filter(|_| true);
        }
    }

    writer.join().expect("writer thread panicked");

    // Every accepted record produced exactly one invocation; after a final
    // accept-all swap the logger still dispatches.
    assert!(hits.load(Ordering::SeqCst) <= MESSAGES * 10);

    logger.filter(|_| true);
    let before = hits.load(Ordering::SeqCst);
    logger.log(severity::INFO, "still alive");
    assert_eq!(hits.load(Ordering::SeqCst), before + 1);
}

#[test]
fn test_scoped_frames_do_not_leak_across_threads() {
    let sink = MemorySink::new();
    let formatter = PatternFormatter::new("{worker}").unwrap();
    let logger = Arc::new(
        Logger::builder()
            .handler(BlockingHandler::new(formatter).sink(sink.clone()))
            .build(),
    );

    let mut handles = Vec::new();
    for t in 0..THREADS {
        let logger = Arc::clone(&logger);
        handles.push(thread::spawn(move || {
            let _scope = logger.scoped(AttributeList::new().with("worker", t as i64));
            for _ in 0..MESSAGES {
                logger.log(severity::INFO, "tick");
            }
        }));
    }

    for handle in handles {
        handle.join().expect("thread panicked");
    }

    let lines = sink.strings();
    assert_eq!(lines.len(), THREADS * MESSAGES);
    for t in 0..THREADS {
        let expected = t.to_string();
        assert_eq!(
            lines.iter().filter(|line| **line == expected).count(),
            MESSAGES,
            "thread {} should see exactly its own scoped attribute",
            t
        );
    }
}
