//! Integration tests for the record pipeline
//!
//! These tests drive the public API end to end:
//! - logger dispatch through handlers into sinks
//! - pattern and JSON formatting of real records
//! - scoped attribute frames
//! - error isolation between handlers

use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use umbralog::{
    attributes, severity, AttributeList, AttributePack, BlockingHandler, Error, JsonFormatter,
    Logger, MemorySink, OptionalOption, Options, PatternFormatter, PlaceholderOption, Result,
    Sink,
};

fn pattern_logger(pattern: &str) -> (Logger, MemorySink) {
    let sink = MemorySink::new();
    let formatter = PatternFormatter::new(pattern).expect("pattern compiles");
    let logger = Logger::builder()
        .handler(BlockingHandler::new(formatter).sink(sink.clone()))
        .build();
    (logger, sink)
}

#[test]
fn test_pattern_pipeline() {
    let (logger, sink) = pattern_logger("{severity:d}: {message}");

    logger.log(severity::INFO, "server started");
    logger.log(severity::ERROR, "connection lost");

    assert_eq!(sink.strings(), vec!["2: server started", "4: connection lost"]);
}

#[test]
fn test_threshold_filters_low_severities() {
    let sink = MemorySink::new();
    let formatter = PatternFormatter::new("{message}").unwrap();
    let logger = Logger::builder()
        .threshold(severity::WARN)
        .handler(BlockingHandler::new(formatter).sink(sink.clone()))
        .build();

    logger.log(severity::TRACE, "trace message");
    logger.log(severity::DEBUG, "debug message");
    logger.log(severity::INFO, "info message");
    logger.log(severity::WARN, "warn message");
    logger.log(severity::ERROR, "error message");
    logger.log(severity::FATAL, "fatal message");

    assert_eq!(
        sink.strings(),
        vec!["warn message", "error message", "fatal message"]
    );
}

#[test]
fn test_json_pipeline_output_parses() {
    let sink = MemorySink::new();
    let formatter = JsonFormatter::builder().newline().build().unwrap();
    let logger = Logger::builder()
        .handler(BlockingHandler::new(formatter).sink(sink.clone()))
        .build();

    let attributes = attributes!["key" => 42, "ip" => "[::]"];
    let mut pack = AttributePack::new();
    pack.push(&attributes);
    logger.log_with(severity::ERROR, "fatal error, please try again", &pack);

    let lines = sink.strings();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with('\n'));

    let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(parsed["message"], "fatal error, please try again");
    assert_eq!(parsed["severity"], severity::ERROR);
    assert_eq!(parsed["process"].as_u64(), Some(std::process::id() as u64));
    assert!(parsed["timestamp"].is_i64());
    assert!(parsed["thread"].is_u64());
    assert_eq!(parsed["key"], 42);
    assert_eq!(parsed["ip"], "[::]");
}

#[test]
fn test_json_routing_end_to_end() {
    let sink = MemorySink::new();
    let formatter = JsonFormatter::builder()
        .route_attributes("/fields", &["message", "severity"])
        .rename("message", "#message")
        .build()
        .unwrap();
    let logger = Logger::builder()
        .handler(BlockingHandler::new(formatter).sink(sink.clone()))
        .build();

    logger.log(severity::INFO, "routed");

    let parsed: serde_json::Value = serde_json::from_str(&sink.strings()[0]).unwrap();
    assert_eq!(parsed["fields"]["#message"], "routed");
    assert_eq!(parsed["fields"]["severity"], severity::INFO);
    assert!(parsed.get("message").is_none());
}

#[test]
fn test_scoped_attributes_innermost_wins() {
    let (logger, sink) = pattern_logger("{depth}");

    {
        let _outer = logger.scoped(AttributeList::new().with("depth", 1));
        logger.log(severity::INFO, "outer");

        {
            let _inner = logger.scoped(AttributeList::new().with("depth", 2));
            logger.log(severity::INFO, "inner");
        }

        logger.log(severity::INFO, "outer again");
    }

    assert_eq!(sink.strings(), vec!["1", "2", "1"]);
}

#[test]
fn test_scoped_attributes_feed_the_leftover_placeholder() {
    let (logger, sink) = pattern_logger("{...}");

    let _scope = logger.scoped(AttributeList::new().with("request_id", "abc-123"));
    let attributes = attributes!["status" => 200];
    let mut pack = AttributePack::new();
    pack.push(&attributes);
    logger.log_with(severity::INFO, "finished", &pack);

    // Caller attributes enter the pack before scoped frames; the leftover
    // placeholder emits in reverse, so the scoped attribute comes first.
    assert_eq!(sink.strings(), vec!["\"request_id\": abc-123, \"status\": 200"]);
}

#[test]
fn test_missing_attribute_drops_the_record_silently() {
    let (logger, sink) = pattern_logger("{missing}");

    logger.log(severity::INFO, "never rendered");

    assert!(sink.is_empty());
}

#[test]
fn test_optional_placeholder_end_to_end() {
    let sink = MemorySink::new();
    let options = Options::from([(
        "id".to_string(),
        PlaceholderOption::Optional(OptionalOption::new("[", "]")),
    )]);
    let formatter = PatternFormatter::with_options("{id}", options).unwrap();
    let logger = Logger::builder()
        .handler(BlockingHandler::new(formatter).sink(sink.clone()))
        .build();

    logger.log(severity::INFO, "no id attached");

    let attributes = attributes!["id" => 42];
    let mut pack = AttributePack::new();
    pack.push(&attributes);
    logger.log_with(severity::INFO, "id attached", &pack);

    assert_eq!(sink.strings(), vec!["", "[42]"]);
}

#[test]
fn test_multiple_sinks_receive_in_order() {
    let first = MemorySink::new();
    let second = MemorySink::new();
    let formatter = PatternFormatter::new("{message}").unwrap();
    let logger = Logger::builder()
        .handler(
            BlockingHandler::new(formatter)
                .sink(first.clone())
                .sink(second.clone()),
        )
        .build();

    logger.log(severity::INFO, "fan out");

    assert_eq!(first.strings(), vec!["fan out"]);
    assert_eq!(second.strings(), vec!["fan out"]);
}

#[test]
fn test_failing_sink_does_not_stop_other_handlers() {
    struct FailingSink;

    impl Sink for FailingSink {
        fn emit(&mut self, _bytes: &[u8]) -> Result<()> {
            Err(Error::from(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "simulated failure",
            )))
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    let sink = MemorySink::new();
    let failing = PatternFormatter::new("{message}").unwrap();
    let healthy = PatternFormatter::new("{message}").unwrap();
    let logger = Logger::builder()
        .handler(BlockingHandler::new(failing).sink(FailingSink))
        .handler(BlockingHandler::new(healthy).sink(sink.clone()))
        .build();

    logger.log(severity::INFO, "survives");

    assert_eq!(sink.strings(), vec!["survives"]);
}

#[test]
fn test_file_sink_pipeline() {
    let temp_dir = TempDir::new().expect("temp dir");
    let log_file = temp_dir.path().join("pipeline.log");

    {
        let formatter = PatternFormatter::new("{severity:d} {message}").unwrap();
        let sink = umbralog::FileSink::new(&log_file).expect("file sink");
        let logger = Logger::builder()
            .handler(BlockingHandler::new(formatter).sink(sink))
            .build();

        for i in 0..10 {
            umbralog::log!(logger, severity::INFO, "message {}", i);
        }
        // Logger drops here; the file sink flushes on drop
    }

    let content = fs::read_to_string(&log_file).expect("log file readable");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 10);
    assert_eq!(lines[0], "2 message 0");
    assert_eq!(lines[9], "2 message 9");
}

#[test]
fn test_format_callback_interpolates_lazily() {
    let (logger, sink) = pattern_logger("{message}");
    logger.filter(|record| record.severity() >= severity::WARN);

    let formatted = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let observed = Arc::clone(&formatted);

    let pack = AttributePack::new();
    logger.log_fmt(severity::INFO, "GET {url}", &pack, &|writer| {
        use std::fmt::Write as _;
        observed.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let _ = write!(writer, "GET /index.html");
    });

    // Filtered out before the callback runs
    assert_eq!(formatted.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert!(sink.is_empty());

    logger.log_fmt(severity::ERROR, "GET {url}", &pack, &|writer| {
        use std::fmt::Write as _;
        let _ = write!(writer, "GET /index.html");
    });

    assert_eq!(sink.strings(), vec!["GET /index.html"]);
}
