// tests/output_streaming.rs

mod common;
use crate::common::init_tracing;

use regex::Regex;
use tokio::sync::mpsc;

use sheepdog::process::sanitize::{display_form, match_form};
use sheepdog::process::{StreamSinks, stream_lines};
use sheepdog::types::{LogEntry, LogLevel, Status};

fn sinks(
    log_capacity: usize,
    pattern: Option<&str>,
) -> (StreamSinks, mpsc::Receiver<LogEntry>, mpsc::Receiver<Status>) {
    let (log_tx, log_rx) = mpsc::channel(log_capacity);
    let (status_tx, status_rx) = mpsc::channel(4);
    let ready_pattern = pattern.map(|p| Regex::new(p).expect("test pattern is valid"));
    (
        StreamSinks {
            log_tx,
            status_tx,
            ready_pattern,
        },
        log_rx,
        status_rx,
    )
}

fn drain<T>(rx: &mut mpsc::Receiver<T>) -> Vec<T> {
    let mut out = Vec::new();
    while let Ok(item) = rx.try_recv() {
        out.push(item);
    }
    out
}

#[test]
fn display_form_keeps_colours_and_drops_cursor_control() {
    let raw = "\x1b[2K\x1b[1G\x1b[32mok\x1b[0m compiled \x1b[?25l";
    assert_eq!(display_form(raw), "\x1b[32mok\x1b[0m compiled ");
}

#[test]
fn match_form_drops_every_escape_sequence() {
    let raw = "\x1b[2K\x1b[1;31merror\x1b[0m: \x1b]0;title\x07boom\x1b(B";
    assert_eq!(match_form(raw), "error: boom");
}

#[test]
fn plain_lines_pass_through_untouched() {
    let raw = "listening on http://127.0.0.1:8080 [ok]";
    assert_eq!(display_form(raw), raw);
    assert_eq!(match_form(raw), raw);
}

#[tokio::test]
async fn lines_become_log_entries_at_the_stream_level() {
    init_tracing();

    let (sinks, mut log_rx, mut status_rx) = sinks(16, None);
    let input: &[u8] = b"first\r\nsecond\nno trailing newline";

    let stats = stream_lines("test", input, LogLevel::Error, &sinks).await;
    assert_eq!(stats.lines, 3);
    assert_eq!(stats.dropped, 0);

    let entries = drain(&mut log_rx);
    let messages: Vec<_> = entries.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, ["first", "second", "no trailing newline"]);
    assert!(entries.iter().all(|e| e.level == LogLevel::Error));
    assert!(drain(&mut status_rx).is_empty());
}

#[tokio::test]
async fn full_log_queue_drops_newest_lines() {
    init_tracing();

    let (sinks, mut log_rx, _status_rx) = sinks(2, None);
    let input: &[u8] = b"one\ntwo\nthree\nfour\nfive\n";

    let stats = stream_lines("test", input, LogLevel::Info, &sinks).await;
    assert_eq!(stats.lines, 5);
    assert_eq!(stats.dropped, 3);

    let messages: Vec<_> = drain(&mut log_rx).into_iter().map(|e| e.message).collect();
    assert_eq!(messages, ["one", "two"]);
}

#[tokio::test]
async fn closed_queues_do_not_stop_the_reader() {
    init_tracing();

    let (sinks, log_rx, status_rx) = sinks(1, Some("ready"));
    drop(log_rx);
    drop(status_rx);

    let input: &[u8] = b"a\nready\nb\n";
    let stats = stream_lines("test", input, LogLevel::Info, &sinks).await;
    assert_eq!(stats.lines, 3);
    assert_eq!(stats.ready_matches, 1);
}

#[tokio::test]
async fn readiness_is_matched_against_stripped_text() {
    init_tracing();

    let (sinks, mut log_rx, mut status_rx) = sinks(16, Some("listening on port \\d+"));
    let input: &[u8] = b"booting\n\x1b[1mlistening\x1b[0m on port \x1b[36m3000\x1b[0m\n";

    let stats = stream_lines("web", input, LogLevel::Info, &sinks).await;
    assert_eq!(stats.ready_matches, 1);
    assert_eq!(drain(&mut status_rx), vec![Status::Ready]);

    // The log keeps the styling.
    let entries = drain(&mut log_rx);
    assert_eq!(
        entries.last().map(|e| e.message.as_str()),
        Some("\x1b[1mlistening\x1b[0m on port \x1b[36m3000\x1b[0m")
    );
}

#[tokio::test]
async fn invalid_utf8_is_replaced_not_fatal() {
    init_tracing();

    let (sinks, mut log_rx, _status_rx) = sinks(16, None);
    let input: &[u8] = b"bad \xff byte\nafter\n";

    let stats = stream_lines("test", input, LogLevel::Info, &sinks).await;
    assert_eq!(stats.lines, 2);

    let messages: Vec<_> = drain(&mut log_rx).into_iter().map(|e| e.message).collect();
    assert_eq!(messages, ["bad \u{fffd} byte", "after"]);
}
