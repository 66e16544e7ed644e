mod common;
use common::*;

use core_actions::VimDispatcher;
use core_events::KeyEvent;
use core_state::VimMode;
use pretty_assertions::assert_eq;
use std::time::Duration;

#[test]
fn dd_within_timeout_deletes_line() {
    let mut h = Harness::new("a\nb\nc", 0);
    let outs = h.keys("dd");
    assert_eq!(outs[0].pending, "d");
    assert_eq!(outs[1].pending, "");
    assert_eq!(h.value(), "b\nc");
    assert_eq!(h.caret(), 0);
}

/// A `d` arriving after the deadline is not looked up on its own: the stale
/// `d` is flushed (warned as unimplemented) and the new one starts a fresh
/// sequence.
#[test]
fn late_second_d_is_buffered_as_new_prefix() {
    let mut h = Harness::new("a\nb\nc", 0);
    h.key(KeyEvent::char('d'));
    h.advance(Duration::from_millis(1500));
    let (out, logs) = capture_warnings(|| h.key(KeyEvent::char('d')));
    assert_eq!(h.value(), "a\nb\nc");
    assert_eq!(out.pending, "d");
    assert_eq!(out.mode, VimMode::Normal);
    // the stale lone 'd' was flushed as a recognized but unimplemented key
    assert!(logs.contains("WARN vim.dispatch:"));
    assert!(logs.contains("command_not_implemented"));
}

#[test]
fn poll_flushes_expired_prefix() {
    let mut h = Harness::new("a\nb", 0);
    h.key(KeyEvent::char('g'));
    assert!(h.vim.deadline().is_some());
    h.advance(Duration::from_millis(999));
    assert!(h.poll().is_none());
    h.advance(Duration::from_millis(1));
    let out = h.poll().expect("deadline reached");
    assert_eq!(out.pending, "");
    assert!(h.vim.deadline().is_none());
    assert!(h.poll().is_none());
    assert_eq!(h.value(), "a\nb");
}

#[test]
fn disabled_timeout_waits_forever() {
    let vim = VimDispatcher::new(true, None);
    let mut h = Harness::with_dispatcher(vim, "one\ntwo", 5);
    h.key(KeyEvent::char('g'));
    h.advance(Duration::from_secs(3600));
    assert!(h.poll().is_none());
    h.key(KeyEvent::char('g'));
    assert_eq!(h.caret(), 0);
}

#[test]
fn count_repeats_motion() {
    let mut h = Harness::new("1\n2\n3\n4\n5", 0);
    h.keys("3j");
    assert_eq!(h.caret(), 6);
    h.keys("10l");
    assert_eq!(h.caret(), 6);
    let mut h = Harness::new("abcdefghijklmn", 0);
    h.keys("10l");
    assert_eq!(h.caret(), 10);
    h.keys("0");
    assert_eq!(h.caret(), 0);
}

#[test]
fn count_repeats_edits() {
    let mut h = Harness::new("abcdef", 0);
    h.keys("3x");
    assert_eq!(h.value(), "def");
    let mut h = Harness::new("a\nb\nc", 0);
    h.keys("2dd");
    assert_eq!(h.value(), "c");
    assert_eq!(h.vim.register().text, "a\nb\n");
}

#[test]
fn counted_dd_stops_at_last_line() {
    let mut h = Harness::new("a\nb", 0);
    h.keys("3dd");
    assert_eq!(h.value(), "");
    assert_eq!(h.vim.register().text, "a\nb\n");
    assert!(h.vim.register().linewise);
    h.keys("P");
    assert_eq!(h.value(), "a\nb\n");

    let mut h = Harness::new("a\nb\nc", 2);
    h.keys("5dd");
    assert_eq!(h.value(), "a");
    assert_eq!(h.vim.register().text, "b\nc\n");
}

#[test]
fn execute_command_runs_raw_strings() {
    let mut h = Harness::new("1\n2\n3\n4", 0);
    let out = h.vim.execute_command("2j", &mut h.area);
    assert!(out.handled);
    assert_eq!(h.caret(), 4);
    h.vim.execute_command("dd", &mut h.area);
    h.vim.settle(&mut h.area);
    assert_eq!(h.value(), "1\n2\n4");
}

#[test]
fn prefix_followed_by_unrelated_key() {
    let mut h = Harness::new("a\nb\nc", 0);
    let outs = h.keys("2dj");
    assert_eq!(outs[2].pending, "");
    // the count is dropped with the prefix; j runs once
    assert_eq!(h.caret(), 2);
    assert_eq!(h.value(), "a\nb\nc");
}

#[test]
fn escape_cancels_pending_keys() {
    let mut h = Harness::new("abc", 0);
    let outs = h.keys("3d<Esc>x");
    assert_eq!(outs[2].pending, "");
    assert_eq!(h.value(), "bc");
}

#[test]
fn document_motions() {
    let mut h = Harness::new("ab\n  cd", 0);
    h.keys("G");
    assert_eq!(h.caret(), 5);
    h.keys("gg");
    assert_eq!(h.caret(), 0);
}

#[test]
fn unknown_keys_are_silent_unimplemented_warn() {
    let mut h = Harness::new("abc", 0);
    let (out, logs) = capture_warnings(|| h.key(KeyEvent::char('Q')));
    assert!(out.handled);
    assert!(logs.is_empty(), "unexpected logs: {logs}");
    let (_, logs) = capture_warnings(|| h.key(KeyEvent::char('r')));
    assert!(logs.contains("command_not_implemented"));
    assert_eq!(h.value(), "abc");
}
