use std::cell::RefCell;
use std::time::Duration;

use super::{CancelToken, PingEvent, PingOptions, Pinger};
use crate::probe::Phase;
use crate::probe::tests::{HAPPY_PATH, Script, ScriptedDialer, envelope};
use crate::rate::RateCounter;
use crate::select::AddressFamily;

const FIRST: &str = "192.0.2.1:25";
const SECOND: &str = "192.0.2.2:25";
const BUSY: &str = "554 busy\n";

fn endpoints(hosts: &[&str]) -> Vec<String> {
    hosts.iter().map(|host| host.to_string()).collect()
}

fn describe(event: PingEvent<'_>) -> String {
    match event {
        PingEvent::Target { endpoint, .. } => format!("target {endpoint}"),
        PingEvent::Reply { seq, .. } => format!("reply {seq}"),
        PingEvent::Failed { seq, failure, .. } => format!("failed {seq} {}", failure.phase()),
        PingEvent::Unresolvable { endpoint } => format!("unresolvable {endpoint}"),
    }
}

fn options(count: u32) -> PingOptions {
    PingOptions {
        count,
        ..PingOptions::default()
    }
}

#[test]
fn abandons_unreachable_endpoint_then_pins_the_next() {
    let envelope = envelope();
    let dialer = ScriptedDialer::new()
        .push(FIRST, Script::Refuse)
        .push(SECOND, Script::Replies(HAPPY_PATH))
        .push(SECOND, Script::Replies(BUSY))
        .push(SECOND, Script::Replies(BUSY))
        .push(SECOND, Script::Replies(HAPPY_PATH));
    let pauses = RefCell::new(Vec::new());
    let mut events = Vec::new();

    let mut pinger = Pinger::new(&envelope, dialer, options(4))
        .with_pause(|wait| pauses.borrow_mut().push(wait));
    let summary = pinger.run(&endpoints(&["192.0.2.1", "192.0.2.2"]), |event| {
        events.push(describe(event))
    });

    assert_eq!(
        events,
        [
            "target 192.0.2.1",
            "failed 0 connect",
            "target 192.0.2.2",
            "reply 1",
            "failed 2 banner",
            "failed 3 banner",
            "reply 4",
        ]
    );
    assert_eq!(summary.pinned.as_deref(), Some("192.0.2.2"));
    assert_eq!(summary.transmitted, 4);
    assert_eq!(summary.stats.get(Phase::Connect).count, 2);
    assert_eq!(summary.stats.get(Phase::Quit).count, 2);
    assert!(!summary.cancelled);

    let dials = &pinger.dialer().dials;
    assert_eq!(dials.len(), 5);
    assert_eq!(dials[0], FIRST.parse().expect("addr"));
    drop(pinger);
    assert_eq!(pauses.into_inner(), vec![Duration::from_millis(1000); 3]);
}

#[test]
fn connect_failure_after_pinning_retries_same_endpoint() {
    let envelope = envelope();
    let dialer = ScriptedDialer::new().push(FIRST, Script::Replies(HAPPY_PATH));
    let mut events = Vec::new();

    let mut pinger = Pinger::new(&envelope, dialer, options(3)).with_pause(|_| {});
    let summary = pinger.run(&endpoints(&["192.0.2.1", "192.0.2.2"]), |event| {
        events.push(describe(event))
    });

    assert_eq!(
        events,
        [
            "target 192.0.2.1",
            "reply 1",
            "failed 2 connect",
            "failed 3 connect",
        ]
    );
    assert_eq!(summary.pinned.as_deref(), Some("192.0.2.1"));
    assert_eq!(summary.transmitted, 3);
    assert!(
        pinger
            .dialer()
            .dials
            .iter()
            .all(|addr| *addr == FIRST.parse().expect("addr"))
    );
}

#[test]
fn protocol_failure_on_first_attempt_pins_endpoint() {
    let envelope = envelope();
    let dialer = ScriptedDialer::new()
        .push(FIRST, Script::Replies("220 ok\n250 ok\n250 ok\n550 no such user\n"))
        .push(FIRST, Script::Replies(HAPPY_PATH));
    let mut events = Vec::new();

    let mut pinger = Pinger::new(&envelope, dialer, options(2)).with_pause(|_| {});
    let summary = pinger.run(&endpoints(&["192.0.2.1"]), |event| events.push(describe(event)));

    assert_eq!(events, ["target 192.0.2.1", "failed 1 rcptto", "reply 2"]);
    assert_eq!(summary.stats.get(Phase::RcptTo).count, 1);
    assert!(summary.sent_any());
}

#[test]
fn rejected_recipient_leaves_stats_untouched() {
    let envelope = envelope();
    let dialer = ScriptedDialer::new()
        .push(FIRST, Script::Replies("220 ok\n250 ok\n250 ok\n550 no such user\n"));

    let mut pinger = Pinger::new(&envelope, dialer, options(1));
    let summary = pinger.run(&endpoints(&["192.0.2.1"]), |_| {});

    assert_eq!(summary.transmitted, 1);
    assert_eq!(summary.stats.get(Phase::RcptTo).count, 0);
    assert!(summary.stats.is_empty());
}

#[test]
fn nothing_reachable_sends_no_pings() {
    let envelope = envelope();
    let dialer = ScriptedDialer::new();
    let paused = RefCell::new(false);

    let mut pinger = Pinger::new(&envelope, dialer, options(0))
        .with_pause(|_| *paused.borrow_mut() = true);
    let summary = pinger.run(&endpoints(&["192.0.2.1", "192.0.2.2"]), |_| {});

    assert!(!summary.sent_any());
    assert_eq!(summary.pinned, None);
    assert_eq!(summary.transmitted, 0);
    assert_eq!(pinger.dialer().dials.len(), 2);
    drop(pinger);
    assert!(!paused.into_inner());
}

#[test]
fn cancelled_before_start_makes_no_attempt() {
    let envelope = envelope();
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut events = Vec::new();

    let mut pinger = Pinger::new(
        &envelope,
        ScriptedDialer::new().push(FIRST, Script::Replies(HAPPY_PATH)),
        options(0),
    )
    .with_cancel(cancel);
    let summary = pinger.run(&endpoints(&["192.0.2.1"]), |event| events.push(describe(event)));

    assert!(events.is_empty());
    assert!(pinger.dialer().dials.is_empty());
    assert!(summary.cancelled);
    assert!(!summary.sent_any());
}

#[test]
fn cancellation_is_seen_at_the_next_loop_boundary() {
    let envelope = envelope();
    let cancel = CancelToken::new();
    let dialer = ScriptedDialer::new().repeat(FIRST, Script::Replies(HAPPY_PATH), 10);
    let on_pause = cancel.clone();

    let mut pinger = Pinger::new(&envelope, dialer, options(0))
        .with_cancel(cancel)
        .with_pause(move |_| on_pause.cancel());
    let summary = pinger.run(&endpoints(&["192.0.2.1"]), |_| {});

    assert!(summary.cancelled);
    assert_eq!(summary.transmitted, 2);
    assert_eq!(pinger.dialer().dials.len(), 2);
}

#[test]
fn successful_deliveries_bump_the_rate_counter() {
    let envelope = envelope();
    let counter = RateCounter::new();
    let dialer = ScriptedDialer::new()
        .push(FIRST, Script::Replies(HAPPY_PATH))
        .push(FIRST, Script::Replies(BUSY))
        .push(FIRST, Script::Replies(HAPPY_PATH));

    let mut pinger = Pinger::new(&envelope, dialer, options(3))
        .with_rate_counter(counter.clone())
        .with_pause(|_| {});
    pinger.run(&endpoints(&["192.0.2.1"]), |_| {});

    assert_eq!(counter.take(), 2);
    assert_eq!(counter.take(), 0);
}

#[test]
fn endpoints_outside_the_family_are_skipped() {
    let envelope = envelope();
    let dialer = ScriptedDialer::new().push("[2001:db8::25]:25", Script::Replies(HAPPY_PATH));
    let mut events = Vec::new();

    let mut pinger = Pinger::new(
        &envelope,
        dialer,
        PingOptions {
            count: 1,
            family: AddressFamily::V6,
            ..PingOptions::default()
        },
    );
    let summary = pinger.run(&endpoints(&["192.0.2.1", "2001:db8::25"]), |event| {
        events.push(describe(event))
    });

    assert_eq!(
        events,
        [
            "unresolvable 192.0.2.1",
            "target 2001:db8::25",
            "reply 1"
        ]
    );
    assert_eq!(summary.pinned.as_deref(), Some("2001:db8::25"));
}

#[test]
fn target_event_carries_port_and_size() {
    let envelope = envelope();
    let dialer = ScriptedDialer::new().push("192.0.2.1:2525", Script::Replies(HAPPY_PATH));
    let mut seen = None;

    let mut pinger = Pinger::new(
        &envelope,
        dialer,
        PingOptions {
            port: 2525,
            count: 1,
            ..PingOptions::default()
        },
    );
    pinger.run(&endpoints(&["[192.0.2.1]"]), |event| {
        if let PingEvent::Target {
            port, data_size, ..
        } = event
        {
            seen = Some((port, data_size));
        }
    });

    assert_eq!(seen, Some((2525, envelope.data_size())));
}
