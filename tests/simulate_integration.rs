//! Integration tests: replay JSONL traces through a full session.

use presence::format::format_report;
use presence::simulate::{simulate, SimulateOptions};
use presence::trace::{parse_lines, parse_trace, TraceRecord};
use presence_core::{ConsciousnessState as S, EmotionalTone};
use presence_runtime::{PresenceConfig, SessionEvent};

fn load_fixture(name: &str) -> Vec<TraceRecord> {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    let content = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {name}: {e}"));
    let result = parse_lines(&content);
    assert!(
        result.errors.is_empty(),
        "Parse errors in {name}: {:?}",
        result.errors.iter().map(|e| &e.message).collect::<Vec<_>>()
    );
    result.records
}

fn transitions(events: &[SessionEvent], origin: u64) -> Vec<(S, S, u64)> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Transition(c) => Some((c.from, c.to, c.at - origin)),
            _ => None,
        })
        .collect()
}

// ===========================================================================
// Frustration trace: click burst plus erratic pointer
// ===========================================================================

#[test]
fn frustrated_user_is_interrupted_then_acknowledges() {
    let records = load_fixture("frustrated.jsonl");
    let report = simulate(&records, &PresenceConfig::default(), &SimulateOptions::default());

    assert_eq!(
        transitions(&report.events, report.origin),
        vec![
            (S::Dormant, S::Observing, 5_000),
            (S::Observing, S::Interrupting, 6_000),
            (S::Interrupting, S::Observing, 7_000),
        ]
    );
    match &report.events[1] {
        SessionEvent::Transition(change) => {
            assert_eq!(change.reason, "critical friction");
            assert_eq!(change.tone, EmotionalTone::Concerned);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(report.last.state, S::Observing);
    assert!(report.last.friction > 8.0);
}

#[test]
fn seeded_replays_are_identical() {
    let records = load_fixture("frustrated.jsonl");
    let options = SimulateOptions {
        seed: Some(99),
        until_ms: Some(120_000),
        ..Default::default()
    };
    let first = format_report(&simulate(&records, &PresenceConfig::default(), &options));
    let second = format_report(&simulate(&records, &PresenceConfig::default(), &options));
    assert_eq!(first, second);
    assert!(first.contains("observing -> interrupting (critical friction, tone concerned)"));
}

// ===========================================================================
// Pondering trace: friction raised by command, then a whisper
// ===========================================================================

#[test]
fn pondering_whisper_is_selected_and_acknowledged() {
    let trace = r#"
{"at": 0, "command": {"kind": "simulate_friction", "amount": 10.0}}
{"at": 20000, "command": {"kind": "acknowledge"}}
"#;
    let records = parse_lines(trace).records;
    let mut config = PresenceConfig::default();
    // any draw clears a zero threshold
    config.engine.speak_draw = 0.0;
    let options = SimulateOptions {
        seed: Some(1),
        start_hour: 14,
        until_ms: Some(22_000),
    };
    let report = simulate(&records, &config, &options);

    assert_eq!(
        transitions(&report.events, report.origin),
        vec![
            (S::Dormant, S::Observing, 5_000),
            (S::Observing, S::Pondering, 16_000),
            (S::Pondering, S::Whispering, 19_000),
            (S::Whispering, S::Retreating, 20_000),
            (S::Retreating, S::Observing, 22_000),
        ]
    );

    let whisper = report
        .events
        .iter()
        .find_map(|e| match e {
            SessionEvent::Whisper { at, message } => Some((*at - report.origin, message.id)),
            _ => None,
        })
        .unwrap();
    assert_eq!(whisper, (19_000, "friction-1"));
    assert!(report.last.pending_whisper.is_none());

    let text = format_report(&report);
    assert!(text.contains("whisper friction-1 (encouraging)"));
    assert!(text.contains("1 manifestations, 1 whispers"));
}

#[test]
fn quiet_trace_never_manifests() {
    let report = simulate(
        &[],
        &PresenceConfig::default(),
        &SimulateOptions {
            until_ms: Some(60_000),
            ..Default::default()
        },
    );
    let path = transitions(&report.events, report.origin);
    assert_eq!(path[0], (S::Dormant, S::Observing, 5_000));
    // calm reading ponders, but with no friction it never speaks
    assert!(path.iter().any(|(_, to, _)| *to == S::Pondering));
    assert!(path.iter().all(|(_, to, _)| !to.is_manifestation()));
}

#[test]
fn trace_files_parse_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    std::fs::write(&path, "{\"at\": 10, \"input\": {\"kind\": \"visibility\", \"hidden\": true}}\n").unwrap();
    let result = parse_trace(&path).unwrap();
    assert_eq!(result.records.len(), 1);
    assert!(parse_trace(&dir.path().join("missing.jsonl")).is_err());
}
