use presence_core::Millis;
use presence_runtime::{PresenceSnapshot, SessionEvent};

use crate::simulate::SimulationReport;

/// Offset from `origin` as seconds with millisecond precision.
pub fn format_offset(at: Millis, origin: Millis) -> String {
    let offset = at.saturating_sub(origin);
    format!("{:>5}.{:03}s", offset / 1_000, offset % 1_000)
}

pub fn format_event(event: &SessionEvent, origin: Millis) -> String {
    match event {
        SessionEvent::Transition(change) => format!(
            "[{}] {} -> {} ({}, tone {})",
            format_offset(change.at, origin),
            change.from,
            change.to,
            change.reason,
            change.tone
        ),
        SessionEvent::Whisper { at, message } => format!(
            "[{}] whisper {} ({}): \"{}\"",
            format_offset(*at, origin),
            message.id,
            message.tone,
            message.text
        ),
    }
}

pub fn format_snapshot(snapshot: &PresenceSnapshot) -> String {
    let mut out = format!(
        "{} tone={} intensity={:.2} | {} friction={:.1} attention={:.1} fatigue={:.1} idle={}ms",
        snapshot.state,
        snapshot.tone,
        snapshot.intensity,
        snapshot.time_of_day.as_str(),
        snapshot.friction,
        snapshot.attention,
        snapshot.fatigue,
        snapshot.idle_time
    );
    if let Some(whisper) = snapshot.pending_whisper {
        out.push_str(&format!(" | \"{}\"", whisper.text));
    }
    out
}

pub fn format_report(report: &SimulationReport) -> String {
    let mut out = String::new();
    for event in &report.events {
        out.push_str(&format_event(event, report.origin));
        out.push('\n');
    }
    let manifestations = report
        .events
        .iter()
        .filter(|e| matches!(e, SessionEvent::Transition(c) if c.to.is_manifestation()))
        .count();
    let whispers = report
        .events
        .iter()
        .filter(|e| matches!(e, SessionEvent::Whisper { .. }))
        .count();
    out.push_str(&format!(
        "\n{} manifestations, {} whispers\nfinal: {}\n",
        manifestations,
        whispers,
        format_snapshot(&report.last)
    ));
    out
}
