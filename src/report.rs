//! Text and JSON rendering of runs.
//!
//! The machine only produces [`TraceEvent`]s and an [`Outcome`]; this
//! module turns them into the report printed by the CLI:
//! ```text
//! Execution Number, Instruction Label, Register State
//! 0, a, (0,)
//! 1, c, (0,)
//! Proper HALT
//!
//! Final register state: (0,)
//! Number of operations: 2
//! Last instruction label: c
//! ```

use crate::machine::{Outcome, TraceEvent};
use serde::Serialize;

/// Header line printed before the trace.
pub const TRACE_HEADER: &str = "Execution Number, Instruction Label, Register State";

/// Format one trace record.
pub fn format_event(event: &TraceEvent) -> String {
    format!("{}, {}, {}", event.step, event.label, event.registers)
}

/// Name of the halt kind.
pub fn halt_kind(outcome: &Outcome) -> &'static str {
    if outcome.is_proper() {
        "Proper HALT"
    } else {
        "Erroneous HALT"
    }
}

/// Format the end-of-run summary.
pub fn format_summary(outcome: &Outcome) -> String {
    format!(
        "{}\n\nFinal register state: {}\nNumber of operations: {}\nLast instruction label: {}\n",
        halt_kind(outcome),
        outcome.final_registers(),
        outcome.step_count(),
        outcome.final_label(),
    )
}

/// Format a complete report: header, trace, summary.
pub fn format_report(events: &[TraceEvent], outcome: &Outcome) -> String {
    let mut output = String::new();
    output.push_str(TRACE_HEADER);
    output.push('\n');
    for event in events {
        output.push_str(&format_event(event));
        output.push('\n');
    }
    output.push_str(&format_summary(outcome));
    output
}

/// JSON shape of a finished run.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub trace: &'a [TraceEvent],
    pub outcome: &'a Outcome,
}

/// Render a run as pretty-printed JSON.
pub fn to_json(events: &[TraceEvent], outcome: &Outcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport { trace: events, outcome })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::load;

    #[test]
    fn test_report_matches_reference_format() {
        let loaded = load("a, 0\na: dec(r0), b, c\nc: halt\n").unwrap();
        let (outcome, events) = loaded.execute();

        assert_eq!(
            format_report(&events, &outcome),
            "Execution Number, Instruction Label, Register State\n\
             0, a, (0,)\n\
             1, c, (0,)\n\
             Proper HALT\n\
             \n\
             Final register state: (0,)\n\
             Number of operations: 2\n\
             Last instruction label: c\n"
        );
    }

    #[test]
    fn test_erroneous_summary() {
        let loaded = load("x, 1, 2\na: halt\n").unwrap();
        let (outcome, _) = loaded.execute();

        assert!(format_summary(&outcome).starts_with("Erroneous HALT\n"));
        assert!(format_summary(&outcome).contains("Final register state: (1, 2)"));
    }

    #[test]
    fn test_json_report() {
        let loaded = load("a, 0\na: inc(r0), b\nb: halt\n").unwrap();
        let (outcome, events) = loaded.execute();
        let json: serde_json::Value = serde_json::from_str(&to_json(&events, &outcome).unwrap()).unwrap();

        assert_eq!(json["outcome"]["kind"], "proper_halt");
        assert_eq!(json["outcome"]["step_count"], 2);
        assert_eq!(json["outcome"]["final_registers"], serde_json::json!([1]));
        assert_eq!(json["trace"][1]["label"], "b");
        assert_eq!(json["trace"][1]["registers"], serde_json::json!([1]));
    }

    #[test]
    fn test_report_beyond_u64() {
        let loaded = load("a, 18446744073709551615\na: inc(r0), b\nb: halt\n").unwrap();
        let (outcome, events) = loaded.execute();

        assert!(format_summary(&outcome).contains("Final register state: (18446744073709551616,)"));

        let json: serde_json::Value = serde_json::from_str(&to_json(&events, &outcome).unwrap()).unwrap();
        assert_eq!(json["trace"][0]["registers"], serde_json::json!([18446744073709551615u64]));
        assert_eq!(
            json["outcome"]["final_registers"],
            serde_json::json!(["18446744073709551616"])
        );
    }
}
