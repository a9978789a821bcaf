use crate::consts::UNKNOWN;
use crate::json_text::{is_truthy, to_text};
use crate::vapi_types::{ArtifactMessage, CallEvent, TerminalStatus};

use std::fmt;
use time::OffsetDateTime;

/// One utterance of the call, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub role: String,
    pub text: String,
}

impl TranscriptLine {
    /// Body falls back from `message` to `content` to the empty string.  Falsy values count as
    /// missing; non-string bodies are rendered as text (`42`, `a,b`).
    fn from_artifact(m: &ArtifactMessage) -> Self {
        let text = [m.message.as_ref(), m.content.as_ref()]
            .into_iter()
            .flatten()
            .find(|v| is_truthy(v))
            .map(to_text)
            .unwrap_or_default();
        Self {
            role: m.role.clone().unwrap_or_default(),
            text,
        }
    }
}

impl fmt::Display for TranscriptLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.role.to_uppercase(), self.text)
    }
}

/// A finished call flattened into a single transcript plus metadata.
#[derive(Debug, Clone)]
pub struct NormalizedCall {
    pub raw_transcript: String,
    pub business_name: String,
    /// Character count of the full transcript, before any truncation.
    pub call_length: usize,
    pub created_at: OffsetDateTime,
}

/// Why an event produced no record.  Not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotActionable {
    MissingPayload,
    NonFinalStatus,
}

impl fmt::Display for NotActionable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NotActionable::MissingPayload => write!(f, "missing payload"),
            NotActionable::NonFinalStatus => write!(f, "non-final status"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Normalized {
    Call(NormalizedCall),
    NotActionable(NotActionable),
}

/// Decide whether `event` describes a finished call and, if so, flatten it.
pub fn normalize(event: &CallEvent, now: OffsetDateTime) -> Normalized {
    let Some(message) = &event.message else {
        return Normalized::NotActionable(NotActionable::MissingPayload);
    };

    let is_final = message
        .status
        .as_deref()
        .map(|s| s.parse::<TerminalStatus>().is_ok())
        .unwrap_or(false);
    if !is_final {
        return Normalized::NotActionable(NotActionable::NonFinalStatus);
    }

    let business_name = [
        message.assistant.as_ref().and_then(|a| a.name.as_deref()),
        event
            .call
            .as_ref()
            .and_then(|c| c.assistant.as_ref())
            .and_then(|a| a.name.as_deref()),
    ]
    .into_iter()
    .flatten()
    .find(|n| !n.is_empty())
    .unwrap_or(UNKNOWN)
    .to_string();

    let lines: Vec<TranscriptLine> = message
        .artifact
        .as_ref()
        .map(|a| a.messages.iter().map(TranscriptLine::from_artifact).collect())
        .unwrap_or_default();
    let raw_transcript = lines
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<String>>()
        .join("\n");
    let call_length = raw_transcript.chars().count();

    Normalized::Call(NormalizedCall {
        raw_transcript,
        business_name,
        call_length,
        created_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(json: &str) -> CallEvent {
        serde_json::from_str(json).unwrap()
    }

    fn call(json: &str) -> NormalizedCall {
        match normalize(&event(json), OffsetDateTime::UNIX_EPOCH) {
            Normalized::Call(c) => c,
            Normalized::NotActionable(r) => panic!("expected a call, got {r}"),
        }
    }

    fn reason(json: &str) -> NotActionable {
        match normalize(&event(json), OffsetDateTime::UNIX_EPOCH) {
            Normalized::NotActionable(r) => r,
            Normalized::Call(c) => panic!("expected not actionable, got {c:?}"),
        }
    }

    #[test]
    fn missing_message_is_not_actionable() {
        assert_eq!(reason("{}"), NotActionable::MissingPayload);
        assert_eq!(
            reason(r#"{ "call": { "assistant": { "name": "Shop" } } }"#),
            NotActionable::MissingPayload
        );
    }

    #[test]
    fn non_final_status_is_not_actionable() {
        for status in ["in-progress", "ringing", "queued", "ending", ""] {
            let json = format!(r#"{{ "message": {{ "status": "{status}" }} }}"#);
            assert_eq!(reason(&json), NotActionable::NonFinalStatus, "{status}");
        }
        assert_eq!(reason(r#"{ "message": {} }"#), NotActionable::NonFinalStatus);
    }

    #[test]
    fn terminal_statuses_any_case() {
        for status in ["end", "ENDED", "Completed", "eNd"] {
            let json = format!(r#"{{ "message": {{ "status": "{status}" }} }}"#);
            call(&json);
        }
    }

    #[test]
    fn flattens_transcript_in_order() {
        let c = call(
            r#"{ "message": { "status": "ended", "artifact": { "messages": [
                { "role": "user", "message": "I'd like 2 pizzas" },
                { "role": "assistant", "content": "Got it" },
                { "role": "bot", "message": "", "content": "Anything else?" },
                { "role": "user" }
            ] } } }"#,
        );
        assert_eq!(
            c.raw_transcript,
            "USER: I'd like 2 pizzas\nASSISTANT: Got it\nBOT: Anything else?\nUSER: "
        );
        assert_eq!(c.call_length, c.raw_transcript.chars().count());
    }

    #[test]
    fn missing_role_renders_empty_label() {
        let c = call(
            r#"{ "message": { "status": "end", "artifact": { "messages": [
                { "message": "hello" }
            ] } } }"#,
        );
        assert_eq!(c.raw_transcript, ": hello");
    }

    #[test]
    fn no_artifact_yields_empty_transcript() {
        let c = call(r#"{ "message": { "status": "completed" } }"#);
        assert_eq!(c.raw_transcript, "");
        assert_eq!(c.call_length, 0);
        assert_eq!(c.business_name, "Unknown");
    }

    #[test]
    fn call_length_counts_characters() {
        let c = call(
            r#"{ "message": { "status": "ended", "artifact": { "messages": [
                { "role": "user", "message": "crème brûlée" }
            ] } } }"#,
        );
        assert_eq!(c.raw_transcript, "USER: crème brûlée");
        assert_eq!(c.call_length, 18);
    }

    #[test]
    fn call_length_counts_astral_characters_once() {
        let c = call(
            r#"{ "message": { "status": "ended", "artifact": { "messages": [
                { "role": "user", "message": "🍕🍕" }
            ] } } }"#,
        );
        assert_eq!(c.raw_transcript, "USER: 🍕🍕");
        assert_eq!(c.call_length, 8);
    }

    #[test]
    fn non_string_bodies_become_text() {
        let c = call(
            r#"{ "message": { "status": "ended", "artifact": { "messages": [
                { "role": "user", "message": 42 },
                { "role": "user", "content": ["a", "b"] },
                { "role": "bot", "message": 0, "content": { "k": 1 } },
                { "role": "bot", "message": false }
            ] } } }"#,
        );
        assert_eq!(
            c.raw_transcript,
            "USER: 42\nUSER: a,b\nBOT: [object Object]\nBOT: "
        );
    }

    #[test]
    fn wrongly_typed_fields_still_produce_a_call() {
        let c = call(r#"{ "message": { "status": "ended", "artifact": { "messages": null } } }"#);
        assert_eq!(c.raw_transcript, "");

        let c = call(r#"{ "message": { "status": "ended", "assistant": { "name": 7 } } }"#);
        assert_eq!(c.business_name, "Unknown");

        assert_eq!(
            reason(r#"{ "message": { "status": 5 } }"#),
            NotActionable::NonFinalStatus
        );
        assert_eq!(reason(r#"{ "message": "hello" }"#), NotActionable::NonFinalStatus);
    }

    #[test]
    fn message_assistant_name_wins() {
        let c = call(
            r#"{ "message": { "status": "ended", "assistant": { "name": "Front" } },
                "call": { "assistant": { "name": "Back" } } }"#,
        );
        assert_eq!(c.business_name, "Front");
    }

    #[test]
    fn falls_back_to_call_assistant_name() {
        let c = call(
            r#"{ "message": { "status": "ended", "assistant": {} },
                "call": { "assistant": { "name": "Back" } } }"#,
        );
        assert_eq!(c.business_name, "Back");

        let c = call(
            r#"{ "message": { "status": "ended", "assistant": { "name": "" } },
                "call": { "assistant": { "name": "Back" } } }"#,
        );
        assert_eq!(c.business_name, "Back");
    }

    #[test]
    fn created_at_is_the_supplied_time() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let e = event(r#"{ "message": { "status": "ended" } }"#);
        match normalize(&e, now) {
            Normalized::Call(c) => assert_eq!(c.created_at, now),
            Normalized::NotActionable(r) => panic!("{r}"),
        }
    }
}
