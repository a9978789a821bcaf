mod webhook {
    use crate::json_text::is_truthy;

    use serde::de::{DeserializeOwned, Deserializer};
    use serde::Deserialize;
    use serde_json::Value;

    /// Top-level body of a Vapi server webhook.  Only the fields we read are modelled; everything
    /// else in the envelope is ignored.  A field of the wrong type reads as absent.
    #[derive(Deserialize, Debug, Default, Clone)]
    pub struct CallEvent {
        #[serde(default, deserialize_with = "message_or_placeholder")]
        pub message: Option<EventMessage>,
        #[serde(default, deserialize_with = "lenient_object")]
        pub call: Option<CallMeta>,
    }

    #[derive(Deserialize, Debug, Default, Clone)]
    pub struct EventMessage {
        #[serde(default, deserialize_with = "lenient")]
        pub status: Option<String>,
        #[serde(default, deserialize_with = "lenient_object")]
        pub assistant: Option<AssistantMeta>,
        #[serde(default, deserialize_with = "lenient_object")]
        pub artifact: Option<Artifact>,
    }

    #[derive(Deserialize, Debug, Default, Clone)]
    pub struct AssistantMeta {
        #[serde(default, deserialize_with = "lenient")]
        pub name: Option<String>,
    }

    #[derive(Deserialize, Debug, Default, Clone)]
    pub struct Artifact {
        #[serde(default, deserialize_with = "lenient_messages")]
        pub messages: Vec<ArtifactMessage>,
    }

    /// One utterance as delivered by Vapi.  Depending on the event type the body is in either
    /// `message` or `content`, and is not always a string.
    #[derive(Deserialize, Debug, Default, Clone)]
    pub struct ArtifactMessage {
        #[serde(default, deserialize_with = "lenient")]
        pub role: Option<String>,
        #[serde(default)]
        pub message: Option<Value>,
        #[serde(default)]
        pub content: Option<Value>,
    }

    /// Call-level metadata; only used as a fallback source for the assistant name.
    #[derive(Deserialize, Debug, Default, Clone)]
    pub struct CallMeta {
        #[serde(default, deserialize_with = "lenient_object")]
        pub assistant: Option<AssistantMeta>,
    }

    fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).ok())
    }

    /// Like `lenient`, but only a JSON object can fill a struct field.
    fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        match Value::deserialize(deserializer)? {
            value @ Value::Object(_) => Ok(serde_json::from_value(value).ok()),
            _ => Ok(None),
        }
    }

    /// Non-object entries are dropped; a non-array reads as no messages.
    fn lenient_messages<'de, D>(deserializer: D) -> Result<Vec<ArtifactMessage>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let messages = match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|m| serde_json::from_value(m).ok())
                .collect(),
            _ => vec![],
        };
        Ok(messages)
    }

    /// A falsy `message` is missing.  Any other non-object still counts as a message, just one
    /// with no status.
    fn message_or_placeholder<'de, D>(deserializer: D) -> Result<Option<EventMessage>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if !is_truthy(&value) {
            return Ok(None);
        }
        let message = match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => EventMessage::default(),
        };
        Ok(Some(message))
    }
}
pub use webhook::*;

mod status {
    use std::str::FromStr;

    /// Statuses that mark a call as finished.  Matching is case-insensitive.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TerminalStatus {
        End,
        Ended,
        Completed,
    }

    impl FromStr for TerminalStatus {
        type Err = ();

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.to_lowercase().as_str() {
                "end" => Ok(TerminalStatus::End),
                "ended" => Ok(TerminalStatus::Ended),
                "completed" => Ok(TerminalStatus::Completed),
                _ => Err(()),
            }
        }
    }
}
pub use status::*;
