use chrono::{DateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::ContentBlock;

/// Parse a timestamp in one of the two accepted formats:
/// an RFC 3339 string (any fractional precision, any offset) or Unix epoch milliseconds
pub fn parse_timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::String(s) => {
            DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc))
        }
        _ => None,
    }
}

/// Timestamp deserializer that never fails: unparseable values become `None`
pub fn deserialize_lenient_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_timestamp_value))
}

/// Message content is either a plain string or an ordered array of blocks.
/// A plain string becomes a single `text` block.
pub fn deserialize_content_blocks<'de, D>(deserializer: D) -> Result<Vec<ContentBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![ContentBlock::text(s)]),
        Some(array @ Value::Array(_)) => serde_json::from_value(array)
            .map_err(|e| Error::custom(format!("invalid content blocks: {}", e))),
        Some(_) => Err(Error::custom("content must be a string or an array of blocks")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::Message;

    #[test]
    fn test_parse_timestamp_rfc3339_variants() {
        let nanos = parse_timestamp_value(&json!("2025-11-02T09:41:20.016123456Z")).unwrap();
        let plain = parse_timestamp_value(&json!("2025-11-02T09:41:20Z")).unwrap();
        let offset = parse_timestamp_value(&json!("2025-11-02T10:41:20+01:00")).unwrap();

        assert_eq!(plain, offset);
        assert!(nanos > plain);
    }

    #[test]
    fn test_parse_timestamp_epoch_millis() {
        let ts = parse_timestamp_value(&json!(1762076480016_i64)).unwrap();
        assert_eq!(ts, DateTime::from_timestamp_millis(1762076480016).unwrap());
    }

    #[test]
    fn test_parse_timestamp_rejects_other_formats() {
        assert!(parse_timestamp_value(&json!("yesterday")).is_none());
        assert!(parse_timestamp_value(&json!("2025-11-02 09:41:20")).is_none());
        assert!(parse_timestamp_value(&json!(true)).is_none());
        assert!(parse_timestamp_value(&json!(null)).is_none());
    }

    #[test]
    fn test_message_string_content_becomes_text_block() {
        let message: Message =
            serde_json::from_str(r#"{"role":"user","content":"Simple string content"}"#).unwrap();
        assert_eq!(message.content.len(), 1);
        assert_eq!(message.content[0].block_type, "text");
        assert_eq!(message.content[0].text.as_deref(), Some("Simple string content"));
    }

    #[test]
    fn test_message_block_content_keeps_order() {
        let message: Message = serde_json::from_str(
            r#"{"role":"assistant","content":[{"type":"thinking","thinking":"hmm"},{"type":"tool_use","id":"t1","name":"Bash","input":{"command":"ls"}}]}"#,
        )
        .unwrap();
        assert_eq!(message.content.len(), 2);
        assert_eq!(message.content[0].thinking.as_deref(), Some("hmm"));
        assert_eq!(message.content[1].name.as_deref(), Some("Bash"));
        assert_eq!(message.content[1].input, Some(json!({"command":"ls"})));
    }

    #[test]
    fn test_message_rejects_numeric_content() {
        let result = serde_json::from_str::<Message>(r#"{"role":"user","content":42}"#);
        assert!(result.is_err());
    }
}
