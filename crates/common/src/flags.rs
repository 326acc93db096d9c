//! Boolean switches read from the environment.
//!
//! Deployments set toggles such as `QDRANT_USE_HTTPS` or `MLFLOW_USE_TRACKING`
//! to `1`, `true` or `yes`. Anything else, including an absent variable, is
//! treated as off.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Interpret a textual switch.
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

/// Serde adapter for `bool` fields populated from environment variables.
///
/// Use together with `#[serde(default)]` so a missing key stays `false`.
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawFlag::deserialize(deserializer)? {
        RawFlag::Bool(value) => value,
        RawFlag::Int(value) => value == 1,
        RawFlag::Text(value) => parse_flag(&value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Toggle {
        #[serde(default, deserialize_with = "deserialize_flag")]
        enabled: bool,
    }

    fn toggle(value: serde_json::Value) -> bool {
        serde_json::from_value::<Toggle>(value).unwrap().enabled
    }

    #[test]
    fn truthy_spellings_enable() {
        for raw in ["1", "true", "TRUE", "yes", " Yes "] {
            assert!(parse_flag(raw), "{raw:?} should enable");
        }
    }

    #[test]
    fn other_spellings_disable() {
        for raw in ["", "0", "false", "no", "on", "enabled"] {
            assert!(!parse_flag(raw), "{raw:?} should disable");
        }
    }

    #[test]
    fn deserializes_typed_and_textual_values() {
        assert!(toggle(json!({ "enabled": true })));
        assert!(toggle(json!({ "enabled": 1 })));
        assert!(toggle(json!({ "enabled": "yes" })));
        assert!(!toggle(json!({ "enabled": 0 })));
        assert!(!toggle(json!({ "enabled": "nope" })));
        assert!(!toggle(json!({})));
    }
}
