//! The per-turn decision record and its tolerant parser. A model's raw text
//! response is never trusted to be well-formed JSON; parsing degrades
//! gracefully to a respond-with-raw-text decision rather than erroring out.
//!
//! The parser must never panic on malformed model output: it first tries a
//! real JSON decode of the substring between the first `{` and the last
//! `}`, and if that fails, falls back to plain substring scans for the
//! field names. If every strategy fails, the whole reply is treated as a
//! `respond` decision carrying the raw text.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    ToolUse {
        tool_name: String,
        tool_args: Value,
        reasoning: Option<String>,
    },
    Handoff {
        handoff_agent: String,
        reasoning: Option<String>,
    },
    Respond {
        response: String,
        reasoning: Option<String>,
    },
}

pub fn parse_decision(raw: &str) -> Decision {
    if let Some(candidate) = extract_braced_substring(raw) {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            if let Some(decision) = decision_from_value(&value) {
                return decision;
            }
        }
    }

    if let Some(decision) = decision_from_substring_scan(raw) {
        return decision;
    }

    Decision::Respond {
        response: raw.to_string(),
        reasoning: None,
    }
}

fn extract_braced_substring(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

fn decision_from_value(value: &Value) -> Option<Decision> {
    let action = value.get("action")?.as_str()?;
    let reasoning = value.get("reasoning").and_then(Value::as_str).map(str::to_string);

    match action {
        "tool_use" => {
            let tool_name = value.get("tool_name")?.as_str()?.to_string();
            let tool_args = value.get("tool_args").cloned().unwrap_or_else(|| Value::Object(Default::default()));
            Some(Decision::ToolUse {
                tool_name,
                tool_args,
                reasoning,
            })
        }
        "handoff" => {
            let handoff_agent = value.get("handoff_agent")?.as_str()?.to_string();
            Some(Decision::Handoff {
                handoff_agent,
                reasoning,
            })
        }
        "respond" => {
            let response = value.get("response")?.as_str()?.to_string();
            Some(Decision::Respond { response, reasoning })
        }
        _ => None,
    }
}

/// Last-resort fallback: scan for the field names as bare substrings and
/// pull out a quoted value following the first colon after the key.
fn decision_from_substring_scan(raw: &str) -> Option<Decision> {
    if raw.contains("\"tool_name\"") {
        let tool_name = scan_quoted_value(raw, "\"tool_name\"")?;
        return Some(Decision::ToolUse {
            tool_name,
            tool_args: Value::Object(Default::default()),
            reasoning: None,
        });
    }
    if raw.contains("\"handoff_agent\"") {
        let handoff_agent = scan_quoted_value(raw, "\"handoff_agent\"")?;
        return Some(Decision::Handoff {
            handoff_agent,
            reasoning: None,
        });
    }
    if raw.contains("\"response\"") {
        let response = scan_quoted_value(raw, "\"response\"")?;
        return Some(Decision::Respond { response, reasoning: None });
    }
    None
}

/// Finds `key`, then the next `"..."` quoted string after its colon.
fn scan_quoted_value(raw: &str, key: &str) -> Option<String> {
    let key_pos = raw.find(key)?;
    let after_key = &raw[key_pos + key.len()..];
    let colon_pos = after_key.find(':')?;
    let after_colon = &after_key[colon_pos + 1..];
    let first_quote = after_colon.find('"')?;
    let rest = &after_colon[first_quote + 1..];
    let second_quote = rest.find('"')?;
    Some(rest[..second_quote].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_well_formed_tool_use_decision() {
        let raw = json!({
            "action": "tool_use",
            "tool_name": "arithmetic",
            "tool_args": {"op": "add", "a": 1, "b": 2},
            "reasoning": "need the sum",
        })
        .to_string();
        let decision = parse_decision(&raw);
        assert_eq!(
            decision,
            Decision::ToolUse {
                tool_name: "arithmetic".to_string(),
                tool_args: json!({"op": "add", "a": 1, "b": 2}),
                reasoning: Some("need the sum".to_string()),
            }
        );
    }

    #[test]
    fn parses_well_formed_handoff_decision() {
        let raw = json!({"action": "handoff", "handoff_agent": "writer", "reasoning": "done planning"}).to_string();
        let decision = parse_decision(&raw);
        assert_eq!(
            decision,
            Decision::Handoff {
                handoff_agent: "writer".to_string(),
                reasoning: Some("done planning".to_string()),
            }
        );
    }

    #[test]
    fn parses_json_embedded_in_surrounding_prose() {
        let raw = format!(
            "Here is my decision:\n{}\nHope that helps!",
            json!({"action": "respond", "response": "all done"})
        );
        let decision = parse_decision(&raw);
        assert_eq!(
            decision,
            Decision::Respond {
                response: "all done".to_string(),
                reasoning: None,
            }
        );
    }

    #[test]
    fn falls_back_to_substring_scan_on_invalid_json() {
        let raw = r#"{ action: tool_use, "tool_name": "arithmetic", broken json here"#;
        let decision = parse_decision(raw);
        assert_eq!(
            decision,
            Decision::ToolUse {
                tool_name: "arithmetic".to_string(),
                tool_args: Value::Object(Default::default()),
                reasoning: None,
            }
        );
    }

    #[test]
    fn unparseable_text_becomes_a_raw_respond_decision() {
        let raw = "I think the answer is just 42, no structure here.";
        let decision = parse_decision(raw);
        assert_eq!(
            decision,
            Decision::Respond {
                response: raw.to_string(),
                reasoning: None,
            }
        );
    }

    #[test]
    fn never_panics_on_empty_or_degenerate_input() {
        for raw in ["", "{", "}", "{}", "null", "{\"action\": 5}"] {
            let _ = parse_decision(raw);
        }
    }
}
