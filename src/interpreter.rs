//! Turns the model's raw reply text into a typed [`ModelReply`].
//!
//! Models do not always honour "JSON only": replies arrive wrapped in
//! markdown fences, surrounded by prose, or preceded by `<think>` blocks.
//! Leading `<think>` blocks are dropped; anything later in the text is left
//! alone, since a command may legitimately contain that tag. Extraction then
//! tries, in order, a fenced `json` block, the span from the first `{` to the
//! last `}`, and finally the text itself.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("fence pattern is valid")
});

/// Commands and commentary proposed by the model for one reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    pub commands: Vec<String>,
    pub reason: String,
    pub explanation: String,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpretError {
    #[error("Ollama returned an empty response.")]
    Empty,

    #[error("Ollama response held only <think> reasoning and no JSON reply.")]
    OnlyReasoning,

    #[error("Failed to decode JSON response: {detail}. Raw text was:\n{raw}")]
    Syntax { detail: String, raw: String },

    #[error("JSON received, but it is {found}, not an object.")]
    NotAnObject { found: &'static str },

    #[error("JSON received, but 'commands' key is missing or null.")]
    MissingCommands,

    #[error("JSON 'commands' value is not a list (got {found}).")]
    CommandsNotList { found: &'static str },

    #[error("Item {index} in 'commands' list is not a string (got {found}).")]
    NonStringCommand { index: usize, found: &'static str },
}

pub fn interpret(raw: &str) -> Result<ModelReply, InterpretError> {
    if raw.trim().is_empty() {
        return Err(InterpretError::Empty);
    }

    let answer = skip_reasoning_prefix(raw);
    if answer.is_empty() {
        return Err(InterpretError::OnlyReasoning);
    }

    let candidate = extract_json_candidate(answer);
    let value: Value =
        serde_json::from_str(candidate).map_err(|err| InterpretError::Syntax {
            detail: err.to_string(),
            raw: raw.to_string(),
        })?;

    let Value::Object(fields) = value else {
        return Err(InterpretError::NotAnObject {
            found: json_type_name(&value),
        });
    };

    Ok(ModelReply {
        commands: validate_commands(&fields)?,
        reason: optional_text(&fields, "reason"),
        explanation: optional_text(&fields, "explanation"),
        question: optional_text(&fields, "question"),
    })
}

fn validate_commands(fields: &Map<String, Value>) -> Result<Vec<String>, InterpretError> {
    let items = match fields.get("commands") {
        None | Some(Value::Null) => return Err(InterpretError::MissingCommands),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(InterpretError::CommandsNotList {
                found: json_type_name(other),
            });
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(command) => Ok(command.clone()),
            other => Err(InterpretError::NonStringCommand {
                index,
                found: json_type_name(other),
            }),
        })
        .collect()
}

fn optional_text(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Pick the most likely JSON document inside `text`.
pub(crate) fn extract_json_candidate(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(captures) = JSON_FENCE.captures(trimmed) {
        if let Some(body) = captures.get(1) {
            return body.as_str().trim();
        }
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// Skip `<think>...</think>` blocks at the start of a reply; an unclosed one
/// swallows the rest.
pub(crate) fn skip_reasoning_prefix(input: &str) -> &str {
    let mut rest = input.trim_start();

    while let Some(after_open) = rest.strip_prefix("<think>") {
        match after_open.find("</think>") {
            Some(close) => rest = after_open[close + "</think>".len()..].trim_start(),
            None => return "",
        }
    }

    rest
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_in_order_with_explanation() {
        let reply =
            interpret(r#"{"commands":["date","ls -l"],"explanation":"info"}"#).unwrap();

        assert_eq!(reply.commands, vec!["date".to_string(), "ls -l".to_string()]);
        assert_eq!(reply.explanation, "info");
        assert_eq!(reply.reason, "");
        assert_eq!(reply.question, "");
    }

    #[test]
    fn fenced_reply_matches_unwrapped_reply() {
        let bare = r#"{"commands":["git status","git log --oneline -5"],"reason":"inspect repo"}"#;
        let fenced = format!("Here you go:\n```json\n{bare}\n```\nLet me know!");

        assert_eq!(interpret(&fenced).unwrap(), interpret(bare).unwrap());
    }

    #[test]
    fn fenced_empty_command_list_is_not_an_error() {
        let reply = interpret("```json\n{\"commands\":[]}\n```").unwrap();
        assert!(reply.commands.is_empty());
    }

    #[test]
    fn prose_around_braces_is_ignored() {
        let reply = interpret(
            "Sure! {\"commands\": [\"uname -a\"], \"reason\": \"kernel info\"} Hope that helps.",
        )
        .unwrap();

        assert_eq!(reply.commands, vec!["uname -a".to_string()]);
        assert_eq!(reply.reason, "kernel info");
    }

    #[test]
    fn nested_braces_inside_commands_survive_extraction() {
        let raw = r#"{"commands":["awk '{print $1}' access.log"]}"#;
        let reply = interpret(raw).unwrap();
        assert_eq!(reply.commands, vec!["awk '{print $1}' access.log".to_string()]);
    }

    #[test]
    fn leading_think_blocks_are_skipped_before_extraction() {
        let raw = "<think>maybe {\"commands\":[\"rm -rf /\"]}?</think>\n{\"commands\":[\"pwd\"]}";
        assert_eq!(interpret(raw).unwrap().commands, vec!["pwd".to_string()]);

        let twice = "  <think>a</think>\n<think>b</think>{\"commands\":[\"id\"]}";
        assert_eq!(interpret(twice).unwrap().commands, vec!["id".to_string()]);

        let trailing = "{\"commands\":[\"whoami\"]}<think>still reasoning";
        assert_eq!(interpret(trailing).unwrap().commands, vec!["whoami".to_string()]);
    }

    #[test]
    fn think_tag_inside_command_is_kept_verbatim() {
        let reply = interpret(r#"{"commands":["grep -rn '<think>' logs/"]}"#).unwrap();
        assert_eq!(reply.commands, vec!["grep -rn '<think>' logs/".to_string()]);

        let reply = interpret(
            r##"{"commands":["sed -i 's#<think>##g' out.txt"],"reason":"drop <think> tags"}"##,
        )
        .unwrap();
        assert_eq!(reply.commands, vec!["sed -i 's#<think>##g' out.txt".to_string()]);
        assert_eq!(reply.reason, "drop <think> tags");
    }

    #[test]
    fn question_is_surfaced_with_empty_commands() {
        let reply = interpret(
            r#"{"commands":[],"question":"Which project directory do you want to delete?"}"#,
        )
        .unwrap();

        assert!(reply.commands.is_empty());
        assert_eq!(reply.question, "Which project directory do you want to delete?");
    }

    #[test]
    fn plain_text_is_a_syntax_error_quoting_the_raw_reply() {
        let err = interpret("not json at all").unwrap_err();

        assert!(matches!(err, InterpretError::Syntax { .. }));
        assert!(err.to_string().contains("not json at all"));
    }

    #[test]
    fn blank_reply_is_empty_error() {
        assert_eq!(interpret("").unwrap_err(), InterpretError::Empty);
        assert_eq!(interpret("  \n ").unwrap_err(), InterpretError::Empty);
    }

    #[test]
    fn reasoning_without_answer_is_reported_as_such() {
        assert_eq!(
            interpret("<think>hmm</think>\n").unwrap_err(),
            InterpretError::OnlyReasoning
        );
        let err = interpret("<think>never closed {\"commands\":[\"ls\"]}").unwrap_err();
        assert_eq!(err, InterpretError::OnlyReasoning);
        assert!(err.to_string().contains("only <think> reasoning"));
    }

    #[test]
    fn missing_or_null_commands_is_rejected() {
        assert_eq!(
            interpret(r#"{"reason":"nothing to do"}"#).unwrap_err(),
            InterpretError::MissingCommands
        );
        assert_eq!(
            interpret(r#"{"commands":null}"#).unwrap_err(),
            InterpretError::MissingCommands
        );
    }

    #[test]
    fn non_list_commands_are_never_coerced() {
        assert_eq!(
            interpret(r#"{"commands":3}"#).unwrap_err(),
            InterpretError::CommandsNotList { found: "number" }
        );
        assert_eq!(
            interpret(r#"{"commands":{"cmd":"ls"}}"#).unwrap_err(),
            InterpretError::CommandsNotList { found: "object" }
        );
        assert_eq!(
            interpret(r#"{"commands":"ls"}"#).unwrap_err(),
            InterpretError::CommandsNotList { found: "string" }
        );
    }

    #[test]
    fn non_string_element_names_its_position() {
        let err = interpret(r#"{"commands":["ls", 42, "pwd"]}"#).unwrap_err();

        assert_eq!(
            err,
            InterpretError::NonStringCommand {
                index: 1,
                found: "number"
            }
        );
        assert!(err.to_string().contains("Item 1"));
    }

    #[test]
    fn top_level_array_is_not_an_object() {
        assert_eq!(
            interpret(r#"["ls"]"#).unwrap_err(),
            InterpretError::NotAnObject { found: "array" }
        );
    }

    #[test]
    fn non_string_optional_fields_default_to_empty() {
        let reply = interpret(r#"{"commands":["ls"],"reason":7,"question":null}"#).unwrap();
        assert_eq!(reply.reason, "");
        assert_eq!(reply.question, "");
    }
}
