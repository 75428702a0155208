//! The directive tag scanner.
//!
//! Grammar (flat, no nesting, `[`/`]` delimited, colon-separated):
//!
//! ```text
//! [BUTTON:<label>:<action>]
//! [FORM:<title>:<field1>[:type],<field2>[:type],...]
//! [SAVE_DATA:<json object>]
//! [INFO:<message>]
//! ```
//!
//! The scan is global and exhaustive; every recognized tag is stripped
//! from the returned message. A tag that fails to match (e.g. missing
//! closing bracket) is left behind as literal text — the grammar degrades
//! to plain text rather than erroring.

use std::sync::LazyLock;

use regex::Regex;

use crate::directive::command::{
    ButtonVariant, Command, CommandKind, FieldType, FormField,
};
use crate::lang::Language;

static BUTTON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[BUTTON:([^:\]]+):([^\]]+)\]").expect("valid regex"));

static FORM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[FORM:([^:\]]+):([^\]]+)\]").expect("valid regex"));

static INFO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[INFO:([^\]]+)\]").expect("valid regex"));

/// Result of parsing one agent response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    /// The response with all recognized tags stripped, trimmed.
    pub message: String,
    /// Extracted commands, in first-seen order.
    pub commands: Vec<Command>,
}

/// A recognized tag occurrence: byte range in the input plus the command
/// it produced (none for a SAVE_DATA tag whose JSON failed to parse —
/// the tag is still stripped).
struct TagMatch {
    start: usize,
    end: usize,
    command: Option<Command>,
}

/// Parse one raw agent response into a clean message and command list.
///
/// Pure function of the input; the only side effect is a diagnostic log
/// when a `SAVE_DATA` payload is not valid JSON.
pub fn parse(text: &str, language: Language) -> ParsedResponse {
    let mut matches: Vec<TagMatch> = Vec::new();

    for caps in BUTTON_RE.captures_iter(text) {
        let whole = caps.get(0).expect("group 0 always present");
        matches.push(TagMatch {
            start: whole.start(),
            end: whole.end(),
            command: Some(Command::new(CommandKind::Button {
                text: caps[1].trim().to_string(),
                action: caps[2].trim().to_string(),
                variant: ButtonVariant::default(),
            })),
        });
    }

    for caps in FORM_RE.captures_iter(text) {
        let whole = caps.get(0).expect("group 0 always present");
        matches.push(TagMatch {
            start: whole.start(),
            end: whole.end(),
            command: Some(Command::new(CommandKind::Form {
                title: caps[1].trim().to_string(),
                fields: parse_form_fields(&caps[2], language),
            })),
        });
    }

    for caps in INFO_RE.captures_iter(text) {
        let whole = caps.get(0).expect("group 0 always present");
        matches.push(TagMatch {
            start: whole.start(),
            end: whole.end(),
            command: Some(Command::new(CommandKind::Info {
                message: caps[1].trim().to_string(),
            })),
        });
    }

    scan_save_data(text, &mut matches);

    // First-seen order for commands and for stripping.
    matches.sort_by_key(|m| m.start);

    let mut message = String::with_capacity(text.len());
    let mut commands = Vec::new();
    let mut cursor = 0;
    for m in matches {
        // Overlaps cannot occur between kinds (distinct tag prefixes),
        // but guard against a malformed collection anyway.
        if m.start < cursor {
            continue;
        }
        message.push_str(&text[cursor..m.start]);
        cursor = m.end;
        if let Some(command) = m.command {
            commands.push(command);
        }
    }
    message.push_str(&text[cursor..]);

    ParsedResponse {
        message: message.trim().to_string(),
        commands,
    }
}

/// Parse the comma-separated field list of a FORM tag.
///
/// Each entry is `name` or `name:type`; type defaults to `text`, every
/// field is required, and the placeholder is derived in the active
/// language.
fn parse_form_fields(raw: &str, language: Language) -> Vec<FormField> {
    raw.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            let (name, field_type) = match entry.split_once(':') {
                Some((name, suffix)) => (name.trim(), FieldType::from_suffix(suffix)),
                None => (entry, FieldType::Text),
            };
            if name.is_empty() {
                return None;
            }
            Some(FormField {
                name: name.to_string(),
                field_type,
                required: true,
                placeholder: language.field_placeholder(name),
            })
        })
        .collect()
}

/// Hand-rolled scan for `[SAVE_DATA:<json>]`.
///
/// The JSON payload may contain `[`/`]` pairs (arrays), so a lazy regex
/// would stop at the first inner `]`. Track bracket depth instead: the
/// tag closes when depth returns to zero. Payloads with unbalanced
/// brackets never close and are left as literal text.
fn scan_save_data(text: &str, matches: &mut Vec<TagMatch>) {
    const PREFIX: &str = "[SAVE_DATA:";

    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find(PREFIX) {
        let start = search_from + rel;
        let payload_start = start + PREFIX.len();

        let mut depth = 1usize;
        let mut close = None;
        for (i, c) in text[payload_start..].char_indices() {
            match c {
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(payload_start + i);
                        break;
                    }
                }
                _ => {}
            }
        }

        let Some(close) = close else {
            // No closing bracket: not a tag, leave it in the message.
            break;
        };

        let payload = text[payload_start..close].trim();
        let command = match serde_json::from_str::<serde_json::Value>(payload) {
            Ok(value) if value.is_object() => {
                Some(Command::new(CommandKind::SaveData { payload: value }))
            }
            Ok(other) => {
                tracing::debug!(
                    "SAVE_DATA payload is not a JSON object ({}), dropping",
                    other
                );
                None
            }
            Err(e) => {
                tracing::debug!("Invalid JSON in SAVE_DATA tag, dropping: {e}");
                None
            }
        };

        matches.push(TagMatch {
            start,
            end: close + 1,
            command,
        });
        search_from = close + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_en(text: &str) -> ParsedResponse {
        parse(text, Language::En)
    }

    #[test]
    fn plain_text_passes_through_trimmed() {
        let result = parse_en("  Hello there!  ");
        assert_eq!(result.message, "Hello there!");
        assert!(result.commands.is_empty());
    }

    #[test]
    fn button_tag_extracted_and_stripped() {
        let result = parse_en("Pick one: [BUTTON:Start now:begin_onboarding]");
        assert_eq!(result.message, "Pick one:");
        assert_eq!(result.commands.len(), 1);
        match &result.commands[0].kind {
            CommandKind::Button {
                text,
                action,
                variant,
            } => {
                assert_eq!(text, "Start now");
                assert_eq!(action, "begin_onboarding");
                assert_eq!(*variant, ButtonVariant::Primary);
            }
            other => panic!("expected button, got {other:?}"),
        }
        assert!(!result.message.contains("[BUTTON"));
    }

    #[test]
    fn button_action_may_contain_colons() {
        let result = parse_en("[BUTTON:Open:nav:dashboard:main]");
        match &result.commands[0].kind {
            CommandKind::Button { action, .. } => {
                assert_eq!(action, "nav:dashboard:main")
            }
            other => panic!("expected button, got {other:?}"),
        }
    }

    #[test]
    fn form_tag_with_typed_and_untyped_fields() {
        let result =
            parse_en("[FORM:Contact details:name,work email:email,phone:tel,employees:number]");
        assert_eq!(result.message, "");
        match &result.commands[0].kind {
            CommandKind::Form { title, fields } => {
                assert_eq!(title, "Contact details");
                assert_eq!(fields.len(), 4);
                assert_eq!(fields[0].name, "name");
                assert_eq!(fields[0].field_type, FieldType::Text);
                assert_eq!(fields[0].placeholder, "Enter name");
                assert!(fields[0].required);
                assert_eq!(fields[1].name, "work email");
                assert_eq!(fields[1].field_type, FieldType::Email);
                assert_eq!(fields[2].field_type, FieldType::Tel);
                assert_eq!(fields[3].field_type, FieldType::Number);
            }
            other => panic!("expected form, got {other:?}"),
        }
    }

    #[test]
    fn form_placeholders_use_active_language() {
        let result = parse("[FORM:بيانات:الاسم]", Language::Ar);
        match &result.commands[0].kind {
            CommandKind::Form { fields, .. } => {
                assert!(fields[0].placeholder.starts_with("أدخل"));
            }
            other => panic!("expected form, got {other:?}"),
        }
    }

    #[test]
    fn save_data_valid_json() {
        let result = parse_en(r#"Saved! [SAVE_DATA:{"company_name":"Acme","budget":5000}]"#);
        assert_eq!(result.message, "Saved!");
        match &result.commands[0].kind {
            CommandKind::SaveData { payload } => {
                assert_eq!(payload["company_name"], "Acme");
                assert_eq!(payload["budget"], 5000);
            }
            other => panic!("expected save_data, got {other:?}"),
        }
    }

    #[test]
    fn save_data_with_nested_array() {
        let result = parse_en(r#"[SAVE_DATA:{"goals":["awareness","leads"]}]done"#);
        assert_eq!(result.message, "done");
        match &result.commands[0].kind {
            CommandKind::SaveData { payload } => {
                assert_eq!(payload["goals"][1], "leads");
            }
            other => panic!("expected save_data, got {other:?}"),
        }
    }

    #[test]
    fn save_data_invalid_json_dropped_but_stripped() {
        let result = parse_en("before [SAVE_DATA:{not json}] after");
        assert_eq!(result.message, "before  after");
        assert!(result.commands.is_empty());
    }

    #[test]
    fn save_data_non_object_dropped() {
        let result = parse_en(r#"[SAVE_DATA:"just a string"]"#);
        assert!(result.commands.is_empty());
        assert_eq!(result.message, "");
    }

    #[test]
    fn info_tag() {
        let result = parse_en("[INFO:Analysis may take a minute]");
        match &result.commands[0].kind {
            CommandKind::Info { message } => {
                assert_eq!(message, "Analysis may take a minute")
            }
            other => panic!("expected info, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_order_preserved() {
        let result = parse_en("[INFO:Hello][BUTTON:Click:doThing]rest of message");
        assert_eq!(result.message, "rest of message");
        assert_eq!(result.commands.len(), 2);
        assert!(matches!(
            &result.commands[0].kind,
            CommandKind::Info { message } if message == "Hello"
        ));
        assert!(matches!(
            &result.commands[1].kind,
            CommandKind::Button { text, action, .. }
                if text == "Click" && action == "doThing"
        ));
    }

    #[test]
    fn multiple_tags_of_same_kind() {
        let result = parse_en("[BUTTON:A:a] mid [BUTTON:B:b]");
        assert_eq!(result.commands.len(), 2);
        assert_eq!(result.message, "mid");
    }

    #[test]
    fn malformed_tag_stays_literal() {
        let result = parse_en("[BUTTON:Unclosed:action and more text");
        assert!(result.commands.is_empty());
        assert_eq!(
            result.message,
            "[BUTTON:Unclosed:action and more text"
        );
    }

    #[test]
    fn unclosed_save_data_stays_literal() {
        let result = parse_en(r#"[SAVE_DATA:{"a":[1,2}"#);
        assert!(result.commands.is_empty());
        assert_eq!(result.message, r#"[SAVE_DATA:{"a":[1,2}"#);
    }

    #[test]
    fn mixed_tags_interleaved_with_prose() {
        let text = "Welcome! [INFO:tip] Choose: [BUTTON:Yes:confirm] or reply.\n\
                    [SAVE_DATA:{\"step\":1}] Thanks.";
        let result = parse_en(text);
        assert_eq!(result.commands.len(), 3);
        assert!(!result.message.contains('['));
        assert!(result.message.contains("Welcome!"));
        assert!(result.message.contains("Thanks."));
    }

    #[test]
    fn empty_input() {
        let result = parse_en("");
        assert_eq!(result.message, "");
        assert!(result.commands.is_empty());
    }

    #[test]
    fn commands_have_unique_ids_within_a_parse() {
        let result = parse_en("[INFO:a][INFO:b][INFO:c]");
        let mut ids: Vec<_> = result.commands.iter().map(|c| c.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }
}
