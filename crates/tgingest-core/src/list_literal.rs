//! Textual encodings of the list-valued media columns.
//!
//! The dataset file stores lists as JSON arrays. Files written by earlier tooling
//! hold Python-style literals (`['a', 'b']`), so the reader accepts both.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid list literal {value:?}: {reason}")]
pub struct ListLiteralError {
    pub value: String,
    pub reason: &'static str,
}

/// Encodes a list for a dataset cell. Empty lists become an empty cell.
#[must_use]
pub fn encode_list(items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    serde_json::to_string(items).unwrap_or_default()
}

/// Parses a dataset cell back into a list.
///
/// Accepts an empty cell, a JSON array of strings, or a Python list literal whose
/// items are single- or double-quoted strings.
///
/// # Errors
///
/// Returns [`ListLiteralError`] when the cell is not a bracketed list of strings.
pub fn parse_list(raw: &str) -> Result<Vec<String>, ListLiteralError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
        return Ok(items);
    }
    parse_quoted_list(trimmed).map_err(|reason| ListLiteralError {
        value: raw.to_string(),
        reason,
    })
}

fn parse_quoted_list(s: &str) -> Result<Vec<String>, &'static str> {
    let inner = s
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or("missing surrounding brackets")?;

    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();
    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let Some(quote) = chars.next() else {
            break;
        };
        if quote != '\'' && quote != '"' {
            return Err("item is not a quoted string");
        }

        let mut item = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('n') => item.push('\n'),
                    Some('t') => item.push('\t'),
                    Some(other) => item.push(other),
                    None => return Err("dangling escape"),
                },
                c if c == quote => {
                    closed = true;
                    break;
                }
                c => item.push(c),
            }
        }
        if !closed {
            return Err("unterminated string");
        }
        items.push(item);

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some(',') => {}
            Some(_) => return Err("expected comma between items"),
        }
    }
    Ok(items)
}

/// Renders a list in Postgres array input syntax: `{"a","b"}`.
///
/// Items are always double-quoted; embedded `"` and `\` are backslash-escaped.
#[must_use]
pub fn pg_array_literal(items: &[String]) -> String {
    let quoted: Vec<String> = items
        .iter()
        .map(|item| {
            let escaped = item.replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{escaped}\"")
        })
        .collect();
    format!("{{{}}}", quoted.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn empty_list_encodes_as_empty_cell() {
        assert_eq!(encode_list(&[]), "");
        assert_eq!(parse_list("").unwrap(), Vec::<String>::new());
        assert_eq!(parse_list("  ").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn json_encoding_is_read_back() {
        let items = strings(&["https://cdn.example/a.jpg", "https://cdn.example/b.jpg"]);
        let encoded = encode_list(&items);
        assert_eq!(
            encoded,
            r#"["https://cdn.example/a.jpg","https://cdn.example/b.jpg"]"#
        );
        assert_eq!(parse_list(&encoded).unwrap(), items);
    }

    #[test]
    fn python_literal_is_parsed() {
        let parsed =
            parse_list("['../../data/tg_image/EAHCI_3_0.jpg', '../../data/tg_image/EAHCI_3_1.jpg']")
                .unwrap();
        assert_eq!(
            parsed,
            strings(&[
                "../../data/tg_image/EAHCI_3_0.jpg",
                "../../data/tg_image/EAHCI_3_1.jpg"
            ])
        );
    }

    #[test]
    fn python_literal_handles_escapes_and_mixed_quotes() {
        let parsed = parse_list(r#"['it\'s', "plain"]"#).unwrap();
        assert_eq!(parsed, strings(&["it's", "plain"]));
    }

    #[test]
    fn empty_brackets_parse_to_empty_list() {
        assert!(parse_list("[]").unwrap().is_empty());
    }

    #[test]
    fn unbracketed_value_is_rejected() {
        let err = parse_list("a.jpg").unwrap_err();
        assert_eq!(err.reason, "missing surrounding brackets");
    }

    #[test]
    fn unterminated_item_is_rejected() {
        let err = parse_list("['a.jpg]").unwrap_err();
        assert_eq!(err.reason, "unterminated string");
    }

    #[test]
    fn pg_array_literal_quotes_and_escapes() {
        assert_eq!(pg_array_literal(&[]), "{}");
        assert_eq!(
            pg_array_literal(&strings(&["a.jpg", "b.jpg"])),
            r#"{"a.jpg","b.jpg"}"#
        );
        assert_eq!(
            pg_array_literal(&strings(&[r#"say "hi"\now"#])),
            r#"{"say \"hi\"\\now"}"#
        );
    }
}
