//! Reply parsing for translation responses.
//!
//! Models are told to answer with raw SQL, but some still wrap it in a
//! markdown fence. The fence is stripped, then the sentinel is recognised.

use crate::error::{PeekError, Result};
use crate::llm::{Translation, NO_QUERY_SENTINEL};

/// Parses a provider reply into a [`Translation`].
///
/// An empty reply (or an empty fenced block) is malformed.
pub fn parse_translation(reply: &str) -> Result<Translation> {
    let body = extract_code_block(reply).unwrap_or(reply).trim();

    if body.is_empty() {
        return Err(PeekError::translation("Empty response from translator"));
    }
    if is_sentinel(body) {
        return Ok(Translation::NoQuery);
    }
    Ok(Translation::Query(body.to_string()))
}

/// Matches the sentinel case-insensitively, tolerating trailing punctuation.
fn is_sentinel(text: &str) -> bool {
    let bare = text.trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());
    bare.eq_ignore_ascii_case(NO_QUERY_SENTINEL)
}

/// Returns the contents of the first fenced block, any language tag dropped.
fn extract_code_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    let content_start = after_fence.find('\n')? + 1;
    let content = &after_fence[content_start..];
    let end = content.find("```")?;
    Some(&content[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn query(sql: &str) -> Translation {
        Translation::Query(sql.to_string())
    }

    #[test]
    fn test_raw_sql_is_trimmed() {
        assert_eq!(
            parse_translation("  SELECT * FROM users;\n").unwrap(),
            query("SELECT * FROM users;")
        );
    }

    #[test]
    fn test_sql_fence_is_stripped() {
        let reply = "```sql\nUPDATE users SET name = 'X' WHERE id = 1;\n```";
        assert_eq!(
            parse_translation(reply).unwrap(),
            query("UPDATE users SET name = 'X' WHERE id = 1;")
        );
    }

    #[test]
    fn test_bare_fence_with_surrounding_text() {
        let reply = "Here you go:\n```\nSELECT COUNT(*) FROM orders\n```\nEnjoy.";
        assert_eq!(
            parse_translation(reply).unwrap(),
            query("SELECT COUNT(*) FROM orders")
        );
    }

    #[test]
    fn test_multiline_sql_survives() {
        let reply = "```sql\nSELECT u.id,\n       u.name\nFROM users u\n```";
        assert_eq!(
            parse_translation(reply).unwrap(),
            query("SELECT u.id,\n       u.name\nFROM users u")
        );
    }

    #[test]
    fn test_sentinel_variants() {
        for reply in [
            "NO_QUERY_NEEDED",
            "no_query_needed",
            "  NO_QUERY_NEEDED.\n",
            "NO_QUERY_NEEDED!",
            "```\nNO_QUERY_NEEDED\n```",
        ] {
            assert_eq!(parse_translation(reply).unwrap(), Translation::NoQuery, "{reply:?}");
        }
    }

    #[test]
    fn test_sentinel_inside_sentence_is_not_sentinel() {
        let parsed = parse_translation("I think NO_QUERY_NEEDED here").unwrap();
        assert!(matches!(parsed, Translation::Query(_)));
    }

    #[test]
    fn test_empty_reply_is_error() {
        let err = parse_translation("   \n").unwrap_err();
        assert!(matches!(err, PeekError::Translation(_)));

        assert!(parse_translation("```sql\n```").is_err());
    }

    #[test]
    fn test_unclosed_fence_falls_back_to_whole_text() {
        assert_eq!(
            parse_translation("```sql\nSELECT 1").unwrap(),
            query("```sql\nSELECT 1")
        );
    }
}
