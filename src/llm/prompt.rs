//! Prompt construction for translation requests.
//!
//! Builds the SQLite system prompt with the full schema text embedded.

use crate::llm::types::Message;
use crate::llm::NO_QUERY_SENTINEL;

/// System prompt template for the SQL assistant.
const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are an expert SQLite assistant for SQLite databases.

{schema}

Note that all commands must be valid commands for SQLite, not MySQL or PostgreSQL.

If the user's input requires a database query, generate ONLY the SQL query needed to answer their question.
Do not include explanations, markdown, back ticks or code blocks - just the raw SQL query.

CRITICAL RULES:
1. NEVER use placeholder values like 'your_user_id', 'example_value', 'user_id_here', etc.
2. If the user says "the user" or "the one user" and context suggests there's only one row, omit the WHERE clause entirely.
3. If the user doesn't provide enough information to identify a specific row (like an ID or unique value), return:
   {sentinel}

If the user's input does NOT require a database query (e.g., greetings, general questions, help requests), respond with exactly:
{sentinel}"#;

/// Builds the system prompt with the schema description injected.
pub fn build_system_prompt(schema: &str) -> String {
    SYSTEM_PROMPT_TEMPLATE
        .replace("{schema}", schema.trim_end())
        .replace("{sentinel}", NO_QUERY_SENTINEL)
}

/// Builds the message list for one translation: system prompt, then the request.
pub fn build_messages(request: &str, schema: &str) -> Vec<Message> {
    vec![
        Message::system(build_system_prompt(schema)),
        Message::user(request),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::Role;

    const SCHEMA: &str =
        "Database Schema:\n\nCREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)\n\n";

    #[test]
    fn test_system_prompt_contains_schema() {
        let prompt = build_system_prompt(SCHEMA);
        assert!(prompt.contains("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)"));
        assert!(prompt.contains("SQLite"));
        assert!(!prompt.contains("{schema}"));
    }

    #[test]
    fn test_system_prompt_names_sentinel() {
        let prompt = build_system_prompt("");
        assert!(prompt.contains("NEVER use placeholder values"));
        assert!(prompt.ends_with(NO_QUERY_SENTINEL));
        assert!(!prompt.contains("{sentinel}"));
    }

    #[test]
    fn test_build_messages() {
        let messages = build_messages("how many users?", SCHEMA);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1], Message::user("how many users?"));
    }
}
