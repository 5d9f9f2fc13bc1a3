//! Prompt templates for every model call in the pipeline.
//!
//! Each prompt is a [`PromptTemplate`] built by a pure function and rendered
//! into a single self-contained text block, so prompts can be tested without
//! a model.

use querypilot_tools::{DatabaseProvider, QueryResultSet};

/// Key holding the intent in classification output
pub const INTENT_KEY: &str = "intent";
/// Key holding the clarification question in classification output
pub const MISSING_INFO_KEY: &str = "missing_info";
/// Key holding the statement in SQL generation output
pub const QUERY_KEY: &str = "query";

const CLARIFICATION_FALLBACK: &str =
    "Could you tell me more about which data or time period you are interested in?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub persona: String,
    pub instructions: String,
    pub schema: Option<String>,
    pub context: Option<String>,
    pub user_input: String,
}

impl PromptTemplate {
    pub fn render(&self) -> String {
        let mut sections = vec![
            self.persona.trim().to_string(),
            format!("## Instructions\n{}", self.instructions.trim()),
        ];
        if let Some(schema) = &self.schema {
            sections.push(format!("## Database schema\n{}", schema.trim()));
        }
        if let Some(context) = &self.context {
            sections.push(format!("## Context\n{}", context.trim()));
        }
        sections.push(format!("## User message\n{}", self.user_input.trim()));
        sections.join("\n\n")
    }
}

pub fn classification_prompt(persona: &str, schema: &str, utterance: &str) -> PromptTemplate {
    let instructions = format!(
        r#"Classify the user message into exactly one intent:
- "database_query": the question can be answered by querying the database described below.
- "strategic_advice": the user wants recommendations or interpretation that should be grounded in data from the database.
- "clarification_needed": the message is about the data but too vague to write a query. You MUST also set "{missing}" to the question the user should answer.
- "general_chat": greetings, small talk or anything unrelated to the data.

Respond with a single JSON object and nothing else. Examples:
{{"{intent}": "database_query"}}
{{"{intent}": "clarification_needed", "{missing}": "Which time period should the report cover?"}}"#,
        intent = INTENT_KEY,
        missing = MISSING_INFO_KEY,
    );

    PromptTemplate {
        persona: persona.to_string(),
        instructions,
        schema: Some(schema.to_string()),
        context: None,
        user_input: utterance.to_string(),
    }
}

pub fn sql_generation_prompt(
    schema: &str,
    utterance: &str,
    provider: DatabaseProvider,
) -> PromptTemplate {
    let dialect = provider.display_name();
    let quote = provider.identifier_quote();
    let instructions = format!(
        r#"Write exactly one {dialect} SELECT statement that answers the user message.
- Use only the tables and columns listed in the schema.
- Quote identifiers with {quote} as {dialect} requires.
- Do not end the statement with a semicolon.
- Never modify data or schema.

Respond with a single JSON object of the form {{"{key}": "<SQL statement>"}} and nothing else."#,
        key = QUERY_KEY,
    );

    PromptTemplate {
        persona: format!(
            "You are an expert {} analyst who writes precise, read-only SQL.",
            dialect
        ),
        instructions,
        schema: Some(schema.to_string()),
        context: None,
        user_input: utterance.to_string(),
    }
}

pub fn analysis_prompt(persona: &str, question: &str, result: &QueryResultSet) -> PromptTemplate {
    let mut context = format!(
        "Query results ({} rows):\n{}",
        result.row_count,
        result.to_json()
    );
    if result.truncated {
        context.push_str(&format!(
            "\nOnly the first {} rows are shown; the full result is larger.",
            result.row_count
        ));
    }

    PromptTemplate {
        persona: persona.to_string(),
        instructions: "Answer the user message using the query results.\n\
            1. Answer the question directly.\n\
            2. Point out one concrete insight from the data.\n\
            3. Give one actionable recommendation.\n\
            4. Keep the reply concise and conversational."
            .to_string(),
        schema: None,
        context: Some(context),
        user_input: question.to_string(),
    }
}

pub fn conversation_prompt(persona: &str, utterance: &str) -> PromptTemplate {
    PromptTemplate {
        persona: persona.to_string(),
        instructions: "Reply to the user message in character with a short, conversational answer."
            .to_string(),
        schema: None,
        context: None,
        user_input: utterance.to_string(),
    }
}

/// Reply used when the question is too vague to query
pub fn clarification_response(missing_info: Option<&str>) -> String {
    let question = missing_info
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(CLARIFICATION_FALLBACK);
    format!(
        "I need a bit more information before I can answer that. {}",
        question
    )
}
