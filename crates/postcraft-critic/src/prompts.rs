use schemars::schema_for;

use crate::CritiqueVerdict;

/// Prompt templates for the critic
pub struct CritiquePrompts;

impl CritiquePrompts {
    pub const SYSTEM: &'static str = "You are a harsh but fair social media critic.";

    /// Build the critique request for a draft
    pub fn build_evaluation_prompt(draft: &str, topic: &str, mood: Option<&str>) -> String {
        format!(
            r#"Critique this tweet: "{draft}" for the topic "{topic}". Tone should be "{tone}". Strictly return JSON:
{instructions}"#,
            draft = draft,
            topic = topic,
            tone = mood.unwrap_or("any"),
            instructions = Self::format_instructions(),
        )
    }

    /// Machine-readable description of the verdict the critic must return
    pub fn format_instructions() -> String {
        format!(
            r#"The output should be formatted as a JSON instance that conforms to the JSON schema below.

As an example, for the schema {{"properties": {{"foo": {{"type": "array", "items": {{"type": "string"}}}}}}, "required": ["foo"]}}
the object {{"foo": ["bar", "baz"]}} is a well-formatted instance of the schema. The object {{"properties": {{"foo": ["bar", "baz"]}}}} is not well-formatted.

Here is the output schema:
```
{schema}
```"#,
            schema = verdict_schema(),
        )
    }
}

fn verdict_schema() -> String {
    let mut value = serde_json::to_value(schema_for!(CritiqueVerdict)).unwrap_or_default();
    if let serde_json::Value::Object(map) = &mut value {
        map.remove("$schema");
        map.remove("title");
    }
    value.to_string()
}
