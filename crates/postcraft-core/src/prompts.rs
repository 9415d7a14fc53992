/// Prompt templates for the drafting steps
pub struct DraftPrompts;

impl DraftPrompts {
    pub const GENERATOR_SYSTEM: &'static str =
        "You are a world-class social media expert known for crafting viral tweets.";

    pub const OPTIMIZER_SYSTEM: &'static str =
        "You are a master tweet editor who improves content based on feedback.";

    /// Build the instruction for the first draft
    pub fn build_generation_prompt(
        topic: &str,
        mood: Option<&str>,
        style_account: Option<&str>,
    ) -> String {
        let mut prompt = format!(
            r#"Write an engaging, viral-worthy tweet about: "{}"."#,
            topic
        );
        if let Some(mood) = mood {
            prompt.push_str(&format!(" The tweet must have a **{}** tone.", mood));
        }
        if let Some(account) = style_account {
            prompt.push_str(&format!(
                " Write it in the style of Twitter user @{}.",
                account
            ));
        }
        prompt
    }

    /// Build the instruction to revise a draft using the critic's feedback
    pub fn build_optimization_prompt(
        draft: &str,
        feedback: &str,
        topic: &str,
        mood: Option<&str>,
    ) -> String {
        let mut prompt = format!(
            r#"Based on the feedback "{feedback}", rewrite this tweet to make it better.
Original Tweet: "{draft}"
Topic: "{topic}""#,
            feedback = feedback,
            draft = draft,
            topic = topic,
        );
        if let Some(mood) = mood {
            prompt.push_str(&format!(
                "\nEnsure the new tweet maintains a **{}** tone.",
                mood
            ));
        }
        prompt
    }
}
