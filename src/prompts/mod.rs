//! Prompt templates for keyword extraction, scoring and project chat.
//!
//! Templates use `{name}` placeholders filled by [`render`].

/// Keyword extraction. Placeholders: `{min_categories}`, `{project_text}`.
pub const KEYWORD_TEMPLATE: &str = r#"Identify 5-7 specific keywords or topics from this wildlife conservation project text and only the project text that would help find relevant scientific papers or conservation reports.
Focus on:
- Species names
- Conservation techniques
- Geographic locations
- Ecological challenges

Decide first whether the text is descriptive enough: it must clearly cover at least {min_categories} of the four focus areas above. If it does not, respond with exactly: insufficient

Return ONLY a comma-separated list, no commentary.

Project Text:
{project_text}

Your response should be a list of comma separated values, eg: `foo, bar, baz` or `foo,bar,baz`"#;

/// Scoring. Placeholders: `{project_text}`, `{search_results}`.
pub const SCORING_TEMPLATE: &str = r#"Analyze this wildlife conservation project and recent conservation data.
Generate a success score (0-100) considering:

**Project Details:**
{project_text}

**Recent Relevant Data:**
{search_results}

Use these criteria:
1. Alignment with latest conservation science (0-25)
2. Community impact (0-20)
3. Biodiversity outcomes (0-30)
4. Sustainability (0-15)
5. Replicability (0-10)

Return ONLY a JSON object with 'score_breakdown' and 'final_score'. No commentary.
'score_breakdown' must be an object with the integer keys conservation_science_alignment, community_impact, biodiversity_outcomes, sustainability and replicability, each within its range above. 'final_score' must be an integer between 0 and 100."#;

/// Project chat. Placeholders: `{context}`, `{project_text}`, `{question}`.
pub const CHAT_TEMPLATE: &str = r#"You are an expert in wildlife conservation. Use the following context to answer questions about the following wildlife conservation project proposal:

Context from database:
{context}

Project proposal description:
{project_text}

User question: {question}

Answer the question based on the context. If you cannot find the answer in the context, say so clearly."#;

/// Replaces each `{name}` in `template` with its value from `vars`.
///
/// Substitution is a single left-to-right pass, so braces inside values are never
/// expanded. Unknown placeholders are left as written.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replaced = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
