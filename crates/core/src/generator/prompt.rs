//! Generation prompts.

use super::config::GenerationConstraints;
use crate::ticket::RootCause;

pub const GENERATION_SYSTEM_PROMPT: &str = r#"You are generating synthetic telecom incident tickets for evaluating LLM reasoning quality.

Rules:
- Incidents must resemble real enterprise telecom tickets (imperfect, partial, messy).
- Do NOT explicitly state the root cause in the ticket text.
- Some tickets must be ambiguous or misleading.
- Some tickets must lack sufficient information to diagnose confidently.
- Use realistic telecom language (CDRs, mediation, probes, KPIs, signaling, etc.).

Generate incidents strictly as a JSON array."#;

fn quoted_list(categories: &[RootCause]) -> String {
    categories
        .iter()
        .map(|c| format!("\"{}\"", c.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the user instruction from the batch constraints.
pub fn build_user_prompt(constraints: &GenerationConstraints) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Generate {} synthetic telecom incident tickets.\n\n",
        constraints.batch_size
    ));

    prompt.push_str("For each ticket include:\n");
    prompt.push_str("- ticket_id\n");
    prompt.push_str("- short_description\n");
    prompt.push_str("- detailed_notes\n");
    prompt.push_str("- severity (integer 1-4)\n");
    prompt.push_str(&format!(
        "- true_root_cause (one of: {})\n",
        quoted_list(&constraints.categories)
    ));
    prompt.push_str("- ambiguity_level (low | medium | high)\n");

    prompt.push_str("\nEnsure:\n");
    if constraints.min_high_ambiguity > 0 {
        prompt.push_str(&format!(
            "- At least {} tickets have ambiguity_level = high\n",
            constraints.min_high_ambiguity
        ));
    }
    for (category, min) in &constraints.min_per_category {
        if *min > 0 {
            prompt.push_str(&format!(
                "- At least {} tickets have true_root_cause = \"{}\"\n",
                min,
                category.as_str()
            ));
        }
    }
    if constraints.min_post_change > 0 {
        prompt.push_str(&format!(
            "- At least {} tickets involve post-change / post-deployment symptoms\n",
            constraints.min_post_change
        ));
    }
    prompt.push_str("- Every ticket_id is unique\n");

    prompt
}
