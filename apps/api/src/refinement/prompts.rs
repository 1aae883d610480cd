// Prompts for the experience-refinement call.

/// System prompt. `{max_bullets}` is replaced before sending.
pub const REFINE_SYSTEM_TEMPLATE: &str = "\
Convert job descriptions into {max_bullets} concise, impactful resume bullet points.
Key requirements:
- Use action verbs to start each bullet point
- Quantify achievements with metrics or percentages where possible
- Focus on results and impact, not just responsibilities
- Use consistent, professional language
- Put each statement on its own line and do not prefix lines with dashes";

/// User prompt. `{details}` is replaced with the raw responsibilities text.
pub const REFINE_USER_TEMPLATE: &str = "\
Transform these job responsibilities into professional, achievement-oriented bullet points:
{details}";

pub fn build_system_prompt(max_bullets: usize) -> String {
    REFINE_SYSTEM_TEMPLATE.replace("{max_bullets}", &max_bullets.to_string())
}

pub fn build_user_prompt(details: &str) -> String {
    REFINE_USER_TEMPLATE.replace("{details}", details)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_names_bullet_count() {
        let prompt = build_system_prompt(3);
        assert!(prompt.starts_with("Convert job descriptions into 3 concise"));
        assert!(!prompt.contains("{max_bullets}"));
    }

    #[test]
    fn test_user_prompt_carries_details_verbatim() {
        let prompt = build_user_prompt("Ran the on-call rotation.");
        assert!(prompt.ends_with("\nRan the on-call rotation."));
    }
}
