// src/assessment/prompt.rs

pub const SYSTEM_INSTRUCTION: &str = "You are a top-tier Career Guidance Expert and AI Impact Auditor. \
You provide clear, objective assessments. You MUST extract the person's name and focus on their \
current/most recent professional role. Determine skills through frequency, seniority level, and \
industry impact. Use temperature 0 for maximum consistency.";

/// Builds the user prompt for one profile.
pub fn build_prompt(profile_url: &str, has_image: bool) -> String {
    let source_note = if has_image {
        "\n    A SCREENSHOT OF THE PROFILE IS ATTACHED. Treat it as the primary source of profile \
data and use search results only to fill gaps.\n"
    } else {
        ""
    };

    format!(
        r#"
    PROFILE TO ANALYZE: {profile_url}
    {source_note}
    TASK: Perform a RIGOROUS, REPRODUCIBLE, and PERSONALIZED AI Risk Assessment.

    EXTRACTION REQUIREMENTS:
    1. NAME: Extract the person's full name clearly from the profile.
    2. PROFESSIONAL ROLE: Synthesize a concise, high-fidelity job description for the 'role' field.
       - PRIMARY SOURCE: The current LinkedIn headline title.
       - SECONDARY SOURCE: The most recent job titles in their experience section.
       - FORMAT: Combine these to reflect their current professional identity accurately.
    3. INDUSTRY: Identify the primary industry they operate in based on their work history.

    SKILLS ANALYSIS REQUIREMENT:
    1. Identify the top 5 most predominant skills.
    2. CRITERIA FOR PREDOMINANCE:
       - Frequency of mention in experience descriptions.
       - Level of responsibility/seniority associated with the skill.
       - Strategic importance to their current job title and industry.
    3. Rank these 5 skills in order of prominence (from most essential/frequent to least).
    4. For each, provide automation potential (0-100) and the irreplaceable human value.
    5. PROVIDE A SKILLS METHODOLOGY: Write a short, 1-2 sentence note explaining how these specific 5 skills were identified.

    CAREER GUIDANCE REQUIREMENT:
    1. Offer EXACTLY 3 distinct suggestions for career growth.
    2. Each MUST use a specific career framework (e.g., Ikigai, Skill Stacking, T-Shaped).
    3. Use easy, accessible, and encouraging language. Avoid jargon.

    EVALUATION RUBRIC:
    - Cognitive Routine (High Risk)
    - Social Intelligence (Low Risk)
    - Creative Synthesis (Low Risk)
    - Unstructured Physicality (Low Risk)

    SCORING BANDS:
    - 0-30: Low
    - 31-70: Medium
    - 71-100: High
    The overallRisk value MUST match the band of riskScore.

    INSTRUCTIONS:
    - Base assessment on current AI capabilities (LLMs, Agents).
    - Be objective and consistent.
    - Ensure output is valid JSON.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_url_and_rubric() {
        let prompt = build_prompt("https://www.linkedin.com/in/jane-doe", false);
        assert!(prompt.contains("PROFILE TO ANALYZE: https://www.linkedin.com/in/jane-doe"));
        assert!(prompt.contains("Cognitive Routine (High Risk)"));
        assert!(prompt.contains("Unstructured Physicality (Low Risk)"));
        assert!(prompt.contains("31-70: Medium"));
        assert!(!prompt.contains("SCREENSHOT"));
    }

    #[test]
    fn test_prompt_mentions_screenshot_when_attached() {
        let prompt = build_prompt("https://linkedin.com/in/x", true);
        assert!(prompt.contains("SCREENSHOT OF THE PROFILE IS ATTACHED"));
    }
}
