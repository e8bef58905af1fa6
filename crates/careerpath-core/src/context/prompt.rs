//! Counselor persona and user-profile system prompts.

use careerpath_types::llm::PromptUnit;
use careerpath_types::user::UserProfile;

const PERSONA: &str = "You are a highly experienced career counselor.
Provide **practical, specific, and actionable career guidance** tailored to the user's profile.
Format your response exactly as:

1. Summary of User Info
2. Advice (be specific, actionable)
3. Steps (list concrete next steps)
4. Resources (tools, courses, articles)
5. Optional: Questions to clarify if userProfile is incomplete

Keep answers concise, professional, and empathetic.";

/// The fixed counselor persona. Always the first unit of a context window.
pub fn persona_prompt() -> PromptUnit {
    PromptUnit::system(PERSONA)
}

/// Summarize a stored profile as a system prompt.
///
/// Blank strings and empty lists render as placeholder text so the model
/// can tell "unknown" apart from a real value.
pub fn profile_prompt(profile: &UserProfile) -> PromptUnit {
    let experience = profile
        .experience_years
        .map(|years| years.to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    let content = format!(
        "User Profile:
- Name: {name}
- Skills: {skills}
- Experience: {experience} years
- Education: {education}
- Goals: {goals}
- Interests: {interests}",
        name = text_or(profile.name.as_deref(), "Unknown"),
        skills = list_or(&profile.current_skills, "None"),
        education = text_or(profile.education.as_deref(), "Unknown"),
        goals = text_or(profile.goals.as_deref(), "Not specified"),
        interests = list_or(&profile.interests, "Not specified"),
    );

    PromptUnit::system(content)
}

fn text_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => fallback,
    }
}

fn list_or(values: &[String], fallback: &str) -> String {
    let joined = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        fallback.to_string()
    } else {
        joined
    }
}
