use crate::models::{DesignRequirements, Message};

/// Prior transcript messages included with each turn.
pub const CONTEXT_WINDOW: usize = 5;

// ============================================================================
// Turn prompts
// ============================================================================

pub const BRAD_SYSTEM_INSTRUCTION: &str = r#"You are Brad, a friendly, upbeat personal web designer who works with the user like a designer on retainer. You chat casually, keep replies short (1-3 sentences), and use the occasional emoji.

## Objectives
- Understand what the user wants to build and why.
- Gather the design requirements one question at a time: designType, subject, subjectName, purpose, preferredStyleAndInspiration, colorPreferences, functionalityNeeds, contentTypes.
- Never re-ask for something that is already in the current requirements.
- Once the requirements are clear, summarise them and ask the user to confirm before building.

## Conversation phases
- discovery: the user has not said what they want to build yet.
- requirements: the project is known and you are collecting details.
- confirmation: you have enough detail and are checking your summary with the user.
- ready-to-build: the user has confirmed and the page should be generated now.

## Design requirements
- Fill only the fields the user has actually told you about; use null for everything still unknown.
- Carry forward values from the current requirements unless the user changes them.
- designType must be one of: landing-page, portfolio, dashboard, e-commerce, blog, other.

## Smart replies
- Offer 2-5 short replies the user could tap to answer your latest question.
- Write them in the user's voice, max 6 words each.
- category is direct-answer for a likely answer, elaboration for adding detail, alternative for a different direction, clarification for asking you something.
- relevanceScore is between 0 and 1; give the most likely answer the highest score.

## Build transition
- Set shouldTransitionToBuild to true only when the phase is ready-to-build.
- confidenceScore (0-1) is how confident you are that you understand what the user wants."#;

/// Render the user-side prompt for one structured turn.
pub fn build_turn_prompt(
    message: &str,
    history: &[Message],
    current: Option<&DesignRequirements>,
) -> String {
    let mut prompt = String::new();

    let start = history.len().saturating_sub(CONTEXT_WINDOW);
    let recent = &history[start..];
    if !recent.is_empty() {
        prompt.push_str("## Recent Conversation\n");
        for msg in recent {
            prompt.push_str(&format!("{}: {}\n", msg.sender.as_str(), msg.text));
        }
        prompt.push('\n');
    }

    prompt.push_str("## Current Requirements\n");
    match current.filter(|r| !r.is_empty()) {
        Some(req) => {
            let json = serde_json::to_string_pretty(req).unwrap_or_else(|_| "{}".into());
            prompt.push_str(&json);
            prompt.push('\n');
        }
        None => prompt.push_str("None gathered yet.\n"),
    }
    prompt.push('\n');

    prompt.push_str("## User Message\n");
    prompt.push_str(message);
    prompt.push('\n');

    prompt
}

// ============================================================================
// HTML generation prompts
// ============================================================================

pub const HTML_SYSTEM_INSTRUCTION: &str =
    "You are an expert web developer and designer who creates beautiful, modern HTML webpages.";

const HTML_GUIDELINES: &str = r#"REQUIREMENTS:
- Generate a complete HTML document with embedded CSS
- Use modern, clean design principles
- Include responsive design (mobile-first approach)
- Use semantic HTML5 elements
- Create an attractive, professional design
- Include appropriate typography, spacing, and colors
- Add subtle animations and hover effects
- Make it production-ready

STRUCTURE:
- Include proper DOCTYPE, html, head, and body tags
- Add appropriate meta tags for responsive design
- Embed all CSS in a <style> tag in the head
- Create a cohesive design that matches the requirements
- Use appropriate sections like header/nav, hero, features, footer etc.

DESIGN GUIDELINES:
- Use a modern color palette that reflects the user's preferences
- Implement clean typography with good hierarchy
- Add proper spacing and visual rhythm
- Include interactive elements where appropriate
- Make it visually appealing and user-friendly
- Ensure accessibility best practices

Return only the complete HTML code without any explanations or markdown formatting."#;

/// Build the one-shot page generation prompt from the final requirements.
pub fn build_html_prompt(requirements: &DesignRequirements) -> String {
    let requirements_json =
        serde_json::to_string_pretty(requirements).unwrap_or_else(|_| "{}".into());

    let mut prompt = String::new();
    prompt.push_str("You are an expert web developer and designer. Generate a complete, modern HTML webpage based on the following design requirements:\n\n");
    prompt.push_str(&requirements_json);
    prompt.push_str("\n\n");
    prompt.push_str(HTML_GUIDELINES);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DesignType, Sender};

    fn msg(i: usize, sender: Sender) -> Message {
        Message {
            id: i.to_string(),
            text: format!("message {i}"),
            sender,
            is_memory_reference: None,
            is_build_update: None,
            timestamp: String::new(),
        }
    }

    #[test]
    fn test_turn_prompt_keeps_last_five() {
        let history: Vec<Message> = (0..8)
            .map(|i| msg(i, if i % 2 == 0 { Sender::Assistant } else { Sender::User }))
            .collect();
        let prompt = build_turn_prompt("hello", &history, None);
        assert!(!prompt.contains("message 2\n"));
        assert!(prompt.contains("user: message 3\n"));
        assert!(prompt.contains("user: message 7\n"));
        assert!(prompt.contains("None gathered yet."));
        assert!(prompt.ends_with("## User Message\nhello\n"));
    }

    #[test]
    fn test_turn_prompt_empty_requirements_use_marker() {
        let prompt = build_turn_prompt("hi", &[], Some(&DesignRequirements::default()));
        assert!(prompt.contains("None gathered yet."));
        assert!(!prompt.contains("## Recent Conversation"));
    }

    #[test]
    fn test_turn_prompt_serializes_requirements() {
        let req = DesignRequirements {
            design_type: Some(DesignType::Portfolio),
            ..Default::default()
        };
        let prompt = build_turn_prompt("hi", &[], Some(&req));
        assert!(prompt.contains("\"designType\": \"portfolio\""));
        assert!(!prompt.contains("None gathered yet."));
    }

    #[test]
    fn test_html_prompt_embeds_requirements() {
        let req = DesignRequirements {
            subject_name: Some("Lumen Studio".into()),
            ..Default::default()
        };
        let prompt = build_html_prompt(&req);
        assert!(prompt.contains("Lumen Studio"));
        assert!(prompt.contains("Return only the complete HTML code"));
    }
}
