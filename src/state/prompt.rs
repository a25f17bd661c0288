//! Prompt construction
//!
//! The prompt carries the situational context (time, locations), the rules
//! for the five response tags, and either a fresh command or the whole
//! pending clarification exchange.

use crate::normalize::normalize;
use crate::session::Session;

use super::intent::{CALCULATE_TAG, CLARIFICATION_TAG, LOCATION_TAG, SPEAK_TAG, WRITE_TAG};

/// Build the backend prompt for `utterance` (already normalized).
pub fn build_prompt(session: &Session, current_time: &str, utterance: &str) -> String {
    let mut lines = vec![
        format!("Current time is {}.", current_time),
        format!(
            "Current approximate location (from IP) is {}.",
            session.last_known_ip_location.as_deref().unwrap_or("unknown")
        ),
    ];

    if let Some(location) = &session.user_defined_location {
        lines.push(format!(
            "User has explicitly set their location as: {}. Use this if relevant.",
            location
        ));
    }

    lines.extend(instructions());

    let mut prompt = lines.join("\n");
    prompt.push_str("\n\n");

    if session.awaiting_clarification {
        let mut history: Vec<String> = session
            .accumulated_inputs
            .iter()
            .enumerate()
            .map(|(i, input)| format!("User (part {}): {}", i + 1, normalize(input)))
            .collect();
        if let Some(question) = &session.pending_question {
            history.push(format!("Assistant: {}", question));
        }
        history.push(format!("User (clarification): {}", utterance));
        prompt.push_str(&history.join("\n"));
    } else {
        prompt.push_str(&format!("User command: {}", utterance));
    }

    prompt
}

fn instructions() -> Vec<String> {
    vec![
        "Your goal is to understand and execute commands. You can perform mathematical calculations.".to_string(),
        "You DO NOT have access to real-time information such as current weather, live news updates, real-time stock prices, or specific events happening right now. If the user asks for such information, respond with 'I do not have access to real-time information for that.' or 'I can't provide live updates for that.'".to_string(),
        "You can either SPEAK a response or WRITE a response. You MUST use one of the following prefixes for your final output:".to_string(),
        format!(
            "- If the user asks you to write something, generate the text and prepend it with '{WRITE_TAG}' (e.g., '{WRITE_TAG}This is the text I will type for you.'). After typing, the conversation turn ends."
        ),
        format!(
            "- If the user asks you a question for which you have an answer, generate the answer and prepend it with '{SPEAK_TAG}' (e.g., '{SPEAK_TAG}The capital of France is Paris.')."
        ),
        format!(
            "- If the user asks for a calculation, extract ONLY the mathematical expression (e.g., '5 + 3', '10 * (2 + 3)', '8 / 4'). Do not include any text, just the expression. You MUST prepend this expression with '{CALCULATE_TAG}'. If the calculation expression is ambiguous or missing numbers/operators, use '{CLARIFICATION_TAG}' instead."
        ),
        format!(
            "- If a command is incomplete or ambiguous (and not a calculation), you MUST respond by starting your reply with '{CLARIFICATION_TAG}' followed by the specific question you need answered to complete the command. Do not give a final answer if you need more information."
        ),
        format!(
            "- If a question requires location information (e.g., current time, nearby places) AND the user's provided location or IP-based location is insufficient or missing for the query, you MUST ask the user for their specific location by starting your question with '{LOCATION_TAG}'. Once the user provides it, remember it for the current session."
        ),
        "Consider the following as a continuous conversation.".to_string(),
        "IMPORTANT: Always choose between SPEAK_RESPONSE, WRITE_RESPONSE, CALCULATE, CLARIFICATION_NEEDED, or LOCATION_NEEDED for your direct response based on user intent. Ensure any numerical expressions or text meant for writing uses standard symbols (e.g., *, @, +, /, #).".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ClarificationKind;

    const NOW: &str = "Monday, January 05, 2026 at 09:00:00 AM UTC";

    #[test]
    fn test_fresh_command() {
        let session = Session {
            last_known_ip_location: Some("Boston, Massachusetts, US".to_string()),
            ..Default::default()
        };
        let prompt = build_prompt(&session, NOW, "what's 10 times 4");

        assert!(prompt.starts_with(&format!("Current time is {}.", NOW)));
        assert!(prompt.contains("(from IP) is Boston, Massachusetts, US."));
        assert!(!prompt.contains("explicitly set their location"));
        for tag in [CALCULATE_TAG, WRITE_TAG, SPEAK_TAG, CLARIFICATION_TAG, LOCATION_TAG] {
            assert!(prompt.contains(tag), "missing {tag}");
        }
        assert!(prompt.ends_with("\n\nUser command: what's 10 times 4"));
    }

    #[test]
    fn test_user_location_included() {
        let session = Session {
            user_defined_location: Some("Boston".to_string()),
            ..Default::default()
        };
        let prompt = build_prompt(&session, NOW, "what time is it");
        assert!(prompt.contains("User has explicitly set their location as: Boston."));
        assert!(prompt.contains("(from IP) is unknown."));
    }

    #[test]
    fn test_clarification_history() {
        let mut session = Session::default();
        session.raise_question("Open the file", "Which file?", ClarificationKind::Clarification);

        let prompt = build_prompt(&session, NOW, "the report");

        assert!(prompt.ends_with(
            "\n\nUser (part 1): open the file\nAssistant: Which file?\nUser (clarification): the report"
        ));
        assert!(!prompt.contains("User command:"));
    }
}
