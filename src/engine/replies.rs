//! Reply ranker: picks the quick replies shown under the latest message.

use crate::models::{Message, SmartReply};

/// Most quick replies ever shown at once.
pub const MAX_QUICK_REPLIES: usize = 5;

/// Canned fallbacks, keyed on a substring of the last assistant message.
const FALLBACK_REPLIES: &[(&str, &[&str])] = &[
    (
        "first thing",
        &["Landing page", "Portfolio site", "Mobile app", "Dashboard"],
    ),
    (
        "tell me more",
        &[
            "Show examples",
            "I need help with colors",
            "Mobile-first design",
            "Something modern",
        ],
    ),
];

/// Rank quick replies for display.
///
/// Model candidates win when present: stable-sorted by descending relevance
/// (ties keep model order) and capped at [`MAX_QUICK_REPLIES`]. Otherwise the
/// most recent assistant message is matched against the canned fallbacks; no
/// match means no quick replies.
pub fn rank_replies(smart_replies: &[SmartReply], transcript: &[Message]) -> Vec<String> {
    if !smart_replies.is_empty() {
        let mut ranked: Vec<&SmartReply> = smart_replies.iter().collect();
        ranked.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        return ranked
            .into_iter()
            .take(MAX_QUICK_REPLIES)
            .map(|r| r.text.clone())
            .collect();
    }

    let Some(last) = transcript.iter().rev().find(|m| m.is_assistant()) else {
        return Vec::new();
    };

    FALLBACK_REPLIES
        .iter()
        .find(|(trigger, _)| last.text.contains(*trigger))
        .map(|(_, replies)| replies.iter().map(|r| r.to_string()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Sender, SmartReplyCategory};

    fn reply(text: &str, score: f64) -> SmartReply {
        SmartReply {
            text: text.into(),
            category: SmartReplyCategory::DirectAnswer,
            relevance_score: score,
        }
    }

    fn msg(sender: Sender, text: &str) -> Message {
        Message {
            id: text.into(),
            text: text.into(),
            sender,
            is_memory_reference: None,
            is_build_update: None,
            timestamp: String::new(),
        }
    }

    #[test]
    fn test_sorted_descending_and_stable() {
        let replies = vec![
            reply("a", 0.5),
            reply("b", 0.9),
            reply("c", 0.5),
            reply("d", 0.9),
        ];
        assert_eq!(rank_replies(&replies, &[]), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_capped_at_five() {
        let replies: Vec<SmartReply> = (0..8).map(|i| reply(&i.to_string(), i as f64 / 10.0)).collect();
        let ranked = rank_replies(&replies, &[]);
        assert_eq!(ranked, vec!["7", "6", "5", "4", "3"]);
    }

    #[test]
    fn test_fallback_first_thing() {
        let transcript = vec![msg(
            Sender::Assistant,
            "What's the first thing you'd like to work on together?",
        )];
        assert_eq!(
            rank_replies(&[], &transcript),
            vec!["Landing page", "Portfolio site", "Mobile app", "Dashboard"]
        );
    }

    #[test]
    fn test_fallback_uses_latest_assistant_message() {
        let transcript = vec![
            msg(Sender::Assistant, "What's the first thing you'd like to work on?"),
            msg(Sender::Assistant, "Love it - tell me more about the vibe."),
            msg(Sender::User, "first thing is a dashboard"),
        ];
        assert_eq!(rank_replies(&[], &transcript)[0], "Show examples");
    }

    #[test]
    fn test_no_trigger_means_no_replies() {
        let transcript = vec![msg(Sender::Assistant, "Great, noted.")];
        assert!(rank_replies(&[], &transcript).is_empty());
        assert!(rank_replies(&[], &[]).is_empty());
    }
}
