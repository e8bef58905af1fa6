//! Context window assembly under a history token budget.
//!
//! The window sent to the model is always:
//!
//! ```text
//! [persona, profile?, summary-notice?, ...trailing history]
//! ```
//!
//! History is walked newest to oldest and kept while the running estimate
//! stays within the budget. The first message that would overflow stops the
//! walk, so the kept history is always a contiguous suffix. Persona and
//! profile prompts are mandatory and are not charged against the budget.

use careerpath_types::chat::ChatMessage;
use careerpath_types::config::DEFAULT_HISTORY_TOKEN_BUDGET;
use careerpath_types::llm::PromptUnit;

/// System notice inserted when older history was left out.
pub const SUMMARY_NOTICE: &str = "Older messages summarized due to token limits.";

/// Approximate token cost of a piece of text: `ceil(chars / 4)`.
///
/// A cheap proxy, not a tokenizer count. Budgets are tuned against it.
pub fn estimate_tokens(content: &str) -> i64 {
    content.chars().count().div_ceil(4) as i64
}

/// The ordered prompt list for one completion call, plus how it was cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    units: Vec<PromptUnit>,
    included_messages: usize,
    omitted_messages: usize,
    history_tokens: i64,
}

impl ContextWindow {
    /// All prompt units in send order.
    pub fn units(&self) -> &[PromptUnit] {
        &self.units
    }

    pub fn into_units(self) -> Vec<PromptUnit> {
        self.units
    }

    /// Number of history messages that made it into the window.
    pub fn included_messages(&self) -> usize {
        self.included_messages
    }

    /// Number of older history messages left out.
    pub fn omitted_messages(&self) -> usize {
        self.omitted_messages
    }

    /// Whether the summary notice was inserted.
    pub fn is_truncated(&self) -> bool {
        self.omitted_messages > 0
    }

    /// Estimated cost of the included history (prompts excluded).
    pub fn history_tokens(&self) -> i64 {
        self.history_tokens
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Build the context window for one completion call.
///
/// `history` must be in chronological order (oldest first). A `budget` of
/// `None` falls back to [`DEFAULT_HISTORY_TOKEN_BUDGET`]; a budget of zero or
/// less admits no history at all.
pub fn build_context_window(
    history: &[ChatMessage],
    persona: PromptUnit,
    profile: Option<PromptUnit>,
    budget: Option<i64>,
) -> ContextWindow {
    let budget = budget.unwrap_or(DEFAULT_HISTORY_TOKEN_BUDGET);

    let mut running: i64 = 0;
    let mut start = history.len();
    if budget > 0 {
        for (index, message) in history.iter().enumerate().rev() {
            let cost = estimate_tokens(&message.content);
            if running + cost > budget {
                break;
            }
            running += cost;
            start = index;
        }
    }

    let selected = &history[start..];
    let omitted = start;

    let mut units = Vec::with_capacity(3 + selected.len());
    units.push(persona);
    units.extend(profile);
    if omitted > 0 {
        units.push(PromptUnit::system(SUMMARY_NOTICE));
    }
    units.extend(selected.iter().map(ChatMessage::to_prompt_unit));

    ContextWindow {
        units,
        included_messages: selected.len(),
        omitted_messages: omitted,
        history_tokens: running,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use careerpath_types::llm::MessageRole;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn history(items: &[(MessageRole, &str)]) -> Vec<ChatMessage> {
        let session_id = Uuid::now_v7();
        let base = Utc::now();
        items
            .iter()
            .enumerate()
            .map(|(i, (role, content))| ChatMessage {
                id: Uuid::now_v7(),
                session_id,
                role: *role,
                content: content.to_string(),
                created_at: base + Duration::milliseconds(i as i64),
                model: None,
                input_tokens: None,
                output_tokens: None,
                response_ms: None,
            })
            .collect()
    }

    fn persona() -> PromptUnit {
        PromptUnit::system("SYS")
    }

    fn profile() -> PromptUnit {
        PromptUnit::system("User Profile:\n- Name: Ada")
    }

    fn notice() -> PromptUnit {
        PromptUnit::system(SUMMARY_NOTICE)
    }

    #[test]
    fn test_estimate_tokens_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("a"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens("12345678"), 2);
        assert_eq!(estimate_tokens("abcdefghij"), 3);
    }

    #[test]
    fn test_estimate_tokens_counts_characters_not_bytes() {
        // Four multi-byte characters are one token, not three.
        assert_eq!(estimate_tokens("éééé"), 1);
    }

    #[test]
    fn test_worked_scenario_drops_older_messages() {
        let last = "0123456789012345678901234567890123456789";
        let h = history(&[
            (MessageRole::User, "12345678"),
            (MessageRole::Assistant, "abcdefghij"),
            (MessageRole::User, last),
        ]);

        let window = build_context_window(&h, persona(), None, Some(10));

        assert_eq!(
            window.units(),
            &[persona(), notice(), PromptUnit::new(MessageRole::User, last)]
        );
        assert_eq!(window.included_messages(), 1);
        assert_eq!(window.omitted_messages(), 2);
        assert_eq!(window.history_tokens(), 10);
        assert!(window.is_truncated());
    }

    #[test]
    fn test_empty_history_is_just_prompts() {
        let window = build_context_window(&[], persona(), None, Some(100));
        assert_eq!(window.units(), &[persona()]);
        assert!(!window.is_truncated());

        let window = build_context_window(&[], persona(), Some(profile()), Some(100));
        assert_eq!(window.units(), &[persona(), profile()]);
        assert!(!window.is_truncated());
    }

    #[test]
    fn test_everything_fits_no_notice() {
        let h = history(&[
            (MessageRole::User, "How do I move into data science?"),
            (MessageRole::Assistant, "Start with statistics fundamentals."),
        ]);

        let window = build_context_window(&h, persona(), Some(profile()), Some(4_000));

        assert_eq!(window.len(), 4);
        assert_eq!(window.units()[0], persona());
        assert_eq!(window.units()[1], profile());
        assert_eq!(window.units()[2], h[0].to_prompt_unit());
        assert_eq!(window.units()[3], h[1].to_prompt_unit());
        assert_eq!(window.omitted_messages(), 0);
    }

    #[test]
    fn test_profile_is_second_and_notice_follows_it() {
        let h = history(&[
            (MessageRole::User, "aaaaaaaaaaaaaaaaaaaa"),
            (MessageRole::Assistant, "bbbb"),
        ]);

        let window = build_context_window(&h, persona(), Some(profile()), Some(1));

        assert_eq!(
            window.units(),
            &[persona(), profile(), notice(), h[1].to_prompt_unit()]
        );
    }

    #[test]
    fn test_exact_budget_is_inclusive() {
        // 8 chars = 2 tokens, 8 chars = 2 tokens; budget 4 holds both.
        let h = history(&[(MessageRole::User, "12345678"), (MessageRole::Assistant, "abcdefgh")]);
        let window = build_context_window(&h, persona(), None, Some(4));
        assert_eq!(window.included_messages(), 2);
        assert!(!window.is_truncated());
    }

    #[test]
    fn test_single_oversized_message_is_dropped() {
        let h = history(&[(MessageRole::User, "this message costs far more than two tokens")]);
        let window = build_context_window(&h, persona(), None, Some(2));
        assert_eq!(window.units(), &[persona(), notice()]);
        assert_eq!(window.included_messages(), 0);
        assert_eq!(window.omitted_messages(), 1);
    }

    #[test]
    fn test_oversized_newest_message_stops_walk() {
        // The newest message alone exceeds the budget, so nothing older is
        // considered even though it would fit.
        let h = history(&[
            (MessageRole::User, "hi"),
            (MessageRole::Assistant, "a response that is far too long for the budget"),
        ]);
        let window = build_context_window(&h, persona(), None, Some(3));
        assert_eq!(window.units(), &[persona(), notice()]);
    }

    #[test]
    fn test_non_positive_budget_admits_no_history() {
        let h = history(&[(MessageRole::User, ""), (MessageRole::Assistant, "ok")]);

        for budget in [0, -5] {
            let window = build_context_window(&h, persona(), None, Some(budget));
            assert_eq!(window.units(), &[persona(), notice()]);
            assert_eq!(window.omitted_messages(), 2);
        }

        let window = build_context_window(&[], persona(), None, Some(0));
        assert_eq!(window.units(), &[persona()]);
    }

    #[test]
    fn test_missing_budget_uses_default() {
        // 16_004 chars = 4_001 tokens, one over the default budget.
        let big = "x".repeat(16_004);
        let h = history(&[(MessageRole::User, big.as_str())]);
        let window = build_context_window(&h, persona(), None, None);
        assert!(window.is_truncated());

        let fits = "x".repeat(16_000);
        let h = history(&[(MessageRole::User, fits.as_str())]);
        let window = build_context_window(&h, persona(), None, None);
        assert!(!window.is_truncated());
        assert_eq!(window.history_tokens(), DEFAULT_HISTORY_TOKEN_BUDGET);
    }

    #[test]
    fn test_selected_history_is_contiguous_suffix_for_all_budgets() {
        let h = history(&[
            (MessageRole::User, "I work as a nurse."),
            (MessageRole::Assistant, "Nursing builds triage and communication skills."),
            (MessageRole::User, "ok"),
            (MessageRole::Assistant, "Consider instructional design roles in tech companies."),
            (MessageRole::User, "What certifications help?"),
            (MessageRole::Assistant, "Look at ATD's CPTD."),
        ]);

        for budget in -1..=60 {
            let window = build_context_window(&h, persona(), Some(profile()), Some(budget));
            let units = window.units();

            assert_eq!(units[0], persona(), "persona first at budget {budget}");
            assert_eq!(units[1], profile(), "profile second at budget {budget}");

            let included = window.included_messages();
            let tail: Vec<PromptUnit> = h[h.len() - included..]
                .iter()
                .map(ChatMessage::to_prompt_unit)
                .collect();
            assert_eq!(&units[units.len() - included..], tail.as_slice());

            let has_notice = units.len() == 2 + included + 1;
            assert_eq!(has_notice, included < h.len(), "notice iff truncated at {budget}");
            if has_notice {
                assert_eq!(units[2], notice());
            }
            assert!(window.history_tokens() <= budget.max(0));
        }
    }

    #[test]
    fn test_identical_inputs_give_identical_windows() {
        let h = history(&[
            (MessageRole::User, "Should I learn Go or Rust?"),
            (MessageRole::Assistant, "Both are good; it depends on your goals."),
        ]);
        let first = build_context_window(&h, persona(), Some(profile()), Some(12));
        let second = build_context_window(&h, persona(), Some(profile()), Some(12));
        assert_eq!(first, second);
    }

    #[test]
    fn test_system_role_history_is_passed_through() {
        let h = history(&[(MessageRole::System, "note"), (MessageRole::User, "hello")]);
        let window = build_context_window(&h, persona(), None, Some(100));
        assert_eq!(window.units()[1].role, MessageRole::System);
        assert_eq!(window.units()[1].content, "note");
    }
}
