//! Context window management
//!
//! Before each outbound chat request the conversation history is trimmed to
//! the longest trailing run of messages whose estimated token cost fits the
//! budget. The most recent message is always kept, even when it alone is
//! over budget.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Share of a request's `max_tokens` handed to prior conversation turns.
pub const DEFAULT_CONTEXT_SHARE: f32 = 0.6;

/// Estimates the token cost of a piece of text.
pub trait TokenEstimator {
    fn estimate(&self, text: &str) -> usize;
}

/// `ceil(chars / 4)`. Approximate; not a real tokenizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharHeuristic;

impl TokenEstimator for CharHeuristic {
    fn estimate(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}

/// Estimated token cost of `text` using [`CharHeuristic`].
pub fn estimate_tokens(text: &str) -> usize {
    CharHeuristic.estimate(text)
}

/// Select the trailing messages of `history` that fit in `token_budget`.
pub fn optimize(history: &[Message], token_budget: usize) -> &[Message] {
    optimize_with(history, token_budget, &CharHeuristic)
}

/// Same as [`optimize`] with a caller-supplied estimator.
///
/// The result is always a suffix of `history`, so chronological order is
/// preserved. Running totals equal to the budget are accepted. A zero budget
/// keeps only the most recent message.
pub fn optimize_with<'a, E>(history: &'a [Message], token_budget: usize, estimator: &E) -> &'a [Message]
where
    E: TokenEstimator + ?Sized,
{
    let len = history.len();
    if len == 0 {
        return history;
    }
    if token_budget == 0 {
        return &history[len - 1..];
    }

    let mut total = 0usize;
    let mut start = len;
    for (idx, message) in history.iter().enumerate().rev() {
        let cost = estimator.estimate(&message.content);
        let next = total.saturating_add(cost);
        if next > token_budget && start < len {
            break;
        }
        total = next;
        start = idx;
    }

    tracing::debug!(
        kept = len - start,
        dropped = start,
        estimated_tokens = total,
        budget = token_budget,
        "optimized context window"
    );
    &history[start..]
}

/// Context window configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextWindow {
    /// Maximum tokens in the context window
    pub max_tokens: usize,
    /// Tokens held back for the system prompt and the new user turn
    pub reserved_tokens: usize,
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            reserved_tokens: 256,
        }
    }
}

impl ContextWindow {
    pub fn new(max_tokens: usize) -> Self {
        Self {
            max_tokens,
            ..Default::default()
        }
    }

    /// Window for a request that may generate up to `max_tokens`, giving
    /// `share` of it to history (`floor(max_tokens * share)`).
    pub fn for_request(max_tokens: u32, share: f32) -> Self {
        let share = if share.is_finite() { share.clamp(0.0, 1.0) } else { DEFAULT_CONTEXT_SHARE };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let budget = (f64::from(max_tokens) * f64::from(share)).floor() as usize;
        Self {
            max_tokens: budget,
            reserved_tokens: 0,
        }
    }

    pub fn available_tokens(&self) -> usize {
        self.max_tokens.saturating_sub(self.reserved_tokens)
    }

    /// Apply [`optimize`] with this window's available budget.
    pub fn select<'a>(&self, history: &'a [Message]) -> &'a [Message] {
        optimize(history, self.available_tokens())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn history_of(contents: &[&str]) -> Vec<Message> {
        contents.iter().map(|c| Message::user(*c)).collect()
    }

    fn chars(n: usize) -> String {
        "x".repeat(n)
    }

    #[test]
    fn estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("a"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn estimate_counts_chars_not_bytes() {
        // 4 chars, 12 bytes
        assert_eq!(estimate_tokens("日本語!"), 1);
    }

    #[test]
    fn empty_history_yields_empty_window() {
        assert!(optimize(&[], 100).is_empty());
        assert!(optimize(&[], 0).is_empty());
    }

    #[test]
    fn twenty_messages_of_fifty_tokens_keep_six_at_three_hundred() {
        let history: Vec<Message> = (0..20).map(|_| Message::user(chars(200))).collect();

        let window = optimize(&history, 300);

        assert_eq!(window.len(), 6);
        assert_eq!(window, &history[14..]);
    }

    #[test]
    fn exact_budget_match_is_inclusive() {
        let history = history_of(&["aaaa", "bbbb", "cccc"]);
        assert_eq!(optimize(&history, 3).len(), 3);
        assert_eq!(optimize(&history, 2).len(), 2);
    }

    #[test]
    fn oversized_latest_message_is_still_kept() {
        let big = chars(4_000);
        let history = history_of(&["short", big.as_str()]);

        let window = optimize(&history, 10);

        assert_eq!(window.len(), 1);
        assert_eq!(window[0].content, big);
    }

    #[test]
    fn zero_budget_keeps_only_latest() {
        let history = history_of(&["", "", "last"]);
        let window = optimize(&history, 0);
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].content, "last");
    }

    #[test]
    fn stops_at_first_older_message_that_does_not_fit() {
        // costs oldest..newest: 1, 25, 1 -> the 25 blocks the 1 behind it
        let mid = chars(100);
        let history = history_of(&["a", mid.as_str(), "c"]);
        assert_eq!(optimize(&history, 10).len(), 1);
    }

    #[test]
    fn custom_estimator_changes_boundaries() {
        struct PerMessage;
        impl TokenEstimator for PerMessage {
            fn estimate(&self, _text: &str) -> usize {
                10
            }
        }

        let history = history_of(&["a", "b", "c", "d"]);
        assert_eq!(optimize_with(&history, 25, &PerMessage).len(), 2);
        assert_eq!(optimize(&history, 25).len(), 4);
    }

    #[test]
    fn window_for_request_uses_share_of_max_tokens() {
        let window = ContextWindow::for_request(4000, 0.6);
        assert_eq!(window.available_tokens(), 2400);

        let nan = ContextWindow::for_request(1000, f32::NAN);
        assert_eq!(nan.available_tokens(), 600);
    }

    #[test]
    fn default_window_reserves_tokens() {
        let window = ContextWindow::default();
        assert_eq!(window.available_tokens(), 3840);
        assert_eq!(ContextWindow::new(100).available_tokens(), 0);
    }

    fn arb_history() -> impl Strategy<Value = Vec<Message>> {
        prop::collection::vec("[a-z ]{0,120}", 0..40)
            .prop_map(|contents| contents.into_iter().map(Message::user).collect())
    }

    proptest! {
        #[test]
        fn non_empty_history_yields_non_empty_suffix(history in arb_history(), budget in 1usize..2_000) {
            let window = optimize(&history, budget);
            if history.is_empty() {
                prop_assert!(window.is_empty());
            } else {
                prop_assert!(!window.is_empty());
                prop_assert_eq!(window, &history[history.len() - window.len()..]);
            }
        }

        #[test]
        fn history_within_budget_is_unchanged(history in arb_history(), slack in 0usize..50) {
            let total: usize = history.iter().map(|m| estimate_tokens(&m.content)).sum();
            let budget = total + slack;
            prop_assume!(budget > 0);
            prop_assert_eq!(optimize(&history, budget).len(), history.len());
        }

        #[test]
        fn optimize_is_idempotent(history in arb_history(), budget in 0usize..2_000) {
            let once = optimize(&history, budget);
            let twice = optimize(once, budget);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn multi_message_windows_fit_budget(history in arb_history(), budget in 1usize..2_000) {
            let window = optimize(&history, budget);
            if window.len() > 1 {
                let total: usize = window.iter().map(|m| estimate_tokens(&m.content)).sum();
                prop_assert!(total <= budget);
            }
        }
    }
}
