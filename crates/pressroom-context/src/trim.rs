// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trimming strategies for conversation checkpoints.
//!
//! System turns are never evicted and never count toward a limit.

use pressroom_config::model::{ConversationConfig, TrimmingStrategy};
use pressroom_core::{Turn, TurnRole};

/// Limit applied after every append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimPolicy {
    /// Evict the oldest non-system turn while the token estimate exceeds the maximum.
    Tokens(usize),
    /// Keep the most recent N non-system turns, widened back to the nearest
    /// operator turn so the window never opens on an agent reply.
    Messages(usize),
}

impl From<&ConversationConfig> for TrimPolicy {
    fn from(config: &ConversationConfig) -> Self {
        match config.trimming_strategy {
            TrimmingStrategy::Token => Self::Tokens(config.max_tokens),
            TrimmingStrategy::Message => Self::Messages(config.max_conversation_length),
        }
    }
}

/// Apply `policy` to `turns`, preserving order.
pub fn trim(turns: Vec<Turn>, policy: TrimPolicy) -> Vec<Turn> {
    let mut evict = vec![false; turns.len()];
    let candidates: Vec<usize> = turns
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.is_system())
        .map(|(i, _)| i)
        .collect();

    match policy {
        TrimPolicy::Messages(max) => {
            let start = window_start(&turns, &candidates, max);
            for &i in &candidates[..start] {
                evict[i] = true;
            }
        }
        TrimPolicy::Tokens(max) => {
            let mut total: usize = candidates.iter().map(|&i| turns[i].token_estimate).sum();
            for &i in &candidates {
                if total <= max {
                    break;
                }
                total -= turns[i].token_estimate;
                evict[i] = true;
            }
        }
    }

    turns
        .into_iter()
        .zip(evict)
        .filter_map(|(turn, evicted)| (!evicted).then_some(turn))
        .collect()
}

/// Index into `candidates` of the first kept turn.
fn window_start(turns: &[Turn], candidates: &[usize], max: usize) -> usize {
    let start = candidates.len().saturating_sub(max);
    if start == 0 || start == candidates.len() {
        return start;
    }
    candidates[..=start]
        .iter()
        .rposition(|&i| turns[i].role == TurnRole::Operator)
        .unwrap_or(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn contents(turns: &[Turn]) -> Vec<&str> {
        turns.iter().map(|t| t.content.as_str()).collect()
    }

    #[test]
    fn message_window_opens_on_an_operator_turn() {
        let turns = vec![
            Turn::system("system"),
            Turn::operator("u1"),
            Turn::agent("a1"),
            Turn::operator("u2"),
            Turn::agent("a2"),
            Turn::operator("u3"),
        ];
        let kept = trim(turns, TrimPolicy::Messages(2));
        assert_eq!(contents(&kept), vec!["system", "u2", "a2", "u3"]);
    }

    #[test]
    fn window_already_on_an_operator_turn_is_not_widened() {
        let turns = vec![
            Turn::system("system"),
            Turn::operator("u1"),
            Turn::agent("a1"),
            Turn::operator("u2"),
            Turn::agent("a2"),
        ];
        let kept = trim(turns, TrimPolicy::Messages(2));
        assert_eq!(contents(&kept), vec!["system", "u2", "a2"]);
    }

    #[test]
    fn history_without_operator_turns_keeps_last_n() {
        let turns = vec![
            Turn::system("system"),
            Turn::agent("a1"),
            Turn::agent("a2"),
            Turn::agent("a3"),
        ];
        let kept = trim(turns, TrimPolicy::Messages(2));
        assert_eq!(contents(&kept), vec!["system", "a2", "a3"]);
    }

    #[test]
    fn message_strategy_under_limit_is_untouched() {
        let turns = vec![Turn::system("s"), Turn::agent("a1")];
        assert_eq!(trim(turns.clone(), TrimPolicy::Messages(5)), turns);
    }

    #[test]
    fn token_strategy_evicts_oldest_first() {
        // Each turn is 8 chars = 2 tokens; the system turn is excluded from the sum.
        let turns = vec![
            Turn::system("a very long system prompt that is never counted"),
            Turn::operator("aaaaaaaa"),
            Turn::agent("bbbbbbbb"),
            Turn::operator("cccccccc"),
        ];
        let kept = trim(turns, TrimPolicy::Tokens(4));
        assert_eq!(
            contents(&kept),
            vec![
                "a very long system prompt that is never counted",
                "bbbbbbbb",
                "cccccccc"
            ]
        );
    }

    #[test]
    fn token_strategy_can_drop_everything_but_system() {
        let turns = vec![Turn::system("s"), Turn::agent("way over budget")];
        let kept = trim(turns, TrimPolicy::Tokens(1));
        assert_eq!(contents(&kept), vec!["s"]);
    }

    fn arb_turns() -> impl Strategy<Value = Vec<Turn>> {
        (
            any::<bool>(),
            prop::collection::vec(("[a-z ]{0,40}", any::<bool>()), 0..20),
        )
            .prop_map(|(with_system, body)| {
                let mut turns = Vec::new();
                if with_system {
                    turns.push(Turn::system("system prompt"));
                }
                for (text, from_operator) in body {
                    turns.push(if from_operator {
                        Turn::operator(text)
                    } else {
                        Turn::agent(text)
                    });
                }
                turns
            })
    }

    proptest! {
        #[test]
        fn system_turn_always_survives(turns in arb_turns(), max in 0usize..30, by_tokens in any::<bool>()) {
            let had_system = turns.iter().any(Turn::is_system);
            let policy = if by_tokens { TrimPolicy::Tokens(max) } else { TrimPolicy::Messages(max) };
            let kept = trim(turns, policy);
            prop_assert_eq!(kept.iter().any(Turn::is_system), had_system);
        }

        #[test]
        fn limits_hold_after_trim(turns in arb_turns(), max in 0usize..30) {
            let by_count: Vec<Turn> = trim(turns.clone(), TrimPolicy::Messages(max))
                .into_iter()
                .filter(|t| !t.is_system())
                .collect();
            if by_count.len() > max {
                // Widened only as far as the nearest operator turn.
                prop_assert!(max > 0);
                prop_assert_eq!(by_count[0].role, TurnRole::Operator);
                let widened = by_count.len() - max;
                prop_assert!(by_count[1..widened].iter().all(|t| t.role != TurnRole::Operator));
            }

            let by_tokens = trim(turns, TrimPolicy::Tokens(max));
            let total: usize = by_tokens.iter().filter(|t| !t.is_system()).map(|t| t.token_estimate).sum();
            prop_assert!(total <= max);
        }

        #[test]
        fn kept_turns_are_a_suffix_of_non_system(turns in arb_turns(), max in 0usize..30) {
            let non_system: Vec<Turn> = turns.iter().filter(|t| !t.is_system()).cloned().collect();
            let kept: Vec<Turn> = trim(turns, TrimPolicy::Messages(max))
                .into_iter()
                .filter(|t| !t.is_system())
                .collect();
            prop_assert_eq!(&non_system[non_system.len() - kept.len()..], &kept[..]);
        }
    }
}
