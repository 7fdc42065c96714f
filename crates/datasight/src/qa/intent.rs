//! Keyword-based query intent classification.
//!
//! Classification is a fixed rule table over lowercased prompt text. The
//! first matching rule wins, so ordering encodes priority: specific
//! intents (profit drops, losses) are checked before broad ones (trend,
//! summary).

use serde::{Deserialize, Serialize};

/// What the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    /// Why a profit/revenue metric fell.
    ProfitDrop,
    /// Which segments are losing money.
    SegmentLosses,
    /// Which segments perform best.
    TopSegments,
    /// How a metric moves over time.
    Trend,
    /// Data quality issues in the upload.
    DataQuality,
    /// General overview; also the fallback.
    Summary,
}

struct IntentRule {
    intent: QueryIntent,
    /// All tokens in one group must appear; any group matching fires the rule.
    token_groups: &'static [&'static [&'static str]],
}

const RULES: &[IntentRule] = &[
    IntentRule {
        intent: QueryIntent::ProfitDrop,
        token_groups: &[
            &["profit", "drop"],
            &["profit", "decline"],
            &["profit", "fell"],
            &["profit", "down"],
            &["why", "profit"],
            &["revenue", "drop"],
            &["revenue", "decline"],
        ],
    },
    IntentRule {
        intent: QueryIntent::SegmentLosses,
        token_groups: &[&["losing"], &["loss"], &["unprofitable"], &["in the red"]],
    },
    IntentRule {
        intent: QueryIntent::TopSegments,
        token_groups: &[
            &["top"],
            &["best"],
            &["highest"],
            &["biggest"],
            &["leading"],
        ],
    },
    IntentRule {
        intent: QueryIntent::Trend,
        token_groups: &[
            &["trend"],
            &["over time"],
            &["growth"],
            &["month over month"],
            &["trajectory"],
        ],
    },
    IntentRule {
        intent: QueryIntent::DataQuality,
        token_groups: &[
            &["quality"],
            &["missing"],
            &["duplicate"],
            &["clean"],
            &["reliable"],
        ],
    },
];

/// Classify a prompt. Unrecognized prompts fall back to `Summary`.
pub fn classify_intent(prompt: &str) -> QueryIntent {
    let lower = prompt.to_lowercase();

    for rule in RULES {
        let matched = rule
            .token_groups
            .iter()
            .any(|group| group.iter().all(|token| lower.contains(token)));
        if matched {
            return rule.intent;
        }
    }

    QueryIntent::Summary
}
