//! Headline composition for generated and injected events.
//!
//! Short generic phrasings per category and sentiment; commodity events get
//! the display name spliced in.

use rand::Rng;
use rand::rngs::StdRng;

use crate::events::{NewsCategory, NewsSentiment};

const GLOBAL_POSITIVE: &[&str] = &[
    "Global economic outlook improves, commodity demand expected to rise",
    "Manufacturing activity beats expectations across major economies",
    "Trade volumes surge as supply chains normalize",
];

const GLOBAL_NEGATIVE: &[&str] = &[
    "Recession fears mount as economic indicators weaken",
    "Global trade tensions escalate, supply chains disrupted",
    "Currency volatility spikes across emerging markets",
];

const GLOBAL_NEUTRAL: &[&str] = &[
    "Mixed economic signals keep markets cautious",
    "Commodity markets trade sideways awaiting data",
];

const POLITICAL_POSITIVE: &[&str] = &[
    "Trade tariffs lifted on key commodities",
    "New infrastructure bill passes, boosting material demand",
    "International trade agreement reduces barriers",
];

const POLITICAL_NEGATIVE: &[&str] = &[
    "New tariffs imposed on commodity imports",
    "Export restrictions announced for strategic materials",
    "Political instability disrupts supply routes",
];

const POLITICAL_NEUTRAL: &[&str] = &[
    "Trade negotiations continue without resolution",
    "Markets await government policy announcement",
];

fn pick(rng: &mut StdRng, templates: &[&str]) -> String {
    templates[rng.random_range(0..templates.len())].to_string()
}

/// Compose a headline for an event of the given shape. `name` is the
/// commodity display name for supply/demand events.
pub fn compose(
    rng: &mut StdRng,
    category: NewsCategory,
    sentiment: NewsSentiment,
    name: &str,
) -> String {
    match category {
        NewsCategory::Global => match sentiment {
            NewsSentiment::Positive => pick(rng, GLOBAL_POSITIVE),
            NewsSentiment::Negative => pick(rng, GLOBAL_NEGATIVE),
            NewsSentiment::Neutral => pick(rng, GLOBAL_NEUTRAL),
        },
        NewsCategory::Political => match sentiment {
            NewsSentiment::Positive => pick(rng, POLITICAL_POSITIVE),
            NewsSentiment::Negative => pick(rng, POLITICAL_NEGATIVE),
            NewsSentiment::Neutral => pick(rng, POLITICAL_NEUTRAL),
        },
        NewsCategory::Supply => match sentiment {
            NewsSentiment::Positive => format!("{} supply improves as output expands", name),
            NewsSentiment::Negative => format!("{} supply disrupted, output cut", name),
            NewsSentiment::Neutral => format!("{} supply steady", name),
        },
        NewsCategory::Demand => match sentiment {
            NewsSentiment::Positive => format!("{} demand surges on industrial activity", name),
            NewsSentiment::Negative => format!("{} demand weakens as consumption slows", name),
            NewsSentiment::Neutral => format!("{} demand unchanged", name),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn commodity_headlines_carry_the_name() {
        let mut rng = StdRng::seed_from_u64(1);
        let h = compose(
            &mut rng,
            NewsCategory::Supply,
            NewsSentiment::Negative,
            "Crude Oil",
        );
        assert!(h.contains("Crude Oil"));
    }

    #[test]
    fn global_headlines_are_non_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        for sentiment in [
            NewsSentiment::Positive,
            NewsSentiment::Negative,
            NewsSentiment::Neutral,
        ] {
            assert!(!compose(&mut rng, NewsCategory::Global, sentiment, "").is_empty());
        }
    }
}
