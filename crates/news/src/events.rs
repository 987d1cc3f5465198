//! News event types.

use serde::{Deserialize, Serialize};
use std::fmt;

use types::{Symbol, Timestamp};

/// What part of the market an event touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    /// Economy-wide news; moves global sentiment.
    Global,
    /// Policy and trade news; moves global sentiment.
    Political,
    /// Supply-side news for one commodity (production, logistics, weather).
    Supply,
    /// Demand-side news for one commodity (consumption, industry, exports).
    Demand,
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NewsCategory::Global => "global",
            NewsCategory::Political => "political",
            NewsCategory::Supply => "supply",
            NewsCategory::Demand => "demand",
        };
        write!(f, "{}", s)
    }
}

/// Direction of an event. Magnitude is always non-negative; the sign is
/// carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsSentiment {
    Positive,
    Negative,
    Neutral,
}

impl NewsSentiment {
    /// +1 / -1 / 0 sign used for belief updates.
    pub fn sign(self) -> f64 {
        match self {
            NewsSentiment::Positive => 1.0,
            NewsSentiment::Negative => -1.0,
            NewsSentiment::Neutral => 0.0,
        }
    }
}

impl fmt::Display for NewsSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NewsSentiment::Positive => "positive",
            NewsSentiment::Negative => "negative",
            NewsSentiment::Neutral => "neutral",
        };
        write!(f, "{}", s)
    }
}

/// A single news event.
///
/// `id` is stable and unique within a generator's lifetime; event-driven
/// traders deduplicate on it rather than on `(timestamp, symbol)`, which
/// collides in populate mode when many events share one coarse tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsEvent {
    pub id: u64,
    pub category: NewsCategory,
    pub sentiment: NewsSentiment,
    /// Impact size in [0, 1]; never negative.
    pub magnitude: f64,
    /// Target commodity; empty for global and political events.
    #[serde(default)]
    pub symbol: Symbol,
    /// Display name of the target commodity, when any.
    #[serde(default)]
    pub commodity_name: String,
    /// Finer-grained cause, e.g. "production", "seasonal".
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub headline: String,
    pub timestamp: Timestamp,
}

impl NewsEvent {
    /// Magnitude with the sentiment sign applied; zero for neutral events.
    /// Used for belief updates.
    pub fn signed_magnitude(&self) -> f64 {
        self.magnitude * self.sentiment.sign()
    }

    /// Magnitude with sign applied and neutral events reduced to a 0.1
    /// positive nudge. Used for supply/demand shocks and global sentiment.
    pub fn signed_impact(&self) -> f64 {
        match self.sentiment {
            NewsSentiment::Neutral => self.magnitude * 0.1,
            _ => self.signed_magnitude(),
        }
    }

    /// True for categories that target a single commodity.
    pub fn is_commodity_news(&self) -> bool {
        matches!(self.category, NewsCategory::Supply | NewsCategory::Demand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(category: NewsCategory, sentiment: NewsSentiment, magnitude: f64) -> NewsEvent {
        NewsEvent {
            id: 1,
            category,
            sentiment,
            magnitude,
            symbol: String::new(),
            commodity_name: String::new(),
            subcategory: String::new(),
            headline: String::new(),
            timestamp: 0,
        }
    }

    #[test]
    fn signed_magnitude_follows_sentiment() {
        let pos = event(NewsCategory::Supply, NewsSentiment::Positive, 0.2);
        let neg = event(NewsCategory::Supply, NewsSentiment::Negative, 0.2);
        let neutral = event(NewsCategory::Supply, NewsSentiment::Neutral, 0.2);

        assert_eq!(pos.signed_magnitude(), 0.2);
        assert_eq!(neg.signed_magnitude(), -0.2);
        assert_eq!(neutral.signed_magnitude(), 0.0);
    }

    #[test]
    fn neutral_impact_is_a_small_nudge() {
        let neutral = event(NewsCategory::Global, NewsSentiment::Neutral, 0.2);
        assert!((neutral.signed_impact() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn category_targeting() {
        assert!(event(NewsCategory::Supply, NewsSentiment::Positive, 0.1).is_commodity_news());
        assert!(event(NewsCategory::Demand, NewsSentiment::Positive, 0.1).is_commodity_news());
        assert!(!event(NewsCategory::Global, NewsSentiment::Positive, 0.1).is_commodity_news());
        assert!(!event(NewsCategory::Political, NewsSentiment::Positive, 0.1).is_commodity_news());
    }
}
