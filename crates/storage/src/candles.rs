//! Multi-interval OHLCV candle cache.
//!
//! A pure fold over the per-tick price/volume stream: each registered symbol
//! keeps one building candle plus a bounded deque of completed candles per
//! interval. Time boundaries are aligned on simulated epoch milliseconds.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use types::{Price, Symbol, Timestamp};

/// Completed candles retained per symbol and interval.
const MAX_CANDLES: usize = 10_000;

const MS_PER_MINUTE: Timestamp = 60_000;
const MS_PER_HOUR: Timestamp = 3_600_000;
const MS_PER_DAY: Timestamp = 86_400_000;

/// OHLCV candle over one interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Start of the candle period (simulated epoch ms).
    pub time: Timestamp,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: f64,
}

impl Candle {
    pub fn is_valid(&self) -> bool {
        self.time > 0 && self.open > 0.0
    }
}

/// Supported candle intervals in simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CandleInterval {
    M1,
    M5,
    M15,
    M30,
    H1,
    D1,
}

impl CandleInterval {
    pub const ALL: [CandleInterval; 6] = [
        CandleInterval::M1,
        CandleInterval::M5,
        CandleInterval::M15,
        CandleInterval::M30,
        CandleInterval::H1,
        CandleInterval::D1,
    ];

    pub fn duration_ms(self) -> Timestamp {
        match self {
            CandleInterval::M1 => MS_PER_MINUTE,
            CandleInterval::M5 => 5 * MS_PER_MINUTE,
            CandleInterval::M15 => 15 * MS_PER_MINUTE,
            CandleInterval::M30 => 30 * MS_PER_MINUTE,
            CandleInterval::H1 => MS_PER_HOUR,
            CandleInterval::D1 => MS_PER_DAY,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CandleInterval::M1 => "1m",
            CandleInterval::M5 => "5m",
            CandleInterval::M15 => "15m",
            CandleInterval::M30 => "30m",
            CandleInterval::H1 => "1h",
            CandleInterval::D1 => "1d",
        }
    }

    /// Parse "1m" / "5m" / "15m" / "30m" / "1h" / "1d"; None otherwise.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(CandleInterval::M1),
            "5m" => Some(CandleInterval::M5),
            "15m" => Some(CandleInterval::M15),
            "30m" => Some(CandleInterval::M30),
            "1h" => Some(CandleInterval::H1),
            "1d" => Some(CandleInterval::D1),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CandleState {
    current: Option<Candle>,
    completed: VecDeque<Candle>,
}

impl CandleState {
    fn on_tick(&mut self, price: Price, volume: f64, boundary: Timestamp) {
        match &mut self.current {
            None => {
                self.current = Some(Candle {
                    time: boundary,
                    open: price,
                    high: price,
                    low: price,
                    close: price,
                    volume,
                });
            }
            Some(current) if boundary > current.time => {
                if current.is_valid() {
                    self.completed.push_back(*current);
                    while self.completed.len() > MAX_CANDLES {
                        self.completed.pop_front();
                    }
                }
                self.current = Some(Candle {
                    time: boundary,
                    open: price,
                    high: price,
                    low: price,
                    close: price,
                    volume,
                });
            }
            Some(current) => {
                current.high = current.high.max(price);
                current.low = current.low.min(price);
                current.close = price;
                current.volume += volume;
            }
        }
    }
}

/// Aggregates tick-level prices into OHLCV candles at every interval.
#[derive(Debug, Default)]
pub struct CandleAggregator {
    /// symbol -> interval -> state.
    data: BTreeMap<Symbol, BTreeMap<CandleInterval, CandleState>>,
}

impl CandleAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a symbol to track at all intervals.
    pub fn add_symbol(&mut self, symbol: impl Into<Symbol>) {
        let states = self.data.entry(symbol.into()).or_default();
        for interval in CandleInterval::ALL {
            states.entry(interval).or_default();
        }
    }

    /// Feed one price tick. Unregistered symbols are ignored.
    pub fn on_tick(&mut self, symbol: &str, price: Price, volume: f64, sim_time: Timestamp) {
        let Some(states) = self.data.get_mut(symbol) else {
            return;
        };
        for (interval, state) in states.iter_mut() {
            let boundary = (sim_time / interval.duration_ms()) * interval.duration_ms();
            state.on_tick(price, volume, boundary);
        }
    }

    /// Completed candles in chronological order, filtered to `time >= since`
    /// (when non-zero) and truncated to the most recent `limit`.
    pub fn candles(
        &self,
        symbol: &str,
        interval: CandleInterval,
        since: Timestamp,
        limit: usize,
    ) -> Vec<Candle> {
        let Some(state) = self.data.get(symbol).and_then(|s| s.get(&interval)) else {
            return Vec::new();
        };

        let mut result: Vec<Candle> = state
            .completed
            .iter()
            .rev()
            .take_while(|c| since == 0 || c.time >= since)
            .take(limit)
            .copied()
            .collect();
        result.reverse();
        result
    }

    /// Completed candles for every symbol at one interval.
    pub fn all_candles(
        &self,
        interval: CandleInterval,
        since: Timestamp,
    ) -> BTreeMap<Symbol, Vec<Candle>> {
        self.data
            .keys()
            .map(|symbol| {
                (
                    symbol.clone(),
                    self.candles(symbol, interval, since, MAX_CANDLES),
                )
            })
            .collect()
    }

    /// The currently building (incomplete) candle, if any.
    pub fn current_candle(&self, symbol: &str, interval: CandleInterval) -> Option<Candle> {
        self.data
            .get(symbol)
            .and_then(|s| s.get(&interval))
            .and_then(|state| state.current)
    }

    pub fn candle_count(&self, symbol: &str, interval: CandleInterval) -> usize {
        self.data
            .get(symbol)
            .and_then(|s| s.get(&interval))
            .map_or(0, |state| state.completed.len())
    }

    pub fn reset(&mut self) {
        self.data.clear();
    }
}
