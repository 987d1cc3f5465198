//! Tick archival buffer.
//!
//! Records one OHLCV row per symbol per tick plus the news fired on each
//! tick, and exports the whole run as per-symbol CSV files (with a
//! `metadata.json` sibling) or one JSON document keyed by symbol with a
//! `_news` sibling keyed by tick.

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

use types::{Price, Symbol, Tick};

/// One archived tick for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickRow {
    pub tick: Tick,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: f64,
}

/// One archived news event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsRow {
    pub symbol: Symbol,
    pub category: String,
    pub sentiment: String,
    pub magnitude: f64,
    pub headline: String,
}

#[derive(Debug, Default)]
struct Inner {
    current_tick: Tick,
    ticks: BTreeMap<Symbol, Vec<TickRow>>,
    news: BTreeMap<Tick, Vec<NewsRow>>,
}

/// Thread-safe archival buffer shared between the tick thread and the export
/// endpoint.
#[derive(Debug, Default)]
pub struct TickBuffer {
    inner: Mutex<Inner>,
}

impl TickBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a symbol; recorded rows for unknown symbols are dropped.
    pub fn add_symbol(&self, symbol: impl Into<Symbol>) {
        self.inner.lock().ticks.entry(symbol.into()).or_default();
    }

    /// Record one symbol's OHLCV for the current tick.
    pub fn record_tick(
        &self,
        symbol: &str,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: f64,
    ) {
        let mut inner = self.inner.lock();
        let tick = inner.current_tick;
        if let Some(rows) = inner.ticks.get_mut(symbol) {
            rows.push(TickRow {
                tick,
                open,
                high,
                low,
                close,
                volume,
            });
        }
    }

    /// Record a news event against the current tick.
    pub fn record_news(&self, news: NewsRow) {
        let mut inner = self.inner.lock();
        let tick = inner.current_tick;
        inner.news.entry(tick).or_default().push(news);
    }

    /// Advance the buffer's tick counter; call once per engine tick after
    /// recording.
    pub fn advance_tick(&self) {
        self.inner.lock().current_tick += 1;
    }

    pub fn current_tick(&self) -> Tick {
        self.inner.lock().current_tick
    }

    pub fn tick_count(&self) -> usize {
        let inner = self.inner.lock();
        inner.ticks.values().next().map_or(0, |rows| rows.len())
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.ticks.clear();
        inner.news.clear();
        inner.current_tick = 0;
    }

    /// Rows for all symbols in `[start_tick, start_tick + count)`.
    pub fn ticks(&self, start_tick: usize, count: usize) -> BTreeMap<Symbol, Vec<TickRow>> {
        let inner = self.inner.lock();
        inner
            .ticks
            .iter()
            .map(|(symbol, rows)| {
                let end = (start_tick + count).min(rows.len());
                let slice = if start_tick < rows.len() {
                    rows[start_tick..end].to_vec()
                } else {
                    Vec::new()
                };
                (symbol.clone(), slice)
            })
            .collect()
    }

    /// Export `<dir>/<symbol>.csv` per symbol plus `metadata.json`.
    /// `max_ticks = 0` exports everything.
    pub fn export_csv(&self, dir: &Path, max_ticks: usize) -> io::Result<()> {
        let inner = self.inner.lock();
        fs::create_dir_all(dir)?;

        let limit = effective_limit(inner.current_tick, max_ticks);

        for (symbol, rows) in &inner.ticks {
            let path = dir.join(format!("{}.csv", symbol));
            let mut file = BufWriter::new(fs::File::create(path)?);
            writeln!(file, "tick,open,high,low,close,volume")?;

            for row in rows.iter().take(limit) {
                writeln!(
                    file,
                    "{},{:.4},{:.4},{:.4},{:.4},{:.2}",
                    row.tick, row.open, row.high, row.low, row.close, row.volume
                )?;
            }
            file.flush()?;
        }

        let metadata = json!({
            "totalTicks": inner.current_tick,
            "exportedTicks": limit,
            "commodities": inner.ticks.len(),
            "exportedAt": Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        });
        fs::write(
            dir.join("metadata.json"),
            serde_json::to_string(&metadata)?,
        )?;

        info!(dir = %dir.display(), ticks = limit, "exported tick buffer to CSV");
        Ok(())
    }

    /// Export one JSON object keyed by symbol with `{ticks: [...]}` values
    /// and a `_news` sibling keyed by tick.
    pub fn export_json(&self, path: &Path, max_ticks: usize) -> io::Result<()> {
        let inner = self.inner.lock();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let limit = effective_limit(inner.current_tick, max_ticks);

        let mut root = serde_json::Map::new();
        for (symbol, rows) in &inner.ticks {
            let ticks: Vec<_> = rows.iter().take(limit).collect();
            root.insert(symbol.clone(), json!({ "ticks": ticks }));
        }

        let mut news = serde_json::Map::new();
        for (&tick, events) in &inner.news {
            if tick as usize >= limit {
                break;
            }
            news.insert(tick.to_string(), json!(events));
        }
        root.insert("_news".to_string(), serde_json::Value::Object(news));

        let file = BufWriter::new(fs::File::create(path)?);
        serde_json::to_writer(file, &serde_json::Value::Object(root))?;

        info!(path = %path.display(), ticks = limit, "exported tick buffer to JSON");
        Ok(())
    }
}

fn effective_limit(current_tick: Tick, max_ticks: usize) -> usize {
    if max_ticks > 0 {
        max_ticks.min(current_tick as usize)
    } else {
        current_tick as usize
    }
}
