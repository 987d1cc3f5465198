//! Storage-side collaborators of the engine: the tick archival buffer used
//! for batch export and the OHLCV candle cache.

mod candles;
mod tick_buffer;

pub use candles::{Candle, CandleAggregator, CandleInterval};
pub use tick_buffer::{NewsRow, TickBuffer, TickRow};
