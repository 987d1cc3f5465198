//! Order book with price-time priority matching.
//!
//! Resting orders live in two binary heaps (bids: highest price then earliest
//! timestamp; asks: lowest price then earliest timestamp). Cancellation is
//! lazy: a side map flags the order inactive and the heaps purge flagged or
//! age-expired entries opportunistically at match time and on best-price
//! queries. A best-price index caches price -> order id per side so quote
//! queries are O(1) expected, with a linear heap scan as the rebuild path.

use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use types::{
    BookLevel, BookSnapshot, Order, OrderId, OrderSide, OrderType, Price, Symbol, Timestamp, Trade,
};

use crate::clock::ClockHandle;

/// Default order age limit: two simulated days.
const DEFAULT_MAX_ORDER_AGE_MS: Timestamp = 172_800_000;

/// Process-wide order id source. Ids are strictly increasing and never
/// reused, across every book.
static NEXT_ORDER_ID: AtomicU64 = AtomicU64::new(1);

fn fresh_order_id() -> OrderId {
    OrderId(NEXT_ORDER_ID.fetch_add(1, AtomicOrdering::Relaxed))
}

// =============================================================================
// Price keys and heap entries
// =============================================================================

/// Total-ordered wrapper for f64 prices. Prices are validated finite at the
/// engine boundary, so `total_cmp` gives a plain numeric order here.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PriceKey(f64);

impl Eq for PriceKey {}

impl PartialOrd for PriceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Max-heap entry for bids: highest price wins, ties go to the earlier
/// timestamp, then the lower id.
#[derive(Debug, Clone)]
struct BidEntry(Order);

impl PartialEq for BidEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for BidEntry {}

impl PartialOrd for BidEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BidEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .price
            .total_cmp(&other.0.price)
            .then_with(|| other.0.timestamp.cmp(&self.0.timestamp))
            .then_with(|| other.0.id.cmp(&self.0.id))
    }
}

/// Max-heap entry for asks: lowest price wins, ties go to the earlier
/// timestamp, then the lower id.
#[derive(Debug, Clone)]
struct AskEntry(Order);

impl PartialEq for AskEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for AskEntry {}

impl PartialOrd for AskEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AskEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .price
            .total_cmp(&self.0.price)
            .then_with(|| other.0.timestamp.cmp(&self.0.timestamp))
            .then_with(|| other.0.id.cmp(&self.0.id))
    }
}

// =============================================================================
// Book internals
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct OrderMeta {
    price: PriceKey,
    timestamp: Timestamp,
}

#[derive(Debug, Default)]
struct Inner {
    bids: BinaryHeap<BidEntry>,
    asks: BinaryHeap<AskEntry>,
    /// Liveness flags for lazy cancellation. An order is logically in the
    /// book iff its flag here is true.
    active: HashMap<OrderId, bool>,
    bid_meta: HashMap<OrderId, OrderMeta>,
    ask_meta: HashMap<OrderId, OrderMeta>,
    /// Cached best-price index per side: price -> one live order id at that
    /// price. Stale entries are dropped on query.
    best_bid_by_price: BTreeMap<PriceKey, OrderId>,
    best_ask_by_price: BTreeMap<PriceKey, OrderId>,
    max_order_age_ms: Timestamp,
}

impl Inner {
    fn is_live(&self, id: OrderId, now: Timestamp) -> bool {
        if !self.active.get(&id).copied().unwrap_or(false) {
            return false;
        }
        let ts = self
            .bid_meta
            .get(&id)
            .or_else(|| self.ask_meta.get(&id))
            .map(|m| m.timestamp)
            .unwrap_or(0);
        now.saturating_sub(ts) <= self.max_order_age_ms
    }

    fn is_expired(&self, order: &Order, now: Timestamp) -> bool {
        now.saturating_sub(order.timestamp) > self.max_order_age_ms
    }

    /// Forget an order that left the book (filled, cancelled-and-popped, or
    /// expired-and-popped).
    fn forget(&mut self, id: OrderId) {
        self.active.remove(&id);
        self.bid_meta.remove(&id);
        self.ask_meta.remove(&id);
    }

    fn best_bid(&mut self, now: Timestamp) -> Price {
        loop {
            let top = self
                .best_bid_by_price
                .iter()
                .next_back()
                .map(|(&key, &id)| (key, id));
            let Some((key, id)) = top else { break };
            if self.is_live(id, now) {
                return key.0;
            }
            self.best_bid_by_price.remove(&key);
        }

        // Index exhausted: scan the heap for the best live order and rebuild.
        let mut best: Option<&Order> = None;
        for entry in self.bids.iter() {
            let o = &entry.0;
            if !self.active.get(&o.id).copied().unwrap_or(false) || self.is_expired(o, now) {
                continue;
            }
            match best {
                Some(b) if b.price >= o.price => {}
                _ => best = Some(o),
            }
        }
        if let Some(o) = best {
            self.best_bid_by_price.insert(PriceKey(o.price), o.id);
            o.price
        } else {
            0.0
        }
    }

    fn best_ask(&mut self, now: Timestamp) -> Price {
        loop {
            let top = self
                .best_ask_by_price
                .iter()
                .next()
                .map(|(&key, &id)| (key, id));
            let Some((key, id)) = top else { break };
            if self.is_live(id, now) {
                return key.0;
            }
            self.best_ask_by_price.remove(&key);
        }

        let mut best: Option<&Order> = None;
        for entry in self.asks.iter() {
            let o = &entry.0;
            if !self.active.get(&o.id).copied().unwrap_or(false) || self.is_expired(o, now) {
                continue;
            }
            match best {
                Some(b) if b.price <= o.price => {}
                _ => best = Some(o),
            }
        }
        if let Some(o) = best {
            self.best_ask_by_price.insert(PriceKey(o.price), o.id);
            o.price
        } else {
            Price::INFINITY
        }
    }

    fn spread(&mut self, now: Timestamp) -> Price {
        let bid = self.best_bid(now);
        let ask = self.best_ask(now);
        if bid > 0.0 && ask.is_finite() {
            ask - bid
        } else {
            0.0
        }
    }

    fn mid_price(&mut self, now: Timestamp) -> Price {
        let bid = self.best_bid(now);
        let ask = self.best_ask(now);
        if bid > 0.0 && ask.is_finite() {
            (bid + ask) / 2.0
        } else if bid > 0.0 {
            bid
        } else if ask.is_finite() {
            ask
        } else {
            0.0
        }
    }

    /// Drop cancelled or expired orders from the top of both heaps.
    fn purge_tops(&mut self, now: Timestamp) {
        loop {
            let top = self.bids.peek().map(|e| (e.0.id, e.0.timestamp));
            let Some((id, timestamp)) = top else { break };
            if !self.active.get(&id).copied().unwrap_or(false)
                || now.saturating_sub(timestamp) > self.max_order_age_ms
            {
                self.bids.pop();
                self.forget(id);
            } else {
                break;
            }
        }
        loop {
            let top = self.asks.peek().map(|e| (e.0.id, e.0.timestamp));
            let Some((id, timestamp)) = top else { break };
            if !self.active.get(&id).copied().unwrap_or(false)
                || now.saturating_sub(timestamp) > self.max_order_age_ms
            {
                self.asks.pop();
                self.forget(id);
            } else {
                break;
            }
        }
    }
}

// =============================================================================
// OrderBook
// =============================================================================

/// Continuous-double-auction order book for a single symbol.
///
/// Every public operation takes the book's own mutex, so snapshots and quote
/// queries stay consistent even when the caller only holds a shared engine
/// lock. Locks are always acquired engine-then-book, never the reverse.
#[derive(Debug)]
pub struct OrderBook {
    symbol: Symbol,
    clock: ClockHandle,
    inner: Mutex<Inner>,
}

impl OrderBook {
    pub fn new(symbol: impl Into<Symbol>, clock: ClockHandle) -> Self {
        Self {
            symbol: symbol.into(),
            clock,
            inner: Mutex::new(Inner {
                max_order_age_ms: DEFAULT_MAX_ORDER_AGE_MS,
                ..Default::default()
            }),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Configure the age after which resting orders silently expire
    /// (simulated milliseconds).
    pub fn set_max_order_age_ms(&self, ms: Timestamp) {
        self.inner.lock().max_order_age_ms = ms;
    }

    /// Accept an order: assign a fresh monotone id when unassigned, stamp the
    /// simulated timestamp, and enqueue. Never rejects; invalid input is
    /// filtered at the engine boundary.
    pub fn add(&self, order: Order) -> Order {
        let mut inner = self.inner.lock();

        let mut order = order;
        if order.id.is_unassigned() {
            order.id = fresh_order_id();
        }
        order.timestamp = self.clock.now();

        inner.active.insert(order.id, true);
        let meta = OrderMeta {
            price: PriceKey(order.price),
            timestamp: order.timestamp,
        };
        match order.side {
            OrderSide::Buy => {
                inner.bid_meta.insert(order.id, meta);
                inner
                    .best_bid_by_price
                    .entry(meta.price)
                    .or_insert(order.id);
                inner.bids.push(BidEntry(order.clone()));
            }
            OrderSide::Sell => {
                inner.ask_meta.insert(order.id, meta);
                inner
                    .best_ask_by_price
                    .entry(meta.price)
                    .or_insert(order.id);
                inner.asks.push(AskEntry(order.clone()));
            }
        }

        order
    }

    /// Flag an order inactive; queue removal is deferred to the lazy purge.
    /// Returns true if the order was previously live.
    pub fn cancel(&self, id: OrderId) -> bool {
        let mut inner = self.inner.lock();

        let was_live = inner.active.get(&id).copied().unwrap_or(false);
        if !was_live {
            return false;
        }
        inner.active.insert(id, false);

        if let Some(meta) = inner.bid_meta.remove(&id) {
            if inner.best_bid_by_price.get(&meta.price) == Some(&id) {
                inner.best_bid_by_price.remove(&meta.price);
            }
        }
        if let Some(meta) = inner.ask_meta.remove(&id) {
            if inner.best_ask_by_price.get(&meta.price) == Some(&id) {
                inner.best_ask_by_price.remove(&meta.price);
            }
        }

        true
    }

    /// Produce fills obeying price-time priority, bounded order age, and lazy
    /// cancellation. Residual quantity is re-enqueued keeping id and
    /// timestamp, so time priority survives partial fills.
    pub fn match_orders(&self) -> Vec<Trade> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let mut trades = Vec::new();

        inner.purge_tops(now);

        loop {
            let (Some(bid_top), Some(ask_top)) = (inner.bids.peek(), inner.asks.peek()) else {
                break;
            };
            let bid = bid_top.0.clone();
            let ask = ask_top.0.clone();

            // Skip cancelled or expired tops.
            if !inner.active.get(&bid.id).copied().unwrap_or(false)
                || inner.is_expired(&bid, now)
            {
                inner.bids.pop();
                inner.forget(bid.id);
                continue;
            }
            if !inner.active.get(&ask.id).copied().unwrap_or(false)
                || inner.is_expired(&ask, now)
            {
                inner.asks.pop();
                inner.forget(ask.id);
                continue;
            }

            if bid.price < ask.price
                && bid.order_type == OrderType::Limit
                && ask.order_type == OrderType::Limit
            {
                break; // No match possible.
            }

            // Execution price: the resting (earlier) side's price; a market
            // order always takes the opposite side's price.
            let exec_price = if bid.order_type == OrderType::Market {
                ask.price
            } else if ask.order_type == OrderType::Market {
                bid.price
            } else if bid.timestamp < ask.timestamp {
                bid.price
            } else {
                ask.price
            };

            let exec_qty = bid.quantity.min(ask.quantity);

            trades.push(Trade {
                buy_order_id: bid.id,
                sell_order_id: ask.id,
                buyer_id: bid.agent_id,
                seller_id: ask.agent_id,
                buyer_type: String::new(),
                seller_type: String::new(),
                symbol: self.symbol.clone(),
                price: exec_price,
                quantity: exec_qty,
                timestamp: now,
            });

            inner.bids.pop();
            inner.asks.pop();
            inner.best_bid_by_price.remove(&PriceKey(bid.price));
            inner.best_ask_by_price.remove(&PriceKey(ask.price));

            if bid.quantity > exec_qty {
                let mut residual = bid;
                residual.quantity -= exec_qty;
                let key = PriceKey(residual.price);
                inner.best_bid_by_price.insert(key, residual.id);
                inner.bids.push(BidEntry(residual));
            } else {
                inner.forget(bid.id);
            }

            if ask.quantity > exec_qty {
                let mut residual = ask;
                residual.quantity -= exec_qty;
                let key = PriceKey(residual.price);
                inner.best_ask_by_price.insert(key, residual.id);
                inner.asks.push(AskEntry(residual));
            } else {
                inner.forget(ask.id);
            }
        }

        trades
    }

    /// Highest live bid price; 0 when the bid side is empty.
    pub fn best_bid(&self) -> Price {
        let now = self.clock.now();
        self.inner.lock().best_bid(now)
    }

    /// Lowest live ask price; +inf when the ask side is empty.
    pub fn best_ask(&self) -> Price {
        let now = self.clock.now();
        self.inner.lock().best_ask(now)
    }

    /// Ask minus bid; 0 unless both sides are live. Computed on one locked
    /// view so it is consistent with `mid_price`.
    pub fn spread(&self) -> Price {
        let now = self.clock.now();
        self.inner.lock().spread(now)
    }

    /// Midpoint of the live quotes, falling back to the one live side; 0 on
    /// an empty book.
    pub fn mid_price(&self) -> Price {
        let now = self.clock.now();
        self.inner.lock().mid_price(now)
    }

    /// Aggregate per-price-level quantities for the top `depth` levels of
    /// each side, skipping cancelled orders.
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        let now = self.clock.now();
        let mut inner = self.inner.lock();

        let mut bid_levels: BTreeMap<PriceKey, (i64, usize)> = BTreeMap::new();
        for entry in inner.bids.iter() {
            let o = &entry.0;
            if inner.active.get(&o.id).copied().unwrap_or(false) && !inner.is_expired(o, now) {
                let level = bid_levels.entry(PriceKey(o.price)).or_insert((0, 0));
                level.0 += o.quantity;
                level.1 += 1;
            }
        }
        let mut ask_levels: BTreeMap<PriceKey, (i64, usize)> = BTreeMap::new();
        for entry in inner.asks.iter() {
            let o = &entry.0;
            if inner.active.get(&o.id).copied().unwrap_or(false) && !inner.is_expired(o, now) {
                let level = ask_levels.entry(PriceKey(o.price)).or_insert((0, 0));
                level.0 += o.quantity;
                level.1 += 1;
            }
        }

        let bids: Vec<BookLevel> = bid_levels
            .iter()
            .rev()
            .take(depth)
            .map(|(key, &(qty, count))| BookLevel {
                price: key.0,
                total_quantity: qty,
                order_count: count,
            })
            .collect();
        let asks: Vec<BookLevel> = ask_levels
            .iter()
            .take(depth)
            .map(|(key, &(qty, count))| BookLevel {
                price: key.0,
                total_quantity: qty,
                order_count: count,
            })
            .collect();

        BookSnapshot {
            symbol: self.symbol.clone(),
            bids,
            asks,
            best_bid: inner.best_bid(now),
            best_ask: inner.best_ask(now),
            spread: inner.spread(now),
            mid_price: inner.mid_price(now),
        }
    }

    /// Empty queues and indices.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.bids.clear();
        inner.asks.clear();
        inner.active.clear();
        inner.bid_meta.clear();
        inner.ask_meta.clear();
        inner.best_bid_by_price.clear();
        inner.best_ask_by_price.clear();
    }

    /// Number of enqueued bid entries, including not-yet-purged stale ones.
    pub fn bid_count(&self) -> usize {
        self.inner.lock().bids.len()
    }

    /// Number of enqueued ask entries, including not-yet-purged stale ones.
    pub fn ask_count(&self) -> usize {
        self.inner.lock().asks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimClock;
    use types::AgentId;

    fn test_clock() -> (SimClock, ClockHandle) {
        let mut clock = SimClock::new();
        clock.initialize("2025-01-01", 72_000).unwrap();
        let handle = clock.handle();
        (clock, handle)
    }

    fn book() -> (SimClock, OrderBook) {
        let (clock, handle) = test_clock();
        let book = OrderBook::new("OIL", handle);
        (clock, book)
    }

    #[test]
    fn empty_book_conventions() {
        let (_clock, book) = book();
        assert_eq!(book.best_bid(), 0.0);
        assert_eq!(book.best_ask(), Price::INFINITY);
        assert_eq!(book.spread(), 0.0);
        assert_eq!(book.mid_price(), 0.0);
        assert!(book.match_orders().is_empty());
    }

    #[test]
    fn assigns_monotone_ids() {
        let (_clock, book) = book();
        let a = book.add(Order::limit(AgentId(1), "OIL", OrderSide::Buy, 100.0, 1));
        let b = book.add(Order::limit(AgentId(1), "OIL", OrderSide::Buy, 100.0, 1));
        assert!(!a.id.is_unassigned());
        assert!(b.id > a.id);
    }

    #[test]
    fn basic_cross_executes_at_resting_price() {
        let (mut clock, book) = book();

        book.add(Order::limit(AgentId(1), "OIL", OrderSide::Buy, 105.0, 10));
        clock.tick(); // later timestamp for the ask
        book.add(Order::limit(AgentId(2), "OIL", OrderSide::Sell, 100.0, 10));

        let trades = book.match_orders();
        assert_eq!(trades.len(), 1);
        let t = &trades[0];
        assert_eq!(t.price, 105.0); // resting bid's price
        assert_eq!(t.quantity, 10);
        assert_eq!(t.buyer_id, AgentId(1));
        assert_eq!(t.seller_id, AgentId(2));

        // Book empty afterwards.
        assert_eq!(book.best_bid(), 0.0);
        assert_eq!(book.best_ask(), Price::INFINITY);
    }

    #[test]
    fn partial_fill_leaves_residual_bid() {
        let (mut clock, book) = book();

        book.add(Order::limit(AgentId(1), "OIL", OrderSide::Buy, 105.0, 15));
        clock.tick();
        book.add(Order::limit(AgentId(2), "OIL", OrderSide::Sell, 100.0, 10));

        let trades = book.match_orders();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].quantity, 10);

        let snap = book.snapshot(5);
        assert_eq!(snap.bids.len(), 1);
        assert_eq!(snap.bids[0].price, 105.0);
        assert_eq!(snap.bids[0].total_quantity, 5);
        assert!(snap.asks.is_empty());
    }

    #[test]
    fn market_order_sweeps_levels_in_price_order() {
        let (mut clock, book) = book();

        book.add(Order::limit(AgentId(1), "OIL", OrderSide::Sell, 100.0, 5));
        clock.tick();
        book.add(Order::limit(AgentId(2), "OIL", OrderSide::Sell, 101.0, 5));
        clock.tick();
        book.add(Order::limit(AgentId(3), "OIL", OrderSide::Sell, 102.0, 5));
        clock.tick();
        book.add(Order::market(AgentId(4), "OIL", OrderSide::Buy, 12));

        let trades = book.match_orders();
        let fills: Vec<(Price, i64)> = trades.iter().map(|t| (t.price, t.quantity)).collect();
        assert_eq!(fills, vec![(100.0, 5), (101.0, 5), (102.0, 2)]);

        // Residual ask of 3 at 102 remains.
        let snap = book.snapshot(5);
        assert_eq!(snap.asks.len(), 1);
        assert_eq!(snap.asks[0].total_quantity, 3);
        assert!(snap.bids.is_empty());
    }

    #[test]
    fn time_priority_at_same_price() {
        let (mut clock, book) = book();

        let first = book.add(Order::limit(AgentId(1), "OIL", OrderSide::Buy, 100.0, 5));
        clock.tick();
        let _second = book.add(Order::limit(AgentId(2), "OIL", OrderSide::Buy, 100.0, 5));
        clock.tick();
        book.add(Order::limit(AgentId(3), "OIL", OrderSide::Sell, 100.0, 5));

        let trades = book.match_orders();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].buy_order_id, first.id);
        assert_eq!(trades[0].buyer_id, AgentId(1));
    }

    #[test]
    fn no_match_when_spread_open() {
        let (_clock, book) = book();
        book.add(Order::limit(AgentId(1), "OIL", OrderSide::Buy, 99.0, 10));
        book.add(Order::limit(AgentId(2), "OIL", OrderSide::Sell, 101.0, 10));

        assert!(book.match_orders().is_empty());
        assert_eq!(book.best_bid(), 99.0);
        assert_eq!(book.best_ask(), 101.0);
        assert_eq!(book.spread(), 2.0);
        assert_eq!(book.mid_price(), 100.0);
    }

    #[test]
    fn after_match_remaining_sides_do_not_cross() {
        let (mut clock, book) = book();
        for (side, price, qty) in [
            (OrderSide::Buy, 101.0, 4),
            (OrderSide::Buy, 99.0, 7),
            (OrderSide::Sell, 100.5, 3),
            (OrderSide::Sell, 103.0, 6),
        ] {
            book.add(Order::limit(AgentId(1), "OIL", side, price, qty));
            clock.tick();
        }

        book.match_orders();

        let bid = book.best_bid();
        let ask = book.best_ask();
        if bid > 0.0 && ask.is_finite() {
            assert!(bid < ask);
        }
    }

    #[test]
    fn cancelled_order_never_fills() {
        let (mut clock, book) = book();

        let bid = book.add(Order::limit(AgentId(1), "OIL", OrderSide::Buy, 105.0, 10));
        assert!(book.cancel(bid.id));
        assert!(!book.cancel(bid.id)); // already cancelled

        clock.tick();
        book.add(Order::limit(AgentId(2), "OIL", OrderSide::Sell, 100.0, 10));

        assert!(book.match_orders().is_empty());
        assert_eq!(book.best_bid(), 0.0);
        assert_eq!(book.best_ask(), 100.0);
    }

    #[test]
    fn cancel_reveals_next_best_price() {
        let (_clock, book) = book();
        let top = book.add(Order::limit(AgentId(1), "OIL", OrderSide::Buy, 101.0, 5));
        book.add(Order::limit(AgentId(2), "OIL", OrderSide::Buy, 100.0, 5));

        assert_eq!(book.best_bid(), 101.0);
        book.cancel(top.id);
        assert_eq!(book.best_bid(), 100.0);
    }

    #[test]
    fn expired_orders_are_purged_lazily() {
        let (mut clock, book) = book();
        book.set_max_order_age_ms(1_000);

        book.add(Order::limit(AgentId(1), "OIL", OrderSide::Buy, 100.0, 5));
        // At 72 000 ticks/day one tick is 1200 simulated ms, beyond the age.
        clock.tick();

        book.add(Order::limit(AgentId(2), "OIL", OrderSide::Sell, 100.0, 5));
        assert!(book.match_orders().is_empty());
        assert_eq!(book.best_bid(), 0.0);
    }

    #[test]
    fn unfilled_market_order_rests() {
        let (mut clock, book) = book();

        book.add(Order::market(AgentId(1), "OIL", OrderSide::Buy, 5));
        assert!(book.match_orders().is_empty());

        clock.tick();
        book.add(Order::limit(AgentId(2), "OIL", OrderSide::Sell, 104.0, 5));
        let trades = book.match_orders();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, 104.0);
        assert_eq!(trades[0].buyer_id, AgentId(1));
    }

    #[test]
    fn snapshot_is_idempotent() {
        let (mut clock, book) = book();
        book.add(Order::limit(AgentId(1), "OIL", OrderSide::Buy, 99.0, 10));
        clock.tick();
        book.add(Order::limit(AgentId(1), "OIL", OrderSide::Buy, 99.0, 20));
        book.add(Order::limit(AgentId(2), "OIL", OrderSide::Sell, 101.0, 15));

        let a = book.snapshot(10);
        let b = book.snapshot(10);
        assert_eq!(a, b);
        assert_eq!(a.bids[0].total_quantity, 30);
        assert_eq!(a.bids[0].order_count, 2);
    }

    #[test]
    fn cleared_book_behaves_like_fresh_book() {
        let (mut clock, book) = book();
        book.add(Order::limit(AgentId(1), "OIL", OrderSide::Buy, 99.0, 10));
        clock.tick();
        book.clear();

        assert_eq!(book.best_bid(), 0.0);
        assert_eq!(book.bid_count(), 0);

        let order = book.add(Order::limit(AgentId(1), "OIL", OrderSide::Buy, 98.0, 4));
        assert_eq!(book.best_bid(), 98.0);
        assert!(!order.id.is_unassigned());

        let snap = book.snapshot(5);
        assert_eq!(snap.bids.len(), 1);
        assert_eq!(snap.bids[0].total_quantity, 4);
    }
}
