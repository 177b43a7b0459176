use crate::types::order_book::OrderBookSnapshot;
use crate::utils::helper::round_notional;

pub const DEFAULT_LIQUIDITY_THRESHOLD: f64 = 3000.0;
pub const DEFAULT_LIQUIDITY_DEPTH: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiquidityAssessment {
    pub ask_notional: f64,
    pub bid_notional: f64,
    pub passed: bool,
}

/// Order-book depth check run before any funding call.
pub struct LiquidityFilter {
    threshold: f64,
    depth: usize,
}

impl LiquidityFilter {
    pub fn new(threshold: f64, depth: usize) -> Self {
        LiquidityFilter { threshold, depth }
    }

    /// Sums notional over the first `min(depth, bids, asks)` levels, so the
    /// deeper side is truncated to the shallower one. Both sides must clear
    /// the threshold strictly.
    pub fn assess(&self, book: &OrderBookSnapshot) -> LiquidityAssessment {
        let levels = self.depth.min(book.bids.len()).min(book.asks.len());

        let ask_notional: f64 = book.asks[..levels].iter().map(|l| l.notional()).sum();
        let bid_notional: f64 = book.bids[..levels].iter().map(|l| l.notional()).sum();

        LiquidityAssessment {
            ask_notional: round_notional(ask_notional),
            bid_notional: round_notional(bid_notional),
            passed: ask_notional > self.threshold && bid_notional > self.threshold,
        }
    }
}

impl Default for LiquidityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_LIQUIDITY_THRESHOLD, DEFAULT_LIQUIDITY_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::order_book::BookLevel;
    use proptest::prelude::*;

    fn book(bids: &[(f64, f64)], asks: &[(f64, f64)]) -> OrderBookSnapshot {
        OrderBookSnapshot::new(
            bids.iter().map(|&(p, v)| BookLevel::new(p, v)).collect(),
            asks.iter().map(|&(p, v)| BookLevel::new(p, v)).collect(),
        )
    }

    #[test]
    fn deep_book_passes() {
        let filter = LiquidityFilter::default();
        let result = filter.assess(&book(
            &[(100.0, 20.0), (99.0, 20.0)],
            &[(101.0, 20.0), (102.0, 20.0)],
        ));

        assert_eq!(result.bid_notional, 3980.0);
        assert_eq!(result.ask_notional, 4060.0);
        assert!(result.passed);
    }

    #[test]
    fn one_thin_side_rejects() {
        let filter = LiquidityFilter::default();
        let result = filter.assess(&book(&[(100.0, 50.0)], &[(101.0, 1.0)]));

        assert!(!result.passed);
    }

    #[test]
    fn threshold_is_strict() {
        let filter = LiquidityFilter::default();
        let result = filter.assess(&book(&[(3000.0, 1.0)], &[(3000.0, 1.0)]));

        assert!(!result.passed);
    }

    #[test]
    fn levels_beyond_shorter_side_are_ignored() {
        let filter = LiquidityFilter::default();
        let result = filter.assess(&book(
            &[(10.0, 100.0), (10.0, 100.0), (10.0, 100.0)],
            &[(10.0, 500.0)],
        ));

        // Only one level per side counts
        assert_eq!(result.bid_notional, 1000.0);
        assert_eq!(result.ask_notional, 5000.0);
        assert!(!result.passed);
    }

    #[test]
    fn empty_book_rejects() {
        let result = LiquidityFilter::default().assess(&OrderBookSnapshot::default());

        assert_eq!(result.ask_notional, 0.0);
        assert!(!result.passed);
    }

    proptest! {
        #[test]
        fn never_reads_more_than_five_levels(
            bids in prop::collection::vec((1.0f64..1000.0, 0.0f64..100.0), 0..12),
            asks in prop::collection::vec((1.0f64..1000.0, 0.0f64..100.0), 0..12),
        ) {
            let full = book(&bids, &asks);
            let levels = 5.min(bids.len()).min(asks.len());
            let truncated = book(&bids[..levels], &asks[..levels]);

            let filter = LiquidityFilter::default();
            prop_assert_eq!(filter.assess(&full), filter.assess(&truncated));
        }
    }
}
