//! Expands goal/event definitions into dated cash-flow occurrences

use crate::plan::{PaymentMode, ScheduledItem};
use crate::rates::{math, InflationOutlook};
use crate::timepoint::TimePoint;
use serde::Serialize;

/// A concrete dated cash flow derived from a scheduled item. The amount is
/// an already-signed delta to the balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Occurrence {
    pub time: TimePoint,
    pub amount: f64,
}

/// Why an item expands to nothing, when malformed.
pub fn schedule_issue(item: &ScheduledItem) -> Option<&'static str> {
    if item.payment_mode == PaymentMode::None {
        return None;
    }
    if item.installment_count == 0 {
        return Some("installment count is zero");
    }
    if item.installment_interval == 0 {
        return Some("installment interval is zero");
    }
    None
}

/// Expand one item into its ordered occurrences.
///
/// - `none`: the full amount once, at the anchor.
/// - `installment`: the amount split evenly across `installment_count`
///   occurrences, `installment_interval` months apart.
/// - `repeat`: the full amount at each of the `installment_count`
///   occurrences.
///
/// With `adjust_for_inflation`, an occurrence `k` months after the anchor
/// is scaled by `(1 + m)^k`, `m` being the monthly inflation in effect at
/// that occurrence's month. Malformed definitions expand to nothing.
pub fn expand(item: &ScheduledItem, inflation: &InflationOutlook) -> Vec<Occurrence> {
    if schedule_issue(item).is_some() {
        return Vec::new();
    }

    let (count, interval, base_amount) = match item.payment_mode {
        PaymentMode::None => (1, 1, item.asset_value),
        PaymentMode::Installment => (
            item.installment_count,
            item.installment_interval,
            item.asset_value / item.installment_count as f64,
        ),
        PaymentMode::Repeat => (
            item.installment_count,
            item.installment_interval,
            item.asset_value,
        ),
    };

    let mut occurrences = Vec::with_capacity(count as usize);
    for i in 0..count {
        let time = item.anchor.add_months((i * interval) as i32);
        let amount = if item.adjust_for_inflation {
            let elapsed = item.anchor.months_until(time);
            base_amount * math::compound_factor(inflation.monthly_rate_at(time), elapsed)
        } else {
            base_amount
        };
        occurrences.push(Occurrence { time, amount });
    }
    occurrences
}

/// Expand every item and keep the occurrences inside `[from, to]`, sorted
/// ascending. Out-of-window occurrences are silently dropped.
pub fn expand_within(
    items: &[ScheduledItem],
    from: TimePoint,
    to: TimePoint,
    inflation: &InflationOutlook,
) -> Vec<Occurrence> {
    let mut all: Vec<Occurrence> = items
        .iter()
        .flat_map(|item| expand(item, inflation))
        .filter(|o| o.time >= from && o.time <= to)
        .collect();
    all.sort_by_key(|o| o.time);
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::ItemKind;

    fn item(mode: PaymentMode, asset_value: f64, count: u32, interval: u32) -> ScheduledItem {
        ScheduledItem {
            name: "test item".to_string(),
            kind: ItemKind::Goal,
            asset_value,
            anchor: TimePoint::new(2026, 1),
            payment_mode: mode,
            installment_count: count,
            installment_interval: interval,
            adjust_for_inflation: false,
        }
    }

    fn no_inflation() -> InflationOutlook {
        InflationOutlook::flat(0.0)
    }

    #[test]
    fn test_mode_none_is_single_occurrence() {
        // Count and interval are irrelevant for single occurrences.
        let occurrences = expand(&item(PaymentMode::None, -30_000.0, 0, 0), &no_inflation());

        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].time, TimePoint::new(2026, 1));
        assert_eq!(occurrences[0].amount, -30_000.0);
    }

    #[test]
    fn test_installment_splits_total() {
        let occurrences = expand(&item(PaymentMode::Installment, 12_000.0, 12, 1), &no_inflation());

        assert_eq!(occurrences.len(), 12);
        for (i, occurrence) in occurrences.iter().enumerate() {
            assert_eq!(occurrence.time, TimePoint::new(2026, 1).add_months(i as i32));
            assert!((occurrence.amount - 1_000.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_installment_preserves_sign() {
        let occurrences = expand(&item(PaymentMode::Installment, -12_000.0, 12, 1), &no_inflation());
        assert!(occurrences.iter().all(|o| (o.amount + 1_000.0).abs() < 1e-10));
    }

    #[test]
    fn test_repeat_recurs_full_amount() {
        let occurrences = expand(&item(PaymentMode::Repeat, 500.0, 6, 3), &no_inflation());

        assert_eq!(occurrences.len(), 6);
        for (i, occurrence) in occurrences.iter().enumerate() {
            assert_eq!(occurrence.time, TimePoint::new(2026, 1).add_months(3 * i as i32));
            assert_eq!(occurrence.amount, 500.0);
        }
        // Six occurrences 3 months apart span 15 months.
        assert_eq!(occurrences[0].time.months_until(occurrences[5].time), 15);
    }

    #[test]
    fn test_malformed_items_expand_to_nothing() {
        assert!(expand(&item(PaymentMode::Installment, 1_000.0, 0, 1), &no_inflation()).is_empty());
        assert!(expand(&item(PaymentMode::Repeat, 1_000.0, 6, 0), &no_inflation()).is_empty());

        assert_eq!(
            schedule_issue(&item(PaymentMode::Installment, 1_000.0, 0, 1)),
            Some("installment count is zero")
        );
        assert_eq!(
            schedule_issue(&item(PaymentMode::Repeat, 1_000.0, 6, 0)),
            Some("installment interval is zero")
        );
        assert_eq!(schedule_issue(&item(PaymentMode::None, 1_000.0, 0, 0)), None);
    }

    #[test]
    fn test_inflation_adjustment_compounds_from_anchor() {
        let mut repeating = item(PaymentMode::Repeat, 1_000.0, 3, 1);
        repeating.adjust_for_inflation = true;
        let inflation = InflationOutlook::flat(0.01);

        let occurrences = expand(&repeating, &inflation);

        assert!((occurrences[0].amount - 1_000.0).abs() < 1e-10);
        assert!((occurrences[1].amount - 1_010.0).abs() < 1e-10);
        assert!((occurrences[2].amount - 1_020.10).abs() < 1e-10);
    }

    #[test]
    fn test_expand_within_clips_and_sorts() {
        let items = vec![
            item(PaymentMode::Repeat, 500.0, 6, 3), // 01/2026 through 04/2027
            item(PaymentMode::None, -2_000.0, 1, 1), // 01/2026
        ];

        let occurrences = expand_within(
            &items,
            TimePoint::new(2026, 1),
            TimePoint::new(2026, 8),
            &no_inflation(),
        );

        // Repeat occurrences at 01, 04, 07 survive; 10/2026 onward clipped.
        assert_eq!(occurrences.len(), 4);
        assert!(occurrences.windows(2).all(|w| w[0].time <= w[1].time));
        assert_eq!(occurrences[0].time, TimePoint::new(2026, 1));
        assert_eq!(occurrences[3].time, TimePoint::new(2026, 7));
    }
}
