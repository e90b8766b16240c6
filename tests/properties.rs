//! Property tests for the aggregation core.
//!
//! These check the median against a sort-based reference and show that the
//! final report does not depend on the order records arrive in.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rust_decimal::Decimal;

use sales_report::{RunningMedian, SaleRecord, SalesAggregator};

fn reference_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn sorted_median(values: &[Decimal]) -> Decimal {
    let mut sorted = values.to_vec();
    sorted.sort();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / Decimal::TWO
    }
}

/// Decimal with two places, including negatives and plenty of duplicates.
fn arb_decimal() -> impl Strategy<Value = Decimal> {
    (-500i64..500).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_record() -> impl Strategy<Value = SaleRecord> {
    (
        prop::sample::select(vec!["North", "South", "East", "West"]),
        1i64..100_000,
        0i64..3_650,
        0i64..1_000_000,
    )
        .prop_map(|(region, cost_cents, days_ago, revenue_cents)| {
            SaleRecord::new(
                region,
                Decimal::new(cost_cents, 2),
                reference_time() - Duration::days(days_ago),
                Decimal::new(revenue_cents, 2),
            )
        })
}

proptest! {
    #[test]
    fn median_matches_sorted_reference(values in prop::collection::vec(arb_decimal(), 1..200)) {
        let mut median = RunningMedian::new();
        for v in &values {
            median.insert(*v);
            prop_assert!(median.check_invariants().is_ok());
        }

        prop_assert_eq!(median.median(), Some(sorted_median(&values)));
        prop_assert_eq!(median.len(), values.len() as u64);
    }

    #[test]
    fn report_is_order_independent(
        (records, shuffled) in prop::collection::vec(arb_record(), 1..60)
            .prop_flat_map(|records| {
                let shuffled = Just(records.clone()).prop_shuffle();
                (Just(records), shuffled)
            })
    ) {
        let mut forward = SalesAggregator::with_reference_time(reference_time());
        forward.accept_all(&records).unwrap();

        let mut permuted = SalesAggregator::with_reference_time(reference_time());
        permuted.accept_all(&shuffled).unwrap();

        prop_assert_eq!(forward.total_revenue(), permuted.total_revenue());
        prop_assert_eq!(forward.first_order(), permuted.first_order());
        prop_assert_eq!(forward.last_order(), permuted.last_order());
        prop_assert_eq!(forward.unit_costs().median(), permuted.unit_costs().median());
        for region in ["North", "South", "East", "West"] {
            prop_assert_eq!(forward.regions().count_of(region), permuted.regions().count_of(region));
        }

        let report = forward.finalize().unwrap();
        prop_assert!(report.days_between_orders() >= 0);
        prop_assert!(report.first_order() <= report.last_order());
    }

    #[test]
    fn ties_go_to_first_seen_region(
        extra in 0usize..20,
        interleave in prop::collection::vec(any::<bool>(), 0..20),
    ) {
        let when = reference_time() - Duration::days(1);
        let sale = |region: &str| SaleRecord::new(region, Decimal::ONE, when, Decimal::ONE);

        let mut agg = SalesAggregator::with_reference_time(reference_time());
        agg.accept(&sale("First")).unwrap();
        agg.accept(&sale("Second")).unwrap();

        // Keep both regions level, in whatever order
        for _ in 0..extra {
            agg.accept(&sale("Second")).unwrap();
            agg.accept(&sale("First")).unwrap();
        }
        for second_first in interleave {
            let (a, b) = if second_first { ("Second", "First") } else { ("First", "Second") };
            agg.accept(&sale(a)).unwrap();
            agg.accept(&sale(b)).unwrap();
        }

        prop_assert_eq!(agg.regions().most_frequent(), Some("First"));
        let report = agg.finalize().unwrap();
        prop_assert_eq!(report.most_common_region(), "First");
    }

    #[test]
    fn single_date_has_zero_span(count in 1usize..20, days_ago in 0i64..1000) {
        let when = reference_time() - Duration::days(days_ago);
        let mut agg = SalesAggregator::with_reference_time(reference_time());
        for i in 0..count {
            agg.accept(&SaleRecord::new("North", Decimal::from(i + 1), when, Decimal::ZERO))
                .unwrap();
        }

        prop_assert_eq!(agg.days_between(), 0);
    }
}
