use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::types::{NormalizedSale, WeeklyCell};

/// Weeks of history the estimator sees per SKU.
pub const RECENT_WEEKS: usize = 26;

/// Monday of the ISO week containing the timestamp, date only.
pub fn week_start_of(timestamp: DateTime<Utc>) -> NaiveDate {
    let date = timestamp.date_naive();
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Per-SKU weekly totals for one aggregation pass.
///
/// The fold is additive, associative and commutative: any permutation of
/// the input, and any shard-and-merge partition of it, produces identical
/// totals.
#[derive(Debug, Default, PartialEq)]
pub struct WeeklyLedger {
    cells: BTreeMap<String, BTreeMap<NaiveDate, WeeklyCell>>,
}

impl WeeklyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sale: &NormalizedSale) {
        let cell = self
            .cells
            .entry(sale.sku.clone())
            .or_default()
            .entry(week_start_of(sale.timestamp))
            .or_default();
        cell.units += sale.units;
        cell.revenue += sale.revenue;
    }

    /// Combine a ledger built over another shard of the same input.
    pub fn merge(&mut self, other: WeeklyLedger) {
        for (sku, weeks) in other.cells {
            let target = self.cells.entry(sku).or_default();
            for (week, cell) in weeks {
                let entry = target.entry(week).or_default();
                entry.units += cell.units;
                entry.revenue += cell.revenue;
            }
        }
    }

    pub fn sku_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, sku: &str, week_start: NaiveDate) -> Option<&WeeklyCell> {
        self.cells.get(sku)?.get(&week_start)
    }

    /// Weekly units per SKU, week-ascending, truncated to the most recent
    /// [`RECENT_WEEKS`] buckets.
    pub fn recent_series(&self) -> impl Iterator<Item = (&str, Vec<f64>)> + '_ {
        self.cells.iter().map(|(sku, weeks)| {
            let skip = weeks.len().saturating_sub(RECENT_WEEKS);
            let series: Vec<f64> = weeks.values().skip(skip).map(|cell| cell.units).collect();
            (sku.as_str(), series)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sale(sku: &str, timestamp: DateTime<Utc>, units: f64, revenue: f64) -> NormalizedSale {
        NormalizedSale {
            sku: sku.to_string(),
            timestamp,
            units,
            revenue,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn week_start_truncates_to_monday() {
        // 2025-06-11 is a Wednesday.
        assert_eq!(
            week_start_of(at(2025, 6, 11, 15)),
            NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()
        );
        // A Monday maps to itself regardless of time of day.
        assert_eq!(
            week_start_of(at(2025, 6, 9, 23)),
            NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()
        );
        // A Sunday still belongs to the week begun the previous Monday.
        assert_eq!(
            week_start_of(at(2025, 6, 15, 0)),
            NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()
        );
    }

    #[test]
    fn accumulates_same_week_sales_into_one_cell() {
        let mut ledger = WeeklyLedger::new();
        ledger.add(&sale("A1", at(2025, 6, 9, 10), 2.0, 100.0));
        ledger.add(&sale("A1", at(2025, 6, 12, 18), 3.0, 150.0));
        ledger.add(&sale("A1", at(2025, 6, 16, 9), 1.0, 50.0));

        let monday = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        let cell = ledger.cell("A1", monday).unwrap();
        assert_eq!(cell.units, 5.0);
        assert_eq!(cell.revenue, 250.0);

        let next_monday = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        assert_eq!(ledger.cell("A1", next_monday).unwrap().units, 1.0);
    }

    #[test]
    fn zero_valued_sale_still_creates_its_cell() {
        let mut ledger = WeeklyLedger::new();
        ledger.add(&sale("A1", at(2025, 6, 9, 10), 0.0, 0.0));

        let monday = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        let cell = ledger.cell("A1", monday).unwrap();
        assert_eq!(cell.units, 0.0);
        assert_eq!(cell.revenue, 0.0);
    }

    #[test]
    fn totals_are_order_independent() {
        let sales = vec![
            sale("A1", at(2025, 6, 9, 10), 2.0, 100.0),
            sale("B2", at(2025, 6, 10, 11), 4.0, 80.0),
            sale("A1", at(2025, 6, 12, 18), 3.0, 150.0),
            sale("A1", at(2025, 6, 17, 9), 1.0, 50.0),
            sale("B2", at(2025, 6, 18, 12), 6.0, 120.0),
        ];

        let mut forward = WeeklyLedger::new();
        for s in &sales {
            forward.add(s);
        }

        let mut reversed = WeeklyLedger::new();
        for s in sales.iter().rev() {
            reversed.add(s);
        }

        let mut interleaved = WeeklyLedger::new();
        for s in sales.iter().skip(2).chain(sales.iter().take(2)) {
            interleaved.add(s);
        }

        assert_eq!(forward, reversed);
        assert_eq!(forward, interleaved);
    }

    #[test]
    fn merge_matches_single_pass_fold() {
        let sales = vec![
            sale("A1", at(2025, 6, 9, 10), 2.0, 100.0),
            sale("A1", at(2025, 6, 12, 18), 3.0, 150.0),
            sale("B2", at(2025, 6, 10, 11), 4.0, 80.0),
            sale("B2", at(2025, 6, 18, 12), 6.0, 120.0),
        ];

        let mut single = WeeklyLedger::new();
        for s in &sales {
            single.add(s);
        }

        let (left, right) = sales.split_at(3);
        let mut shard_a = WeeklyLedger::new();
        for s in left {
            shard_a.add(s);
        }
        let mut shard_b = WeeklyLedger::new();
        for s in right {
            shard_b.add(s);
        }
        shard_a.merge(shard_b);

        assert_eq!(single, shard_a);
    }

    #[test]
    fn recent_series_keeps_only_the_latest_weeks() {
        let mut ledger = WeeklyLedger::new();
        let first_monday = at(2024, 1, 1, 12); // a Monday
        for week in 0..30 {
            let ts = first_monday + Duration::weeks(week);
            ledger.add(&sale("A1", ts, week as f64, 0.0));
        }

        let (sku, series) = ledger.recent_series().next().unwrap();
        assert_eq!(sku, "A1");
        assert_eq!(series.len(), RECENT_WEEKS);
        // The four oldest buckets fall off the front.
        assert_eq!(series[0], 4.0);
        assert_eq!(*series.last().unwrap(), 29.0);
    }

    #[test]
    fn series_stays_ascending_even_when_added_backwards() {
        let mut ledger = WeeklyLedger::new();
        let first_monday = at(2025, 3, 3, 12); // a Monday
        for week in (0..4).rev() {
            let ts = first_monday + Duration::weeks(week);
            ledger.add(&sale("A1", ts, week as f64, 0.0));
        }

        let (_, series) = ledger.recent_series().next().unwrap();
        assert_eq!(series, vec![0.0, 1.0, 2.0, 3.0]);
    }
}
