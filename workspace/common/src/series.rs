use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

/// A single daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PricePoint {
    /// Trading day
    pub date: NaiveDate,
    /// Closing price for that day
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

#[derive(Deserialize)]
struct RawPriceSeries {
    points: Vec<PricePoint>,
}

impl From<RawPriceSeries> for PriceSeries {
    fn from(raw: RawPriceSeries) -> Self {
        PriceSeries::new(raw.points)
    }
}

/// Daily closing prices, ascending by date with at most one point per date.
///
/// The ordering invariant is established on construction and the series
/// cannot be mutated afterwards, so consumers can rely on it without
/// re-checking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(from = "RawPriceSeries")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series from unordered quotes.
    ///
    /// Points are sorted by date. When a date appears more than once the last
    /// quote for it wins, which is what quote feeds do when they re-send the
    /// in-progress session.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        // Stable sort keeps the feed order between duplicates
        points.sort_by_key(|p| p.date);

        let mut normalized: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match normalized.last_mut() {
                Some(last) if last.date == point.date => {
                    warn!(date = %point.date, "Duplicate quote date, keeping the latest value");
                    *last = point;
                }
                _ => normalized.push(point),
            }
        }

        Self { points: normalized }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Date range covered by the series, `None` when empty.
    pub fn date_range(&self) -> Option<DateRange> {
        Some(DateRange::new(self.first_date()?, self.last_date()?))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }

    /// Returns the sub-series whose dates fall into `range`.
    pub fn within(&self, range: DateRange) -> PriceSeries {
        Self {
            points: self
                .points
                .iter()
                .filter(|p| range.contains(p.date))
                .copied()
                .collect(),
        }
    }
}

impl FromIterator<PricePoint> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        PriceSeries::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_sorts_points() {
        let series = PriceSeries::new(vec![
            PricePoint::new(date(2024, 6, 12), 82.0),
            PricePoint::new(date(2024, 6, 10), 80.0),
            PricePoint::new(date(2024, 6, 11), 81.0),
        ]);

        let dates: Vec<_> = series.dates().collect();
        assert_eq!(dates, vec![date(2024, 6, 10), date(2024, 6, 11), date(2024, 6, 12)]);
        assert_eq!(series.first_date(), Some(date(2024, 6, 10)));
        assert_eq!(series.last_date(), Some(date(2024, 6, 12)));
    }

    #[test]
    fn test_new_keeps_last_duplicate() {
        let series = PriceSeries::new(vec![
            PricePoint::new(date(2024, 6, 10), 80.0),
            PricePoint::new(date(2024, 6, 11), 81.0),
            PricePoint::new(date(2024, 6, 11), 81.5),
        ]);

        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[1].close, 81.5);
    }

    #[test]
    fn test_empty_series() {
        let series = PriceSeries::empty();
        assert!(series.is_empty());
        assert_eq!(series.date_range(), None);
    }

    #[test]
    fn test_within_filters_inclusive_range() {
        let series: PriceSeries = (10..=14)
            .map(|d| PricePoint::new(date(2024, 6, d), d as f64))
            .collect();

        let sub = series.within(DateRange::new(date(2024, 6, 11), date(2024, 6, 13)));
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.first_date(), Some(date(2024, 6, 11)));
        assert_eq!(sub.last_date(), Some(date(2024, 6, 13)));
    }

    #[test]
    fn test_deserialize_normalizes() {
        let json = r#"{"points":[{"date":"2024-06-11","close":2.0},{"date":"2024-06-10","close":1.0}]}"#;
        let series: PriceSeries = serde_json::from_str(json).unwrap();
        assert_eq!(series.first_date(), Some(date(2024, 6, 10)));
        assert_eq!(series.len(), 2);
    }
}
