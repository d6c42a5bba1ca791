use std::cmp::Ordering;
use crate::manager_production::EntitySeries;
use crate::models::AggregateRecord;

/// Sums each entity's series into one total, in input order.
///
/// The total is the raw sum of the power samples, reported as Wh without
/// scaling by the sample interval, matching the arithmetic of the original
/// system. Known simplification, not a physical energy integral.
///
/// # Arguments
///
/// * 'series' - one series per entity
pub fn totals(series: &[EntitySeries]) -> Vec<AggregateRecord> {
    series.iter()
        .map(|s| AggregateRecord {
            id: s.id.clone(),
            value: s.points.iter().map(|p| p.y).sum(),
        })
        .collect()
}

/// Arithmetic mean of each entity's series, in input order
///
/// # Arguments
///
/// * 'series' - one series per entity, each with at least one point
pub fn means(series: &[EntitySeries]) -> Vec<AggregateRecord> {
    series.iter()
        .map(|s| {
            let sum: f64 = s.points.iter().map(|p| p.y).sum();
            let count = s.points.len().max(1);
            AggregateRecord { id: s.id.clone(), value: sum / count as f64 }
        })
        .collect()
}

/// Top and bottom slices of a ranking by aggregate value
#[derive(Debug, Clone, serde::Serialize)]
pub struct Ranking {
    pub top: Vec<AggregateRecord>,
    pub bottom: Vec<AggregateRecord>,
}

/// Ranks aggregates descending by value, stable for ties, and returns the
/// best and worst k entries. The bottom slice is re-reversed so it reads
/// ascending by value for display
///
/// # Arguments
///
/// * 'aggregates' - aggregate records to rank
/// * 'k' - slice size for both ends
pub fn rank(mut aggregates: Vec<AggregateRecord>, k: usize) -> Ranking {
    aggregates.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));

    let top = aggregates.iter().take(k).cloned().collect::<Vec<AggregateRecord>>();

    let start = aggregates.len().saturating_sub(k);
    let mut bottom = aggregates[start..].to_vec();
    bottom.reverse();

    Ranking { top, bottom }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};
    use crate::models::SeriesPoint;

    fn series(id: &str, values: &[f64]) -> EntitySeries {
        let reference = Utc.with_ymd_and_hms(2024, 6, 21, 0, 0, 0).unwrap();
        EntitySeries {
            id: id.to_string(),
            points: values.iter().enumerate()
                .map(|(i, v)| SeriesPoint { x: reference + TimeDelta::hours(i as i64), y: *v })
                .collect(),
        }
    }

    #[test]
    fn totals_and_means_keep_input_order() {
        let input = vec![series("b", &[1.0, 2.0, 3.0]), series("a", &[4.0, 4.0])];

        let totals = totals(&input);
        assert_eq!(totals[0].id, "b");
        assert_eq!(totals[0].value, 6.0);
        assert_eq!(totals[1].value, 8.0);

        let means = means(&input);
        assert_eq!(means[0].value, 2.0);
        assert_eq!(means[1].value, 4.0);
    }

    #[test]
    fn totals_are_order_independent() {
        let forward = series("x", &[0.5, 1.25, 2.0, 3.75, 8.5]);
        let permuted = series("x", &[8.5, 2.0, 0.5, 3.75, 1.25]);

        let a = totals(&[forward])[0].value;
        let b = totals(&[permuted])[0].value;
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn ranking_slices_both_ends() {
        let aggregates = (1..=15)
            .map(|i| AggregateRecord { id: format!("state-{}", i), value: i as f64 })
            .collect::<Vec<AggregateRecord>>();

        let ranking = rank(aggregates, 10);

        assert_eq!(ranking.top.len(), 10);
        assert_eq!(ranking.top[0].value, 15.0);
        assert_eq!(ranking.top[9].value, 6.0);

        // Bottom slice reads ascending by value
        assert_eq!(ranking.bottom.len(), 10);
        assert_eq!(ranking.bottom[0].value, 1.0);
        assert_eq!(ranking.bottom[9].value, 10.0);
    }

    #[test]
    fn ranking_is_stable_for_ties() {
        let aggregates = vec![
            AggregateRecord { id: "first".to_string(), value: 5.0 },
            AggregateRecord { id: "second".to_string(), value: 5.0 },
            AggregateRecord { id: "third".to_string(), value: 9.0 },
        ];

        let ranking = rank(aggregates, 2);
        assert_eq!(ranking.top[0].id, "third");
        assert_eq!(ranking.top[1].id, "first");
    }

    #[test]
    fn ranking_handles_fewer_entries_than_k() {
        let aggregates = vec![AggregateRecord { id: "only".to_string(), value: 1.0 }];
        let ranking = rank(aggregates, 10);
        assert_eq!(ranking.top.len(), 1);
        assert_eq!(ranking.bottom.len(), 1);
    }
}
