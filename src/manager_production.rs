use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use crate::manager_solar::SolarError;
use crate::models::SeriesPoint;
use crate::registry::Entity;

/// How the tick sequence for a series is anchored
#[derive(Debug, Clone, Copy)]
pub enum GenerationMode {
    /// Last-24h style view: ticks run backwards from the reference instant,
    /// newest first
    Rolling(DateTime<Utc>),
    /// A user-selected calendar day: ticks run forward from midnight UTC
    HistoricalDay(NaiveDate),
}

/// One entity's generated time series, in generation order until
/// [`into_ascending`] has been applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySeries {
    pub id: String,
    pub points: Vec<SeriesPoint>,
}

/// Generates one time series per entity over the given window.
///
/// Each tick is converted into the entity's local timezone before the value
/// function sees it; the stored timestamps stay UTC instants. The number of
/// points per entity is exactly floor(window/step). Any value function error
/// aborts the whole generation, no partial series are returned.
///
/// # Arguments
///
/// * 'entities' - entities to generate for, output keeps this order
/// * 'mode' - rolling last-24h or a fixed historical day
/// * 'window' - total span to cover
/// * 'step' - sampling step
/// * 'value_fn' - evaluated per entity and local tick time
pub fn generate<F>(
    entities: &[&Entity],
    mode: GenerationMode,
    window: TimeDelta,
    step: TimeDelta,
    mut value_fn: F,
) -> Result<Vec<EntitySeries>, SolarError>
where
    F: FnMut(&Entity, DateTime<Tz>) -> Result<f64, SolarError>,
{
    let ticks = (window.num_seconds() / step.num_seconds()) as usize;

    let mut result = entities.iter()
        .map(|e| EntitySeries { id: e.id.clone(), points: Vec::with_capacity(ticks) })
        .collect::<Vec<EntitySeries>>();

    for k in 0..ticks {
        let time_point = match mode {
            GenerationMode::Rolling(reference) => reference - step * k as i32,
            GenerationMode::HistoricalDay(date) => {
                date.and_time(NaiveTime::MIN).and_utc() + step * k as i32
            }
        };

        for (entity, series) in entities.iter().copied().zip(result.iter_mut()) {
            let local_time = time_point.with_timezone(&entity.timezone);
            let value = value_fn(entity, local_time)?;
            series.points.push(SeriesPoint { x: time_point, y: value });
        }
    }

    Ok(result)
}

/// Reorders generated series into ascending time, the required step before
/// display or any aggregation that assumes chronological order
///
/// # Arguments
///
/// * 'series' - generated series in raw generation order
pub fn into_ascending(mut series: Vec<EntitySeries>) -> Vec<EntitySeries> {
    for s in &mut series {
        if s.points.len() > 1 && s.points[0].x > s.points[1].x {
            s.points.reverse();
        }
    }

    series
}

/// Inverter output power for a given irradiance
///
/// # Arguments
///
/// * 'irradiance' - direct irradiance in W/m²
/// * 'efficiency' - conversion efficiency, a plant-wide constant
pub fn performance(irradiance: f64, efficiency: f64) -> f64 {
    irradiance * efficiency
}

/// Randomly degrades performance samples to model equipment problems.
///
/// Faults are uncorrelated across entities and across time points. The
/// original system drew from an unseeded source; the optional seed is a
/// deliberate deviation so behavior is reproducible under test.
pub struct FaultInjector {
    rng: StdRng,
    probability: f64,
}

impl FaultInjector {
    /// Returns a new instance of the FaultInjector
    ///
    /// # Arguments
    ///
    /// * 'probability' - chance per sample of a fault
    /// * 'seed' - optional fixed seed, None draws from entropy
    pub fn new(probability: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self { rng, probability }
    }

    /// With the configured probability, scales the value by a uniform factor
    /// in [0.5, 0.9); otherwise returns it unchanged
    ///
    /// # Arguments
    ///
    /// * 'value' - the performance sample to maybe degrade
    pub fn maybe_degrade(&mut self, value: f64) -> f64 {
        if self.rng.gen::<f64>() < self.probability {
            value * self.rng.gen_range(0.5..0.9)
        } else {
            value
        }
    }
}

/// Splits an inverter's series evenly across its logical sub-units.
///
/// Sub-unit ids combine the parent id with a 1-based index, and each
/// sub-series is the parent divided elementwise by the sub-unit count.
///
/// # Arguments
///
/// * 'parent' - the inverter series to split
/// * 'subunit_count' - number of sub-units per inverter
pub fn expand_subunits(parent: &EntitySeries, subunit_count: usize) -> Vec<EntitySeries> {
    (1..=subunit_count)
        .map(|index| EntitySeries {
            id: format!("{}_SB{}", parent.id, index),
            points: parent.points.iter()
                .map(|p| SeriesPoint { x: p.x, y: p.y / subunit_count as f64 })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, TimeZone};
    use crate::manager_solar::irradiance;

    fn entity(id: &str, lat: f64, lon: f64, timezone: Tz) -> Entity {
        Entity { id: id.to_string(), lat, lon, timezone, parent_id: None }
    }

    #[test]
    fn rolling_series_has_exact_length_and_descending_raw_order() {
        let plant = entity("Usina 1", -23.5505, -46.6333, chrono_tz::America::Sao_Paulo);
        let reference = Utc.with_ymd_and_hms(2024, 6, 21, 15, 0, 0).unwrap();

        let series = generate(
            &[&plant],
            GenerationMode::Rolling(reference),
            TimeDelta::hours(24),
            TimeDelta::minutes(5),
            |_, _| Ok(1.0),
        ).unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points.len(), 288);
        assert_eq!(series[0].points[0].x, reference);
        assert!(series[0].points[0].x > series[0].points[1].x);

        let ascending = into_ascending(series);
        let points = &ascending[0].points;
        assert!(points.windows(2).all(|w| w[0].x < w[1].x));
        assert_eq!(points[points.len() - 1].x, reference);
    }

    #[test]
    fn historical_series_starts_at_midnight_and_stays_ascending() {
        let plant = entity("Usina 2", -15.7942, -47.8822, chrono_tz::America::Sao_Paulo);
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();

        let series = generate(
            &[&plant],
            GenerationMode::HistoricalDay(date),
            TimeDelta::hours(24),
            TimeDelta::hours(1),
            |_, _| Ok(1.0),
        ).unwrap();

        assert_eq!(series[0].points.len(), 24);
        assert_eq!(series[0].points[0].x, Utc.with_ymd_and_hms(2024, 6, 21, 0, 0, 0).unwrap());

        let ascending = into_ascending(series);
        assert!(ascending[0].points.windows(2).all(|w| w[0].x < w[1].x));
    }

    #[test]
    fn value_fn_sees_entity_local_time() {
        let plant = entity("Usina 3", -3.1190, -60.0217, chrono_tz::America::Manaus);
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();

        let series = generate(
            &[&plant],
            GenerationMode::HistoricalDay(date),
            TimeDelta::hours(2),
            TimeDelta::hours(1),
            |_, local| {
                // Manaus is UTC-4 year round
                Ok(f64::from(local.offset().fix().local_minus_utc()))
            },
        ).unwrap();

        assert_eq!(series[0].points[0].y, -4.0 * 3600.0);
    }

    #[test]
    fn performance_is_linear_in_irradiance() {
        assert_eq!(performance(0.0, 0.20), 0.0);
        assert_eq!(performance(850.0, 0.20), 170.0);
        assert_eq!(performance(850.0, 0.0), 0.0);
        assert_eq!(performance(850.0, 1.0), 850.0);
    }

    #[test]
    fn fault_injector_degrades_about_five_percent_within_bounds() {
        let mut injector = FaultInjector::new(0.05, Some(42));
        let original = 100.0;
        let trials = 100_000;

        let mut degraded = 0usize;
        for _ in 0..trials {
            let value = injector.maybe_degrade(original);
            if value != original {
                degraded += 1;
                assert!(value >= 0.5 * original && value < 0.9 * original);
            }
        }

        let rate = degraded as f64 / trials as f64;
        assert!(rate > 0.04 && rate < 0.06, "degradation rate {} out of bounds", rate);
    }

    #[test]
    fn fault_injector_is_reproducible_with_a_seed() {
        let mut a = FaultInjector::new(0.05, Some(7));
        let mut b = FaultInjector::new(0.05, Some(7));

        for _ in 0..1000 {
            assert_eq!(a.maybe_degrade(123.4), b.maybe_degrade(123.4));
        }
    }

    #[test]
    fn subunit_expansion_sums_back_to_parent() {
        let reference = Utc.with_ymd_and_hms(2024, 6, 21, 15, 0, 0).unwrap();
        let parent = EntitySeries {
            id: "331".to_string(),
            points: (0..10)
                .map(|i| SeriesPoint { x: reference + TimeDelta::minutes(5 * i), y: 17.3 * i as f64 })
                .collect(),
        };

        let subunits = expand_subunits(&parent, 6);
        assert_eq!(subunits.len(), 6);
        assert_eq!(subunits[0].id, "331_SB1");
        assert_eq!(subunits[5].id, "331_SB6");

        for (i, point) in parent.points.iter().enumerate() {
            let sum: f64 = subunits.iter().map(|s| s.points[i].y).sum();
            assert!((sum - point.y).abs() < 1e-9);
            assert_eq!(subunits[0].points[i].x, point.x);
        }
    }

    #[test]
    fn polar_night_sites_generate_all_zero_series() {
        // Fixed instant where São Paulo is in daylight while both arctic
        // sites sit in polar night for the whole 24h window
        let reference = Utc.with_ymd_and_hms(2024, 12, 21, 12, 0, 0).unwrap();
        let day_site = entity("Usina 1", -23.5505, -46.6333, chrono_tz::America::Sao_Paulo);
        let night_a = entity("Longyearbyen", 78.2232, 15.6267, chrono_tz::Arctic::Longyearbyen);
        let night_b = entity("Alert", 82.5018, -62.3481, chrono_tz::UTC);

        let series = generate(
            &[&day_site, &night_a, &night_b],
            GenerationMode::Rolling(reference),
            TimeDelta::hours(24),
            TimeDelta::hours(1),
            |e, local| irradiance(e.lat, e.lon, local),
        ).unwrap();
        let series = into_ascending(series);

        assert_eq!(series[0].points.len(), 24);
        assert!(series[0].points.iter().any(|p| p.y > 0.0));
        assert!(series[1].points.iter().all(|p| p.y == 0.0));
        assert!(series[2].points.iter().all(|p| p.y == 0.0));
    }
}
