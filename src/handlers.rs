use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::{NaiveDate, TimeDelta, Utc};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use crate::AppState;
use crate::cache::{read_cache_data, store_cache_data};
use crate::manager_annotations::errors::AppendError;
use crate::manager_annotations::AnnotationRecord;
use crate::manager_production::{
    expand_subunits, generate, into_ascending, performance,
    EntitySeries, FaultInjector, GenerationMode,
};
use crate::manager_solar::{irradiance, SolarError};
use crate::manager_summary::{means, rank, totals, Ranking};
use crate::models::{AggregateRecord, Series};

// Slice size for the state ranking view
const RANK_K: usize = 10;

const IRRADIANCE_CACHE_PREFIX: &str = "irr";
const STATES_CACHE_PREFIX: &str = "states";

#[derive(Deserialize)]
struct IrradianceParams {
    pub plant: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct PerformanceParams {
    pub plant: Option<String>,
    pub inverter: Option<String>,
}

#[derive(Deserialize)]
struct StatesParams {
    pub date: Option<NaiveDate>,
}

/// Per-plant irradiance over 24 hours, hourly. Rolling from now, or the
/// selected calendar day when a date is given
#[get("/irradiance")]
pub async fn get_irradiance(data: web::Data<AppState>, params: web::Query<IrradianceParams>) -> impl Responder {
    #[derive(Serialize)]
    struct WebData {
        series: Vec<Series>,
        totals: Vec<AggregateRecord>,
    }

    let series = match params.date {
        Some(date) => match plant_day_series(&data, date).await {
            Ok(all) => all.into_iter()
                .filter(|s| params.plant.as_deref().map_or(true, |id| s.id == id))
                .collect(),
            Err(e) => return internal_error(e),
        },
        None => {
            let plants = data.registry.plants_matching(params.plant.as_deref());
            match generate(
                &plants,
                GenerationMode::Rolling(Utc::now()),
                TimeDelta::hours(24),
                TimeDelta::hours(1),
                |e, local| irradiance(e.lat, e.lon, local),
            ) {
                Ok(series) => series,
                Err(e) => return internal_error(e),
            }
        }
    };

    let series = into_ascending(series);
    let totals = totals(&series);

    HttpResponse::Ok().json(WebData { series: to_chart(series, "line"), totals })
}

/// Per-inverter simulated performance over the last 24 hours at 5 minute
/// steps, with totals and the per-sub-unit split
#[get("/performance")]
pub async fn get_performance(data: web::Data<AppState>, params: web::Query<PerformanceParams>) -> impl Responder {
    #[derive(Serialize)]
    struct WebData {
        inverter_series: Vec<Series>,
        inverter_totals: Vec<AggregateRecord>,
        subunit_series: Vec<Series>,
        subunit_totals: Vec<AggregateRecord>,
    }

    let inverters = data.registry.inverters_matching(
        params.plant.as_deref(),
        params.inverter.as_deref(),
    );

    let efficiency = data.config.production.efficiency;
    let mut injector = FaultInjector::new(data.config.production.fault_probability, None);

    let series = match generate(
        &inverters,
        GenerationMode::Rolling(Utc::now()),
        TimeDelta::hours(24),
        TimeDelta::minutes(5),
        |e, local| {
            let irradiance = irradiance(e.lat, e.lon, local)?;
            Ok(injector.maybe_degrade(performance(irradiance, efficiency)))
        },
    ) {
        Ok(series) => series,
        Err(e) => return internal_error(e),
    };

    let series = into_ascending(series);
    let inverter_totals = totals(&series);

    let subunit_count = data.config.production.subunit_count;
    let subunits = series.iter()
        .flat_map(|s| expand_subunits(s, subunit_count))
        .collect::<Vec<EntitySeries>>();
    let subunit_totals = totals(&subunits);

    HttpResponse::Ok().json(WebData {
        inverter_series: to_chart(series, "line"),
        inverter_totals,
        subunit_series: to_chart(subunits, "line"),
        subunit_totals,
    })
}

/// Mean hourly irradiance per state over 24 hours, ranked into the ten best
/// and ten worst
#[get("/states")]
pub async fn get_states(data: web::Data<AppState>, params: web::Query<StatesParams>) -> impl Responder {
    #[derive(Serialize)]
    struct WebData {
        means: Vec<AggregateRecord>,
        ranking: Ranking,
    }

    let series = match params.date {
        Some(date) => match state_day_series(&data, date).await {
            Ok(series) => series,
            Err(e) => return internal_error(e),
        },
        None => {
            let states = data.registry.states.iter().collect::<Vec<_>>();
            match generate(
                &states,
                GenerationMode::Rolling(Utc::now()),
                TimeDelta::hours(24),
                TimeDelta::hours(1),
                |e, local| irradiance(e.lat, e.lon, local),
            ) {
                Ok(series) => series,
                Err(e) => return internal_error(e),
            }
        }
    };

    let series = into_ascending(series);
    let means = means(&series);
    let ranking = rank(means.clone(), RANK_K);

    HttpResponse::Ok().json(WebData { means, ranking })
}

/// Appends one annotation record to the configured sheet
#[post("/annotation")]
pub async fn post_annotation(data: web::Data<AppState>, record: web::Json<AnnotationRecord>) -> impl Responder {
    match data.annotations.append(&record).await {
        Ok(()) => HttpResponse::Ok().body("saved"),
        Err(e) => {
            error!("annotation append failed: {}", e);
            match e {
                AppendError::NotConfigured(_) => HttpResponse::ServiceUnavailable().body(e.to_string()),
                AppendError::RemoteRejected(_) => HttpResponse::BadGateway().body(e.to_string()),
                AppendError::IoFailure(_) => HttpResponse::InternalServerError().body(e.to_string()),
            }
        }
    }
}

/// Day irradiance for all plants, read through the day cache. Historical
/// days are deterministic so the computed series can be reused as-is
///
/// # Arguments
///
/// * 'data' - application state
/// * 'date' - the selected calendar day
async fn plant_day_series(data: &AppState, date: NaiveDate) -> Result<Vec<EntitySeries>, SolarError> {
    let cache_dir = &data.config.files.cache_dir;
    if let Ok(Some(cached)) = read_cache_data(cache_dir, IRRADIANCE_CACHE_PREFIX, date).await {
        return Ok(cached);
    }

    let plants = data.registry.plants_matching(None);
    let series = generate(
        &plants,
        GenerationMode::HistoricalDay(date),
        TimeDelta::hours(24),
        TimeDelta::hours(1),
        |e, local| irradiance(e.lat, e.lon, local),
    )?;

    if let Err(e) = store_cache_data(cache_dir, IRRADIANCE_CACHE_PREFIX, date, &series).await {
        warn!("unable to cache day series: {}", e);
    }

    Ok(series)
}

/// Day irradiance for all states, read through the day cache
///
/// # Arguments
///
/// * 'data' - application state
/// * 'date' - the selected calendar day
async fn state_day_series(data: &AppState, date: NaiveDate) -> Result<Vec<EntitySeries>, SolarError> {
    let cache_dir = &data.config.files.cache_dir;
    if let Ok(Some(cached)) = read_cache_data(cache_dir, STATES_CACHE_PREFIX, date).await {
        return Ok(cached);
    }

    let states = data.registry.states.iter().collect::<Vec<_>>();
    let series = generate(
        &states,
        GenerationMode::HistoricalDay(date),
        TimeDelta::hours(24),
        TimeDelta::hours(1),
        |e, local| irradiance(e.lat, e.lon, local),
    )?;

    if let Err(e) = store_cache_data(cache_dir, STATES_CACHE_PREFIX, date, &series).await {
        warn!("unable to cache day series: {}", e);
    }

    Ok(series)
}

/// Maps a computation failure to a diagnostic 500. The computation path is
/// total for a valid registry so this only fires on solar model failures
fn internal_error(e: SolarError) -> HttpResponse {
    error!("computation failed: {}", e);
    HttpResponse::InternalServerError().body(e.to_string())
}

/// Shapes entity series into the named series the chart library expects
fn to_chart(series: Vec<EntitySeries>, chart_type: &str) -> Vec<Series> {
    series.into_iter()
        .map(|s| Series { name: s.id, chart_type: chart_type.to_string(), data: s.points })
        .collect()
}
