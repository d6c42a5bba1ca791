use std::f64::consts::PI;
use std::fmt;
use std::fmt::Formatter;
use chrono::{DateTime, Datelike, TimeZone};
use solar_positioning::{spa, RefractionCorrection, time::DeltaT};

// Observer elevation above sea level used for all sites [m]
const ELEVATION: f64 = 0.0;

/// Returns the solar altitude in degrees above the horizon for the given
/// coordinates and instant. Negative below the horizon.
///
/// # Arguments
///
/// * 'lat' - latitude in degrees, positive north
/// * 'lon' - longitude in degrees, positive east
/// * 'when' - the instant to compute for, any timezone
pub fn solar_altitude<T: TimeZone>(lat: f64, lon: f64, when: DateTime<T>) -> Result<f64, SolarError> {
    let delta_t = DeltaT::estimate_from_date_like(when.clone())?;
    let position = spa::solar_position(
        when,
        lat,
        lon,
        ELEVATION,
        delta_t,
        Some(RefractionCorrection::standard()),
    )?;

    Ok(position.elevation_angle())
}

/// Returns the direct-beam irradiance in W/m² for the given coordinates and
/// instant, or exactly zero while the sun is at or below the horizon
///
/// # Arguments
///
/// * 'lat' - latitude in degrees, positive north
/// * 'lon' - longitude in degrees, positive east
/// * 'when' - the instant to compute for, any timezone
pub fn irradiance<T: TimeZone>(lat: f64, lon: f64, when: DateTime<T>) -> Result<f64, SolarError> {
    let altitude = solar_altitude(lat, lon, when.clone())?;
    if altitude > 0.0 {
        Ok(radiation_direct(when.naive_utc().ordinal(), altitude))
    } else {
        Ok(0.0)
    }
}

/// The Masters clear-sky model for direct-beam radiation reaching the ground.
///
/// Apparent extraterrestrial flux and atmospheric optical depth both follow a
/// yearly sine, and the flux is attenuated by the air mass the beam crosses
/// at the given solar altitude.
///
/// # Arguments
///
/// * 'day_of_year' - ordinal day in UTC, 1 based
/// * 'altitude_deg' - solar altitude in degrees, must be above zero
fn radiation_direct(day_of_year: u32, altitude_deg: f64) -> f64 {
    let day = day_of_year as f64;
    let flux = 1160.0 + 75.0 * (2.0 * PI / 365.0 * (day - 275.0)).sin();
    let optical_depth = 0.174 + 0.035 * (2.0 * PI / 365.0 * (day - 100.0)).sin();
    let air_mass = 1.0 / altitude_deg.to_radians().sin();

    flux * (-optical_depth * air_mass).exp()
}

#[derive(Debug)]
pub struct SolarError(pub String);
impl fmt::Display for SolarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "SolarError: {}", self.0)
    }
}
impl From<solar_positioning::Error> for SolarError {
    fn from(e: solar_positioning::Error) -> Self { SolarError(e.to_string()) }
}
