use std::collections::HashSet;
use std::fmt;
use std::fmt::Formatter;
use std::str::FromStr;
use chrono_tz::Tz;
use serde::Deserialize;

/// Raw entity record as it appears in the configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub timezone: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Registry section of the configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub plants: Vec<EntityRecord>,
    #[serde(default)]
    pub inverters: Vec<EntityRecord>,
    #[serde(default)]
    pub states: Vec<EntityRecord>,
}

/// A validated entity with its timezone resolved
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub timezone: Tz,
    pub parent_id: Option<String>,
}

/// Read-only registry of all known entities, built once at startup
#[derive(Debug, Clone)]
pub struct Registry {
    pub plants: Vec<Entity>,
    pub inverters: Vec<Entity>,
    pub states: Vec<Entity>,
}

impl Registry {
    /// Validates the raw registry configuration and resolves timezones.
    /// Any malformed record fails the whole load, there is no per-query
    /// validation later on.
    ///
    /// # Arguments
    ///
    /// * 'config' - raw registry records from the configuration file
    pub fn from_config(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let plants = validate(&config.plants, None)?;

        let plant_ids = plants.iter().map(|p| p.id.as_str()).collect::<HashSet<&str>>();
        let inverters = validate(&config.inverters, Some(&plant_ids))?;
        let states = validate(&config.states, None)?;

        Ok(Self { plants, inverters, states })
    }

    /// Returns the plants matching an optional id filter, in registry order
    ///
    /// # Arguments
    ///
    /// * 'plant_id' - optional plant filter, None selects all plants
    pub fn plants_matching(&self, plant_id: Option<&str>) -> Vec<&Entity> {
        self.plants.iter()
            .filter(|p| plant_id.map_or(true, |id| p.id == id))
            .collect()
    }

    /// Returns the inverters matching optional plant and inverter id filters,
    /// in registry order
    ///
    /// # Arguments
    ///
    /// * 'plant_id' - optional owning plant filter
    /// * 'inverter_id' - optional inverter filter
    pub fn inverters_matching(&self, plant_id: Option<&str>, inverter_id: Option<&str>) -> Vec<&Entity> {
        self.inverters.iter()
            .filter(|i| plant_id.map_or(true, |id| i.parent_id.as_deref() == Some(id)))
            .filter(|i| inverter_id.map_or(true, |id| i.id == id))
            .collect()
    }
}

/// Validates one collection of raw records
///
/// # Arguments
///
/// * 'records' - raw records to validate
/// * 'parents' - ids the records may reference as parent, if any
fn validate(records: &[EntityRecord], parents: Option<&HashSet<&str>>) -> Result<Vec<Entity>, RegistryError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut result: Vec<Entity> = Vec::with_capacity(records.len());

    for record in records {
        if !seen.insert(&record.id) {
            return Err(RegistryError::DuplicateId(record.id.clone()));
        }
        if !record.lat.is_finite() || record.lat < -90.0 || record.lat > 90.0 {
            return Err(RegistryError::Coordinate(format!("{}: lat {}", record.id, record.lat)));
        }
        if !record.lon.is_finite() || record.lon < -180.0 || record.lon > 180.0 {
            return Err(RegistryError::Coordinate(format!("{}: lon {}", record.id, record.lon)));
        }
        let timezone = Tz::from_str(&record.timezone)
            .map_err(|_| RegistryError::Timezone(format!("{}: {}", record.id, record.timezone)))?;

        if let Some(parent_id) = &record.parent_id {
            match parents {
                Some(ids) if ids.contains(parent_id.as_str()) => (),
                _ => return Err(RegistryError::UnknownParent(format!("{}: {}", record.id, parent_id))),
            }
        }

        result.push(Entity {
            id: record.id.clone(),
            lat: record.lat,
            lon: record.lon,
            timezone,
            parent_id: record.parent_id.clone(),
        });
    }

    Ok(result)
}

#[derive(Debug)]
pub enum RegistryError {
    Coordinate(String),
    Timezone(String),
    DuplicateId(String),
    UnknownParent(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            RegistryError::Coordinate(e)    => write!(f, "RegistryError::Coordinate: {}", e),
            RegistryError::Timezone(e)      => write!(f, "RegistryError::Timezone: {}", e),
            RegistryError::DuplicateId(e)   => write!(f, "RegistryError::DuplicateId: {}", e),
            RegistryError::UnknownParent(e) => write!(f, "RegistryError::UnknownParent: {}", e),
        }
    }
}
