use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::serialize_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    #[serde(with = "serialize_timestamp")]
    pub x: DateTime<Utc>,
    pub y: f64,
}

/// One named series in the shape the front-end chart library expects
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    pub name: String,
    #[serde(rename(serialize = "type"))]
    pub chart_type: String,
    pub data: Vec<SeriesPoint>,
}

/// A single scalar (sum or mean) summarizing one entity's series
#[derive(Debug, Clone, Serialize)]
pub struct AggregateRecord {
    pub id: String,
    pub value: f64,
}
