use serde::{Deserialize, Deserializer, Serialize};

/// Truth row as exported by the flight log, before any validation.
///
/// Field names follow the drone log CSV header; every value is kept as text so
/// that a bad cell becomes a per-record error rather than a failed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TruthRecord {
    #[serde(rename = "datetime(utc)", alias = "datetime", deserialize_with = "text_or_number")]
    pub datetime: Option<String>,
    #[serde(rename = "time(millisecond)", alias = "offset_ms", deserialize_with = "text_or_number")]
    pub offset_ms: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub latitude: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub longitude: Option<String>,
    #[serde(
        rename = "altitude_above_seaLevel(meters)",
        alias = "altitude",
        deserialize_with = "text_or_number"
    )]
    pub altitude: Option<String>,
}

/// Sensor detection row. Position is either a WKT point or separate columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorRecord {
    #[serde(rename = "ObjectID", alias = "object_id", deserialize_with = "text_or_number")]
    pub object_id: Option<String>,
    #[serde(rename = "DatasourceID", alias = "datasource_id", deserialize_with = "text_or_number")]
    pub datasource_id: Option<String>,
    #[serde(rename = "Received", alias = "received", deserialize_with = "text_or_number")]
    pub received: Option<String>,
    #[serde(rename = "GeoPosition", alias = "geo_position", deserialize_with = "text_or_number")]
    pub geo_position: Option<String>,
    #[serde(rename = "Latitude", alias = "latitude", deserialize_with = "text_or_number")]
    pub latitude: Option<String>,
    #[serde(rename = "Longitude", alias = "longitude", deserialize_with = "text_or_number")]
    pub longitude: Option<String>,
    #[serde(rename = "Altitude", alias = "altitude", deserialize_with = "text_or_number")]
    pub altitude: Option<String>,
}

impl SensorRecord {
    /// `object/datasource` identifiers for log lines, when either is present.
    pub fn source_label(&self) -> Option<String> {
        match (cell(&self.object_id), cell(&self.datasource_id)) {
            (None, None) => None,
            (object, source) => Some(format!(
                "object {} from {}",
                object.unwrap_or("?"),
                source.unwrap_or("?")
            )),
        }
    }
}

/// Accepts a cell as text, number or bool and keeps it as text.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
    }

    let cell = Option::<Cell>::deserialize(deserializer)?;
    Ok(cell.map(|cell| match cell {
        Cell::Bool(value) => value.to_string(),
        Cell::Int(value) => value.to_string(),
        Cell::Float(value) => value.to_string(),
        Cell::Text(value) => value,
    }))
}

/// Returns the trimmed cell, or `None` when it is missing or blank.
pub(crate) fn cell(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_label_names_object_and_datasource() {
        let record = SensorRecord {
            object_id: Some(" 17 ".into()),
            datasource_id: Some("radar-2".into()),
            ..Default::default()
        };
        assert_eq!(record.source_label().as_deref(), Some("object 17 from radar-2"));

        let partial = SensorRecord {
            datasource_id: Some("radar-2".into()),
            ..Default::default()
        };
        assert_eq!(partial.source_label().as_deref(), Some("object ? from radar-2"));
        assert_eq!(SensorRecord::default().source_label(), None);
    }
}
