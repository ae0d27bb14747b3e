use anyhow::{Context, Result};
use matchcore::ingest::{SensorRecord, TruthRecord};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub fn read_truth<R: Read>(reader: R) -> Result<Vec<TruthRecord>> {
    read_records(reader, "truth")
}

pub fn read_sensor<R: Read>(reader: R) -> Result<Vec<SensorRecord>> {
    read_records(reader, "sensor")
}

pub fn read_truth_file(path: &Path) -> Result<Vec<TruthRecord>> {
    let file = File::open(path).with_context(|| format!("opening truth file {}", path.display()))?;
    read_truth(file).with_context(|| format!("reading {}", path.display()))
}

pub fn read_sensor_file(path: &Path) -> Result<Vec<SensorRecord>> {
    let file =
        File::open(path).with_context(|| format!("opening sensor file {}", path.display()))?;
    read_sensor(file).with_context(|| format!("reading {}", path.display()))
}

/// Header-keyed rows; cells trimmed, short rows allowed (missing cells are absent).
fn read_records<T: DeserializeOwned, R: Read>(reader: R, label: &str) -> Result<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (row, record) in csv_reader.deserialize().enumerate() {
        let record: T = record.with_context(|| format!("decoding {} row {}", label, row + 1))?;
        records.push(record);
    }
    log::debug!("read {} {} rows", records.len(), label);
    Ok(records)
}
