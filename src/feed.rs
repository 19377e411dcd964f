use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::error::FeedError;
use crate::models::{RawDailyRecord, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    /// `{"states_daily": [{"date": .., "status": .., "<code>": "<count>", ..}]}`
    StatesDailyJson,
    /// Flat `date,status,region,count` rows with a header.
    RecordsCsv,
}

impl FeedFormat {
    pub fn from_path(path: &Path) -> Result<Self, FeedError> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(Self::StatesDailyJson),
            Some("csv") => Ok(Self::RecordsCsv),
            _ => Err(FeedError::UnknownFormat(path.display().to_string())),
        }
    }
}

pub fn load_feed(path: &Path, format: Option<FeedFormat>) -> Result<Vec<RawDailyRecord>, FeedError> {
    let format = match format {
        Some(format) => format,
        None => FeedFormat::from_path(path)?,
    };

    let records = match format {
        FeedFormat::StatesDailyJson => {
            let raw = std::fs::read_to_string(path)?;
            decode_states_daily(&raw)?
        }
        FeedFormat::RecordsCsv => decode_records_csv(std::fs::File::open(path)?)?,
    };

    tracing::info!(
        path = %path.display(),
        ?format,
        records = records.len(),
        "decoded feed"
    );
    Ok(records)
}

/// Unpivots the per-day, per-status region columns into one record per region.
pub fn decode_states_daily(raw: &str) -> Result<Vec<RawDailyRecord>, FeedError> {
    #[derive(serde::Deserialize)]
    struct StatesDaily {
        states_daily: Vec<serde_json::Map<String, Value>>,
    }

    let feed: StatesDaily = serde_json::from_str(raw)?;
    let mut records = Vec::new();

    for (index, entry) in feed.states_daily.iter().enumerate() {
        let date = string_field(entry, index, "date")?;
        let status = parse_status(string_field(entry, index, "status")?)?;

        for (region, value) in entry {
            if region == "date" || region == "status" {
                continue;
            }

            let count = match value {
                Value::String(count) => count.clone(),
                Value::Number(count) => count.to_string(),
                Value::Null => String::new(),
                _ => {
                    return Err(FeedError::InvalidValue {
                        index,
                        field: region.clone(),
                    })
                }
            };

            records.push(RawDailyRecord::new(date, status, region.as_str(), count));
        }
    }

    Ok(records)
}

pub fn decode_records_csv<R: Read>(reader: R) -> Result<Vec<RawDailyRecord>, FeedError> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        date: String,
        status: String,
        region: String,
        #[serde(default)]
        count: String,
    }

    let mut reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let status = parse_status(&row.status)?;
        records.push(RawDailyRecord::new(row.date, status, row.region, row.count));
    }

    Ok(records)
}

fn string_field<'a>(
    entry: &'a serde_json::Map<String, Value>,
    index: usize,
    field: &'static str,
) -> Result<&'a str, FeedError> {
    match entry.get(field) {
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(_) => Err(FeedError::InvalidValue {
            index,
            field: field.to_string(),
        }),
        None => Err(FeedError::MissingField { index, field }),
    }
}

fn parse_status(value: &str) -> Result<Status, FeedError> {
    value.parse().map_err(FeedError::UnknownStatus)
}
