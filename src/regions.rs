use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

use crate::error::{AggregateError, RegionTableError};

/// Pseudo-region the feed uses for cases not yet attributed to a state.
pub const UNASSIGNED: &str = "un";
/// Pseudo-region carrying the national total.
pub const TOTAL: &str = "tt";

const INDIA: [(&str, &str); 39] = [
    ("ap", "Andhra Pradesh"),
    ("ar", "Arunachal Pradesh"),
    ("as", "Assam"),
    ("br", "Bihar"),
    ("ct", "Chhattisgarh"),
    ("ga", "Goa"),
    ("gj", "Gujarat"),
    ("hr", "Haryana"),
    ("hp", "Himachal Pradesh"),
    ("jh", "Jharkhand"),
    ("ka", "Karnataka"),
    ("kl", "Kerala"),
    ("mp", "Madhya Pradesh"),
    ("mh", "Maharashtra"),
    ("mn", "Manipur"),
    ("ml", "Meghalaya"),
    ("mz", "Mizoram"),
    ("nl", "Nagaland"),
    ("or", "Odisha"),
    ("pb", "Punjab"),
    ("rj", "Rajasthan"),
    ("sk", "Sikkim"),
    ("tn", "Tamil Nadu"),
    ("tg", "Telangana"),
    ("tr", "Tripura"),
    (TOTAL, "Total"),
    (UNASSIGNED, "Unassigned"),
    ("ut", "Uttarakhand"),
    ("up", "Uttar Pradesh"),
    ("wb", "West Bengal"),
    ("an", "Andaman and Nicobar Islands"),
    ("ch", "Chandigarh"),
    ("dn", "Dadra and Nagar Haveli"),
    ("dd", "Daman and Diu"),
    ("dl", "Delhi"),
    ("jk", "Jammu and Kashmir"),
    ("la", "Ladakh"),
    ("ld", "Lakshadweep"),
    ("py", "Puducherry"),
];

/// Validated mapping from feed region codes to display names.
#[derive(Debug, Clone)]
pub struct RegionTable {
    names: HashMap<String, String>,
}

impl RegionTable {
    /// Builds a table, rejecting empty codes, empty names and repeated codes.
    pub fn new<I, C, N>(entries: I) -> Result<Self, RegionTableError>
    where
        I: IntoIterator<Item = (C, N)>,
        C: Into<String>,
        N: Into<String>,
    {
        let mut names = HashMap::new();

        for (index, (code, name)) in entries.into_iter().enumerate() {
            let code = code.into().trim().to_lowercase();
            let name = name.into().trim().to_string();

            if code.is_empty() {
                return Err(RegionTableError::EmptyCode { index });
            }
            if name.is_empty() {
                return Err(RegionTableError::EmptyName(code));
            }
            if names.contains_key(&code) {
                return Err(RegionTableError::DuplicateCode(code));
            }
            names.insert(code, name);
        }

        Ok(Self { names })
    }

    /// The states, union territories and pseudo-regions of the Indian state-wise feed.
    pub fn india() -> Self {
        let names = INDIA
            .iter()
            .map(|(code, name)| (code.to_string(), name.to_string()))
            .collect();
        Self { names }
    }

    /// Loads a `code,name` CSV (with header row).
    pub fn load_csv(path: &Path) -> anyhow::Result<Self> {
        #[derive(serde::Deserialize)]
        struct CsvRow {
            code: String,
            name: String,
        }

        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open region table {}", path.display()))?;
        let mut entries = Vec::new();

        for result in reader.deserialize::<CsvRow>() {
            let row = result?;
            entries.push((row.code, row.name));
        }

        let table = Self::new(entries)
            .with_context(|| format!("invalid region table {}", path.display()))?;
        tracing::debug!(regions = table.len(), path = %path.display(), "loaded region table");
        Ok(table)
    }

    pub fn name(&self, code: &str) -> Result<&str, AggregateError> {
        self.names
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| AggregateError::UnknownRegion(code.to_string()))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.names.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::india()
    }
}
