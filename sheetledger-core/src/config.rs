//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "import": { "headerScanRows": 10, "batchSize": 100 },
//!   "synonyms": {
//!     "payment": { "account": ["Acct"] },
//!     "income": { "payment_method": ["Paid via"] }
//!   }
//! }
//! ```
//! Keys this crate does not manage are kept when saving.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::schema::DEFAULT_HEADER_SCAN_ROWS;
use crate::domain::{Field, ImportSchema, RecordKind};
use crate::services::delivery::DEFAULT_BATCH_SIZE;

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    import: ImportSettings,
    #[serde(default)]
    synonyms: SynonymSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    header_scan_rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    batch_size: Option<usize>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Synonyms keyed by field name; keys are checked on load so one typo
/// does not discard the rest of the file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SynonymSettings {
    #[serde(default)]
    payment: HashMap<String, Vec<String>>,
    #[serde(default)]
    income: HashMap<String, Vec<String>>,
}

fn parse_field(key: &str) -> Option<Field> {
    serde_json::from_value(serde_json::Value::String(key.to_string())).ok()
}

fn known_synonyms(
    kind: RecordKind,
    raw: &HashMap<String, Vec<String>>,
) -> HashMap<Field, Vec<String>> {
    raw.iter()
        .filter_map(|(key, synonyms)| match parse_field(key) {
            Some(field) => Some((field, synonyms.clone())),
            None => {
                warn!(kind = %kind, key = %key, "ignoring synonyms for unknown field");
                None
            }
        })
        .collect()
}

/// Replace the field entries of `raw`, keeping keys that are not fields
fn merge_synonyms(raw: &mut HashMap<String, Vec<String>>, configured: HashMap<Field, Vec<String>>) {
    raw.retain(|key, _| parse_field(key).is_none());
    raw.extend(
        configured
            .into_iter()
            .map(|(field, synonyms)| (field.as_str().to_string(), synonyms)),
    );
}

/// Effective configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub header_scan_rows: usize,
    pub batch_size: usize,
    /// Extra header synonyms per kind, appended after the built-in ones
    pub extra_synonyms: HashMap<RecordKind, HashMap<Field, Vec<String>>>,
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            header_scan_rows: DEFAULT_HEADER_SCAN_ROWS,
            batch_size: DEFAULT_BATCH_SIZE,
            extra_synonyms: HashMap::new(),
            _raw_settings: SettingsFile::default(),
        }
    }
}

/// Data directory: `$SHEETLEDGER_DIR`, else `~/.sheetledger`
pub fn default_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SHEETLEDGER_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".sheetledger"))
        .ok_or_else(|| anyhow!("Could not find home directory"))
}

fn env_usize(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            warn!(variable = name, value = %raw, "ignoring invalid override");
            None
        }
    }
}

fn read_settings(path: &Path) -> Result<SettingsFile> {
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "malformed settings, using defaults");
        SettingsFile::default()
    }))
}

impl Config {
    /// Load config from the data directory
    ///
    /// `SHEETLEDGER_HEADER_SCAN_ROWS` and `SHEETLEDGER_BATCH_SIZE` override
    /// the file.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(&data_dir.join(SETTINGS_FILE))?;

        let header_scan_rows = env_usize("SHEETLEDGER_HEADER_SCAN_ROWS")
            .or(raw.import.header_scan_rows.filter(|n| *n > 0))
            .unwrap_or(DEFAULT_HEADER_SCAN_ROWS);
        let batch_size = env_usize("SHEETLEDGER_BATCH_SIZE")
            .or(raw.import.batch_size.filter(|n| *n > 0))
            .unwrap_or(DEFAULT_BATCH_SIZE);

        let mut extra_synonyms = HashMap::new();
        extra_synonyms.insert(
            RecordKind::Payment,
            known_synonyms(RecordKind::Payment, &raw.synonyms.payment),
        );
        extra_synonyms.insert(
            RecordKind::Income,
            known_synonyms(RecordKind::Income, &raw.synonyms.income),
        );

        Ok(Self {
            header_scan_rows,
            batch_size,
            extra_synonyms,
            _raw_settings: raw,
        })
    }

    /// Save config to the data directory, preserving unmanaged settings
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join(SETTINGS_FILE);
        let mut settings = read_settings(&settings_path)?;

        settings.import.header_scan_rows = Some(self.header_scan_rows);
        settings.import.batch_size = Some(self.batch_size);
        merge_synonyms(&mut settings.synonyms.payment, self.synonyms_for(RecordKind::Payment));
        merge_synonyms(&mut settings.synonyms.income, self.synonyms_for(RecordKind::Income));

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    fn synonyms_for(&self, kind: RecordKind) -> HashMap<Field, Vec<String>> {
        self.extra_synonyms.get(&kind).cloned().unwrap_or_default()
    }

    pub fn add_synonym(&mut self, kind: RecordKind, field: Field, synonym: impl Into<String>) {
        self.extra_synonyms
            .entry(kind)
            .or_default()
            .entry(field)
            .or_default()
            .push(synonym.into());
    }

    /// Built-in schema for `kind` extended with the configured synonyms
    pub fn schema_for(&self, kind: RecordKind) -> ImportSchema {
        let mut schema = ImportSchema::for_kind(kind);
        if let Some(extra) = self.extra_synonyms.get(&kind) {
            // Follow schema field order so header expectations stay stable
            let fields: Vec<Field> = schema.fields.iter().map(|spec| spec.field).collect();
            for field in fields {
                if let Some(synonyms) = extra.get(&field) {
                    schema.add_synonyms(field, synonyms);
                }
            }
        }
        schema
    }
}
