use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DictError;

pub const MAIN_DICT_FILE: &str = "main.dic";
pub const SURNAME_DICT_FILE: &str = "surname.dic";
pub const QUANTIFIER_DICT_FILE: &str = "quantifier.dic";
pub const SUFFIX_DICT_FILE: &str = "suffix.dic";
pub const PREPOSITION_DICT_FILE: &str = "preposition.dic";
pub const STOPWORD_DICT_FILE: &str = "stopword.dic";

/// Dictionary sources and refresh cadences.
///
/// `ext_dict` / `ext_stopwords` are `;`-delimited path lists resolved against
/// `dict_root`; directory entries expand recursively to their files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    pub dict_root: PathBuf,
    pub ext_dict: Option<String>,
    pub ext_stopwords: Option<String>,
    pub remote_ext_dict: Vec<String>,
    pub remote_ext_stopwords: Vec<String>,
    pub http_connect_timeout_secs: u64,
    pub http_read_timeout_secs: u64,
    pub remote_refresh_secs: u64,
    pub db: Option<DbConfig>,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            dict_root: PathBuf::from("."),
            ext_dict: None,
            ext_stopwords: None,
            remote_ext_dict: Vec::new(),
            remote_ext_stopwords: Vec::new(),
            http_connect_timeout_secs: 10,
            http_read_timeout_secs: 60,
            remote_refresh_secs: 60,
            db: None,
        }
    }
}

impl DictionaryConfig {
    /// Load a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self, DictError> {
        let data = std::fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn base_dict_path(&self, file: &str) -> PathBuf {
        self.dict_root.join(file)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.http_connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.http_read_timeout_secs)
    }

    pub fn remote_refresh_period(&self) -> Duration {
        Duration::from_secs(self.remote_refresh_secs.max(1))
    }

    pub fn has_remote_sources(&self) -> bool {
        !self.remote_ext_dict.is_empty() || !self.remote_ext_stopwords.is_empty()
    }
}

/// Incremental database channels. Each enabled channel queries
/// `SELECT <word_field> FROM <table>` against a table exposing a
/// timestamp-comparable `updatetime` column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// Connection URL; credentials travel inside the URL.
    pub url: String,
    #[serde(default)]
    pub ext_dict_table: String,
    #[serde(default)]
    pub stopword_table: String,
    pub word_field: String,
    #[serde(default)]
    pub enable_ext_dict: bool,
    #[serde(default)]
    pub enable_stopwords: bool,
    #[serde(default = "default_db_refresh_secs")]
    pub refresh_secs: u64,
}

impl DbConfig {
    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }
}

fn default_db_refresh_secs() -> u64 {
    1800
}
