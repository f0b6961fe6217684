use crate::error::Result;
use crate::logger::{log, set_min_severity, LogSeverity};
use crate::protocol::framing::DEFAULT_MAX_FRAME_SIZE;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Codec settings, read from a JSON file. Every key is optional.
///
/// ```json
/// {
///     "log_level": "debug",
///     "block_states_path": "data/block_states.json",
///     "item_id_map_path": "data/item_id_map.json",
///     "max_frame_size": 2097152
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    pub log_level: LogSeverity,
    /// Block state list used for the default block table
    pub block_states_path: Option<PathBuf>,
    /// Item name to legacy id map used for the default item table
    pub item_id_map_path: Option<PathBuf>,
    pub max_frame_size: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            log_level: LogSeverity::Info,
            block_states_path: None,
            item_id_map_path: None,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl ProtocolConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_json_str(&fs::read_to_string(path)?)?;
        log(
            format!("Loaded protocol config from {}", path.display()),
            LogSeverity::Debug,
        );
        Ok(config)
    }

    /// Makes `log_level` the logger's minimum severity.
    pub fn apply_logging(&self) {
        set_min_severity(self.log_level);
    }
}
