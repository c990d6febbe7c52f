//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Defaults applied by grid edits and the editor facade. Every field is
/// optional in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Width given to inserted columns when the caller passes none.
    pub default_col_width: u32,
    /// Height given to inserted rows whose template has none.
    pub default_row_height: Option<u32>,
    pub track_history: bool,
    /// Maximum number of undo steps kept; `0` keeps everything.
    pub history_limit: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { default_col_width: 80, default_row_height: None, track_history: true, history_limit: 100 }
    }
}

impl GridConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GridConfig::from_json(r#"{"default_col_width": 120}"#).unwrap();
        assert_eq!(config.default_col_width, 120);
        assert!(config.track_history);
        assert_eq!(config.history_limit, 100);
        assert_eq!(GridConfig::from_json("{}").unwrap(), GridConfig::default());
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(GridConfig::from_json(r#"{"history_limit": -1}"#).is_err());
    }
}
