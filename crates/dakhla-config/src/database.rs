//! Database location configuration.

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    ".dakhla/dakhla.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the libSQL database file, or `:memory:` for an ephemeral store.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_into_project_dir() {
        assert_eq!(DatabaseConfig::default().path, ".dakhla/dakhla.db");
    }
}
