use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "missive.config.json";

/// Missive configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Template file, relative to the config directory
    #[serde(default = "default_template")]
    pub template: String,

    /// Variables offered for insertion and blanked for previews
    #[serde(default = "default_var_names")]
    pub var_names: Vec<String>,
}

fn default_template() -> String {
    "template.json".to_string()
}

fn default_var_names() -> Vec<String> {
    ["firstname", "lastname", "company", "position"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Template path, unless overridden on the command line
    pub fn template_path(&self, cwd: &Path, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => cwd.join(path),
            None => cwd.join(&self.template),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: default_template(),
            var_names: default_var_names(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "template": "messages/intro.json",
            "varNames": ["name", "team"]
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.template, "messages/intro.json");
        assert_eq!(config.var_names, vec!["name", "team"]);
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.template, "template.json");
        assert_eq!(config.var_names.len(), 4);
    }

    #[test]
    fn test_missing_config_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(
            config.template_path(dir.path(), None),
            dir.path().join("template.json")
        );
        assert_eq!(
            config.template_path(dir.path(), Some(Path::new("other.json"))),
            dir.path().join("other.json")
        );
    }
}
