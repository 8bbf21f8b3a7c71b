use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    pub api: ApiSettings,
    #[serde(default)]
    pub people: PeopleSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PeopleSettings {
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

impl Default for PeopleSettings {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
        }
    }
}

fn default_per_page() -> usize {
    5
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ReportSettings {
    /// Currency id or name preselected when `--currency` is not given
    #[serde(default)]
    pub currency: Option<String>,
}
