use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Remote catalog endpoints the pricing run reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    /// Outlet directory with coordinates and owning enterprise.
    pub branches_url: String,
    /// Current prices of the subject outlet (`code` + `idBranch` query).
    pub prices_url: String,
    /// Published prices of any outlet by serial number (`sn` query).
    pub competitor_prices_url: String,
    /// Queue of outlets waiting to be repriced.
    pub tasks_url: String,
    /// Removes processed outlets from the queue.
    pub tasks_delete_url: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub settings_path: PathBuf,
    pub save_path: PathBuf,
    pub api_auth: String,
    pub endpoints: ApiEndpoints,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_concurrent_fetches: usize,
    pub schedule_cron: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("settings_path", &self.settings_path)
            .field("save_path", &self.save_path)
            .field("api_auth", &"[redacted]")
            .field("endpoints", &self.endpoints)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_concurrent_fetches", &self.max_concurrent_fetches)
            .field("schedule_cron", &self.schedule_cron)
            .finish()
    }
}
