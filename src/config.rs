use std::path::PathBuf;
use std::time::Duration;

/// The browsing profile every target page sees. Functional detail, not
/// decision logic: the values only have to be consistent across a run.
#[derive(Debug, Clone)]
pub struct BrowserProfile {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub user_agent: String,
    pub locale: String,
    pub timezone: String,
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self {
            viewport_width: 1366,
            viewport_height: 768,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/113.0.0.0 Safari/537.36"
                .to_string(),
            locale: "en-US".to_string(),
            timezone: "Asia/Jakarta".to_string(),
        }
    }
}

/// Everything a run needs, passed explicitly at run start.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Root under which each session creates its own artifact directory.
    pub artifact_root: PathBuf,
    /// Prefix for artifact URIs handed back to callers.
    pub public_base_url: String,
    /// Upper bound on initial page navigation.
    pub navigation_timeout: Duration,
    /// Fixed grace period after navigation for client-side rendering.
    pub settle_delay: Duration,
    /// Default wait for `wait` and `assert-url` when the step carries no
    /// usable timeout of its own.
    pub action_timeout: Duration,
    pub profile: BrowserProfile,
    /// Explicit Chrome binary; autodetected when unset.
    pub chrome_path: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            artifact_root: PathBuf::from("public/screenshots"),
            public_base_url: "/screenshots".to_string(),
            navigation_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_secs(5),
            action_timeout: Duration::from_millis(5000),
            profile: BrowserProfile::default(),
            chrome_path: None,
        }
    }
}

impl RunnerConfig {
    pub fn builder() -> RunnerConfigBuilder {
        RunnerConfigBuilder::new()
    }

    /// Configuration for the server binary, taken from the environment.
    pub fn from_env() -> Self {
        let mut builder = Self::builder();
        if let Ok(root) = std::env::var("ARTIFACT_ROOT") {
            builder = builder.artifact_root(root);
        }
        if let Ok(base) = std::env::var("PUBLIC_BASE_URL") {
            builder = builder.public_base_url(base);
        }
        if let Ok(path) = std::env::var("CHROME_PATH") {
            builder = builder.chrome_path(path);
        }
        builder.build()
    }
}

pub struct RunnerConfigBuilder {
    config: RunnerConfig,
}

impl RunnerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RunnerConfig::default(),
        }
    }

    pub fn artifact_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.artifact_root = root.into();
        self
    }

    pub fn public_base_url(mut self, base: impl Into<String>) -> Self {
        self.config.public_base_url = base.into();
        self
    }

    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.config.navigation_timeout = timeout;
        self
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay = delay;
        self
    }

    pub fn action_timeout(mut self, timeout: Duration) -> Self {
        self.config.action_timeout = timeout;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.profile.viewport_width = width;
        self.config.profile.viewport_height = height;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.profile.user_agent = user_agent.into();
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.config.profile.locale = locale.into();
        self
    }

    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.config.profile.timezone = timezone.into();
        self
    }

    pub fn chrome_path(mut self, path: impl Into<String>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    pub fn build(self) -> RunnerConfig {
        self.config
    }
}

impl Default for RunnerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP front-door settings, read from the environment by the binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3004,
            allowed_origins: vec!["http://localhost:3001".to_string()],
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect::<Vec<_>>()
            })
            .ok()
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.allowed_origins);
        Self {
            port,
            allowed_origins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_profile() {
        let config = RunnerConfig::default();
        assert_eq!(config.navigation_timeout, Duration::from_secs(30));
        assert_eq!(config.settle_delay, Duration::from_secs(5));
        assert_eq!(config.action_timeout, Duration::from_millis(5000));
        assert_eq!(config.profile.viewport_width, 1366);
        assert_eq!(config.profile.viewport_height, 768);
        assert_eq!(config.profile.locale, "en-US");
    }

    #[test]
    fn builder_overrides_stick() {
        let config = RunnerConfig::builder()
            .artifact_root("/tmp/shots")
            .public_base_url("https://cdn.example.com/shots")
            .viewport(800, 600)
            .timezone("UTC")
            .action_timeout(Duration::from_millis(250))
            .build();
        assert_eq!(config.artifact_root, PathBuf::from("/tmp/shots"));
        assert_eq!(config.public_base_url, "https://cdn.example.com/shots");
        assert_eq!(config.profile.viewport_width, 800);
        assert_eq!(config.profile.timezone, "UTC");
        assert_eq!(config.action_timeout, Duration::from_millis(250));
    }
}
