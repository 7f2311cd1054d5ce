// Runtime settings for the concierge client.
// The backend origin is fixed for the lifetime of the process: it is read
// once at start (environment override or the published default) and then
// handed to `ApiClient`.

/// Origin the FastAPI backend listens on when started with its defaults.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Environment variable that overrides [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "CONCIERGE_API_URL";

/// Location used by the weather lookup when the user leaves it blank.
pub const DEFAULT_LOCATION: &str = "Napa Valley";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
}

impl Settings {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Settings {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Read `CONCIERGE_API_URL`, or fall back to `http://127.0.0.1:8000`.
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Settings::new(url.trim()),
            _ => Settings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let settings = Settings::new("http://localhost:9000/");
        assert_eq!(settings.base_url, "http://localhost:9000");
    }

    #[test]
    fn default_points_at_local_backend() {
        assert_eq!(Settings::default().base_url, DEFAULT_BASE_URL);
    }
}
