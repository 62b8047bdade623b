/// Production GraphQL endpoint used when `POLECAT_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://api.polecat.com/graphql";

#[derive(Clone)]
pub struct AppConfig {
    pub api_token: String,
    pub api_url: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub page_size: u32,
    pub max_retry_wait_secs: u64,
    pub max_retries: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_token", &"[redacted]")
            .field("api_url", &self.api_url)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("page_size", &self.page_size)
            .field("max_retry_wait_secs", &self.max_retry_wait_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}
