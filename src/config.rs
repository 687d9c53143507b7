use std::sync::OnceLock;

/// Seconds a resend control stays disabled after a code request.
pub const RESEND_COOLDOWN_SECS: u32 = 60;

/// Extra delay on the fail-safe completion timer. Guards against a throttled
/// interval (backgrounded tab) never delivering the final tick.
pub const COOLDOWN_FAILSAFE_MARGIN_MS: u32 = 250;

/// Route the registration and login flows land on.
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// Fallback route when the server omits a redirect.
pub const DEFAULT_ROUTE: &str = "/";

/// Security-settings page; email confirm/delete navigate here to reload it.
pub const SECURITY_SETTINGS_ROUTE: &str = "/settings/security";

static API_BASE_URL: OnceLock<String> = OnceLock::new();

/// Fix the API base URL for the lifetime of the app. First write wins;
/// later calls are ignored (same caching rule the runtime config loader
/// always had).
pub fn set_api_base_url(value: impl Into<String>) {
    let _ = API_BASE_URL.set(value.into());
}

/// Configured base URL, or the empty string for same-origin requests.
pub fn api_base_url() -> String {
    API_BASE_URL.get().cloned().unwrap_or_default()
}
