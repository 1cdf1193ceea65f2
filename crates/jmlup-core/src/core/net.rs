use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

pub(crate) const USER_AGENT: &str = concat!("jmlup/", env!("CARGO_PKG_VERSION"));
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Decide whether jmlup should honor standard proxy environment variables.
///
/// Behavior:
/// - `JMLUP_KEEP_PROXIES=1/true/yes/on` forces proxies on.
/// - `JMLUP_KEEP_PROXIES=0/false/no/off/""` forces proxies off.
/// - If unset, proxies are enabled only when at least one proxy env var is set.
pub(crate) fn keep_proxies() -> bool {
    match env::var("JMLUP_KEEP_PROXIES") {
        Ok(raw) => {
            let value = raw.trim().to_ascii_lowercase();
            !matches!(value.as_str(), "" | "0" | "false" | "no" | "off")
        }
        Err(_) => PROXY_KEYS.iter().any(|key| {
            env::var(key)
                .ok()
                .is_some_and(|value| !value.trim().is_empty())
        }),
    }
}

const PROXY_KEYS: &[&str] = &[
    "HTTP_PROXY",
    "http_proxy",
    "HTTPS_PROXY",
    "https_proxy",
    "ALL_PROXY",
    "all_proxy",
    "NO_PROXY",
    "no_proxy",
];

pub(crate) fn build_http_client() -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(HTTP_TIMEOUT);
    if !keep_proxies() {
        builder = builder.no_proxy();
    }
    builder.build().context("failed to build http client")
}
