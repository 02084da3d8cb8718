use crate::config::{keys, ConfigResolver, Environment, Settings};
use crate::executor::{Dispatcher, Method, RequestDescriptor};

pub const PROBE_TIMEOUT_MS: u64 = 10_000;

const SECRET_PREFIX_CHARS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStatus {
    pub key: &'static str,
    /// `None` when the key is unset.
    pub display: Option<String>,
}

/// Presence of every configuration key. Credentials are shortened to their
/// first few characters.
pub fn describe_settings(settings: &Settings) -> Vec<KeyStatus> {
    keys::ALL
        .iter()
        .map(|&key| KeyStatus {
            key,
            display: settings.value(key).map(|value| {
                if is_secret(key) {
                    let prefix: String = value.chars().take(SECRET_PREFIX_CHARS).collect();
                    format!("{prefix}...")
                } else {
                    value.to_string()
                }
            }),
        })
        .collect()
}

fn is_secret(key: &str) -> bool {
    key.ends_with("_X_API_KEY") || key.ends_with("_TOKEN")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    NotConfigured,
    Responded { status: u16, duration_ms: u64 },
    Unreachable(String),
}

#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub environment: Environment,
    pub base_url: Option<String>,
    pub outcome: ProbeOutcome,
}

/// Sends a HEAD request to the base URL of each selected environment.
pub async fn probe_environments(
    resolver: &ConfigResolver<'_>,
    dispatcher: &Dispatcher,
) -> Vec<ProbeResult> {
    let mut results = Vec::new();
    for environment in resolver.environments() {
        let profile = resolver.resolve(environment);
        let outcome = match &profile.base_url {
            None => ProbeOutcome::NotConfigured,
            Some(base_url) => {
                let request =
                    RequestDescriptor::new(Method::Head, base_url.as_str()).timeout_ms(PROBE_TIMEOUT_MS);
                match dispatcher.dispatch(&request).await {
                    Ok(response) => ProbeOutcome::Responded {
                        status: response.status,
                        duration_ms: response.duration_ms,
                    },
                    Err(err) => {
                        tracing::debug!(%environment, "probe failed: {}", err.detailed());
                        ProbeOutcome::Unreachable(err.to_string())
                    }
                }
            }
        };
        results.push(ProbeResult {
            environment,
            base_url: profile.base_url,
            outcome,
        });
    }
    results
}
