use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::executor::{Headers, QueryParams};

use super::settings::{Credentials, Settings};

pub const DEFAULT_ENGINE: &str = "premium";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_NUM_COPIES: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Staging,
    Production,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Staging, Environment::Production];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "staging" => Some(Environment::Staging),
            "production" => Some(Environment::Production),
            _ => None,
        }
    }

    /// Anything that is not a recognised name falls back to staging.
    pub fn parse_or_default(name: Option<&str>) -> Self {
        name.and_then(Self::parse).unwrap_or(Environment::Staging)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown environment {0:?} (expected staging or production)")]
pub struct UnknownEnvironment(pub String);

impl FromStr for Environment {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownEnvironment(s.to_string()))
    }
}

/// Connection parameters resolved for one environment.
///
/// Missing fields are not an error here; they surface later as a malformed
/// URL or a 401 from the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentProfile {
    pub name: Environment,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
}

impl EnvironmentProfile {
    pub fn endpoint_url(&self, path: &str) -> String {
        let base = self.base_url.as_deref().unwrap_or_default();
        format!("{}{}", base.trim_end_matches('/'), path)
    }

    /// Loggable view of the profile that never includes secret values.
    pub fn redacted(&self) -> String {
        format!(
            "{} base_url={} api_key={} token={}",
            self.name,
            self.base_url.as_deref().unwrap_or("<unset>"),
            presence(&self.api_key),
            presence(&self.bearer_token),
        )
    }
}

fn presence(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "Present"
    } else {
        "Missing"
    }
}

/// Maps environment selectors to concrete connection parameters.
#[derive(Debug, Clone, Copy)]
pub struct ConfigResolver<'a> {
    settings: &'a Settings,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    /// The environments a run should cover: the one whose name `TEST_ENV`
    /// matches exactly, or both otherwise.
    pub fn environments(&self) -> Vec<Environment> {
        let selector = self.settings.test_env.as_deref();
        match Environment::ALL
            .into_iter()
            .find(|env| selector == Some(env.as_str()))
        {
            Some(env) => vec![env],
            None => Environment::ALL.to_vec(),
        }
    }

    pub fn resolve(&self, env: Environment) -> EnvironmentProfile {
        let credentials: &Credentials = match env {
            Environment::Staging => &self.settings.staging,
            Environment::Production => &self.settings.production,
        };
        EnvironmentProfile {
            name: env,
            base_url: credentials.base_url.clone(),
            api_key: credentials.api_key.clone(),
            bearer_token: credentials.token.clone(),
        }
    }

    pub fn resolve_named(&self, name: Option<&str>) -> EnvironmentProfile {
        self.resolve(Environment::parse_or_default(name))
    }

    pub fn default_query_params(&self) -> QueryParams {
        let value = |configured: &Option<String>, fallback: &str| {
            configured.clone().unwrap_or_else(|| fallback.to_string())
        };
        QueryParams::from([
            (
                "engine".to_string(),
                value(&self.settings.engine, DEFAULT_ENGINE),
            ),
            (
                "language".to_string(),
                value(&self.settings.language, DEFAULT_LANGUAGE),
            ),
            (
                "num_copies".to_string(),
                value(&self.settings.num_copies, DEFAULT_NUM_COPIES),
            ),
        ])
    }
}

/// Header template sent with every request. Missing credentials are sent as
/// empty values so the remote API rejects them with 401.
pub fn standard_headers(profile: &EnvironmentProfile) -> Headers {
    Headers::from([
        (
            "X-API-KEY".to_string(),
            profile.api_key.clone().unwrap_or_default(),
        ),
        (
            "Authorization".to_string(),
            profile.bearer_token.clone().unwrap_or_default(),
        ),
        ("Content-Type".to_string(), "application/json".to_string()),
    ])
}
