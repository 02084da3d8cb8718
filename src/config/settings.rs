use crate::env::EnvMap;

/// Names of the process-wide configuration keys the suite reads.
pub mod keys {
    pub const TEST_ENV: &str = "TEST_ENV";
    pub const STAGING_BASE_URL: &str = "STAGING_BASE_URL";
    pub const STAGING_X_API_KEY: &str = "STAGING_X_API_KEY";
    pub const STAGING_TOKEN: &str = "STAGING_TOKEN";
    pub const PROD_BASE_URL: &str = "PROD_BASE_URL";
    pub const PROD_X_API_KEY: &str = "PROD_X_API_KEY";
    pub const PROD_TOKEN: &str = "PROD_TOKEN";
    pub const ENGINE: &str = "ENGINE";
    pub const LANGUAGE: &str = "LANGUAGE";
    pub const NUM_COPIES: &str = "NUM_COPIES";

    pub const ALL: [&str; 10] = [
        TEST_ENV,
        STAGING_BASE_URL,
        STAGING_X_API_KEY,
        STAGING_TOKEN,
        PROD_BASE_URL,
        PROD_X_API_KEY,
        PROD_TOKEN,
        ENGINE,
        LANGUAGE,
        NUM_COPIES,
    ];
}

/// Connection parameters for one deployment, each independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub token: Option<String>,
}

/// Snapshot of process-wide configuration, captured once at the start of a run.
///
/// Nothing downstream reads the process environment again; every component
/// receives this struct (or values resolved from it).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub test_env: Option<String>,
    pub staging: Credentials,
    pub production: Credentials,
    pub engine: Option<String>,
    pub language: Option<String>,
    pub num_copies: Option<String>,
}

impl Settings {
    pub fn from_map(vars: &EnvMap) -> Self {
        Self {
            test_env: lookup(vars, keys::TEST_ENV),
            staging: Credentials {
                base_url: lookup(vars, keys::STAGING_BASE_URL),
                api_key: lookup(vars, keys::STAGING_X_API_KEY),
                token: lookup(vars, keys::STAGING_TOKEN),
            },
            production: Credentials {
                base_url: lookup(vars, keys::PROD_BASE_URL),
                api_key: lookup(vars, keys::PROD_X_API_KEY),
                token: lookup(vars, keys::PROD_TOKEN),
            },
            engine: lookup(vars, keys::ENGINE),
            language: lookup(vars, keys::LANGUAGE),
            num_copies: lookup(vars, keys::NUM_COPIES),
        }
    }

    /// Replaces the environment selector, e.g. from a command-line flag.
    pub fn with_test_env(mut self, test_env: Option<String>) -> Self {
        if test_env.is_some() {
            self.test_env = test_env;
        }
        self
    }

    /// Raw value of a configuration key, used for diagnostics output.
    pub fn value(&self, key: &str) -> Option<&str> {
        let value = match key {
            keys::TEST_ENV => &self.test_env,
            keys::STAGING_BASE_URL => &self.staging.base_url,
            keys::STAGING_X_API_KEY => &self.staging.api_key,
            keys::STAGING_TOKEN => &self.staging.token,
            keys::PROD_BASE_URL => &self.production.base_url,
            keys::PROD_X_API_KEY => &self.production.api_key,
            keys::PROD_TOKEN => &self.production.token,
            keys::ENGINE => &self.engine,
            keys::LANGUAGE => &self.language,
            keys::NUM_COPIES => &self.num_copies,
            _ => return None,
        };
        value.as_deref()
    }
}

// Blank values count as unset.
fn lookup(vars: &EnvMap, key: &str) -> Option<String> {
    vars.get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
