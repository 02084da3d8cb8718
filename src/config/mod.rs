mod resolver;
mod settings;

pub use resolver::{
    standard_headers, ConfigResolver, Environment, EnvironmentProfile, UnknownEnvironment,
    DEFAULT_ENGINE, DEFAULT_LANGUAGE, DEFAULT_NUM_COPIES,
};
pub use settings::{keys, Credentials, Settings};
