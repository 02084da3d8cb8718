use std::collections::HashMap;

pub type EnvMap = HashMap<String, String>;

mod loader;

pub use loader::{capture_environment, load_env_file_sync, LoadedEnvironment};
