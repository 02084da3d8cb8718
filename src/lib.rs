pub mod config;
pub mod env;
pub mod executor;
pub mod scenarios;
pub mod suite;
