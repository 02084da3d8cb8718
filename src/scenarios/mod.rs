mod catalog;
pub mod fixtures;
mod model;

pub use catalog::{catalog, find_endpoint};
pub use model::{
    BodyShape, Endpoint, Expectation, Intent, Mutation, Outcome, Scenario, UnknownIntent,
};
