mod dispatcher;
mod error;
mod models;
mod writer;

pub use dispatcher::Dispatcher;
pub use error::TransportError;
pub use models::{
    Headers, Method, QueryParams, RequestDescriptor, ResponseBody, ResponseDescriptor,
    DEFAULT_TIMEOUT_MS,
};
pub use writer::{create_preview, ArtifactLabel, ArtifactWriter};
