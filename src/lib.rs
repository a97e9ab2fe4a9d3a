//! story-relay: streams hosted AI stories and images to the browser.
//!
//! - [`request`]: pulls the prompt out of a JSON body or query string
//! - [`relay`]: forwards prompts upstream and relays the results
//! - [`provider`]: the outbound inference capability
//! - [`routes`]: HTTP surface

pub mod config;
pub mod error;
pub mod provider;
pub mod relay;
pub mod request;
pub mod routes;

pub use error::{RelayError, UpstreamInferenceError};
pub use provider::InferenceProvider;
pub use relay::Relay;
pub use routes::build_router;
