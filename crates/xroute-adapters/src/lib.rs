pub mod chain_rest;
pub mod config;
mod http;
pub mod registry;
pub mod routing_service;

pub use chain_rest::{CosmosRestClient, RestConnector};
pub use config::{ConfigError, XrouteConfig, DEFAULT_CLIENT_ID};
pub use registry::{bundled_registry, load_registry};
pub use routing_service::RoutingServiceClient;
