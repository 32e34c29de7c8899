//! Award search: filter building, request payload and HTTP client.

pub mod client;
pub mod filters;
pub mod request;

pub use client::{QueryClient, QueryClientConfig};
pub use filters::{prompt_filters, FilterInput};
pub use request::SearchRequest;
