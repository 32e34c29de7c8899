//! Natural-language questions about a finished report.

pub mod client;
pub mod session;

pub use client::{connect, GenerationSettings, Provider};
pub use session::QuerySession;
