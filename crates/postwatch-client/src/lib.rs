//! postwatch-client: HTTP client for the collector API
//!
//! Used by the agent to submit reports and by the CLI to run the
//! latest-state queries.

pub mod error;
pub mod http;

pub use error::{ClientError, Result};
pub use http::CollectorClient;
