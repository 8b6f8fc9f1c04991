//! Request helpers.
//!
//! - [`client_ip`] - Client address extraction for rate limiting

pub mod client_ip;
