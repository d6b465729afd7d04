//! Basic authentication.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     secret mount path → credentials.rs (read + normalise) → Vec<BasicAuthCredentials>
//!
//! Per request:
//!     Authorization header → basic.rs (decode, compare) → inner handler | 401
//! ```

pub mod basic;
pub mod credentials;

pub use basic::basic_auth;
pub use credentials::{BasicAuthCredentials, CredentialsError, ReadBasicAuth, ReadBasicAuthFromDisk};
