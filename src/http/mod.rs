//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, routes)
//!     → proxy.rs (method gate, name, resolve, forward, relay)
//!         headers.rs (propagation, content type)
//!         response.rs (gateway-originated errors)
//!     → system.rs (provider management handlers)
//!     → Send to client
//! ```

pub mod headers;
pub mod proxy;
pub mod response;
pub mod server;
pub mod system;

pub use proxy::{FunctionProxy, FunctionRoute, ProxyClientConfig};
pub use server::GatewayServer;
pub use system::SystemHandlers;
