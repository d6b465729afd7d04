//! Function gateway: forwards `/function/{name}` requests to the resolved
//! function watchdog and relays the response.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resolver;

pub use config::GatewayConfig;
pub use http::{FunctionProxy, GatewayServer, SystemHandlers};
pub use lifecycle::Shutdown;
pub use resolver::{BaseUrlResolver, ResolveError, ResolvedAddress};
