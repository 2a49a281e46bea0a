/// Client facade and lifecycle management
pub mod client;
/// Property decoding from wire variants into the typed model
pub mod decode;
/// Signal dispatch loop keeping the registry consistent
pub mod dispatcher;
/// Player discovery and on-demand state resolution
pub mod discovery;
/// Media player error types
pub mod error;
/// In-memory player registry
pub mod registry;
/// Player model types and bus constants
pub mod types;

pub use client::*;
pub use discovery::*;
pub use dispatcher::SharedRegistry;
pub use error::*;
pub use registry::*;
pub use types::*;
