//! Registry loading
//!
//! Registries are loaded once at startup from JSON and validated as a whole;
//! missing or inconsistent declarations fail loading instead of surfacing as
//! configuration faults during requests.

mod errors;
mod loader;

pub use errors::{LoaderError, LoaderResult};
pub use loader::{Registry, RegistryFile, RegistryLoader};
