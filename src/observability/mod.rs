//! Observability
//!
//! - Structured JSON-line logging with a process-wide minimum severity
//! - Typed events
//! - Monotonic atomic counters
//! - Begin/complete scopes
//!
//! Observability never changes translation or execution results.
//!
//! ```ignore
//! use jsonapi_query::observability::{Event, Logger, MetricsRegistry};
//!
//! Logger::info(Event::RegistryLoaded.as_str(), &[("schemas", "5")]);
//! MetricsRegistry::global().increment_translations();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::ObservationScope;
