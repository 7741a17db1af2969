//! Observable events
//!
//! Events are explicit and typed; their string form is the `event` field
//! of a log line.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Startup
    /// Configuration file loaded
    ConfigLoaded,
    /// Schema and model registries loaded and cross-checked
    RegistryLoaded,
    /// Fixture rows loaded into the in-memory data layer
    DatasetLoaded,

    // Translation
    /// A parameter failed to resolve
    ParameterRejected,
    /// A join chain was planned
    JoinPlanned,
    /// A join chain was shared by another instruction
    JoinReused,
    /// Schema and model layers disagree
    ConfigurationFault,
    /// Translation finished with parameter errors
    TranslationRejected,

    // Execution
    /// A compiled query ran against the data layer
    QueryExecuted,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::RegistryLoaded => "REGISTRY_LOADED",
            Event::DatasetLoaded => "DATASET_LOADED",
            Event::ParameterRejected => "PARAMETER_REJECTED",
            Event::JoinPlanned => "JOIN_PLANNED",
            Event::JoinReused => "JOIN_REUSED",
            Event::ConfigurationFault => "CONFIGURATION_FAULT",
            Event::TranslationRejected => "TRANSLATION_REJECTED",
            Event::QueryExecuted => "QUERY_EXECUTED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::ConfigurationFault)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::RegistryLoaded,
            Event::DatasetLoaded,
            Event::ParameterRejected,
            Event::JoinPlanned,
            Event::JoinReused,
            Event::ConfigurationFault,
            Event::TranslationRejected,
            Event::QueryExecuted,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::ConfigurationFault.is_fatal());
        assert!(!Event::ParameterRejected.is_fatal());
    }
}
