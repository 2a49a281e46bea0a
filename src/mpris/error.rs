use super::ServiceName;

/// Errors that can occur while monitoring players on the bus
#[derive(thiserror::Error, Debug)]
pub enum MprisError {
    /// Session bus connection could not be established
    #[error("failed to connect to session bus: {0}")]
    Connection(#[source] zbus::Error),

    /// No services matching the player namespace are connected
    #[error("no MPRIS players found on the session bus")]
    NoPlayersFound,

    /// A property query against a specific player service failed
    #[error("property query to {service} failed: {source}")]
    PropertyQuery {
        /// Service the query targeted
        service: ServiceName,
        /// Underlying bus error
        #[source]
        source: zbus::Error,
    },

    /// A present property carried an unexpected wire type
    #[error("property `{property}` has unexpected wire type (expected {expected})")]
    Decode {
        /// Name of the offending property
        property: String,
        /// What the decoder expected to find
        expected: &'static str,
    },

    /// Signal match registration failed; the dispatcher was not started
    #[error("signal subscription failed: {0}")]
    Subscription(String),
}
