//! Error types and handling for tour assembly

use thiserror::Error;

/// Errors that end a `start_tour` call
///
/// Only position and discovery problems surface here. Archive and narrative
/// failures are absorbed during enrichment and never reach the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TourError {
    /// The current position could not be read in time, or access was denied
    #[error("Position unavailable: {message}")]
    PositionUnavailable { message: String },

    /// The point-of-interest source errored or was unreachable
    #[error("Attraction discovery failed: {message}")]
    DiscoveryFailed { message: String },

    /// Discovery succeeded but returned no candidates
    #[error("No attractions found within {radius_meters} m")]
    NoAttractionsFound { radius_meters: f64 },

    /// A newer `start_tour` call replaced this one before it finished
    #[error("Tour assembly was superseded by a newer request")]
    Superseded,
}

impl TourError {
    /// Create a new position error
    pub fn position_unavailable<S: Into<String>>(message: S) -> Self {
        Self::PositionUnavailable {
            message: message.into(),
        }
    }

    /// Create a new discovery error
    pub fn discovery_failed<S: Into<String>>(message: S) -> Self {
        Self::DiscoveryFailed {
            message: message.into(),
        }
    }

    /// Whether repeating the same call may succeed without user action
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, TourError::DiscoveryFailed { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TourError::PositionUnavailable { .. } => {
                "Couldn't find where you are. Please check location access and try again."
                    .to_string()
            }
            TourError::DiscoveryFailed { .. } => {
                "The attraction service is unavailable right now. Please try again in a moment."
                    .to_string()
            }
            TourError::NoAttractionsFound { .. } => {
                "There's nothing to tour nearby. Try a larger radius or another spot.".to_string()
            }
            TourError::Superseded => "A newer tour request replaced this one.".to_string(),
        }
    }
}
