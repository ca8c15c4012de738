use thiserror::Error;

/// Contract violations raised by the engine.
///
/// Expected data problems (missing coordinates, too few seats) are never
/// errors; they surface as fields on the assignment and route results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CarpoolError {
    #[error("household '{household}' has negative capacity {capacity} for the {direction} leg")]
    NegativeCapacity {
        household: String,
        direction: String,
        capacity: i32,
    },
    #[error("unknown direction '{0}' (expected 'go' or 'back')")]
    UnknownDirection(String),
    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    #[error("failed to encode snapshot: {0}")]
    Encode(String),
}
