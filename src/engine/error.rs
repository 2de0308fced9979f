/// Errors raised while building or wiring an engine.
///
/// Nothing here is produced by audio processing: runtime parameters are
/// clamped, never rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Sample rate is zero, negative or not finite
    InvalidSampleRate(f32),
    /// A sequencer was configured with zero steps or more than the panel can address
    InvalidStepCount { steps: usize, max: usize },
    /// Requested block size exceeds the preallocated scratch buffers
    BlockTooLarge { size: usize, max: usize },
    /// The control ring is full; the message was not delivered
    QueueFull,
    /// Configuration could not be read or parsed
    Config(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidSampleRate(rate) => {
                write!(f, "Invalid sample rate: {} (must be positive and finite)", rate)
            }
            EngineError::InvalidStepCount { steps, max } => {
                write!(f, "Invalid step count: {} (must be between 1 and {})", steps, max)
            }
            EngineError::BlockTooLarge { size, max } => {
                write!(f, "Block size {} exceeds the maximum of {} frames", size, max)
            }
            EngineError::QueueFull => write!(f, "Control queue is full"),
            EngineError::Config(reason) => write!(f, "Invalid engine config: {}", reason),
        }
    }
}

impl std::error::Error for EngineError {}
