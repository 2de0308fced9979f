pub mod control; // Front-panel mapping
pub mod dsp;
pub mod engine; // Voice, transport and control messages
#[cfg(feature = "rtrb")]
pub mod runtime; // Audio/control entry points
pub mod sequencing; // Step sequencers and pitch quantization

/// Largest block the engine renders between two snapshots.
pub const MAX_BLOCK_SIZE: usize = 2048;
/// Most steps a single track can hold.
pub const MAX_STEPS: usize = 16;
