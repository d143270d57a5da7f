//! Sensor Kernel
//!
//! Fixed-memory vision sensors for a camera-to-display loop on small
//! targets. One YUYV frame goes in, one annotated RGB565X frame and a
//! small detection record come out.
//!
//! # Architecture
//!
//! - **Kernels** (`kernels`): border-less integer image operations
//!   (3×3 correlation, 5×5 convolution, threshold-to-zero, binary dilation)
//!   with a scalar reference body next to every batched body.
//! - **Scratch arena** (`arena`): one 4096-byte block shared by all
//!   variants. Partitioning hands out a generation token; a variant whose
//!   token went stale cannot touch the block.
//! - **Sensor algorithms** (`algorithms`): Motion, EdgeLine, Object, Line
//!   and MxN behind the two-phase `SensorAlgorithm` contract.
//! - **Dispatcher** (`dispatch`): id-indexed table over the variants.
//!   Unknown ids are a neutral no-op.
//!
//! Nothing on the per-frame path allocates.
//!
//! # Module Structure
//!
//! - `image`: descriptors and borrowed frame views
//! - `color`: YUV/RGB/HSV conversions and pixel access
//! - `config`: `SensorConfig` for the binaries
//! - `source`: deterministic synthetic capture

use sha2::{Digest, Sha256};

pub mod algorithms;
pub mod arena;
pub mod color;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod image;
pub mod kernels;
pub mod source;

pub use algorithms::{AlgorithmId, InArgs, OutArgs, SensorAlgorithm};
pub use arena::{ArenaToken, RegionRequest, ScratchArena, ScratchLayout, SCRATCH_CAPACITY};
pub use dispatch::{Dispatcher, FrameGeometry};
pub use error::SensorError;
pub use image::{ImageBuffer, ImageBufferMut, ImageDesc, VideoFormat};
pub use source::SyntheticSource;

/// Hex SHA-256 of a frame, for comparing runs.
pub fn frame_digest(frame: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(frame);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_hex() {
        let a = frame_digest(&[0u8; 16]);
        assert_eq!(a.len(), 64);
        assert_eq!(a, frame_digest(&[0u8; 16]));
        assert_ne!(a, frame_digest(&[1u8; 16]));
    }
}
