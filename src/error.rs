//! Status taxonomy for the sensor core.
//!
//! Errors here never allocate: `run` must stay heap-free on the failure
//! path too. Application code lifts them into `anyhow::Error` with `?`.

use std::fmt;

/// Failure reported by `setup`, `run`, or the scratch arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorError {
    /// Pixel format of an input or output descriptor is not accepted.
    UnsupportedFormat,
    /// Width/height/stride outside what the variant supports.
    UnsupportedGeometry,
    /// Requested scratch layout does not fit the arena.
    ScratchExhausted { requested: usize, capacity: usize },
    /// The arena was re-partitioned for another holder since `setup`.
    StaleArena,
    /// `run` called before a successful `setup`.
    NotInitialized,
    /// Caller buffer is shorter than the descriptor requires.
    BufferTooSmall { needed: usize, got: usize },
    /// A per-frame argument is out of range.
    InvalidArgument(&'static str),
}

impl SensorError {
    /// Integer status for the C-style contract. Zero is reserved for success.
    pub fn status(&self) -> i32 {
        match self {
            SensorError::UnsupportedFormat => -1,
            SensorError::UnsupportedGeometry => -2,
            SensorError::ScratchExhausted { .. } => -3,
            SensorError::StaleArena => -4,
            SensorError::NotInitialized => -5,
            SensorError::BufferTooSmall { .. } => -6,
            SensorError::InvalidArgument(_) => -7,
        }
    }

    /// True for errors that come out of `setup` and require new parameters.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SensorError::UnsupportedFormat
                | SensorError::UnsupportedGeometry
                | SensorError::ScratchExhausted { .. }
        )
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::UnsupportedFormat => write!(f, "unsupported pixel format"),
            SensorError::UnsupportedGeometry => write!(f, "unsupported frame geometry"),
            SensorError::ScratchExhausted {
                requested,
                capacity,
            } => write!(
                f,
                "scratch layout needs {} bytes but arena holds {}",
                requested, capacity
            ),
            SensorError::StaleArena => write!(f, "scratch arena belongs to another algorithm"),
            SensorError::NotInitialized => write!(f, "algorithm has not been set up"),
            SensorError::BufferTooSmall { needed, got } => {
                write!(f, "buffer holds {} bytes, {} required", got, needed)
            }
            SensorError::InvalidArgument(what) => write!(f, "invalid argument: {}", what),
        }
    }
}

impl std::error::Error for SensorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_negative_and_distinct() {
        let all = [
            SensorError::UnsupportedFormat,
            SensorError::UnsupportedGeometry,
            SensorError::ScratchExhausted {
                requested: 1,
                capacity: 0,
            },
            SensorError::StaleArena,
            SensorError::NotInitialized,
            SensorError::BufferTooSmall { needed: 2, got: 1 },
            SensorError::InvalidArgument("x"),
        ];
        let mut codes: Vec<i32> = all.iter().map(|e| e.status()).collect();
        assert!(codes.iter().all(|c| *c < 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn converts_into_anyhow() {
        let err: anyhow::Error = SensorError::StaleArena.into();
        assert_eq!(
            err.downcast_ref::<SensorError>(),
            Some(&SensorError::StaleArena)
        );
    }
}
