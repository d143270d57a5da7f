//! Fixed-point image kernels.
//!
//! Every kernel is a pure, allocation-free function over slices with a
//! strict precondition contract (sizes, parity, non-aliasing). The
//! preconditions are asserted in debug builds only: these run per pixel, per
//! frame, and the calling algorithm validates geometry once in `setup`.
//!
//! None of the kernels pad at image borders. They evaluate full windows and
//! leave border policy to the caller.
//!
//! Each kernel ships a batched body (the one algorithms call) and a
//! `*_scalar` reference body with identical integer semantics.

mod convolve;
mod correlate;
mod dilate;
mod threshold;

pub use convolve::{
    convolve_5x5, convolve_5x5_plane, convolve_5x5_scalar, Mask5x5, BINOMIAL_5X5,
};
pub use correlate::{correlate_3x3, correlate_3x3_scalar, Mask3x3};
pub use dilate::{dilate_binary, dilate_binary_scalar, StructuringElement};
pub use threshold::{threshold_le2min, threshold_le2min_scalar, threshold_len, THRESHOLD_BLOCK};

/// Horizontal Sobel mask for [`correlate_3x3`].
pub const SOBEL_X: Mask3x3 = [-1, 0, 1, -2, 0, 2, -1, 0, 1];
