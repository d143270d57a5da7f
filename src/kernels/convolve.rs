//! 5×5 convolution, 8-bit samples × 16-bit signed taps, shifted and saturated to 8 bits.

/// Row-major 5×5 mask.
pub type Mask5x5 = [i16; 25];

/// Normalised binomial smoothing mask (taps sum to 256, use `shift = 8`).
pub const BINOMIAL_5X5: Mask5x5 = [
    1, 4, 6, 4, 1, //
    4, 16, 24, 16, 4, //
    6, 24, 36, 24, 6, //
    4, 16, 24, 16, 4, //
    1, 4, 6, 4, 1,
];

/// Convolve five input rows with `mask`, producing one row of `width` samples.
///
/// This is true convolution: the mask is applied rotated by 180°, so
/// `mask[0]` weights the bottom-right sample of each window.
/// `output[i] = sat((Σ input[r * pitch + i + c] * mask[24 - (r * 5 + c)]) >> shift)`.
///
/// Preconditions (debug-asserted only):
/// - `width >= 2` and even
/// - `pitch >= width + 4`
/// - `input.len() >= 4 * pitch + width + 4`, `output.len() >= width`
/// - `shift < 32`
///
/// No border handling: the caller decides what the missing two columns and
/// rows at each frame edge become.
pub fn convolve_5x5(
    input: &[u8],
    output: &mut [u8],
    width: usize,
    pitch: usize,
    mask: &Mask5x5,
    shift: u32,
) {
    check_preconditions(input, output, width, pitch, shift);

    let k: [i32; 25] = std::array::from_fn(|j| mask[24 - j] as i32);

    for (pair, out) in output[..width].chunks_exact_mut(2).enumerate() {
        let i = pair * 2;
        let mut sum1 = 0i32;
        let mut sum2 = 0i32;
        for r in 0..5 {
            let row = &input[r * pitch + i..r * pitch + i + 6];
            let taps = &k[r * 5..r * 5 + 5];
            for c in 0..5 {
                sum1 = sum1.wrapping_add((row[c] as i32).wrapping_mul(taps[c]));
                sum2 = sum2.wrapping_add((row[c + 1] as i32).wrapping_mul(taps[c]));
            }
        }
        out[0] = saturate(sum1 >> shift);
        out[1] = saturate(sum2 >> shift);
    }
}

/// Scalar reference body of [`convolve_5x5`].
pub fn convolve_5x5_scalar(
    input: &[u8],
    output: &mut [u8],
    width: usize,
    pitch: usize,
    mask: &Mask5x5,
    shift: u32,
) {
    check_preconditions(input, output, width, pitch, shift);

    for (i, out) in output[..width].iter_mut().enumerate() {
        let mut sum = 0i32;
        for r in 0..5 {
            for c in 0..5 {
                let px = input[r * pitch + i + c] as i32;
                sum = sum.wrapping_add(px.wrapping_mul(mask[24 - (r * 5 + c)] as i32));
            }
        }
        *out = saturate(sum >> shift);
    }
}

/// Apply [`convolve_5x5`] to every full window of a `width × height` plane.
///
/// Output is the valid region only: `height - 4` rows of `width - 4`
/// samples, packed. Requires `width >= 6` and even, `height >= 5`,
/// `pitch >= width`, `input.len() >= (height - 1) * pitch + width` and
/// `output.len() >= (width - 4) * (height - 4)`.
pub fn convolve_5x5_plane(
    input: &[u8],
    width: usize,
    height: usize,
    pitch: usize,
    mask: &Mask5x5,
    shift: u32,
    output: &mut [u8],
) {
    debug_assert!(width >= 6 && width % 2 == 0);
    debug_assert!(height >= 5);
    debug_assert!(pitch >= width);
    debug_assert!(input.len() >= (height - 1) * pitch + width);

    let out_w = width - 4;
    let out_h = height - 4;
    debug_assert!(output.len() >= out_w * out_h);

    for (y, out_row) in output.chunks_exact_mut(out_w).take(out_h).enumerate() {
        convolve_5x5(&input[y * pitch..], out_row, out_w, pitch, mask, shift);
    }
}

#[inline]
fn saturate(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

#[inline]
fn check_preconditions(input: &[u8], output: &[u8], width: usize, pitch: usize, shift: u32) {
    debug_assert!(width >= 2 && width % 2 == 0, "width must be even and >= 2");
    debug_assert!(pitch >= width + 4, "pitch must cover the window");
    debug_assert!(input.len() >= 4 * pitch + width + 4, "input too short");
    debug_assert!(output.len() >= width, "output too short");
    debug_assert!(shift < 32);
}
