//! 3×3 windowed correlation, 8-bit samples × 16-bit signed taps → 32-bit sums.

/// Row-major 3×3 mask.
pub type Mask3x3 = [i16; 9];

/// Correlate three input rows with `mask`, producing `width` sums.
///
/// `output[i] = Σ input[r * pitch + i + c] * mask[r * 3 + c]` for `r, c` in `0..3`.
/// The window is anchored at row 0, column `i`; there is no padding, so the
/// caller supplies `width + 2` readable samples on the last row.
///
/// Preconditions (debug-asserted only):
/// - `width >= 2` and even
/// - `pitch >= width`
/// - `input.len() >= 2 * pitch + width + 2`, `output.len() >= width`
///
/// The `+ 2` holds even when `pitch == width`: the last row's window runs two
/// samples past the plane, so a tightly packed 3-row buffer is too short.
/// A short buffer panics on indexing in release builds.
///
/// Accumulation wraps on overflow; keep `|mask| * 255 * 9` inside `i32`.
pub fn correlate_3x3(input: &[u8], output: &mut [i32], width: usize, pitch: usize, mask: &Mask3x3) {
    check_preconditions(input, output, width, pitch);

    let taps = mask.map(i32::from);
    let rows = [input, &input[pitch..], &input[2 * pitch..]];

    // Two outputs per step share four loaded samples per row.
    for (pair, out) in output[..width].chunks_exact_mut(2).enumerate() {
        let i = pair * 2;
        let mut sum1 = 0i32;
        let mut sum2 = 0i32;
        for (row, k) in rows.iter().zip(taps.chunks_exact(3)) {
            let p0 = row[i] as i32;
            let p1 = row[i + 1] as i32;
            let p2 = row[i + 2] as i32;
            let p3 = row[i + 3] as i32;
            sum1 = sum1
                .wrapping_add(p0.wrapping_mul(k[0]))
                .wrapping_add(p1.wrapping_mul(k[1]))
                .wrapping_add(p2.wrapping_mul(k[2]));
            sum2 = sum2
                .wrapping_add(p1.wrapping_mul(k[0]))
                .wrapping_add(p2.wrapping_mul(k[1]))
                .wrapping_add(p3.wrapping_mul(k[2]));
        }
        out[0] = sum1;
        out[1] = sum2;
    }
}

/// Scalar reference body of [`correlate_3x3`]. Same contract, same results.
pub fn correlate_3x3_scalar(
    input: &[u8],
    output: &mut [i32],
    width: usize,
    pitch: usize,
    mask: &Mask3x3,
) {
    check_preconditions(input, output, width, pitch);

    for (i, out) in output[..width].iter_mut().enumerate() {
        let mut sum = 0i32;
        for r in 0..3 {
            for c in 0..3 {
                let px = input[r * pitch + i + c] as i32;
                sum = sum.wrapping_add(px.wrapping_mul(mask[r * 3 + c] as i32));
            }
        }
        *out = sum;
    }
}

#[inline]
fn check_preconditions(input: &[u8], output: &[i32], width: usize, pitch: usize) {
    debug_assert!(width >= 2 && width % 2 == 0, "width must be even and >= 2");
    debug_assert!(pitch >= width, "pitch must be >= width");
    debug_assert!(input.len() >= 2 * pitch + width + 2, "input too short");
    debug_assert!(output.len() >= width, "output too short");
}
