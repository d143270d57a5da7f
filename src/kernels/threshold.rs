//! Threshold-to-zero: keep samples above the threshold, clear the rest.

/// Lane count of the batched body and the required length granularity.
pub const THRESHOLD_BLOCK: usize = 16;

/// `output[p] = input[p]` if `input[p] > threshold`, else `0`.
///
/// Works byte by byte, so the result does not depend on platform byte order.
///
/// Preconditions (debug-asserted only):
/// - `input.len() >= 16` and a multiple of 16
/// - `output.len() == input.len()`, regions disjoint
pub fn threshold_le2min(input: &[u8], output: &mut [u8], threshold: u8) {
    check_preconditions(input, output);

    for (src, dst) in input
        .chunks_exact(THRESHOLD_BLOCK)
        .zip(output.chunks_exact_mut(THRESHOLD_BLOCK))
    {
        let mut lanes = [0u8; THRESHOLD_BLOCK];
        for (lane, px) in lanes.iter_mut().zip(src) {
            // Branch-free select: 0xff when the sample survives.
            let keep = ((*px > threshold) as u8).wrapping_neg();
            *lane = *px & keep;
        }
        dst.copy_from_slice(&lanes);
    }
}

/// Scalar reference body of [`threshold_le2min`].
pub fn threshold_le2min_scalar(input: &[u8], output: &mut [u8], threshold: u8) {
    check_preconditions(input, output);

    for (src, dst) in input.iter().zip(output.iter_mut()) {
        *dst = if *src > threshold { *src } else { 0 };
    }
}

/// Round a sample count up to the threshold block size.
#[inline]
pub const fn threshold_len(samples: usize) -> usize {
    let padded = (samples + THRESHOLD_BLOCK - 1) / THRESHOLD_BLOCK * THRESHOLD_BLOCK;
    if padded < THRESHOLD_BLOCK {
        THRESHOLD_BLOCK
    } else {
        padded
    }
}

#[inline]
fn check_preconditions(input: &[u8], output: &[u8]) {
    debug_assert!(
        input.len() >= THRESHOLD_BLOCK && input.len() % THRESHOLD_BLOCK == 0,
        "pixel count must be a non-zero multiple of 16"
    );
    debug_assert_eq!(input.len(), output.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Vec<u8> {
        (0..=255u8).collect()
    }

    #[test]
    fn keeps_only_samples_above_threshold() {
        let input = ramp();
        for threshold in [0u8, 1, 77, 128, 254, 255] {
            let mut out = vec![0xeeu8; input.len()];
            threshold_le2min(&input, &mut out, threshold);
            for (i, o) in input.iter().zip(&out) {
                assert!(*o == 0 || *o == *i);
                assert_eq!(*o == 0, *i <= threshold);
            }
        }
    }

    #[test]
    fn is_idempotent() {
        let input: Vec<u8> = (0..64).map(|i| (i * 37 % 256) as u8).collect();
        let mut once = vec![0u8; 64];
        let mut twice = vec![0u8; 64];
        threshold_le2min(&input, &mut once, 90);
        threshold_le2min(&once, &mut twice, 90);
        assert_eq!(once, twice);
    }

    #[test]
    fn batched_matches_scalar() {
        let input: Vec<u8> = (0..480).map(|i| ((i * 7919) % 256) as u8).collect();
        let mut fast = vec![0u8; 480];
        let mut slow = vec![0u8; 480];
        for threshold in [0u8, 63, 200] {
            threshold_le2min(&input, &mut fast, threshold);
            threshold_le2min_scalar(&input, &mut slow, threshold);
            assert_eq!(fast, slow);
        }
    }

    #[test]
    fn padded_lengths() {
        assert_eq!(threshold_len(0), 16);
        assert_eq!(threshold_len(16), 16);
        assert_eq!(threshold_len(17), 32);
        assert_eq!(threshold_len(316), 320);
    }
}
