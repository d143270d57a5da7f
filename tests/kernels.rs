use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sensor_kernel::arena::{RegionRequest, ScratchArena, SCRATCH_CAPACITY};
use sensor_kernel::kernels::{
    convolve_5x5, convolve_5x5_scalar, correlate_3x3, correlate_3x3_scalar, dilate_binary,
    dilate_binary_scalar, threshold_le2min, threshold_le2min_scalar, StructuringElement,
    BINOMIAL_5X5,
};
use sensor_kernel::SensorError;

fn random_plane(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen()).collect()
}

fn random_binary(rng: &mut StdRng, len: usize, density: f64) -> Vec<u8> {
    (0..len)
        .map(|_| if rng.gen_bool(density) { 255 } else { 0 })
        .collect()
}

// ----------------------------------------------------------------------------
// Correlate3x3
// ----------------------------------------------------------------------------

#[test]
fn correlate_zero_mask_fills_exactly_width() {
    let mut rng = StdRng::seed_from_u64(1);
    for width in [2usize, 4, 10, 64] {
        let pitch = width + 6;
        let input = random_plane(&mut rng, 3 * pitch);
        let mut output = vec![-7i32; width + 4];
        correlate_3x3(&input, &mut output, width, pitch, &[0; 9]);
        assert!(output[..width].iter().all(|v| *v == 0));
        // Nothing past `width` is written.
        assert!(output[width..].iter().all(|v| *v == -7));
    }
}

#[test]
fn correlate_centre_tap_reproduces_middle_row() {
    let mut rng = StdRng::seed_from_u64(2);
    let centre = [0, 0, 0, 0, 1, 0, 0, 0, 0];
    for (width, pitch) in [(2usize, 4usize), (8, 10), (30, 32), (64, 80)] {
        let input = random_plane(&mut rng, 3 * pitch);
        let mut output = vec![0i32; width];
        correlate_3x3(&input, &mut output, width, pitch, &centre);
        let expected: Vec<i32> = input[pitch + 1..pitch + 1 + width]
            .iter()
            .map(|p| *p as i32)
            .collect();
        assert_eq!(output, expected);
    }
}

#[test]
fn correlate_bodies_agree() {
    let mut rng = StdRng::seed_from_u64(3);
    let mask = [3, -1, 7, 0, -12, 5, 1, 2, -3];
    let (width, pitch) = (40, 48);
    let input = random_plane(&mut rng, 3 * pitch);
    let mut fast = vec![0i32; width];
    let mut slow = vec![0i32; width];
    correlate_3x3(&input, &mut fast, width, pitch, &mask);
    correlate_3x3_scalar(&input, &mut slow, width, pitch, &mask);
    assert_eq!(fast, slow);
}

// ----------------------------------------------------------------------------
// Convolve5x5
// ----------------------------------------------------------------------------

#[test]
fn convolve_flat_patch_regression_row() {
    let (width, pitch) = (2usize, 6usize);
    let input = vec![69u8; 5 * pitch];
    let mut output = [0u8; 2];
    convolve_5x5(&input, &mut output, width, pitch, &BINOMIAL_5X5, 8);
    assert_eq!(output, [69, 69]);
}

#[test]
fn convolve_bodies_agree() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut mask = [0i16; 25];
    for tap in mask.iter_mut() {
        *tap = rng.gen_range(-40..=40);
    }
    let (width, pitch) = (36, 40);
    let input = random_plane(&mut rng, 5 * pitch);
    let mut fast = vec![0u8; width];
    let mut slow = vec![0u8; width];
    convolve_5x5(&input, &mut fast, width, pitch, &mask, 4);
    convolve_5x5_scalar(&input, &mut slow, width, pitch, &mask, 4);
    assert_eq!(fast, slow);
}

// ----------------------------------------------------------------------------
// ThresholdLE
// ----------------------------------------------------------------------------

#[test]
fn threshold_keeps_or_clears_each_sample() {
    let mut rng = StdRng::seed_from_u64(5);
    for len in [16usize, 32, 160] {
        let input = random_plane(&mut rng, len);
        for threshold in [0u8, 1, 77, 128, 254, 255] {
            let mut output = vec![0u8; len];
            threshold_le2min(&input, &mut output, threshold);
            for (i, o) in input.iter().zip(&output) {
                assert!(*o == 0 || *o == *i);
                assert_eq!(*o == 0, *i <= threshold);
            }
        }
    }
}

#[test]
fn threshold_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(6);
    let input = random_plane(&mut rng, 64);
    let mut once = vec![0u8; 64];
    let mut twice = vec![0u8; 64];
    threshold_le2min(&input, &mut once, 100);
    threshold_le2min(&once, &mut twice, 100);
    assert_eq!(once, twice);
}

#[test]
fn threshold_bodies_agree() {
    let mut rng = StdRng::seed_from_u64(7);
    let input = random_plane(&mut rng, 96);
    let mut fast = vec![0u8; 96];
    let mut slow = vec![0u8; 96];
    threshold_le2min(&input, &mut fast, 42);
    threshold_le2min_scalar(&input, &mut slow, 42);
    assert_eq!(fast, slow);
}

// ----------------------------------------------------------------------------
// DilateBinary
// ----------------------------------------------------------------------------

#[test]
fn dilate_is_monotonic() {
    let mut rng = StdRng::seed_from_u64(8);
    let (w, h) = (17usize, 11usize);
    for element in [StructuringElement::EIGHT_CONNECTED, StructuringElement::CROSS] {
        for _ in 0..20 {
            let a = random_binary(&mut rng, w * h, 0.3);
            // b is a subset of a.
            let b: Vec<u8> = a
                .iter()
                .map(|p| if *p != 0 && rng.gen_bool(0.5) { 255 } else { 0 })
                .collect();
            let mut out_a = vec![0u8; (w - 2) * (h - 2)];
            let mut out_b = vec![0u8; (w - 2) * (h - 2)];
            dilate_binary(&a, &mut out_a, w, h, &element);
            dilate_binary(&b, &mut out_b, w, h, &element);
            assert!(out_a.iter().zip(&out_b).all(|(pa, pb)| pa >= pb));
        }
    }
}

#[test]
fn dilate_bodies_agree() {
    let mut rng = StdRng::seed_from_u64(9);
    let (w, h) = (20usize, 9usize);
    let input = random_binary(&mut rng, w * h, 0.1);
    let mut fast = vec![0u8; (w - 2) * (h - 2)];
    let mut slow = vec![0u8; (w - 2) * (h - 2)];
    dilate_binary(&input, &mut fast, w, h, &StructuringElement::EIGHT_CONNECTED);
    dilate_binary_scalar(&input, &mut slow, w, h, &StructuringElement::EIGHT_CONNECTED);
    assert_eq!(fast, slow);
}

// ----------------------------------------------------------------------------
// Scratch arena
// ----------------------------------------------------------------------------

#[test]
fn oversized_partition_leaves_arena_untouched() {
    let mut arena = ScratchArena::new();
    let (token, layout) = arena
        .partition(&[RegionRequest::bytes("a", 100), RegionRequest::bytes("b", 100)])
        .unwrap();
    {
        let [a, b] = arena.regions_mut::<2>(&token, &layout).unwrap();
        a.fill(1);
        b.fill(2);
    }
    let generation = arena.generation();
    let used = arena.used();

    let err = arena
        .partition(&[
            RegionRequest::bytes("big", SCRATCH_CAPACITY),
            RegionRequest::bytes("one_more", 1),
        ])
        .unwrap_err();
    assert!(matches!(err, SensorError::ScratchExhausted { .. }));

    assert_eq!(arena.generation(), generation);
    assert_eq!(arena.used(), used);
    let [a, b] = arena.regions_mut::<2>(&token, &layout).unwrap();
    assert!(a.iter().all(|v| *v == 1));
    assert!(b.iter().all(|v| *v == 2));
}
