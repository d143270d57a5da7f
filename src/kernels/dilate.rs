//! Binary morphological dilation over 0/255 planes.

/// 3×3 neighbourhood selecting which input pixels feed an output pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StructuringElement {
    taps: [bool; 9],
}

impl StructuringElement {
    /// Full 3×3 square: 8-connected dilation.
    pub const EIGHT_CONNECTED: Self = Self { taps: [true; 9] };

    /// Plus shape: 4-connected dilation.
    pub const CROSS: Self = Self {
        taps: [false, true, false, true, true, true, false, true, false],
    };

    pub const fn new(taps: [bool; 9]) -> Self {
        Self { taps }
    }

    pub fn taps(&self) -> &[bool; 9] {
        &self.taps
    }
}

impl Default for StructuringElement {
    fn default() -> Self {
        Self::EIGHT_CONNECTED
    }
}

/// Dilate a packed `width × height` binary plane by one pass of `element`.
///
/// Only full windows are evaluated. The output is the packed
/// `(width - 2) × (height - 2)` interior: output `(x, y)` is 255 when any
/// selected input pixel around `(x + 1, y + 1)` is non-zero, else 0.
/// Anything the caller wants at the frame border has to be padded in
/// before the call.
///
/// Preconditions (debug-asserted only): `width >= 3`, `height >= 3`,
/// `input.len() >= width * height`, `output.len() >= (width - 2) * (height - 2)`,
/// regions disjoint.
pub fn dilate_binary(
    input: &[u8],
    output: &mut [u8],
    width: usize,
    height: usize,
    element: &StructuringElement,
) {
    check_preconditions(input, output, width, height);

    // Tap selectors widened to byte masks so the inner loop has no branches.
    let sel: [u8; 9] = element.taps.map(|t| if t { 0xff } else { 0 });
    let out_w = width - 2;

    for y in 0..height - 2 {
        let r0 = &input[y * width..(y + 1) * width];
        let r1 = &input[(y + 1) * width..(y + 2) * width];
        let r2 = &input[(y + 2) * width..(y + 3) * width];
        let out_row = &mut output[y * out_w..(y + 1) * out_w];
        for (x, out) in out_row.iter_mut().enumerate() {
            let acc = (r0[x] & sel[0])
                | (r0[x + 1] & sel[1])
                | (r0[x + 2] & sel[2])
                | (r1[x] & sel[3])
                | (r1[x + 1] & sel[4])
                | (r1[x + 2] & sel[5])
                | (r2[x] & sel[6])
                | (r2[x + 1] & sel[7])
                | (r2[x + 2] & sel[8]);
            *out = ((acc != 0) as u8).wrapping_neg();
        }
    }
}

/// Scalar reference body of [`dilate_binary`].
pub fn dilate_binary_scalar(
    input: &[u8],
    output: &mut [u8],
    width: usize,
    height: usize,
    element: &StructuringElement,
) {
    check_preconditions(input, output, width, height);

    let out_w = width - 2;
    for y in 0..height - 2 {
        for x in 0..out_w {
            let hit = (0..9).any(|t| {
                element.taps[t] && input[(y + t / 3) * width + x + t % 3] != 0
            });
            output[y * out_w + x] = if hit { 255 } else { 0 };
        }
    }
}

#[inline]
fn check_preconditions(input: &[u8], output: &[u8], width: usize, height: usize) {
    debug_assert!(width >= 3 && height >= 3, "plane must hold a 3x3 window");
    debug_assert!(input.len() >= width * height, "input too short");
    debug_assert!(
        output.len() >= (width - 2) * (height - 2),
        "output too short"
    );
}
