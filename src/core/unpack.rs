//! Numeric helpers for reading packed batch values.

/// Widen packed `f32` values into the `f64` feature representation.
pub fn to_f64s(values: &[f32]) -> Vec<f64> {
    values.iter().map(|&v| f64::from(v)).collect()
}

/// Widen byte observations into packed `f32` values.
pub fn widen_u8s(values: &[u8]) -> Vec<f32> {
    values.iter().map(|&v| f32::from(v)).collect()
}

/// The `slot`-th chunk of `width` values in a packed buffer.
///
/// Callers must have validated that `packed` holds at least
/// `(slot + 1) * width` values.
pub fn lane_slice(packed: &[f32], slot: usize, width: usize) -> &[f32] {
    &packed[slot * width..(slot + 1) * width]
}

/// Index of the largest value.
///
/// Ties go to the first maximum, matching how actions are picked
/// greedily when acting. NaN never beats a number. Returns `None` for an
/// empty slice.
pub fn max_index(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            None => best = Some((i, v)),
            Some((_, b)) if v > b || (b.is_nan() && !v.is_nan()) => best = Some((i, v)),
            _ => {}
        }
    }
    best.map(|(i, _)| i)
}

/// Narrow a feature to a byte.
///
/// Truncates toward zero, then wraps modulo 256 the way a fixed-width
/// unsigned integer overflows. No clamping is done; NaN becomes 0.
///
/// The intermediate `i64` saturates, so magnitudes of 2^63 and above map to
/// the wrapped value of `i64::MAX` or `i64::MIN` (255 and 0).
pub fn quantize_u8(value: f64) -> u8 {
    (value as i64) as u8
}

/// Whether `value` survives [`quantize_u8`] unchanged.
pub fn fits_u8(value: f64) -> bool {
    value.fract() == 0.0 && (0.0..=255.0).contains(&value)
}
