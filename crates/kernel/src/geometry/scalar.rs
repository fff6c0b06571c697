//! Scalar helpers shared by the plane and UV math.

/// Rounds `value` to `decimals` decimal places if it lies within `epsilon` of that
/// rounded value; otherwise returns it unchanged.
pub fn correct(value: f64, decimals: u32, epsilon: f64) -> f64 {
    let m = 10f64.powi(decimals as i32);
    let scaled = value * m;
    let rounded = scaled.round();
    if (rounded - scaled).abs() < epsilon {
        rounded / m
    } else {
        value
    }
}

/// Rounds `value` to `decimals` decimal places unconditionally.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let m = 10f64.powi(decimals as i32);
    (value * m).round() / m
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Replaces a scale factor that is (almost) zero with 1 so it can safely divide.
pub fn safe_scale(value: f64, almost_zero: f64) -> f64 {
    if value.abs() < almost_zero { 1.0 } else { value }
}

/// Floors `value` to the nearest lower multiple of `grid`.
pub fn snap_down(value: f64, grid: f64) -> f64 {
    if grid == 0.0 {
        return value;
    }
    (value / grid).floor() * grid
}
