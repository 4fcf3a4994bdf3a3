//! Rounding and unit conversion applied to upstream values before they
//! reach the domain records.
//!
//! Half-way values round toward positive infinity (`-2.5` becomes `-2`),
//! so every rounded value is a fixed point of the same rounding.

/// Round to the nearest whole unit.
pub fn round_whole(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to one decimal place.
pub fn round_tenth(value: f64) -> f64 {
    round_whole(value * 10.0) / 10.0
}

/// Meters to whole kilometers.
pub fn meters_to_km(meters: f64) -> f64 {
    round_whole(meters / 1000.0)
}

/// Round a percentage into `0..=100`.
pub fn percent(value: f64) -> u8 {
    round_whole(value).clamp(0.0, 100.0) as u8
}

/// Round a bearing into `0..360` degrees.
pub fn bearing(degrees: f64) -> u16 {
    (round_whole(degrees).rem_euclid(360.0)) as u16
}
