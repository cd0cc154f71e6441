//! Case-and-fraction quantity rescaling.
//!
//! The store records stock per case: `2.5` with a conversion factor of `12`
//! means two full cases plus half a case. The catalog reports pieces, so the
//! integer part is multiplied out and the fractional remainder is rounded to
//! the nearest whole piece.

/// Rescale a raw quantity into pieces using the record's conversion factor.
///
/// - Absent, zero or NaN quantities yield `0`.
/// - An absent unit, a unit of `1`, or a zero/NaN unit leaves the quantity
///   untouched.
/// - Otherwise the result is `whole * unit + round(fraction * unit)`.
///
/// Rounding is half-away-from-zero. The integer part truncates toward zero,
/// so negative quantities mirror positive ones.
///
/// # Example
///
/// ```
/// use catalog_cache::normalize::normalize;
///
/// assert_eq!(normalize(Some(2.5), Some(12.0)), 30.0);
/// assert_eq!(normalize(Some(7.0), Some(1.0)), 7.0);
/// assert_eq!(normalize(None, Some(6.0)), 0.0);
/// ```
pub fn normalize(quantity: Option<f64>, unit: Option<f64>) -> f64 {
    let quantity = match quantity {
        Some(q) if q != 0.0 && !q.is_nan() => q,
        _ => return 0.0,
    };

    let unit = match unit {
        Some(u) if u != 1.0 && u != 0.0 && !u.is_nan() => u,
        _ => return quantity,
    };

    let whole = quantity.trunc();
    let fraction = quantity.fract();
    whole * unit + (fraction * unit).round()
}

/// Conversion factor for a row, falling back to `1` for missing or unusable values.
pub fn effective_unit(unit: Option<f64>) -> f64 {
    match unit {
        Some(u) if u != 0.0 && !u.is_nan() => u,
        _ => 1.0,
    }
}
