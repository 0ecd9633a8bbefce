//! Float formatting shared between the `print` operation and its tests.
//!
//! Rust's default `f64` `Display` drops the fractional part for integral
//! values (`42` rather than `42.0`). Every value flowing through this
//! runtime is a float, so we always show it as one.

/// Formats a float the way `print` writes it to standard output: always
/// with a decimal point, never in exponential notation for the magnitudes
/// this runtime deals with.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let rendered = format!("{value}");
    if rendered.contains('.') {
        rendered
    } else {
        format!("{rendered}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_get_a_decimal_point() {
        assert_eq!(format_float(42.0), "42.0");
        assert_eq!(format_float(-3.0), "-3.0");
    }

    #[test]
    fn fractional_values_pass_through() {
        assert_eq!(format_float(2.5), "2.5");
    }

    #[test]
    fn non_finite_values_have_readable_labels() {
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_float(f64::NAN), "nan");
    }
}
