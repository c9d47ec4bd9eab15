use rust_decimal::{Decimal, RoundingStrategy};

/// Currency glyph used for every amount the backend reports
pub const CURRENCY_GLYPH: &str = "₹";

/// Format an amount with the currency glyph and two decimal places.
///
/// Rounds on the exact binary value, with exact midpoints going away from
/// zero, so `0.125` shows as `0.13` and `1.005` (stored just below) as `1.00`.
pub fn format_rupees(amount: f64) -> String {
    match Decimal::from_f64_retain(amount) {
        Some(exact) => {
            let rounded = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            format!("{}{:.2}", CURRENCY_GLYPH, rounded)
        }
        // NaN, infinities and amounts beyond Decimal's range
        None => format!("{}{:.2}", CURRENCY_GLYPH, amount),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Keep the tail of a path-like string, which is the part worth reading
pub fn truncate_path(s: &str, max_len: usize) -> String {
    let len = s.chars().count();
    if len <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().skip(len - max_len).collect()
    } else {
        let tail: String = s.chars().skip(len - (max_len - 3)).collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rupees() {
        assert_eq!(format_rupees(123.4), "₹123.40");
        assert_eq!(format_rupees(56.7), "₹56.70");
        assert_eq!(format_rupees(0.0), "₹0.00");
        assert_eq!(format_rupees(1999.999), "₹2000.00");
        assert_eq!(format_rupees(-5.0), "₹-5.00");
    }

    #[test]
    fn test_format_rupees_midpoints_round_up() {
        assert_eq!(format_rupees(0.125), "₹0.13");
        assert_eq!(format_rupees(1.125), "₹1.13");
        assert_eq!(format_rupees(2.625), "₹2.63");
        assert_eq!(format_rupees(-0.125), "₹-0.13");
    }

    #[test]
    fn test_format_rupees_near_midpoints_use_stored_value() {
        // 1.005 and 0.615 are stored just below the midpoint
        assert_eq!(format_rupees(1.005), "₹1.00");
        assert_eq!(format_rupees(0.615), "₹0.61");
        // 2.675 is stored just below as well
        assert_eq!(format_rupees(2.675), "₹2.67");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_truncate_path() {
        assert_eq!(truncate_path("/tmp/a.mp4", 20), "/tmp/a.mp4");
        assert_eq!(truncate_path("/home/user/videos/holiday.mp4", 14), "...holiday.mp4");
    }
}
