use humansize::{BINARY, ToF64, Unsigned, format_size};

pub fn format_bytes(bytes: impl ToF64 + Unsigned) -> String {
    format_size(bytes, BINARY)
}

pub fn format_bandwidth(mbps: f64) -> String {
    if mbps >= 1000.0 {
        format!("{:.2} Gbps", mbps / 1000.0)
    } else {
        format!("{mbps:.2} Mbps")
    }
}

/// Rounds to 2 decimal places. Exact halves go to the even digit, so
/// 0.125 becomes 0.12 and 0.375 becomes 0.38.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Decimal rendering used for numbers in CSV output: shortest form that
/// reads back to the same value, always with a fractional part ("100.0").
pub fn format_decimal(value: f64) -> String {
    format!("{value:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(99.994), 99.99);
        assert_eq!(round2(-3.14159), -3.14);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_round2_halves_go_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.625), 0.62);
        assert_eq!(round2(12.125), 12.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(99.875), 99.88);
        // 2.675 is stored slightly below the half
        assert_eq!(round2(2.675), 2.67);
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(100.0), "100.0");
        assert_eq!(format_decimal(20.46), "20.46");
        assert_eq!(format_decimal(7.0), "7.0");
        assert_eq!(format_decimal(0.0), "0.0");
    }

    #[test]
    fn test_format_bandwidth() {
        assert_eq!(format_bandwidth(95.123), "95.12 Mbps");
        assert_eq!(format_bandwidth(1500.0), "1.50 Gbps");
    }
}
