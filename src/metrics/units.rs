//! Unit conversions shared by every collector.
//!
//! Byte counts are truncated (integer division), never rounded.

/// Bytes in one mebibyte.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Bytes in one gibibyte.
pub const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;

/// Convert bytes to whole MB.
pub fn bytes_to_mb(bytes: u64) -> u64 {
    bytes / BYTES_PER_MB
}

/// Convert bytes to whole GB.
pub fn bytes_to_gb(bytes: u64) -> u64 {
    bytes / BYTES_PER_GB
}

/// `part / whole` as a percentage rounded to one decimal, 0 when `whole` is 0.
pub fn percent_of(part: u64, whole: u64) -> f32 {
    if whole == 0 {
        return 0.0;
    }
    round_to(part as f64 / whole as f64 * 100.0, 1) as f32
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_conversions_truncate() {
        assert_eq!(bytes_to_mb(BYTES_PER_MB * 3 - 1), 2);
        assert_eq!(bytes_to_mb(BYTES_PER_MB * 3), 3);
        assert_eq!(bytes_to_gb(BYTES_PER_GB + BYTES_PER_GB / 2), 1);
        assert_eq!(bytes_to_gb(0), 0);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(1, 4), 25.0);
        assert_eq!(percent_of(1, 3), 33.3);
        assert_eq!(percent_of(5, 0), 0.0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to(2394.5678, 2), 2394.57);
        assert_eq!(round_to(12.0, 2), 12.0);
    }
}
