//! Pure display metrics derived from origin and output sizes.

const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

/// Human-readable size: plain bytes below 1 KB, otherwise 1024-based units
/// with two decimals.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// Relative change from `original` to `new`. Negative means the image shrank.
/// A zero-byte original is degenerate and reported as no change.
pub fn decrease_rate(original: u64, new: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (new as f64 - original as f64) / original as f64
}

/// `|rate|` as a percentage with two decimals, e.g. `"50.00%"`.
pub fn format_rate(rate: f64) -> String {
    format!("{:.2}%", rate.abs() * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTrend {
    Shrunk,
    /// Grew or stayed the same.
    Grew,
}

impl SizeTrend {
    pub fn between(original: u64, new: u64) -> Self {
        if new < original {
            SizeTrend::Shrunk
        } else {
            SizeTrend::Grew
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_below_one_kilobyte_are_plain_bytes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn sizes_scale_through_units() {
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
        assert_eq!(format_size(2048 * 1024 * 1024 * 1024), "2048.00 TB");
    }

    #[test]
    fn decrease_rate_sign_tracks_direction() {
        assert_eq!(decrease_rate(100, 50), -0.5);
        assert_eq!(decrease_rate(50, 100), 1.0);
        assert_eq!(decrease_rate(0, 50), 0.0);
        assert_eq!(decrease_rate(0, 0), 0.0);
    }

    #[test]
    fn rate_formatting_drops_sign() {
        assert_eq!(format_rate(-0.5), "50.00%");
        assert_eq!(format_rate(0.123456), "12.35%");
    }

    #[test]
    fn equal_size_is_not_a_shrink() {
        assert_eq!(SizeTrend::between(10, 9), SizeTrend::Shrunk);
        assert_eq!(SizeTrend::between(10, 10), SizeTrend::Grew);
        assert_eq!(SizeTrend::between(10, 11), SizeTrend::Grew);
    }
}
