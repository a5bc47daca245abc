//! Formatting helpers shared by the generators

pub const NOT_APPLICABLE: &str = "n/a";

/// Milliseconds with three decimals
pub fn format_millis(ms: f64) -> String {
    format!("{ms:.3} ms")
}

/// A mean, or "n/a" when nothing was measured
pub fn format_mean(ms: Option<f64>) -> String {
    ms.map(format_millis)
        .unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

/// Table cell: bare number, or "-" for a phase the job never went through
pub fn format_cell(ms: Option<f64>) -> String {
    ms.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mean() {
        assert_eq!(format_mean(None), "n/a");
        assert_eq!(format_mean(Some(1.5)), "1.500 ms");
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(None), "-");
        assert_eq!(format_cell(Some(0.25)), "0.250");
    }
}
