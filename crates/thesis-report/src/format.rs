//! Cell values and APA number formatting

use serde::{Serialize, Serializer};
use std::fmt;

/// Decimals used for every numeric cell
///
/// Record values are already rounded to this precision, so a rendered cell
/// parses back to the exact value stored in the record.
pub const CELL_DECIMALS: usize = 4;

/// Placeholder for a cell with no value
pub const DASH: &str = "—";

/// APA p-value: `< .001`, otherwise three decimals without the leading zero
pub fn format_p_value(p: f64) -> String {
    if p < 0.001 {
        return "< .001".to_string();
    }
    let s = format!("{p:.3}");
    match s.strip_prefix('0') {
        Some(rest) => rest.to_string(),
        None => s,
    }
}

/// Fixed-decimal number, or a dash when the value is not finite
pub fn format_fixed(x: f64, decimals: usize) -> String {
    if x.is_finite() {
        format!("{x:.decimals$}")
    } else {
        DASH.to_string()
    }
}

/// One table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Count(usize),
    PValue(f64),
    Interval(f64, f64),
    /// Rendered as a dash
    Empty,
    /// Rendered as nothing, for the upper triangle of a matrix
    Blank,
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Number or a dash when absent
    pub fn maybe(x: Option<f64>) -> Self {
        x.map_or(Self::Empty, Self::Number)
    }

    pub fn interval((lo, hi): (f64, f64)) -> Self {
        Self::Interval(lo, hi)
    }

    pub fn yes_no(flag: bool) -> Self {
        Self::text(if flag { "Yes" } else { "No" })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number(_) | Self::Count(_))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(x) => f.write_str(&format_fixed(*x, CELL_DECIMALS)),
            Self::Count(n) => write!(f, "{n}"),
            Self::PValue(p) => f.write_str(&format_p_value(*p)),
            Self::Interval(lo, hi) => write!(
                f,
                "[{}, {}]",
                format_fixed(*lo, CELL_DECIMALS),
                format_fixed(*hi, CELL_DECIMALS)
            ),
            Self::Empty => f.write_str(DASH),
            Self::Blank => Ok(()),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apa_p_values() {
        assert_eq!(format_p_value(0.0001), "< .001");
        assert_eq!(format_p_value(0.001), ".001");
        assert_eq!(format_p_value(0.0312), ".031");
        assert_eq!(format_p_value(0.5), ".500");
        assert_eq!(format_p_value(1.0), "1.000");
    }

    #[test]
    fn test_cells_render() {
        assert_eq!(Cell::Number(-5.0).to_string(), "-5.0000");
        assert_eq!(Cell::Number(f64::INFINITY).to_string(), DASH);
        assert_eq!(Cell::Count(8).to_string(), "8");
        assert_eq!(Cell::interval((-1.25, 0.5)).to_string(), "[-1.2500, 0.5000]");
        assert_eq!(Cell::maybe(None).to_string(), DASH);
        assert_eq!(Cell::Blank.to_string(), "");
        assert_eq!(serde_json::to_value(Cell::PValue(0.0)).unwrap(), "< .001");
    }
}
