//! Conversion statistics reported after every render.
//!
//! ```text
//! Processed size: 1200x800, bytes: 48213 (87.41% reduction)
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionStats {
    pub original_bytes: usize,
    pub output_bytes: usize,
    pub width: u32,
    pub height: u32,
}

impl ConversionStats {
    /// Size reduction relative to the source, rounded to two decimals.
    /// Negative when the output is larger than the source.
    pub fn reduction_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        let original = self.original_bytes as f64;
        let saved = original - self.output_bytes as f64;
        (saved / original * 10_000.0).round() / 100.0
    }
}

impl fmt::Display for ConversionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed size: {}x{}, bytes: {} ({:.2}% reduction)",
            self.width,
            self.height,
            self.output_bytes,
            self.reduction_percent()
        )
    }
}
