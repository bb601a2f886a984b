//! # Font Management
//!
//! The document uses two of the 14 standard PDF fonts, Times-Roman and
//! Times-Bold, which viewers supply themselves; nothing is embedded. This
//! module maps a weight to a font and measures text with real AFM widths.

pub mod metrics;

pub use metrics::StandardFontMetrics;

/// The standard fonts the generator draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    TimesRoman,
    TimesBold,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::TimesRoman => &metrics::TIMES_ROMAN,
            Self::TimesBold => &metrics::TIMES_BOLD,
        }
    }

    /// Serif face for the given weight.
    pub fn serif(bold: bool) -> Self {
        if bold {
            Self::TimesBold
        } else {
            Self::TimesRoman
        }
    }
}

/// Shared font context used by layout and PDF serialization.
/// Provides text measurement with real glyph metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontContext;

impl FontContext {
    pub fn new() -> Self {
        Self
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, font: StandardFont, font_size: f64) -> f64 {
        font.metrics().char_width(ch, font_size)
    }

    /// Measure the width of a string in points.
    pub fn measure_string(&self, text: &str, font: StandardFont, font_size: f64) -> f64 {
        font.metrics().measure_string(text, font_size, 0.0)
    }
}
