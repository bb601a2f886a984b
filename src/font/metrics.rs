//! Advance widths for the standard Times faces, in 1/1000 em, taken from the
//! Adobe core font metrics. Only the printable ASCII range is tabled; the few
//! WinAnsi punctuation marks the generator emits are special-cased.

/// Widths for a single standard font.
pub struct StandardFontMetrics {
    /// Widths of U+0020 ..= U+007E.
    ascii: &'static [u16; 95],
    /// Width used for characters without an entry.
    default_width: u16,
    quote_double: u16,
}

impl StandardFontMetrics {
    /// Width of one character in units of 1/1000 em.
    pub fn glyph_width(&self, ch: char) -> u16 {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) {
            return self.ascii[(cp - 0x20) as usize];
        }
        match ch {
            '\u{00A0}' => self.ascii[0],
            '\u{2022}' => 350,
            '\u{2013}' => 500,
            '\u{2014}' => 1000,
            '\u{2026}' => 1000,
            '\u{2018}' | '\u{2019}' => 333,
            '\u{201C}' | '\u{201D}' => self.quote_double,
            '\u{00AD}' => 0,
            _ => self.default_width,
        }
    }

    /// Width of one character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.glyph_width(ch) as f64 * font_size / 1000.0
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size) + letter_spacing)
            .sum()
    }
}

#[rustfmt::skip]
static TIMES_ROMAN_ASCII: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    250, 333, 408, 500, 500, 833, 778, 333, 333, 333, 500, 564, 250, 333, 250, 278,
    // 0-9
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    // : ; < = > ? @
    278, 278, 564, 564, 564, 444, 921,
    // A-Z
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
    // [ \ ] ^ _ `
    333, 278, 333, 469, 500, 333,
    // a-z
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
    // { | } ~
    480, 200, 480, 541,
];

#[rustfmt::skip]
static TIMES_BOLD_ASCII: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 333, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 930,
    722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944,
    722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667,
    333, 278, 333, 581, 500, 333,
    500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833,
    556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444,
    394, 220, 394, 520,
];

pub(crate) static TIMES_ROMAN: StandardFontMetrics = StandardFontMetrics {
    ascii: &TIMES_ROMAN_ASCII,
    default_width: 500,
    quote_double: 444,
};

pub(crate) static TIMES_BOLD: StandardFontMetrics = StandardFontMetrics {
    ascii: &TIMES_BOLD_ASCII,
    default_width: 500,
    quote_double: 500,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_cover_printable_ascii() {
        assert_eq!(TIMES_ROMAN.glyph_width(' '), 250);
        assert_eq!(TIMES_ROMAN.glyph_width('A'), 722);
        assert_eq!(TIMES_ROMAN.glyph_width('m'), 778);
        assert_eq!(TIMES_ROMAN.glyph_width('~'), 541);
        assert_eq!(TIMES_BOLD.glyph_width('W'), 1000);
        assert_eq!(TIMES_BOLD.glyph_width('~'), 520);
    }

    #[test]
    fn special_punctuation() {
        assert_eq!(TIMES_ROMAN.glyph_width('\u{2022}'), 350);
        assert_eq!(TIMES_BOLD.glyph_width('\u{2013}'), 500);
        assert_eq!(TIMES_ROMAN.glyph_width('\u{4E2D}'), 500);
    }

    #[test]
    fn measure_string_scales_with_size() {
        let w = TIMES_ROMAN.measure_string("SQL", 11.0, 0.0);
        // S 556 + Q 722 + L 611 = 1889 units
        assert!((w - 1.889 * 11.0).abs() < 1e-9);
    }
}
