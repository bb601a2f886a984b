//! # Text Layout
//!
//! Line breaking and paragraph measurement for rich text.
//!
//! Lines are filled greedily. Break opportunities come from UAX#14, so
//! breaks land after spaces and hyphens rather than mid-word; a word wider
//! than the line is force-broken at the last character that fits.

use crate::font::{FontContext, StandardFont};
use crate::richtext::RichText;
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// Typography of a paragraph. All values in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParagraphStyle {
    pub font_size: f64,
    pub leading: f64,
    /// Indent applied to every line.
    pub left_indent: f64,
    /// Extra indent of the first line, relative to `left_indent`. Negative
    /// values give a hanging indent.
    pub first_line_indent: f64,
}

impl ParagraphStyle {
    /// Serif 11 on 13, left aligned.
    pub const fn body() -> Self {
        Self {
            font_size: 11.0,
            leading: 13.0,
            left_indent: 0.0,
            first_line_indent: 0.0,
        }
    }

    /// Body style with a 7pt hanging indent for "• " bullets.
    pub const fn bullet() -> Self {
        Self {
            left_indent: 7.0,
            first_line_indent: -7.0,
            ..Self::body()
        }
    }
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self::body()
    }
}

/// A character tagged with its weight, for multi-style line breaking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyledChar {
    pub ch: char,
    pub bold: bool,
}

/// A run of same-font text within one line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub font: StandardFont,
    pub font_size: f64,
    /// Offset from the start of the line.
    pub x_offset: f64,
    pub width: f64,
}

/// A line of text from multi-style (runs) line breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct RunBrokenLine {
    pub chars: Vec<StyledChar>,
    pub char_positions: Vec<f64>,
    pub width: f64,
}

/// One laid-out line of a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphLine {
    /// Offset from the paragraph's left edge (indents).
    pub indent: f64,
    pub spans: Vec<TextSpan>,
    pub width: f64,
}

/// A paragraph broken into lines for a given width.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub lines: Vec<ParagraphLine>,
    pub style: ParagraphStyle,
}

impl Paragraph {
    /// Height of the paragraph: one leading per line.
    pub fn height(&self) -> f64 {
        self.lines.len() as f64 * self.style.leading
    }

    /// Width of the widest line, including its indent.
    pub fn max_line_width(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| l.indent + l.width)
            .fold(0.0, f64::max)
    }
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Returns a vec of length `text.chars().count()`. Each entry is the break
/// opportunity *before* that character position. Index 0 is always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() yields byte offsets of the position after the break.
    let byte_to_char: Vec<usize> = {
        let mut map = vec![0usize; text.len() + 1];
        for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
            map[byte_idx] = char_idx;
        }
        map[text.len()] = char_count;
        map
    };

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextLayout;

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Lay out rich text as a paragraph within `width`.
    pub fn layout_paragraph(
        &self,
        font_context: &FontContext,
        text: &RichText,
        width: f64,
        style: ParagraphStyle,
    ) -> Paragraph {
        let chars: Vec<StyledChar> = text
            .segments
            .iter()
            .flat_map(|seg| seg.text.chars().map(move |ch| StyledChar { ch, bold: seg.bold }))
            .collect();

        let first_indent = (style.left_indent + style.first_line_indent).max(0.0);
        let rest_indent = style.left_indent.max(0.0);
        let broken = self.break_runs_into_lines(
            font_context,
            &chars,
            style.font_size,
            width - first_indent,
            width - rest_indent,
        );

        let lines = broken
            .into_iter()
            .enumerate()
            .map(|(i, line)| ParagraphLine {
                indent: if i == 0 { first_indent } else { rest_indent },
                spans: Self::group_spans(&line, style.font_size),
                width: line.width,
            })
            .collect();

        Paragraph { lines, style }
    }

    /// Break multi-style text into lines. The first line may have a
    /// different width from the rest (hanging indents).
    pub fn break_runs_into_lines(
        &self,
        font_context: &FontContext,
        chars: &[StyledChar],
        font_size: f64,
        first_width: f64,
        rest_width: f64,
    ) -> Vec<RunBrokenLine> {
        if chars.is_empty() {
            return vec![];
        }

        let char_widths: Vec<f64> = chars
            .iter()
            .map(|sc| font_context.char_width(sc.ch, StandardFont::serif(sc.bold), font_size))
            .collect();

        let plain_text: String = chars.iter().map(|sc| sc.ch).collect();
        let break_opps = compute_break_opportunities(&plain_text);

        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width = 0.0;
        let mut last_break_point: Option<usize> = None;

        for (i, sc) in chars.iter().enumerate() {
            let char_width = char_widths[i];
            let max_width = if lines.is_empty() {
                first_width
            } else {
                rest_width
            };

            if i > 0 {
                match break_opps[i] {
                    Some(BreakOpportunity::Mandatory) => {
                        let end = if is_newline(chars[i - 1].ch) { i - 1 } else { i };
                        lines.push(self.make_run_line(
                            &chars[line_start..end],
                            &char_widths[line_start..end],
                        ));
                        line_start = i;
                        line_width = 0.0;
                        last_break_point = None;
                    }
                    Some(BreakOpportunity::Allowed) => {
                        last_break_point = Some(i - 1);
                    }
                    None => {}
                }
            }

            if is_newline(sc.ch) {
                continue;
            }

            if line_width + char_width > max_width && line_start < i {
                if let Some(bp) = last_break_point.filter(|&bp| bp >= line_start) {
                    let break_at = bp + 1;
                    lines.push(self.make_run_line(
                        &chars[line_start..break_at],
                        &char_widths[line_start..break_at],
                    ));
                    line_start = break_at;
                    line_width = chars[line_start..=i]
                        .iter()
                        .zip(&char_widths[line_start..=i])
                        .filter(|(c, _)| !is_newline(c.ch))
                        .map(|(_, w)| w)
                        .sum();
                    last_break_point = None;
                    continue;
                }

                // No break opportunity on this line: force a break here.
                lines.push(
                    self.make_run_line(&chars[line_start..i], &char_widths[line_start..i]),
                );
                line_start = i;
                line_width = char_width;
                last_break_point = None;
                continue;
            }

            line_width += char_width;
        }

        if line_start < chars.len() {
            let tail: Vec<StyledChar> = chars[line_start..]
                .iter()
                .copied()
                .filter(|c| !is_newline(c.ch))
                .collect();
            let tail_widths: Vec<f64> = chars[line_start..]
                .iter()
                .zip(&char_widths[line_start..])
                .filter(|(c, _)| !is_newline(c.ch))
                .map(|(_, w)| *w)
                .collect();
            lines.push(self.make_run_line(&tail, &tail_widths));
        }

        lines
    }

    /// Create a RunBrokenLine from characters and their widths. Trailing
    /// spaces do not count towards the line width.
    fn make_run_line(&self, chars: &[StyledChar], widths: &[f64]) -> RunBrokenLine {
        let mut positions = Vec::with_capacity(chars.len());
        let mut x = 0.0;
        for &w in widths {
            positions.push(x);
            x += w;
        }

        let mut effective_width = x;
        let mut i = chars.len();
        while i > 0 && chars[i - 1].ch == ' ' {
            i -= 1;
            effective_width -= widths[i];
        }

        RunBrokenLine {
            chars: chars.to_vec(),
            char_positions: positions,
            width: effective_width,
        }
    }

    /// Collapse a broken line into same-font spans.
    fn group_spans(line: &RunBrokenLine, font_size: f64) -> Vec<TextSpan> {
        let mut spans: Vec<TextSpan> = Vec::new();
        for (i, sc) in line.chars.iter().enumerate() {
            let font = StandardFont::serif(sc.bold);
            let x = line.char_positions[i];
            let next_x = line
                .char_positions
                .get(i + 1)
                .copied()
                .unwrap_or_else(|| x + font.metrics().char_width(sc.ch, font_size));
            match spans.last_mut() {
                Some(span) if span.font == font => {
                    span.text.push(sc.ch);
                    span.width = next_x - span.x_offset;
                }
                _ => spans.push(TextSpan {
                    text: sc.ch.to_string(),
                    font,
                    font_size,
                    x_offset: x,
                    width: next_x - x,
                }),
            }
        }
        spans
    }
}

/// Measure and break rich text in one call.
pub fn layout_paragraph(text: &RichText, width: f64, style: ParagraphStyle) -> Paragraph {
    TextLayout::new().layout_paragraph(&FontContext::new(), text, width, style)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_lines(p: &Paragraph) -> Vec<String> {
        p.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.text.as_str()).collect::<String>())
            .collect()
    }

    #[test]
    fn short_text_is_one_line() {
        let p = layout_paragraph(&RichText::parse("Hello world"), 400.0, ParagraphStyle::body());
        assert_eq!(p.lines.len(), 1);
        assert_eq!(p.height(), 13.0);
    }

    #[test]
    fn empty_text_has_no_height() {
        let p = layout_paragraph(&RichText::parse(""), 400.0, ParagraphStyle::body());
        assert!(p.lines.is_empty());
        assert_eq!(p.height(), 0.0);
    }

    #[test]
    fn wraps_at_spaces_within_width() {
        let text = "Improve profitability, forecasting accuracy, and cost control using financial data";
        let p = layout_paragraph(&RichText::parse(text), 120.0, ParagraphStyle::body());
        assert!(p.lines.len() > 1);
        for line in &p.lines {
            assert!(line.width <= 120.0 + 1e-9, "line too wide: {}", line.width);
        }
        let rejoined: String = plain_lines(&p).concat();
        assert_eq!(rejoined, text);
        assert!(plain_lines(&p).iter().all(|l| !l.starts_with(' ')));
    }

    #[test]
    fn long_word_is_force_broken() {
        let p = layout_paragraph(
            &RichText::parse("Supercalifragilisticexpialidocious"),
            40.0,
            ParagraphStyle::body(),
        );
        assert!(p.lines.len() > 1);
        assert!(p.lines.iter().all(|l| l.width <= 40.0 + 1e-9));
    }

    #[test]
    fn newline_forces_a_break() {
        let p = layout_paragraph(&RichText::parse("one\ntwo"), 400.0, ParagraphStyle::body());
        assert_eq!(plain_lines(&p), vec!["one", "two"]);
    }

    #[test]
    fn bold_runs_become_separate_spans() {
        let p = layout_paragraph(
            &RichText::parse("Join <b>Analytics Avenue</b> today"),
            400.0,
            ParagraphStyle::body(),
        );
        let spans = &p.lines[0].spans;
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1].font, StandardFont::TimesBold);
        assert_eq!(spans[1].text, "Analytics Avenue");
        assert!(spans[1].x_offset > 0.0);
        assert!((spans[2].x_offset - (spans[1].x_offset + spans[1].width)).abs() < 1e-9);
    }

    #[test]
    fn bullet_style_hangs_the_first_line() {
        let text = "\u{2022} Machine Learning & Gen AI (LLMs, Prompt Engineering, RAG Pipelines, Embeddings, Vector Databases)";
        let p = layout_paragraph(&RichText::parse(text), 150.0, ParagraphStyle::bullet());
        assert!(p.lines.len() > 1);
        assert_eq!(p.lines[0].indent, 0.0);
        assert_eq!(p.lines[1].indent, 7.0);
    }
}
