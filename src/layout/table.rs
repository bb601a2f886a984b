//! # Table Layout
//!
//! Measures and draws bordered tables with row-spanning cells.
//!
//! Column widths are fractions of the available width. Each row is as tall
//! as its tallest single-row cell; a spanning cell that needs more room than
//! its rows provide grows the last row it covers. Borders form a grid in
//! which a spanning cell is one rectangle, so no rules cross a merged cell.

use std::ops::Range;

use crate::font::FontContext;
use crate::richtext::RichText;
use crate::text::{Paragraph, ParagraphStyle, TextLayout};

use super::{paragraph_element, Color, DrawCommand, LayoutElement};

/// Padding inside every cell, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPadding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl CellPadding {
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }
}

/// One slot in a table row.
#[derive(Debug, Clone, PartialEq)]
pub enum TableCell {
    /// A cell that starts in this row and covers `row_span` rows.
    Text { content: RichText, row_span: usize },
    /// A slot covered by a spanning cell from a row above.
    Covered,
}

impl TableCell {
    pub fn text(content: RichText) -> Self {
        Self::Text {
            content,
            row_span: 1,
        }
    }

    pub fn spanning(content: RichText, row_span: usize) -> Self {
        Self::Text {
            content,
            row_span: row_span.max(1),
        }
    }
}

/// A table before measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub column_fractions: Vec<f64>,
    pub padding: CellPadding,
    /// Leading rows repeated at the top of every continuation.
    pub header_rows: usize,
    pub rows: Vec<Vec<TableCell>>,
    pub border_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredCell {
    pub paragraph: Paragraph,
    pub row_span: usize,
}

/// A table with column widths, row heights and wrapped cell text resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredTable {
    pub column_widths: Vec<f64>,
    pub row_heights: Vec<f64>,
    pub cells: Vec<Vec<Option<MeasuredCell>>>,
    pub header_rows: usize,
    pub padding: CellPadding,
    pub border_width: f64,
}

impl Table {
    pub fn measure(&self, width: f64, font_context: &FontContext) -> MeasuredTable {
        let layout = TextLayout::new();
        let column_widths: Vec<f64> = self.column_fractions.iter().map(|f| width * f).collect();
        let row_count = self.rows.len();

        let cells: Vec<Vec<Option<MeasuredCell>>> = self
            .rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(c, cell)| match cell {
                        TableCell::Text { content, row_span } => {
                            let inner = column_widths.get(c).copied().unwrap_or(0.0)
                                - self.padding.horizontal();
                            Some(MeasuredCell {
                                paragraph: layout.layout_paragraph(
                                    font_context,
                                    content,
                                    inner,
                                    ParagraphStyle::body(),
                                ),
                                row_span: (*row_span).clamp(1, row_count - r),
                            })
                        }
                        TableCell::Covered => None,
                    })
                    .collect()
            })
            .collect();

        let pad = self.padding.vertical();
        let mut row_heights: Vec<f64> = cells
            .iter()
            .map(|row| {
                row.iter()
                    .flatten()
                    .filter(|cell| cell.row_span == 1)
                    .map(|cell| cell.paragraph.height() + pad)
                    .fold(pad, f64::max)
            })
            .collect();

        for (r, row) in cells.iter().enumerate() {
            for cell in row.iter().flatten().filter(|cell| cell.row_span > 1) {
                let last = r + cell.row_span - 1;
                let available: f64 = row_heights[r..=last].iter().sum();
                let needed = cell.paragraph.height() + pad;
                if needed > available {
                    row_heights[last] += needed - available;
                }
            }
        }

        MeasuredTable {
            column_widths,
            row_heights,
            cells,
            header_rows: self.header_rows.min(row_count),
            padding: self.padding,
            border_width: self.border_width,
        }
    }
}

impl MeasuredTable {
    pub fn width(&self) -> f64 {
        self.column_widths.iter().sum()
    }

    pub fn height(&self) -> f64 {
        self.row_heights.iter().sum()
    }

    pub fn header_height(&self) -> f64 {
        self.row_heights[..self.header_rows].iter().sum()
    }

    pub fn body_rows(&self) -> Range<usize> {
        self.header_rows..self.row_heights.len()
    }

    /// Body rows partitioned into the smallest runs no spanning cell
    /// crosses. A page break may only fall between two groups.
    pub fn row_groups(&self) -> Vec<Range<usize>> {
        let mut groups = Vec::new();
        let body = self.body_rows();
        let mut start = body.start;
        let mut reach = body.start;
        for r in body.clone() {
            for cell in self.cells[r].iter().flatten() {
                reach = reach.max(r + cell.row_span - 1);
            }
            if reach <= r {
                groups.push(start..r + 1);
                start = r + 1;
                reach = start;
            }
        }
        if start < body.end {
            groups.push(start..body.end);
        }
        groups
    }

    pub fn rows_height(&self, rows: Range<usize>) -> f64 {
        self.row_heights[rows].iter().sum()
    }

    /// Draw the header rows followed by `body` with the top-left corner at
    /// `(x, top)`. Returns the elements and the drawn height.
    pub fn render(&self, x: f64, top: f64, body: Range<usize>) -> (Vec<LayoutElement>, f64) {
        let mut elements = Vec::new();
        let mut y = top;
        let rows = (0..self.header_rows).chain(body.clone());
        for r in rows {
            // Spans never reach past the rendered slice's last row.
            let slice_end = if r < self.header_rows {
                self.header_rows
            } else {
                body.end
            };
            let mut cx = x;
            for (c, slot) in self.cells[r].iter().enumerate() {
                let col_w = self.column_widths[c];
                if let Some(cell) = slot {
                    let last = (r + cell.row_span).min(slice_end);
                    let cell_h = self.rows_height(r..last);
                    self.render_cell(&mut elements, cell, cx, y, col_w, cell_h);
                }
                cx += col_w;
            }
            y -= self.row_heights[r];
        }
        (elements, top - y)
    }

    fn render_cell(
        &self,
        elements: &mut Vec<LayoutElement>,
        cell: &MeasuredCell,
        x: f64,
        top: f64,
        width: f64,
        height: f64,
    ) {
        elements.push(LayoutElement {
            x,
            y: top - height,
            width,
            height,
            draw: DrawCommand::Rect {
                fill: None,
                stroke: Some(Color::BLACK),
                line_width: self.border_width,
            },
        });

        let inner_h = height - self.padding.vertical();
        let slack = (inner_h - cell.paragraph.height()).max(0.0);
        let text_top = top - self.padding.top - slack / 2.0;
        if !cell.paragraph.lines.is_empty() {
            elements.push(paragraph_element(
                &cell.paragraph,
                x + self.padding.left,
                text_top,
                Color::BLACK,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padding() -> CellPadding {
        CellPadding {
            top: 8.0,
            right: 6.0,
            bottom: 8.0,
            left: 6.0,
        }
    }

    fn plain(s: &str) -> TableCell {
        TableCell::text(RichText::plain(s))
    }

    fn table(rows: Vec<Vec<TableCell>>) -> Table {
        Table {
            column_fractions: vec![0.5, 0.5],
            padding: padding(),
            header_rows: 1,
            rows,
            border_width: 1.0,
        }
    }

    fn rects(elements: &[LayoutElement]) -> Vec<&LayoutElement> {
        elements
            .iter()
            .filter(|e| matches!(e.draw, DrawCommand::Rect { .. }))
            .collect()
    }

    #[test]
    fn single_line_rows_are_leading_plus_padding() {
        let t = table(vec![vec![plain("A"), plain("B")], vec![plain("c"), plain("d")]]);
        let m = t.measure(400.0, &FontContext::new());
        assert_eq!(m.row_heights, vec![29.0, 29.0]);
        assert_eq!(m.height(), 58.0);
        assert!((m.width() - 400.0).abs() < 1e-9);
    }

    #[test]
    fn wrapped_cell_makes_row_taller() {
        let long = "Analyze patient and hospital data to improve outcomes, efficiency, and care quality";
        let t = table(vec![vec![plain("A"), plain("B")], vec![plain("x"), plain(long)]]);
        let m = t.measure(200.0, &FontContext::new());
        assert!(m.row_heights[1] > 29.0);
    }

    #[test]
    fn spanning_cell_is_one_rectangle() {
        let t = table(vec![
            vec![plain("Domain"), plain("Role")],
            vec![TableCell::spanning(RichText::bold("Finance"), 2), plain("Analyst")],
            vec![TableCell::Covered, plain("Planner")],
        ]);
        let m = t.measure(400.0, &FontContext::new());
        let (elements, height) = m.render(50.0, 700.0, m.body_rows());
        assert_eq!(height, m.height());
        // 2 header cells + 1 spanning + 2 single cells
        let boxes = rects(&elements);
        assert_eq!(boxes.len(), 5);
        let span_box = boxes[2];
        assert_eq!(span_box.height, m.row_heights[1] + m.row_heights[2]);
    }

    #[test]
    fn tall_spanning_cell_grows_last_row() {
        let tall = "one two three four five six seven eight nine ten eleven twelve thirteen";
        let t = table(vec![
            vec![plain("H"), plain("H")],
            vec![TableCell::spanning(RichText::plain(tall), 2), plain("a")],
            vec![TableCell::Covered, plain("b")],
        ]);
        let m = t.measure(120.0, &FontContext::new());
        let span = &m.cells[1][0].as_ref().unwrap().paragraph;
        let needed = span.height() + padding().vertical();
        assert!(needed > 58.0);
        assert_eq!(m.row_heights[1], 29.0);
        assert!((m.row_heights[1] + m.row_heights[2] - needed).abs() < 1e-9);
    }

    #[test]
    fn row_groups_follow_spans() {
        let t = table(vec![
            vec![plain("H"), plain("H")],
            vec![TableCell::spanning(RichText::plain("F"), 2), plain("a")],
            vec![TableCell::Covered, plain("b")],
            vec![plain("S"), plain("c")],
        ]);
        let m = t.measure(400.0, &FontContext::new());
        assert_eq!(m.row_groups(), vec![1..3, 3..4]);
    }

    #[test]
    fn span_is_clamped_to_table_end() {
        let t = table(vec![
            vec![plain("H"), plain("H")],
            vec![TableCell::spanning(RichText::plain("F"), 5), plain("a")],
        ]);
        let m = t.measure(400.0, &FontContext::new());
        assert_eq!(m.cells[1][0].as_ref().unwrap().row_span, 1);
    }

    #[test]
    fn text_is_vertically_centred() {
        let long = "Predict financial risks, detect anomalies, and strengthen budgeting & planning";
        let t = table(vec![vec![plain("short"), plain(long)]]);
        let m = t.measure(200.0, &FontContext::new());
        let (elements, _) = m.render(0.0, 500.0, m.body_rows());
        let texts: Vec<&LayoutElement> = elements
            .iter()
            .filter(|e| matches!(e.draw, DrawCommand::Text { .. }))
            .collect();
        let short_top = texts[0].y + texts[0].height;
        let long_top = texts[1].y + texts[1].height;
        assert!(short_top < long_top, "single line should sit lower");
        assert_eq!(long_top, 500.0 - 8.0);
    }
}
