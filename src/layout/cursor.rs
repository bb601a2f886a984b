//! # Page Layout Cursor
//!
//! A vertical position tracker for placing blocks down a fixed-size page.
//!
//! Coordinates are PDF user space: the origin is the bottom-left corner of
//! the page and `y` grows upward, so the cursor starts near the top and
//! decreases as blocks are placed. A block is anchored by its top-left
//! corner at the cursor's current `y`.

use thiserror::Error;

/// A4 portrait, in points.
pub const A4_WIDTH: f64 = 595.28;
pub const A4_HEIGHT: f64 = 841.89;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum LayoutError {
    #[error("invalid block height {0}: heights must be finite and non-negative")]
    InvalidHeight(f64),
    #[error("invalid gap {0}: gaps must be finite and non-negative")]
    InvalidGap(f64),
}

/// Page margins in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    /// Inset of the outer border rectangle from the page edge.
    pub page_border: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 50.0,
            right: 50.0,
            top: 15.0,
            bottom: 50.0,
            page_border: 10.0,
        }
    }
}

/// Page size plus margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
}

impl PageGeometry {
    pub fn a4() -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margins: Margins::default(),
        }
    }

    /// Left content edge (`L`).
    pub fn left(&self) -> f64 {
        self.margins.left
    }

    /// Right content edge (`R`).
    pub fn right(&self) -> f64 {
        self.width - self.margins.right
    }

    /// Available content width (`W = R - L`).
    pub fn content_width(&self) -> f64 {
        self.right() - self.left()
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Inter-block gaps, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    pub section: f64,
    pub heading: f64,
    pub bullet: f64,
    pub paragraph: f64,
    pub table_row: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            section: 18.0,
            heading: 10.0,
            bullet: 5.0,
            paragraph: 12.0,
            table_row: 4.0,
        }
    }
}

/// The gap that follows a placed block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gap {
    Section,
    Heading,
    Bullet,
    Paragraph,
    TableRow,
    Custom(f64),
    None,
}

impl Spacing {
    pub fn resolve(&self, gap: Gap) -> f64 {
        match gap {
            Gap::Section => self.section,
            Gap::Heading => self.heading,
            Gap::Bullet => self.bullet,
            Gap::Paragraph => self.paragraph,
            Gap::TableRow => self.table_row,
            Gap::Custom(points) => points,
            Gap::None => 0.0,
        }
    }
}

/// Tracks the next placement position on one page.
#[derive(Debug, Clone)]
pub struct LayoutCursor {
    y: f64,
    geometry: PageGeometry,
    spacing: Spacing,
}

impl LayoutCursor {
    /// Start below the header: `y = page_height - reserved_header_height -
    /// fixed_top_offset`.
    pub fn new(geometry: PageGeometry, reserved_header_height: f64, fixed_top_offset: f64) -> Self {
        Self {
            y: geometry.height - reserved_header_height - fixed_top_offset,
            geometry,
            spacing: Spacing::default(),
        }
    }

    /// Start at an explicit position.
    pub fn at(geometry: PageGeometry, y: f64) -> Self {
        Self {
            y,
            geometry,
            spacing: Spacing::default(),
        }
    }

    pub fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn spacing(&self) -> &Spacing {
        &self.spacing
    }

    pub fn left(&self) -> f64 {
        self.geometry.left()
    }

    pub fn right(&self) -> f64 {
        self.geometry.right()
    }

    pub fn available_width(&self) -> f64 {
        self.geometry.content_width()
    }

    /// Distance from the cursor down to the bottom margin. Negative once the
    /// page has overflowed.
    pub fn remaining_height(&self) -> f64 {
        self.y - self.geometry.margins.bottom
    }

    /// Whether a block of height `h` would end above the bottom margin.
    pub fn fits(&self, h: f64) -> bool {
        self.y - h >= self.geometry.margins.bottom
    }

    /// Place a block of measured height `h` at the current position and
    /// advance past it and the following gap. Returns the new `y`.
    pub fn place(&mut self, h: f64, gap: Gap) -> Result<f64, LayoutError> {
        if !h.is_finite() || h < 0.0 {
            return Err(LayoutError::InvalidHeight(h));
        }
        let gap = self.gap_points(gap)?;
        self.y -= h + gap;
        Ok(self.y)
    }

    /// Move down by a gap without placing anything.
    pub fn advance(&mut self, gap: Gap) -> Result<f64, LayoutError> {
        self.place(0.0, gap)
    }

    /// Overflow guard for a fixed-height box: when the box would cross the
    /// bottom margin, lift the cursor to `bottom + box_height + clearance`.
    /// Returns whether the cursor moved.
    pub fn guard_fixed_box(&mut self, box_height: f64, clearance: f64) -> bool {
        let bottom = self.geometry.margins.bottom;
        if self.y - box_height < bottom {
            self.y = bottom + box_height + clearance;
            true
        } else {
            false
        }
    }

    fn gap_points(&self, gap: Gap) -> Result<f64, LayoutError> {
        let points = self.spacing.resolve(gap);
        if !points.is_finite() || points < 0.0 {
            return Err(LayoutError::InvalidGap(points));
        }
        Ok(points)
    }
}
