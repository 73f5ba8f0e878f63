use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::atlas::{GlyphAtlas, GlyphRegion};
use crate::color::PackedColor;
use crate::{Axis, GridError};

// ── CellStyle ─────────────────────────────────────────────────────────────────

/// Optional color pair for a write call.
///
/// `None` fields resolve against the grid's current default colors at write
/// time.  Both the packed and the high-level color forms convert in:
///
/// ```
/// use glyphgrid::{CellStyle, Color, PackedColor};
/// let a = CellStyle::fg(Color::YELLOW);
/// let b = CellStyle::fg(PackedColor(0xFFFF_00FF));
/// assert_eq!(a, b);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CellStyle {
    pub foreground: Option<PackedColor>,
    pub background: Option<PackedColor>,
}

impl CellStyle {
    pub fn new(foreground: impl Into<PackedColor>, background: impl Into<PackedColor>) -> Self {
        Self {
            foreground: Some(foreground.into()),
            background: Some(background.into()),
        }
    }

    /// Explicit foreground, default background.
    pub fn fg(foreground: impl Into<PackedColor>) -> Self {
        Self { foreground: Some(foreground.into()), background: None }
    }

    /// Explicit background, default foreground.
    pub fn bg(background: impl Into<PackedColor>) -> Self {
        Self { foreground: None, background: Some(background.into()) }
    }
}

// ── Cell ──────────────────────────────────────────────────────────────────────

/// Read-back snapshot of one grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub glyph: u32,
    pub foreground: PackedColor,
    pub background: PackedColor,
}

// ── GlyphBatch ────────────────────────────────────────────────────────────────

/// Receiver for the quads emitted by [`Grid::draw`].
///
/// Implemented by the wgpu [`crate::renderer::QuadBatch`]; tests implement it
/// to record the call sequence.  The contract mirrors a classic sprite batch:
/// a current tint color applied to every subsequent quad until changed.
pub trait GlyphBatch {
    /// Set the tint for subsequent quads.
    fn set_color(&mut self, color: PackedColor);
    /// One quad of the grid's solid background tile.
    fn draw_fill(&mut self, x: f32, y: f32, w: f32, h: f32);
    /// One quad of an atlas glyph region.
    fn draw_region(&mut self, region: GlyphRegion, x: f32, y: f32, w: f32, h: f32);
}

// ── Grid ──────────────────────────────────────────────────────────────────────

/// A fixed-size terminal-style grid of glyph cells.
///
/// Each cell holds a glyph code plus foreground and background colors in
/// three parallel flat buffers indexed `y * width + x`.  The grid never
/// resizes; writes are bounds-checked and rejected whole.  `draw` replays the
/// full grid into a batch every call — there is no dirty tracking.
pub struct Grid {
    width: u32,
    height: u32,
    atlas: Arc<GlyphAtlas>,

    glyphs: Vec<u32>,
    foreground: Vec<PackedColor>,
    background: Vec<PackedColor>,

    /// Solid white tile, one glyph cell in size; drawn tinted under every
    /// glyph as the cell background.
    background_tile: RgbaImage,

    default_foreground: PackedColor,
    default_background: PackedColor,
}

impl Grid {
    /// Create a `width × height` grid drawing from `atlas`.
    ///
    /// The atlas handle is shared — several grids may render from the same
    /// tileset.  All cells start as glyph 0 with the default colors (white
    /// on black).
    ///
    /// # Panics
    /// Panics if `width` or `height` is zero.
    pub fn new(atlas: Arc<GlyphAtlas>, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be non-zero");

        let cells = (width * height) as usize;
        let background_tile = RgbaImage::from_pixel(
            atlas.glyph_width(),
            atlas.glyph_height(),
            Rgba([255, 255, 255, 255]),
        );

        Self {
            width,
            height,
            atlas,
            glyphs: vec![0; cells],
            foreground: vec![PackedColor::WHITE; cells],
            background: vec![PackedColor::BLACK; cells],
            background_tile,
            default_foreground: PackedColor::WHITE,
            default_background: PackedColor::BLACK,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn atlas(&self) -> &Arc<GlyphAtlas> {
        &self.atlas
    }

    /// The solid white background tile, for texture upload by a renderer.
    pub fn background_tile(&self) -> &RgbaImage {
        &self.background_tile
    }

    pub fn default_foreground(&self) -> PackedColor {
        self.default_foreground
    }

    pub fn default_background(&self) -> PackedColor {
        self.default_background
    }

    /// Set the foreground used when a write omits one and by `clear`.
    pub fn set_default_foreground(&mut self, color: impl Into<PackedColor>) {
        self.default_foreground = color.into();
    }

    /// Set the background used when a write omits one and by `clear`.
    pub fn set_default_background(&mut self, color: impl Into<PackedColor>) {
        self.default_background = color.into();
    }

    /// Read one cell back.
    pub fn cell(&self, x: u32, y: u32) -> Result<Cell, GridError> {
        let i = self.index(x, y)?;
        Ok(Cell {
            glyph: self.glyphs[i],
            foreground: self.foreground[i],
            background: self.background[i],
        })
    }

    fn index(&self, x: u32, y: u32) -> Result<usize, GridError> {
        if x >= self.width {
            return Err(GridError::OutOfRange { axis: Axis::X, value: x, limit: self.width });
        }
        if y >= self.height {
            return Err(GridError::OutOfRange { axis: Axis::Y, value: y, limit: self.height });
        }
        Ok((y * self.width + x) as usize)
    }

    // ── Writes ─────────────────────────────────────────────────────────────

    /// Write one glyph cell.
    ///
    /// Omitted style colors resolve to the grid defaults.  Rejects
    /// coordinates outside the grid, naming the violated axis; nothing else
    /// is touched.
    pub fn write(&mut self, code: u32, x: u32, y: u32, style: CellStyle) -> Result<(), GridError> {
        let i = self.index(x, y)?;
        self.put(i, code, style);
        Ok(())
    }

    fn put(&mut self, i: usize, code: u32, style: CellStyle) {
        self.glyphs[i] = code;
        self.foreground[i] = style.foreground.unwrap_or(self.default_foreground);
        self.background[i] = style.background.unwrap_or(self.default_background);
    }

    /// Write a string one glyph per char, left to right from `(x, y)`.
    ///
    /// Each char's code point becomes the cell's glyph code.  The write is
    /// all-or-nothing: a string running past the right edge is rejected with
    /// [`GridError::CapacityExceeded`] before any cell changes, and there is
    /// no wrapping.
    pub fn write_str(
        &mut self,
        text: &str,
        x: u32,
        y: u32,
        style: CellStyle,
    ) -> Result<(), GridError> {
        let len = text.chars().count() as u32;
        if x as u64 + len as u64 > self.width as u64 {
            return Err(GridError::CapacityExceeded { x, len, width: self.width });
        }
        if len == 0 {
            return Ok(());
        }
        // Validate the row up front so a bad y also leaves the grid untouched.
        let start = self.index(x, y)?;
        for (i, ch) in text.chars().enumerate() {
            self.put(start + i, ch as u32, style);
        }
        Ok(())
    }

    /// Write a string horizontally centred on row `y`.
    ///
    /// The start column is `(width − len) / 2` (integer); a string wider
    /// than the grid fails the same way [`Grid::write_str`] would.
    pub fn write_centered(
        &mut self,
        text: &str,
        y: u32,
        style: CellStyle,
    ) -> Result<(), GridError> {
        let len = text.chars().count() as u32;
        if len > self.width {
            return Err(GridError::CapacityExceeded { x: 0, len, width: self.width });
        }
        self.write_str(text, (self.width - len) / 2, y, style)
    }

    // ── Clears ─────────────────────────────────────────────────────────────

    /// Reset every cell to glyph 0 and the current default colors.
    pub fn clear(&mut self) {
        self.glyphs.fill(0);
        self.foreground.fill(self.default_foreground);
        self.background.fill(self.default_background);
    }

    /// Reset the cells in the half-open rectangle `[x, x+w) × [y, y+h)`.
    ///
    /// The rectangle must start inside the grid and fit within it:
    /// `x < width`, `y < height`, `x + w <= width`, `y + h <= height`.
    pub fn clear_region(&mut self, x: u32, y: u32, w: u32, h: u32) -> Result<(), GridError> {
        self.index(x, y)?;
        // Reject by the last covered index so the error names the usual
        // [0, limit) interval.
        if w > 0 && x as u64 + w as u64 > self.width as u64 {
            return Err(GridError::OutOfRange {
                axis: Axis::X,
                value: x.saturating_add(w - 1),
                limit: self.width,
            });
        }
        if h > 0 && y as u64 + h as u64 > self.height as u64 {
            return Err(GridError::OutOfRange {
                axis: Axis::Y,
                value: y.saturating_add(h - 1),
                limit: self.height,
            });
        }

        let defaults = CellStyle::new(self.default_foreground, self.default_background);
        for row in y..y + h {
            for col in x..x + w {
                let i = (row * self.width + col) as usize;
                self.put(i, 0, defaults);
            }
        }
        Ok(())
    }

    // ── Draw ───────────────────────────────────────────────────────────────

    /// Replay the whole grid into `batch`.
    ///
    /// Every cell emits two quads at `(x*scaling, y*scaling)`, each
    /// `scaling × scaling` in size: the background tile tinted with the cell
    /// background, then the glyph region tinted with the cell foreground.
    /// A stored glyph code outside the atlas range surfaces the lookup error
    /// unchanged.
    pub fn draw<B: GlyphBatch>(&self, batch: &mut B, scaling: f32) -> Result<(), GridError> {
        for x in 0..self.width {
            for y in 0..self.height {
                let i = (y * self.width + x) as usize;
                let px = x as f32 * scaling;
                let py = y as f32 * scaling;

                batch.set_color(self.background[i]);
                batch.draw_fill(px, py, scaling, scaling);

                let region = self.atlas.get(self.glyphs[i])?;
                batch.set_color(self.foreground[i]);
                batch.draw_region(region, px, py, scaling, scaling);
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
