pub mod atlas;
pub mod color;
pub mod grid;
pub mod renderer;

pub use atlas::{GlyphAtlas, GlyphRegion, TilesetSpec, default_atlas};
pub use color::{Color, PackedColor};
pub use grid::{Cell, CellStyle, GlyphBatch, Grid};

/// Built-in 8×8 CP437 tileset embedded at compile time (16×16 cells,
/// white glyphs on a transparent background).
pub const DEFAULT_TILESET: &[u8] = include_bytes!("../resources/cp437_8x8.png");
pub const DEFAULT_GLYPH_W: u32 = 8;
pub const DEFAULT_GLYPH_H: u32 = 8;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Axis named by an out-of-range coordinate rejection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Argument-validation failures surfaced by [`Grid`] and [`GlyphAtlas`].
///
/// All variants are synchronous rejections: the offending call mutates
/// nothing, and nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A cell coordinate fell outside its valid interval.
    #[error("{axis} should be in range [0, {limit}), got {value}")]
    OutOfRange { axis: Axis, value: u32, limit: u32 },

    /// A glyph code has no region in the atlas.
    #[error("glyph code should be in range [0, {limit}), got {code}")]
    GlyphOutOfRange { code: u32, limit: u32 },

    /// A string write would run past the right edge of the grid.
    #[error("string of length {len} at x = {x} exceeds grid width {width}")]
    CapacityExceeded { x: u32, len: u32, width: u32 },

    /// A tileset image failed to decode or load.
    #[error("failed to load tileset image: {0}")]
    Image(#[from] image::ImageError),
}
