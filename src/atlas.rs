use std::sync::{Arc, OnceLock};

use image::RgbaImage;
use serde::Deserialize;

use crate::GridError;

/// Highest number of glyph codes an atlas can address.
pub const MAX_GLYPHS: usize = 256;

// ── GlyphRegion ───────────────────────────────────────────────────────────────

/// One glyph's sub-rectangle of the atlas image.
///
/// `uv_tl` / `uv_br` are the normalised texture coordinates of the quad's
/// top-left and bottom-right corners.  For a vertically flipped atlas the V
/// components are swapped, so the quad samples the glyph mirrored — the
/// pixel rectangle (`x`, `y`, `width`, `height`) is unaffected.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GlyphRegion {
    /// Top-left pixel X of the region in the source image.
    pub x: u32,
    /// Top-left pixel Y of the region in the source image.
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub uv_tl: [f32; 2],
    pub uv_br: [f32; 2],
}

// ── GlyphAtlas ────────────────────────────────────────────────────────────────

/// A CP437 / extended-ASCII tileset: a source image sliced into up to 256
/// equally sized glyph regions, addressed by code.
///
/// The source image should use a transparent background (not solid black) so
/// that glyph quads tint cleanly over the cell background fill.  Codes are
/// assigned row-major: top row left-to-right first, then the next row down.
pub struct GlyphAtlas {
    image: RgbaImage,
    glyph_w: u32,
    glyph_h: u32,
    flip_y: bool,
    regions: Vec<GlyphRegion>,
}

impl GlyphAtlas {
    /// Slice `image` into `glyph_w × glyph_h` regions.
    ///
    /// Trailing partial cells are truncated by the integer division; a sheet
    /// holding more than [`MAX_GLYPHS`] cells keeps only the first 256.
    ///
    /// # Panics
    /// Panics if `glyph_w` or `glyph_h` is zero.
    pub fn from_image(image: RgbaImage, glyph_w: u32, glyph_h: u32, flip_y: bool) -> Self {
        assert!(glyph_w > 0 && glyph_h > 0, "glyph dimensions must be non-zero");

        let (img_w, img_h) = image.dimensions();
        let cols = img_w / glyph_w;
        let rows = img_h / glyph_h;

        let count = ((cols * rows) as usize).min(MAX_GLYPHS);
        if (cols * rows) as usize > MAX_GLYPHS {
            log::warn!(
                "tileset holds {} cells; keeping the first {MAX_GLYPHS}",
                cols * rows
            );
        }

        let mut regions = Vec::with_capacity(count);
        'slice: for row in 0..rows {
            for col in 0..cols {
                if regions.len() >= MAX_GLYPHS {
                    break 'slice;
                }
                regions.push(Self::region(
                    col * glyph_w,
                    row * glyph_h,
                    glyph_w,
                    glyph_h,
                    img_w,
                    img_h,
                    flip_y,
                ));
            }
        }

        log::debug!(
            "sliced {img_w}x{img_h} tileset into {} regions of {glyph_w}x{glyph_h}",
            regions.len()
        );

        Self { image, glyph_w, glyph_h, flip_y, regions }
    }

    /// Decode a PNG byte slice and slice it.  See [`GlyphAtlas::from_image`].
    pub fn from_png(
        png_bytes: &[u8],
        glyph_w: u32,
        glyph_h: u32,
        flip_y: bool,
    ) -> Result<Self, GridError> {
        let image = image::load_from_memory(png_bytes)?.to_rgba8();
        Ok(Self::from_image(image, glyph_w, glyph_h, flip_y))
    }

    fn region(
        px: u32,
        py: u32,
        pw: u32,
        ph: u32,
        img_w: u32,
        img_h: u32,
        flip_y: bool,
    ) -> GlyphRegion {
        let u0 = px as f32 / img_w as f32;
        let v0 = py as f32 / img_h as f32;
        let u1 = (px + pw) as f32 / img_w as f32;
        let v1 = (py + ph) as f32 / img_h as f32;

        let (uv_tl, uv_br) = if flip_y {
            ([u0, v1], [u1, v0])
        } else {
            ([u0, v0], [u1, v1])
        };

        GlyphRegion { x: px, y: py, width: pw, height: ph, uv_tl, uv_br }
    }

    /// Look up the region for a glyph code.
    ///
    /// Fails with [`GridError::GlyphOutOfRange`] when `code` has no region,
    /// naming the valid interval.
    pub fn get(&self, code: u32) -> Result<GlyphRegion, GridError> {
        self.regions
            .get(code as usize)
            .copied()
            .ok_or(GridError::GlyphOutOfRange { code, limit: self.regions.len() as u32 })
    }

    /// Number of addressable glyph codes.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn glyph_width(&self) -> u32 {
        self.glyph_w
    }

    pub fn glyph_height(&self) -> u32 {
        self.glyph_h
    }

    pub fn flip_y(&self) -> bool {
        self.flip_y
    }

    /// The backing image, for texture upload by a renderer.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

// ── TilesetSpec ───────────────────────────────────────────────────────────────

/// External tileset descriptor:
///
/// ```json
/// { "path": "tiles/cp437_16x16.png", "glyph_width": 16, "glyph_height": 16 }
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct TilesetSpec {
    pub path: String,
    pub glyph_width: u32,
    pub glyph_height: u32,
    #[serde(default)]
    pub flip_y: bool,
}

impl TilesetSpec {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load the described image from disk and slice it into an atlas.
    pub fn load(&self) -> Result<GlyphAtlas, GridError> {
        let image = image::open(&self.path)?.to_rgba8();
        Ok(GlyphAtlas::from_image(
            image,
            self.glyph_width,
            self.glyph_height,
            self.flip_y,
        ))
    }
}

// ── Default resources ─────────────────────────────────────────────────────────

/// The built-in 8×8 CP437 atlas, built from [`crate::DEFAULT_TILESET`] on
/// first use and cached per orientation.  The returned handle is shared;
/// multiple grids may hold it at once.
pub fn default_atlas(flip_y: bool) -> Arc<GlyphAtlas> {
    static UPRIGHT: OnceLock<Arc<GlyphAtlas>> = OnceLock::new();
    static FLIPPED: OnceLock<Arc<GlyphAtlas>> = OnceLock::new();

    let slot = if flip_y { &FLIPPED } else { &UPRIGHT };
    Arc::clone(slot.get_or_init(|| {
        log::debug!("building built-in CP437 atlas (flip_y = {flip_y})");
        let atlas = GlyphAtlas::from_png(
            crate::DEFAULT_TILESET,
            crate::DEFAULT_GLYPH_W,
            crate::DEFAULT_GLYPH_H,
            flip_y,
        )
        .expect("embedded tileset failed to decode");
        Arc::new(atlas)
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(w: u32, h: u32) -> RgbaImage {
        RgbaImage::new(w, h)
    }

    #[test]
    fn full_16x16_sheet_yields_256_codes() {
        let atlas = GlyphAtlas::from_image(sheet(128, 128), 8, 8, false);
        assert_eq!(atlas.len(), 256);
    }

    #[test]
    fn partial_sheet_yields_cols_times_rows() {
        // 4 columns x 2 rows of 8x8 glyphs.
        let atlas = GlyphAtlas::from_image(sheet(32, 16), 8, 8, false);
        assert_eq!(atlas.len(), 8);
    }

    #[test]
    fn oversized_sheet_truncates_at_256() {
        // 32 x 32 cells = 1024 candidates.
        let atlas = GlyphAtlas::from_image(sheet(256, 256), 8, 8, false);
        assert_eq!(atlas.len(), 256);
    }

    #[test]
    fn trailing_partial_cells_are_dropped() {
        // 30px wide / 8 = 3 whole columns; the 6px remainder is ignored.
        let atlas = GlyphAtlas::from_image(sheet(30, 8), 8, 8, false);
        assert_eq!(atlas.len(), 3);
    }

    #[test]
    fn codes_are_assigned_row_major() {
        let atlas = GlyphAtlas::from_image(sheet(32, 16), 8, 8, false);
        // Code 0 at (0,0); code 3 ends the first row; code 4 starts row 1.
        let first = atlas.get(0).unwrap();
        assert_eq!((first.x, first.y), (0, 0));
        let last_in_row = atlas.get(3).unwrap();
        assert_eq!((last_in_row.x, last_in_row.y), (24, 0));
        let next_row = atlas.get(4).unwrap();
        assert_eq!((next_row.x, next_row.y), (0, 8));
    }

    #[test]
    fn get_past_end_reports_valid_range() {
        let atlas = GlyphAtlas::from_image(sheet(32, 16), 8, 8, false);
        match atlas.get(8) {
            Err(GridError::GlyphOutOfRange { code: 8, limit: 8 }) => {}
            other => panic!("expected GlyphOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn uvs_cover_the_region() {
        let atlas = GlyphAtlas::from_image(sheet(32, 16), 8, 8, false);
        let r = atlas.get(5).unwrap(); // row 1, col 1
        assert_eq!(r.uv_tl, [0.25, 0.5]);
        assert_eq!(r.uv_br, [0.5, 1.0]);
    }

    #[test]
    fn flip_swaps_only_v() {
        let upright = GlyphAtlas::from_image(sheet(32, 16), 8, 8, false);
        let flipped = GlyphAtlas::from_image(sheet(32, 16), 8, 8, true);
        let u = upright.get(5).unwrap();
        let f = flipped.get(5).unwrap();
        assert_eq!(f.uv_tl, [u.uv_tl[0], u.uv_br[1]]);
        assert_eq!(f.uv_br, [u.uv_br[0], u.uv_tl[1]]);
        assert_eq!((f.x, f.y, f.width, f.height), (u.x, u.y, u.width, u.height));
    }

    #[test]
    #[should_panic(expected = "glyph dimensions")]
    fn zero_glyph_width_panics() {
        GlyphAtlas::from_image(sheet(32, 16), 0, 8, false);
    }

    #[test]
    fn tileset_spec_parses_with_default_flip() {
        let spec = TilesetSpec::from_json(
            r#"{ "path": "a.png", "glyph_width": 8, "glyph_height": 8 }"#,
        )
        .unwrap();
        assert_eq!(spec.glyph_width, 8);
        assert!(!spec.flip_y);
    }
}
