use std::sync::Arc;

use glyphgrid::{DEFAULT_GLYPH_H, DEFAULT_GLYPH_W, GlyphAtlas, GridError, TilesetSpec, default_atlas};
use image::RgbaImage;

fn sheet(w: u32, h: u32) -> RgbaImage {
    RgbaImage::new(w, h)
}

// ── Slicing ───────────────────────────────────────────────────────────────────

#[test]
fn code_count_is_min_of_cells_and_256() {
    for (w, h, gw, gh, expected) in [
        (128u32, 128u32, 8u32, 8u32, 256usize), // exactly 256 cells
        (256, 256, 8, 8, 256),                  // 1024 cells, capped
        (64, 32, 8, 8, 32),                     // partial sheet
        (64, 32, 16, 16, 8),                    // bigger glyphs
        (7, 7, 8, 8, 0),                        // image smaller than one glyph
    ] {
        let atlas = GlyphAtlas::from_image(sheet(w, h), gw, gh, false);
        assert_eq!(atlas.len(), expected, "{w}x{h} at {gw}x{gh}");
    }
}

#[test]
fn regions_advance_left_to_right_then_wrap() {
    let atlas = GlyphAtlas::from_image(sheet(24, 16), 8, 8, false);
    let positions: Vec<(u32, u32)> = (0..atlas.len() as u32)
        .map(|code| {
            let r = atlas.get(code).unwrap();
            (r.x, r.y)
        })
        .collect();
    assert_eq!(
        positions,
        [(0, 0), (8, 0), (16, 0), (0, 8), (8, 8), (16, 8)]
    );
}

#[test]
fn every_region_has_glyph_dimensions() {
    let atlas = GlyphAtlas::from_image(sheet(48, 32), 12, 16, false);
    for code in 0..atlas.len() as u32 {
        let r = atlas.get(code).unwrap();
        assert_eq!((r.width, r.height), (12, 16));
    }
}

// ── Lookup ────────────────────────────────────────────────────────────────────

#[test]
fn get_rejects_codes_from_len_upward() {
    let atlas = GlyphAtlas::from_image(sheet(64, 32), 8, 8, false);
    assert_eq!(atlas.len(), 32);
    assert!(atlas.get(31).is_ok());
    for code in [32u32, 100, 255, u32::MAX] {
        assert!(
            matches!(atlas.get(code), Err(GridError::GlyphOutOfRange { .. })),
            "code {code} accepted"
        );
    }
}

#[test]
fn lookup_error_names_the_valid_range() {
    let atlas = GlyphAtlas::from_image(sheet(64, 32), 8, 8, false);
    let err = atlas.get(40).unwrap_err();
    assert_eq!(
        err.to_string(),
        "glyph code should be in range [0, 32), got 40"
    );
}

// ── Flip ──────────────────────────────────────────────────────────────────────

#[test]
fn flipped_atlas_mirrors_v_only() {
    let upright = GlyphAtlas::from_image(sheet(64, 64), 8, 8, false);
    let flipped = GlyphAtlas::from_image(sheet(64, 64), 8, 8, true);
    for code in 0..upright.len() as u32 {
        let u = upright.get(code).unwrap();
        let f = flipped.get(code).unwrap();
        assert_eq!(f.uv_tl[0], u.uv_tl[0]);
        assert_eq!(f.uv_br[0], u.uv_br[0]);
        assert_eq!(f.uv_tl[1], u.uv_br[1]);
        assert_eq!(f.uv_br[1], u.uv_tl[1]);
    }
}

// ── Built-in tileset ──────────────────────────────────────────────────────────

#[test]
fn default_atlas_is_a_full_cp437_set() {
    let atlas = default_atlas(false);
    assert_eq!(atlas.len(), 256);
    assert_eq!(atlas.glyph_width(), DEFAULT_GLYPH_W);
    assert_eq!(atlas.glyph_height(), DEFAULT_GLYPH_H);
}

#[test]
fn default_atlas_is_built_once_per_orientation() {
    let a = default_atlas(false);
    let b = default_atlas(false);
    assert!(Arc::ptr_eq(&a, &b));

    let f = default_atlas(true);
    assert!(!Arc::ptr_eq(&a, &f));
    assert!(Arc::ptr_eq(&f, &default_atlas(true)));
}

#[test]
fn default_tileset_has_transparent_background() {
    // Corner pixel of the blank glyph 0 cell.
    let atlas = default_atlas(false);
    assert_eq!(atlas.image().get_pixel(0, 0).0[3], 0);
}

// ── TilesetSpec ───────────────────────────────────────────────────────────────

#[test]
fn tileset_spec_round_trips_from_json() {
    let spec = TilesetSpec::from_json(
        r#"{ "path": "tiles/vga.png", "glyph_width": 9, "glyph_height": 16, "flip_y": true }"#,
    )
    .unwrap();
    assert_eq!(spec.path, "tiles/vga.png");
    assert_eq!((spec.glyph_width, spec.glyph_height), (9, 16));
    assert!(spec.flip_y);
}

#[test]
fn tileset_spec_load_reports_missing_file() {
    let spec = TilesetSpec {
        path: "does/not/exist.png".into(),
        glyph_width: 8,
        glyph_height: 8,
        flip_y: false,
    };
    assert!(matches!(spec.load(), Err(GridError::Image(_))));
}
