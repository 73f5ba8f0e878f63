use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

use glyphgrid::renderer::{QuadBatch, Renderer};
use glyphgrid::{CellStyle, Color, Grid, GridError, default_atlas};

const GRID_W: u32 = 80;
const GRID_H: u32 = 25;
/// Pixel size of one cell on screen (2x the 8px glyphs).
const SCALING: f32 = 16.0;

// CP437 double-line box glyphs.
const TL: u32 = 0xC9;
const TR: u32 = 0xBB;
const BL: u32 = 0xC8;
const BR: u32 = 0xBC;
const H: u32 = 0xCD;
const V: u32 = 0xBA;

/// Fill an 80×25 grid with a small CP437 showcase: a double-line frame, the
/// full glyph table, and the named color palette.
fn build_showcase() -> Result<Grid, GridError> {
    let mut grid = Grid::new(default_atlas(false), GRID_W, GRID_H);
    let plain = CellStyle::default();

    // Frame.
    for x in 1..GRID_W - 1 {
        grid.write(H, x, 0, plain)?;
        grid.write(H, x, GRID_H - 1, plain)?;
    }
    for y in 1..GRID_H - 1 {
        grid.write(V, 0, y, plain)?;
        grid.write(V, GRID_W - 1, y, plain)?;
    }
    grid.write(TL, 0, 0, plain)?;
    grid.write(TR, GRID_W - 1, 0, plain)?;
    grid.write(BL, 0, GRID_H - 1, plain)?;
    grid.write(BR, GRID_W - 1, GRID_H - 1, plain)?;

    grid.write_centered(" glyphgrid ", 0, CellStyle::fg(Color::YELLOW))?;

    // Full glyph table, 16 codes per row.
    for code in 0..256u32 {
        let x = 4 + (code % 16) * 2;
        let y = 3 + code / 16;
        grid.write(code, x, y, plain)?;
    }

    // Named palette as background swatches.
    let palette = [
        Color::RED,
        Color::ORANGE,
        Color::YELLOW,
        Color::GREEN,
        Color::DARK_GREEN,
        Color::CYAN,
        Color::BLUE,
        Color::DARK_BLUE,
        Color::MAGENTA,
        Color::DARK_RED,
        Color::GRAY,
        Color::DARK_GRAY,
    ];
    for (i, color) in palette.iter().enumerate() {
        let x = 44 + (i as u32 % 4) * 6;
        let y = 4 + (i as u32 / 4) * 2;
        for dx in 0..4 {
            grid.write(0, x + dx, y, CellStyle::bg(*color))?;
        }
    }

    grid.write_str(
        "white on black is the default",
        44,
        12,
        plain,
    )?;
    grid.write_str(
        "inverse video",
        44,
        14,
        CellStyle::new(Color::BLACK, Color::WHITE),
    )?;
    grid.write_centered("press the close button to quit", GRID_H - 1, CellStyle::fg(Color::GRAY))?;

    Ok(grid)
}

// ── App (winit ApplicationHandler) ──────────────────────────────────────────

struct State {
    renderer: Renderer,
    grid: Grid,
    batch: QuadBatch,
}

#[derive(Default)]
struct App {
    state: Option<State>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title("glyphgrid")
                        .with_inner_size(PhysicalSize::new(
                            GRID_W * SCALING as u32,
                            GRID_H * SCALING as u32,
                        ))
                        .with_resizable(false),
                )
                .unwrap(),
        );

        let grid = build_showcase().expect("showcase writes are in bounds");
        let renderer = pollster::block_on(Renderer::new(window, &grid));

        self.state = Some(State { renderer, grid, batch: QuadBatch::new() });
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_ref() {
            state.renderer.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else { return };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => state.renderer.resize(size),

            WindowEvent::RedrawRequested => {
                state.batch.clear();
                if let Err(e) = state.grid.draw(&mut state.batch, SCALING) {
                    eprintln!("draw error: {e}");
                    event_loop.exit();
                    return;
                }

                match state.renderer.render(&state.batch) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let size = state.renderer.window.inner_size();
                        state.renderer.resize(size);
                    }
                    Err(e) => eprintln!("render error: {e}"),
                }
            }

            _ => {}
        }
    }
}

fn main() {
    let event_loop = EventLoop::new().unwrap();
    event_loop.run_app(&mut App::default()).unwrap();
}
