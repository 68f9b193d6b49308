use anyhow::Result;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use dots_engine::batch::{BatchConfig, BatchError, TextureInfo};
use dots_engine::coords::{Rect, Vec2, Viewport};
use dots_engine::core::{App, AppControl, FrameCtx};
use dots_engine::device::GpuInit;
use dots_engine::logging::{init_logging, LoggingConfig};
use dots_engine::paint::Color;
use dots_engine::render::Renderer;
use dots_engine::window::{Runtime, RuntimeConfig};

const CHECKER_SIZE: u32 = 64;
const CHECKER_CELL: u32 = 8;
const GRID_SPACING: f32 = 64.0;

struct Dot {
    pos: Vec2,
    vel: Vec2,
    radius: f32,
    color: Color,
}

impl Dot {
    fn step(&mut self, dt: f32, bounds: Viewport) {
        self.pos = self.pos + self.vel * dt;
        if self.pos.x < self.radius || self.pos.x > bounds.width - self.radius {
            self.vel.x = -self.vel.x;
            self.pos.x = self.pos.x.min(bounds.width - self.radius).max(self.radius);
        }
        if self.pos.y < self.radius || self.pos.y > bounds.height - self.radius {
            self.vel.y = -self.vel.y;
            self.pos.y = self.pos.y.min(bounds.height - self.radius).max(self.radius);
        }
    }
}

struct DotsGame {
    dots: Vec<Dot>,
    checker: Option<TextureInfo>,
    elapsed: f32,
}

impl DotsGame {
    fn new() -> Self {
        let palette = [
            Color::from_rgb_u8(230, 57, 70),
            Color::from_rgb_u8(241, 250, 238),
            Color::from_rgb_u8(168, 218, 220),
            Color::from_rgb_u8(69, 123, 157),
            Color::from_rgb_u8(255, 183, 3),
        ];
        let dots = (0..24)
            .map(|i| {
                let t = i as f32;
                Dot {
                    pos: Vec2::new(80.0 + t * 35.0, 120.0 + (t * 47.0) % 500.0),
                    vel: Vec2::new(60.0 + (t * 13.0) % 90.0, 45.0 - (t * 29.0) % 110.0),
                    radius: 8.0 + (t * 7.0) % 24.0,
                    color: palette[i % palette.len()],
                }
            })
            .collect();

        Self {
            dots,
            checker: None,
            elapsed: 0.0,
        }
    }

    fn draw(&self, r: &mut Renderer, viewport: Viewport) -> Result<(), BatchError> {
        let grid = Color::from_rgb_u8(40, 44, 52);
        let mut x = 0.0;
        while x <= viewport.width {
            r.append_line(Vec2::new(x, 0.0), Vec2::new(x, viewport.height), grid)?;
            x += GRID_SPACING;
        }
        let mut y = 0.0;
        while y <= viewport.height {
            r.append_line(Vec2::new(0.0, y), Vec2::new(viewport.width, y), grid)?;
            y += GRID_SPACING;
        }
        // Grid goes out before the circles so it stays underneath them.
        r.flush_lines();

        let wave: Vec<Vec2> = (0..=64)
            .map(|i| {
                let x = viewport.width * i as f32 / 64.0;
                let y = viewport.height * 0.5 + (x * 0.02 + self.elapsed * 2.0).sin() * 60.0;
                Vec2::new(x, y)
            })
            .collect();
        r.append_polyline(&wave, Color::GREEN)?;

        for dot in &self.dots {
            r.append_square(dot.pos, dot.radius * 0.6, dot.radius * 0.6, dot.color)?;
        }

        if let Some(checker) = self.checker.as_ref() {
            r.draw_texture(checker, Vec2::new(16.0, 16.0), Color::WHITE)?;
            let cell = (CHECKER_CELL * 2) as f32;
            r.draw_texture_region(
                checker,
                Vec2::new(96.0, 16.0),
                Rect::new(0.0, 0.0, cell, cell),
                Color::from_rgb(1.0, 0.8, 0.8),
            )?;
        }

        for dot in &self.dots {
            r.draw_circle(dot.pos, dot.radius, dot.color)?;
        }

        Ok(())
    }
}

impl App for DotsGame {
    fn init(&mut self, renderer: &mut Renderer) -> Result<()> {
        let pixels = checker_pixels(CHECKER_SIZE, CHECKER_CELL);
        let checker = renderer
            .backend_mut()
            .create_texture_rgba8(CHECKER_SIZE, CHECKER_SIZE, &pixels)?;
        log::info!("checker texture ready: {checker:?}");
        self.checker = Some(checker);
        Ok(())
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if event.state == ElementState::Pressed
                && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
            {
                return AppControl::Exit;
            }
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let dt = ctx.time.dt;
        let viewport = ctx.viewport();
        self.elapsed += dt;
        for dot in &mut self.dots {
            dot.step(dt, viewport);
        }

        if ctx.time.frame_index % 600 == 0 {
            log::info!("{} fps, last frame: {:?}", ctx.fps, ctx.renderer.stats());
        }

        ctx.render(Color::from_rgb_u8(20, 22, 28), |r| self.draw(r, viewport))
    }
}

/// Two-tone RGBA8 checkerboard, `cell` pixels per square.
fn checker_pixels(size: u32, cell: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let light = ((x / cell) + (y / cell)) % 2 == 0;
            let v = if light { 235 } else { 60 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    pixels
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    Runtime::run(
        RuntimeConfig::default(),
        GpuInit::default(),
        BatchConfig::default(),
        DotsGame::new(),
    )
}
