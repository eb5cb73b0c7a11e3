use std::collections::HashSet;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Context;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::camera::{FOV, Player, Projection};
use crate::movement::InputState;
use crate::scaler::{ScaleLut, blit_bilinear_stretch, build_scale_lut};
use crate::texture::TextureSet;
use crate::world::WorldGrid;

mod camera;
mod movement;
mod raycast;
mod renderer;
mod scaler;
mod texture;
mod world;

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    grid: WorldGrid,
    textures: TextureSet,
    player: Player,
    projection: Projection,

    // HUD
    frame_counter: u32,
    last_fps_log: Instant,

    // Internal framebuffer, column-major so columns render in parallel
    fb_small: Vec<u32>,
    fb_w: usize,
    fb_h: usize,

    scale_lut: ScaleLut,

    // Input and movement
    keys_down: HashSet<KeyCode>,
    last_tick: Instant,
}

impl App {
    fn new(grid: WorldGrid) -> Self {
        Self {
            window: None,
            surface: None,
            grid,
            textures: TextureSet::generate(),
            player: Player::new(1.5, 1.5),
            projection: Projection::new(640, FOV),

            frame_counter: 0,
            last_fps_log: Instant::now(),

            fb_small: vec![0; 640 * 480],
            fb_w: 640,
            fb_h: 480,

            scale_lut: ScaleLut::empty(),

            keys_down: HashSet::new(),
            last_tick: Instant::now(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title("Grid Caster")
            .with_inner_size(LogicalSize::new(800.0, 600.0));

        let window = Rc::new(event_loop.create_window(attributes).expect("create window"));

        let context = softbuffer::Context::new(window.clone()).expect("softbuffer context");
        let surface =
            softbuffer::Surface::new(&context, window.clone()).expect("softbuffer surface");

        let size = window.inner_size();
        self.rebuild_internal_fb_and_lut(size.width as usize, size.height as usize);

        self.surface = Some(surface);
        self.window = Some(window);

        self.last_tick = Instant::now();
        self.window.as_ref().unwrap().request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state,
                        ..
                    },
                ..
            } => {
                if let PhysicalKey::Code(code) = physical_key {
                    use winit::event::ElementState;
                    match state {
                        ElementState::Pressed => {
                            self.keys_down.insert(code);
                        }
                        ElementState::Released => {
                            self.keys_down.remove(&code);
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                self.tick();

                let (window, surface) = match (&self.window, &mut self.surface) {
                    (Some(w), Some(s)) if w.id() == id => (w, s),
                    _ => return,
                };

                let size = window.inner_size();
                let (dw, dh) = (size.width as usize, size.height as usize);
                if dw == 0 || dh == 0 {
                    return; // Minimized window, skip drawing
                }

                surface
                    .resize(
                        NonZeroU32::new(dw as u32).unwrap(),
                        NonZeroU32::new(dh as u32).unwrap(),
                    )
                    .unwrap();

                renderer::render_frame(
                    &mut self.fb_small,
                    self.fb_h,
                    &self.grid,
                    &self.projection,
                    &self.textures,
                    &self.player,
                );

                let mut buf = surface.buffer_mut().expect("buffer_mut");
                blit_bilinear_stretch(&mut buf, dw, &self.fb_small, self.fb_h, &self.scale_lut);

                buf.present().unwrap();

                self.frame_counter += 1;
                let now = Instant::now();
                if now.duration_since(self.last_fps_log).as_secs_f32() >= 1.0 {
                    let fps = self.frame_counter as f32
                        / now.duration_since(self.last_fps_log).as_secs_f32();
                    tracing::info!("FPS: {fps:.1}");
                    self.frame_counter = 0;
                    self.last_fps_log = now;
                }

                self.window.as_ref().unwrap().request_redraw();
            }

            WindowEvent::Resized(new_size) => {
                let (dw, dh) = (new_size.width as usize, new_size.height as usize);
                self.rebuild_internal_fb_and_lut(dw, dh);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl App {
    fn tick(&mut self) {
        // Compute dt with cap to avoid huge jumps if the app was paused
        let now = Instant::now();
        let mut dt = now.duration_since(self.last_tick);
        self.last_tick = now;
        if dt > Duration::from_millis(100) {
            dt = Duration::from_millis(100);
        }

        let input = InputState {
            forward: self.keys_down.contains(&KeyCode::ArrowUp),
            backward: self.keys_down.contains(&KeyCode::ArrowDown),
            turn_left: self.keys_down.contains(&KeyCode::ArrowLeft),
            turn_right: self.keys_down.contains(&KeyCode::ArrowRight),
            sprint: self.keys_down.contains(&KeyCode::ShiftLeft),
        };
        movement::apply_input(&mut self.player, input);
        movement::step(&mut self.player, &self.grid, dt.as_secs_f32());
    }

    fn rebuild_internal_fb_and_lut(&mut self, dst_w: usize, dst_h: usize) {
        // Keep internal height fixed (controls pixel size look)
        let target_h = 480usize;
        let aspect = if dst_h > 0 {
            dst_w as f32 / dst_h as f32
        } else {
            1.0
        };

        // Derive width from aspect
        let mut target_w = (target_h as f32 * aspect).round() as usize;
        if target_w < 160 {
            target_w = 160;
        }
        if target_w % 2 != 0 {
            target_w += 1;
        }

        // Reallocate internal FB and ray tables if the width changed
        if target_w != self.fb_w || target_h != self.fb_h {
            self.fb_w = target_w;
            self.fb_h = target_h;
            self.fb_small = vec![0u32; self.fb_w * self.fb_h];
        }
        if self.projection.width() != self.fb_w {
            self.projection = Projection::new(self.fb_w, FOV);
        }

        self.scale_lut = build_scale_lut(dst_w, dst_h, self.fb_w, self.fb_h);
    }
}

fn load_grid() -> anyhow::Result<WorldGrid> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading map file {path}"))?;
            let grid =
                WorldGrid::parse(&text).with_context(|| format!("map file {path} is invalid"))?;
            tracing::info!(
                "loaded {}x{} map from {path}",
                grid.width(),
                grid.height()
            );
            Ok(grid)
        }
        None => {
            let grid = WorldGrid::parse(world::DEFAULT_MAP).context("built-in map is invalid")?;
            tracing::info!("using built-in {}x{} map", grid.width(), grid.height());
            Ok(grid)
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let grid = load_grid()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(grid);
    event_loop.run_app(&mut app)?;
    Ok(())
}
