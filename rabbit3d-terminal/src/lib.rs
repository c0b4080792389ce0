/// Terminal frame driver for the Rabbit3D scene graph
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use log::{debug, info, warn};
use rabbit3d_core::{FreeCameraController, Mesh, ModelObject, Scene};
use std::io::{self, stdout, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

pub mod config;
pub mod input;
pub mod renderer;

pub use config::{Config, ConfigError};
pub use input::InputState;
pub use renderer::AsciiRenderer;

/// Rows reserved above the picture for the status line
const STATUS_ROWS: u16 = 1;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 2.0;

/// Extent that maps the model's largest side onto one world unit
pub fn fitted_extent(mesh: &Mesh) -> (f32, f32, f32) {
    let side = mesh
        .bounding_box()
        .map(|bounds| bounds.largest_dimension())
        .filter(|side| side.is_finite() && *side > f32::EPSILON)
        .unwrap_or(1.0);
    (side, side, side)
}

/// Build the scene the viewer shows for `mesh`.
///
/// The mesh is recentred on the origin so it spins in place in front of the
/// camera.
pub fn build_scene(config: &Config, mut mesh: Mesh) -> Scene {
    if let Some(bounds) = mesh.bounding_box() {
        mesh.translate(&-bounds.center().coords);
    }

    let (width, height, depth) = config.extent.unwrap_or_else(|| fitted_extent(&mesh));
    debug!("world extent {width}x{height}x{depth}");

    let mut scene = Scene::with_extent(width, height, depth);
    scene.camera_mut().set_speed(config.speed);
    if let Some(light) = scene.light_mut() {
        light.set_lamp_visible(config.lamp_visible);
    }

    let mut model = ModelObject::new(Rc::new(mesh));
    if !config.spin {
        model.set_spin(None);
    }
    scene.add_object(model);
    scene
}

/// Undo what `TerminalApp::run` set up, apart from raw mode
fn restore_terminal<W: Write>(out: &mut W, reports_releases: bool) -> io::Result<()> {
    let popped = if reports_releases {
        execute!(out, PopKeyboardEnhancementFlags)
    } else {
        Ok(())
    };
    if let Err(e) = &popped {
        warn!("failed to restore keyboard flags: {e}");
    }

    let restored = execute!(
        out,
        DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show
    );
    popped.and(restored)
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    scene: Scene,
    controller: FreeCameraController,
    renderer: AsciiRenderer,
    input: InputState,
    frame_time: Duration,
    running: bool,
    last_frame: Instant,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(scene: Scene, frame_time: Duration) -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        let now = Instant::now();

        let mut app = Self {
            scene,
            controller: FreeCameraController::new(),
            renderer: AsciiRenderer::new(0, 0),
            input: InputState::default(),
            frame_time,
            running: true,
            last_frame: now,
            last_fps_sample: now,
            frame_count: 0,
            fps: 0.0,
        };
        app.resize(columns, rows);
        Ok(app)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let reports_releases = terminal::supports_keyboard_enhancement().unwrap_or(false)
            && execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        debug!("key release events: {reports_releases}");
        self.input = InputState::new(reports_releases);

        let result = self.main_loop();

        // Cleanup, even when the loop failed
        let restored = restore_terminal(&mut stdout(), reports_releases);
        terminal::disable_raw_mode()?;

        result.and(restored)
    }

    fn main_loop(&mut self) -> io::Result<()> {
        self.last_frame = Instant::now();
        self.last_fps_sample = self.last_frame;

        while self.running {
            let frame_start = Instant::now();
            let delta = (frame_start - self.last_frame).as_secs_f32();
            self.last_frame = frame_start;

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.input.handle_event(&event::read()?);
            }
            if let Some((columns, rows)) = self.input.take_resize() {
                self.resize(columns, rows);
            }
            if self.input.quit_requested() {
                self.running = false;
                break;
            }

            // Update
            let frame_input = self.input.frame_input(delta);
            self.scene.process_frame(&frame_input, &mut self.controller);
            self.input.end_frame();

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_fps_sample = now;
            }
        }

        info!("leaving the render loop");
        Ok(())
    }

    /// Fit the camera and the ASCII buffers to a terminal of `columns` x `rows`
    fn resize(&mut self, columns: u16, rows: u16) {
        let picture_rows = rows.saturating_sub(STATUS_ROWS);
        if columns == 0 || picture_rows == 0 {
            warn!("ignoring terminal size {columns}x{rows}");
            return;
        }

        debug!("terminal resized to {columns}x{rows}");
        self.renderer
            .resize(usize::from(columns), usize::from(picture_rows));
        self.scene
            .camera_mut()
            .set_size(f32::from(columns), f32::from(picture_rows) * CELL_ASPECT);
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();
        self.scene.draw_objects(&mut self.renderer);

        let mut stdout = stdout();
        self.renderer.draw(&mut stdout, STATUS_ROWS)?;

        // Status line
        let camera = self.scene.camera();
        let position = camera.position();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Rabbit3D | FPS: {:.1} | pos ({:.1}, {:.1}, {:.1}) yaw {:.0} pitch {:.0} | WASD/Space/C move, mouse look, Q quit",
                self.fps,
                position.x,
                position.y,
                position.z,
                camera.yaw(),
                camera.pitch(),
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
