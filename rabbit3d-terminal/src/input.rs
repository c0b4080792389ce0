/// Crossterm event translation into per-frame camera input
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode, MouseEvent,
    MouseEventKind,
};
use rabbit3d_core::{FrameInput, KeyState};

/// Pseudo-pixels per terminal cell, so mouse-look turns at a sane rate
pub const CELL_WIDTH: f64 = 8.0;
pub const CELL_HEIGHT: f64 = 16.0;

/// Keys held and the last known mouse cell, accumulated from terminal events.
///
/// Terminals that report key releases keep a key held until it is released.
/// Everywhere else a key only counts for the frame its press (or repeat)
/// arrived in, and `end_frame` forgets it.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: KeyState,
    mouse_cell: Option<(u16, u16)>,
    resized: Option<(u16, u16)>,
    reports_releases: bool,
}

impl InputState {
    pub fn new(reports_releases: bool) -> Self {
        Self {
            reports_releases,
            ..Default::default()
        }
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    pub fn quit_requested(&self) -> bool {
        self.keys.quit
    }

    /// Latest non-empty terminal size reported since the last call
    pub fn take_resize(&mut self) -> Option<(u16, u16)> {
        self.resized.take()
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(columns, rows) => {
                if *columns > 0 && *rows > 0 {
                    self.resized = Some((*columns, *rows));
                }
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        let held = key.kind != KeyEventKind::Release;

        // Raw mode delivers Ctrl+C as a plain key
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c' | 'C'))
        {
            if held {
                self.keys.quit = true;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => {
                if held {
                    self.keys.quit = true;
                }
            }
            KeyCode::Char(c) => match c.to_ascii_lowercase() {
                'w' => self.keys.forward = held,
                's' => self.keys.back = held,
                'a' => self.keys.left = held,
                'd' => self.keys.right = held,
                ' ' => self.keys.up = held,
                'c' => self.keys.down = held,
                _ => {}
            },
            KeyCode::Modifier(ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift) => {
                self.keys.down = held;
            }
            _ => {}
        }

        // Shift+letter also descends on terminals without modifier key events
        if held && !self.reports_releases && key.modifiers.contains(KeyModifiers::SHIFT) {
            if let KeyCode::Char(c) = key.code {
                if c.is_ascii_alphabetic() && !c.eq_ignore_ascii_case(&'c') {
                    self.keys.down = true;
                }
            }
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        if matches!(
            mouse.kind,
            MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_)
        ) {
            self.mouse_cell = Some((mouse.column, mouse.row));
        }
    }

    /// Cursor in pseudo-pixels, if the mouse has been seen
    pub fn cursor(&self) -> Option<(f64, f64)> {
        self.mouse_cell.map(|(column, row)| {
            (
                f64::from(column) * CELL_WIDTH,
                f64::from(row) * CELL_HEIGHT,
            )
        })
    }

    pub fn frame_input(&self, delta_seconds: f32) -> FrameInput {
        FrameInput {
            keys: self.keys,
            cursor: self.cursor(),
            delta_seconds,
        }
    }

    /// Drop keys that cannot be known to still be held
    pub fn end_frame(&mut self) {
        if !self.reports_releases {
            let quit = self.keys.quit;
            self.keys = KeyState {
                quit,
                ..Default::default()
            };
        }
    }
}
