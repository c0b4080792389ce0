/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Vector3;
use rabbit3d_core::{DrawCall, Facet, Fragment, RenderTarget, Transform};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub character: char,
    pub color: [u8; 3],
}

impl Cell {
    const EMPTY: Cell = Cell {
        character: ' ',
        color: [0, 0, 0],
    };
}

/// ASCII renderer that turns draw calls into terminal cells
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![Cell::EMPTY; size],
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(Cell::EMPTY);
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x)
    }

    fn render_facet(&mut self, call: &DrawCall<'_>, facet: &Facet) {
        let mvp = call.mvp();

        // Project vertices to screen space; off-screen corners are kept and
        // clipped by the scan bounds and the per-pixel depth range
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(&facet.vertices) {
            match Transform::project_unclipped(
                &mvp,
                vertex,
                self.width as u32,
                self.height as u32,
            ) {
                Some(coords) => *slot = coords,
                None => return, // Behind the eye
            }
        }

        let fragment = Fragment {
            position: Transform::transform_point(&call.model, &facet.centroid()),
            normal: world_normal(call, facet),
        };
        let rgb = call.shader.shade(&fragment, &call.uniforms);

        let cell = Cell {
            character: luminosity_char(luminance(rgb)),
            color: rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8),
        };

        self.rasterize_triangle(&screen_coords, cell);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], cell: Cell) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                else {
                    return; // Degenerate on screen
                };

                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                    if !(-1.0..=1.0).contains(&depth) {
                        continue; // Outside the near/far planes
                    }

                    let idx = y as usize * self.width + x as usize;
                    if depth < self.depth_buffer[idx] {
                        self.depth_buffer[idx] = depth;
                        self.cells[idx] = cell;
                    }
                }
            }
        }
    }

    /// Queue the frame, starting from row `top`
    pub fn draw<W: Write>(&self, writer: &mut W, top: u16) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, top + y as u16))?;
            for cell in &self.cells[y * self.width..(y + 1) * self.width] {
                let [r, g, b] = cell.color;
                writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                writer.queue(Print(cell.character))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RenderTarget for AsciiRenderer {
    fn submit(&mut self, call: &DrawCall<'_>) {
        for facet in call.mesh.facets() {
            self.render_facet(call, &facet);
        }
    }
}

/// Facet normal carried into world space, falling back to the winding
/// when the file's normal is zero
fn world_normal(call: &DrawCall<'_>, facet: &Facet) -> Vector3<f32> {
    let normal = if facet.normal.norm_squared() > f32::EPSILON {
        facet.normal
    } else {
        facet.winding_normal()
    };
    Transform::normal_matrix(&call.model) * normal
}

fn luminance([r, g, b]: [f32; 3]) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Covered cells never map to the blank at the bottom of the ramp
fn luminosity_char(luminance: f32) -> char {
    if !luminance.is_finite() {
        return LUMINOSITY_RAMP[1];
    }
    let steps = (LUMINOSITY_RAMP.len() - 2) as f32;
    let index = 1 + (luminance.clamp(0.0, 1.0) * steps) as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
