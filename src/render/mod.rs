use particlecosmo::{
    EnergyField, Particle, Vec2,
    registry::Shape,
    types::{Bounds, Color},
};

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 2.0;
const FIELD_RING_POINTS: usize = 48;
const PULSE_RATE: f32 = 4.0;
const PULSE_DEPTH: f32 = 0.1;

const FIELD_DEPTH: f32 = -1.0;
const FIELD_CENTER_DEPTH: f32 = -0.5;
const TRAIL_DEPTH_SCALE: f32 = 0.3;

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub pos: Vec2,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    /// Centers on `bounds` and zooms so the whole rectangle fits `viewport`.
    pub fn fit(bounds: &Bounds, viewport: Viewport) -> Self {
        let zoom_x = viewport.width as f32 / bounds.width;
        let zoom_y = viewport.height as f32 * CELL_ASPECT / bounds.height;
        let zoom = zoom_x.min(zoom_y);
        Self {
            pos: bounds.center(),
            zoom: if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 },
        }
    }

    pub fn project(&self, world: Vec2, viewport: Viewport) -> (i32, i32) {
        let half_w = viewport.width as f32 / 2.0;
        let half_h = viewport.height as f32 / 2.0;
        let sx = (world.x - self.pos.x) * self.zoom + half_w;
        let sy = (world.y - self.pos.y) * self.zoom / CELL_ASPECT + half_h;
        (sx.round() as i32, sy.round() as i32)
    }

    /// Inverse of the projection, used to drop things where the cursor is.
    pub fn unproject(&self, x: u16, y: u16, viewport: Viewport) -> Vec2 {
        let half_w = viewport.width as f32 / 2.0;
        let half_h = viewport.height as f32 / 2.0;
        Vec2::new(
            (x as f32 - half_w) / self.zoom + self.pos.x,
            (y as f32 - half_h) * CELL_ASPECT / self.zoom + self.pos.y,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

#[derive(Clone, Copy, Debug)]
pub struct RenderCell {
    pub ch: char,
    pub depth: f32,
    pub color: Color,
}

const BLANK: RenderCell = RenderCell {
    ch: ' ',
    depth: f32::NEG_INFINITY,
    color: Color::WHITE,
};

#[derive(Debug)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<RenderCell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let mut buffer = Self {
            width,
            height,
            cells: Vec::new(),
        };
        buffer.resize(width, height);
        buffer
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let len = (width as usize).saturating_mul(height as usize);
        if self.cells.len() != len {
            self.cells.resize(len, BLANK);
        }
        self.clear();
    }

    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, x: u16, y: u16) -> RenderCell {
        debug_assert!(x < self.width && y < self.height, "get() out of bounds");
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        self.cells[idx]
    }

    /// Writes a glyph unless the cell already holds something deeper in front.
    fn set(&mut self, x: i32, y: i32, ch: char, depth: f32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        let cell = &mut self.cells[idx];
        if depth >= cell.depth {
            cell.depth = depth;
            cell.ch = ch;
            cell.color = color;
        }
    }
}

/// Rasterizes one frame: field rings underneath, then trails, then particles.
/// Bigger particles win shared cells.
pub fn draw(
    particles: &[Particle],
    fields: &[EnergyField],
    camera: &Camera,
    viewport: Viewport,
    sim_time: f32,
    frame: &mut FrameBuffer,
) {
    if frame.width() != viewport.width || frame.height() != viewport.height {
        frame.resize(viewport.width, viewport.height);
    } else {
        frame.clear();
    }

    for field in fields {
        draw_field(field, camera, viewport, sim_time, frame);
    }

    for particle in particles {
        draw_trail(particle, camera, viewport, frame);
    }

    for particle in particles {
        let (sx, sy) = camera.project(particle.position, viewport);
        frame.set(
            sx,
            sy,
            glyph_for(particle.kind.appearance.shape, particle.radius),
            particle.radius,
            particle_color(particle),
        );
    }
}

fn draw_field(
    field: &EnergyField,
    camera: &Camera,
    viewport: Viewport,
    sim_time: f32,
    frame: &mut FrameBuffer,
) {
    let look = field.appearance;
    if !look.visible {
        return;
    }
    let strength = if field.active { look.opacity } else { look.opacity * 0.5 };
    let color = look.color.dimmed(strength.max(0.15));
    let radius = if look.pulse {
        field.radius * (1.0 + PULSE_DEPTH * (sim_time * PULSE_RATE).sin())
    } else {
        field.radius
    };

    for k in 0..FIELD_RING_POINTS {
        let angle = std::f32::consts::TAU * k as f32 / FIELD_RING_POINTS as f32;
        let point = field.position + Vec2::from_angle(angle) * radius;
        let (sx, sy) = camera.project(point, viewport);
        frame.set(sx, sy, '·', FIELD_DEPTH, color);
    }
    let (cx, cy) = camera.project(field.position, viewport);
    let center = if field.active { '+' } else { 'x' };
    frame.set(cx, cy, center, FIELD_CENTER_DEPTH, color);
}

fn draw_trail(particle: &Particle, camera: &Camera, viewport: Viewport, frame: &mut FrameBuffer) {
    let len = particle.trail.len();
    if len == 0 {
        return;
    }
    // newest first; skip the head, it sits under the particle itself
    for (i, pos) in particle.trail.iter().enumerate().skip(1) {
        let (sx, sy) = camera.project(*pos, viewport);
        let age = i as f32 / len as f32;
        let ch = if age < 0.4 { '·' } else { '.' };
        let depth = particle.radius * TRAIL_DEPTH_SCALE * (1.0 - age);
        frame.set(sx, sy, ch, depth, particle.color.dimmed(1.0 - age));
    }
}

fn glyph_for(shape: Shape, radius: f32) -> char {
    let large = radius >= 5.0;
    match (shape, large) {
        (Shape::Circle, false) => '•',
        (Shape::Circle, true) => '●',
        (Shape::Square, false) => '▪',
        (Shape::Square, true) => '■',
        (Shape::Triangle, _) => '▲',
        (Shape::Star, _) => '*',
        (Shape::Diamond, _) => '◆',
    }
}

/// Fades with opacity and remaining life; glowing types never drop below
/// half brightness.
fn particle_color(particle: &Particle) -> Color {
    let mut brightness = particle.opacity * (0.3 + 0.7 * particle.life);
    if particle.kind.appearance.glow {
        brightness = brightness.max(0.5);
    }
    particle.color.dimmed(brightness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use particlecosmo::{Engine, FieldKind, FieldSpec, PhysicsConfig, presets};

    const VIEW: Viewport = Viewport {
        width: 80,
        height: 24,
    };

    fn engine() -> Engine {
        let mut engine = Engine::new(PhysicsConfig {
            seed: Some(1),
            ..PhysicsConfig::default()
        })
        .expect("valid config");
        for ty in presets::catalogue() {
            engine.add_particle_type(ty).expect("valid preset");
        }
        engine
    }

    mod camera {
        use super::*;

        #[test]
        fn default_camera_at_origin() {
            let camera = Camera::default();
            assert_eq!(camera.pos, Vec2::ZERO);
            assert_eq!(camera.zoom, 1.0);
        }

        #[test]
        fn fit_centers_bounds() {
            let camera = Camera::fit(&Bounds::default(), VIEW);
            assert_eq!(camera.pos, Vec2::new(400.0, 300.0));
            assert_eq!(camera.project(camera.pos, VIEW), (40, 12));
        }

        #[test]
        fn fit_keeps_corners_on_screen() {
            let bounds = Bounds::default();
            let camera = Camera::fit(&bounds, VIEW);
            let (x0, y0) = camera.project(Vec2::new(bounds.left(), bounds.top()), VIEW);
            let (x1, y1) = camera.project(Vec2::new(bounds.right(), bounds.bottom()), VIEW);
            assert!(x0 >= 0 && y0 >= 0);
            assert!(x1 <= VIEW.width as i32 && y1 <= VIEW.height as i32);
        }

        #[test]
        fn unproject_inverts_project() {
            let camera = Camera::fit(&Bounds::default(), VIEW);
            let world = camera.unproject(20, 6, VIEW);
            assert_eq!(camera.project(world, VIEW), (20, 6));
        }
    }

    mod framebuffer {
        use super::*;

        #[test]
        fn creates_with_correct_dimensions() {
            let fb = FrameBuffer::new(80, 24);
            assert_eq!(fb.width(), 80);
            assert_eq!(fb.height(), 24);
        }

        #[test]
        fn resize_changes_dimensions_and_clears() {
            let mut fb = FrameBuffer::new(10, 10);
            fb.set(1, 1, 'A', 1.0, Color::WHITE);
            fb.resize(20, 15);
            assert_eq!(fb.width(), 20);
            assert_eq!(fb.get(1, 1).ch, ' ');
        }

        #[test]
        fn deeper_glyph_wins() {
            let mut fb = FrameBuffer::new(10, 10);
            fb.set(5, 5, 'A', 10.0, Color::rgb(0, 0, 255));
            fb.set(5, 5, 'B', 5.0, Color::rgb(255, 0, 0));
            assert_eq!(fb.get(5, 5).ch, 'A');
            fb.set(5, 5, 'C', 12.0, Color::rgb(255, 0, 0));
            assert_eq!(fb.get(5, 5).ch, 'C');
        }

        #[test]
        fn out_of_bounds_is_ignored() {
            let mut fb = FrameBuffer::new(10, 10);
            fb.set(100, 100, 'X', 10.0, Color::WHITE);
            fb.set(-1, 3, 'X', 10.0, Color::WHITE);
        }
    }

    mod glyph_for_fn {
        use super::*;

        #[test]
        fn circles_grow_with_radius() {
            assert_eq!(glyph_for(Shape::Circle, 2.0), '•');
            assert_eq!(glyph_for(Shape::Circle, 6.0), '●');
        }

        #[test]
        fn fixed_shapes_ignore_radius() {
            assert_eq!(glyph_for(Shape::Star, 1.0), '*');
            assert_eq!(glyph_for(Shape::Diamond, 9.0), '◆');
        }
    }

    mod draw_fn {
        use super::*;

        #[test]
        fn empty_world_produces_empty_frame() {
            let mut frame = FrameBuffer::new(80, 24);
            draw(&[], &[], &Camera::default(), VIEW, 0.0, &mut frame);
            for y in 0..24 {
                for x in 0..80 {
                    assert_eq!(frame.get(x, y).ch, ' ');
                }
            }
        }

        #[test]
        fn particle_at_camera_center_is_visible() {
            let mut engine = engine();
            let camera = Camera::fit(&engine.config().bounds, VIEW);
            let p = engine
                .create_particle(presets::VOID, camera.pos, Vec2::ZERO)
                .expect("created");
            let mut frame = FrameBuffer::new(80, 24);
            draw(&[p], &[], &camera, VIEW, 0.0, &mut frame);
            assert_eq!(frame.get(40, 12).ch, '◆');
        }

        #[test]
        fn particle_covers_field_center() {
            let mut engine = engine();
            let camera = Camera::fit(&engine.config().bounds, VIEW);
            let field = engine
                .add_energy_field(FieldSpec::new(FieldKind::Gravity, camera.pos, 1.0, 100.0))
                .expect("valid field");
            let mut frame = FrameBuffer::new(80, 24);
            draw(&[], &[field.clone()], &camera, VIEW, 0.0, &mut frame);
            assert_eq!(frame.get(40, 12).ch, '+');

            let p = engine
                .create_particle(presets::SPARK, camera.pos, Vec2::ZERO)
                .expect("created");
            draw(&[p], &[field], &camera, VIEW, 0.0, &mut frame);
            assert_eq!(frame.get(40, 12).ch, '*');
        }

        #[test]
        fn hidden_fields_are_skipped() {
            let mut engine = engine();
            let camera = Camera::fit(&engine.config().bounds, VIEW);
            let mut spec = FieldSpec::new(FieldKind::Magnetic, camera.pos, 1.0, 100.0);
            spec.appearance.visible = false;
            let field = engine.add_energy_field(spec).expect("valid field");
            let mut frame = FrameBuffer::new(80, 24);
            draw(&[], &[field], &camera, VIEW, 0.0, &mut frame);
            assert_eq!(frame.get(40, 12).ch, ' ');
        }
    }
}
