use std::{
    cell::RefCell,
    error::Error,
    f32::consts::TAU,
    io,
    rc::Rc,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event as CrosstermEvent, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use particlecosmo::{
    Engine, EngineCallbacks, FieldId, FieldKind, FieldSpec, ParticleType, PerformanceMetrics,
    PhysicsConfig, PhysicsConfigPatch, SpawnRequest, Vec2,
    config::{self, DEFAULT_GRAVITY},
    presets,
    store::FieldAppearance,
    types::Color as SimColor,
};
use rand::Rng;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tracing::{debug, info};

use crate::render;

const CURSOR_STEP: f32 = 20.0;
const BURST_SIZE: usize = 6;
const SPAWN_LIFE: f32 = 8.0;
const FIELD_STRENGTH: f32 = 40.0;
const FIELD_RADIUS: f32 = 120.0;
const FIELD_KIND_COUNT: usize = 5;

fn field_kind(idx: usize) -> (&'static str, FieldKind) {
    match idx % FIELD_KIND_COUNT {
        0 => ("attraction", FieldKind::Attraction),
        1 => ("repulsion", FieldKind::Repulsion),
        2 => ("gravity", FieldKind::Gravity),
        3 => ("magnetic", FieldKind::Magnetic),
        _ => ("electric", FieldKind::Electric),
    }
}

pub fn run(physics: PhysicsConfig) -> Result<(), Box<dyn Error>> {
    let mut engine = Engine::new(physics)?;
    let stats = Rc::new(RefCell::new(HostStats::default()));
    engine.set_callbacks(observe(&stats));

    let mut ui_state = UiState::new(engine.config().bounds.center());
    for ty in &ui_state.presets {
        engine.add_particle_type(ty.clone())?;
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    engine.start();
    let mut last_frame = Instant::now();
    let mut last_render = Instant::now();
    let render_interval = Duration::from_secs_f32(1.0 / config::RENDER_HZ);
    let mut render_counter = 0_u32;
    let mut last_fps_sample = Instant::now();
    let mut render_fps = 0.0_f32;

    loop {
        let now = Instant::now();
        engine.advance(now - last_frame);
        last_frame = now;

        while event::poll(Duration::from_millis(0))? {
            if let CrosstermEvent::Key(key) = event::read()? {
                if ui_state.handle_key(key.code, &mut engine) == Flow::Quit {
                    engine.cleanup();
                    shutdown_terminal(&mut terminal)?;
                    return Ok(());
                }
            }
        }

        if last_render.elapsed() >= render_interval {
            let particles = engine.particles();
            let fields = engine.energy_fields();
            if last_fps_sample.elapsed() >= Duration::from_secs(1) {
                let secs = last_fps_sample.elapsed().as_secs_f32();
                render_fps = render_counter as f32 / secs;
                render_counter = 0;
                last_fps_sample = Instant::now();
            }
            let host = stats.borrow();
            let bounds = engine.config().bounds;
            let sim_time = engine.sim_time();
            let running = engine.is_running();

            terminal.draw(|frame| {
                let size = frame.size();
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(3),
                        Constraint::Min(3),
                        Constraint::Length(3),
                    ])
                    .split(size);

                let m = &host.metrics;
                let header = Paragraph::new(format!(
                    "{} | particles: {} | fields: {} | collisions: {} | checks: {} | tick fps: {:.1} | physics: {:.2} ms | render fps: {:.1} | created: {} | destroyed: {}",
                    if running { "running" } else { "paused" },
                    particles.len(),
                    fields.len(),
                    m.collisions,
                    m.collision_checks,
                    m.fps,
                    m.physics_time_ms,
                    render_fps,
                    host.created,
                    host.destroyed,
                ))
                .block(Block::default().borders(Borders::ALL).title("particlecosmo"));
                frame.render_widget(header, chunks[0]);

                // borders eat one cell on each side
                let viewport = render::Viewport {
                    width: chunks[1].width.saturating_sub(2),
                    height: chunks[1].height.saturating_sub(2),
                };
                let camera = render::Camera::fit(&bounds, viewport);
                ui_state.ensure_viewport(viewport);
                render::draw(
                    &particles,
                    &fields,
                    &camera,
                    viewport,
                    sim_time,
                    &mut ui_state.framebuf,
                );

                let cursor = camera.project(ui_state.cursor, viewport);
                let framebuf = &ui_state.framebuf;
                let lines: Vec<Line> = (0..framebuf.height())
                    .map(|y| {
                        let spans: Vec<Span> = (0..framebuf.width())
                            .map(|x| {
                                if (x as i32, y as i32) == cursor {
                                    return Span::styled("┼", Style::default().fg(Color::Yellow));
                                }
                                let cell = framebuf.get(x, y);
                                Span::styled(
                                    cell.ch.to_string(),
                                    Style::default().fg(color_for(cell.color)),
                                )
                            })
                            .collect();
                        Line::from(spans)
                    })
                    .collect();
                let world = Paragraph::new(lines)
                    .block(Block::default().borders(Borders::ALL).title("World"));
                frame.render_widget(world, chunks[1]);

                let mut controls = format!(
                    "preset: {} [1-5] | ←↑↓→: cursor | space: spawn | f: {} field | r: remove field | t: toggle fields | g: gravity | p: pause | s: step | c: clear | q: quit",
                    ui_state.selected_preset().name,
                    field_kind(ui_state.field_kind).0,
                );
                if let Some(err) = &host.last_error {
                    controls.push_str(" | last error: ");
                    controls.push_str(err);
                }
                let footer = Paragraph::new(controls)
                    .block(Block::default().borders(Borders::ALL).title("Controls"));
                frame.render_widget(footer, chunks[2]);
            })?;
            drop(host);

            last_render = Instant::now();
            render_counter += 1;
        }

        std::thread::sleep(Duration::from_millis(1));
    }
}

fn shutdown_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<(), Box<dyn Error>> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Running totals fed by engine callbacks.
#[derive(Debug, Default)]
struct HostStats {
    metrics: PerformanceMetrics,
    created: u64,
    destroyed: u64,
    last_error: Option<String>,
}

fn observe(stats: &Rc<RefCell<HostStats>>) -> EngineCallbacks {
    let created = Rc::clone(stats);
    let destroyed = Rc::clone(stats);
    let perf = Rc::clone(stats);
    let errors = Rc::clone(stats);
    EngineCallbacks::new()
        .on_particle_created(move |_| created.borrow_mut().created += 1)
        .on_particle_destroyed(move |_| destroyed.borrow_mut().destroyed += 1)
        .on_performance_update(move |m| perf.borrow_mut().metrics = *m)
        .on_error(move |err| errors.borrow_mut().last_error = Some(err.to_string()))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct UiState {
    framebuf: render::FrameBuffer,
    presets: Vec<ParticleType>,
    selected: usize,
    field_kind: usize,
    fields: Vec<FieldId>,
    fields_active: bool,
    gravity_on: bool,
    cursor: Vec2,
}

impl UiState {
    fn new(cursor: Vec2) -> Self {
        Self {
            framebuf: render::FrameBuffer::new(0, 0),
            presets: presets::catalogue(),
            selected: 0,
            field_kind: 0,
            fields: Vec::new(),
            fields_active: true,
            gravity_on: true,
            cursor,
        }
    }

    fn ensure_viewport(&mut self, viewport: render::Viewport) {
        if self.framebuf.width() != viewport.width || self.framebuf.height() != viewport.height {
            self.framebuf.resize(viewport.width, viewport.height);
        }
    }

    fn selected_preset(&self) -> &ParticleType {
        &self.presets[self.selected]
    }

    fn handle_key(&mut self, code: KeyCode, engine: &mut Engine) -> Flow {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Up => self.move_cursor(Vec2::new(0.0, -CURSOR_STEP), engine),
            KeyCode::Down => self.move_cursor(Vec2::new(0.0, CURSOR_STEP), engine),
            KeyCode::Left => self.move_cursor(Vec2::new(-CURSOR_STEP, 0.0), engine),
            KeyCode::Right => self.move_cursor(Vec2::new(CURSOR_STEP, 0.0), engine),
            KeyCode::Char(ch @ '1'..='5') => {
                let idx = ch as usize - '1' as usize;
                if idx < self.presets.len() {
                    self.selected = idx;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.spawn_burst(engine),
            KeyCode::Char('f') => self.add_field(engine),
            KeyCode::Char('r') => {
                if let Some(id) = self.fields.pop() {
                    engine.remove_energy_field(id);
                }
            }
            KeyCode::Char('t') => {
                self.fields_active = !self.fields_active;
                for &id in &self.fields {
                    engine.set_field_active(id, self.fields_active);
                }
            }
            KeyCode::Char('g') => {
                self.gravity_on = !self.gravity_on;
                let gravity = if self.gravity_on { DEFAULT_GRAVITY } else { Vec2::ZERO };
                engine.update_config(PhysicsConfigPatch {
                    gravity: Some(gravity),
                    ..Default::default()
                });
            }
            KeyCode::Char('p') => {
                if engine.is_running() {
                    engine.stop();
                } else {
                    engine.start();
                }
            }
            KeyCode::Char('s') => {
                if !engine.is_running() {
                    engine.step(engine.config().time_step);
                }
            }
            KeyCode::Char('c') => {
                let ids: Vec<_> = engine.particles().iter().map(|p| p.id).collect();
                for id in ids {
                    engine.destroy_particle(id);
                }
                engine.clear_collision_events();
                info!("cleared all particles");
            }
            _ => {}
        }
        Flow::Continue
    }

    fn move_cursor(&mut self, delta: Vec2, engine: &Engine) {
        let bounds = engine.config().bounds;
        let next = self.cursor + delta;
        self.cursor = Vec2::new(
            next.x.clamp(bounds.left(), bounds.right()),
            next.y.clamp(bounds.top(), bounds.bottom()),
        );
    }

    fn spawn_burst(&self, engine: &mut Engine) {
        let preset = self.selected_preset();
        let speed = preset.behavior.speed;
        let mut rng = rand::thread_rng();
        let mut spawned = 0;
        for _ in 0..BURST_SIZE {
            let velocity = Vec2::from_angle(rng.gen_range(0.0..TAU)) * speed;
            let request = SpawnRequest::new(preset.id.clone(), self.cursor)
                .with_velocity(velocity)
                .with_max_life(SPAWN_LIFE)
                .with_source("keyboard");
            if engine.spawn(request).is_some() {
                spawned += 1;
            }
        }
        debug!(preset = %preset.id, spawned, "burst spawned");
    }

    fn add_field(&mut self, engine: &mut Engine) {
        let (name, kind) = field_kind(self.field_kind);
        let spec = FieldSpec::new(kind, self.cursor, FIELD_STRENGTH, FIELD_RADIUS)
            .with_appearance(FieldAppearance {
                color: field_color(self.field_kind),
                pulse: true,
                ..FieldAppearance::default()
            });
        let spec = if self.fields_active { spec } else { spec.inactive() };
        match engine.add_energy_field(spec) {
            Ok(field) => {
                self.fields.push(field.id);
                debug!(kind = name, field_id = field.id, "field placed");
            }
            Err(err) => debug!(error = %err, "field rejected"),
        }
        self.field_kind = (self.field_kind + 1) % FIELD_KIND_COUNT;
    }
}

fn field_color(kind: usize) -> SimColor {
    match kind {
        0 => SimColor::rgb(80, 200, 120),
        1 => SimColor::rgb(230, 80, 80),
        2 => SimColor::rgb(80, 160, 255),
        3 => SimColor::rgb(220, 120, 255),
        _ => SimColor::rgb(255, 220, 80),
    }
}

fn color_for(color: SimColor) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}
