mod callbacks;
mod collision;
mod field_solver;
mod integrator;
mod interaction;
mod perf;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

pub use callbacks::EngineCallbacks;
pub use collision::CollisionEvent;
pub use perf::PerformanceMetrics;

use crate::{
    config::{self, PhysicsConfig, PhysicsConfigPatch},
    error::{ConfigError, EngineError},
    registry::{ParticleType, TypeRegistry},
    store::{
        EnergyField, FieldSpec, FieldStore, Offspring, Particle, ParticleMetadata, ParticleOrigin,
        ParticleStore, SpawnRequest,
    },
    types::{FieldId, ParticleId, Vec2},
};

use collision::CollisionLog;
use perf::{PerfTracker, TickCounts};

/// The simulation. Owns every particle, field and collision event; hosts
/// only ever receive copies or shared views.
///
/// All calls are assumed to happen between ticks. There is no internal
/// locking, so a multi-threaded host must serialize access itself.
pub struct Engine {
    config: PhysicsConfig,
    registry: TypeRegistry,
    particles: ParticleStore,
    fields: FieldStore,
    collisions: CollisionLog,
    callbacks: EngineCallbacks,
    perf: PerfTracker,
    rng: StdRng,
    running: bool,
    accumulator: f32,
    clock: f32,
    interaction_acc: Vec<Vec2>,
}

impl Engine {
    pub fn new(config: PhysicsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: PhysicsConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            registry: TypeRegistry::new(),
            particles: ParticleStore::new(config.max_particles),
            fields: FieldStore::new(),
            collisions: CollisionLog::new(config::COLLISION_HISTORY_LIMIT),
            callbacks: EngineCallbacks::default(),
            perf: PerfTracker::new(Instant::now()),
            rng,
            running: false,
            accumulator: 0.0,
            clock: 0.0,
            interaction_acc: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Simulation clock in seconds.
    pub fn sim_time(&self) -> f32 {
        self.clock
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.accumulator = 0.0;
        self.perf.reset(Instant::now());
        info!(particles = self.particles.len(), "simulation started");
    }

    /// Prevents further ticks; a tick already in progress is never interrupted.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        info!(ticks = self.perf.metrics().ticks, "simulation stopped");
    }

    /// Display-refresh hook: feeds `elapsed` wall time to the scheduler and
    /// returns how many ticks ran. Does nothing while stopped.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if !self.running {
            return 0;
        }
        self.perf.record_frame(elapsed);
        let frame = elapsed.as_secs_f32();
        if frame <= 0.0 {
            return 0;
        }

        if !self.config.fixed_time_step {
            self.step(frame.min(config::MAX_FRAME_DT));
            return 1;
        }

        let step = self.config.time_step;
        let max_backlog = step * config::MAX_STEPS_PER_FRAME as f32;
        self.accumulator = (self.accumulator + frame).min(max_backlog);
        let mut ticks = 0;
        while self.accumulator >= step {
            self.step(step);
            self.accumulator -= step;
            ticks += 1;
        }
        ticks
    }

    /// Runs exactly one tick of `dt` seconds, whether or not the loop is running.
    pub fn step(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let started = Instant::now();
        self.clock += dt;

        let pass = integrator::integrate(
            self.particles.as_mut_slice(),
            &self.config,
            dt,
            &mut self.rng,
        );
        for err in pass.errors {
            self.report(err);
        }
        for id in pass.expired {
            self.destroy_particle(id);
        }

        if self.config.enable_fields {
            let errors =
                field_solver::apply_fields(self.fields.as_slice(), self.particles.as_mut_slice());
            for err in errors {
                self.report(err);
            }
        }

        let mut collision_checks = 0;
        let mut collisions = 0;
        if self.config.enable_collisions {
            let pass =
                collision::resolve(self.particles.as_mut_slice(), self.clock, &mut self.rng);
            collision_checks = pass.checks;
            collisions = pass.events.len();
            for event in pass.events {
                self.callbacks.collision(&event);
                self.collisions.push(event);
            }
            for err in pass.errors {
                self.report(err);
            }
            for id in pass.consumed {
                self.destroy_particle(id);
            }
            for child in pass.offspring {
                self.spawn_offspring(child);
            }
        }

        if self.config.enable_interactions {
            interaction::apply_interactions(
                self.particles.as_mut_slice(),
                &mut self.interaction_acc,
            );
        }

        self.perf.record_tick(
            started.elapsed(),
            TickCounts {
                particles: self.particles.len(),
                fields: self.fields.len(),
                collision_checks,
                collisions,
            },
        );
        if self.config.performance_monitoring {
            if let Some(metrics) = self.perf.sample(Instant::now()) {
                self.callbacks.performance(&metrics);
            }
        }
    }

    pub fn add_particle_type(&mut self, particle_type: ParticleType) -> Result<(), EngineError> {
        self.registry.insert(particle_type)?;
        Ok(())
    }

    /// Unregisters a type. Refused while any live particle still uses it.
    pub fn remove_particle_type(&mut self, id: &str) -> Result<Arc<ParticleType>, EngineError> {
        let live = self.particles.count_of_type(id);
        if live > 0 {
            return Err(EngineError::TypeInUse {
                id: id.to_string(),
                live,
            });
        }
        self.registry
            .remove(id)
            .ok_or_else(|| EngineError::UnknownType(id.to_string()))
    }

    pub fn particle_types(&self) -> Vec<Arc<ParticleType>> {
        self.registry.snapshot()
    }

    pub fn create_particle(
        &mut self,
        type_id: &str,
        position: Vec2,
        velocity: Vec2,
    ) -> Option<Particle> {
        self.spawn(SpawnRequest::new(type_id, position).with_velocity(velocity))
    }

    /// Creates a particle from the type's current definition. Returns `None`
    /// when the store is full, the type is unknown or a vector is not finite.
    pub fn spawn(&mut self, request: SpawnRequest) -> Option<Particle> {
        if !(request.position.is_finite() && request.velocity.is_finite()) {
            self.report(EngineError::InvalidParticle(format!(
                "position and velocity must be finite, got {:?} and {:?}",
                request.position, request.velocity
            )));
            return None;
        }
        let Some(kind) = self.registry.get(&request.type_id).cloned() else {
            self.report(EngineError::UnknownType(request.type_id));
            return None;
        };
        let metadata = ParticleMetadata {
            created_at: self.clock,
            origin: ParticleOrigin::Spawned,
            source: request.source,
            custom: request.custom,
        };
        let (position, velocity, max_life) = (request.position, request.velocity, request.max_life);
        self.admit(|id| Particle::from_type(id, kind, position, velocity, max_life, metadata))
    }

    pub fn destroy_particle(&mut self, id: ParticleId) -> bool {
        match self.particles.remove(id) {
            Some(particle) => {
                debug!(particle_id = id, type_id = %particle.type_id(), "particle destroyed");
                self.callbacks.particle_destroyed(&particle);
                true
            }
            None => {
                warn!(particle_id = id, "destroy requested for unknown particle");
                false
            }
        }
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id)
    }

    pub fn particles(&self) -> Vec<Particle> {
        self.particles.snapshot()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn add_energy_field(&mut self, spec: FieldSpec) -> Result<EnergyField, EngineError> {
        let field = self.fields.insert(spec)?;
        debug!(field_id = field.id, "energy field added");
        Ok(field)
    }

    pub fn remove_energy_field(&mut self, id: FieldId) -> bool {
        if self.fields.remove(id).is_none() {
            warn!(field_id = id, "removal requested for unknown energy field");
            return false;
        }
        debug!(field_id = id, "energy field removed");
        true
    }

    pub fn set_field_active(&mut self, id: FieldId, active: bool) -> bool {
        match self.fields.get_mut(id) {
            Some(field) => {
                field.active = active;
                true
            }
            None => false,
        }
    }

    pub fn move_energy_field(&mut self, id: FieldId, position: Vec2) -> bool {
        match self.fields.get_mut(id) {
            Some(field) if position.is_finite() => {
                field.position = position;
                true
            }
            _ => false,
        }
    }

    pub fn energy_fields(&self) -> Vec<EnergyField> {
        self.fields.snapshot()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn collision_events(&self) -> Vec<CollisionEvent> {
        self.collisions.snapshot()
    }

    pub fn clear_collision_events(&mut self) {
        self.collisions.clear();
    }

    pub fn performance_metrics(&self) -> PerformanceMetrics {
        self.perf.metrics()
    }

    pub fn set_callbacks(&mut self, callbacks: EngineCallbacks) {
        self.callbacks = callbacks;
    }

    /// Merges `patch` into the live config; it applies from the next tick.
    /// Lowering `max_particles` below the live count destroys the oldest
    /// particles.
    pub fn update_config(&mut self, patch: PhysicsConfigPatch) {
        self.config.apply(patch);
        if self.particles.capacity() != self.config.max_particles {
            let evicted = self.particles.set_capacity(self.config.max_particles);
            if !evicted.is_empty() {
                warn!(
                    evicted = evicted.len(),
                    max = self.config.max_particles,
                    "particle limit lowered below live count"
                );
            }
            for particle in &evicted {
                self.callbacks.particle_destroyed(particle);
            }
        }
        info!(config = ?self.config, "config updated");
    }

    /// Stops the loop and releases every particle, field, type and event.
    pub fn cleanup(&mut self) {
        self.stop();
        for particle in self.particles.drain_all() {
            self.callbacks.particle_destroyed(&particle);
        }
        self.fields.clear();
        self.registry.clear();
        self.collisions.clear();
        self.accumulator = 0.0;
        self.perf.reset(Instant::now());
        info!("engine cleaned up");
    }

    fn spawn_offspring(&mut self, child: Offspring) -> Option<Particle> {
        let metadata = ParticleMetadata {
            created_at: self.clock,
            origin: child.origin,
            ..ParticleMetadata::default()
        };
        self.admit(|id| {
            let mut particle = Particle::from_type(
                id,
                child.kind,
                child.position,
                child.velocity,
                child.max_life,
                metadata,
            );
            if let Some(mass) = child.mass {
                particle.mass = mass;
            }
            if let Some(energy) = child.energy {
                particle.energy = energy;
            }
            particle
        })
    }

    fn admit(&mut self, build: impl FnOnce(ParticleId) -> Particle) -> Option<Particle> {
        if self.particles.is_full() {
            self.report(EngineError::CapacityReached {
                max: self.particles.capacity(),
            });
            return None;
        }
        let id = self.particles.allocate_id();
        let stored = match self.particles.insert(build(id)) {
            Ok(stored) => stored,
            Err(err) => {
                self.report(err);
                return None;
            }
        };
        debug!(particle_id = stored.id, type_id = %stored.type_id(), "particle created");
        self.callbacks.particle_created(stored);
        Some(stored.clone())
    }

    fn report(&mut self, err: EngineError) {
        warn!(error = %err, "simulation error");
        self.callbacks.error(&err);
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::build(PhysicsConfig::default())
    }
}
