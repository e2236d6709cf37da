//! The controlled entity as exposed by the physics subsystem.
//!
//! Only the pieces the flight controller touches are modelled: position,
//! velocity, a named override map on the physics settings, and the periodic
//! "moved" signal the tick loop emits after each physics step.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;

use crate::geometry::Vec3;

/// Override key that pins the entity's gravity.
pub const GRAVITY_OVERRIDE: &str = "gravity";

const MOVED_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct PhysicsSettings {
    pub gravity: f64,
    pub overrides: HashMap<String, f64>,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: 0.08,
            overrides: HashMap::new(),
        }
    }
}

impl PhysicsSettings {
    /// Gravity after overrides are applied.
    pub fn effective_gravity(&self) -> f64 {
        self.overrides
            .get(GRAVITY_OVERRIDE)
            .copied()
            .unwrap_or(self.gravity)
    }
}

#[derive(Debug, Clone, Default)]
struct EntityState {
    position: Vec3,
    velocity: Vec3,
    settings: PhysicsSettings,
}

/// Shared handle to the agent's own entity.
#[derive(Debug)]
pub struct Body {
    state: Mutex<EntityState>,
    moved: broadcast::Sender<Vec3>,
}

impl Default for Body {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

impl Body {
    pub fn at(position: Vec3) -> Self {
        let (moved, _) = broadcast::channel(MOVED_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(EntityState {
                position,
                ..EntityState::default()
            }),
            moved,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.lock().position
    }

    pub fn set_position(&self, position: Vec3) {
        self.lock().position = position;
    }

    /// Move by `delta` in one step, returning the new position.
    pub fn translate(&self, delta: Vec3) -> Vec3 {
        let mut state = self.lock();
        state.position += delta;
        state.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.lock().velocity
    }

    pub fn set_velocity(&self, velocity: Vec3) {
        self.lock().velocity = velocity;
    }

    pub fn settings(&self) -> PhysicsSettings {
        self.lock().settings.clone()
    }

    pub fn set_override(&self, name: &str, value: f64) {
        self.lock().settings.overrides.insert(name.to_string(), value);
    }

    /// Returns whether an override was present.
    pub fn remove_override(&self, name: &str) -> bool {
        self.lock().settings.overrides.remove(name).is_some()
    }

    pub fn has_override(&self, name: &str) -> bool {
        self.lock().settings.overrides.contains_key(name)
    }

    /// Called by the tick source after each physics step.
    pub fn notify_moved(&self) {
        let position = self.position();
        let _ = self.moved.send(position);
    }

    pub fn subscribe_moved(&self) -> broadcast::Receiver<Vec3> {
        self.moved.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EntityState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
