//! Straight-line creative flight.
//!
//! Flight pins the entity's gravity with a physics override and walks it to
//! the destination in fixed steps, one per tick. There is no obstacle
//! handling: the caller must make sure the path is clear.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use super::errors::CreativeError;
use crate::events;
use crate::geometry::Vec3;
use crate::metrics;
use crate::physics::{Body, GRAVITY_OVERRIDE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightPhase {
    Idle,
    Stepping,
    Arrived,
}

/// One flight toward a fixed destination, advanced once per tick.
#[derive(Debug, Clone)]
pub struct FlightPlan {
    destination: Vec3,
    step_size: f64,
    phase: FlightPhase,
    steps: u32,
}

impl FlightPlan {
    pub fn new(destination: Vec3, step_size: f64) -> Self {
        Self {
            destination,
            step_size,
            phase: FlightPhase::Idle,
            steps: 0,
        }
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Apply one tick to `body`.
    ///
    /// While the remaining distance exceeds one step the body moves one step
    /// toward the destination with gravity pinned and velocity zeroed. The
    /// distance is measured from wherever the body is now, so external nudges
    /// between ticks are absorbed. Once within a step the body is placed
    /// exactly on the destination.
    pub fn advance(&mut self, body: &Body) -> FlightPhase {
        if self.phase == FlightPhase::Arrived {
            return self.phase;
        }
        let displacement = self.destination - body.position();
        let magnitude = displacement.magnitude();
        if magnitude > self.step_size {
            body.set_override(GRAVITY_OVERRIDE, 0.0);
            body.set_velocity(Vec3::ZERO);
            body.translate(displacement.scaled(self.step_size / magnitude));
            self.steps += 1;
            self.phase = FlightPhase::Stepping;
        } else {
            body.set_position(self.destination);
            self.phase = FlightPhase::Arrived;
        }
        self.phase
    }
}

#[derive(Debug, Clone)]
pub struct FlightController {
    body: Arc<Body>,
    step_size: f64,
    tick: Duration,
}

impl FlightController {
    pub fn new(body: Arc<Body>, step_size: f64, tick: Duration) -> Self {
        Self {
            body,
            step_size,
            tick,
        }
    }

    pub fn is_flying(&self) -> bool {
        self.body.has_override(GRAVITY_OVERRIDE)
    }

    pub fn start_flying(&self) {
        self.body.set_override(GRAVITY_OVERRIDE, 0.0);
    }

    pub fn stop_flying(&self) {
        if self.body.remove_override(GRAVITY_OVERRIDE) {
            debug!("gravity override removed");
        }
    }

    /// Fly in a straight line to `destination` and return after the physics
    /// loop has reported a move past the final position.
    ///
    /// There is no upper bound on the final wait; wrap the call in a timeout
    /// if the world may stop ticking.
    pub async fn fly_to(&self, destination: Vec3) -> Result<(), CreativeError> {
        self.start_flying();
        let origin = self.body.position();
        info!("flying {} -> {}", origin, destination);

        let mut plan = FlightPlan::new(destination, self.step_size);
        while plan.advance(&self.body) == FlightPhase::Stepping {
            metrics::inc_flight_ticks();
            tokio::time::sleep(self.tick).await;
        }

        let moved = self.body.subscribe_moved();
        events::once(moved)
            .await
            .map_err(|_| CreativeError::Closed)?;
        metrics::inc_flights_completed();
        debug!("arrived at {} after {} steps", destination, plan.steps());
        Ok(())
    }
}
