//! # Creative Mode Controller
//!
//! Operations that only make sense while the remote host has granted creative
//! mode: placing arbitrary items into inventory slots and flying.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use creativebot::config::Config;
//! use creativebot::creative::Creative;
//! use creativebot::geometry::Vec3;
//! use creativebot::inventory::InventoryView;
//! use creativebot::item::Item;
//! use creativebot::link::RemoteLink;
//! use creativebot::physics::Body;
//!
//! async fn stock_up(link: Arc<dyn RemoteLink>) -> anyhow::Result<()> {
//!     let inventory = Arc::new(InventoryView::new());
//!     let body = Arc::new(Body::default());
//!     let creative = Creative::new(link, inventory, body, &Config::default());
//!
//!     creative.set_inventory_slot(36, Some(Item::new(1, "stone", 64))).await?;
//!     creative.fly_to(Vec3::new(10.0, 80.0, -4.0)).await?;
//!     creative.stop_flying();
//!     Ok(())
//! }
//! ```

mod errors;
pub mod flight;
pub mod slots;

use std::sync::Arc;
use std::time::Duration;

pub use errors::CreativeError;
pub use flight::{FlightController, FlightPhase, FlightPlan};
pub use slots::{slot_index, PendingSlots, SlotSync};

use crate::config::Config;
use crate::geometry::Vec3;
use crate::inventory::InventoryView;
use crate::item::Item;
use crate::link::RemoteLink;
use crate::physics::Body;

/// The creative-mode surface of one agent connection.
#[derive(Clone)]
pub struct Creative {
    slots: SlotSync,
    flight: FlightController,
}

impl Creative {
    pub fn new(
        link: Arc<dyn RemoteLink>,
        inventory: Arc<InventoryView>,
        body: Arc<Body>,
        config: &Config,
    ) -> Self {
        Self::with_pending(link, inventory, body, Arc::new(PendingSlots::new()), config)
    }

    /// Build around an existing pending table, e.g. one shared with another
    /// component driving the same connection.
    pub fn with_pending(
        link: Arc<dyn RemoteLink>,
        inventory: Arc<InventoryView>,
        body: Arc<Body>,
        pending: Arc<PendingSlots>,
        config: &Config,
    ) -> Self {
        Self {
            slots: SlotSync::new(
                link,
                inventory,
                pending,
                config.creative.default_wait_timeout(),
                config.creative.ack_timeout(),
            ),
            flight: FlightController::new(body, config.flight.step_size(), config.flight.tick()),
        }
    }

    pub fn pending(&self) -> Arc<PendingSlots> {
        self.slots.pending()
    }

    pub async fn set_inventory_slot(
        &self,
        slot: i32,
        item: Option<Item>,
    ) -> Result<(), CreativeError> {
        self.slots
            .set_slot(slot, item, self.slots.default_wait())
            .await
    }

    pub async fn set_inventory_slot_with_timeout(
        &self,
        slot: i32,
        item: Option<Item>,
        wait_timeout: Duration,
    ) -> Result<(), CreativeError> {
        self.slots.set_slot(slot, item, wait_timeout).await
    }

    pub async fn clear_slot(&self, slot: i32) -> Result<(), CreativeError> {
        self.set_inventory_slot(slot, None).await
    }

    pub async fn clear_inventory(&self) -> Result<(), CreativeError> {
        self.slots.clear_inventory().await
    }

    pub async fn fly_to(&self, destination: Vec3) -> Result<(), CreativeError> {
        self.flight.fly_to(destination).await
    }

    pub fn start_flying(&self) {
        self.flight.start_flying();
    }

    pub fn stop_flying(&self) {
        self.flight.stop_flying();
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_flying()
    }
}
