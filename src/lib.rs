//! # creativebot - Creative Mode Control for Game Agents
//!
//! creativebot drives an automated agent's inventory and movement while the
//! remote host has granted it creative mode.
//!
//! ## Features
//!
//! - **Slot Synchronization**: Set or clear any inventory slot with a request/acknowledgment
//!   protocol that copes with hosts that never acknowledge, refuses overlapping requests on
//!   the same slot, and always releases its per-slot guard.
//! - **Straight-Line Flight**: Gravity override plus fixed-step motion synchronized to the
//!   physics tick, finishing with an exact snap and a move confirmation.
//! - **Simulated Host**: An in-process host for demos and tests (feature `simulation`).
//! - **Async Design**: Built on Tokio; waits are cooperative and cancel-safe.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use creativebot::config::Config;
//! use creativebot::creative::Creative;
//! use creativebot::inventory::InventoryView;
//! use creativebot::physics::Body;
//! use creativebot::sim::{self, SimulatedHost};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("creativebot.toml").await?;
//!     let inventory = Arc::new(InventoryView::new());
//!     let body = Arc::new(Body::default());
//!     let (link, _host) = SimulatedHost::start(config.simulation.clone(), Arc::clone(&inventory));
//!
//!     let creative = Creative::new(link, inventory, body, &config);
//!     creative.set_inventory_slot(36, sim::item("stone", 64)).await?;
//!     creative.clear_inventory().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`creative`] - Slot synchronizer, flight controller and the public facade
//! - [`inventory`] - Local inventory mirror with per-slot change notifications
//! - [`physics`] - The controlled entity and its "moved" signal
//! - [`link`] - Outbound requests and capability negotiation
//! - [`events`] - Waiting for the next matching event with timeout and cleanup
//! - [`item`], [`geometry`] - Value types
//! - [`config`] - Configuration management
//! - [`sim`] - Simulated remote host
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ Creative facade │ ← Public operations
//! └─────────────────┘
//!     │         │
//! ┌────────┐ ┌────────┐
//! │ Slots  │ │ Flight │ ← Protocols
//! └────────┘ └────────┘
//!     │         │
//! ┌──────────────────────────┐
//! │ Link / Inventory / Body  │ ← Collaborators
//! └──────────────────────────┘
//! ```

pub mod config;
pub mod creative;
pub mod events;
pub mod geometry;
pub mod inventory;
pub mod item;
pub mod link;
pub mod logutil;
pub mod metrics;
pub mod physics;
#[cfg(feature = "simulation")]
pub mod sim;
