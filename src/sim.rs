//! In-process stand-in for the remote host.
//!
//! [`SimulatedHost::start`] returns a [`SimLink`] for the controller and spawns
//! a host task that owns the authoritative inventory. Requests travel as
//! encoded frames over a channel, are decoded by the host and answered after
//! the configured latency:
//!
//! * acknowledging host: every request is answered with a slot update, the
//!   requested item when accepted or the unchanged authoritative item when
//!   refused;
//! * non-acknowledging host: accepted requests get no answer, refused ones
//!   get a slot update restoring the authoritative item.
//!
//! [`start_ticker`] plays the physics loop, emitting "moved" every tick.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::SimulationConfig;
use crate::inventory::{InventoryView, INVENTORY_SLOTS};
use crate::item::Item;
use crate::link::{Feature, LinkError, OutboundPacket, RemoteLink};
use crate::logutil::describe_item;
use crate::physics::Body;

/// Item registry known to the simulated host.
pub const ITEMS: &[(u32, &str)] = &[
    (1, "stone"),
    (2, "grass"),
    (3, "dirt"),
    (4, "cobblestone"),
    (5, "planks"),
    (7, "bedrock"),
    (35, "wool"),
    (276, "diamond_sword"),
    (278, "diamond_pickaxe"),
    (364, "cooked_beef"),
];

pub fn item_name(id: u32) -> String {
    ITEMS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("item_{}", id))
}

/// Build a registry item by name.
pub fn item(name: &str, count: u8) -> Option<Item> {
    ITEMS
        .iter()
        .find(|(_, known)| *known == name)
        .map(|(id, name)| Item::new(*id, name, count))
}

/// Client end of the simulated connection.
#[derive(Debug)]
pub struct SimLink {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    acknowledges: bool,
    sent: Mutex<Vec<OutboundPacket>>,
}

impl SimLink {
    /// Every packet sent so far, oldest first.
    pub fn sent(&self) -> Vec<OutboundPacket> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl RemoteLink for SimLink {
    fn send(&self, packet: OutboundPacket) -> Result<(), LinkError> {
        let frame = packet.encode()?;
        self.tx.send(frame).map_err(|_| LinkError::Closed)?;
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(packet);
        Ok(())
    }

    fn supports_feature(&self, feature: Feature) -> bool {
        match feature {
            Feature::NoAckOnCreativeSetSlot => !self.acknowledges,
        }
    }
}

pub struct SimulatedHost {
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    client_view: Arc<InventoryView>,
    authoritative: Vec<Option<Item>>,
    config: SimulationConfig,
}

impl SimulatedHost {
    /// Spawn the host task. It stops once every [`SimLink`] clone is dropped.
    pub fn start(
        config: SimulationConfig,
        client_view: Arc<InventoryView>,
    ) -> (Arc<SimLink>, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let link = Arc::new(SimLink {
            tx,
            acknowledges: config.acknowledge,
            sent: Mutex::new(Vec::new()),
        });
        let authoritative = (0..INVENTORY_SLOTS)
            .map(|slot| client_view.slot(slot))
            .collect();
        let host = SimulatedHost {
            rx,
            client_view,
            authoritative,
            config,
        };
        let handle = tokio::spawn(host.run());
        (link, handle)
    }

    async fn run(mut self) {
        info!(
            "simulated host up (acknowledge={}, latency={}ms, refusing {:?})",
            self.config.acknowledge, self.config.latency_ms, self.config.reject_item_ids
        );
        while let Some(frame) = self.rx.recv().await {
            match OutboundPacket::decode(&frame) {
                Ok(packet) => {
                    tokio::time::sleep(self.config.latency()).await;
                    self.handle(packet);
                }
                Err(e) => warn!("simulated host dropped undecodable frame: {}", e),
            }
        }
        debug!("simulated host link closed");
    }

    fn handle(&mut self, packet: OutboundPacket) {
        match packet {
            OutboundPacket::SetCreativeSlot { slot, item } => {
                let index = match usize::try_from(slot) {
                    Ok(index) if index < INVENTORY_SLOTS => index,
                    _ => {
                        warn!("simulated host ignoring set_creative_slot for slot {}", slot);
                        return;
                    }
                };
                let requested = item.into_item(item_name);
                let refused = requested
                    .as_ref()
                    .is_some_and(|i| self.config.reject_item_ids.contains(&i.id));
                if refused {
                    let current = self.authoritative[index].clone();
                    debug!(
                        "simulated host refusing {} in slot {}; slot stays {}",
                        describe_item(requested.as_ref()),
                        index,
                        describe_item(current.as_ref())
                    );
                    self.client_view.apply_remote(index, current);
                    return;
                }
                self.authoritative[index] = requested.clone();
                if self.config.acknowledge {
                    self.client_view.apply_remote(index, requested);
                }
            }
        }
    }
}

/// Emit "moved" for `body` every `tick` until the handle is aborted.
pub fn start_ticker(body: Arc<Body>, tick: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            body.notify_moved();
        }
    })
}
