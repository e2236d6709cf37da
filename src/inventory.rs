//! Local mirror of the agent's inventory window.
//!
//! The remote host is authoritative; this view holds the last known value of
//! each slot and broadcasts a [`SlotUpdate`] whenever one changes, whether the
//! change came from the host or from an optimistic local write.

use std::sync::Mutex;

use log::trace;
use tokio::sync::broadcast;

use crate::item::Item;
use crate::logutil::describe_item;

/// Slots in the player inventory window for this protocol version.
pub const INVENTORY_SLOTS: usize = 45;

const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Where a slot change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOrigin {
    /// Optimistic write made by this client.
    Local,
    /// Reported by the remote host.
    Remote,
}

/// Notification emitted for every slot change.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotUpdate {
    pub slot: usize,
    pub old: Option<Item>,
    pub new: Option<Item>,
    pub origin: UpdateOrigin,
}

#[derive(Debug)]
pub struct InventoryView {
    slots: Mutex<Vec<Option<Item>>>,
    updates: broadcast::Sender<SlotUpdate>,
}

impl Default for InventoryView {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryView {
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            slots: Mutex::new(vec![None; INVENTORY_SLOTS]),
            updates,
        }
    }

    /// Current value of `slot`; out-of-range slots read as empty.
    pub fn slot(&self, slot: usize) -> Option<Item> {
        self.lock().get(slot).cloned().flatten()
    }

    /// Snapshot of every non-empty slot, in slot order.
    pub fn occupied(&self) -> Vec<(usize, Item)> {
        self.lock()
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.clone().map(|item| (i, item)))
            .collect()
    }

    /// Subscribe to slot changes. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<SlotUpdate> {
        self.updates.subscribe()
    }

    /// Optimistic client-side write used when the host will not acknowledge.
    pub fn set_local(&self, slot: usize, item: Option<Item>) {
        trace!("local write slot {} <- {}", slot, describe_item(item.as_ref()));
        self.update(slot, item, UpdateOrigin::Local);
    }

    /// Apply a slot value reported by the remote host.
    pub fn apply_remote(&self, slot: usize, item: Option<Item>) {
        trace!("remote update slot {} <- {}", slot, describe_item(item.as_ref()));
        self.update(slot, item, UpdateOrigin::Remote);
    }

    fn update(&self, slot: usize, item: Option<Item>, origin: UpdateOrigin) {
        let old = {
            let mut slots = self.lock();
            match slots.get_mut(slot) {
                Some(cell) => std::mem::replace(cell, item.clone()),
                None => return,
            }
        };
        // No receivers is not an error: nobody is waiting on this slot.
        let _ = self.updates.send(SlotUpdate {
            slot,
            old,
            new: item,
            origin,
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Option<Item>>> {
        // A panic while holding this lock cannot leave the Vec half-written.
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}
