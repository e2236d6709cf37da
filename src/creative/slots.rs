//! Creative slot synchronization.
//!
//! Setting a slot in creative mode is a single `set creative slot` request,
//! but hosts disagree on what happens next:
//!
//! * Hosts advertising [`Feature::NoAckOnCreativeSetSlot`] never answer. The
//!   client writes the slot locally right away and then watches the slot for
//!   a short window; a host update whose item identity differs from the
//!   request means the host refused it.
//! * Other hosts answer with a slot update. The client waits (bounded by the
//!   acknowledgment timeout) for an update whose item matches the request.
//!
//! Only one request per slot may be in flight. A second caller is refused
//! immediately rather than queued.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::errors::CreativeError;
use crate::events::{self, WaitError};
use crate::inventory::{InventoryView, UpdateOrigin, INVENTORY_SLOTS};
use crate::item::{acknowledges, identity, same_stack, Item, WireSlot};
use crate::link::{Feature, OutboundPacket, RemoteLink};
use crate::logutil::describe_item;
use crate::metrics;

/// Validate a caller-supplied slot index.
pub fn slot_index(slot: i32) -> Result<usize, CreativeError> {
    match usize::try_from(slot) {
        Ok(index) if index < INVENTORY_SLOTS => Ok(index),
        _ => Err(CreativeError::InvalidSlot(slot)),
    }
}

/// Slots with a creative request awaiting resolution.
///
/// One table per connection; share it by `Arc` with anything that composes
/// the synchronizer.
#[derive(Debug, Default)]
pub struct PendingSlots {
    slots: Mutex<HashSet<usize>>,
}

impl PendingSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self, slot: usize) -> bool {
        self.lock().contains(&slot)
    }

    pub fn pending(&self) -> Vec<usize> {
        let mut slots: Vec<usize> = self.lock().iter().copied().collect();
        slots.sort_unstable();
        slots
    }

    /// Mark `slot` pending, or `None` if it already is.
    fn claim(self: &Arc<Self>, slot: usize) -> Option<PendingClaim> {
        if self.lock().insert(slot) {
            Some(PendingClaim {
                table: Arc::clone(self),
                slot,
            })
        } else {
            None
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<usize>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Clears the pending mark when dropped, whichever way the request ends.
struct PendingClaim {
    table: Arc<PendingSlots>,
    slot: usize,
}

impl Drop for PendingClaim {
    fn drop(&mut self) {
        self.table.lock().remove(&self.slot);
    }
}

#[derive(Clone)]
pub struct SlotSync {
    link: Arc<dyn RemoteLink>,
    inventory: Arc<InventoryView>,
    pending: Arc<PendingSlots>,
    default_wait: Duration,
    ack_timeout: Duration,
}

impl SlotSync {
    pub fn new(
        link: Arc<dyn RemoteLink>,
        inventory: Arc<InventoryView>,
        pending: Arc<PendingSlots>,
        default_wait: Duration,
        ack_timeout: Duration,
    ) -> Self {
        Self {
            link,
            inventory,
            pending,
            default_wait,
            ack_timeout,
        }
    }

    pub fn pending(&self) -> Arc<PendingSlots> {
        Arc::clone(&self.pending)
    }

    pub fn default_wait(&self) -> Duration {
        self.default_wait
    }

    /// Set `slot` to `item` (or empty) and resolve once the host has had its say.
    ///
    /// `wait_timeout` only applies to hosts without acknowledgment; zero
    /// returns right after the local write.
    pub async fn set_slot(
        &self,
        slot: i32,
        item: Option<Item>,
        wait_timeout: Duration,
    ) -> Result<(), CreativeError> {
        let index = slot_index(slot)?;

        if same_stack(self.inventory.slot(index).as_ref(), item.as_ref()) {
            metrics::inc_slot_fast_path();
            debug!("slot {} already holds {}", index, describe_item(item.as_ref()));
            return Ok(());
        }

        let wire = WireSlot::try_from(item.as_ref())?;

        let _claim = match self.pending.claim(index) {
            Some(claim) => claim,
            None => {
                metrics::inc_slot_conflicts();
                warn!("slot {} set while a previous set is pending; refusing", index);
                return Err(CreativeError::Conflict { slot: index });
            }
        };

        // Subscribe before sending so a fast reply cannot slip past.
        let updates = self.inventory.subscribe();
        let sent_at = Instant::now();
        self.link.send(OutboundPacket::SetCreativeSlot {
            slot: index as i16,
            item: wire,
        })?;
        metrics::inc_slot_requests_sent();
        debug!("sent set_creative_slot {} <- {}", index, describe_item(item.as_ref()));

        if self.link.supports_feature(Feature::NoAckOnCreativeSetSlot) {
            self.inventory.set_local(index, item.clone());
            if wait_timeout.is_zero() {
                metrics::inc_slot_confirmed();
                return Ok(());
            }
            let deadline = Instant::now() + wait_timeout;
            let first = events::once_until(updates, deadline, |u| {
                u.slot == index && u.origin == UpdateOrigin::Remote
            })
            .await;
            let host_value = match first {
                Ok(update) => Some(update.new),
                // The host update may be among the missed ones; the view
                // already holds the newest value for the slot.
                Err(WaitError::Lagged(missed)) => {
                    debug!("slot {} wait missed {} updates; reading the view", index, missed);
                    Some(self.inventory.slot(index))
                }
                Err(WaitError::Timeout(_)) => None,
                Err(WaitError::Closed) => return Err(CreativeError::Closed),
            };
            if let Some(host_value) = host_value {
                if identity(host_value.as_ref()) != identity(item.as_ref()) {
                    metrics::inc_slot_rejected();
                    warn!(
                        "host rejected slot {}: wanted {}, host has {}",
                        index,
                        describe_item(item.as_ref()),
                        describe_item(host_value.as_ref())
                    );
                    return Err(CreativeError::Rejected { slot: index });
                }
                // Only the first host update is inspected; sit out the window.
                tokio::time::sleep_until(deadline).await;
            }
            metrics::inc_slot_confirmed();
            return Ok(());
        }

        let deadline = sent_at + self.ack_timeout;
        let mut updates = updates;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let acked = events::once_with_cleanup(updates, Some(remaining), |u| {
                u.slot == index && acknowledges(item.as_ref(), u.new.as_ref())
            })
            .await;
            match acked {
                Ok(_) => break,
                Err(WaitError::Lagged(missed)) => {
                    // Resubscribe before reading the view so nothing falls in between.
                    updates = self.inventory.subscribe();
                    if acknowledges(item.as_ref(), self.inventory.slot(index).as_ref()) {
                        break;
                    }
                    debug!("slot {} wait missed {} updates; still waiting", index, missed);
                }
                Err(WaitError::Timeout(_)) => {
                    metrics::inc_slot_timeouts();
                    warn!(
                        "no acknowledgment for slot {} within {:?}",
                        index, self.ack_timeout
                    );
                    return Err(CreativeError::Timeout {
                        slot: index,
                        waited: self.ack_timeout,
                    });
                }
                Err(WaitError::Closed) => return Err(CreativeError::Closed),
            }
        }
        metrics::observe_ack_latency(sent_at.elapsed());
        metrics::inc_slot_confirmed();
        debug!("slot {} acknowledged", index);
        Ok(())
    }

    /// Empty every slot that is occupied right now, concurrently.
    ///
    /// Returns the first failure to arrive. Clears still in flight when that
    /// happens keep running.
    pub async fn clear_inventory(&self) -> Result<(), CreativeError> {
        let occupied = self.inventory.occupied();
        let total = occupied.len();
        if total == 0 {
            return Ok(());
        }
        debug!("clearing {} occupied slots", total);

        let (tx, mut rx) = mpsc::unbounded_channel();
        for (slot, _) in occupied {
            let sync = self.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = sync.set_slot(slot as i32, None, sync.default_wait).await;
                let _ = tx.send(result);
            });
        }
        drop(tx);

        for _ in 0..total {
            match rx.recv().await {
                Some(Ok(())) => {}
                Some(Err(e)) => return Err(e),
                None => return Err(CreativeError::Closed),
            }
        }
        Ok(())
    }
}
