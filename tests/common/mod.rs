//! Test doubles & fixtures shared by the integration tests.

use std::sync::{Arc, Mutex};

use creativebot::config::Config;
use creativebot::creative::Creative;
use creativebot::inventory::InventoryView;
use creativebot::item::Item;
use creativebot::link::{Feature, LinkError, OutboundPacket, RemoteLink};
use creativebot::physics::Body;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// A link that records what it is asked to send and never answers.
/// Tests play the host by writing to the inventory view directly.
#[derive(Debug, Default)]
pub struct ScriptedLink {
    pub no_ack: bool,
    pub fail_sends: bool,
    sent: Mutex<Vec<OutboundPacket>>,
}

impl ScriptedLink {
    pub fn acknowledging() -> Self {
        Self::default()
    }

    pub fn silent() -> Self {
        Self {
            no_ack: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutboundPacket> {
        self.sent.lock().unwrap().clone()
    }

    /// Slots named by the recorded requests, in send order.
    #[allow(dead_code)]
    pub fn sent_slots(&self) -> Vec<i16> {
        self.sent()
            .into_iter()
            .map(|p| match p {
                OutboundPacket::SetCreativeSlot { slot, .. } => slot,
            })
            .collect()
    }
}

impl RemoteLink for ScriptedLink {
    fn send(&self, packet: OutboundPacket) -> Result<(), LinkError> {
        if self.fail_sends {
            return Err(LinkError::Closed);
        }
        self.sent.lock().unwrap().push(packet);
        Ok(())
    }

    fn supports_feature(&self, feature: Feature) -> bool {
        match feature {
            Feature::NoAckOnCreativeSetSlot => self.no_ack,
        }
    }
}

pub struct Fixture {
    pub link: Arc<ScriptedLink>,
    pub inventory: Arc<InventoryView>,
    pub body: Arc<Body>,
    pub creative: Creative,
}

pub fn fixture(link: ScriptedLink) -> Fixture {
    let link = Arc::new(link);
    let inventory = Arc::new(InventoryView::new());
    let body = Arc::new(Body::default());
    let creative = Creative::new(
        link.clone(),
        Arc::clone(&inventory),
        Arc::clone(&body),
        &Config::default(),
    );
    Fixture {
        link,
        inventory,
        body,
        creative,
    }
}

#[allow(dead_code)]
pub fn stone(count: u8) -> Item {
    Item::new(1, "stone", count)
}

#[allow(dead_code)]
pub fn dirt(count: u8) -> Item {
    Item::new(3, "dirt", count)
}

/// Yield until `slot` shows up as pending (the spawned request has been sent).
#[allow(dead_code)]
pub async fn until_pending(creative: &Creative, slot: usize) {
    for _ in 0..1000 {
        if creative.pending().is_pending(slot) {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("slot {slot} never became pending");
}

/// Stand-in physics loop: "moved" every `tick`.
#[allow(dead_code)]
pub fn start_ticker(body: Arc<Body>, tick: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        loop {
            interval.tick().await;
            body.notify_moved();
        }
    })
}
