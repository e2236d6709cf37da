//! End-to-end runs against the in-process host.
#![cfg(feature = "simulation")]

use std::sync::Arc;

use creativebot::config::{Config, SimulationConfig};
use creativebot::creative::{Creative, CreativeError};
use creativebot::geometry::Vec3;
use creativebot::inventory::InventoryView;
use creativebot::physics::Body;
use creativebot::sim::{self, SimulatedHost};
use tokio::time::{Duration, Instant};

struct Session {
    inventory: Arc<InventoryView>,
    body: Arc<Body>,
    link: Arc<sim::SimLink>,
    creative: Creative,
}

fn session(acknowledge: bool, reject_item_ids: Vec<u32>) -> Session {
    let config = Config {
        simulation: SimulationConfig {
            acknowledge,
            reject_item_ids,
            ..SimulationConfig::default()
        },
        ..Config::default()
    };
    let inventory = Arc::new(InventoryView::new());
    let body = Arc::new(Body::default());
    let (link, _host) = SimulatedHost::start(config.simulation.clone(), Arc::clone(&inventory));
    let creative = Creative::new(
        link.clone(),
        Arc::clone(&inventory),
        Arc::clone(&body),
        &config,
    );
    Session {
        inventory,
        body,
        link,
        creative,
    }
}

#[tokio::test(start_paused = true)]
async fn acknowledging_host_places_and_clears() {
    let s = session(true, Vec::new());
    let start = Instant::now();
    s.creative
        .set_inventory_slot(36, sim::item("stone", 64))
        .await
        .expect("stone");
    // Answered after the host latency, well before the acknowledgment timeout.
    assert!(start.elapsed() < Duration::from_millis(1000));
    assert_eq!(s.inventory.slot(36), sim::item("stone", 64));

    s.creative
        .set_inventory_slot(37, sim::item("diamond_sword", 1))
        .await
        .expect("sword");
    s.creative.clear_inventory().await.expect("clear");
    assert!(s.inventory.occupied().is_empty());
    assert_eq!(s.link.sent().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn acknowledging_host_refusal_times_out() {
    let s = session(true, vec![7]);
    let err = s
        .creative
        .set_inventory_slot(36, sim::item("bedrock", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, CreativeError::Timeout { slot: 36, .. }), "{err}");
    assert_eq!(s.inventory.slot(36), None);
    assert!(!s.creative.pending().is_pending(36));
}

#[tokio::test(start_paused = true)]
async fn silent_host_accepts_by_staying_quiet() {
    let s = session(false, Vec::new());
    s.creative
        .set_inventory_slot(40, sim::item("cooked_beef", 16))
        .await
        .expect("beef");
    assert_eq!(s.inventory.slot(40), sim::item("cooked_beef", 16));
}

#[tokio::test(start_paused = true)]
async fn silent_host_refusal_is_detected() {
    let s = session(false, vec![7]);
    let err = s
        .creative
        .set_inventory_slot(36, sim::item("bedrock", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, CreativeError::Rejected { slot: 36 }), "{err}");
    // The host restored its own value over the optimistic write.
    assert_eq!(s.inventory.slot(36), None);
}

#[tokio::test(start_paused = true)]
async fn flight_with_simulated_ticks() {
    let s = session(false, Vec::new());
    let ticker = sim::start_ticker(Arc::clone(&s.body), Duration::from_millis(50));
    let destination = Vec3::new(2.0, 3.0, -1.0);
    s.creative.fly_to(destination).await.expect("flight");
    assert_eq!(s.body.position(), destination);
    s.creative.stop_flying();
    assert!(!s.creative.is_flying());
    ticker.abort();
}
