//! Process-wide counters for slot synchronization and flight.
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static SLOT_REQUESTS_SENT: AtomicU64 = AtomicU64::new(0);
static SLOT_CONFIRMED: AtomicU64 = AtomicU64::new(0);
static SLOT_REJECTED: AtomicU64 = AtomicU64::new(0);
static SLOT_TIMEOUTS: AtomicU64 = AtomicU64::new(0);
static SLOT_CONFLICTS: AtomicU64 = AtomicU64::new(0);
static SLOT_FAST_PATH: AtomicU64 = AtomicU64::new(0);
static ACK_LATENCY_SUM_MS: AtomicU64 = AtomicU64::new(0);
static ACK_LATENCY_COUNT: AtomicU64 = AtomicU64::new(0);
static FLIGHT_TICKS: AtomicU64 = AtomicU64::new(0);
static FLIGHTS_COMPLETED: AtomicU64 = AtomicU64::new(0);

pub fn inc_slot_requests_sent() {
    SLOT_REQUESTS_SENT.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_slot_confirmed() {
    SLOT_CONFIRMED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_slot_rejected() {
    SLOT_REJECTED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_slot_timeouts() {
    SLOT_TIMEOUTS.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_slot_conflicts() {
    SLOT_CONFLICTS.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_slot_fast_path() {
    SLOT_FAST_PATH.fetch_add(1, Ordering::Relaxed);
}
/// Record the time from sending a slot request to its acknowledgment.
pub fn observe_ack_latency(latency: Duration) {
    let ms = latency.as_millis() as u64;
    ACK_LATENCY_SUM_MS.fetch_add(ms, Ordering::Relaxed);
    ACK_LATENCY_COUNT.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_flight_ticks() {
    FLIGHT_TICKS.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_flights_completed() {
    FLIGHTS_COMPLETED.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct Snapshot {
    pub slot_requests_sent: u64,
    pub slot_confirmed: u64,
    pub slot_rejected: u64,
    pub slot_timeouts: u64,
    pub slot_conflicts: u64,
    pub slot_fast_path: u64,
    pub ack_latency_avg_ms: Option<u64>,
    pub flight_ticks: u64,
    pub flights_completed: u64,
}

pub fn snapshot() -> Snapshot {
    let sum = ACK_LATENCY_SUM_MS.load(Ordering::Relaxed);
    let count = ACK_LATENCY_COUNT.load(Ordering::Relaxed);
    Snapshot {
        slot_requests_sent: SLOT_REQUESTS_SENT.load(Ordering::Relaxed),
        slot_confirmed: SLOT_CONFIRMED.load(Ordering::Relaxed),
        slot_rejected: SLOT_REJECTED.load(Ordering::Relaxed),
        slot_timeouts: SLOT_TIMEOUTS.load(Ordering::Relaxed),
        slot_conflicts: SLOT_CONFLICTS.load(Ordering::Relaxed),
        slot_fast_path: SLOT_FAST_PATH.load(Ordering::Relaxed),
        ack_latency_avg_ms: if count > 0 { Some(sum / count) } else { None },
        flight_ticks: FLIGHT_TICKS.load(Ordering::Relaxed),
        flights_completed: FLIGHTS_COMPLETED.load(Ordering::Relaxed),
    }
}
