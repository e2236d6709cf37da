//! Slot synchronization against a scripted host.
mod common;

use common::{dirt, fixture, stone, until_pending, ScriptedLink};
use creativebot::creative::CreativeError;
use creativebot::item::{Item, WireSlot};
use creativebot::link::{LinkError, OutboundPacket};
use tokio::time::{Duration, Instant};

#[tokio::test]
async fn matching_slot_is_a_no_op_for_every_slot() {
    let fx = fixture(ScriptedLink::acknowledging());
    for slot in 0..45 {
        fx.inventory.apply_remote(slot, Some(stone(slot as u8 + 1)));
        fx.creative
            .set_inventory_slot(slot as i32, Some(stone(slot as u8 + 1)))
            .await
            .expect("fast path");
    }
    // Empty onto empty is also already satisfied.
    let fx2 = fixture(ScriptedLink::acknowledging());
    fx2.creative.clear_slot(10).await.expect("empty slot");

    assert!(fx.link.sent().is_empty());
    assert!(fx2.link.sent().is_empty());
}

#[tokio::test]
async fn tag_data_alone_does_not_trigger_a_send() {
    let fx = fixture(ScriptedLink::acknowledging());
    fx.inventory.apply_remote(4, Some(stone(1)));
    fx.creative
        .set_inventory_slot(4, Some(stone(1).with_nbt(vec![10, 0])))
        .await
        .expect("fast path");
    assert!(fx.link.sent().is_empty());
}

#[tokio::test]
async fn out_of_range_slots_are_invalid() {
    let fx = fixture(ScriptedLink::silent());
    for slot in [-1, 45, i32::MIN, i32::MAX] {
        let err = fx
            .creative
            .set_inventory_slot(slot, Some(stone(1)))
            .await
            .unwrap_err();
        assert!(
            matches!(err, CreativeError::InvalidSlot(s) if s == slot),
            "slot {slot}: {err}"
        );
    }
    assert!(matches!(
        fx.creative.clear_slot(-1).await,
        Err(CreativeError::InvalidSlot(-1))
    ));
    assert!(fx.link.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn second_set_on_pending_slot_conflicts() {
    let fx = fixture(ScriptedLink::acknowledging());
    let first = {
        let creative = fx.creative.clone();
        tokio::spawn(async move { creative.set_inventory_slot(5, Some(stone(64))).await })
    };
    until_pending(&fx.creative, 5).await;

    let second = fx.creative.set_inventory_slot(5, Some(dirt(1))).await;
    assert!(matches!(second, Err(CreativeError::Conflict { slot: 5 })));
    assert_eq!(fx.link.sent().len(), 1, "the refused call must not send");

    // Other slots are unaffected by slot 5 being busy.
    let other = {
        let creative = fx.creative.clone();
        tokio::spawn(async move { creative.set_inventory_slot(6, Some(dirt(2))).await })
    };
    until_pending(&fx.creative, 6).await;
    fx.inventory.apply_remote(6, Some(dirt(2)));
    other.await.unwrap().expect("slot 6 set");

    fx.inventory.apply_remote(5, Some(stone(64)));
    first.await.unwrap().expect("first set still resolves");
    assert!(fx.creative.pending().pending().is_empty());
}

#[tokio::test(start_paused = true)]
async fn silent_host_with_zero_wait_resolves_immediately() {
    let fx = fixture(ScriptedLink::silent());
    let start = Instant::now();
    fx.creative
        .set_inventory_slot_with_timeout(12, Some(stone(3)), Duration::ZERO)
        .await
        .expect("set");
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(fx.inventory.slot(12), Some(stone(3)));
    assert_eq!(
        fx.link.sent(),
        vec![OutboundPacket::SetCreativeSlot {
            slot: 12,
            item: WireSlot::try_from(Some(&stone(3))).unwrap(),
        }]
    );
    assert!(!fx.creative.pending().is_pending(12));
}

#[tokio::test(start_paused = true)]
async fn silent_host_without_contradiction_succeeds_after_window() {
    let fx = fixture(ScriptedLink::silent());
    let start = Instant::now();
    fx.creative
        .set_inventory_slot(20, Some(stone(1)))
        .await
        .expect("set");
    assert!(start.elapsed() >= Duration::from_millis(400));
    assert_eq!(fx.inventory.slot(20), Some(stone(1)));
    assert!(!fx.creative.pending().is_pending(20));
}

#[tokio::test(start_paused = true)]
async fn silent_host_contradiction_is_a_rejection_without_rollback() {
    let fx = fixture(ScriptedLink::silent());
    let start = Instant::now();
    let task = {
        let creative = fx.creative.clone();
        tokio::spawn(async move { creative.set_inventory_slot(20, Some(stone(1))).await })
    };
    until_pending(&fx.creative, 20).await;
    // The optimistic write is visible before the host has said anything.
    assert_eq!(fx.inventory.slot(20), Some(stone(1)));

    tokio::time::sleep(Duration::from_millis(100)).await;
    fx.inventory.apply_remote(20, Some(dirt(1)));

    let result = task.await.unwrap();
    assert!(matches!(result, Err(CreativeError::Rejected { slot: 20 })));
    assert!(start.elapsed() < Duration::from_millis(400));
    assert!(!fx.creative.pending().is_pending(20));

    // Known caveat: the synchronizer never restores the pre-request value.
    // The view holds whatever was written last; the slot was empty before
    // the request and is not empty now.
    assert_eq!(fx.inventory.slot(20), Some(dirt(1)));
}

#[tokio::test(start_paused = true)]
async fn silent_host_only_the_first_update_is_inspected() {
    let fx = fixture(ScriptedLink::silent());
    let start = Instant::now();
    let task = {
        let creative = fx.creative.clone();
        tokio::spawn(async move { creative.set_inventory_slot(8, Some(stone(16))).await })
    };
    until_pending(&fx.creative, 8).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    // Same identity, different count: agreement.
    fx.inventory.apply_remote(8, Some(stone(15)));
    tokio::time::sleep(Duration::from_millis(50)).await;
    fx.inventory.apply_remote(8, Some(dirt(1)));

    task.await.unwrap().expect("first update agreed");
    assert!(start.elapsed() >= Duration::from_millis(400));
}

#[tokio::test(start_paused = true)]
async fn silent_host_clearing_is_rejected_when_item_comes_back() {
    let fx = fixture(ScriptedLink::silent());
    fx.inventory.apply_remote(2, Some(stone(5)));
    let task = {
        let creative = fx.creative.clone();
        tokio::spawn(async move { creative.clear_slot(2).await })
    };
    until_pending(&fx.creative, 2).await;
    assert_eq!(fx.inventory.slot(2), None);
    fx.inventory.apply_remote(2, Some(stone(5)));
    assert!(matches!(
        task.await.unwrap(),
        Err(CreativeError::Rejected { slot: 2 })
    ));
}

#[tokio::test(start_paused = true)]
async fn acknowledging_host_matching_update_resolves() {
    let fx = fixture(ScriptedLink::acknowledging());
    let start = Instant::now();
    let task = {
        let creative = fx.creative.clone();
        tokio::spawn(async move { creative.set_inventory_slot(7, Some(stone(64))).await })
    };
    until_pending(&fx.creative, 7).await;
    // Nothing was written locally: the host is expected to answer.
    assert_eq!(fx.inventory.slot(7), None);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    // Unrelated and non-matching updates are skipped.
    fx.inventory.apply_remote(9, Some(stone(64)));
    fx.inventory.apply_remote(7, Some(stone(63)));
    assert!(fx.creative.pending().is_pending(7));
    fx.inventory.apply_remote(7, Some(stone(64)));

    task.await.unwrap().expect("acknowledged");
    assert!(start.elapsed() < Duration::from_millis(5000));
    assert!(!fx.creative.pending().is_pending(7));
}

#[tokio::test(start_paused = true)]
async fn acknowledging_host_silence_times_out_and_allows_retry() {
    let fx = fixture(ScriptedLink::acknowledging());
    let start = Instant::now();
    let err = fx
        .creative
        .set_inventory_slot(7, Some(stone(64)))
        .await
        .unwrap_err();
    match err {
        CreativeError::Timeout { slot, waited } => {
            assert_eq!(slot, 7);
            assert_eq!(waited, Duration::from_millis(5000));
        }
        other => panic!("expected timeout, got {other}"),
    }
    assert!(start.elapsed() >= Duration::from_millis(5000));
    assert!(!fx.creative.pending().is_pending(7));

    let retry = {
        let creative = fx.creative.clone();
        tokio::spawn(async move { creative.set_inventory_slot(7, Some(stone(64))).await })
    };
    until_pending(&fx.creative, 7).await;
    fx.inventory.apply_remote(7, Some(stone(64)));
    retry.await.unwrap().expect("retry acknowledged");
    assert_eq!(fx.link.sent().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn acknowledging_host_clear_needs_an_empty_update() {
    let fx = fixture(ScriptedLink::acknowledging());
    fx.inventory.apply_remote(3, Some(dirt(4)));
    let task = {
        let creative = fx.creative.clone();
        tokio::spawn(async move { creative.clear_slot(3).await })
    };
    until_pending(&fx.creative, 3).await;
    fx.inventory.apply_remote(3, Some(dirt(3)));
    fx.inventory.apply_remote(3, None);
    task.await.unwrap().expect("cleared");
    assert_eq!(fx.link.sent_slots(), vec![3]);
}

#[tokio::test]
async fn failed_send_releases_the_slot() {
    let mut link = ScriptedLink::silent();
    link.fail_sends = true;
    let fx = fixture(link);
    let err = fx
        .creative
        .set_inventory_slot(1, Some(stone(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, CreativeError::Link(_)));
    assert!(!fx.creative.pending().is_pending(1));
    // Nothing was applied locally because nothing was sent.
    assert_eq!(fx.inventory.slot(1), None);
}

/// More host updates than the inventory channel holds, on slots other than `skip`.
fn flood(fx: &common::Fixture, skip: usize) {
    for n in 0..300usize {
        let slot = 21 + n % 19;
        if slot != skip {
            fx.inventory.apply_remote(slot, Some(stone((n % 64) as u8 + 1)));
        }
    }
}

#[tokio::test(start_paused = true)]
async fn silent_host_contradiction_lost_in_a_burst_is_still_a_rejection() {
    let fx = fixture(ScriptedLink::silent());
    let task = {
        let creative = fx.creative.clone();
        tokio::spawn(async move { creative.set_inventory_slot(20, Some(stone(1))).await })
    };
    until_pending(&fx.creative, 20).await;

    fx.inventory.apply_remote(20, Some(dirt(1)));
    flood(&fx, 20);

    let result = task.await.unwrap();
    assert!(
        matches!(result, Err(CreativeError::Rejected { slot: 20 })),
        "{result:?}"
    );
    assert!(!fx.creative.pending().is_pending(20));
}

#[tokio::test(start_paused = true)]
async fn silent_host_burst_without_contradiction_still_succeeds() {
    let fx = fixture(ScriptedLink::silent());
    let start = Instant::now();
    let task = {
        let creative = fx.creative.clone();
        tokio::spawn(async move { creative.set_inventory_slot(20, Some(stone(1))).await })
    };
    until_pending(&fx.creative, 20).await;
    flood(&fx, 20);

    task.await.unwrap().expect("nothing contradicted the request");
    assert!(start.elapsed() >= Duration::from_millis(400));
}

#[tokio::test(start_paused = true)]
async fn acknowledging_host_ack_lost_in_a_burst_is_found_in_the_view() {
    let fx = fixture(ScriptedLink::acknowledging());
    let start = Instant::now();
    let task = {
        let creative = fx.creative.clone();
        tokio::spawn(async move { creative.set_inventory_slot(7, Some(stone(64))).await })
    };
    until_pending(&fx.creative, 7).await;

    fx.inventory.apply_remote(7, Some(stone(64)));
    flood(&fx, 7);

    task.await.unwrap().expect("acknowledged");
    assert!(start.elapsed() < Duration::from_millis(5000));
}

#[tokio::test(start_paused = true)]
async fn acknowledging_host_keeps_waiting_after_a_burst() {
    let fx = fixture(ScriptedLink::acknowledging());
    let task = {
        let creative = fx.creative.clone();
        tokio::spawn(async move { creative.set_inventory_slot(7, Some(stone(64))).await })
    };
    until_pending(&fx.creative, 7).await;

    flood(&fx, 7);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(fx.creative.pending().is_pending(7));

    fx.inventory.apply_remote(7, Some(stone(64)));
    task.await.unwrap().expect("acknowledged after the burst");
}

#[tokio::test]
async fn item_ids_beyond_the_wire_range_are_not_sent() {
    let fx = fixture(ScriptedLink::acknowledging());
    let huge = Item::new(3_000_000_000, "item_3000000000", 1);
    let err = fx
        .creative
        .set_inventory_slot(9, Some(huge))
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            CreativeError::Link(LinkError::UnencodableItem { id: 3_000_000_000 })
        ),
        "{err}"
    );
    assert!(fx.link.sent().is_empty());
    assert!(!fx.creative.pending().is_pending(9));
    assert_eq!(fx.inventory.slot(9), None);
}
