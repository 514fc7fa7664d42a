//! 快照订阅与派生视图集成测试
//!
//! 订阅契约：订阅即收到完整快照，每次相关提交后重新收到完整
//! 快照，永远没有增量；取消后不再有任何投递。

use atelier_server::db::DbService;
use atelier_server::{Config, ServerState};
use shared::order::{OrderDraft, OrderFilter, OrderStatus, TransitionRequest};
use shared::role::{Role, Viewer};
use std::time::Duration;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(200);

async fn test_state() -> ServerState {
    let db = DbService::memory().await.expect("in-memory db");
    ServerState::with_db(Config::with_overrides("/tmp/atelier-test", 0), db)
}

fn originator() -> Viewer {
    Viewer::new("rouiba-1", "Mohamed", Role::Originator)
}

fn approver() -> Viewer {
    Viewer::new("meftah-1", "Nasro", Role::Approver)
}

fn draft(client: &str) -> OrderDraft {
    OrderDraft {
        client: client.to_string(),
        initial_product: "Steel".to_string(),
        initial_quantity: 10,
        final_product: None,
        final_quantity: None,
        submitter: "Mohamed".to_string(),
        machine_name: "CNC".to_string(),
        comment: None,
    }
}

fn accept() -> TransitionRequest {
    TransitionRequest {
        status: OrderStatus::Accepted,
        rejection_reason: None,
        production_estimation: None,
    }
}

#[tokio::test]
async fn subscription_delivers_full_snapshots_newest_update_first() {
    let state = test_state().await;
    let store = state.order_store();

    let mut subscription = store.subscribe(OrderFilter::all());

    // Initial snapshot: empty but explicit
    let snapshot = timeout(WAIT, subscription.recv())
        .await
        .expect("initial snapshot")
        .expect("stream open");
    assert!(snapshot.is_empty());

    store.create(draft("Acme"), &originator()).await.expect("create");
    let snapshot = timeout(WAIT, subscription.recv())
        .await
        .expect("snapshot after first create")
        .expect("stream open");
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].client, "Acme");

    // Later update sorts first
    tokio::time::sleep(Duration::from_millis(5)).await;
    store.create(draft("Globex"), &originator()).await.expect("create");
    let snapshot = timeout(WAIT, subscription.recv())
        .await
        .expect("snapshot after second create")
        .expect("stream open");
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].client, "Globex");
    assert_eq!(snapshot[1].client, "Acme");
}

#[tokio::test]
async fn filtered_subscription_sees_orders_enter_and_leave_the_view() {
    let state = test_state().await;
    let store = state.order_store();

    let mut pending_view = store.subscribe(OrderFilter::by_status(OrderStatus::Pending));
    let initial = timeout(WAIT, pending_view.recv())
        .await
        .expect("initial")
        .expect("stream open");
    assert!(initial.is_empty());

    let order = store.create(draft("Acme"), &originator()).await.expect("create");
    let snapshot = timeout(WAIT, pending_view.recv())
        .await
        .expect("after create")
        .expect("stream open");
    assert_eq!(snapshot.len(), 1);

    // Acceptance removes the order from the pending view: the
    // subscription still gets a (now empty) snapshot
    store
        .transition(&order.id, accept(), &approver())
        .await
        .expect("accept");
    let snapshot = timeout(WAIT, pending_view.recv())
        .await
        .expect("after accept")
        .expect("stream open");
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn irrelevant_changes_do_not_wake_a_filtered_subscription() {
    let state = test_state().await;
    let store = state.order_store();

    let mut mine = store.subscribe(OrderFilter::by_creator("rouiba-2"));
    let initial = timeout(WAIT, mine.recv())
        .await
        .expect("initial")
        .expect("stream open");
    assert!(initial.is_empty());

    // Someone else's order must not produce an emission
    store.create(draft("Acme"), &originator()).await.expect("create");
    assert!(
        timeout(QUIET, mine.recv()).await.is_err(),
        "subscription woke up for an unrelated change"
    );
}

#[tokio::test]
async fn cancelled_subscription_stops_delivering() {
    let state = test_state().await;
    let store = state.order_store();

    let mut subscription = store.subscribe(OrderFilter::all());
    let _ = timeout(WAIT, subscription.recv()).await.expect("initial");

    subscription.cancel();
    store.create(draft("Acme"), &originator()).await.expect("create");

    // The stream drains and terminates; it never hangs open
    let drained = timeout(WAIT, async {
        while subscription.recv().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok(), "cancelled stream kept delivering");
}

#[tokio::test]
async fn status_counts_track_the_live_order_stream() {
    let state = test_state().await;
    state.start_background_tasks();
    let store = state.order_store();
    let mut counts = state.status_counts();

    let first = store.create(draft("Acme"), &originator()).await.expect("create");
    store.create(draft("Globex"), &originator()).await.expect("create");
    store
        .transition(&first.id, accept(), &approver())
        .await
        .expect("accept");

    // The aggregator recomputes from full snapshots; wait for the
    // final state to land
    let settled = timeout(WAIT, async {
        loop {
            {
                let current = counts.borrow();
                if current.pending == 1 && current.accepted == 1 && current.total() == 2 {
                    break;
                }
            }
            if counts.changed().await.is_err() {
                panic!("aggregator dropped its sender");
            }
        }
    })
    .await;
    assert!(settled.is_ok(), "counts never settled: {:?}", *counts.borrow());

    let current = *counts.borrow();
    assert_eq!(current.rejected, 0);
    assert_eq!(current.en_cours, 0);
    assert_eq!(current.fini, 0);
    assert_eq!(current.charge, 0);
}

#[tokio::test]
async fn notification_feed_pushes_the_activity_log() {
    let state = test_state().await;

    let mut feed = state.notifications().subscribe();
    let initial = timeout(WAIT, feed.recv())
        .await
        .expect("initial")
        .expect("stream open");
    assert!(initial.is_empty());

    state
        .order_store()
        .create(draft("Acme"), &originator())
        .await
        .expect("create");

    let snapshot = timeout(WAIT, feed.recv())
        .await
        .expect("after create")
        .expect("stream open");
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot[0].message.contains("Nouvelle commande"));

    // Marking read changes the log, so the feed re-delivers
    state
        .notifications()
        .mark_read(&snapshot[0].id, "meftah-1")
        .await
        .expect("mark read");
    let snapshot = timeout(WAIT, feed.recv())
        .await
        .expect("after mark read")
        .expect("stream open");
    assert_eq!(snapshot[0].read_by, vec!["meftah-1".to_string()]);
}
