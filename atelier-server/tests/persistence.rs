//! 重启持久性测试
//!
//! 使用完整的 ServerState::initialize（RocksDB 落盘）验证：
//! 订单在重启后仍在，序号计数器跨重启继续递增：订单号
//! 永不重复、永不倒退。

use atelier_server::{Config, ServerState};
use shared::order::OrderDraft;
use shared::role::{Role, Viewer};

fn originator() -> Viewer {
    Viewer::new("rouiba-1", "Mohamed", Role::Originator)
}

fn draft(client: &str) -> OrderDraft {
    OrderDraft {
        client: client.to_string(),
        initial_product: "Steel".to_string(),
        initial_quantity: 10,
        final_product: None,
        final_quantity: None,
        submitter: "Mohamed".to_string(),
        machine_name: "Laser".to_string(),
        comment: None,
    }
}

#[tokio::test]
async fn orders_and_sequence_survive_a_restart() {
    let work_dir = tempfile::tempdir().expect("temp work dir");
    let config = Config::with_overrides(work_dir.path().to_string_lossy(), 0);

    // First lifetime: two orders
    {
        let state = ServerState::initialize(&config).await;
        let store = state.order_store();
        let first = store.create(draft("Acme"), &originator()).await.expect("create");
        let second = store.create(draft("Globex"), &originator()).await.expect("create");
        assert_eq!(first.order_number, "CMD-0001");
        assert_eq!(second.order_number, "CMD-0002");
        state.shutdown();
        // RocksDB handle released when state drops
    }

    // Second lifetime: data is still there and numbering continues
    {
        let state = ServerState::initialize(&config).await;
        let store = state.order_store();

        let all = store.list(&Default::default()).await.expect("list");
        assert_eq!(all.len(), 2);

        let third = store.create(draft("Initech"), &originator()).await.expect("create");
        assert_eq!(
            third.order_number, "CMD-0003",
            "order numbers never restart or repeat across lifetimes"
        );
        state.shutdown();
    }
}
