use std::sync::Arc;

use tokio::task::JoinSet;

use ruralcart_common::identity::{ProductId, UserId};
use ruralcart_common::order::{OrderPatch, OrderStatus};
use ruralcart_common::product::ProductPatch;
use ruralcart_common::user::NewUser;
use ruralcart_api_integration::harness::TestHarness;
use ruralcart_api_integration::{RecordingGateway, TestServer};
use ruralcart_client::checkout::{self, CheckoutForm};
use ruralcart_client::ClientError;
use ruralcart_server::store::FileStorage;
use ruralcart_server::Storage;

const CLIENTS: usize = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_orders_are_all_stored() {
    let mut h = TestHarness::setup().await;
    h.rajesh.add("prod-1", 2).await.unwrap();
    let order = checkout::build_order(h.rajesh.store.state(), &CheckoutForm::default()).unwrap();

    let mut tasks = JoinSet::new();
    for _ in 0..CLIENTS {
        let api = h.server.api.clone();
        let order = order.clone();
        tasks.spawn(async move { api.create_order(&order).await });
    }
    let mut ids = Vec::new();
    while let Some(result) = tasks.join_next().await {
        ids.push(result.unwrap().unwrap().id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), CLIENTS);

    let listed = h.server.api.user_orders(&UserId::from("user-1")).await.unwrap();
    assert_eq!(listed.len(), CLIENTS);
    assert!(listed
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
}

/// Patches touching different fields of one order must all land.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_patches_to_one_order_do_not_lose_fields() {
    let mut h = TestHarness::setup().await;
    h.rajesh.add("prod-6", 1).await.unwrap();
    let order = checkout::place_order(&h.rajesh.api, &mut h.rajesh.store, &CheckoutForm::default())
        .await
        .unwrap()
        .order;

    let mut tasks = JoinSet::new();
    for i in 0..CLIENTS {
        let api = h.server.api.clone();
        let id = order.id.clone();
        tasks.spawn(async move {
            let patch = if i % 2 == 0 {
                OrderPatch::status(OrderStatus::Preparing)
            } else {
                OrderPatch {
                    special_instructions: Some(Some("Call before arriving".into())),
                    ..Default::default()
                }
            };
            api.update_order(&id, &patch).await
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }

    let stored = h.server.api.order(&order.id).await.unwrap();
    assert_eq!(stored.status, OrderStatus::Preparing);
    assert_eq!(stored.special_instructions.as_deref(), Some("Call before arriving"));
    assert_eq!(stored.total, order.total);
}

/// Only one of many racing registrations for the same phone succeeds.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_registrations_claim_a_phone_once() {
    let server = TestServer::seeded().await;
    let mut tasks = JoinSet::new();
    for i in 0..CLIENTS {
        let api = server.api.clone();
        tasks.spawn(async move {
            api.create_user(&NewUser {
                name: format!("Caller {i}"),
                phone: "+917770001234".into(),
                address: None,
            })
            .await
        });
    }

    let (mut created, mut conflicts) = (0, 0);
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(_) => created += 1,
            Err(ClientError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!((created, conflicts), (1, CLIENTS - 1));
}

#[tokio::test]
async fn file_backed_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ruralcart.json");

    let order_id = {
        let store = Arc::new(FileStorage::open(&path, true).unwrap());
        let server = TestServer::with_store(store, Arc::new(RecordingGateway::default())).await;
        let mut rajesh = ruralcart_api_integration::harness::Customer::new(server.api.clone());
        rajesh.login("+919876543210").await.unwrap();
        rajesh.add("prod-4", 1).await.unwrap();
        server
            .api
            .update_product(
                &ProductId::from("prod-5"),
                &ProductPatch {
                    in_stock: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        checkout::place_order(&rajesh.api, &mut rajesh.store, &CheckoutForm::default())
            .await
            .unwrap()
            .order
            .id
    };

    let store = Arc::new(FileStorage::open(&path, true).unwrap());
    assert_eq!(store.counts().orders, 1);
    let server = TestServer::with_store(store, Arc::new(RecordingGateway::default())).await;
    let order = server.api.order(&order_id).await.unwrap();
    assert_eq!(order.total, 15_000);
    assert!(!server.api.product(&ProductId::from("prod-5")).await.unwrap().in_stock);
}

#[tokio::test]
async fn failed_snapshot_write_commits_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ruralcart.json");
    let store = Arc::new(FileStorage::open(&path, true).unwrap());
    let server = TestServer::with_store(store, Arc::new(RecordingGateway::default())).await;
    let mut rajesh = ruralcart_api_integration::harness::Customer::new(server.api.clone());
    rajesh.login("+919876543210").await.unwrap();
    rajesh.add("prod-2", 2).await.unwrap();

    // A directory where the snapshot's temp file goes makes the write fail.
    let tmp = path.with_extension("json.tmp");
    std::fs::create_dir(&tmp).unwrap();
    let err = checkout::place_order(&rajesh.api, &mut rajesh.store, &CheckoutForm::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        checkout::CheckoutError::Api(ClientError::Status { status: 500, .. })
    ));
    assert!(server.store.orders().is_empty());
    assert_eq!(rajesh.store.cart_item_count(), 2);

    // Retrying after the disk recovers places exactly one order.
    std::fs::remove_dir(&tmp).unwrap();
    checkout::place_order(&rajesh.api, &mut rajesh.store, &CheckoutForm::default())
        .await
        .unwrap();
    assert_eq!(server.store.orders().len(), 1);
    assert_eq!(FileStorage::open(&path, true).unwrap().counts().orders, 1);
}
