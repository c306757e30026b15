use std::sync::Arc;

use ruralcart_client::checkout::{self, CheckoutError, CheckoutForm};
use ruralcart_client::tracking::{self, OrderTracker};
use ruralcart_client::ClientError;
use ruralcart_common::identity::ProductId;
use ruralcart_common::order::{OrderPatch, OrderStatus, PaymentMethod};
use ruralcart_common::product::ProductPatch;
use ruralcart_common::user::{Address, User};
use ruralcart_server::Storage;
use ruralcart_api_integration::harness::{Customer, TestHarness};
use ruralcart_api_integration::{eventually, DownGateway, TestServer};

/// Two kilos of onions: ₹60 plus ₹30 delivery.
#[tokio::test]
async fn two_onions_checkout_totals_ninety_rupees() {
    let mut h = TestHarness::setup().await;
    h.rajesh.add("prod-1", 2).await.unwrap();

    let placed = checkout::place_order(&h.rajesh.api, &mut h.rajesh.store, &CheckoutForm::default())
        .await
        .unwrap();

    assert_eq!(placed.order.total, 9_000);
    assert_eq!(placed.order.delivery_fee, 3_000);
    assert_eq!(placed.order.items[0].quantity, 2);
    assert_eq!(placed.tracking_path, format!("/order/{}", placed.order.id));
    assert!(h.rajesh.store.cart().is_empty());
    assert_eq!(h.rajesh.store.current_order(), Some(&placed.order));
}

#[tokio::test]
async fn placed_order_reads_back_and_lists_first() {
    let mut h = TestHarness::setup().await;
    let user = h.rajesh.store.user().cloned().unwrap();

    h.rajesh.add("prod-2", 1).await.unwrap();
    let first = checkout::place_order(&h.rajesh.api, &mut h.rajesh.store, &CheckoutForm::default())
        .await
        .unwrap()
        .order;
    h.rajesh.add("prod-4", 2).await.unwrap();
    let second = checkout::place_order(&h.rajesh.api, &mut h.rajesh.store, &CheckoutForm::default())
        .await
        .unwrap()
        .order;

    assert_eq!(h.rajesh.api.order(&second.id).await.unwrap(), second);
    let mine = h.rajesh.api.user_orders(&user.id).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].id, second.id);
    assert_eq!(mine[1].id, first.id);
    // ₹240 of apples ships free
    assert_eq!(second.delivery_fee, 0);
}

#[tokio::test]
async fn checkout_preconditions_leave_state_alone() {
    let mut h = TestHarness::setup().await;
    let mut guest = Customer::new(h.server.api.clone());
    guest.add("prod-3", 1).await.unwrap();

    let err = checkout::place_order(&guest.api, &mut guest.store, &CheckoutForm::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::LoginRequired));
    assert_eq!(guest.store.cart_item_count(), 1);

    let err = checkout::place_order(&h.rajesh.api, &mut h.rajesh.store, &CheckoutForm::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
    assert!(h.server.store.orders().is_empty());
}

#[tokio::test]
async fn rejected_order_keeps_cart_and_current_order() {
    let mut h = TestHarness::setup().await;
    h.rajesh.add("prod-2", 3).await.unwrap();
    let user = h.rajesh.store.user().cloned().unwrap();
    // A stale local profile with a blanked-out address.
    h.rajesh.store.set_user(User {
        address: Some(Address {
            full: "  ".into(),
            ..user.address.clone().unwrap()
        }),
        ..user
    });

    let err = checkout::place_order(&h.rajesh.api, &mut h.rajesh.store, &CheckoutForm::default())
        .await
        .unwrap_err();
    match err {
        CheckoutError::Api(ClientError::Validation { errors, .. }) => {
            assert_eq!(errors[0].path, "deliveryAddress.full");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(h.rajesh.store.cart_item_count(), 3);
    assert!(h.rajesh.store.current_order().is_none());
    assert!(h.server.store.orders().is_empty());
}

#[tokio::test]
async fn out_of_stock_products_stay_out_of_orders() {
    let mut h = TestHarness::setup().await;
    assert!(h.rajesh.add("prod-1", 2).await.unwrap());
    h.server
        .api
        .update_product(
            &ProductId::from("prod-1"),
            &ProductPatch {
                in_stock: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Sold out after it went into the cart: no more can be added, and the
    // server refuses the line at checkout.
    assert!(!h.rajesh.add("prod-1", 1).await.unwrap());
    assert_eq!(h.rajesh.store.cart_item_count(), 2);
    let err = checkout::place_order(&h.rajesh.api, &mut h.rajesh.store, &CheckoutForm::default())
        .await
        .unwrap_err();
    match err {
        CheckoutError::Api(ClientError::Validation { errors, .. }) => {
            assert_eq!(errors[0].path, "items[0].productId");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(h.rajesh.store.cart_item_count(), 2);
    assert!(h.server.store.orders().is_empty());
}

#[tokio::test]
async fn new_customer_without_address_checks_out_with_placeholder() {
    let mut h = TestHarness::setup().await;
    ruralcart_client::session::register(&h.meena.api, &mut h.meena.store, "Meena", "+915550001111", None)
        .await
        .unwrap();
    h.meena.add("prod-6", 4).await.unwrap();

    let form = CheckoutForm {
        payment_method: PaymentMethod::Upi,
        special_instructions: "Leave at the gate".into(),
        ..Default::default()
    };
    let placed = checkout::place_order(&h.meena.api, &mut h.meena.store, &form)
        .await
        .unwrap();

    assert_eq!(placed.order.delivery_address.phone, "+915550001111");
    assert_eq!(placed.order.payment_method, PaymentMethod::Upi);
    assert_eq!(placed.order.special_instructions.as_deref(), Some("Leave at the gate"));
}

#[tokio::test]
async fn confirmation_and_status_sms_are_sent() {
    let mut h = TestHarness::setup().await;
    h.rajesh.add("prod-5", 1).await.unwrap();
    let order = checkout::place_order(&h.rajesh.api, &mut h.rajesh.store, &CheckoutForm::default())
        .await
        .unwrap()
        .order;

    let sms = h.sms.clone();
    assert!(eventually(50, || sms.sent().len() == 1).await);

    h.rajesh
        .api
        .update_order(&order.id, &OrderPatch::status(OrderStatus::OutForDelivery))
        .await
        .unwrap();
    assert!(eventually(50, || sms.sent().len() == 2).await);

    let sent = h.sms.sent();
    assert!(sent.iter().all(|m| m.to == "+919876543210"));
    assert!(sent[1].body.contains("out for delivery"));
}

#[tokio::test]
async fn sms_outage_does_not_fail_the_order() {
    let server = TestServer::start(Arc::new(DownGateway)).await;
    let mut rajesh = Customer::new(server.api.clone());
    rajesh.login("+919876543210").await.unwrap();
    rajesh.add("prod-1", 1).await.unwrap();

    let placed = checkout::place_order(&rajesh.api, &mut rajesh.store, &CheckoutForm::default())
        .await
        .unwrap();
    let patched = rajesh
        .api
        .update_order(&placed.order.id, &OrderPatch::status("confirmed"))
        .await
        .unwrap();
    assert_eq!(patched.status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn tracker_follows_status_changes() {
    let mut h = TestHarness::setup().await;
    h.rajesh.add("prod-1", 1).await.unwrap();
    let placed = checkout::place_order(&h.rajesh.api, &mut h.rajesh.store, &CheckoutForm::default())
        .await
        .unwrap();

    let mut tracker = OrderTracker::from_order(h.rajesh.api.clone(), placed.order);
    assert!(tracker.steps().iter().all(|s| s.upcoming));

    h.server
        .api
        .update_order(tracker.order_id(), &OrderPatch::status(OrderStatus::Preparing))
        .await
        .unwrap();
    let status = tracker.refresh().await.unwrap().status.clone();
    assert_eq!(tracking::headline(&status), "Your order is being prepared");

    let steps = tracker.steps();
    assert!(steps[0].completed && steps[1].active && steps[2].upcoming);
}

#[tokio::test]
async fn tracking_an_unknown_order_is_not_found() {
    let h = TestHarness::setup().await;
    let mut tracker = OrderTracker::new(h.server.api.clone(), "no-such-order".into());
    let err = tracker.refresh().await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
    assert!(tracker.order().is_none());
}
