mod common;

use chrono::{Local, Timelike, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

use restro_backend::entities::{
    profile_entity as profiles, transaction_entity as transactions, user_entity as users,
};
use restro_backend::error::AppError;
use restro_backend::models::{
    CreateOrderRequest, Identity, KotQuery, UpdateOrderRequest,
};
use restro_backend::utils::hash_password;

use common::{add_request, guest_order, guest_order_request, seed_item, setup};

#[tokio::test]
async fn guest_order_end_to_end() {
    let app = setup().await;
    let momo = seed_item(&app.db, "Chicken Momo", 10_000).await;
    let tea = seed_item(&app.db, "Milk Tea", 5_000).await;

    let order = app
        .orders
        .initialize_order(
            Identity::Guest("+9779800000001".to_string()),
            guest_order_request("Patan", "+9779800000001"),
        )
        .await
        .unwrap();
    assert!(!order.done_from_customer);
    assert!(order.created_by.is_none());
    assert_eq!(order.total_items, 0);

    app.cart
        .add_line(None, add_request(order.id, momo, Some(2)))
        .await
        .unwrap();
    let mutation = app
        .cart
        .add_line(None, add_request(order.id, tea, Some(1)))
        .await
        .unwrap();
    assert_eq!(mutation.order.total_items, 3);
    assert_eq!(mutation.order.total_price, 25_000);
    let quote = app.pricing.quote(25_000, Local::now().hour());
    assert_eq!(mutation.order.grand_total, quote.grand_total);

    // Submission resolves the guest into a user account seeded from the
    // contact number and issues the first kitchen ticket
    let submitted = app
        .orders
        .mark_done_from_customer(None, order.id)
        .await
        .unwrap();
    assert!(submitted.done_from_customer);
    assert!(submitted.done_from_customer_at.is_some());
    let creator = submitted.created_by.expect("creator must be resolved");

    let user = users::Entity::find_by_id(creator)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.username, "9800000001");
    let profile = profiles::Entity::find()
        .filter(profiles::Column::UserId.eq(creator))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.contact.as_deref(), Some("+9779800000001"));
    assert_eq!(profile.address.as_deref(), Some("Patan"));

    let batch_one = app
        .kot
        .list_kots(&KotQuery {
            order: Some(order.id),
            batch: Some(1),
            since: None,
        })
        .await
        .unwrap();
    assert_eq!(batch_one.len(), 2);

    let started = app.orders.start_delivery(None, order.id).await.unwrap();
    assert!(started.delivery_started);
    assert!(started.delivery_started_at.is_some());

    let delivered = app.orders.mark_delivered(None, order.id).await.unwrap();
    assert!(delivered.is_delivered);
    assert!(delivered.delivered_at.is_some());

    // Exactly one close-out transaction snapshotting the grand total
    let rows = transactions::Entity::find()
        .filter(transactions::Column::OrderId.eq(order.id))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].grand_total, delivered.grand_total);

    let err = app.orders.mark_delivered(None, order.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    let count = transactions::Entity::find()
        .filter(transactions::Column::OrderId.eq(order.id))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn lifecycle_transitions_are_ordered() {
    let app = setup().await;
    let momo = seed_item(&app.db, "Chicken Momo", 10_000).await;
    let order_id = guest_order(&app, "+9779800000011").await;
    app.cart
        .add_line(None, add_request(order_id, momo, Some(1)))
        .await
        .unwrap();

    let err = app.orders.start_delivery(None, order_id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    let err = app.orders.mark_delivered(None, order_id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    app.orders
        .mark_done_from_customer(None, order_id)
        .await
        .unwrap();
    let err = app
        .orders
        .mark_done_from_customer(None, order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let err = app.orders.mark_delivered(None, order_id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    app.orders.start_delivery(None, order_id).await.unwrap();
    let err = app.orders.start_delivery(None, order_id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    app.orders.mark_delivered(None, order_id).await.unwrap();
}

#[tokio::test]
async fn submission_reuses_a_profile_matching_the_contact() {
    let app = setup().await;
    seed_item(&app.db, "Chicken Momo", 10_000).await;

    let existing = users::ActiveModel {
        username: Set("regular".to_string()),
        email: Set(Some("regular@example.com".to_string())),
        password_hash: Set(hash_password("secret").unwrap()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .unwrap();
    profiles::ActiveModel {
        user_id: Set(existing.id),
        contact: Set(Some("+9779800000012".to_string())),
        address: Set(Some("Bhaktapur".to_string())),
        last_updated: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .unwrap();

    let order_id = guest_order(&app, "+9779800000012").await;
    let submitted = app
        .orders
        .mark_done_from_customer(None, order_id)
        .await
        .unwrap();
    assert_eq!(submitted.created_by, Some(existing.id));

    let count = users::Entity::find().count(&app.db).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn authenticated_submission_wins_over_contact_lookup() {
    let app = setup().await;
    let staff = users::ActiveModel {
        username: Set("staff".to_string()),
        email: Set(None),
        password_hash: Set(hash_password("secret").unwrap()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .unwrap();

    let order_id = guest_order(&app, "+9779800000013").await;
    let submitted = app
        .orders
        .mark_done_from_customer(Some(staff.id), order_id)
        .await
        .unwrap();
    assert_eq!(submitted.created_by, Some(staff.id));
}

#[tokio::test]
async fn registered_order_inherits_profile_defaults() {
    let app = setup().await;
    let user = users::ActiveModel {
        username: Set("regular".to_string()),
        email: Set(Some("regular@example.com".to_string())),
        password_hash: Set(hash_password("secret").unwrap()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .unwrap();
    profiles::ActiveModel {
        user_id: Set(user.id),
        contact: Set(Some("+9779800000014".to_string())),
        address: Set(Some("Kirtipur".to_string())),
        last_updated: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .unwrap();

    let order = app
        .orders
        .initialize_order(
            Identity::Registered(user.id),
            CreateOrderRequest {
                custom_location: None,
                custom_contact: None,
                custom_email: None,
                payment_type: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(order.custom_contact, "+9779800000014");
    assert_eq!(order.custom_location, "Kirtipur");
    assert_eq!(order.custom_email.as_deref(), Some("regular@example.com"));
    assert_eq!(order.created_by, Some(user.id));
}

#[tokio::test]
async fn manual_override_recomputes_from_lines() {
    let app = setup().await;
    let momo = seed_item(&app.db, "Chicken Momo", 10_000).await;
    let order_id = guest_order(&app, "+9779800000015").await;
    app.cart
        .add_line(None, add_request(order_id, momo, Some(3)))
        .await
        .unwrap();

    let updated = app
        .orders
        .update_order(
            Some(1),
            order_id,
            UpdateOrderRequest {
                delivery_charge: Some(0),
                loyalty_discount: Some(10),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.total_items, 3);
    assert_eq!(updated.total_price, 30_000);
    assert_eq!(updated.delivery_charge, 0);
    assert_eq!(updated.loyalty_discount, 10);
    // 30_000 + 0, minus 10%
    assert_eq!(updated.grand_total, 27_000);

    let err = app
        .orders
        .update_order(
            Some(1),
            order_id,
            UpdateOrderRequest {
                delivery_charge: None,
                loyalty_discount: Some(101),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn deleting_an_order_cascades_to_lines_and_tickets() {
    let app = setup().await;
    let momo = seed_item(&app.db, "Chicken Momo", 10_000).await;
    let order_id = guest_order(&app, "+9779800000016").await;
    app.cart
        .add_line(None, add_request(order_id, momo, Some(2)))
        .await
        .unwrap();
    app.kot.init_first_batch(order_id).await.unwrap();

    app.orders.delete_order(Some(1), order_id).await.unwrap();

    let err = app.orders.get_order_with_cart(order_id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let tickets = app
        .kot
        .list_kots(&KotQuery {
            order: Some(order_id),
            batch: None,
            since: None,
        })
        .await
        .unwrap();
    assert!(tickets.is_empty());
}

#[tokio::test]
async fn listing_filters_by_lifecycle_flags() {
    let app = setup().await;
    let momo = seed_item(&app.db, "Chicken Momo", 10_000).await;
    let open_id = guest_order(&app, "+9779800000017").await;
    let done_id = guest_order(&app, "+9779800000018").await;
    app.cart
        .add_line(None, add_request(done_id, momo, Some(1)))
        .await
        .unwrap();
    app.orders
        .mark_done_from_customer(None, done_id)
        .await
        .unwrap();

    let open = app
        .orders
        .list_orders(&restro_backend::models::OrderQuery {
            delivery_started: None,
            is_delivered: None,
            done_from_customer: Some(false),
        })
        .await
        .unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].order.id, open_id);

    let done = app
        .orders
        .list_orders(&restro_backend::models::OrderQuery {
            delivery_started: None,
            is_delivered: None,
            done_from_customer: Some(true),
        })
        .await
        .unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].order.id, done_id);
    assert_eq!(done[0].cart_items.len(), 1);

    let history = app
        .orders
        .user_orders(done[0].order.created_by.unwrap())
        .await
        .unwrap();
    assert_eq!(history.len(), 1);

    let err = app.orders.user_orders(9999).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
