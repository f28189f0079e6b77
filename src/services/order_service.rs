//! Order aggregate and lifecycle: initialization, totals override during
//! closing, and the placed → kitchen-notified → delivery → delivered state
//! machine with its audit trail and close-out transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::{
    order_entity as orders, profile_entity as profiles, transaction_entity as transactions,
    user_entity as users, LogMode, PaymentType,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CartItemResponse, CreateOrderRequest, Identity, OrderQuery, OrderResponse,
    OrderWithCartResponse, UpdateOrderRequest,
};
use crate::pricing::PricingPolicy;
use crate::services::{cart_service, kot_service, log_service};
use crate::utils::{hash_password, national_number, validate_contact};

/// Fetch an order for mutation under an exclusive row lock, serializing
/// concurrent read-modify-write sequences on the same order. SQLite has no
/// row locks; there the whole database write path is serial anyway.
async fn find_order_for_update<C: ConnectionTrait>(
    conn: &C,
    order_id: i64,
) -> AppResult<orders::Model> {
    orders::Entity::find_by_id(order_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

#[derive(Clone)]
pub struct OrderService {
    pool: DatabaseConnection,
    pricing: PricingPolicy,
}

impl OrderService {
    pub fn new(pool: DatabaseConnection, pricing: PricingPolicy) -> Self {
        Self { pool, pricing }
    }

    /// Open a new order for a guest contact or a registered user. At most
    /// one open order (`done_from_customer = false`) may exist per identity.
    pub async fn initialize_order(
        &self,
        identity: Identity,
        request: CreateOrderRequest,
    ) -> AppResult<OrderResponse> {
        let txn = self.pool.begin().await?;

        let (contact, location, email) = match &identity {
            Identity::Guest(contact) => {
                let location = request.custom_location.clone().ok_or_else(|| {
                    AppError::ValidationError("custom_location is required".to_string())
                })?;
                (contact.clone(), location, request.custom_email.clone())
            }
            Identity::Registered(user_id) => {
                let user = users::Entity::find_by_id(*user_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
                let profile = profiles::Entity::find()
                    .filter(profiles::Column::UserId.eq(*user_id))
                    .one(&txn)
                    .await?;

                let contact = request
                    .custom_contact
                    .clone()
                    .or_else(|| profile.as_ref().and_then(|p| p.contact.clone()))
                    .ok_or_else(|| {
                        AppError::ValidationError("custom_contact is required".to_string())
                    })?;
                let location = request
                    .custom_location
                    .clone()
                    .or_else(|| profile.as_ref().and_then(|p| p.address.clone()))
                    .ok_or_else(|| {
                        AppError::ValidationError("custom_location is required".to_string())
                    })?;
                // Registered callers inherit their account email when the
                // request leaves it unspecified
                let email = request.custom_email.clone().or(user.email);
                (contact, location, email)
            }
        };
        validate_contact(&contact)?;

        let mut open_orders = orders::Entity::find()
            .filter(orders::Column::DoneFromCustomer.eq(false));
        open_orders = match &identity {
            Identity::Guest(contact) => open_orders
                .filter(orders::Column::CustomContact.eq(contact.clone()))
                .filter(orders::Column::CreatedBy.is_null()),
            Identity::Registered(user_id) => {
                open_orders.filter(orders::Column::CreatedBy.eq(*user_id))
            }
        };
        if let Some(existing) = open_orders.one(&txn).await? {
            return Err(AppError::Conflict(format!(
                "Ongoing order exists at #{}. Please check your cart.",
                existing.id
            )));
        }

        let order = orders::ActiveModel {
            custom_location: Set(location),
            custom_contact: Set(contact.clone()),
            custom_email: Set(email),
            payment_type: Set(request.payment_type.unwrap_or(PaymentType::Cash)),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            created_by: Set(identity.user_id()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        log_service::record(
            &txn,
            LogMode::Create,
            identity.user_id(),
            format!("Order #{} initialized for {}", order.id, contact),
        )
        .await?;

        txn.commit().await?;
        Ok(OrderResponse::from(order))
    }

    pub async fn get_order_with_cart(&self, order_id: i64) -> AppResult<OrderWithCartResponse> {
        let order = orders::Entity::find_by_id(order_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
        self.with_cart(order).await
    }

    /// All orders, newest first, optionally filtered by lifecycle flags.
    pub async fn list_orders(&self, query: &OrderQuery) -> AppResult<Vec<OrderWithCartResponse>> {
        let mut select = orders::Entity::find();
        if let Some(flag) = query.delivery_started {
            select = select.filter(orders::Column::DeliveryStarted.eq(flag));
        }
        if let Some(flag) = query.is_delivered {
            select = select.filter(orders::Column::IsDelivered.eq(flag));
        }
        if let Some(flag) = query.done_from_customer {
            select = select.filter(orders::Column::DoneFromCustomer.eq(flag));
        }

        let order_rows = select
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let mut results = Vec::with_capacity(order_rows.len());
        for order in order_rows {
            results.push(self.with_cart(order).await?);
        }
        Ok(results)
    }

    /// Order history for one registered user.
    pub async fn user_orders(&self, user_id: i64) -> AppResult<Vec<OrderWithCartResponse>> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let order_rows = orders::Entity::find()
            .filter(orders::Column::CreatedBy.eq(user_id))
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let mut results = Vec::with_capacity(order_rows.len());
        for order in order_rows {
            results.push(self.with_cart(order).await?);
        }
        Ok(results)
    }

    /// Manual override while closing: item count and subtotal are
    /// recomputed from the lines, the caller-supplied charge and discount
    /// replace the policy values in the grand-total formula.
    pub async fn update_order(
        &self,
        actor: Option<i64>,
        order_id: i64,
        request: UpdateOrderRequest,
    ) -> AppResult<OrderResponse> {
        let txn = self.pool.begin().await?;

        let order = find_order_for_update(&txn, order_id).await?;
        if order.is_delivered {
            return Err(AppError::InvalidState(format!(
                "Order #{order_id} is already delivered"
            )));
        }

        let delivery_charge = request.delivery_charge.unwrap_or(order.delivery_charge);
        let loyalty_discount = request.loyalty_discount.unwrap_or(order.loyalty_discount);
        if delivery_charge < 0 {
            return Err(AppError::ValidationError(
                "delivery_charge must not be negative".to_string(),
            ));
        }
        if !(0..=100).contains(&loyalty_discount) {
            return Err(AppError::ValidationError(
                "loyalty_discount must be within 0-100".to_string(),
            ));
        }

        let lines = cart_service::lines_with_items(&txn, order_id).await?;
        let total_items: i64 = lines.iter().map(|(line, _)| line.quantity as i64).sum();
        let subtotal: i64 = lines
            .iter()
            .map(|(line, item)| line.quantity as i64 * item.price)
            .sum();
        let grand_total = self
            .pricing
            .grand_total(subtotal, delivery_charge, loyalty_discount);

        let mut am = order.into_active_model();
        am.total_items = Set(total_items);
        am.total_price = Set(subtotal);
        am.delivery_charge = Set(delivery_charge);
        am.loyalty_discount = Set(loyalty_discount);
        am.grand_total = Set(grand_total);
        am.updated_at = Set(Utc::now());
        am.updated_by = Set(actor);
        let order = am.update(&txn).await?;

        log_service::record(
            &txn,
            LogMode::Update,
            actor,
            format!("Order #{} totals overridden", order.id),
        )
        .await?;

        txn.commit().await?;
        Ok(OrderResponse::from(order))
    }

    pub async fn delete_order(&self, actor: Option<i64>, order_id: i64) -> AppResult<()> {
        let txn = self.pool.begin().await?;

        let order = find_order_for_update(&txn, order_id).await?;

        // Cart lines and KOT rows go with the order
        orders::Entity::delete_by_id(order.id).exec(&txn).await?;

        log_service::record(
            &txn,
            LogMode::Delete,
            actor,
            format!("Deleted order #{} of user {}", order.id, order.custom_contact),
        )
        .await?;

        txn.commit().await?;
        Ok(())
    }

    /// Customer submits the order: resolve the creator identity, stamp the
    /// flag, issue KOT batch 1 and write the audit row.
    pub async fn mark_done_from_customer(
        &self,
        authenticated: Option<i64>,
        order_id: i64,
    ) -> AppResult<OrderResponse> {
        let txn = self.pool.begin().await?;

        let order = find_order_for_update(&txn, order_id).await?;
        if order.done_from_customer {
            return Err(AppError::InvalidState("Order already set done".to_string()));
        }

        let creator = self.resolve_creator(&txn, &order, authenticated).await?;

        let contact = order.custom_contact.clone();
        let location = order.custom_location.clone();
        let mut am = order.into_active_model();
        am.created_by = Set(Some(creator));
        am.done_from_customer = Set(true);
        am.done_from_customer_at = Set(Some(Utc::now()));
        am.updated_at = Set(Utc::now());
        let order = am.update(&txn).await?;

        kot_service::create_first_batch(&txn, order.id).await?;

        log_service::record(
            &txn,
            LogMode::Done,
            Some(creator),
            format!(
                "Order #{} marked done by customer {} from {}",
                order.id, contact, location
            ),
        )
        .await?;

        txn.commit().await?;
        Ok(OrderResponse::from(order))
    }

    pub async fn start_delivery(&self, actor: Option<i64>, order_id: i64) -> AppResult<OrderResponse> {
        let txn = self.pool.begin().await?;

        let order = find_order_for_update(&txn, order_id).await?;
        if !order.done_from_customer {
            return Err(AppError::InvalidState(
                "Order has not been submitted by the customer".to_string(),
            ));
        }
        if order.delivery_started || order.is_delivered {
            return Err(AppError::InvalidState("Delivery already started".to_string()));
        }

        let mut am = order.into_active_model();
        am.delivery_started = Set(true);
        am.delivery_started_at = Set(Some(Utc::now()));
        am.updated_at = Set(Utc::now());
        am.updated_by = Set(actor);
        let order = am.update(&txn).await?;

        log_service::record(
            &txn,
            LogMode::Start,
            actor,
            format!("Delivery started for order #{}", order.id),
        )
        .await?;

        txn.commit().await?;
        Ok(OrderResponse::from(order))
    }

    /// Delivery completed: stamp the flag and materialize the close-out
    /// transaction, exactly once. A repeated signal fails without writes.
    pub async fn mark_delivered(&self, actor: Option<i64>, order_id: i64) -> AppResult<OrderResponse> {
        let txn = self.pool.begin().await?;

        let order = find_order_for_update(&txn, order_id).await?;
        if !order.delivery_started {
            return Err(AppError::InvalidState(
                "Delivery has not been started".to_string(),
            ));
        }
        if order.is_delivered {
            return Err(AppError::InvalidState("Order already delivered".to_string()));
        }

        let mut am = order.into_active_model();
        am.is_delivered = Set(true);
        am.delivered_at = Set(Some(Utc::now()));
        am.updated_at = Set(Utc::now());
        am.updated_by = Set(actor);
        let order = am.update(&txn).await?;

        transactions::ActiveModel {
            order_id: Set(order.id),
            grand_total: Set(order.grand_total),
            created_at: Set(Utc::now()),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        log_service::record(
            &txn,
            LogMode::Complete,
            actor,
            format!("Delivery completed for order #{}", order.id),
        )
        .await?;

        txn.commit().await?;
        Ok(OrderResponse::from(order))
    }

    /// Every submitted order ends up attributed to some user: the
    /// authenticated caller, an existing profile matching the guest
    /// contact, or a user newly seeded from that contact.
    async fn resolve_creator<C: ConnectionTrait>(
        &self,
        conn: &C,
        order: &orders::Model,
        authenticated: Option<i64>,
    ) -> AppResult<i64> {
        if let Some(user_id) = authenticated {
            users::Entity::find_by_id(user_id)
                .one(conn)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            return Ok(user_id);
        }

        if let Some(profile) = profiles::Entity::find()
            .filter(profiles::Column::Contact.eq(order.custom_contact.clone()))
            .one(conn)
            .await?
        {
            return Ok(profile.user_id);
        }

        let number = national_number(&order.custom_contact);
        let user = users::ActiveModel {
            username: Set(number.clone()),
            email: Set(order.custom_email.clone()),
            password_hash: Set(hash_password(&number)?),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        profiles::ActiveModel {
            user_id: Set(user.id),
            contact: Set(Some(order.custom_contact.clone())),
            address: Set(Some(order.custom_location.clone())),
            last_updated: Set(Utc::now()),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        Ok(user.id)
    }

    async fn with_cart(&self, order: orders::Model) -> AppResult<OrderWithCartResponse> {
        let lines = cart_service::lines_with_items(&self.pool, order.id).await?;
        let cart_items = lines
            .into_iter()
            .map(|(line, item)| CartItemResponse::from_line(line, item))
            .collect();
        Ok(OrderWithCartResponse {
            order: OrderResponse::from(order),
            cart_items,
        })
    }
}
