use std::collections::HashMap;

use anyhow::Context;
use axum::{
    Json,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    routing,
};
use chrono::Utc;
use diesel::{ExpressionMethods, QueryDsl, QueryResult, SelectableHelper};
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    core::{aliases::DieselError, app_error::AppError, app_state::AppState},
    models::{CreateOrderEntity, CreateOrderItemEntity, MenuItemEntity, OrderEntity},
    orders::lifecycle,
    schema::{dining_tables, menu_items, order_items, orders},
    views,
};

/// Attempts before giving up on a daily-number collision. Two concurrent
/// inserts can compute the same next number; the unique index rejects one and
/// the whole transaction is replayed.
const NUMBER_ALLOCATION_ATTEMPTS: u32 = 3;

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(place_order))
        .routes(utoipa_axum::routes!(check_new_orders))
}

/// HTML and redirect endpoints around orders; no OpenAPI surface.
pub fn routes() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/order_status/{order_id}", routing::get(order_status))
        .route(
            "/update_order_status/{order_id}",
            routing::post(update_order_status),
        )
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct PlaceOrderReq {
    table_id: i32,
    items: Vec<PlaceOrderLine>,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct PlaceOrderLine {
    menu_item_id: i32,
    quantity: i32,
    customization: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PlaceOrderRes {
    order_id: i32,
    status: String,
}

fn is_number_collision(err: &AppError) -> bool {
    let AppError::Other(err) = err else {
        return false;
    };
    matches!(
        err.downcast_ref::<DieselError>(),
        Some(DieselError::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _
        ))
    )
}

/// Create an order with its lines for a table.
#[utoipa::path(
    post,
    path = "/order",
    tags = ["Orders"],
    request_body = PlaceOrderReq,
    responses(
        (status = 200, description = "Order placed", body = PlaceOrderRes),
        (status = 400, description = "Empty cart or invalid quantity"),
        (status = 404, description = "Unknown table or menu item")
    )
)]
async fn place_order(
    State(state): State<AppState>,
    Json(body): Json<PlaceOrderReq>,
) -> Result<impl IntoResponse, AppError> {
    if body.items.is_empty() {
        return Err(AppError::Validation("Order contains no items".into()));
    }
    if body.items.iter().any(|line| line.quantity < 1) {
        return Err(AppError::Validation("Quantity must be at least 1".into()));
    }

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;
    let tz = state.config.business.timezone;
    let table_id = body.table_id;

    let mut attempt = 0;
    let order = loop {
        attempt += 1;
        let lines = body.items.clone();
        let result = conn
            .transaction::<OrderEntity, AppError, _>(move |conn| {
                Box::pin(async move {
                    let table_count: i64 = dining_tables::table
                        .find(table_id)
                        .count()
                        .get_result(conn)
                        .await
                        .context("Failed to look up table")?;
                    if table_count == 0 {
                        return Err(AppError::NotFound);
                    }

                    let item_ids: Vec<i32> =
                        lines.iter().map(|line| line.menu_item_id).collect();
                    let referenced: Vec<MenuItemEntity> = menu_items::table
                        .filter(menu_items::id.eq_any(&item_ids))
                        .get_results(conn)
                        .await
                        .context("Failed to load menu items")?;
                    let unit_prices: HashMap<i32, f32> =
                        referenced.iter().map(|item| (item.id, item.price)).collect();

                    let mut total_price = 0.0f32;
                    for line in &lines {
                        let unit_price = unit_prices
                            .get(&line.menu_item_id)
                            .copied()
                            .ok_or(AppError::NotFound)?;
                        total_price += lifecycle::line_total(
                            unit_price,
                            line.quantity,
                            line.customization.as_deref(),
                        );
                    }

                    // Number allocation is an explicit step inside this
                    // transaction: read the day's maximum, insert max + 1.
                    let order_day = lifecycle::business_day(Utc::now(), tz);
                    let current_max: Option<i32> = orders::table
                        .filter(orders::order_day.eq(order_day))
                        .select(diesel::dsl::max(orders::order_number))
                        .get_result(conn)
                        .await
                        .context("Failed to read the day's order number")?;
                    let order_number = lifecycle::next_order_number(current_max);

                    let order: OrderEntity = diesel::insert_into(orders::table)
                        .values(CreateOrderEntity {
                            table_id,
                            status: lifecycle::STATUS_PENDING.into(),
                            total_price,
                            order_day,
                            order_number,
                        })
                        .returning(OrderEntity::as_returning())
                        .get_result(conn)
                        .await
                        .context("Failed to create order")?;

                    let order_lines: Vec<CreateOrderItemEntity> = lines
                        .into_iter()
                        .map(|line| CreateOrderItemEntity {
                            order_id: order.id,
                            menu_item_id: line.menu_item_id,
                            quantity: line.quantity,
                            customization: line.customization,
                        })
                        .collect();
                    diesel::insert_into(order_items::table)
                        .values(order_lines)
                        .execute(conn)
                        .await
                        .context("Failed to create order items")?;

                    Ok(order)
                })
            })
            .await;

        match result {
            Ok(order) => break order,
            Err(err) if attempt < NUMBER_ALLOCATION_ATTEMPTS && is_number_collision(&err) => {
                tracing::warn!(attempt, "Daily order number collision, retrying");
                continue;
            }
            Err(err) => return Err(err),
        }
    };

    tracing::info!(
        order_id = order.id,
        order_number = order.order_number,
        table_id,
        "Order placed"
    );

    Ok(Json(PlaceOrderRes {
        order_id: order.id,
        status: "Order placed".into(),
    }))
}

#[derive(Serialize, ToSchema)]
pub struct OrderLineRes {
    name: String,
    quantity: i32,
    price: f32,
    customization: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct OrderSummaryRes {
    order_id: i32,
    order_number: i32,
    table_id: i32,
    status: String,
    total_price: f32,
    order_time: String,
    items: Vec<OrderLineRes>,
}

/// Poll endpoint for the kitchen: every pending order with its lines.
#[utoipa::path(
    get,
    path = "/check_new_orders",
    tags = ["Orders"],
    responses(
        (status = 200, description = "Pending orders", body = Vec<OrderSummaryRes>)
    )
)]
async fn check_new_orders(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;
    let tz = state.config.business.timezone;

    let pending: Vec<OrderEntity> = orders::table
        .filter(orders::status.eq(lifecycle::STATUS_PENDING))
        .order_by(orders::created_at.asc())
        .get_results(conn)
        .await
        .context("Failed to get pending orders")?;

    let order_ids: Vec<i32> = pending.iter().map(|order| order.id).collect();
    let lines: Vec<(i32, i32, Option<String>, String, f32)> = order_items::table
        .inner_join(menu_items::table)
        .filter(order_items::order_id.eq_any(&order_ids))
        .select((
            order_items::order_id,
            order_items::quantity,
            order_items::customization,
            menu_items::name,
            menu_items::price,
        ))
        .get_results(conn)
        .await
        .context("Failed to get order items")?;

    let mut group: HashMap<i32, Vec<OrderLineRes>> = HashMap::new();
    for (order_id, quantity, customization, name, price) in lines {
        group.entry(order_id).or_default().push(OrderLineRes {
            name,
            quantity,
            price,
            customization,
        });
    }

    let summaries: Vec<OrderSummaryRes> = pending
        .into_iter()
        .map(|order| OrderSummaryRes {
            order_id: order.id,
            order_number: order.order_number,
            table_id: order.table_id,
            order_time: lifecycle::format_local_hm(order.created_at, tz),
            total_price: order.total_price,
            status: order.status,
            items: group.remove(&order.id).unwrap_or_default(),
        })
        .collect();

    Ok(Json(summaries))
}

/// Diner status page with the remaining preparation countdown.
async fn order_status(
    Path(order_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let order: QueryResult<OrderEntity> = orders::table.find(order_id).get_result(conn).await;

    if let Err(err) = order {
        match err {
            DieselError::NotFound => return Err(AppError::NotFound),
            _ => return Err(AppError::Other(err.into())),
        }
    }

    let order = order.unwrap();
    let remaining = lifecycle::remaining_prep_seconds(order.created_at, Utc::now());
    Ok(Html(views::order_status_page(&order, remaining)))
}

/// One-way transition Pending -> Completed. Completing a completed order
/// leaves it completed; nothing moves an order back.
async fn update_order_status(
    Path(order_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let updated = diesel::update(orders::table.find(order_id))
        .set(orders::status.eq(lifecycle::STATUS_COMPLETED))
        .execute(conn)
        .await
        .context("Failed to update order status")?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Redirect::to("/waiter_view?flash=Order+status+updated."))
}
