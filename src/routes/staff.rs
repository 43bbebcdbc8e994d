use std::collections::HashMap;

use anyhow::Context;
use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing,
};
use diesel::{ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;

use crate::{
    core::{app_error::AppError, app_state::AppState},
    models::OrderEntity,
    orders::lifecycle,
    routes::FlashParams,
    schema::{menu_items, order_items, orders},
    views,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/waiter_view", routing::get(waiter_view))
        .route("/order_history", routing::get(order_history))
}

/// The staff board: every non-completed order with its lines and active
/// call/bill notifications. Clients re-request the page to poll.
async fn waiter_view(
    State(state): State<AppState>,
    Query(params): Query<FlashParams>,
) -> Result<Html<String>, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;
    let tz = state.config.business.timezone;

    let active: Vec<OrderEntity> = orders::table
        .filter(orders::status.ne(lifecycle::STATUS_COMPLETED))
        .order_by(orders::created_at.asc())
        .get_results(conn)
        .await
        .context("Failed to get active orders")?;

    let order_ids: Vec<i32> = active.iter().map(|order| order.id).collect();
    let lines: Vec<(i32, i32, Option<String>, String)> = order_items::table
        .inner_join(menu_items::table)
        .filter(order_items::order_id.eq_any(&order_ids))
        .select((
            order_items::order_id,
            order_items::quantity,
            order_items::customization,
            menu_items::name,
        ))
        .get_results(conn)
        .await
        .context("Failed to get order items")?;

    let mut group: HashMap<i32, Vec<views::ItemLine>> = HashMap::new();
    for (order_id, quantity, customization, name) in lines {
        group.entry(order_id).or_default().push(views::ItemLine {
            name,
            quantity,
            customization,
        });
    }

    let rows: Vec<views::OrderRow> = active
        .into_iter()
        .map(|order| views::OrderRow {
            created_local: lifecycle::format_local_hm(order.created_at, tz),
            items: group.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect();

    Ok(Html(views::waiter_view_page(
        &rows,
        params.flash.as_deref(),
    )))
}

/// Completed orders, newest first.
async fn order_history(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;
    let tz = state.config.business.timezone;

    let completed: Vec<OrderEntity> = orders::table
        .filter(orders::status.eq(lifecycle::STATUS_COMPLETED))
        .order_by(orders::created_at.desc())
        .get_results(conn)
        .await
        .context("Failed to get completed orders")?;

    let order_ids: Vec<i32> = completed.iter().map(|order| order.id).collect();
    let lines: Vec<(i32, i32, Option<String>, String)> = order_items::table
        .inner_join(menu_items::table)
        .filter(order_items::order_id.eq_any(&order_ids))
        .select((
            order_items::order_id,
            order_items::quantity,
            order_items::customization,
            menu_items::name,
        ))
        .get_results(conn)
        .await
        .context("Failed to get order items")?;

    let mut group: HashMap<i32, Vec<views::ItemLine>> = HashMap::new();
    for (order_id, quantity, customization, name) in lines {
        group.entry(order_id).or_default().push(views::ItemLine {
            name,
            quantity,
            customization,
        });
    }

    let rows: Vec<views::OrderRow> = completed
        .into_iter()
        .map(|order| views::OrderRow {
            created_local: lifecycle::format_local_hm(order.created_at, tz),
            items: group.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect();

    Ok(Html(views::order_history_page(&rows)))
}
