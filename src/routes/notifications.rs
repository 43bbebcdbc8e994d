use anyhow::Context;
use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use diesel::{BoolExpressionMethods, ExpressionMethods, QueryDsl, QueryResult};
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    core::{aliases::DieselError, app_error::AppError, app_state::AppState},
    models::OrderEntity,
    orders::lifecycle::{self, NotificationKind},
    schema::orders,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(request_bill))
        .routes(utoipa_axum::routes!(call_waiter))
        .routes(utoipa_axum::routes!(check_waiter_calls))
        .routes(utoipa_axum::routes!(dismiss_call))
        .routes(utoipa_axum::routes!(dismiss_bill))
}

#[derive(Deserialize, ToSchema)]
pub struct RequestBillReq {
    payment_method: String,
}

#[derive(Serialize, ToSchema)]
pub struct StatusRes {
    status: String,
}

#[derive(Serialize, ToSchema)]
pub struct StatusMessageRes {
    status: String,
    message: String,
}

/// Flag a bill request on an order and remember how the diner wants to pay.
/// Allowed in any status.
#[utoipa::path(
    post,
    path = "/request_bill/{order_id}",
    tags = ["Notifications"],
    params(
        ("order_id" = i32, Path, description = "Order to flag")
    ),
    request_body = RequestBillReq,
    responses(
        (status = 200, description = "Bill requested", body = StatusMessageRes),
        (status = 404, description = "Unknown order")
    )
)]
async fn request_bill(
    Path(order_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<RequestBillReq>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let updated = diesel::update(orders::table.find(order_id))
        .set((
            orders::bill_requested.eq(true),
            orders::bill_payment_method.eq(Some(body.payment_method)),
        ))
        .execute(conn)
        .await
        .context("Failed to flag bill request")?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Json(StatusMessageRes {
        status: "success".into(),
        message: "Bill requested".into(),
    }))
}

/// Flag a waiter call, debounced: a second call within the cooldown is
/// rejected and mutates nothing, including the last-call timestamp.
#[utoipa::path(
    post,
    path = "/call_waiter/{order_id}",
    tags = ["Notifications"],
    params(
        ("order_id" = i32, Path, description = "Order to flag")
    ),
    responses(
        (status = 200, description = "Waiter called", body = StatusRes),
        (status = 403, description = "Called again within the cooldown"),
        (status = 404, description = "Unknown order")
    )
)]
async fn call_waiter(
    Path(order_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
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
    let now = Utc::now();
    if !lifecycle::call_allowed(order.last_call_time, now) {
        return Err(AppError::RateLimited(
            "You must wait before calling the waiter again".into(),
        ));
    }

    diesel::update(orders::table.find(order_id))
        .set((
            orders::call_waiter.eq(true),
            orders::last_call_time.eq(Some(now)),
        ))
        .execute(conn)
        .await
        .context("Failed to flag waiter call")?;

    Ok(Json(StatusRes {
        status: "success".into(),
    }))
}

#[derive(Serialize, ToSchema)]
pub struct WaiterCallRes {
    order_id: i32,
    order_number: i32,
    table_id: i32,
    call_type: NotificationKind,
    call_time: Option<String>,
    payment_method: Option<String>,
}

/// Poll endpoint for staff: every order with an active call or bill flag,
/// tagged with which condition applies.
#[utoipa::path(
    get,
    path = "/check_waiter_calls",
    tags = ["Notifications"],
    responses(
        (status = 200, description = "Active notifications", body = Vec<WaiterCallRes>)
    )
)]
async fn check_waiter_calls(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;
    let tz = state.config.business.timezone;

    let flagged: Vec<OrderEntity> = orders::table
        .filter(orders::call_waiter.eq(true).or(orders::bill_requested.eq(true)))
        .get_results(conn)
        .await
        .context("Failed to get waiter calls")?;

    let calls: Vec<WaiterCallRes> = flagged
        .into_iter()
        .filter_map(|order| {
            let call_type = lifecycle::notification_kind(order.call_waiter, order.bill_requested)?;
            let call_time = match (order.call_waiter, order.last_call_time) {
                (true, Some(t)) => Some(lifecycle::format_local_hms(t, tz)),
                _ => None,
            };
            Some(WaiterCallRes {
                order_id: order.id,
                order_number: order.order_number,
                table_id: order.table_id,
                call_type,
                call_time,
                payment_method: if order.bill_requested {
                    order.bill_payment_method
                } else {
                    None
                },
            })
        })
        .collect();

    Ok(Json(calls))
}

/// Clear the call-waiter flag. Clearing an already-clear flag is a no-op
/// success; the last-call timestamp is kept for the cooldown.
#[utoipa::path(
    post,
    path = "/dismiss_call/{order_id}",
    tags = ["Notifications"],
    params(
        ("order_id" = i32, Path, description = "Order to clear")
    ),
    responses(
        (status = 200, description = "Call dismissed", body = StatusMessageRes),
        (status = 404, description = "Unknown order")
    )
)]
async fn dismiss_call(
    Path(order_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let updated = diesel::update(orders::table.find(order_id))
        .set(orders::call_waiter.eq(false))
        .execute(conn)
        .await
        .context("Failed to dismiss waiter call")?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Json(StatusMessageRes {
        status: "success".into(),
        message: "Waiter call notification dismissed".into(),
    }))
}

/// Clear the bill-request flag and the stored payment method. Idempotent.
#[utoipa::path(
    post,
    path = "/dismiss_bill/{order_id}",
    tags = ["Notifications"],
    params(
        ("order_id" = i32, Path, description = "Order to clear")
    ),
    responses(
        (status = 200, description = "Bill request dismissed", body = StatusMessageRes),
        (status = 404, description = "Unknown order")
    )
)]
async fn dismiss_bill(
    Path(order_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let updated = diesel::update(orders::table.find(order_id))
        .set((
            orders::bill_requested.eq(false),
            orders::bill_payment_method.eq(None::<String>),
        ))
        .execute(conn)
        .await
        .context("Failed to dismiss bill request")?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Json(StatusMessageRes {
        status: "success".into(),
        message: "Bill request notification dismissed".into(),
    }))
}
