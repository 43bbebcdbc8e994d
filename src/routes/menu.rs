use anyhow::Context;
use axum::{
    Router,
    extract::{Path, State},
    response::Html,
    routing,
};
use diesel::{ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;

use crate::{
    catalog,
    core::{app_error::AppError, app_state::AppState},
    models::MenuItemEntity,
    schema::{dining_tables, menu_items},
    views,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/menu/{table_id}", routing::get(menu))
}

/// The diner-facing menu page behind a table's scanned code. Unknown tables
/// are a 404; the configured range is whatever rows exist.
async fn menu(
    Path(table_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let table_exists: i64 = dining_tables::table
        .find(table_id)
        .count()
        .get_result(conn)
        .await
        .context("Failed to look up table")?;
    if table_exists == 0 {
        return Err(AppError::NotFound);
    }

    let items: Vec<MenuItemEntity> = menu_items::table
        .order_by(menu_items::name.asc())
        .get_results(conn)
        .await
        .context("Failed to load menu items")?;

    let groups = catalog::group_by_category(&state.config.business.menu_categories, items);
    Ok(Html(views::menu_page(table_id, &groups)))
}
