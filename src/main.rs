use anyhow::Result;
use axum::Router;
use diesel_migrations::{EmbeddedMigrations, embed_migrations};
use gastro_orderservice::core::{bootstrap, config, db, swagger};
use gastro_orderservice::routes;

/// Migrations embedded into the binary which helps with streamlining image building process
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing();
    bootstrap::init_env();

    let api = routes::orders::routes_with_openapi()
        .merge(routes::notifications::routes_with_openapi());

    let mut openapi = api.get_openapi().clone();
    openapi.info = utoipa::openapi::InfoBuilder::new()
        .title("Gastro OrderService API")
        .version("1.0.0")
        .build();
    let swagger_ui = swagger::create_swagger_ui(openapi)?;

    let app = Router::new()
        .merge(api)
        .merge(swagger_ui)
        .merge(routes::menu::routes())
        .merge(routes::orders::routes())
        .merge(routes::staff::routes())
        .merge(routes::admin::routes())
        .merge(routes::health::routes());

    tracing::info!("Running migrations...");
    let config = config::load()?;
    let migrations_count = db::run_migrations_blocking(MIGRATIONS, &config.database.url).await?;
    tracing::info!("Run {} new migrations successfully", migrations_count);

    bootstrap::bootstrap("OrderService", app).await?;
    Ok(())
}
