use anyhow::Context;
use axum::{
    Router,
    extract::{Multipart, Path, Query, State, multipart::Field},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing,
};
use chrono::NaiveDate;
use diesel::{ExpressionMethods, QueryDsl, QueryResult};
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::{
    catalog::ImageStore,
    core::{aliases::DieselError, app_error::AppError, app_state::AppState},
    models::{CreateMenuItemEntity, MenuItemEntity, UpdateMenuItemEntity},
    routes::FlashParams,
    schema::{menu_items, order_items},
    views,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin", routing::get(admin_panel))
        .route("/add_menu_item", routing::post(add_menu_item))
        .route("/edit_menu_item/{item_id}", routing::post(edit_menu_item))
        .route(
            "/delete_menu_item/{item_id}",
            routing::post(delete_menu_item),
        )
        .route("/images/{filename}", routing::get(serve_image))
}

/// Form validation failures come back to the admin page as a flash message
/// rather than a bare 4xx.
fn admin_redirect(message: &str) -> Redirect {
    Redirect::to(&format!("/admin?flash={}", message.replace(' ', "+")))
}

async fn admin_panel(
    State(state): State<AppState>,
    Query(params): Query<FlashParams>,
) -> Result<Html<String>, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let items: Vec<MenuItemEntity> = menu_items::table
        .order_by((menu_items::category.asc(), menu_items::name.asc()))
        .get_results(conn)
        .await
        .context("Failed to load menu items")?;

    Ok(Html(views::admin_page(
        &items,
        &state.config.business.menu_categories,
        params.flash.as_deref(),
    )))
}

/// Raw multipart form for a menu item; nothing validated yet.
#[derive(Debug, Default)]
struct MenuItemForm {
    name: Option<String>,
    description: String,
    price: Option<String>,
    category: Option<String>,
    customizable: bool,
    display_date: Option<String>,
    image: Option<(String, Vec<u8>)>,
}

async fn field_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))
}

async fn read_item_form(multipart: &mut Multipart) -> Result<MenuItemForm, AppError> {
    let mut form = MenuItemForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart request: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "name" => form.name = Some(field_text(field).await?),
            "description" => form.description = field_text(field).await?,
            "price" => form.price = Some(field_text(field).await?),
            "category" => form.category = Some(field_text(field).await?),
            // Checkbox: present means checked, the value does not matter.
            "customizable" => {
                field_text(field).await?;
                form.customizable = true;
            }
            "display_date" => {
                let value = field_text(field).await?;
                if !value.is_empty() {
                    form.display_date = Some(value);
                }
            }
            "image" => {
                let original = field.file_name().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?;
                // Browsers send an empty file part when nothing was chosen.
                if let Some(original) = original {
                    if !original.is_empty() && !data.is_empty() {
                        form.image = Some((original, data.to_vec()));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

#[derive(Debug)]
struct ValidatedItemForm {
    name: String,
    description: String,
    price: f32,
    category: String,
    customizable: bool,
    display_date: Option<NaiveDate>,
    image: Option<(String, Vec<u8>)>,
}

fn validate_item_form(form: MenuItemForm) -> Result<ValidatedItemForm, String> {
    let name = form
        .name
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| "Name is required".to_string())?;
    let price_raw = form
        .price
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| "Price is required".to_string())?;
    let price: f32 = price_raw
        .trim()
        .parse()
        .map_err(|_| "Price must be a number".to_string())?;
    if price < 0.0 {
        return Err("Price must not be negative".to_string());
    }
    let category = form
        .category
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| "Category is required".to_string())?;
    let display_date = match form.display_date {
        Some(raw) => Some(
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| "Display date must be YYYY-MM-DD".to_string())?,
        ),
        None => None,
    };

    Ok(ValidatedItemForm {
        name,
        description: form.description,
        price,
        category,
        customizable: form.customizable,
        display_date,
        image: form.image,
    })
}

async fn add_menu_item(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let form = read_item_form(&mut multipart).await?;
    let form = match validate_item_form(form) {
        Ok(form) => form,
        Err(message) => return Ok(admin_redirect(&message)),
    };

    let image_filename = match &form.image {
        Some((original, data)) => {
            let store = ImageStore::new(&state.config.uploads.dir);
            match store.save(original, data).await {
                Ok(filename) => Some(filename),
                Err(AppError::Validation(message)) => return Ok(admin_redirect(&message)),
                Err(err) => return Err(err),
            }
        }
        None => None,
    };

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    diesel::insert_into(menu_items::table)
        .values(CreateMenuItemEntity {
            name: form.name,
            description: form.description,
            price: form.price,
            customizable: form.customizable,
            category: form.category,
            image_filename,
            display_date: form.display_date,
        })
        .execute(conn)
        .await
        .context("Failed to create menu item")?;

    Ok(admin_redirect("Menu item added."))
}

async fn edit_menu_item(
    Path(item_id): Path<i32>,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let form = read_item_form(&mut multipart).await?;
    let form = match validate_item_form(form) {
        Ok(form) => form,
        Err(message) => return Ok(admin_redirect(&message)),
    };

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let existing: QueryResult<MenuItemEntity> =
        menu_items::table.find(item_id).get_result(conn).await;
    let existing = match existing {
        Ok(item) => item,
        Err(DieselError::NotFound) => return Err(AppError::NotFound),
        Err(err) => return Err(AppError::Other(err.into())),
    };

    // One owner per filename: the previous asset goes away before the
    // replacement is written.
    let new_image = match &form.image {
        Some((original, data)) => {
            let store = ImageStore::new(&state.config.uploads.dir);
            if let Some(old) = &existing.image_filename {
                store.delete(old).await?;
            }
            match store.save(original, data).await {
                Ok(filename) => Some(filename),
                Err(AppError::Validation(message)) => return Ok(admin_redirect(&message)),
                Err(err) => return Err(err),
            }
        }
        None => None,
    };

    diesel::update(menu_items::table.find(item_id))
        .set(UpdateMenuItemEntity {
            name: form.name,
            description: form.description,
            price: form.price,
            customizable: form.customizable,
            category: form.category,
            display_date: form.display_date,
        })
        .execute(conn)
        .await
        .context("Failed to update menu item")?;

    if let Some(filename) = new_image {
        diesel::update(menu_items::table.find(item_id))
            .set(menu_items::image_filename.eq(Some(filename)))
            .execute(conn)
            .await
            .context("Failed to update menu item image")?;
    }

    Ok(admin_redirect("Menu item updated."))
}

/// Deleting a menu item removes the order lines that reference it first, in
/// the same transaction. Historical orders lose that line's detail.
async fn delete_menu_item(
    Path(item_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let existing: QueryResult<MenuItemEntity> =
        menu_items::table.find(item_id).get_result(conn).await;
    let existing = match existing {
        Ok(item) => item,
        Err(DieselError::NotFound) => return Err(AppError::NotFound),
        Err(err) => return Err(AppError::Other(err.into())),
    };

    conn.transaction::<(), AppError, _>(move |conn| {
        Box::pin(async move {
            diesel::delete(order_items::table.filter(order_items::menu_item_id.eq(item_id)))
                .execute(conn)
                .await
                .context("Failed to delete order items for menu item")?;
            diesel::delete(menu_items::table.find(item_id))
                .execute(conn)
                .await
                .context("Failed to delete menu item")?;
            Ok(())
        })
    })
    .await?;

    if let Some(filename) = existing.image_filename {
        ImageStore::new(&state.config.uploads.dir)
            .delete(&filename)
            .await?;
    }

    Ok(admin_redirect("Menu item deleted."))
}

enum ImageResponse {
    Found(Vec<u8>, String),
    NotFound,
    BadRequest(&'static str),
}

impl IntoResponse for ImageResponse {
    fn into_response(self) -> Response {
        match self {
            ImageResponse::Found(content, content_type) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, content_type)],
                content,
            )
                .into_response(),
            ImageResponse::NotFound => (StatusCode::NOT_FOUND, "File not found").into_response(),
            ImageResponse::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
        }
    }
}

async fn serve_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ImageResponse {
    let store = ImageStore::new(&state.config.uploads.dir);
    let Some(path) = store.path_of(&filename) else {
        return ImageResponse::BadRequest("Invalid filename");
    };

    match tokio::fs::read(&path).await {
        Ok(content) => {
            let content_type = mime_guess::from_path(&path)
                .first_or_octet_stream()
                .to_string();
            ImageResponse::Found(content, content_type)
        }
        Err(_) => ImageResponse::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_form() -> MenuItemForm {
        MenuItemForm {
            name: Some("Tomato soup".to_string()),
            description: "With basil".to_string(),
            price: Some("12.50".to_string()),
            category: Some("Soups".to_string()),
            customizable: true,
            display_date: None,
            image: None,
        }
    }

    #[test]
    fn test_valid_form_passes() {
        let form = validate_item_form(base_form()).unwrap();
        assert_eq!(form.name, "Tomato soup");
        assert_eq!(form.price, 12.5);
        assert!(form.customizable);
        assert!(form.display_date.is_none());
    }

    #[test]
    fn test_missing_required_fields_are_rejected() {
        let mut form = base_form();
        form.name = None;
        assert_eq!(validate_item_form(form).unwrap_err(), "Name is required");

        let mut form = base_form();
        form.price = Some("   ".to_string());
        assert_eq!(validate_item_form(form).unwrap_err(), "Price is required");

        let mut form = base_form();
        form.category = None;
        assert_eq!(validate_item_form(form).unwrap_err(), "Category is required");
    }

    #[test]
    fn test_price_must_be_a_non_negative_number() {
        let mut form = base_form();
        form.price = Some("abc".to_string());
        assert_eq!(validate_item_form(form).unwrap_err(), "Price must be a number");

        let mut form = base_form();
        form.price = Some("-1".to_string());
        assert_eq!(
            validate_item_form(form).unwrap_err(),
            "Price must not be negative"
        );
    }

    #[test]
    fn test_display_date_is_parsed_when_present() {
        let mut form = base_form();
        form.display_date = Some("2026-08-06".to_string());
        let parsed = validate_item_form(form).unwrap();
        assert_eq!(
            parsed.display_date,
            NaiveDate::from_ymd_opt(2026, 8, 6)
        );

        let mut form = base_form();
        form.display_date = Some("06.08.2026".to_string());
        assert_eq!(
            validate_item_form(form).unwrap_err(),
            "Display date must be YYYY-MM-DD"
        );
    }
}
