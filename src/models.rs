use chrono::{DateTime, NaiveDate, Utc};
use diesel::{
    Selectable,
    prelude::{AsChangeset, Identifiable, Insertable, Queryable},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Dining tables

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::dining_tables)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DiningTableEntity {
    pub id: i32,
    pub code: String,
}

// Menu items

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::menu_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MenuItemEntity {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f32,
    pub customizable: bool,
    pub category: String,
    pub image_filename: Option<String>,
    pub display_date: Option<NaiveDate>,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = crate::schema::menu_items)]
pub struct CreateMenuItemEntity {
    pub name: String,
    pub description: String,
    pub price: f32,
    pub customizable: bool,
    pub category: String,
    pub image_filename: Option<String>,
    pub display_date: Option<NaiveDate>,
}

/// Changeset for menu item edits. `display_date` is only touched when the
/// form supplied one; the image filename is updated separately because a
/// missing upload means "keep the current image".
#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::schema::menu_items)]
pub struct UpdateMenuItemEntity {
    pub name: String,
    pub description: String,
    pub price: f32,
    pub customizable: bool,
    pub category: String,
    pub display_date: Option<NaiveDate>,
}

// Orders

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderEntity {
    pub id: i32,
    pub table_id: i32,
    pub status: String,
    pub total_price: f32,
    pub created_at: DateTime<Utc>,
    pub call_waiter: bool,
    pub last_call_time: Option<DateTime<Utc>>,
    pub bill_requested: bool,
    pub bill_payment_method: Option<String>,
    pub order_day: NaiveDate,
    pub order_number: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateOrderEntity {
    pub table_id: i32,
    pub status: String,
    pub total_price: f32,
    pub order_day: NaiveDate,
    pub order_number: i32,
}

// Order items

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemEntity {
    pub id: i32,
    pub order_id: i32,
    pub menu_item_id: i32,
    pub quantity: i32,
    pub customization: Option<String>,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = crate::schema::order_items)]
pub struct CreateOrderItemEntity {
    pub order_id: i32,
    pub menu_item_id: i32,
    pub quantity: i32,
    pub customization: Option<String>,
}
