use serde::Deserialize;

pub mod admin;
pub mod health;
pub mod menu;
pub mod notifications;
pub mod orders;
pub mod staff;

/// One-shot flash message carried across redirects as a query parameter;
/// the service keeps no session state.
#[derive(Deserialize)]
pub(crate) struct FlashParams {
    pub flash: Option<String>,
}
