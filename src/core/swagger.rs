use anyhow::Result;
use utoipa_swagger_ui::SwaggerUi;

/// Interactive docs for the JSON API, mounted at `/swagger-ui`.
pub fn create_swagger_ui(openapi: utoipa::openapi::OpenApi) -> Result<SwaggerUi> {
    Ok(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
}
