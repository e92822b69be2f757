// handlers/protected/products/mod.rs - Catalog writes
pub mod create; // POST /api/products (user)
pub mod delete; // DELETE /api/products/:id (admin)
pub mod update; // PATCH /api/products/:id (admin)

pub use create::create_post;
pub use delete::delete_delete;
pub use update::update_patch;

use uuid::Uuid;

use crate::error::ApiError;

/// Write routes only accept canonical product ids
pub(crate) fn parse_product_id(raw: &str) -> Result<Uuid, ApiError> {
    if raw.len() == 36 {
        if let Ok(id) = Uuid::try_parse(raw) {
            return Ok(id);
        }
    }
    Err(ApiError::bad_request("Validation failed (uuid is expected)"))
}
