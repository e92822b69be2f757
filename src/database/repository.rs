use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::models::User;
use crate::catalog::models::{Product, ProductImage};
use crate::database::manager::DatabaseError;
use crate::filter::Page;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `UniqueViolation` when the email is taken
    async fn insert(&self, user: &User) -> Result<(), DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn delete_all(&self) -> Result<u64, DatabaseError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert the product row and all of its images atomically
    async fn insert(&self, product: &Product) -> Result<(), DatabaseError>;

    /// Products ordered by title, windowed by `page`
    async fn find_page(&self, page: Page) -> Result<Vec<Product>, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DatabaseError>;

    /// `title` is compared against the upper-cased stored title, `slug` exactly.
    /// Callers pass them already upper-/lower-cased.
    async fn find_by_title_or_slug(
        &self,
        title: &str,
        slug: &str,
    ) -> Result<Option<Product>, DatabaseError>;

    /// Delete the images, then the product. `NotFound` when absent.
    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError>;

    async fn delete_all(&self) -> Result<u64, DatabaseError>;

    /// Open a transaction holding an exclusive lock on one product's rows.
    /// `NotFound` when the product disappeared before the lock was taken.
    async fn begin(&self, id: Uuid) -> Result<Box<dyn ProductTransaction>, DatabaseError>;
}

/// Unit of work over a single product.
///
/// Dropping a transaction without committing discards every staged change and releases the
/// lock, which covers error returns and cancelled futures alike.
#[async_trait]
pub trait ProductTransaction: Send {
    /// The product as it was when the lock was taken
    fn product(&self) -> &Product;

    async fn delete_images(&mut self) -> Result<u64, DatabaseError>;

    async fn insert_images(&mut self, images: &[ProductImage]) -> Result<(), DatabaseError>;

    /// Persist scalar fields and owner. Images are handled by the two methods above.
    async fn save(&mut self, product: &Product) -> Result<(), DatabaseError>;

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError>;
}
