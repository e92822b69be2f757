use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use crate::auth::models::User;
use crate::catalog::models::{Product, ProductImage};
use crate::database::manager::DatabaseError;
use crate::database::repository::{ProductRepository, ProductTransaction, UserRepository};
use crate::filter::Page;

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    products: HashMap<Uuid, Product>,
}

impl MemoryState {
    /// Mirrors the unique indexes on products.title and products.slug
    fn check_product_unique(&self, candidate: &Product) -> Result<(), DatabaseError> {
        for other in self.products.values().filter(|p| p.id != candidate.id) {
            if other.title == candidate.title {
                return Err(DatabaseError::UniqueViolation {
                    detail: format!("Key (title)=({}) already exists.", candidate.title),
                });
            }
            if other.slug == candidate.slug {
                return Err(DatabaseError::UniqueViolation {
                    detail: format!("Key (slug)=({}) already exists.", candidate.slug),
                });
            }
        }
        Ok(())
    }

    fn check_owner_exists(&self, product: &Product) -> Result<(), DatabaseError> {
        if self.users.contains_key(&product.user.id) {
            Ok(())
        } else {
            Err(DatabaseError::QueryError(format!(
                "insert or update on table \"products\" violates foreign key constraint: user {} does not exist",
                product.user.id
            )))
        }
    }

    fn sorted_products(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self.products.values().cloned().collect();
        products.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        products
    }
}

/// Process-local store implementing every repository trait.
///
/// Reads see committed state only. Each product has its own row lock, taken by
/// [`ProductRepository::begin`] and by deletes, so a transaction excludes concurrent writers of
/// the same product without blocking the rest of the catalog.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
    row_locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn lock_row(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.row_locks.lock().await;
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::UniqueViolation {
                detail: format!("Key (email)=({}) already exists.", user.email),
            });
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn delete_all(&self) -> Result<u64, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.products.is_empty() {
            return Err(DatabaseError::QueryError(
                "update or delete on table \"users\" violates foreign key constraint on table \"products\"".to_string(),
            ));
        }
        let count = state.users.len() as u64;
        state.users.clear();
        Ok(count)
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn insert(&self, product: &Product) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        if state.products.contains_key(&product.id) {
            return Err(DatabaseError::UniqueViolation {
                detail: format!("Key (id)=({}) already exists.", product.id),
            });
        }
        state.check_product_unique(product)?;
        state.check_owner_exists(product)?;
        state.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn find_page(&self, page: Page) -> Result<Vec<Product>, DatabaseError> {
        let state = self.state.read().await;
        Ok(page.slice(state.sorted_products()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DatabaseError> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn find_by_title_or_slug(
        &self,
        title: &str,
        slug: &str,
    ) -> Result<Option<Product>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .sorted_products()
            .into_iter()
            .find(|p| p.title.to_uppercase() == title || p.slug.as_str() == slug))
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let _row = self.lock_row(id).await;
        let mut state = self.state.write().await;
        match state.products.remove(&id) {
            Some(_) => {
                drop(state);
                self.row_locks.lock().await.remove(&id);
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("Product with id {} not found", id))),
        }
    }

    async fn delete_all(&self) -> Result<u64, DatabaseError> {
        let mut state = self.state.write().await;
        let count = state.products.len() as u64;
        state.products.clear();
        Ok(count)
    }

    async fn begin(&self, id: Uuid) -> Result<Box<dyn ProductTransaction>, DatabaseError> {
        let guard = self.lock_row(id).await;
        let product = self
            .state
            .read()
            .await
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("Product with id {} not found", id)))?;

        Ok(Box::new(MemoryProductTransaction {
            state: Arc::clone(&self.state),
            _row: guard,
            original: product.clone(),
            staged: product,
        }))
    }
}

/// Stages changes on a private copy; nothing is visible until commit
pub struct MemoryProductTransaction {
    state: Arc<RwLock<MemoryState>>,
    _row: OwnedMutexGuard<()>,
    original: Product,
    staged: Product,
}

#[async_trait]
impl ProductTransaction for MemoryProductTransaction {
    fn product(&self) -> &Product {
        &self.original
    }

    async fn delete_images(&mut self) -> Result<u64, DatabaseError> {
        let removed = self.staged.images.len() as u64;
        self.staged.images.clear();
        Ok(removed)
    }

    async fn insert_images(&mut self, images: &[ProductImage]) -> Result<(), DatabaseError> {
        if let Some(foreign) = images.iter().find(|i| i.product_id != self.staged.id) {
            return Err(DatabaseError::QueryError(format!(
                "image {} belongs to product {}, not {}",
                foreign.id, foreign.product_id, self.staged.id
            )));
        }
        self.staged.images.extend_from_slice(images);
        Ok(())
    }

    async fn save(&mut self, product: &Product) -> Result<(), DatabaseError> {
        let images = std::mem::take(&mut self.staged.images);
        let mut next = product.clone();
        next.images = images;

        {
            let state = self.state.read().await;
            state.check_product_unique(&next)?;
            state.check_owner_exists(&next)?;
        }

        self.staged = next;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let this = *self;
        let mut state = this.state.write().await;
        if !state.products.contains_key(&this.staged.id) {
            return Err(DatabaseError::NotFound(format!(
                "Product with id {} not found",
                this.staged.id
            )));
        }
        state.check_product_unique(&this.staged)?;
        state.products.insert(this.staged.id, this.staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use crate::catalog::slug::Slug;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "owner@example.com".to_string(),
            password: "hash".to_string(),
            full_name: "Owner".to_string(),
            is_active: true,
            roles: vec![Role::Admin],
        }
    }

    fn product(owner: &User, title: &str) -> Product {
        let id = Uuid::new_v4();
        Product {
            id,
            title: title.to_string(),
            price: 1.0,
            description: None,
            slug: Slug::derive(None, title),
            stock: 1,
            sizes: vec![],
            gender: "unisex".to_string(),
            tags: vec![],
            images: ProductImage::for_product(id, &["a.png".to_string()]),
            user: owner.summary(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let store = MemoryStore::new();
        let owner = user();
        UserRepository::insert(&store, &owner).await.unwrap();

        let mut twin = user();
        twin.id = Uuid::new_v4();
        let err = UserRepository::insert(&store, &twin).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn uncommitted_transaction_is_invisible_and_discarded_on_drop() {
        let store = MemoryStore::new();
        let owner = user();
        UserRepository::insert(&store, &owner).await.unwrap();
        let p = product(&owner, "Blue Hat");
        ProductRepository::insert(&store, &p).await.unwrap();

        {
            let mut tx = store.begin(p.id).await.unwrap();
            tx.delete_images().await.unwrap();
            let visible = ProductRepository::find_by_id(&store, p.id).await.unwrap().unwrap();
            assert_eq!(visible.images.len(), 1);
        }

        let after = ProductRepository::find_by_id(&store, p.id).await.unwrap().unwrap();
        assert_eq!(after, p);

        // lock was released by the drop above
        let tx = store.begin(p.id).await.unwrap();
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn users_with_products_cannot_be_cleared() {
        let store = MemoryStore::new();
        let owner = user();
        UserRepository::insert(&store, &owner).await.unwrap();
        ProductRepository::insert(&store, &product(&owner, "Blue Hat")).await.unwrap();

        assert!(UserRepository::delete_all(&store).await.is_err());
        ProductRepository::delete_all(&store).await.unwrap();
        assert_eq!(UserRepository::delete_all(&store).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_missing_product_is_not_found() {
        let store = MemoryStore::new();
        let err = ProductRepository::delete(&store, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }
}
