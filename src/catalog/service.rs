use std::sync::Arc;

use uuid::Uuid;

use super::error::{handle_db_error, CatalogError};
use super::models::{NewProduct, Product, ProductChanges, ProductImage, ProductView};
use super::slug::Slug;
use crate::auth::models::User;
use crate::database::{ProductRepository, ProductTransaction};
use crate::filter::Page;

/// How a lookup term is interpreted. Decided once, up front; the two paths never mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupTerm {
    Id(Uuid),
    Text { title: String, slug: String },
}

impl LookupTerm {
    /// Only the canonical hyphenated form counts as an identifier
    pub fn parse(term: &str) -> Self {
        if term.len() == 36 {
            if let Ok(id) = Uuid::try_parse(term) {
                return LookupTerm::Id(id);
            }
        }

        LookupTerm::Text {
            title: term.to_uppercase(),
            slug: term.to_lowercase(),
        }
    }
}

/// Create, lookup, update and removal of product aggregates
#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn create(&self, input: NewProduct, owner: &User) -> Result<ProductView, CatalogError> {
        input.validate()?;

        let id = Uuid::new_v4();
        let product = Product {
            id,
            slug: Slug::derive(input.slug.as_deref(), &input.title),
            title: input.title,
            price: input.price,
            description: input.description,
            stock: input.stock,
            sizes: input.sizes,
            gender: input.gender,
            tags: input.tags,
            images: ProductImage::for_product(id, &input.images),
            user: owner.summary(),
        };

        self.products.insert(&product).await.map_err(handle_db_error)?;
        tracing::info!("Created product {} ({}) for {}", product.id, product.slug, owner.id);

        Ok(product.into())
    }

    pub async fn find_many(&self, page: Page) -> Result<Vec<ProductView>, CatalogError> {
        let products = self.products.find_page(page).await.map_err(handle_db_error)?;
        Ok(products.into_iter().map(ProductView::from).collect())
    }

    /// Identifier lookup for uuid-shaped terms, title-or-slug match for everything else
    pub async fn find_one(&self, term: &str) -> Result<Product, CatalogError> {
        let found = match LookupTerm::parse(term) {
            LookupTerm::Id(id) => self.products.find_by_id(id).await,
            LookupTerm::Text { title, slug } => {
                self.products.find_by_title_or_slug(&title, &slug).await
            }
        }
        .map_err(handle_db_error)?;

        found.ok_or_else(|| CatalogError::NotFound(format!("Product with {} not found", term)))
    }

    pub async fn find_one_plain(&self, term: &str) -> Result<ProductView, CatalogError> {
        Ok(self.find_one(term).await?.into())
    }

    /// Merge `changes` onto product `id` and record `actor` as its owner.
    ///
    /// A supplied image list replaces the existing images wholesale. The merge, the image
    /// replacement and the save run in one transaction; any failure leaves the product as it was.
    pub async fn update(
        &self,
        id: Uuid,
        changes: ProductChanges,
        actor: &User,
    ) -> Result<ProductView, CatalogError> {
        changes.validate()?;

        if self.products.find_by_id(id).await.map_err(handle_db_error)?.is_none() {
            return Err(CatalogError::NotFound(format!("Product with id: {} not found", id)));
        }

        let mut tx = self.products.begin(id).await.map_err(handle_db_error)?;

        match apply_changes(tx.as_mut(), &changes, actor).await {
            Ok(()) => tx.commit().await.map_err(handle_db_error)?,
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!("Rollback of product {} failed: {}", id, rollback_err);
                }
                return Err(err);
            }
        }

        tracing::info!("Updated product {} by {}", id, actor.id);
        self.find_one_plain(&id.to_string()).await
    }

    pub async fn remove(&self, term: &str) -> Result<(), CatalogError> {
        let product = self.find_one(term).await?;
        self.products.delete(product.id).await.map_err(handle_db_error)?;

        tracing::info!("Removed product {}", product.id);
        Ok(())
    }

    /// Clears the whole catalog. Only seeding calls this.
    pub async fn remove_all(&self) -> Result<u64, CatalogError> {
        self.products.delete_all().await.map_err(handle_db_error)
    }
}

async fn apply_changes(
    tx: &mut dyn ProductTransaction,
    changes: &ProductChanges,
    actor: &User,
) -> Result<(), CatalogError> {
    let mut merged = tx.product().clone();
    changes.merge_into(&mut merged);

    if let Some(urls) = &changes.images {
        tx.delete_images().await.map_err(handle_db_error)?;
        merged.images = ProductImage::for_product(merged.id, urls);
        tx.insert_images(&merged.images).await.map_err(handle_db_error)?;
    }

    merged.user = actor.summary();
    tx.save(&merged).await.map_err(handle_db_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use crate::database::{DatabaseError, MemoryStore, UserRepository};
    use async_trait::async_trait;

    fn user(email: &str, roles: Vec<Role>) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password: String::new(),
            full_name: email.split('@').next().unwrap_or_default().to_string(),
            is_active: true,
            roles,
        }
    }

    fn hat(title: &str, images: &[&str]) -> NewProduct {
        NewProduct {
            title: title.to_string(),
            price: 10.0,
            description: None,
            slug: None,
            stock: 0,
            sizes: vec!["M".to_string()],
            gender: "unisex".to_string(),
            tags: vec![],
            images: images.iter().map(|s| s.to_string()).collect(),
        }
    }

    async fn setup() -> (MemoryStore, CatalogService, User) {
        let store = MemoryStore::new();
        let owner = user("owner@example.com", vec![Role::Admin]);
        UserRepository::insert(&store, &owner).await.unwrap();
        let catalog = CatalogService::new(Arc::new(store.clone()));
        (store, catalog, owner)
    }

    #[test]
    fn lookup_term_modes() {
        let id = Uuid::new_v4();
        assert_eq!(LookupTerm::parse(&id.to_string()), LookupTerm::Id(id));
        assert_eq!(
            LookupTerm::parse("Blue Hat"),
            LookupTerm::Text {
                title: "BLUE HAT".to_string(),
                slug: "blue hat".to_string()
            }
        );
        // simple (unhyphenated) form is text, not an identifier
        assert!(matches!(
            LookupTerm::parse(&id.simple().to_string()),
            LookupTerm::Text { .. }
        ));
    }

    #[tokio::test]
    async fn blue_hat_end_to_end() {
        let (_, catalog, owner) = setup().await;

        let created = catalog.create(hat("Blue Hat", &["a.png", "b.png"]), &owner).await.unwrap();
        assert_eq!(created.slug, "blue_hat");
        assert_eq!(created.images, vec!["a.png", "b.png"]);

        let found = catalog.find_one("blue hat").await.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(catalog.find_one("blue_hat").await.unwrap().id, created.id);

        let changes = ProductChanges {
            images: Some(vec!["c.png".to_string()]),
            ..Default::default()
        };
        let updated = catalog.update(created.id, changes, &owner).await.unwrap();
        assert_eq!(updated.images, vec!["c.png"]);
        assert_eq!(updated.title, "Blue Hat");
        assert_eq!(updated.price, 10.0);
    }

    #[tokio::test]
    async fn update_records_actor_as_owner() {
        let (store, catalog, owner) = setup().await;
        let editor = user("editor@example.com", vec![Role::Admin]);
        UserRepository::insert(&store, &editor).await.unwrap();

        let created = catalog.create(hat("Red Cap", &[]), &owner).await.unwrap();
        let changes = ProductChanges {
            title: Some("Crimson Cap".to_string()),
            ..Default::default()
        };
        let updated = catalog.update(created.id, changes, &editor).await.unwrap();

        assert_eq!(updated.user.id, editor.id);
        assert_eq!(updated.title, "Crimson Cap");
        assert_eq!(updated.slug, "red_cap");
    }

    #[tokio::test]
    async fn identifier_never_falls_back_to_text() {
        let (_, catalog, owner) = setup().await;
        let ghost = Uuid::new_v4();
        // a product whose slug is exactly the uuid string
        let mut tricky = hat("Tricky", &[]);
        tricky.slug = Some(ghost.to_string());
        catalog.create(tricky, &owner).await.unwrap();

        let err = catalog.find_one(&ghost.to_string()).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_title_conflicts() {
        let (_, catalog, owner) = setup().await;
        catalog.create(hat("Blue Hat", &[]), &owner).await.unwrap();

        let err = catalog.create(hat("Blue Hat", &[]), &owner).await.unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(detail) if detail.contains("Blue Hat")));

        let other = catalog.create(hat("Green Hat", &[]), &owner).await.unwrap();
        let rename = ProductChanges {
            slug: Some("blue_hat".to_string()),
            ..Default::default()
        };
        let err = catalog.update(other.id, rename, &owner).await.unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));
        assert_eq!(catalog.find_one("green_hat").await.unwrap().id, other.id);
    }

    #[tokio::test]
    async fn update_of_missing_product_is_not_found() {
        let (_, catalog, owner) = setup().await;
        let err = catalog
            .update(Uuid::new_v4(), ProductChanges::default(), &owner)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn pagination_windows() {
        let (_, catalog, owner) = setup().await;
        for title in ["A", "B", "C", "D", "E"] {
            catalog.create(hat(title, &[]), &owner).await.unwrap();
        }

        assert_eq!(catalog.find_many(Page::new(Some(2), Some(0)).unwrap()).await.unwrap().len(), 2);
        let tail = catalog.find_many(Page::new(Some(2), Some(4)).unwrap()).await.unwrap();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].title, "E");
    }

    #[tokio::test]
    async fn remove_then_lookup_is_not_found() {
        let (_, catalog, owner) = setup().await;
        let created = catalog.create(hat("Blue Hat", &["a.png"]), &owner).await.unwrap();

        catalog.remove(&created.id.to_string()).await.unwrap();
        assert!(matches!(
            catalog.find_one(&created.id.to_string()).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            catalog.remove(&created.id.to_string()).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    /// Wraps a real store; its transactions fail at `save`, after images were replaced
    struct FailingSave {
        inner: MemoryStore,
    }

    struct FailingSaveTx {
        inner: Box<dyn ProductTransaction>,
    }

    #[async_trait]
    impl ProductRepository for FailingSave {
        async fn insert(&self, product: &Product) -> Result<(), DatabaseError> {
            ProductRepository::insert(&self.inner, product).await
        }

        async fn find_page(&self, page: Page) -> Result<Vec<Product>, DatabaseError> {
            self.inner.find_page(page).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DatabaseError> {
            ProductRepository::find_by_id(&self.inner, id).await
        }

        async fn find_by_title_or_slug(
            &self,
            title: &str,
            slug: &str,
        ) -> Result<Option<Product>, DatabaseError> {
            self.inner.find_by_title_or_slug(title, slug).await
        }

        async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
            self.inner.delete(id).await
        }

        async fn delete_all(&self) -> Result<u64, DatabaseError> {
            ProductRepository::delete_all(&self.inner).await
        }

        async fn begin(&self, id: Uuid) -> Result<Box<dyn ProductTransaction>, DatabaseError> {
            Ok(Box::new(FailingSaveTx {
                inner: self.inner.begin(id).await?,
            }))
        }
    }

    #[async_trait]
    impl ProductTransaction for FailingSaveTx {
        fn product(&self) -> &Product {
            self.inner.product()
        }

        async fn delete_images(&mut self) -> Result<u64, DatabaseError> {
            self.inner.delete_images().await
        }

        async fn insert_images(&mut self, images: &[ProductImage]) -> Result<(), DatabaseError> {
            self.inner.insert_images(images).await
        }

        async fn save(&mut self, _product: &Product) -> Result<(), DatabaseError> {
            Err(DatabaseError::QueryError("connection reset by peer".to_string()))
        }

        async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
            self.inner.commit().await
        }

        async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
            self.inner.rollback().await
        }
    }

    #[tokio::test]
    async fn failed_update_leaves_product_byte_identical() {
        let (store, catalog, owner) = setup().await;
        let created = catalog.create(hat("Blue Hat", &["a.png", "b.png"]), &owner).await.unwrap();

        let before = ProductRepository::find_by_id(&store, created.id).await.unwrap().unwrap();
        let before = serde_json::to_vec(&before).unwrap();

        let faulty = CatalogService::new(Arc::new(FailingSave { inner: store.clone() }));
        let changes = ProductChanges {
            title: Some("Renamed Hat".to_string()),
            images: Some(vec!["c.png".to_string()]),
            ..Default::default()
        };
        let err = faulty.update(created.id, changes, &owner).await.unwrap_err();
        assert_eq!(err, CatalogError::Internal);

        let after = ProductRepository::find_by_id(&store, created.id).await.unwrap().unwrap();
        assert_eq!(serde_json::to_vec(&after).unwrap(), before);

        // the row lock was released
        let tx = store.begin(created.id).await.unwrap();
        tx.rollback().await.unwrap();
    }
}
