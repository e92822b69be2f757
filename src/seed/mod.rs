use futures::future::try_join_all;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::models::User;
use crate::auth::password::hash_password;
use crate::auth::AuthError;
use crate::catalog::{CatalogError, CatalogService};
use crate::database::{DatabaseError, UserRepository};

pub mod data;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub users: usize,
    pub products: usize,
}

/// Wipe the catalog and accounts, then load the fixture users and products
pub async fn run_seed(
    users: &dyn UserRepository,
    catalog: &CatalogService,
    bcrypt_cost: u32,
) -> Result<SeedReport, SeedError> {
    let removed_products = catalog.remove_all().await?;
    let removed_users = users.delete_all().await?;
    tracing::info!(
        "Seed cleared {} products and {} users",
        removed_products,
        removed_users
    );

    let mut inserted = Vec::with_capacity(data::USERS.len());
    for seed in data::USERS {
        let user = User {
            id: Uuid::new_v4(),
            email: seed.email.to_string(),
            password: hash_password(seed.password.to_string(), bcrypt_cost).await?,
            full_name: seed.full_name.to_string(),
            is_active: true,
            roles: seed.roles.to_vec(),
        };
        users.insert(&user).await?;
        inserted.push(user);
    }

    let Some(owner) = inserted.first() else {
        return Ok(SeedReport {
            users: 0,
            products: 0,
        });
    };

    let created = try_join_all(
        data::PRODUCTS
            .iter()
            .map(|product| catalog.create(product.to_new_product(), owner)),
    )
    .await?;

    tracing::info!("Seed inserted {} users and {} products", inserted.len(), created.len());
    Ok(SeedReport {
        users: inserted.len(),
        products: created.len(),
    })
}
