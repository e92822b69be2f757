use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::auth::models::{Role, User, UserSummary};
use crate::catalog::models::{Product, ProductImage};
use crate::catalog::slug::Slug;
use crate::database::manager::DatabaseError;
use crate::database::repository::{ProductRepository, ProductTransaction, UserRepository};
use crate::filter::Page;

const PRODUCT_COLUMNS: &str = r#"
    p.id, p.title, p.price, p.description, p.slug, p.stock, p.sizes, p.gender, p.tags,
    u.id AS user_id, u.email AS user_email, u.full_name AS user_full_name,
    u.is_active AS user_is_active, u.roles AS user_roles
"#;

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password: String,
    full_name: String,
    is_active: bool,
    roles: Vec<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password: row.password,
            full_name: row.full_name,
            is_active: row.is_active,
            roles: parse_roles(&row.roles),
        }
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    title: String,
    price: f64,
    description: Option<String>,
    slug: String,
    stock: i32,
    sizes: Vec<String>,
    gender: String,
    tags: Vec<String>,
    user_id: Uuid,
    user_email: String,
    user_full_name: String,
    user_is_active: bool,
    user_roles: Vec<String>,
}

impl ProductRow {
    fn into_product(self, images: Vec<ProductImage>) -> Product {
        Product {
            id: self.id,
            title: self.title,
            price: self.price,
            description: self.description,
            slug: Slug::normalize(&self.slug),
            stock: self.stock,
            sizes: self.sizes,
            gender: self.gender,
            tags: self.tags,
            images,
            user: UserSummary {
                id: self.user_id,
                email: self.user_email,
                full_name: self.user_full_name,
                is_active: self.user_is_active,
                roles: parse_roles(&self.user_roles),
            },
        }
    }
}

#[derive(Debug, FromRow)]
struct ImageRow {
    id: Uuid,
    url: String,
    product_id: Uuid,
    position: i32,
}

fn parse_roles(raw: &[String]) -> Vec<Role> {
    raw.iter()
        .filter_map(|r| match r.parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                tracing::warn!("Ignoring stored role: {}", e);
                None
            }
        })
        .collect()
}

fn role_tags(roles: &[Role]) -> Vec<String> {
    roles.iter().map(|r| r.as_str().to_string()).collect()
}

/// Postgres-backed repositories sharing one pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn load_images(
    conn: &mut PgConnection,
    product_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<ProductImage>>, DatabaseError> {
    let mut grouped: HashMap<Uuid, Vec<ProductImage>> = HashMap::new();
    if product_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = sqlx::query_as::<_, ImageRow>(
        "SELECT id, url, product_id, position FROM product_images
         WHERE product_id = ANY($1)
         ORDER BY product_id, position",
    )
    .bind(product_ids)
    .fetch_all(&mut *conn)
    .await?;

    for row in rows {
        grouped.entry(row.product_id).or_default().push(ProductImage {
            id: row.id,
            url: row.url,
            product_id: row.product_id,
            position: row.position,
        });
    }
    Ok(grouped)
}

async fn attach_images(
    conn: &mut PgConnection,
    rows: Vec<ProductRow>,
) -> Result<Vec<Product>, DatabaseError> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut images = load_images(conn, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let owned = images.remove(&row.id).unwrap_or_default();
            row.into_product(owned)
        })
        .collect())
}

async fn insert_image_rows(
    conn: &mut PgConnection,
    images: &[ProductImage],
) -> Result<(), DatabaseError> {
    for image in images {
        sqlx::query(
            "INSERT INTO product_images (id, url, product_id, position) VALUES ($1, $2, $3, $4)",
        )
        .bind(image.id)
        .bind(&image.url)
        .bind(image.product_id)
        .bind(image.position)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert(&self, user: &User) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO users (id, email, password, full_name, is_active, roles)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.full_name)
        .bind(user.is_active)
        .bind(role_tags(&user.roles))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password, full_name, is_active, roles FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password, full_name, is_active, roles FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn delete_all(&self) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn insert(&self, product: &Product) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO products (id, title, price, description, slug, stock, sizes, gender, tags, user_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(product.id)
        .bind(&product.title)
        .bind(product.price)
        .bind(&product.description)
        .bind(product.slug.as_str())
        .bind(product.stock)
        .bind(&product.sizes)
        .bind(&product.gender)
        .bind(&product.tags)
        .bind(product.user.id)
        .execute(&mut *tx)
        .await?;

        insert_image_rows(&mut tx, &product.images).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_page(&self, page: Page) -> Result<Vec<Product>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!(
            "SELECT {} FROM products p JOIN users u ON u.id = p.user_id
             ORDER BY p.title ASC LIMIT $1 OFFSET $2",
            PRODUCT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(page.limit as i64)
            .bind(page.offset as i64)
            .fetch_all(&mut *conn)
            .await?;
        attach_images(&mut conn, rows).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!(
            "SELECT {} FROM products p JOIN users u ON u.id = p.user_id WHERE p.id = $1",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        match row {
            Some(row) => Ok(attach_images(&mut conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_title_or_slug(
        &self,
        title: &str,
        slug: &str,
    ) -> Result<Option<Product>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!(
            "SELECT {} FROM products p JOIN users u ON u.id = p.user_id
             WHERE UPPER(p.title) = $1 OR p.slug = $2
             ORDER BY p.title ASC LIMIT 1",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(title)
            .bind(slug)
            .fetch_optional(&mut *conn)
            .await?;
        match row {
            Some(row) => Ok(attach_images(&mut conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM product_images WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Product with id {} not found", id)));
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM product_images").execute(&mut *tx).await?;
        let result = sqlx::query("DELETE FROM products").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn begin(&self, id: Uuid) -> Result<Box<dyn ProductTransaction>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {} FROM products p JOIN users u ON u.id = p.user_id
             WHERE p.id = $1 FOR UPDATE OF p",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Product with id {} not found", id)))?;

        let product = attach_images(&mut tx, vec![row])
            .await?
            .pop()
            .ok_or_else(|| DatabaseError::NotFound(format!("Product with id {} not found", id)))?;

        Ok(Box::new(PgProductTransaction { tx, product }))
    }
}

/// Wraps a sqlx transaction; sqlx rolls back on drop when not committed
pub struct PgProductTransaction {
    tx: Transaction<'static, Postgres>,
    product: Product,
}

#[async_trait]
impl ProductTransaction for PgProductTransaction {
    fn product(&self) -> &Product {
        &self.product
    }

    async fn delete_images(&mut self) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM product_images WHERE product_id = $1")
            .bind(self.product.id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_images(&mut self, images: &[ProductImage]) -> Result<(), DatabaseError> {
        insert_image_rows(&mut self.tx, images).await
    }

    async fn save(&mut self, product: &Product) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE products SET
                title = $2, price = $3, description = $4, slug = $5, stock = $6,
                sizes = $7, gender = $8, tags = $9, user_id = $10
             WHERE id = $1",
        )
        .bind(product.id)
        .bind(&product.title)
        .bind(product.price)
        .bind(&product.description)
        .bind(product.slug.as_str())
        .bind(product.stock)
        .bind(&product.sizes)
        .bind(&product.gender)
        .bind(&product.tags)
        .bind(product.user.id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
