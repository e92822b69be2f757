use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::CatalogError;
use super::slug::Slug;
use crate::auth::models::UserSummary;

pub const GENDERS: [&str; 4] = ["men", "women", "kid", "unisex"];

/// Product aggregate: the product row, its owner and its ordered images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub description: Option<String>,
    pub slug: Slug,
    pub stock: i32,
    pub sizes: Vec<String>,
    pub gender: String,
    pub tags: Vec<String>,
    pub images: Vec<ProductImage>,
    pub user: UserSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: Uuid,
    pub url: String,
    pub product_id: Uuid,
    pub position: i32,
}

impl ProductImage {
    /// Build the ordered image set for a product from plain URLs
    pub fn for_product(product_id: Uuid, urls: &[String]) -> Vec<ProductImage> {
        urls.iter()
            .enumerate()
            .map(|(position, url)| ProductImage {
                id: Uuid::new_v4(),
                url: url.clone(),
                product_id,
                position: position as i32,
            })
            .collect()
    }
}

/// Create payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: String,
    #[serde(default)]
    pub price: f64,
    pub description: Option<String>,
    pub slug: Option<String>,
    #[serde(default)]
    pub stock: i32,
    pub sizes: Vec<String>,
    pub gender: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::InvalidInput("title should not be empty".to_string()));
        }
        check_price(self.price)?;
        check_stock(self.stock)?;
        check_gender(&self.gender)
    }
}

fn check_price(price: f64) -> Result<(), CatalogError> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(CatalogError::InvalidInput("price must not be less than 0".to_string()))
    }
}

fn check_stock(stock: i32) -> Result<(), CatalogError> {
    if stock >= 0 {
        Ok(())
    } else {
        Err(CatalogError::InvalidInput("stock must not be less than 0".to_string()))
    }
}

fn check_gender(gender: &str) -> Result<(), CatalogError> {
    if GENDERS.contains(&gender) {
        Ok(())
    } else {
        Err(CatalogError::InvalidInput(format!(
            "gender must be one of the following values: {}",
            GENDERS.join(", ")
        )))
    }
}

/// Partial update payload; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub stock: Option<i32>,
    pub sizes: Option<Vec<String>>,
    pub gender: Option<String>,
    pub tags: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

impl ProductChanges {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Err(CatalogError::InvalidInput("title should not be empty".to_string()));
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        if let Some(stock) = self.stock {
            check_stock(stock)?;
        }
        if let Some(gender) = &self.gender {
            check_gender(gender)?;
        }
        Ok(())
    }

    /// Merge scalar fields onto `product`. Images are replaced by the transaction, not here.
    pub fn merge_into(&self, product: &mut Product) {
        if let Some(title) = &self.title {
            product.title = title.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = &self.description {
            product.description = Some(description.clone());
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(sizes) = &self.sizes {
            product.sizes = sizes.clone();
        }
        if let Some(gender) = &self.gender {
            product.gender = gender.clone();
        }
        if let Some(tags) = &self.tags {
            product.tags = tags.clone();
        }

        // Title edits keep the existing slug; only an explicit slug replaces it
        let source = self.slug.as_deref().unwrap_or(product.slug.as_str()).to_string();
        product.slug = Slug::normalize(&source);
    }
}

/// Product as returned to callers, with images flattened to their URLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub description: Option<String>,
    pub slug: String,
    pub stock: i32,
    pub sizes: Vec<String>,
    pub gender: String,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    pub user: UserSummary,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let mut images = product.images;
        images.sort_by_key(|image| image.position);

        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            description: product.description,
            slug: product.slug.into(),
            stock: product.stock,
            sizes: product.sizes,
            gender: product.gender,
            tags: product.tags,
            images: images.into_iter().map(|image| image.url).collect(),
            user: product.user,
        }
    }
}
