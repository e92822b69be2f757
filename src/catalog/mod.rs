pub mod error;
pub mod models;
pub mod service;
pub mod slug;

pub use error::CatalogError;
pub use models::{NewProduct, Product, ProductChanges, ProductImage, ProductView};
pub use service::{CatalogService, LookupTerm};
pub use slug::Slug;
