// handlers/public/products/mod.rs - Catalog reads
pub mod list; // GET /products?limit&offset
pub mod show; // GET /products/:term

pub use list::list_get;
pub use show::show_get;
