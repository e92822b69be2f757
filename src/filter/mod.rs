pub mod error;
pub mod pagination;

pub use error::FilterError;
pub use pagination::{Page, PageQuery};
