pub mod error;
pub mod types;
pub mod value;

pub use error::{BenchError, Result};
pub use types::{Client, ClientStatus, Order, PRODUCT_CATEGORIES, Product, Row};
pub use value::{SqlParam, Value};
