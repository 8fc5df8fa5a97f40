pub mod environment;
pub mod error;
pub mod extractors;

pub use environment::{DatabaseConfig, Environment};
pub use error::AppError;
pub use extractors::ValidatedJson;
