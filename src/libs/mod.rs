pub mod blocking;
pub mod config;
pub mod error;
pub mod executor;
pub mod orm;
pub mod render;
pub mod result_code;
pub mod schema;
pub mod types;

// Re-export them for easier access from the crate root
pub use blocking::*;
pub use config::*;
pub use error::*;
pub use executor::*;
pub use orm::*;
pub use render::*;
pub use result_code::*;
pub use schema::*;
pub use types::*;
