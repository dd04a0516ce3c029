pub mod config;
pub mod context;
pub mod error;
pub mod traits;
pub mod types;

pub use config::AppConfig;
pub use context::{keys, Context, ContextValue};
pub use error::{CascadeError, Result};
pub use types::*;
