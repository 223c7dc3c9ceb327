mod load;
mod schema;

pub use load::{load_config, store_api_key, store_config, CliOverrides};
pub use schema::{AppConfig, ImageFormat};
