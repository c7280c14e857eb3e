pub mod app_dirs;
pub mod config;
pub mod tracing;
pub mod wiring;

pub use app_dirs::default_storage_dir;
pub use config::{load_catalog, load_config};
pub use self::tracing::init_tracing_subscriber;
pub use wiring::{wire_runtime, TourRuntime};
