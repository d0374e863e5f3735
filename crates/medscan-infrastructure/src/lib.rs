pub mod config_service;
pub mod paths;
pub mod secret_service;
pub mod storage;
pub mod upload;

pub use crate::config_service::{ConfigService, RuntimeConfig};
pub use crate::paths::MedscanPaths;
pub use crate::secret_service::SecretService;
pub use crate::storage::FileKeyValueStore;
pub use crate::upload::upload_from_path;
