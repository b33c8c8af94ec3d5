//! Client settings loading.

mod loader;

pub use loader::{
    APP_DIR, CONFIG_FILE_NAME, ENV_PREFIX, SESSION_FILE_NAME, SettingsError, SettingsLoader,
};
