//! # Config Commands
//!
//! Read-only view of the loaded configuration.

use tracing::debug;

use crate::state::{AppConfig, AppState};

/// Gets the current application configuration.
///
/// ## When Used
/// - App startup, before login (window title, database location)
/// - Dashboard labels ("Low stock (< 50)", "last 30 days")
pub fn get_config(state: &AppState) -> AppConfig {
    debug!("get_config command");
    state.config().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::test_config;

    #[test]
    fn test_get_config_returns_loaded_values() {
        let mut config = test_config();
        config.inventory.recent_window_days = 7;
        let state = AppState::in_memory(config.clone()).unwrap();

        assert_eq!(get_config(&state), config);
    }
}
