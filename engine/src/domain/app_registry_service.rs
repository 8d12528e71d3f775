//! Registry of per-application configuration.
//!
//! Pure lookup/config store: category, per-minute rate, daily ceiling and
//! enabled flag per app. The only behavior beyond storage is validation of
//! the rate-sign convention.

use log::{info, warn};
use std::sync::Arc;

use crate::domain::errors::EconomyError;
use crate::domain::models::app_config::AppConfig;
use crate::storage::{AppConfigStorage, Connection};

#[derive(Clone)]
pub struct AppRegistryService<C: Connection> {
    app_config_repository: C::AppConfigRepository,
}

impl<C: Connection> AppRegistryService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            app_config_repository: connection.create_app_config_repository(),
        }
    }

    /// Create or replace an app configuration after validating the
    /// category/rate convention.
    pub fn upsert_config(&self, config: AppConfig) -> Result<AppConfig, EconomyError> {
        if let Err(error) = config.validate() {
            warn!("Rejected config for {}: {}", config.app_id, error);
            return Err(EconomyError::AppNotConfigured {
                app_id: config.app_id.clone(),
                reason: error.to_string(),
            });
        }

        self.app_config_repository.store_app_config(&config)?;
        info!(
            "Stored config for {} ({}, rate {}, limit {})",
            config.app_id,
            config.category.as_str(),
            config.coinz_rate,
            config.daily_time_limit
        );
        Ok(config)
    }

    /// Raw lookup; `None` when the app has never been configured.
    pub fn get_config(&self, app_id: &str) -> Result<Option<AppConfig>, EconomyError> {
        Ok(self.app_config_repository.get_app_config(app_id)?)
    }

    /// Resolve the configuration for an engine operation.
    ///
    /// Missing, disabled, or rate/category-mismatched configs all fail with
    /// `AppNotConfigured`, so callers get one error to present.
    pub fn resolve_enabled(&self, app_id: &str) -> Result<AppConfig, EconomyError> {
        let config = match self.app_config_repository.get_app_config(app_id)? {
            Some(config) => config,
            None => {
                return Err(EconomyError::AppNotConfigured {
                    app_id: app_id.to_string(),
                    reason: "no configuration exists".to_string(),
                });
            }
        };

        if !config.is_enabled {
            return Err(EconomyError::AppNotConfigured {
                app_id: app_id.to_string(),
                reason: "app is disabled".to_string(),
            });
        }
        if let Err(error) = config.validate() {
            return Err(EconomyError::AppNotConfigured {
                app_id: app_id.to_string(),
                reason: error.to_string(),
            });
        }

        Ok(config)
    }

    pub fn list_configs(&self) -> Result<Vec<AppConfig>, EconomyError> {
        Ok(self.app_config_repository.list_app_configs()?)
    }

    pub fn remove_config(&self, app_id: &str) -> Result<bool, EconomyError> {
        Ok(self.app_config_repository.delete_app_config(app_id)?)
    }

    /// Provisioning step: insert the given defaults for apps that have no
    /// configuration yet. Existing (parent-edited) configs are left alone.
    /// Returns how many defaults were inserted.
    pub fn seed_defaults(&self, defaults: &[AppConfig]) -> Result<u32, EconomyError> {
        let mut inserted = 0;
        for config in defaults {
            if self.app_config_repository.get_app_config(&config.app_id)?.is_some() {
                continue;
            }
            self.upsert_config(config.clone())?;
            inserted += 1;
        }
        if inserted > 0 {
            info!("Seeded {} default app configs", inserted);
        }
        Ok(inserted)
    }
}
