use super::settings_model::{
    NavSettings, CURRENCY_CODE_KEY, EXPENSE_SPIKE_THRESHOLD_KEY, TIMEZONE_KEY,
};
use super::SettingsRepositoryTrait;
use crate::errors::{DatabaseError, Error, Result, ValidationError};
use async_trait::async_trait;
use chrono_tz::Tz;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    fn get_nav_settings(&self) -> Result<NavSettings>;

    async fn update_nav_settings(&self, settings: &NavSettings) -> Result<()>;

    /// Get a single setting value by key. Returns None if not found.
    fn get_setting_value(&self, key: &str) -> Result<Option<String>>;
}

pub struct SettingsService {
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
}

impl SettingsService {
    pub fn new(settings_repository: Arc<dyn SettingsRepositoryTrait>) -> Self {
        SettingsService {
            settings_repository,
        }
    }

    fn parse_threshold(value: &str) -> Result<Decimal> {
        let threshold: Decimal = value.trim().parse().map_err(|_| {
            ValidationError::InvalidInput(format!(
                "Setting '{}' is not a number: {}",
                EXPENSE_SPIKE_THRESHOLD_KEY, value
            ))
        })?;
        if threshold < Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "Setting '{}' cannot be negative",
                EXPENSE_SPIKE_THRESHOLD_KEY
            ))
            .into());
        }
        Ok(threshold)
    }

    fn validate(settings: &NavSettings) -> Result<()> {
        if settings.currency_code.trim().is_empty() {
            return Err(ValidationError::MissingField(CURRENCY_CODE_KEY.to_string()).into());
        }
        if settings.expense_spike_threshold_pct < Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "Setting '{}' cannot be negative",
                EXPENSE_SPIKE_THRESHOLD_KEY
            ))
            .into());
        }
        if settings.timezone.parse::<Tz>().is_err() {
            return Err(ValidationError::InvalidInput(format!(
                "Unknown timezone: {}",
                settings.timezone
            ))
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    fn get_nav_settings(&self) -> Result<NavSettings> {
        let defaults = NavSettings::default();

        let currency_code = self
            .get_setting_value(CURRENCY_CODE_KEY)?
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty())
            .unwrap_or(defaults.currency_code);

        let expense_spike_threshold_pct = match self.get_setting_value(EXPENSE_SPIKE_THRESHOLD_KEY)? {
            Some(value) => Self::parse_threshold(&value)?,
            None => defaults.expense_spike_threshold_pct,
        };

        let timezone = match self.get_setting_value(TIMEZONE_KEY)? {
            Some(value) => {
                if value.parse::<Tz>().is_err() {
                    return Err(
                        ValidationError::InvalidInput(format!("Unknown timezone: {}", value)).into(),
                    );
                }
                value
            }
            None => defaults.timezone,
        };

        Ok(NavSettings {
            currency_code,
            expense_spike_threshold_pct,
            timezone,
        })
    }

    async fn update_nav_settings(&self, settings: &NavSettings) -> Result<()> {
        Self::validate(settings)?;
        debug!("Updating NAV settings: {:?}", settings);

        self.settings_repository
            .update_setting(CURRENCY_CODE_KEY, settings.currency_code.trim())
            .await?;
        self.settings_repository
            .update_setting(
                EXPENSE_SPIKE_THRESHOLD_KEY,
                &settings.expense_spike_threshold_pct.to_string(),
            )
            .await?;
        self.settings_repository
            .update_setting(TIMEZONE_KEY, &settings.timezone)
            .await?;
        Ok(())
    }

    fn get_setting_value(&self, key: &str) -> Result<Option<String>> {
        match self.settings_repository.get_setting(key) {
            Ok(value) => Ok(Some(value)),
            Err(Error::Database(DatabaseError::NotFound(_))) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
