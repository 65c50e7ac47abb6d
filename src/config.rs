use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use crate::models::FillDefaults;
use crate::services::resolver::{ResolverConfig, ResolverMode, SelectorConfig};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub form_page_path: Option<PathBuf>,
    pub selectors_path: Option<PathBuf>,
    pub resolver_mode: ResolverMode,
    pub date_picker_settle_ms: u64,
    pub dropdown_settle_ms: u64,
    pub default_account_contact: String,
    pub default_account_email: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            form_page_path: env::var("FORM_PAGE_PATH").ok().map(PathBuf::from),
            selectors_path: env::var("SELECTORS_PATH").ok().map(PathBuf::from),
            resolver_mode: env::var("RESOLVER_MODE")
                .ok()
                .and_then(|v| match v.parse() {
                    Ok(mode) => Some(mode),
                    Err(e) => {
                        tracing::warn!("{e}, falling back to auto");
                        None
                    }
                })
                .unwrap_or_default(),
            date_picker_settle_ms: env::var("DATE_PICKER_SETTLE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(200),
            dropdown_settle_ms: env::var("DROPDOWN_SETTLE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            default_account_contact: env::var("DEFAULT_ACCOUNT_CONTACT")
                .unwrap_or_else(|_| "May".to_string()),
            default_account_email: env::var("DEFAULT_ACCOUNT_EMAIL").unwrap_or_default(),
        }
    }

    /// Resolver settings, reading the selector file if one is configured.
    pub fn resolver_config(&self) -> anyhow::Result<ResolverConfig> {
        let selectors = match &self.selectors_path {
            Some(path) => SelectorConfig::load(path)?,
            None => SelectorConfig::default(),
        };
        Ok(ResolverConfig {
            mode: self.resolver_mode,
            selectors,
            date_picker_settle: Duration::from_millis(self.date_picker_settle_ms),
            dropdown_settle: Duration::from_millis(self.dropdown_settle_ms),
            defaults: FillDefaults {
                account_contact: self.default_account_contact.clone(),
                account_email: self.default_account_email.clone(),
            },
        })
    }

    /// The booking page to load at startup, if one is configured.
    pub fn initial_page(&self) -> anyhow::Result<Option<String>> {
        self.form_page_path
            .as_ref()
            .map(|path| {
                std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read form page {}", path.display()))
            })
            .transpose()
    }
}
