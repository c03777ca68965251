use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;
use crate::notifications::NotificationTimings;
use crate::payment::{ButtonLabels, SimulatedOutcome};
use crate::utils::app_data_dir;
use crate::wizard::{BillingPeriod, ProgressFillMap};

const CONFIG_FILE: &str = "config.json";
const CONFIG_PATH_ENV: &str = "CREATORHUB_CONFIG";
const TMP_SUFFIX: &str = "tmp";

/// Keys accepted by [`Config::set_value`].
pub const SETTABLE_KEYS: [&str; 4] = ["creator", "default_period", "payment_delay_ms", "outcome"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub notification_enter_ms: u64,
    pub notification_display_ms: u64,
    pub notification_exit_ms: u64,
    pub payment_delay_ms: u64,
    pub step_animation_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            notification_enter_ms: 100,
            notification_display_ms: 3000,
            notification_exit_ms: 300,
            payment_delay_ms: 2000,
            step_animation_ms: 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub complete_payment: String,
    pub processing: String,
}

impl Default for Labels {
    fn default() -> Self {
        let defaults = ButtonLabels::default();
        Self {
            complete_payment: defaults.idle,
            processing: defaults.processing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub creator_name: String,
    pub default_period: BillingPeriod,
    pub timings: Timings,
    pub progress_fill: ProgressFillMap,
    pub labels: Labels,
    pub simulated_outcome: SimulatedOutcome,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            creator_name: "Sophia Chen".into(),
            default_period: BillingPeriod::default(),
            timings: Timings::default(),
            progress_fill: ProgressFillMap::default(),
            labels: Labels::default(),
            simulated_outcome: SimulatedOutcome::default(),
        }
    }
}

impl Config {
    pub fn notification_timings(&self) -> NotificationTimings {
        NotificationTimings {
            enter_delay: Duration::from_millis(self.timings.notification_enter_ms),
            display_for: Duration::from_millis(self.timings.notification_display_ms),
            exit_duration: Duration::from_millis(self.timings.notification_exit_ms),
        }
    }

    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.timings.payment_delay_ms)
    }

    pub fn button_labels(&self) -> ButtonLabels {
        ButtonLabels {
            idle: self.labels.complete_payment.clone(),
            processing: self.labels.processing.clone(),
        }
    }

    /// Updates one setting from its textual form. `outcome` takes `approve`,
    /// `decline <reason>` or `network <reason>`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "creator" => {
                if value.is_empty() {
                    return Err(invalid());
                }
                self.creator_name = value.to_string();
            }
            "default_period" => {
                self.default_period = value.parse().map_err(|_| invalid())?;
            }
            "payment_delay_ms" => {
                self.timings.payment_delay_ms = value.parse().map_err(|_| invalid())?;
            }
            "outcome" => {
                let (kind, reason) = value
                    .split_once(char::is_whitespace)
                    .map(|(kind, reason)| (kind, reason.trim()))
                    .unwrap_or((value, ""));
                self.simulated_outcome = match (kind.to_ascii_lowercase().as_str(), reason) {
                    ("approve", "") => SimulatedOutcome::Approve,
                    ("decline", reason) if !reason.is_empty() => SimulatedOutcome::Decline {
                        reason: reason.to_string(),
                    },
                    ("network", reason) if !reason.is_empty() => {
                        SimulatedOutcome::NetworkFailure {
                            reason: reason.to_string(),
                        }
                    }
                    _ => return Err(invalid()),
                };
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        debug!(key, value, "configuration value updated");
        Ok(())
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// `$CREATORHUB_CONFIG` when set, otherwise `config.json` in the app data dir.
    pub fn new() -> Result<Self, ConfigError> {
        if let Some(custom) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(Self {
                path: PathBuf::from(custom),
            });
        }
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            let config = serde_json::from_str(&data)?;
            debug!(path = %self.path.display(), "configuration loaded");
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
