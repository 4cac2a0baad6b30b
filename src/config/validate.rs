// src/config/validate.rs

use crate::config::model::{Config, RawConfig};
use crate::errors::{NowcastError, Result};

impl TryFrom<RawConfig> for Config {
    type Error = NowcastError;

    fn try_from(raw: RawConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(Config::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfig) -> Result<()> {
    ensure_has_hosts(cfg)?;
    validate_host_run_types(cfg)?;
    validate_named_hosts(cfg)?;
    validate_wave_run_when(cfg)?;
    Ok(())
}

fn config_error(msg: String) -> NowcastError {
    NowcastError::ConfigError(msg)
}

fn ensure_has_hosts(cfg: &RawConfig) -> Result<()> {
    if cfg.run.enabled_hosts.is_empty() {
        return Err(config_error(
            "config must contain at least one [run.enabled_hosts.<host>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_host_run_types(cfg: &RawConfig) -> Result<()> {
    for (host, host_cfg) in cfg.run.enabled_hosts.iter() {
        for run_type in host_cfg.run_types.iter() {
            if !cfg.run_types.contains_key(run_type) {
                return Err(config_error(format!(
                    "host '{}' enables unknown run type '{}' (missing [run_types.{}])",
                    host, run_type, run_type
                )));
            }
        }
    }
    Ok(())
}

fn validate_named_hosts(cfg: &RawConfig) -> Result<()> {
    let named = [
        ("run.cloud_host", cfg.run.cloud_host.as_deref()),
        (
            "wave_forecasts.host",
            cfg.wave_forecasts.as_ref().map(|w| w.host.as_str()),
        ),
        (
            "vhfr_fvcom_runs.host",
            cfg.vhfr_fvcom_runs.as_ref().map(|f| f.host.as_str()),
        ),
    ];

    for (key, host) in named {
        if let Some(host) = host {
            if !cfg.run.enabled_hosts.contains_key(host) {
                return Err(config_error(format!(
                    "{} refers to '{}', which is not in run.enabled_hosts",
                    key, host
                )));
            }
        }
    }
    Ok(())
}

fn validate_wave_run_when(cfg: &RawConfig) -> Result<()> {
    let Some(waves) = cfg.wave_forecasts.as_ref() else {
        return Ok(());
    };

    match waves.run_when.strip_prefix("after ") {
        Some(run_type) if cfg.run_types.contains_key(run_type) => Ok(()),
        _ => Err(config_error(format!(
            "wave_forecasts.run_when must be \"after <run type>\" naming a declared run type (got \"{}\")",
            waves.run_when
        ))),
    }
}
