//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`StoragePort`] for the controller.
//!
//! - Config validation: every field is range-checked before persistence.
//! - The config blob is `postcard`-encoded under `genctl/ctlcfg`.
//! - Accrual counters share the `genctl` namespace (see
//!   [`COUNTER_NAMESPACE`](crate::app::ports::COUNTER_NAMESPACE)).
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//!
//! Off target the adapter keeps everything in a `HashMap`, which is what
//! the host tests and the simulator run against.

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::ControllerConfig;
use log::info;

#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "genctl";
const CONFIG_KEY: &str = "ctlcfg";

#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 1024;

/// Longest key NVS accepts (15 chars + NUL).
#[cfg(target_os = "espidf")]
const NVS_KEY_LEN: usize = 16;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the partition is erased
    /// and re-initialised; any other failure is `ConfigError::IoError`.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any other NVS use.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK || unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// NUL-terminated copy of a namespace or key, truncated to the NVS limit.
    #[cfg(target_os = "espidf")]
    fn c_name(name: &str) -> [u8; NVS_KEY_LEN] {
        let mut buf = [0u8; NVS_KEY_LEN];
        let bytes = name.as_bytes();
        let len = bytes.len().min(NVS_KEY_LEN - 1);
        buf[..len].copy_from_slice(&bytes[..len]);
        buf
    }

    /// Open an NVS namespace, run `f` with the handle, then close it.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns = Self::c_name(namespace);
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    /// `nvs_set_blob` + `nvs_commit` in one go.
    #[cfg(target_os = "espidf")]
    fn set_blob(namespace: &str, key: &str, data: &[u8]) -> Result<(), i32> {
        let key = Self::c_name(key);
        Self::with_nvs_handle(namespace, true, |handle| {
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    key.as_ptr() as *const _,
                    data.as_ptr() as *const _,
                    data.len(),
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        })
    }
}

/// Range checks applied before a config is persisted.
fn validate_config(cfg: &ControllerConfig) -> Result<(), ConfigError> {
    if !(100..=10_000).contains(&cfg.step_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "step_interval_ms must be 100-10000",
        ));
    }
    if !(10..=1_000).contains(&cfg.control_loop_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "control_loop_interval_ms must be 10-1000",
        ));
    }
    if cfg.control_loop_interval_ms > cfg.step_interval_ms {
        return Err(ConfigError::ValidationFailed(
            "control_loop_interval_ms must not exceed step_interval_ms",
        ));
    }
    if !(5..=3600).contains(&cfg.telemetry_interval_secs) {
        return Err(ConfigError::ValidationFailed(
            "telemetry_interval_secs must be 5-3600",
        ));
    }
    if !(1..=120).contains(&cfg.starter_timeout_secs) {
        return Err(ConfigError::ValidationFailed(
            "starter_timeout_secs must be 1-120",
        ));
    }
    if cfg.max_start_retries > 20 {
        return Err(ConfigError::ValidationFailed(
            "max_start_retries must be 0-20",
        ));
    }
    const DAY_SECS: u32 = 24 * 3600;
    if cfg.mains_return_cooldown_secs > DAY_SECS || cfg.mains_loss_confirm_secs > DAY_SECS {
        return Err(ConfigError::ValidationFailed(
            "failover delays must not exceed 24h",
        ));
    }
    if !(cfg.running_threshold.is_finite() && cfg.running_threshold > 0.0) {
        return Err(ConfigError::ValidationFailed(
            "running_threshold must be > 0",
        ));
    }
    if cfg.accrual_segment_secs == 0 {
        return Err(ConfigError::ValidationFailed(
            "accrual_segment_secs must be > 0",
        ));
    }
    if cfg.persist_interval_secs < cfg.accrual_segment_secs {
        return Err(ConfigError::ValidationFailed(
            "persist_interval_secs must be >= accrual_segment_secs",
        ));
    }
    if cfg.max_tank_secs == 0 {
        return Err(ConfigError::ValidationFailed("max_tank_secs must be > 0"));
    }
    if !(cfg.tank_capacity_liters.is_finite() && cfg.tank_capacity_liters > 0.0) {
        return Err(ConfigError::ValidationFailed(
            "tank_capacity_liters must be > 0",
        ));
    }
    if !(0.0..cfg.tank_capacity_liters).contains(&cfg.fuel_command_deadband) {
        return Err(ConfigError::ValidationFailed(
            "fuel_command_deadband must be within the tank capacity",
        ));
    }
    Ok(())
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<ControllerConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
            if let Some(bytes) = self.store.borrow().get(&key) {
                let cfg: ControllerConfig =
                    postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
                info!("NvsAdapter: loaded config from store");
                Ok(cfg)
            } else {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(ControllerConfig::default())
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(CONFIG_KEY);
            let result = Self::with_nvs_handle(CONFIG_NAMESPACE, false, |handle| {
                let mut size: usize = 0;
                let ret = unsafe {
                    nvs_get_blob(handle, key.as_ptr() as *const _, core::ptr::null_mut(), &mut size)
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                if size == 0 || size > MAX_BLOB_SIZE {
                    return Err(ESP_ERR_NVS_INVALID_LENGTH);
                }
                let mut buf = vec![0u8; size];
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(buf)
            });

            match result {
                Ok(bytes) => {
                    let cfg: ControllerConfig =
                        postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                    info!("NvsAdapter: loaded config from NVS ({} bytes)", bytes.len());
                    Ok(cfg)
                }
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => {
                    info!("NvsAdapter: no stored config, using defaults");
                    Ok(ControllerConfig::default())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS read error {}, using defaults", e);
                    Ok(ControllerConfig::default())
                }
            }
        }
    }

    fn save(&self, config: &ControllerConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;

        #[cfg(not(target_os = "espidf"))]
        {
            let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
            self.store.borrow_mut().insert(key, bytes);
            info!("NvsAdapter: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            match Self::set_blob(CONFIG_NAMESPACE, CONFIG_KEY, &bytes) {
                Ok(()) => {
                    info!("NvsAdapter: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.borrow().get(&composite) {
                Some(data) => {
                    let len = data.len().min(buf.len());
                    buf[..len].copy_from_slice(&data[..len]);
                    Ok(len)
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(key);
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let mut size = buf.len();
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(size)
            });
            match result {
                Ok(size) => Ok(size),
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Err(StorageError::NotFound),
                Err(e) if e == ESP_ERR_NVS_INVALID_LENGTH => Err(StorageError::Corrupted),
                Err(_) => Err(StorageError::IoError),
            }
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().insert(composite, data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            Self::set_blob(namespace, key, data).map_err(|e| {
                if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE {
                    StorageError::Full
                } else {
                    StorageError::IoError
                }
            })
        }
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().remove(&composite);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(key);
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let ret = unsafe { nvs_erase_key(handle, key.as_ptr() as *const _) };
                if ret != ESP_OK && ret != ESP_ERR_NVS_NOT_FOUND {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|_| StorageError::IoError)
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow().contains_key(&composite)
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(key);
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let ret = unsafe {
                    nvs_find_key(handle, key.as_ptr() as *const _, core::ptr::null_mut())
                };
                Ok(ret == ESP_OK)
            });
            result.unwrap_or(false)
        }
    }
}
