/*
 *
 *  *
 *  *      Copyright (c) 2018-2025, SnackCloud All rights reserved.
 *  *
 *  *   Redistribution and use in source and binary forms, with or without
 *  *   modification, are permitted provided that the following conditions are met:
 *  *
 *  *   Redistributions of source code must retain the above copyright notice,
 *  *   this list of conditions and the following disclaimer.
 *  *   Redistributions in binary form must reproduce the above copyright
 *  *   notice, this list of conditions and the following disclaimer in the
 *  *   documentation and/or other materials provided with the distribution.
 *  *   Neither the name of the www.snackcloud.cn developer nor the names of its
 *  *   contributors may be used to endorse or promote products derived from
 *  *   this software without specific prior written permission.
 *  *   Author: SnackCloud
 *  *
 *
 */
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{DistLockError, DistLockResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConnectionMode {
    SingleServer {
        url: String,
        host: Option<String>,
        port: Option<u16>,
    },
    Sentinel {
        master_name: String,
        sentinel_addresses: Vec<String>,
    },
    Cluster {
        node_addresses: Vec<String>,
    },
}

/// Cap on acquisition retries.
///
/// Serialized with the integer convention: `-1` (or any negative number)
/// means unlimited, `n >= 0` allows `n` retries after the first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum MaxRetries {
    Unlimited,
    Limited(u32),
}

impl MaxRetries {
    /// Whether another attempt may follow the failed attempt number `attempt` (1-based).
    pub fn allows_retry(&self, attempt: u32) -> bool {
        match self {
            MaxRetries::Unlimited => true,
            MaxRetries::Limited(max) => attempt <= *max,
        }
    }
}

impl Default for MaxRetries {
    fn default() -> Self {
        MaxRetries::Unlimited
    }
}

impl From<i64> for MaxRetries {
    fn from(value: i64) -> Self {
        if value < 0 {
            MaxRetries::Unlimited
        } else {
            MaxRetries::Limited(value.min(u32::MAX as i64) as u32)
        }
    }
}

impl From<i32> for MaxRetries {
    fn from(value: i32) -> Self {
        MaxRetries::from(value as i64)
    }
}

impl From<MaxRetries> for i64 {
    fn from(value: MaxRetries) -> Self {
        match value {
            MaxRetries::Unlimited => -1,
            MaxRetries::Limited(max) => max as i64,
        }
    }
}

/// Options shared by every lock a manager hands out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockOptions {
    /// Time after which an acquired lock expires on its own
    pub ttl: Duration,
    /// Delay between acquisition attempts
    pub retry_delay: Duration,
    pub max_retries: MaxRetries,
    /// Prepended to resource names to form the store key
    pub key_prefix: String,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::from_millis(30_000),
            retry_delay: Duration::from_millis(50),
            max_retries: MaxRetries::Unlimited,
            key_prefix: "lock:".to_string(),
        }
    }
}

impl LockOptions {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_max_retries(mut self, max_retries: impl Into<MaxRetries>) -> Self {
        self.max_retries = max_retries.into();
        self
    }

    pub fn with_key_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    pub fn key(&self, resource_name: &str) -> String {
        format!("{}{}", self.key_prefix, resource_name)
    }

    pub fn validate(&self) -> DistLockResult<()> {
        if self.ttl.is_zero() {
            return Err(DistLockError::ConfigError("Lock ttl must be greater than zero".to_string()));
        }
        if self.key_prefix.is_empty() {
            return Err(DistLockError::ConfigError("Key prefix cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistLockConfig {
    /// Connection mode
    pub connection_mode: ConnectionMode,
    /// Connection pool size
    pub pool_size: u32,
    pub connection_timeout: Duration,
    pub response_timeout: Duration,
    /// Connection maximum lifetime
    pub max_lifetime: Duration,
    /// Connection idle time out
    pub idle_timeout: Duration,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Database number; `None` keeps the db from the URL
    pub database: Option<i64>,
    /// SSL enabled or not
    pub ssl: bool,
    pub lock: LockOptions,
}

impl Default for DistLockConfig {
    fn default() -> Self {
        Self {
            connection_mode: ConnectionMode::SingleServer { url: "".to_string(), host: Some("localhost".to_string()), port: Some(6379) },
            pool_size: 10,
            connection_timeout: Duration::from_secs(3),
            response_timeout: Duration::from_secs(3),
            max_lifetime: Duration::from_secs(300),
            idle_timeout: Duration::from_secs(60),
            username: None,
            password: None,
            database: None,
            ssl: false,
            lock: LockOptions::default(),
        }
    }
}

impl DistLockConfig {
    pub fn single_server(address: &str) -> Self {
        Self {
            connection_mode: ConnectionMode::SingleServer { url: address.to_string(), host: None, port: None },
            ..Default::default()
        }
    }

    pub fn sentinel(master_name: &str, sentinel_addresses: Vec<String>) -> Self {
        Self {
            connection_mode: ConnectionMode::Sentinel {
                master_name: master_name.to_string(),
                sentinel_addresses,
            },
            ..Default::default()
        }
    }

    pub fn cluster(node_addresses: Vec<String>) -> Self {
        Self {
            connection_mode: ConnectionMode::Cluster { node_addresses },
            ..Default::default()
        }
    }

    /// Parse a configuration document; missing fields fall back to defaults.
    pub fn from_json(json: &str) -> DistLockResult<Self> {
        let config: DistLockConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_pool_size(mut self, size: u32) -> Self {
        self.pool_size = size;
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn with_max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn with_database(mut self, db: i64) -> Self {
        self.database = Some(db);
        self
    }

    pub fn with_ssl(mut self, ssl: bool) -> Self {
        self.ssl = ssl;
        self
    }

    pub fn with_lock_options(mut self, options: LockOptions) -> Self {
        self.lock = options;
        self
    }

    pub fn validate(&self) -> DistLockResult<()> {
        if self.pool_size == 0 {
            return Err(DistLockError::ConfigError("Pool size cannot be zero".to_string()));
        }

        match &self.connection_mode {
            ConnectionMode::SingleServer { url, host, port } => {
                if url.is_empty() && (host.is_none() || port.is_none()) {
                    return Err(DistLockError::ConfigError(
                        "Single server mode requires either URL or host/port".to_string()
                    ));
                }
            }
            ConnectionMode::Cluster { node_addresses } => {
                if node_addresses.is_empty() {
                    return Err(DistLockError::ConfigError(
                        "Cluster mode requires at least one node address".to_string()
                    ));
                }
            }
            ConnectionMode::Sentinel { master_name, sentinel_addresses } => {
                if master_name.is_empty() {
                    return Err(DistLockError::ConfigError(
                        "Sentinel mode requires master name".to_string()
                    ));
                }
                if sentinel_addresses.is_empty() {
                    return Err(DistLockError::ConfigError(
                        "Sentinel mode requires at least one sentinel address".to_string()
                    ));
                }
            }
        }

        self.lock.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_option_defaults() {
        let options = LockOptions::default();
        assert_eq!(options.ttl, Duration::from_millis(30_000));
        assert_eq!(options.retry_delay, Duration::from_millis(50));
        assert_eq!(options.max_retries, MaxRetries::Unlimited);
        assert_eq!(options.key("orders"), "lock:orders");
    }

    #[test]
    fn test_max_retries_integer_convention() {
        assert_eq!(MaxRetries::from(-1), MaxRetries::Unlimited);
        assert_eq!(MaxRetries::from(-7), MaxRetries::Unlimited);
        assert_eq!(MaxRetries::from(3), MaxRetries::Limited(3));
        assert_eq!(i64::from(MaxRetries::Unlimited), -1);

        // max_retries = 3 permits retries after attempts 1..=3, so 4 attempts total
        let limited = MaxRetries::Limited(3);
        assert!(limited.allows_retry(3));
        assert!(!limited.allows_retry(4));
        assert!(!MaxRetries::Limited(0).allows_retry(1));
        assert!(MaxRetries::Unlimited.allows_retry(u32::MAX));
    }

    #[test]
    fn test_from_json_partial_document() {
        let config = DistLockConfig::from_json(r#"{
            "connection_mode": { "SingleServer": { "url": "redis://127.0.0.1:6379" } },
            "pool_size": 4,
            "lock": { "max_retries": 5, "key_prefix": "app:lock:" }
        }"#).unwrap();

        assert_eq!(config.pool_size, 4);
        assert_eq!(config.lock.max_retries, MaxRetries::Limited(5));
        assert_eq!(config.lock.key("a"), "app:lock:a");
        assert_eq!(config.lock.ttl, Duration::from_millis(30_000));
    }

    #[test]
    fn test_serialized_max_retries_is_integer() {
        let json = serde_json::to_value(LockOptions::default()).unwrap();
        assert_eq!(json["max_retries"], serde_json::json!(-1));
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        assert!(DistLockConfig::default().with_pool_size(0).validate().is_err());
        assert!(DistLockConfig::cluster(vec![]).validate().is_err());
        assert!(DistLockConfig::sentinel("", vec!["redis://s1".to_string()]).validate().is_err());

        let zero_ttl = DistLockConfig::single_server("redis://localhost:6379")
            .with_lock_options(LockOptions::default().with_ttl(Duration::ZERO));
        assert!(matches!(zero_ttl.validate(), Err(DistLockError::ConfigError(_))));

        assert!(DistLockConfig::single_server("redis://localhost:6379").validate().is_ok());
    }
}
