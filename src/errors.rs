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

use redis::RedisError;
use thiserror::Error;

pub type DistLockResult<T> = std::result::Result<T, DistLockError>;

#[derive(Error, Debug)]
pub enum DistLockError {
    #[error("Redis error: {0}")]
    RedisError(#[from] RedisError),

    /// Bad argument shape, raised before the store is touched.
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Connection pool error: {0}")]
    PoolError(String),

    #[error("Async runtime error: {0}")]
    AsyncError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DistLockError {
    pub fn validation(message: impl Into<String>) -> Self {
        DistLockError::ValidationError(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DistLockError::ValidationError(_))
    }
}

impl From<r2d2::Error> for DistLockError {
    fn from(err: r2d2::Error) -> Self {
        DistLockError::PoolError(err.to_string())
    }
}

impl From<deadpool::managed::PoolError<RedisError>> for DistLockError {
    fn from(err: deadpool::managed::PoolError<RedisError>) -> Self {
        DistLockError::PoolError(err.to_string())
    }
}

impl From<deadpool::managed::BuildError> for DistLockError {
    fn from(err: deadpool::managed::BuildError) -> Self {
        DistLockError::PoolError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for DistLockError {
    fn from(err: tokio::task::JoinError) -> Self {
        DistLockError::AsyncError(err.to_string())
    }
}

impl From<serde_json::Error> for DistLockError {
    fn from(err: serde_json::Error) -> Self {
        DistLockError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_helper() {
        let err = DistLockError::validation("resource_name is required");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Validation error: resource_name is required");
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: DistLockError = parse.unwrap_err().into();
        assert!(matches!(err, DistLockError::SerializationError(_)));
        assert!(!err.is_validation());
    }
}
