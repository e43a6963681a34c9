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
use std::time::Duration;
use rand::Rng;
use rand::distributions::Alphanumeric;
use uuid::Uuid;

use crate::errors::{DistLockError, DistLockResult};

/// Produces a fresh ownership token for every acquisition attempt.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// UUID v4 tokens, the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTokenGenerator;

impl TokenGenerator for UuidTokenGenerator {
    fn generate(&self) -> String {
        get_lock_id()
    }
}

/// Random alphanumeric tokens of a fixed length.
#[derive(Debug, Clone, Copy)]
pub struct RandomTokenGenerator {
    len: usize,
}

impl RandomTokenGenerator {
    pub fn new(len: usize) -> Self {
        Self { len: len.max(1) }
    }
}

impl Default for RandomTokenGenerator {
    fn default() -> Self {
        Self::new(32)
    }
}

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> String {
        get_random_string(self.len)
    }
}

pub fn get_random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn get_lock_id() -> String {
    Uuid::new_v4().to_string()
}

/// Whole milliseconds for PEXPIRE, rounding any sub-millisecond remainder up.
pub fn num_milliseconds(duration: &Duration) -> u64 {
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    if duration.subsec_nanos() % 1_000_000 != 0 {
        millis.saturating_add(1)
    } else {
        millis
    }
}

pub(crate) fn ensure_not_empty(field: &str, value: &str) -> DistLockResult<()> {
    if value.is_empty() {
        return Err(DistLockError::validation(format!("{} is required and must be a non-empty string", field)));
    }
    Ok(())
}

pub(crate) fn ensure_positive(field: &str, duration: &Duration) -> DistLockResult<()> {
    if duration.is_zero() {
        return Err(DistLockError::validation(format!("{} must be a positive duration", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tokens_are_unique() {
        let uuid = UuidTokenGenerator;
        let random = RandomTokenGenerator::new(24);

        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(uuid.generate()));
            assert!(seen.insert(random.generate()));
        }
    }

    #[test]
    fn test_random_token_shape() {
        let token = RandomTokenGenerator::new(16).generate();
        assert_eq!(token.len(), 16);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(RandomTokenGenerator::new(0).generate().len(), 1);
    }

    #[test]
    fn test_num_milliseconds_rounds_up() {
        assert_eq!(num_milliseconds(&Duration::from_millis(100)), 100);
        assert_eq!(num_milliseconds(&Duration::from_micros(1500)), 2);
        assert_eq!(num_milliseconds(&Duration::from_nanos(1)), 1);
        assert_eq!(num_milliseconds(&Duration::ZERO), 0);
    }

    #[test]
    fn test_num_milliseconds_saturates() {
        assert_eq!(num_milliseconds(&Duration::MAX), u64::MAX);
        let edge = Duration::from_millis(u64::MAX) + Duration::from_nanos(1);
        assert_eq!(num_milliseconds(&edge), u64::MAX);
    }

    #[test]
    fn test_validation_helpers() {
        assert!(ensure_not_empty("token", "abc").is_ok());
        assert!(ensure_not_empty("token", "").unwrap_err().is_validation());
        assert!(ensure_positive("duration", &Duration::from_millis(1)).is_ok());
        assert!(ensure_positive("duration", &Duration::ZERO).unwrap_err().is_validation());
    }
}
