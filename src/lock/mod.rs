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
mod blocking;
mod non_blocking;

pub use blocking::*;
pub use non_blocking::*;

use std::time::Duration;

use crate::store::LockRecord;

/// === Lock information carried by a handle ===
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockInfo {
    /// Resource name as passed by the caller
    pub resource: String,
    /// Store key (prefix + resource)
    pub key: String,
    /// Ownership token
    pub token: String,
    pub owner: Option<String>,
    /// 1-based attempt that won the lock; `None` for a lock read back from the store
    pub acquired_on_attempt: Option<u32>,
    /// Time spent waiting between attempts, `(attempt - 1) * retry_delay`
    pub acquire_delay: Option<Duration>,
}

impl LockInfo {
    pub(crate) fn acquired(
        resource: &str,
        key: String,
        token: String,
        owner: Option<&str>,
        attempt: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            resource: resource.to_string(),
            key,
            token,
            owner: owner.filter(|o| !o.is_empty()).map(str::to_string),
            acquired_on_attempt: Some(attempt),
            acquire_delay: Some(acquire_delay(retry_delay, attempt)),
        }
    }

    pub(crate) fn observed(resource: &str, key: String, record: LockRecord) -> Self {
        Self {
            resource: resource.to_string(),
            key,
            token: record.token,
            owner: record.owner,
            acquired_on_attempt: None,
            acquire_delay: None,
        }
    }
}

pub(crate) fn acquire_delay(retry_delay: Duration, attempt: u32) -> Duration {
    retry_delay.saturating_mul(attempt.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_delay() {
        let delay = Duration::from_millis(50);
        assert_eq!(acquire_delay(delay, 1), Duration::ZERO);
        assert_eq!(acquire_delay(delay, 4), Duration::from_millis(150));
        assert_eq!(acquire_delay(Duration::MAX, u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_lock_info_constructors() {
        let info = LockInfo::acquired("orders", "lock:orders".to_string(), "t1".to_string(), Some(""), 3, Duration::from_millis(10));
        assert_eq!(info.owner, None);
        assert_eq!(info.acquired_on_attempt, Some(3));
        assert_eq!(info.acquire_delay, Some(Duration::from_millis(20)));

        let record = LockRecord { token: "t2".to_string(), owner: Some("billing".to_string()) };
        let info = LockInfo::observed("orders", "lock:orders".to_string(), record);
        assert_eq!(info.token, "t2");
        assert_eq!(info.owner.as_deref(), Some("billing"));
        assert_eq!(info.acquired_on_attempt, None);
    }
}
