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
mod local;
mod non_blocking;

pub use blocking::*;
pub use local::*;
pub use non_blocking::*;

use std::time::Duration;
use async_trait::async_trait;

use crate::errors::DistLockResult;

/// Contents of a lock record as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRecord {
    pub token: String,
    pub owner: Option<String>,
}

impl LockRecord {
    /// Build from the raw `id` / `owner` hash fields; an empty owner means none.
    pub fn from_fields(token: String, owner: Option<String>) -> Self {
        Self {
            token,
            owner: owner.filter(|o| !o.is_empty()),
        }
    }
}

/// Store-side lock contract. Every mutating method must be atomic with
/// respect to all other operations on the same key.
pub trait LockStore: Send + Sync {
    /// Create the record if the key is absent. `true` when created.
    fn create_lock(&self, key: &str, token: &str, owner: Option<&str>, ttl: Duration) -> DistLockResult<bool>;

    /// Delete the record only if its token matches. `true` when deleted.
    fn delete_lock(&self, key: &str, token: &str) -> DistLockResult<bool>;

    /// Reset the record's expiry only if its token matches. `true` when extended.
    fn extend_lock(&self, key: &str, token: &str, ttl: Duration) -> DistLockResult<bool>;

    fn read_lock(&self, key: &str) -> DistLockResult<Option<LockRecord>>;

    fn is_locked(&self, key: &str) -> DistLockResult<bool>;

    /// Remaining time to live, `None` when there is no record.
    fn remaining_time(&self, key: &str) -> DistLockResult<Option<Duration>>;
}

/// Asynchronous version of [`LockStore`]
#[async_trait]
pub trait AsyncLockStore: Send + Sync {
    async fn create_lock(&self, key: &str, token: &str, owner: Option<&str>, ttl: Duration) -> DistLockResult<bool>;
    async fn delete_lock(&self, key: &str, token: &str) -> DistLockResult<bool>;
    async fn extend_lock(&self, key: &str, token: &str, ttl: Duration) -> DistLockResult<bool>;
    async fn read_lock(&self, key: &str) -> DistLockResult<Option<LockRecord>>;
    async fn is_locked(&self, key: &str) -> DistLockResult<bool>;
    async fn remaining_time(&self, key: &str) -> DistLockResult<Option<Duration>>;
}

/// Turn an HMGET `id owner` reply into a record.
pub(crate) fn record_from_reply(reply: Vec<Option<String>>) -> Option<LockRecord> {
    let mut fields = reply.into_iter();
    let token = fields.next().flatten()?;
    let owner = fields.next().flatten();
    Some(LockRecord::from_fields(token, owner))
}

pub(crate) fn ttl_from_pttl(ttl_ms: i64) -> Option<Duration> {
    if ttl_ms > 0 {
        Some(Duration::from_millis(ttl_ms as u64))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_reply() {
        assert_eq!(record_from_reply(vec![None, None]), None);
        assert_eq!(record_from_reply(vec![]), None);

        let record = record_from_reply(vec![Some("t1".to_string()), Some("".to_string())]).unwrap();
        assert_eq!(record.token, "t1");
        assert_eq!(record.owner, None);

        let record = record_from_reply(vec![Some("t2".to_string()), Some("worker-7".to_string())]).unwrap();
        assert_eq!(record.owner.as_deref(), Some("worker-7"));
    }

    #[test]
    fn test_ttl_from_pttl() {
        assert_eq!(ttl_from_pttl(-2), None);
        assert_eq!(ttl_from_pttl(-1), None);
        assert_eq!(ttl_from_pttl(1500), Some(Duration::from_millis(1500)));
    }
}
