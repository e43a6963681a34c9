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
use std::collections::HashMap;
use std::time::Duration;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::errors::DistLockResult;
use crate::store::{AsyncLockStore, LockRecord, LockStore};

struct LocalEntry {
    record: LockRecord,
    // None when the ttl overflows the clock
    expires_at: Option<Instant>,
}

impl LocalEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |at| now >= at)
    }
}

// Map size below which `create_lock` never sweeps
const MIN_SWEEP_THRESHOLD: usize = 64;

struct LocalEntries {
    map: HashMap<String, LocalEntry>,
    // Next map size at which `create_lock` sweeps expired records
    sweep_threshold: usize,
}

impl Default for LocalEntries {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            sweep_threshold: MIN_SWEEP_THRESHOLD,
        }
    }
}

impl LocalEntries {
    fn sweep(&mut self, now: Instant) -> usize {
        let before = self.map.len();
        self.map.retain(|_, entry| !entry.is_expired(now));
        self.sweep_threshold = (self.map.len() * 2).max(MIN_SWEEP_THRESHOLD);
        before - self.map.len()
    }
}

/// In-process lock store.
///
/// Each operation runs under one mutex, which gives the same atomicity the
/// Redis scripts give across processes. Expired records are dropped when
/// their key is touched, and `create_lock` sweeps the whole map whenever it
/// has doubled since the last sweep, so memory tracks the live lock count.
/// [`LocalLockStore::purge_expired`] sweeps on demand. Time is read from the
/// tokio clock so a paused test runtime controls expiry.
#[derive(Default)]
pub struct LocalLockStore {
    entries: Mutex<LocalEntries>,
}

impl LocalLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired record, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.entries.lock().sweep(Instant::now())
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.lock().map.values().filter(|entry| !entry.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_live_entry<R>(&self, key: &str, f: impl FnOnce(Option<&mut LocalEntry>, Instant) -> R) -> R {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        if entries.map.get(key).map_or(false, |entry| entry.is_expired(now)) {
            entries.map.remove(key);
        }
        f(entries.map.get_mut(key), now)
    }
}

impl LockStore for LocalLockStore {
    fn create_lock(&self, key: &str, token: &str, owner: Option<&str>, ttl: Duration) -> DistLockResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        if let Some(entry) = entries.map.get(key) {
            if !entry.is_expired(now) {
                return Ok(false);
            }
        }

        if entries.map.len() >= entries.sweep_threshold {
            entries.sweep(now);
        }

        entries.map.insert(key.to_string(), LocalEntry {
            record: LockRecord::from_fields(token.to_string(), owner.map(str::to_string)),
            expires_at: now.checked_add(ttl),
        });
        Ok(true)
    }

    fn delete_lock(&self, key: &str, token: &str) -> DistLockResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        match entries.map.get(key) {
            Some(entry) if !entry.is_expired(now) && entry.record.token == token => {
                entries.map.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn extend_lock(&self, key: &str, token: &str, ttl: Duration) -> DistLockResult<bool> {
        Ok(self.with_live_entry(key, |entry, now| match entry {
            Some(entry) if entry.record.token == token => {
                entry.expires_at = now.checked_add(ttl);
                true
            }
            _ => false,
        }))
    }

    fn read_lock(&self, key: &str) -> DistLockResult<Option<LockRecord>> {
        Ok(self.with_live_entry(key, |entry, _| entry.map(|entry| entry.record.clone())))
    }

    fn is_locked(&self, key: &str) -> DistLockResult<bool> {
        Ok(self.with_live_entry(key, |entry, _| entry.is_some()))
    }

    fn remaining_time(&self, key: &str) -> DistLockResult<Option<Duration>> {
        Ok(self.with_live_entry(key, |entry, now| {
            entry.and_then(|entry| entry.expires_at.map(|at| at.saturating_duration_since(now)))
        }))
    }
}

#[async_trait]
impl AsyncLockStore for LocalLockStore {
    async fn create_lock(&self, key: &str, token: &str, owner: Option<&str>, ttl: Duration) -> DistLockResult<bool> {
        LockStore::create_lock(self, key, token, owner, ttl)
    }

    async fn delete_lock(&self, key: &str, token: &str) -> DistLockResult<bool> {
        LockStore::delete_lock(self, key, token)
    }

    async fn extend_lock(&self, key: &str, token: &str, ttl: Duration) -> DistLockResult<bool> {
        LockStore::extend_lock(self, key, token, ttl)
    }

    async fn read_lock(&self, key: &str) -> DistLockResult<Option<LockRecord>> {
        LockStore::read_lock(self, key)
    }

    async fn is_locked(&self, key: &str) -> DistLockResult<bool> {
        LockStore::is_locked(self, key)
    }

    async fn remaining_time(&self, key: &str) -> DistLockResult<Option<Duration>> {
        LockStore::remaining_time(self, key)
    }
}
