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
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{DistLockConfig, LockOptions, MaxRetries};
use crate::errors::DistLockResult;
use crate::lock::LockInfo;
use crate::store::{AsyncLockStore, AsyncRedisLockStore};
use crate::util::{ensure_not_empty, ensure_positive};
use crate::{AsyncRedisConnectionManager, TokenGenerator, UuidTokenGenerator};

/// === AsyncDistLock (asynchronous lock manager) ===
///
/// Cheap to clone; clones share the store, options and token generator.
#[derive(Clone)]
pub struct AsyncDistLock {
    store: Arc<dyn AsyncLockStore>,
    options: Arc<LockOptions>,
    tokens: Arc<dyn TokenGenerator>,
}

impl AsyncDistLock {
    pub fn new(store: Arc<dyn AsyncLockStore>, options: LockOptions) -> DistLockResult<Self> {
        options.validate()?;
        Ok(Self {
            store,
            options: Arc::new(options),
            tokens: Arc::new(UuidTokenGenerator),
        })
    }

    /// Connect to Redis with the given configuration.
    pub async fn connect(config: &DistLockConfig) -> DistLockResult<Self> {
        let connection_manager = Arc::new(AsyncRedisConnectionManager::new(config).await?);
        let store = Arc::new(AsyncRedisLockStore::new(connection_manager));
        Self::new(store, config.lock.clone())
    }

    pub fn with_token_generator(mut self, tokens: impl TokenGenerator + 'static) -> Self {
        self.tokens = Arc::new(tokens);
        self
    }

    /// A manager over the same store with different options.
    pub fn with_options(&self, options: LockOptions) -> DistLockResult<Self> {
        options.validate()?;
        Ok(Self {
            store: self.store.clone(),
            options: Arc::new(options),
            tokens: self.tokens.clone(),
        })
    }

    pub fn options(&self) -> &LockOptions {
        &self.options
    }

    /// Acquire a lock, retrying every `retry_delay` while it is held elsewhere.
    ///
    /// Returns `Ok(None)` once `max_retries` is exhausted. Store errors end
    /// the loop immediately.
    pub async fn acquire(&self, resource_name: &str, owner: Option<&str>) -> DistLockResult<Option<AsyncLockHandle>> {
        self.acquire_with_retries(resource_name, owner, self.options.max_retries, None).await
    }

    /// Like [`acquire`](Self::acquire), but gives up with `Ok(None)` as soon as `cancel` fires.
    pub async fn acquire_with_cancel(
        &self,
        resource_name: &str,
        owner: Option<&str>,
        cancel: &CancellationToken,
    ) -> DistLockResult<Option<AsyncLockHandle>> {
        self.acquire_with_retries(resource_name, owner, self.options.max_retries, Some(cancel)).await
    }

    /// A single attempt, whatever `max_retries` is configured to.
    pub async fn try_acquire(&self, resource_name: &str, owner: Option<&str>) -> DistLockResult<Option<AsyncLockHandle>> {
        self.acquire_with_retries(resource_name, owner, MaxRetries::Limited(0), None).await
    }

    async fn acquire_with_retries(
        &self,
        resource_name: &str,
        owner: Option<&str>,
        max_retries: MaxRetries,
        cancel: Option<&CancellationToken>,
    ) -> DistLockResult<Option<AsyncLockHandle>> {
        ensure_not_empty("resource_name", resource_name)?;

        let key = self.options.key(resource_name);
        let mut attempt: u32 = 0;

        loop {
            if cancel.map_or(false, |c| c.is_cancelled()) {
                debug!("Acquisition of {} cancelled after {} attempts", key, attempt);
                return Ok(None);
            }

            attempt = attempt.saturating_add(1);
            let token = self.tokens.generate();

            let created = match self.store.create_lock(&key, &token, owner, self.options.ttl).await {
                Ok(created) => created,
                Err(e) => {
                    warn!("Lock {} attempt {} failed: {}", key, attempt, e);
                    return Err(e);
                }
            };

            if created {
                debug!("Lock {} acquired on attempt {}", key, attempt);
                let info = LockInfo::acquired(resource_name, key, token, owner, attempt, self.options.retry_delay);
                return Ok(Some(AsyncLockHandle::new(self.clone(), info)));
            }

            if !max_retries.allows_retry(attempt) {
                debug!("Lock {} unavailable after {} attempts", key, attempt);
                return Ok(None);
            }

            match cancel {
                Some(cancel) => {
                    tokio::select! {
                        _ = sleep(self.options.retry_delay) => {}
                        _ = cancel.cancelled() => {
                            debug!("Acquisition of {} cancelled after {} attempts", key, attempt);
                            return Ok(None);
                        }
                    }
                }
                None => sleep(self.options.retry_delay).await,
            }
        }
    }

    /// The lock currently held on a resource, if any. Advisory only.
    pub async fn get_acquired_lock(&self, resource_name: &str) -> DistLockResult<Option<AsyncLockHandle>> {
        ensure_not_empty("resource_name", resource_name)?;

        let key = self.options.key(resource_name);
        let record = self.store.read_lock(&key).await?;
        Ok(record.map(|record| AsyncLockHandle::new(self.clone(), LockInfo::observed(resource_name, key, record))))
    }

    /// Release the lock if `token` still owns it.
    pub async fn release_lock(&self, resource_name: &str, token: &str) -> DistLockResult<bool> {
        ensure_not_empty("resource_name", resource_name)?;
        ensure_not_empty("token", token)?;

        let key = self.options.key(resource_name);
        let released = self.store.delete_lock(&key, token).await?;
        debug!("Release of {} {}", key, if released { "succeeded" } else { "was a no-op" });
        Ok(released)
    }

    /// Reset the lock's ttl to `duration` if `token` still owns it.
    pub async fn extend_lock(&self, resource_name: &str, token: &str, duration: Duration) -> DistLockResult<bool> {
        ensure_not_empty("resource_name", resource_name)?;
        ensure_not_empty("token", token)?;
        ensure_positive("duration", &duration)?;

        let key = self.options.key(resource_name);
        let extended = self.store.extend_lock(&key, token, duration).await?;
        debug!("Extension of {} by {:?} {}", key, duration, if extended { "succeeded" } else { "was a no-op" });
        Ok(extended)
    }

    pub async fn is_locked(&self, resource_name: &str) -> DistLockResult<bool> {
        ensure_not_empty("resource_name", resource_name)?;
        self.store.is_locked(&self.options.key(resource_name)).await
    }

    /// Time left before the lock expires, `None` when unlocked.
    pub async fn remaining_time(&self, resource_name: &str) -> DistLockResult<Option<Duration>> {
        ensure_not_empty("resource_name", resource_name)?;
        self.store.remaining_time(&self.options.key(resource_name)).await
    }
}

impl fmt::Debug for AsyncDistLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncDistLock")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Handle to an acquired lock. Dropping it does not release the lock.
#[derive(Debug, Clone)]
pub struct AsyncLockHandle {
    manager: AsyncDistLock,
    info: LockInfo,
}

impl AsyncLockHandle {
    fn new(manager: AsyncDistLock, info: LockInfo) -> Self {
        Self { manager, info }
    }

    pub async fn release(&self) -> DistLockResult<bool> {
        self.manager.release_lock(&self.info.resource, &self.info.token).await
    }

    pub async fn extend(&self, duration: Duration) -> DistLockResult<bool> {
        self.manager.extend_lock(&self.info.resource, &self.info.token, duration).await
    }

    pub fn info(&self) -> &LockInfo {
        &self.info
    }

    pub fn into_info(self) -> LockInfo {
        self.info
    }
}

impl Deref for AsyncLockHandle {
    type Target = LockInfo;

    fn deref(&self) -> &LockInfo {
        &self.info
    }
}
