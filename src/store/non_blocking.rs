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
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;

use crate::errors::DistLockResult;
use crate::scripts::{self, ID_FIELD, OWNER_FIELD};
use crate::store::{record_from_reply, ttl_from_pttl, AsyncLockStore, LockRecord};
use crate::{num_milliseconds, AsyncRedisConnectionManager};

/// Redis lock store over async pooled connections.
pub struct AsyncRedisLockStore {
    connection_manager: Arc<AsyncRedisConnectionManager>,
}

impl AsyncRedisLockStore {
    pub fn new(connection_manager: Arc<AsyncRedisConnectionManager>) -> Self {
        Self { connection_manager }
    }

    pub fn connection_manager(&self) -> &Arc<AsyncRedisConnectionManager> {
        &self.connection_manager
    }
}

#[async_trait]
impl AsyncLockStore for AsyncRedisLockStore {
    async fn create_lock(&self, key: &str, token: &str, owner: Option<&str>, ttl: Duration) -> DistLockResult<bool> {
        let mut conn = self.connection_manager.get_connection().await?;

        let created: i32 = scripts::CREATE_LOCK_SCRIPT
            .key(key)
            .arg(token)
            .arg(owner.unwrap_or(""))
            .arg(num_milliseconds(&ttl))
            .invoke_async(&mut conn)
            .await?;

        Ok(created == 1)
    }

    async fn delete_lock(&self, key: &str, token: &str) -> DistLockResult<bool> {
        let mut conn = self.connection_manager.get_connection().await?;

        let deleted: i32 = scripts::DELETE_LOCK_SCRIPT
            .key(key)
            .arg(token)
            .invoke_async(&mut conn)
            .await?;

        Ok(deleted == 1)
    }

    async fn extend_lock(&self, key: &str, token: &str, ttl: Duration) -> DistLockResult<bool> {
        let mut conn = self.connection_manager.get_connection().await?;

        let extended: i32 = scripts::EXTEND_LOCK_SCRIPT
            .key(key)
            .arg(token)
            .arg(num_milliseconds(&ttl))
            .invoke_async(&mut conn)
            .await?;

        Ok(extended == 1)
    }

    async fn read_lock(&self, key: &str) -> DistLockResult<Option<LockRecord>> {
        let mut conn = self.connection_manager.get_connection().await?;
        let reply: Vec<Option<String>> = conn
            .execute_command(redis::cmd("HMGET").arg(key).arg(ID_FIELD).arg(OWNER_FIELD))
            .await?;
        Ok(record_from_reply(reply))
    }

    async fn is_locked(&self, key: &str) -> DistLockResult<bool> {
        let mut conn = self.connection_manager.get_connection().await?;
        let exists: i32 = conn.execute_command(redis::cmd("EXISTS").arg(key)).await?;
        Ok(exists > 0)
    }

    async fn remaining_time(&self, key: &str) -> DistLockResult<Option<Duration>> {
        let mut conn = self.connection_manager.get_connection().await?;
        let ttl_ms: i64 = conn.execute_command(redis::cmd("PTTL").arg(key)).await?;
        Ok(ttl_from_pttl(ttl_ms))
    }
}
