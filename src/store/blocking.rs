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

use crate::errors::DistLockResult;
use crate::scripts::{self, ID_FIELD, OWNER_FIELD};
use crate::store::{record_from_reply, ttl_from_pttl, LockRecord, LockStore};
use crate::{num_milliseconds, RedisConnectionManager};

/// Redis lock store over blocking pooled connections.
pub struct RedisLockStore {
    connection_manager: Arc<RedisConnectionManager>,
}

impl RedisLockStore {
    pub fn new(connection_manager: Arc<RedisConnectionManager>) -> Self {
        Self { connection_manager }
    }

    pub fn connection_manager(&self) -> &Arc<RedisConnectionManager> {
        &self.connection_manager
    }
}

impl LockStore for RedisLockStore {
    fn create_lock(&self, key: &str, token: &str, owner: Option<&str>, ttl: Duration) -> DistLockResult<bool> {
        let mut conn = self.connection_manager.get_connection()?;

        let created: i32 = scripts::CREATE_LOCK_SCRIPT
            .key(key)
            .arg(token)
            .arg(owner.unwrap_or(""))
            .arg(num_milliseconds(&ttl))
            .invoke(&mut conn)?;

        Ok(created == 1)
    }

    fn delete_lock(&self, key: &str, token: &str) -> DistLockResult<bool> {
        let mut conn = self.connection_manager.get_connection()?;

        let deleted: i32 = scripts::DELETE_LOCK_SCRIPT
            .key(key)
            .arg(token)
            .invoke(&mut conn)?;

        Ok(deleted == 1)
    }

    fn extend_lock(&self, key: &str, token: &str, ttl: Duration) -> DistLockResult<bool> {
        let mut conn = self.connection_manager.get_connection()?;

        let extended: i32 = scripts::EXTEND_LOCK_SCRIPT
            .key(key)
            .arg(token)
            .arg(num_milliseconds(&ttl))
            .invoke(&mut conn)?;

        Ok(extended == 1)
    }

    fn read_lock(&self, key: &str) -> DistLockResult<Option<LockRecord>> {
        let mut conn = self.connection_manager.get_connection()?;
        let reply: Vec<Option<String>> = conn.execute_command(
            redis::cmd("HMGET").arg(key).arg(ID_FIELD).arg(OWNER_FIELD)
        )?;
        Ok(record_from_reply(reply))
    }

    fn is_locked(&self, key: &str) -> DistLockResult<bool> {
        let mut conn = self.connection_manager.get_connection()?;
        let exists: i32 = conn.execute_command(redis::cmd("EXISTS").arg(key))?;
        Ok(exists > 0)
    }

    fn remaining_time(&self, key: &str) -> DistLockResult<Option<Duration>> {
        let mut conn = self.connection_manager.get_connection()?;
        let ttl_ms: i64 = conn.execute_command(redis::cmd("PTTL").arg(key))?;
        Ok(ttl_from_pttl(ttl_ms))
    }
}
