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
use r2d2::{Pool, PooledConnection};
use redis::cluster::ClusterClient;
use redis::sentinel::LockedSentinelClient;
use redis::{Client, ConnectionLike};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use crate::config::DistLockConfig;
use crate::connection::{create_cluster_client, create_sentinel_client, create_single_client, ConnectionType};
use crate::errors::{DistLockError, DistLockResult};

type RedisPool = Pool<Client>;
type ClusterRedisPool = Pool<ClusterClient>;
type SentinelRedisPool = Pool<LockedSentinelClient>;

pub enum RedisConnection {
    Single(PooledConnection<Client>),
    Cluster(PooledConnection<ClusterClient>),
    Sentinel(PooledConnection<LockedSentinelClient>),
}

// Implement the ConnectionLike trait so scripts and commands run over every mode
impl ConnectionLike for RedisConnection {
    fn req_packed_command(&mut self, cmd: &[u8]) -> redis::RedisResult<redis::Value> {
        match self {
            RedisConnection::Single(conn) => conn.req_packed_command(cmd),
            RedisConnection::Cluster(conn) => conn.req_packed_command(cmd),
            RedisConnection::Sentinel(conn) => conn.req_packed_command(cmd),
        }
    }

    fn req_packed_commands(
        &mut self,
        cmd: &[u8],
        offset: usize,
        count: usize,
    ) -> redis::RedisResult<Vec<redis::Value>> {
        match self {
            RedisConnection::Single(conn) => conn.req_packed_commands(cmd, offset, count),
            RedisConnection::Cluster(conn) => conn.req_packed_commands(cmd, offset, count),
            RedisConnection::Sentinel(conn) => conn.req_packed_commands(cmd, offset, count),
        }
    }

    fn get_db(&self) -> i64 {
        match self {
            RedisConnection::Single(conn) => conn.get_db(),
            RedisConnection::Cluster(conn) => conn.get_db(),
            RedisConnection::Sentinel(conn) => conn.get_db(),
        }
    }

    fn check_connection(&mut self) -> bool {
        match self {
            RedisConnection::Single(conn) => conn.check_connection(),
            RedisConnection::Cluster(conn) => conn.check_connection(),
            RedisConnection::Sentinel(conn) => conn.check_connection(),
        }
    }

    fn is_open(&self) -> bool {
        match self {
            RedisConnection::Single(conn) => conn.is_open(),
            RedisConnection::Cluster(conn) => conn.is_open(),
            RedisConnection::Sentinel(conn) => conn.is_open(),
        }
    }
}

impl RedisConnection {
    pub fn execute_command<T: redis::FromRedisValue>(&mut self, cmd: &mut redis::Cmd) -> DistLockResult<T> {
        cmd.query(self).map_err(DistLockError::RedisError)
    }
}

enum SyncPool {
    Single(RedisPool),
    Cluster(ClusterRedisPool),
    Sentinel(SentinelRedisPool),
}

/// Blocking connection manager backed by r2d2 pools.
pub struct RedisConnectionManager {
    pool: SyncPool,
    connection_type: ConnectionType,
    is_closed: AtomicBool,
}

impl RedisConnectionManager {
    pub fn new(config: &DistLockConfig) -> DistLockResult<Self> {
        config.validate()?;

        let connection_type = ConnectionType::of(&config.connection_mode);
        let pool = match connection_type {
            ConnectionType::Single => SyncPool::Single(Self::build_pool(create_single_client(config)?, config)?),
            ConnectionType::Cluster => SyncPool::Cluster(Self::build_pool(create_cluster_client(config)?, config)?),
            ConnectionType::Sentinel => {
                let client = LockedSentinelClient::new(create_sentinel_client(config)?);
                SyncPool::Sentinel(Self::build_pool(client, config)?)
            }
        };

        info!("Created {:?} connection pool with {} connections", connection_type, config.pool_size);

        Ok(Self {
            pool,
            connection_type,
            is_closed: AtomicBool::new(false),
        })
    }

    fn build_pool<T>(client: T, config: &DistLockConfig) -> DistLockResult<Pool<T>>
    where
        T: r2d2::ManageConnection,
    {
        Pool::builder()
            .max_size(config.pool_size)
            .min_idle(Some(config.pool_size / 2))
            .connection_timeout(config.connection_timeout)
            .max_lifetime(Some(config.max_lifetime))
            .idle_timeout(Some(config.idle_timeout))
            .test_on_check_out(true)
            .build(client)
            .map_err(DistLockError::from)
    }

    pub fn get_connection(&self) -> DistLockResult<RedisConnection> {
        if self.is_closed() {
            return Err(DistLockError::PoolError("Connection manager is closed".to_string()));
        }

        let conn = match &self.pool {
            SyncPool::Single(pool) => RedisConnection::Single(pool.get()?),
            SyncPool::Cluster(pool) => RedisConnection::Cluster(pool.get()?),
            SyncPool::Sentinel(pool) => RedisConnection::Sentinel(pool.get()?),
        };
        Ok(conn)
    }

    pub fn connection_type(&self) -> ConnectionType {
        self.connection_type
    }

    pub fn health_check(&self) -> bool {
        match self.get_connection() {
            Ok(mut conn) => matches!(
                conn.execute_command::<String>(&mut redis::cmd("PING")),
                Ok(ref pong) if pong == "PONG"
            ),
            Err(_) => false,
        }
    }

    pub fn close(&self) {
        self.is_closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed.load(Ordering::Acquire)
    }
}
