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
use deadpool::managed::Metrics;
use deadpool::Runtime;
use redis::aio::ConnectionLike as AsyncConnectionLike;
use redis::cluster::ClusterClient;
use redis::cluster_async::ClusterConnection;
use redis::sentinel::SentinelClient;
use redis::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex as TokioMutex;
use tokio::time::timeout;
use tracing::info;

use crate::config::DistLockConfig;
use crate::connection::{create_cluster_client, create_sentinel_client, create_single_client, ConnectionType};
use crate::errors::{DistLockError, DistLockResult};

type AsyncRedisPool = deadpool::managed::Pool<AsyncSingleRedisConnectionManager>;
type AsyncClusterPool = deadpool::managed::Pool<AsyncClusterConnectionManager>;
type AsyncSentinelPool = deadpool::managed::Pool<AsyncSentinelConnectionManager>;

pub enum AsyncRedisConnection {
    Single(deadpool::managed::Object<AsyncSingleRedisConnectionManager>),
    Cluster(deadpool::managed::Object<AsyncClusterConnectionManager>),
    Sentinel(deadpool::managed::Object<AsyncSentinelConnectionManager>),
}

impl AsyncConnectionLike for AsyncRedisConnection {
    fn req_packed_command<'a>(
        &'a mut self,
        cmd: &'a redis::Cmd,
    ) -> redis::RedisFuture<'a, redis::Value> {
        match self {
            AsyncRedisConnection::Single(conn) => conn.req_packed_command(cmd),
            AsyncRedisConnection::Cluster(conn) => conn.req_packed_command(cmd),
            AsyncRedisConnection::Sentinel(conn) => conn.req_packed_command(cmd),
        }
    }

    fn req_packed_commands<'a>(
        &'a mut self,
        cmd: &'a redis::Pipeline,
        offset: usize,
        count: usize,
    ) -> redis::RedisFuture<'a, Vec<redis::Value>> {
        match self {
            AsyncRedisConnection::Single(conn) => conn.req_packed_commands(cmd, offset, count),
            AsyncRedisConnection::Cluster(conn) => conn.req_packed_commands(cmd, offset, count),
            AsyncRedisConnection::Sentinel(conn) => conn.req_packed_commands(cmd, offset, count),
        }
    }

    fn get_db(&self) -> i64 {
        match self {
            AsyncRedisConnection::Single(conn) => conn.get_db(),
            AsyncRedisConnection::Cluster(conn) => conn.get_db(),
            AsyncRedisConnection::Sentinel(conn) => conn.get_db(),
        }
    }
}

impl AsyncRedisConnection {
    pub async fn execute_command<T: redis::FromRedisValue>(&mut self, cmd: &mut redis::Cmd) -> DistLockResult<T> {
        cmd.query_async(self).await.map_err(DistLockError::RedisError)
    }
}

async fn ping<C: AsyncConnectionLike + Send>(conn: &mut C) -> deadpool::managed::RecycleResult<redis::RedisError> {
    match redis::cmd("PING").query_async::<String>(conn).await {
        Ok(pong) if pong == "PONG" => Ok(()),
        Ok(_) => Err(deadpool::managed::RecycleError::Message("Invalid PONG response".into())),
        Err(e) => Err(deadpool::managed::RecycleError::Backend(e)),
    }
}

pub struct AsyncSingleRedisConnectionManager {
    client: Client,
}

#[async_trait::async_trait]
impl deadpool::managed::Manager for AsyncSingleRedisConnectionManager {
    type Type = redis::aio::MultiplexedConnection;
    type Error = redis::RedisError;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        self.client.get_multiplexed_async_connection().await
    }

    async fn recycle(&self, conn: &mut Self::Type, _metrics: &Metrics) -> deadpool::managed::RecycleResult<Self::Error> {
        ping(conn).await
    }
}

pub struct AsyncClusterConnectionManager {
    client: ClusterClient,
}

#[async_trait::async_trait]
impl deadpool::managed::Manager for AsyncClusterConnectionManager {
    type Type = ClusterConnection;
    type Error = redis::RedisError;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        self.client.get_async_connection().await
    }

    async fn recycle(&self, conn: &mut Self::Type, _metrics: &Metrics) -> deadpool::managed::RecycleResult<Self::Error> {
        ping(conn).await
    }
}

pub struct AsyncSentinelConnectionManager {
    client: TokioMutex<SentinelClient>,
}

#[async_trait::async_trait]
impl deadpool::managed::Manager for AsyncSentinelConnectionManager {
    type Type = redis::aio::MultiplexedConnection;
    type Error = redis::RedisError;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        let mut client = self.client.lock().await;
        client.get_async_connection().await
    }

    async fn recycle(&self, conn: &mut Self::Type, _metrics: &Metrics) -> deadpool::managed::RecycleResult<Self::Error> {
        ping(conn).await
    }
}

enum AsyncPool {
    Single(AsyncRedisPool),
    Cluster(AsyncClusterPool),
    Sentinel(AsyncSentinelPool),
}

/// Asynchronous connection manager backed by deadpool.
pub struct AsyncRedisConnectionManager {
    pool: AsyncPool,
    connection_type: ConnectionType,
    connection_timeout: Duration,
    is_closed: AtomicBool,
}

impl AsyncRedisConnectionManager {
    pub async fn new(config: &DistLockConfig) -> DistLockResult<Self> {
        config.validate()?;

        let connection_type = ConnectionType::of(&config.connection_mode);
        let pool = match connection_type {
            ConnectionType::Single => {
                let manager = AsyncSingleRedisConnectionManager { client: create_single_client(config)? };
                AsyncPool::Single(Self::build_pool(manager, config)?)
            }
            ConnectionType::Cluster => {
                let manager = AsyncClusterConnectionManager { client: create_cluster_client(config)? };
                AsyncPool::Cluster(Self::build_pool(manager, config)?)
            }
            ConnectionType::Sentinel => {
                let manager = AsyncSentinelConnectionManager { client: TokioMutex::new(create_sentinel_client(config)?) };
                AsyncPool::Sentinel(Self::build_pool(manager, config)?)
            }
        };

        info!("Created async {:?} connection pool with {} connections", connection_type, config.pool_size);

        Ok(Self {
            pool,
            connection_type,
            connection_timeout: config.connection_timeout,
            is_closed: AtomicBool::new(false),
        })
    }

    fn build_pool<M>(manager: M, config: &DistLockConfig) -> DistLockResult<deadpool::managed::Pool<M>>
    where
        M: deadpool::managed::Manager,
    {
        let pool = deadpool::managed::Pool::builder(manager)
            .max_size(config.pool_size as usize)
            .timeouts(deadpool::managed::Timeouts {
                wait: Some(config.connection_timeout),
                create: Some(config.connection_timeout),
                recycle: Some(Duration::from_secs(5)),
            })
            .runtime(Runtime::Tokio1)
            .build()?;

        Ok(pool)
    }

    pub async fn get_connection(&self) -> DistLockResult<AsyncRedisConnection> {
        if self.is_closed() {
            return Err(DistLockError::PoolError("Connection manager is closed".to_string()));
        }

        let checkout = async {
            let conn = match &self.pool {
                AsyncPool::Single(pool) => AsyncRedisConnection::Single(pool.get().await?),
                AsyncPool::Cluster(pool) => AsyncRedisConnection::Cluster(pool.get().await?),
                AsyncPool::Sentinel(pool) => AsyncRedisConnection::Sentinel(pool.get().await?),
            };
            Ok::<_, DistLockError>(conn)
        };

        timeout(self.connection_timeout, checkout)
            .await
            .map_err(|_| DistLockError::PoolError("timeout".to_string()))?
    }

    pub fn connection_type(&self) -> ConnectionType {
        self.connection_type
    }

    pub async fn health_check(&self) -> bool {
        match self.get_connection().await {
            Ok(mut conn) => matches!(
                conn.execute_command::<String>(&mut redis::cmd("PING")).await,
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
