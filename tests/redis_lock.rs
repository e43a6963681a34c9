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
//! Integration tests against a live Redis. Run with
//! `REDIS_URL=redis://... cargo test -- --ignored`.

use dist_lock::{AsyncDistLock, DistLock, DistLockConfig, DistLockResult, LockOptions, ID_FIELD, OWNER_FIELD};
use redis::AsyncCommands;
use std::time::Duration;

const KEY_PREFIX: &str = "__test_lock:";

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

fn test_config(options: LockOptions) -> DistLockConfig {
    DistLockConfig::single_server(&redis_url())
        .with_pool_size(4)
        .with_lock_options(options.with_key_prefix(KEY_PREFIX))
}

async fn raw_connection() -> redis::aio::MultiplexedConnection {
    let client = redis::Client::open(redis_url()).unwrap();
    client.get_multiplexed_async_connection().await.unwrap()
}

/// Fresh lock manager with the resource's key cleared.
async fn create_test_lock(resource: &str, options: LockOptions) -> AsyncDistLock {
    let mut conn = raw_connection().await;
    let _: () = conn.del(format!("{}{}", KEY_PREFIX, resource)).await.unwrap();
    AsyncDistLock::connect(&test_config(options)).await.unwrap()
}

#[tokio::test]
#[ignore = "requires running redis"]
async fn acquires_available_lock() -> DistLockResult<()> {
    let lock = create_test_lock("available", LockOptions::default()).await;

    let handle = lock.acquire("available", Some("integration")).await?.unwrap();
    assert_eq!(handle.key, format!("{}available", KEY_PREFIX));

    let mut conn = raw_connection().await;
    let id: Option<String> = conn.hget(&handle.key, ID_FIELD).await?;
    let owner: Option<String> = conn.hget(&handle.key, OWNER_FIELD).await?;
    assert_eq!(id.as_deref(), Some(handle.token.as_str()));
    assert_eq!(owner.as_deref(), Some("integration"));

    let pttl: i64 = conn.pttl(&handle.key).await?;
    assert!(pttl > 0 && pttl <= 30_000);

    assert!(handle.release().await?);
    Ok(())
}

#[tokio::test]
#[ignore = "requires running redis"]
async fn fails_to_acquire_unavailable_lock() -> DistLockResult<()> {
    let lock = create_test_lock("unavailable", LockOptions::default().with_max_retries(0)).await;

    let first = lock.acquire("unavailable", None).await?.unwrap();
    assert!(lock.acquire("unavailable", None).await?.is_none());

    assert!(first.release().await?);
    let again = lock.acquire("unavailable", None).await?.unwrap();
    assert_eq!(again.acquired_on_attempt, Some(1));
    again.release().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires running redis"]
async fn releases_lock_automatically_after_ttl() -> DistLockResult<()> {
    let lock = create_test_lock("ttl", LockOptions::default().with_ttl(Duration::from_millis(100))).await;
    lock.acquire("ttl", None).await?.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(lock.try_acquire("ttl", None).await?.is_some());
    Ok(())
}

#[tokio::test]
#[ignore = "requires running redis"]
async fn extends_a_lock_ttl() -> DistLockResult<()> {
    let lock = create_test_lock("extend", LockOptions::default().with_ttl(Duration::from_millis(100))).await;
    let handle = lock.acquire("extend", None).await?.unwrap();

    assert!(handle.extend(Duration::from_millis(1000)).await?);
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(lock.try_acquire("extend", None).await?.is_none());
    assert!(handle.release().await?);
    Ok(())
}

#[tokio::test]
#[ignore = "requires running redis"]
async fn fails_to_extend_an_expired_lock() -> DistLockResult<()> {
    let lock = create_test_lock("expired", LockOptions::default().with_ttl(Duration::from_millis(100))).await;
    let handle = lock.acquire("expired", None).await?.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(!handle.extend(Duration::from_millis(1000)).await?);
    Ok(())
}

#[tokio::test]
#[ignore = "requires running redis"]
async fn acquires_lock_on_retry() -> DistLockResult<()> {
    let lock = create_test_lock("retry", LockOptions::default().with_ttl(Duration::from_millis(100))).await;
    lock.acquire("retry", None).await?.unwrap();

    let handle = lock.acquire("retry", None).await?.unwrap();
    let attempt = handle.acquired_on_attempt.unwrap();
    assert!(attempt > 1);
    assert_eq!(handle.acquire_delay, Some(lock.options().retry_delay * (attempt - 1)));
    handle.release().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires running redis"]
async fn fails_when_max_retries_reached() -> DistLockResult<()> {
    let lock = create_test_lock("bounded", LockOptions::default()).await;
    let holder = lock.acquire("bounded", None).await?.unwrap();

    let limited = lock.with_options(lock.options().clone().with_max_retries(3))?;
    assert!(limited.acquire("bounded", None).await?.is_none());

    holder.release().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires running redis"]
async fn stale_token_cannot_release_new_holder() -> DistLockResult<()> {
    let lock = create_test_lock("stale", LockOptions::default()).await;

    let first = lock.acquire("stale", None).await?.unwrap();
    assert!(first.release().await?);
    let second = lock.acquire("stale", None).await?.unwrap();

    assert!(!first.release().await?);
    assert!(!first.extend(Duration::from_secs(5)).await?);

    let current = lock.get_acquired_lock("stale").await?.unwrap();
    assert_eq!(current.token, second.token);
    assert!(second.release().await?);
    assert!(lock.get_acquired_lock("stale").await?.is_none());
    Ok(())
}

#[tokio::test]
#[ignore = "requires running redis"]
async fn only_one_concurrent_acquire_wins() -> DistLockResult<()> {
    let lock = create_test_lock("race", LockOptions::default().with_max_retries(0)).await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let lock = lock.clone();
            tokio::spawn(async move { lock.acquire("race", None).await })
        })
        .collect();

    let mut winners = 0;
    for task in tasks {
        if task.await??.is_some() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
    Ok(())
}

#[test]
#[ignore = "requires running redis"]
fn blocking_lock_round_trip() -> DistLockResult<()> {
    let lock = DistLock::connect(&test_config(LockOptions::default().with_max_retries(0)))?;

    // Start from a clean key
    if let Some(stale) = lock.get_acquired_lock("blocking")? {
        stale.release()?;
    }

    let handle = lock.acquire("blocking", Some("sync"))?.unwrap();
    assert!(lock.is_locked("blocking")?);
    assert!(lock.remaining_time("blocking")?.is_some());
    assert!(lock.try_acquire("blocking", None)?.is_none());
    assert!(handle.release()?);
    assert!(!lock.is_locked("blocking")?);
    Ok(())
}
