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
use dist_lock::{AsyncDistLock, CancellationToken, DistLockConfig, DistLockResult};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> DistLockResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dist_lock=debug")))
        .init();

    // 1. Load configuration; max_retries -1 means retry until cancelled
    let config = DistLockConfig::from_json(r#"{
        "connection_mode": { "SingleServer": { "url": "redis://127.0.0.1:6379", "host": null, "port": null } },
        "pool_size": 4,
        "lock": { "ttl": { "secs": 5, "nanos": 0 }, "max_retries": -1 }
    }"#)?;

    // 2. Connect the async lock manager
    let lock = AsyncDistLock::connect(&config).await?;

    // 3. Hold the lock from one task
    let holder = lock.acquire("async-job", Some("holder")).await?;
    println!("Holder acquired: {}", holder.is_some());

    // 4. A second task waits until it is cancelled
    let cancel = CancellationToken::new();
    let waiter = {
        let lock = lock.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { lock.acquire_with_cancel("async-job", Some("waiter"), &cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    cancel.cancel();
    println!("Waiter acquired: {}", waiter.await??.is_some());

    if let Some(handle) = holder {
        println!("Released: {}", handle.release().await?);
    }
    Ok(())
}
