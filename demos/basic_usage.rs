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
use dist_lock::{DistLock, DistLockConfig, DistLockResult, LockOptions};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> DistLockResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dist_lock=debug")))
        .init();

    // 1. Create configuration
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let config = DistLockConfig::single_server(&url)
        .with_pool_size(4)
        .with_lock_options(
            LockOptions::default()
                .with_ttl(Duration::from_secs(10))
                .with_retry_delay(Duration::from_millis(100))
                .with_max_retries(20),
        );

    // 2. Connect the blocking lock manager
    let lock = DistLock::connect(&config)?;

    // 3. Acquire, work, extend, release
    let Some(handle) = lock.acquire("report-job", Some("basic_usage"))? else {
        println!("report-job is busy, giving up");
        return Ok(());
    };
    println!("Acquired {} on attempt {:?} after {:?}", handle.key, handle.acquired_on_attempt, handle.acquire_delay);

    println!("Critical section accessed");
    handle.extend(Duration::from_secs(30))?;
    println!("Remaining: {:?}", lock.remaining_time("report-job")?);

    // 4. Inspect the current holder
    if let Some(current) = lock.get_acquired_lock("report-job")? {
        println!("Held by {:?} with token {}", current.owner, current.token);
    }

    println!("Released: {}", handle.release()?);
    Ok(())
}
