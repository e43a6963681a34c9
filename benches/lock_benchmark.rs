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
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::time::Duration;
use dist_lock::{AsyncDistLock, DistLock, DistLockConfig, LocalLockStore, LockOptions, RandomTokenGenerator};

fn create_local_lock() -> DistLock {
    DistLock::new(Arc::new(LocalLockStore::new()), LockOptions::default().with_max_retries(0)).unwrap()
}

fn bench_lock(c: &mut Criterion) {
    let lock = create_local_lock();

    c.bench_function("local_acquire_release", |b| {
        b.iter(|| {
            let handle = lock.acquire("bench:lock", None).unwrap().unwrap();
            handle.release().unwrap();
        });
    });

    c.bench_function("local_acquire_extend_release", |b| {
        b.iter(|| {
            let handle = lock.acquire("bench:lock", Some("bench")).unwrap().unwrap();
            handle.extend(Duration::from_secs(60)).unwrap();
            handle.release().unwrap();
        });
    });

    // Contended path: a single attempt against a held lock
    let _held = lock.acquire("bench:held", None).unwrap().unwrap();
    c.bench_function("local_try_acquire_held", |b| {
        b.iter(|| {
            assert!(lock.try_acquire("bench:held", None).unwrap().is_none());
        });
    });
}

fn bench_token_generators(c: &mut Criterion) {
    let mut group = c.benchmark_group("token_generator");

    group.bench_function("uuid", |b| {
        let lock = create_local_lock();
        b.iter(|| lock.acquire("bench:uuid", None).unwrap().unwrap().release().unwrap());
    });

    for len in [16usize, 32, 64].iter() {
        group.bench_with_input(BenchmarkId::new("random", len), len, |b, &len| {
            let lock = create_local_lock().with_token_generator(RandomTokenGenerator::new(len));
            b.iter(|| lock.acquire("bench:random", None).unwrap().unwrap().release().unwrap());
        });
    }

    group.finish();
}

fn bench_async_operations(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let lock = AsyncDistLock::new(Arc::new(LocalLockStore::new()), LockOptions::default()).unwrap();

    c.bench_function("async_local_acquire_release", |b| {
        b.to_async(&runtime).iter(|| async {
            let handle = lock.acquire("bench:async", None).await.unwrap().unwrap();
            handle.release().await.unwrap();
        });
    });
}

fn bench_redis(c: &mut Criterion) {
    // Only runs when a server is configured
    let Ok(url) = std::env::var("REDIS_URL") else {
        return;
    };

    let config = DistLockConfig::single_server(&url).with_pool_size(10);
    let lock = DistLock::connect(&config).unwrap();

    c.bench_function("redis_acquire_release", |b| {
        b.iter(|| {
            let handle = lock.acquire("bench:redis", None).unwrap().unwrap();
            handle.release().unwrap();
        });
    });
}

criterion_group!(
    name = local_benches;
    config = Criterion::default()
        .sample_size(50)
        .warm_up_time(Duration::from_secs(1))
        .measurement_time(Duration::from_secs(5));
    targets = bench_lock, bench_token_generators, bench_async_operations
);

criterion_group!(
    name = redis_benches;
    config = Criterion::default()
        .sample_size(10)
        .warm_up_time(Duration::from_secs(2))
        .measurement_time(Duration::from_secs(5));
    targets = bench_redis
);

criterion_main!(local_benches, redis_benches);
