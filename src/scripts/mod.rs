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

//! Lua scripts backing the lock record. A record is a hash with an `id`
//! field (the owner token) and an `owner` label, expiring via PEXPIRE.

use once_cell::sync::Lazy;
use redis::Script;

/// Hash field holding the token.
pub const ID_FIELD: &str = "id";
/// Hash field holding the owner label.
pub const OWNER_FIELD: &str = "owner";

pub static CREATE_LOCK_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(r#"
        local key = KEYS[1]
        local id = ARGV[1]
        local owner = ARGV[2]
        local ttl = ARGV[3]

        if redis.call('exists', key) == 1 then
            return 0  -- Held by someone else
        end

        redis.call('hset', key, 'id', id, 'owner', owner)
        redis.call('pexpire', key, ttl)
        return 1
    "#)
});

pub static DELETE_LOCK_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(r#"
        local key = KEYS[1]
        local id = ARGV[1]

        if redis.call('hget', key, 'id') == id then
            return redis.call('del', key)
        end

        return 0
    "#)
});

pub static EXTEND_LOCK_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(r#"
        local key = KEYS[1]
        local id = ARGV[1]
        local ttl = ARGV[2]

        if redis.call('hget', key, 'id') == id then
            return redis.call('pexpire', key, ttl)
        end

        return 0
    "#)
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_have_distinct_hashes() {
        let hashes = [
            CREATE_LOCK_SCRIPT.get_hash().to_string(),
            DELETE_LOCK_SCRIPT.get_hash().to_string(),
            EXTEND_LOCK_SCRIPT.get_hash().to_string(),
        ];
        assert_ne!(hashes[0], hashes[1]);
        assert_ne!(hashes[1], hashes[2]);
        assert_eq!(hashes[0].len(), 40);
    }
}
