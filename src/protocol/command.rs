//! Command definitions
//!
//! One variant per store primitive the facade issues. A command knows
//! which of its arguments are keys, so the session can apply the
//! configured key prefix when framing it.

use bytes::Bytes;

/// Where LINSERT places the new element relative to the pivot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Before,
    After,
}

impl InsertPosition {
    fn as_str(self) -> &'static str {
        match self {
            InsertPosition::Before => "BEFORE",
            InsertPosition::After => "AFTER",
        }
    }
}

/// Optional LIMIT clause for score-range queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeLimit {
    pub offset: i64,
    pub count: i64,
}

/// A store command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // -------------------------------------------------------------------------
    // Connection
    // -------------------------------------------------------------------------
    Auth { password: String },
    Select { db: u32 },

    // -------------------------------------------------------------------------
    // Keys & Strings
    // -------------------------------------------------------------------------
    /// SET, with EX when `ttl` is non-zero
    Set { key: String, value: Bytes, ttl: u64 },
    SetEx { key: String, value: Bytes, ttl: u64 },
    SetNx { key: String, value: Bytes },
    Get { key: String },
    Del { key: String },
    Exists { key: String },
    Ttl { key: String },
    Expire { key: String, seconds: i64 },
    ExpireAt { key: String, timestamp: i64 },
    MGet { keys: Vec<String> },
    MSet { pairs: Vec<(String, Bytes)> },
    Append { key: String, value: Bytes },
    Incr { key: String },
    IncrBy { key: String, delta: i64 },
    Decr { key: String },
    DecrBy { key: String, delta: i64 },
    GetRange { key: String, start: i64, end: i64 },
    Rename { from: String, to: String },

    // -------------------------------------------------------------------------
    // Sorted Sets
    // -------------------------------------------------------------------------
    ZAdd { key: String, score: f64, member: Bytes },
    ZRem { key: String, member: Bytes },
    ZRemRangeByScore { key: String, min: String, max: String },
    ZRemRangeByRank { key: String, start: i64, stop: i64 },
    ZRange { key: String, start: i64, stop: i64, with_scores: bool },
    ZRevRange { key: String, start: i64, stop: i64, with_scores: bool },
    ZRangeByScore {
        key: String,
        min: String,
        max: String,
        with_scores: bool,
        limit: Option<RangeLimit>,
    },
    ZRevRangeByScore {
        key: String,
        max: String,
        min: String,
        with_scores: bool,
        limit: Option<RangeLimit>,
    },
    ZCard { key: String },
    ZRank { key: String, member: Bytes },
    ZRevRank { key: String, member: Bytes },
    ZCount { key: String, min: String, max: String },
    ZIncrBy { key: String, increment: f64, member: Bytes },
    ZScore { key: String, member: Bytes },

    // -------------------------------------------------------------------------
    // Sets
    // -------------------------------------------------------------------------
    SAdd { key: String, member: Bytes },
    SRem { key: String, member: Bytes },
    SCard { key: String },
    SDiff { keys: Vec<String> },
    SInter { keys: Vec<String> },
    SUnion { keys: Vec<String> },
    SIsMember { key: String, member: Bytes },
    SMembers { key: String },

    // -------------------------------------------------------------------------
    // Hashes
    // -------------------------------------------------------------------------
    HGet { key: String, field: String },
    HSet { key: String, field: String, value: Bytes },
    HSetNx { key: String, field: String, value: Bytes },
    HMSet { key: String, fields: Vec<(String, Bytes)> },
    HDel { key: String, field: String },
    HExists { key: String, field: String },
    HIncrBy { key: String, field: String, delta: i64 },
    HIncrByFloat { key: String, field: String, delta: f64 },
    HVals { key: String },
    HGetAll { key: String },

    // -------------------------------------------------------------------------
    // Lists
    // -------------------------------------------------------------------------
    LIndex { key: String, index: i64 },
    LInsert { key: String, position: InsertPosition, pivot: Bytes, value: Bytes },
    LLen { key: String },
    LPop { key: String },
    LPush { key: String, value: Bytes },
    LPushX { key: String, value: Bytes },
    LRange { key: String, start: i64, stop: i64 },
    LRem { key: String, value: Bytes, count: i64 },
    LSet { key: String, index: i64, value: Bytes },
    LTrim { key: String, start: i64, stop: i64 },
    RPop { key: String },
    RPush { key: String, value: Bytes },
    RPushX { key: String, value: Bytes },

    // -------------------------------------------------------------------------
    // Administrative
    // -------------------------------------------------------------------------
    Watch { key: String },
    Unwatch,
    FlushDb,
    Info,

    // -------------------------------------------------------------------------
    // Scripting
    // -------------------------------------------------------------------------
    /// EVALSHA; `args` are sent verbatim, key arguments included
    EvalSha { sha1: String, args: Vec<Bytes>, num_keys: usize },
    ScriptLoad { script: String },

    // -------------------------------------------------------------------------
    // Batching
    // -------------------------------------------------------------------------
    Multi,
    Exec,
    Discard,
}

impl Command {
    /// Command name as sent on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Command::Auth { .. } => "AUTH",
            Command::Select { .. } => "SELECT",
            Command::Set { .. } => "SET",
            Command::SetEx { .. } => "SETEX",
            Command::SetNx { .. } => "SETNX",
            Command::Get { .. } => "GET",
            Command::Del { .. } => "DEL",
            Command::Exists { .. } => "EXISTS",
            Command::Ttl { .. } => "TTL",
            Command::Expire { .. } => "EXPIRE",
            Command::ExpireAt { .. } => "EXPIREAT",
            Command::MGet { .. } => "MGET",
            Command::MSet { .. } => "MSET",
            Command::Append { .. } => "APPEND",
            Command::Incr { .. } => "INCR",
            Command::IncrBy { .. } => "INCRBY",
            Command::Decr { .. } => "DECR",
            Command::DecrBy { .. } => "DECRBY",
            Command::GetRange { .. } => "GETRANGE",
            Command::Rename { .. } => "RENAME",
            Command::ZAdd { .. } => "ZADD",
            Command::ZRem { .. } => "ZREM",
            Command::ZRemRangeByScore { .. } => "ZREMRANGEBYSCORE",
            Command::ZRemRangeByRank { .. } => "ZREMRANGEBYRANK",
            Command::ZRange { .. } => "ZRANGE",
            Command::ZRevRange { .. } => "ZREVRANGE",
            Command::ZRangeByScore { .. } => "ZRANGEBYSCORE",
            Command::ZRevRangeByScore { .. } => "ZREVRANGEBYSCORE",
            Command::ZCard { .. } => "ZCARD",
            Command::ZRank { .. } => "ZRANK",
            Command::ZRevRank { .. } => "ZREVRANK",
            Command::ZCount { .. } => "ZCOUNT",
            Command::ZIncrBy { .. } => "ZINCRBY",
            Command::ZScore { .. } => "ZSCORE",
            Command::SAdd { .. } => "SADD",
            Command::SRem { .. } => "SREM",
            Command::SCard { .. } => "SCARD",
            Command::SDiff { .. } => "SDIFF",
            Command::SInter { .. } => "SINTER",
            Command::SUnion { .. } => "SUNION",
            Command::SIsMember { .. } => "SISMEMBER",
            Command::SMembers { .. } => "SMEMBERS",
            Command::HGet { .. } => "HGET",
            Command::HSet { .. } => "HSET",
            Command::HSetNx { .. } => "HSETNX",
            Command::HMSet { .. } => "HMSET",
            Command::HDel { .. } => "HDEL",
            Command::HExists { .. } => "HEXISTS",
            Command::HIncrBy { .. } => "HINCRBY",
            Command::HIncrByFloat { .. } => "HINCRBYFLOAT",
            Command::HVals { .. } => "HVALS",
            Command::HGetAll { .. } => "HGETALL",
            Command::LIndex { .. } => "LINDEX",
            Command::LInsert { .. } => "LINSERT",
            Command::LLen { .. } => "LLEN",
            Command::LPop { .. } => "LPOP",
            Command::LPush { .. } => "LPUSH",
            Command::LPushX { .. } => "LPUSHX",
            Command::LRange { .. } => "LRANGE",
            Command::LRem { .. } => "LREM",
            Command::LSet { .. } => "LSET",
            Command::LTrim { .. } => "LTRIM",
            Command::RPop { .. } => "RPOP",
            Command::RPush { .. } => "RPUSH",
            Command::RPushX { .. } => "RPUSHX",
            Command::Watch { .. } => "WATCH",
            Command::Unwatch => "UNWATCH",
            Command::FlushDb => "FLUSHDB",
            Command::Info => "INFO",
            Command::EvalSha { .. } => "EVALSHA",
            Command::ScriptLoad { .. } => "SCRIPT",
            Command::Multi => "MULTI",
            Command::Exec => "EXEC",
            Command::Discard => "DISCARD",
        }
    }

    /// Whether the command reads server metadata rather than data, and
    /// so is answered immediately even while a pipeline is buffering
    pub fn bypasses_batch(&self) -> bool {
        matches!(self, Command::Info)
    }

    /// Full argument vector, command name first, with `prefix`
    /// prepended to every key argument
    pub fn to_args(&self, prefix: &str) -> Vec<Vec<u8>> {
        let mut args = Args::new(self.name(), prefix);

        match self {
            Command::Auth { password } => {
                args.text(password);
            }
            Command::Select { db } => {
                args.display(db);
            }
            Command::Unwatch
            | Command::FlushDb
            | Command::Info
            | Command::Multi
            | Command::Exec
            | Command::Discard => {}

            Command::Set { key, value, ttl } => {
                args.key(key).bytes(value);
                if *ttl > 0 {
                    args.text("EX").display(ttl);
                }
            }
            Command::SetEx { key, value, ttl } => {
                args.key(key).display(ttl).bytes(value);
            }
            Command::SetNx { key, value } | Command::Append { key, value } => {
                args.key(key).bytes(value);
            }
            Command::Get { key }
            | Command::Del { key }
            | Command::Exists { key }
            | Command::Ttl { key }
            | Command::Incr { key }
            | Command::Decr { key }
            | Command::ZCard { key }
            | Command::SCard { key }
            | Command::SMembers { key }
            | Command::HVals { key }
            | Command::HGetAll { key }
            | Command::LLen { key }
            | Command::LPop { key }
            | Command::RPop { key }
            | Command::Watch { key } => {
                args.key(key);
            }
            Command::Expire { key, seconds } => {
                args.key(key).display(seconds);
            }
            Command::ExpireAt { key, timestamp } => {
                args.key(key).display(timestamp);
            }
            Command::MGet { keys }
            | Command::SDiff { keys }
            | Command::SInter { keys }
            | Command::SUnion { keys } => {
                for key in keys {
                    args.key(key);
                }
            }
            Command::MSet { pairs } => {
                for (key, value) in pairs {
                    args.key(key).bytes(value);
                }
            }
            Command::IncrBy { key, delta } | Command::DecrBy { key, delta } => {
                args.key(key).display(delta);
            }
            Command::GetRange { key, start, end } => {
                args.key(key).display(start).display(end);
            }
            Command::Rename { from, to } => {
                args.key(from).key(to);
            }

            Command::ZAdd { key, score, member } => {
                args.key(key).display(score).bytes(member);
            }
            Command::ZRem { key, member }
            | Command::ZRank { key, member }
            | Command::ZRevRank { key, member }
            | Command::ZScore { key, member }
            | Command::SAdd { key, member }
            | Command::SRem { key, member }
            | Command::SIsMember { key, member } => {
                args.key(key).bytes(member);
            }
            Command::ZRemRangeByScore { key, min, max } | Command::ZCount { key, min, max } => {
                args.key(key).text(min).text(max);
            }
            Command::ZRemRangeByRank { key, start, stop }
            | Command::LRange { key, start, stop }
            | Command::LTrim { key, start, stop } => {
                args.key(key).display(start).display(stop);
            }
            Command::ZRange { key, start, stop, with_scores }
            | Command::ZRevRange { key, start, stop, with_scores } => {
                args.key(key).display(start).display(stop);
                if *with_scores {
                    args.text("WITHSCORES");
                }
            }
            Command::ZRangeByScore { key, min: from, max: to, with_scores, limit }
            | Command::ZRevRangeByScore { key, max: from, min: to, with_scores, limit } => {
                args.key(key).text(from).text(to);
                if *with_scores {
                    args.text("WITHSCORES");
                }
                if let Some(limit) = limit {
                    args.text("LIMIT").display(&limit.offset).display(&limit.count);
                }
            }
            Command::ZIncrBy { key, increment, member } => {
                args.key(key).display(increment).bytes(member);
            }

            Command::HGet { key, field }
            | Command::HDel { key, field }
            | Command::HExists { key, field } => {
                args.key(key).text(field);
            }
            Command::HSet { key, field, value } | Command::HSetNx { key, field, value } => {
                args.key(key).text(field).bytes(value);
            }
            Command::HMSet { key, fields } => {
                args.key(key);
                for (field, value) in fields {
                    args.text(field).bytes(value);
                }
            }
            Command::HIncrBy { key, field, delta } => {
                args.key(key).text(field).display(delta);
            }
            Command::HIncrByFloat { key, field, delta } => {
                args.key(key).text(field).display(delta);
            }

            Command::LIndex { key, index } => {
                args.key(key).display(index);
            }
            Command::LInsert { key, position, pivot, value } => {
                args.key(key).text(position.as_str()).bytes(pivot).bytes(value);
            }
            Command::LPush { key, value }
            | Command::LPushX { key, value }
            | Command::RPush { key, value }
            | Command::RPushX { key, value } => {
                args.key(key).bytes(value);
            }
            Command::LRem { key, value, count } => {
                args.key(key).display(count).bytes(value);
            }
            Command::LSet { key, index, value } => {
                args.key(key).display(index).bytes(value);
            }

            Command::EvalSha { sha1, args: script_args, num_keys } => {
                args.text(sha1).display(num_keys);
                for arg in script_args {
                    args.bytes(arg);
                }
            }
            Command::ScriptLoad { script } => {
                args.text("LOAD").text(script);
            }
        };

        args.finish()
    }
}

/// Argument vector under construction
struct Args<'p> {
    parts: Vec<Vec<u8>>,
    prefix: &'p str,
}

impl<'p> Args<'p> {
    fn new(name: &str, prefix: &'p str) -> Self {
        Self {
            parts: vec![name.as_bytes().to_vec()],
            prefix,
        }
    }

    fn key(&mut self, key: &str) -> &mut Self {
        let mut part = Vec::with_capacity(self.prefix.len() + key.len());
        part.extend_from_slice(self.prefix.as_bytes());
        part.extend_from_slice(key.as_bytes());
        self.parts.push(part);
        self
    }

    fn text(&mut self, text: &str) -> &mut Self {
        self.parts.push(text.as_bytes().to_vec());
        self
    }

    fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.parts.push(bytes.to_vec());
        self
    }

    fn display(&mut self, value: &impl ToString) -> &mut Self {
        self.parts.push(value.to_string().into_bytes());
        self
    }

    fn finish(self) -> Vec<Vec<u8>> {
        self.parts
    }
}
