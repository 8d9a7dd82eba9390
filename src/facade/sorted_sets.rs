//! Sorted sets
//!
//! Score bounds are passed as text so the store's own syntax works
//! unchanged: `"-inf"`, `"+inf"`, `"(5"` (exclusive), `"5"`.

use bytes::Bytes;

use crate::error::Result;
use crate::protocol::{Command, RangeLimit, Reply};
use crate::session::StoreSession;

use super::{is_one, not_nil, to_bytes, to_int, Facade, ZAddMode, ZADD_XX_NX};

impl<S: StoreSession> Facade<S> {
    /// `true` iff `member` was newly added
    pub fn z_add(&mut self, key: &str, score: f64, member: impl AsRef<[u8]>) -> Result<bool> {
        self.dispatch(
            Command::ZAdd {
                key: key.to_string(),
                score,
                member: to_bytes(member),
            },
            is_one,
        )
    }

    /// Conditional score update through the `zadd_xx_nx` server script
    ///
    /// `false` exactly when the script reports the condition failed.
    pub fn z_add_mod(
        &mut self,
        key: &str,
        mode: ZAddMode,
        score: f64,
        member: impl AsRef<[u8]>,
    ) -> Result<bool> {
        let args = vec![
            Bytes::from(self.session.prefixed_key(key)),
            Bytes::from_static(mode.as_str().as_bytes()),
            Bytes::from(score.to_string()),
            to_bytes(member),
        ];

        self.dispatch(
            Command::EvalSha {
                sha1: ZADD_XX_NX.sha1(),
                args,
                num_keys: 1,
            },
            not_nil,
        )
    }

    /// `true` iff `member` was removed
    pub fn z_delete(&mut self, key: &str, member: impl AsRef<[u8]>) -> Result<bool> {
        self.dispatch(
            Command::ZRem {
                key: key.to_string(),
                member: to_bytes(member),
            },
            is_one,
        )
    }

    /// Alias of `z_rem_range_by_score`
    pub fn z_delete_range_by_score(&mut self, key: &str, from: &str, to: &str) -> Result<i64> {
        self.z_rem_range_by_score(key, from, to)
    }

    /// Number of members removed
    pub fn z_rem_range_by_score(&mut self, key: &str, from: &str, to: &str) -> Result<i64> {
        self.dispatch(
            Command::ZRemRangeByScore {
                key: key.to_string(),
                min: from.to_string(),
                max: to.to_string(),
            },
            to_int,
        )
    }

    /// Number of members removed
    pub fn z_rem_range_by_rank(&mut self, key: &str, start: i64, stop: i64) -> Result<i64> {
        self.dispatch(
            Command::ZRemRangeByRank {
                key: key.to_string(),
                start,
                stop,
            },
            to_int,
        )
    }

    pub fn z_range(&mut self, key: &str, start: i64, stop: i64) -> Result<Vec<Bytes>> {
        self.dispatch(
            Command::ZRange {
                key: key.to_string(),
                start,
                stop,
                with_scores: false,
            },
            Reply::into_bytes_list,
        )
    }

    pub fn z_rev_range(&mut self, key: &str, start: i64, stop: i64) -> Result<Vec<Bytes>> {
        self.dispatch(
            Command::ZRevRange {
                key: key.to_string(),
                start,
                stop,
                with_scores: false,
            },
            Reply::into_bytes_list,
        )
    }

    pub fn z_rev_range_with_scores(
        &mut self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(Bytes, f64)>> {
        self.dispatch(
            Command::ZRevRange {
                key: key.to_string(),
                start,
                stop,
                with_scores: true,
            },
            Reply::into_scored,
        )
    }

    /// Members with `min <= score <= max`, lowest first
    pub fn z_range_by_score(
        &mut self,
        key: &str,
        min: &str,
        max: &str,
        limit: Option<RangeLimit>,
    ) -> Result<Vec<Bytes>> {
        self.dispatch(
            Command::ZRangeByScore {
                key: key.to_string(),
                min: min.to_string(),
                max: max.to_string(),
                with_scores: false,
                limit,
            },
            Reply::into_bytes_list,
        )
    }

    pub fn z_range_by_score_with_scores(
        &mut self,
        key: &str,
        min: &str,
        max: &str,
        limit: Option<RangeLimit>,
    ) -> Result<Vec<(Bytes, f64)>> {
        self.dispatch(
            Command::ZRangeByScore {
                key: key.to_string(),
                min: min.to_string(),
                max: max.to_string(),
                with_scores: true,
                limit,
            },
            Reply::into_scored,
        )
    }

    /// Members with `max >= score >= min`, highest first
    pub fn z_rev_range_by_score(
        &mut self,
        key: &str,
        max: &str,
        min: &str,
        limit: Option<RangeLimit>,
    ) -> Result<Vec<Bytes>> {
        self.dispatch(
            Command::ZRevRangeByScore {
                key: key.to_string(),
                max: max.to_string(),
                min: min.to_string(),
                with_scores: false,
                limit,
            },
            Reply::into_bytes_list,
        )
    }

    pub fn z_rev_range_by_score_with_scores(
        &mut self,
        key: &str,
        max: &str,
        min: &str,
        limit: Option<RangeLimit>,
    ) -> Result<Vec<(Bytes, f64)>> {
        self.dispatch(
            Command::ZRevRangeByScore {
                key: key.to_string(),
                max: max.to_string(),
                min: min.to_string(),
                with_scores: true,
                limit,
            },
            Reply::into_scored,
        )
    }

    /// `z_rev_range_by_score` with LIMIT offset count
    pub fn z_rev_range_by_score_limit(
        &mut self,
        key: &str,
        max: &str,
        min: &str,
        offset: i64,
        count: i64,
    ) -> Result<Vec<Bytes>> {
        self.z_rev_range_by_score(key, max, min, Some(RangeLimit { offset, count }))
    }

    pub fn z_card(&mut self, key: &str) -> Result<i64> {
        self.dispatch(
            Command::ZCard {
                key: key.to_string(),
            },
            to_int,
        )
    }

    /// Rank, lowest score first; `None` when not a member
    pub fn z_rank(&mut self, key: &str, member: impl AsRef<[u8]>) -> Result<Option<i64>> {
        self.dispatch(
            Command::ZRank {
                key: key.to_string(),
                member: to_bytes(member),
            },
            Reply::into_opt_integer,
        )
    }

    /// Rank, highest score first; `None` when not a member
    pub fn z_rev_rank(&mut self, key: &str, member: impl AsRef<[u8]>) -> Result<Option<i64>> {
        self.dispatch(
            Command::ZRevRank {
                key: key.to_string(),
                member: to_bytes(member),
            },
            Reply::into_opt_integer,
        )
    }

    pub fn z_count(&mut self, key: &str, min: &str, max: &str) -> Result<i64> {
        self.dispatch(
            Command::ZCount {
                key: key.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            },
            to_int,
        )
    }

    /// New score of `member`
    pub fn z_incr_by(
        &mut self,
        key: &str,
        increment: f64,
        member: impl AsRef<[u8]>,
    ) -> Result<f64> {
        self.dispatch(
            Command::ZIncrBy {
                key: key.to_string(),
                increment,
                member: to_bytes(member),
            },
            Reply::into_float,
        )
    }

    /// Score of `member`, `None` when not a member
    pub fn z_score(&mut self, key: &str, member: impl AsRef<[u8]>) -> Result<Option<f64>> {
        self.dispatch(
            Command::ZScore {
                key: key.to_string(),
                member: to_bytes(member),
            },
            Reply::into_opt_float,
        )
    }
}
