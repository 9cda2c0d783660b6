//! Redis-backed [`RiskPublisher`].

use async_trait::async_trait;
use chrono::Utc;
use curvewatch_core::CurveId;
use curvewatch_risk::RiskRecord;
use curvewatch_traits::{CurveSnapshot, CycleSummary, OutputSection, RiskPublisher, TraitError};
use redis::aio::ConnectionManager;
use redis::RedisError;
use tracing::{debug, info};

use crate::layout;

fn redis_error(context: &str, e: &RedisError) -> TraitError {
    if e.is_timeout() {
        TraitError::Timeout
    } else if e.is_connection_refusal() || e.is_io_error() {
        TraitError::ConnectionFailed(format!("{context}: {e}"))
    } else {
        TraitError::PublishFailed(format!("{context}: {e}"))
    }
}

/// Publishes risk records, curve snapshots and cycle signals to Redis.
///
/// Each write is one atomic pipeline. The connection manager reconnects on its own after a
/// dropped connection; the failed write surfaces as an error to the caller's retry.
#[derive(Clone)]
pub struct RedisRiskPublisher {
    con: ConnectionManager,
    url: String,
    ttl_secs: u64,
    channel: String,
    primary_curve: CurveId,
}

impl std::fmt::Debug for RedisRiskPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRiskPublisher")
            .field("url", &self.url)
            .field("ttl_secs", &self.ttl_secs)
            .field("channel", &self.channel)
            .field("primary_curve", &self.primary_curve)
            .finish_non_exhaustive()
    }
}

impl RedisRiskPublisher {
    /// Connects and verifies the server with `PING`.
    ///
    /// `primary_curve` is written to the unqualified `yield_curve:*` keys.
    ///
    /// # Errors
    ///
    /// `Configuration` for a bad URL, `ConnectionFailed` if the server is unreachable.
    pub async fn connect(
        section: &OutputSection,
        primary_curve: CurveId,
    ) -> Result<Self, TraitError> {
        let client = redis::Client::open(section.redis_url.as_str())
            .map_err(|e| TraitError::Configuration(format!("redis url: {e}")))?;
        let mut con = client
            .get_connection_manager()
            .await
            .map_err(|e| redis_error("connect", &e))?;
        redis::cmd("PING")
            .query_async::<String>(&mut con)
            .await
            .map_err(|e| redis_error("ping", &e))?;

        info!(url = %section.redis_url, channel = %section.channel, "redis connected");
        Ok(Self {
            con,
            url: section.redis_url.clone(),
            ttl_secs: section.ttl_secs,
            channel: section.channel.clone(),
            primary_curve,
        })
    }

    async fn execute(&self, pipe: &redis::Pipeline, context: &str) -> Result<(), TraitError> {
        let mut con = self.con.clone();
        pipe.query_async::<()>(&mut con)
            .await
            .map_err(|e| redis_error(context, &e))
    }
}

#[async_trait]
impl RiskPublisher for RedisRiskPublisher {
    async fn publish_risk(&self, record: &RiskRecord) -> Result<(), TraitError> {
        let key = layout::risk_key(&record.instrument_id);
        let fields = layout::risk_fields(record, Utc::now().timestamp_millis());

        let mut pipe = redis::pipe();
        pipe.atomic();
        // stale krd_* fields from an earlier key tenor set must not survive
        pipe.del(&key).ignore();
        pipe.hset_multiple(&key, fields.as_slice()).ignore();
        pipe.expire(&key, self.ttl_secs as i64).ignore();
        pipe.publish(&self.channel, layout::risk_notification(record))
            .ignore();
        self.execute(&pipe, "risk").await?;

        debug!(instrument_id = %record.instrument_id, npv = record.npv, "risk written");
        Ok(())
    }

    async fn publish_curve(&self, snapshot: &CurveSnapshot) -> Result<(), TraitError> {
        let now_ms = Utc::now().timestamp_millis();
        let (latest, history) = layout::curve_keys(&snapshot.curve_id, &self.primary_curve);
        let fields = layout::curve_fields(snapshot, now_ms);
        let member = layout::curve_history_member(snapshot)?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        pipe.hset_multiple(&latest, fields.as_slice()).ignore();
        pipe.zadd(&history, member, snapshot.timestamp).ignore();
        pipe.zrembyscore(&history, "-inf", layout::history_cutoff(now_ms))
            .ignore();
        self.execute(&pipe, "curve").await?;

        debug!(curve_id = %snapshot.curve_id, key = %latest, "curve written");
        Ok(())
    }

    async fn cycle_complete(&self, summary: &CycleSummary) -> Result<(), TraitError> {
        let payload = serde_json::to_string(summary)
            .map_err(|e| TraitError::SerializationError(e.to_string()))?;
        let mut con = self.con.clone();
        redis::cmd("PUBLISH")
            .arg(layout::cycle_channel(&self.channel))
            .arg(payload)
            .query_async::<i64>(&mut con)
            .await
            .map_err(|e| redis_error("cycle", &e))?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("redis {} (channel {})", self.url, self.channel)
    }
}
