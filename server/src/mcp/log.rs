//! Capture ring for broadcast messages pushed by the bridge.

use std::collections::VecDeque;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

// Cap and trim-to sizes: the ring never holds more than MAX_ENTRIES; once it
// would, the oldest half is dropped in one cut.
const MAX_ENTRIES: usize = 1000;
const TRIM_TO: usize = 500;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedMessage {
    pub channel: String,
    pub args: Vec<Value>,
    pub received_at: String,
}

#[derive(Default)]
pub struct MessageLog {
    entries: Mutex<VecDeque<CapturedMessage>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, channel: String, args: Vec<Value>) {
        let mut entries = self.entries.lock().await;
        if entries.len() >= MAX_ENTRIES {
            let excess = entries.len() - TRIM_TO;
            entries.drain(..excess);
        }
        entries.push_back(CapturedMessage {
            channel,
            args,
            received_at: chrono::Utc::now().to_rfc3339(),
        });
    }

    /// Newest-last snapshot, optionally filtered by channel and capped.
    pub async fn query(&self, channel: Option<&str>, limit: Option<usize>) -> Vec<CapturedMessage> {
        let entries = self.entries.lock().await;
        let filtered: Vec<CapturedMessage> = entries
            .iter()
            .filter(|m| channel.map(|c| m.channel == c).unwrap_or(true))
            .cloned()
            .collect();
        match limit {
            Some(n) if n < filtered.len() => filtered[filtered.len() - n..].to_vec(),
            _ => filtered,
        }
    }

    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let n = entries.len();
        entries.clear();
        n
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn push_and_query_filters_by_channel() {
        let log = MessageLog::new();
        log.push("scene:ready".into(), vec![json!("a")]).await;
        log.push("build:done".into(), vec![json!("b")]).await;
        log.push("scene:ready".into(), vec![json!("c")]).await;

        assert_eq!(log.len().await, 3);
        let scene = log.query(Some("scene:ready"), None).await;
        assert_eq!(scene.len(), 2);
        assert_eq!(scene[1].args, vec![json!("c")]);

        let limited = log.query(None, Some(1)).await;
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].channel, "scene:ready");
    }

    #[tokio::test]
    async fn overflow_trims_to_half() {
        let log = MessageLog::new();
        for i in 0..MAX_ENTRIES {
            log.push("ch".into(), vec![json!(i)]).await;
        }
        assert_eq!(log.len().await, MAX_ENTRIES);

        // the push that would exceed the cap trims the oldest half first
        log.push("ch".into(), vec![json!(MAX_ENTRIES)]).await;
        assert_eq!(log.len().await, TRIM_TO + 1);

        let all = log.query(None, None).await;
        assert_eq!(all.last().unwrap().args, vec![json!(MAX_ENTRIES)]);
        // oldest surviving entry is the one after the trim cut
        assert_eq!(all.first().unwrap().args, vec![json!(MAX_ENTRIES - TRIM_TO)]);
    }

    #[tokio::test]
    async fn clear_reports_dropped_count() {
        let log = MessageLog::new();
        log.push("ch".into(), vec![]).await;
        log.push("ch".into(), vec![]).await;
        assert_eq!(log.clear().await, 2);
        assert_eq!(log.len().await, 0);
    }
}
