//! Record emission with join context
//!
//! Package and errata listings are scoped to a host. Each record is wrapped
//! together with the host's id and name on its way to the consumer; the
//! record itself is never modified.

use crate::error::Result;
use crate::pagination::RecordStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

/// Parent host fields attached to scoped records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinContext {
    pub host_id: i64,
    /// Unknown when the caller scoped the listing by id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
}

impl JoinContext {
    pub fn new(host_id: i64, host_name: impl Into<String>) -> Self {
        Self {
            host_id,
            host_name: Some(host_name.into()),
        }
    }

    pub fn id_only(host_id: i64) -> Self {
        Self {
            host_id,
            host_name: None,
        }
    }
}

/// A record plus the optional scope it was listed under.
///
/// Serializes flat: `host_id` and `host_name` appear next to the record's
/// own fields, and are omitted for unscoped listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scoped<T> {
    #[serde(flatten)]
    pub record: T,
    #[serde(flatten)]
    pub join: Option<JoinContext>,
}

impl<T> Scoped<T> {
    /// Unwrap the record
    pub fn into_inner(self) -> T {
        self.record
    }

    /// Host id of the scope, if any
    pub fn host_id(&self) -> Option<i64> {
        self.join.as_ref().map(|j| j.host_id)
    }
}

/// Wraps each record of a listing with its join context
#[derive(Debug, Clone, Default)]
pub struct StreamingSink {
    join: Option<JoinContext>,
}

impl StreamingSink {
    pub fn new(join: Option<JoinContext>) -> Self {
        Self { join }
    }

    /// Sink for a listing without parent scope
    pub fn unscoped() -> Self {
        Self::default()
    }

    pub fn join(&self) -> Option<&JoinContext> {
        self.join.as_ref()
    }

    /// Compose one record with the join context
    pub fn emit<T>(&self, record: T) -> Scoped<T> {
        Scoped {
            record,
            join: self.join.clone(),
        }
    }

    /// Apply [`emit`](Self::emit) to every record of a stream, in order
    pub fn attach<T: Send + 'static>(self, records: RecordStream<T>) -> RecordStream<Scoped<T>> {
        Box::pin(records.map(move |item: Result<T>| item.map(|record| self.emit(record))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Package {
        id: u64,
        nvra: String,
    }

    fn package(id: u64) -> Package {
        Package {
            id,
            nvra: format!("pkg-{id}-1.0-1.x86_64"),
        }
    }

    #[test]
    fn test_emit_attaches_context() {
        let sink = StreamingSink::new(Some(JoinContext::new(7, "web01")));
        let scoped = sink.emit(package(1));

        assert_eq!(scoped.record, package(1));
        assert_eq!(scoped.host_id(), Some(7));
        assert_eq!(
            sink.join().and_then(|j| j.host_name.as_deref()),
            Some("web01")
        );
    }

    #[test]
    fn test_scoped_serializes_flat() {
        let sink = StreamingSink::new(Some(JoinContext::new(7, "web01")));
        let value = serde_json::to_value(sink.emit(package(1))).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 1,
                "nvra": "pkg-1-1.0-1.x86_64",
                "host_id": 7,
                "host_name": "web01"
            })
        );
    }

    #[test]
    fn test_id_only_omits_name() {
        let sink = StreamingSink::new(Some(JoinContext::id_only(9)));
        let value = serde_json::to_value(sink.emit(package(3))).unwrap();
        assert_eq!(
            value,
            json!({"id": 3, "nvra": "pkg-3-1.0-1.x86_64", "host_id": 9})
        );
    }

    #[test]
    fn test_unscoped_omits_join_fields() {
        let value = serde_json::to_value(StreamingSink::unscoped().emit(package(2))).unwrap();
        assert_eq!(value, json!({"id": 2, "nvra": "pkg-2-1.0-1.x86_64"}));
    }

    #[tokio::test]
    async fn test_attach_preserves_order_and_errors() {
        let items: Vec<Result<Package>> = vec![
            Ok(package(1)),
            Ok(package(2)),
            Err(Error::decode("bad record")),
        ];
        let records: RecordStream<Package> = Box::pin(futures::stream::iter(items));

        let sink = StreamingSink::new(Some(JoinContext::new(3, "db01")));
        let out: Vec<Result<Scoped<Package>>> = sink.attach(records).collect().await;

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].as_ref().unwrap().record.id, 1);
        assert_eq!(out[1].as_ref().unwrap().record.id, 2);
        assert!(out[2].is_err());
    }

    #[test]
    fn test_attach_empty_stream() {
        let records: RecordStream<Package> = Box::pin(futures::stream::empty());
        let out: Vec<Result<Scoped<Package>>> =
            tokio_test::block_on(StreamingSink::unscoped().attach(records).collect());
        assert!(out.is_empty());
    }
}
