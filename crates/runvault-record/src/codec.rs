//! Blob codec for persisted records.
//!
//! Records are stored as JSON blobs. Encoding is deterministic (struct
//! field order, BTreeMap key order) and decoding tolerates both absent
//! and unknown fields, so blobs written by older or newer versions of
//! the schema remain readable.

use crate::record::Record;

/// Errors raised while converting a record to or from its stored blob.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
  /// Failed to serialize a record.
  #[error("failed to encode record: {source}")]
  Encode {
    #[source]
    source: serde_json::Error,
  },

  /// The stored blob could not be parsed back into a record.
  #[error("failed to decode record: {source}")]
  Decode {
    #[source]
    source: serde_json::Error,
  },
}

/// Serialize a record into its stored blob form.
pub fn encode(record: &Record) -> Result<Vec<u8>, CodecError> {
  serde_json::to_vec(record).map_err(|source| CodecError::Encode { source })
}

/// Parse a stored blob back into a record.
pub fn decode(data: &[u8]) -> Result<Record, CodecError> {
  serde_json::from_slice(data).map_err(|source| CodecError::Decode { source })
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;
  use crate::record::{Execution, TaskRun};

  fn sample_record() -> Record {
    let mut record = Record {
      name: "9f2c1c1e-8a77-4c7e-9d3c-0b1a2c3d4e5f".to_string(),
      created_time: Some(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()),
      ..Record::default()
    };
    record
      .annotations
      .insert("team".to_string(), "platform".to_string());
    record.executions.push(Execution::TaskRun(TaskRun {
      api_version: "v1beta1".to_string(),
      kind: "TaskRun".to_string(),
      ..TaskRun::default()
    }));
    record
  }

  #[test]
  fn encode_decode_round_trip() {
    let record = sample_record();
    let blob = encode(&record).unwrap();
    let decoded = decode(&blob).unwrap();
    assert_eq!(record, decoded);
  }

  #[test]
  fn encode_is_deterministic() {
    let record = sample_record();
    assert_eq!(encode(&record).unwrap(), encode(&record).unwrap());
  }

  #[test]
  fn decode_tolerates_unknown_fields() {
    let blob = br#"{"name":"abc","future_field":42,"annotations":{"a":"b"}}"#;
    let record = decode(blob).unwrap();
    assert_eq!(record.name, "abc");
    assert_eq!(record.annotations.get("a").map(String::as_str), Some("b"));
    assert!(record.executions.is_empty());
  }

  #[test]
  fn decode_tolerates_unknown_execution_kind() {
    let blob = br#"{"name":"abc","executions":[{"type":"pipeline_run"}]}"#;
    let record = decode(blob).unwrap();
    assert_eq!(record.executions, vec![Execution::Unknown]);
  }

  #[test]
  fn decode_rejects_malformed_blob() {
    assert!(matches!(
      decode(b"not json"),
      Err(CodecError::Decode { .. })
    ));
  }
}
