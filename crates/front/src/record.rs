use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A post, as exchanged with the backend.
///
/// `id` and `date` are assigned by the backend and left empty on submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    /// Backend-assigned identifier.
    #[serde(rename = "ID")]
    pub id: String,

    /// Title of the post.
    #[serde(rename = "Title")]
    pub title: String,

    /// Body of the post.
    #[serde(rename = "Content")]
    pub content: String,

    /// Backend-assigned creation date.
    #[serde(rename = "Date")]
    pub date: String,
}

impl Record {
    /// Creates a new submission with only the user-provided fields set.
    #[must_use]
    pub fn submission(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Serializes the record for publishing.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the record cannot be encoded.
    pub fn to_bytes(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }

    /// Decodes a fetch reply. A `null` reply is an empty collection.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error if the reply is not a JSON array of records.
    pub fn decode_collection(reply: &[u8]) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_slice::<Option<Vec<Self>>>(reply).map(Option::unwrap_or_default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_wire_format() {
        let bytes = Record::submission("Hello", "World").to_bytes().unwrap();

        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "ID": "", "Title": "Hello", "Content": "World", "Date": "" })
        );
    }

    #[test]
    fn test_empty_submission_is_allowed() {
        let record = Record::submission("", "");

        assert_eq!(record, Record::default());
        assert!(record.to_bytes().is_ok());
    }

    #[test]
    fn test_decode_collection_keeps_order() {
        let reply = br#"[
            {"ID": "2", "Title": "Second", "Content": "b", "Date": "2024-01-02"},
            {"ID": "1", "Title": "First", "Content": "a", "Date": "2024-01-01"}
        ]"#;

        let records = Record::decode_collection(reply).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "2");
        assert_eq!(records[1].title, "First");
    }

    #[test]
    fn test_decode_collection_fills_missing_fields() {
        let records = Record::decode_collection(br#"[{"Title": "Only a title"}]"#).unwrap();

        assert_eq!(
            records,
            vec![Record {
                title: "Only a title".to_string(),
                ..Record::default()
            }]
        );
    }

    #[test]
    fn test_decode_empty_and_null_collections() {
        assert!(Record::decode_collection(b"[]").unwrap().is_empty());
        assert!(Record::decode_collection(b"null").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(Record::decode_collection(b"not json").is_err());
        assert!(Record::decode_collection(br#"{"Title": "not a list"}"#).is_err());
        assert!(Record::decode_collection(b"").is_err());
    }
}
