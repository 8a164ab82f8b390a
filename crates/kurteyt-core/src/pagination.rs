//! Opaque pagination cursors.
//!
//! A cursor is the URL-safe base64 encoding of a small JSON document
//! describing where the next page starts:
//!
//! ```json
//! {"lastEvaluatedKey": {"PK": "abc12345"}, "limit": 100, "projectionExpression": null}
//! ```

use crate::error::{CoreError, Result};
use crate::repository::PageRequest;
use crate::short_id::ShortId;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the partition key attribute in the record store.
pub const PARTITION_KEY: &str = "PK";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationCursor {
    pub last_evaluated_key: BTreeMap<String, String>,
    pub limit: u32,
    pub projection_expression: Option<String>,
}

impl PaginationCursor {
    /// A cursor resuming after `id` with the given page size.
    pub fn after(id: &ShortId, limit: u32) -> Self {
        Self {
            last_evaluated_key: BTreeMap::from([(
                PARTITION_KEY.to_string(),
                id.as_str().to_string(),
            )]),
            limit,
            projection_expression: None,
        }
    }

    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)
            .map_err(|e| CoreError::InvalidCursor(format!("failed to serialize cursor: {e}")))?;
        Ok(URL_SAFE.encode(json))
    }

    pub fn decode(cursor: &str) -> Result<Self> {
        let bytes = URL_SAFE
            .decode(cursor.as_bytes())
            .map_err(|e| CoreError::InvalidCursor(format!("cursor is not base64: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| CoreError::InvalidCursor(format!("cursor is not valid json: {e}")))
    }

    /// Turns the cursor into a scan request for the next page.
    pub fn to_page_request(&self) -> Result<PageRequest> {
        let start_after = self
            .last_evaluated_key
            .get(PARTITION_KEY)
            .map(|pk| ShortId::new(pk.as_str()))
            .transpose()
            .map_err(|e| CoreError::InvalidCursor(e.to_string()))?;

        Ok(PageRequest {
            limit: self.limit,
            start_after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_inverts_encode() {
        let cursors = [
            PaginationCursor::after(&ShortId::new_unchecked("abc12345"), 100),
            PaginationCursor {
                last_evaluated_key: BTreeMap::from([
                    ("PK".to_string(), "zz".to_string()),
                    ("SK".to_string(), "SHORTURL#zz".to_string()),
                ]),
                limit: 10,
                projection_expression: Some("PK, TargetUrl".to_string()),
            },
            PaginationCursor {
                last_evaluated_key: BTreeMap::new(),
                limit: 0,
                projection_expression: Some(String::new()),
            },
        ];

        for cursor in cursors {
            let encoded = cursor.encode().unwrap();
            assert_eq!(PaginationCursor::decode(&encoded).unwrap(), cursor);
        }
    }

    #[test]
    fn encoded_cursor_is_url_safe_json() {
        let cursor = PaginationCursor::after(&ShortId::new_unchecked("abc12345"), 50);
        let encoded = cursor.encode().unwrap();
        assert!(!encoded.contains('+') && !encoded.contains('/'));

        let json: serde_json::Value =
            serde_json::from_slice(&URL_SAFE.decode(&encoded).unwrap()).unwrap();
        assert_eq!(json["lastEvaluatedKey"]["PK"], "abc12345");
        assert_eq!(json["limit"], 50);
        assert!(json["projectionExpression"].is_null());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            PaginationCursor::decode("not base64!"),
            Err(CoreError::InvalidCursor(_))
        ));
        let not_json = URL_SAFE.encode(b"hello");
        assert!(matches!(
            PaginationCursor::decode(&not_json),
            Err(CoreError::InvalidCursor(_))
        ));
    }

    #[test]
    fn page_request_reads_partition_key() {
        let cursor = PaginationCursor::after(&ShortId::new_unchecked("abc12345"), 25);
        let request = cursor.to_page_request().unwrap();
        assert_eq!(request.limit, 25);
        assert_eq!(request.start_after, Some(ShortId::new_unchecked("abc12345")));

        let bad = PaginationCursor {
            last_evaluated_key: BTreeMap::from([(PARTITION_KEY.to_string(), "a/b".to_string())]),
            limit: 25,
            projection_expression: None,
        };
        assert!(bad.to_page_request().is_err());
    }
}
