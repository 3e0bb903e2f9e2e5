//! Content API wire format
//!
//! Request bodies and response envelopes of the query, doc and mutate
//! endpoints, kept apart from the client so they can be checked offline.

use serde::Deserialize;
use serde_json::{json, Value};

use scenewright_core::{Document, DocumentFields, DocumentId, DocumentSummary};

/// Scene list query; `$type` is bound as a query parameter
pub const LIST_QUERY: &str = "*[_type == $type]|order(_updatedAt desc){_id, title, content}";

/// A document as the content API returns it
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl From<RemoteDocument> for Document {
    fn from(remote: RemoteDocument) -> Self {
        Document::new(
            remote.id,
            remote.title.unwrap_or_default(),
            remote.content.unwrap_or_default(),
        )
    }
}

impl From<RemoteDocument> for DocumentSummary {
    fn from(remote: RemoteDocument) -> Self {
        Document::from(remote).into()
    }
}

/// `GET /data/query/{dataset}`
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub result: Vec<RemoteDocument>,
}

/// `GET /data/doc/{dataset}/{id}`
#[derive(Debug, Deserialize)]
pub struct DocResponse {
    #[serde(default)]
    pub documents: Vec<RemoteDocument>,
}

/// `POST /data/mutate/{dataset}`
#[derive(Debug, Deserialize)]
pub struct MutateResponse {
    #[serde(default)]
    pub results: Vec<MutationResult>,
}

#[derive(Debug, Deserialize)]
pub struct MutationResult {
    pub id: String,
    #[serde(default)]
    pub document: Option<RemoteDocument>,
}

pub fn create_mutation(document_type: &str, title: &str, content: &str) -> Value {
    json!({
        "mutations": [{
            "create": {
                "_type": document_type,
                "title": title,
                "content": content,
            }
        }]
    })
}

pub fn patch_mutation(id: &DocumentId, fields: &DocumentFields) -> Value {
    json!({
        "mutations": [{
            "patch": {
                "id": id.as_str(),
                "set": {
                    "title": fields.title,
                    "content": fields.content,
                }
            }
        }]
    })
}

pub fn delete_mutation(id: &DocumentId) -> Value {
    json!({
        "mutations": [{
            "delete": { "id": id.as_str() }
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_response_tolerates_null_fields() {
        let body = r#"{
            "ms": 4,
            "query": "...",
            "result": [
                {"_id": "a", "title": "Prologue", "content": "<p>x</p>"},
                {"_id": "b", "title": null}
            ]
        }"#;
        let response: QueryResponse = serde_json::from_str(body).unwrap();
        let summaries: Vec<DocumentSummary> = response.result.into_iter().map(Into::into).collect();

        assert_eq!(summaries[0].title, "Prologue");
        assert_eq!(summaries[1].id, DocumentId::from("b"));
        assert_eq!(summaries[1].display_title(), "Untitled");
        assert!(summaries[1].content.is_empty());
    }

    #[test]
    fn test_mutate_response_with_document() {
        let body = r#"{
            "transactionId": "t1",
            "results": [{
                "id": "new-id",
                "operation": "create",
                "document": {"_id": "new-id", "_type": "novelContent", "title": "Untitled", "content": ""}
            }]
        }"#;
        let response: MutateResponse = serde_json::from_str(body).unwrap();
        let document: Document = response.results.into_iter().next().unwrap().document.unwrap().into();

        assert_eq!(document, Document::new("new-id", "Untitled", ""));
    }

    #[test]
    fn test_patch_sets_both_fields() {
        let body = patch_mutation(
            &DocumentId::from("a"),
            &DocumentFields::new("Prelude", "<p>hi</p>"),
        );
        let patch = &body["mutations"][0]["patch"];

        assert_eq!(patch["id"], "a");
        assert_eq!(patch["set"]["title"], "Prelude");
        assert_eq!(patch["set"]["content"], "<p>hi</p>");
    }

    #[test]
    fn test_create_and_delete_shapes() {
        let create = create_mutation("novelContent", "Untitled", "");
        assert_eq!(create["mutations"][0]["create"]["_type"], "novelContent");
        assert_eq!(create["mutations"][0]["create"]["content"], "");

        let delete = delete_mutation(&DocumentId::from("gone"));
        assert_eq!(delete["mutations"][0]["delete"]["id"], "gone");
    }
}
