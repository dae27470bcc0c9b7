//! Post comment operations (`/project/v1/.../logs`).
//!
//! Comments are "post logs" on the wire. Delete is the one operation in the
//! surface that expects 204 No Content and always takes the bodiless path.

use super::types::{Creator, DoorayHeader, DoorayResponse, DoorayUnitResponse, PostBody, MIME_MARKDOWN};
use super::{with_query, ApiResult, DoorayClient, Query};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

/// Post reference embedded in a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRef {
    pub id: String,
}

/// A comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostComment {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<PostRef>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Creator>,
    pub body: PostBody,
}

/// Result of creating a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedComment {
    pub id: String,
}

/// Filters for listing comments.
#[derive(Debug, Clone, Default)]
pub struct CommentListParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub order: Option<String>,
}

impl DoorayClient {
    /// Add a comment to a post.
    #[instrument(skip(self, content))]
    pub async fn create_post_comment(
        &self,
        project_id: &str,
        post_id: &str,
        content: &str,
    ) -> ApiResult<DoorayResponse<CreatedComment>> {
        let path = format!("/project/v1/projects/{project_id}/posts/{post_id}/logs");
        self.execute(
            &format!("POST {path}"),
            StatusCode::OK,
            self.post(&path).json(&json!({
                "body": { "mimeType": MIME_MARKDOWN, "content": content }
            })),
        )
        .await
    }

    /// List comments on a post.
    #[instrument(skip(self, params))]
    pub async fn list_post_comments(
        &self,
        project_id: &str,
        post_id: &str,
        params: &CommentListParams,
    ) -> ApiResult<DoorayResponse<Vec<PostComment>>> {
        let path = format!("/project/v1/projects/{project_id}/posts/{post_id}/logs");
        let mut query = Query::new();
        query.push_opt("page", params.page.as_ref());
        query.push_opt("size", params.size.as_ref());
        query.push_opt("order", params.order.as_ref());

        self.execute(
            &format!("GET {path}"),
            StatusCode::OK,
            with_query(self.get(&path), &query),
        )
        .await
    }

    /// Fetch a single comment.
    #[instrument(skip(self))]
    pub async fn get_post_comment(
        &self,
        project_id: &str,
        post_id: &str,
        log_id: &str,
    ) -> ApiResult<DoorayResponse<PostComment>> {
        let path = format!("/project/v1/projects/{project_id}/posts/{post_id}/logs/{log_id}");
        self.execute(&format!("GET {path}"), StatusCode::OK, self.get(&path))
            .await
    }

    /// Replace the content of a comment.
    #[instrument(skip(self, content))]
    pub async fn update_post_comment(
        &self,
        project_id: &str,
        post_id: &str,
        log_id: &str,
        content: &str,
    ) -> ApiResult<DoorayUnitResponse> {
        let path = format!("/project/v1/projects/{project_id}/posts/{post_id}/logs/{log_id}");
        self.execute_unit(
            &format!("PUT {path}"),
            StatusCode::OK,
            self.put(&path).json(&json!({
                "body": { "mimeType": MIME_MARKDOWN, "content": content }
            })),
        )
        .await
    }

    /// Delete a comment. Expects 204 and ignores any body the remote sends.
    #[instrument(skip(self))]
    pub async fn delete_post_comment(
        &self,
        project_id: &str,
        post_id: &str,
        log_id: &str,
    ) -> ApiResult<DoorayHeader> {
        let path = format!("/project/v1/projects/{project_id}/posts/{post_id}/logs/{log_id}");
        self.execute_no_body(
            &format!("DELETE {path}"),
            StatusCode::NO_CONTENT,
            self.delete(&path),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_wire_shape() {
        let raw = r#"{
            "id": "log1",
            "post": {"id": "post1"},
            "type": "comment",
            "subtype": "general",
            "createdAt": "2024-03-01T10:00:00+09:00",
            "creator": {"type": "member", "member": {"organizationMemberId": "m1"}},
            "body": {"mimeType": "text/x-markdown", "content": "LGTM"}
        }"#;
        let comment: PostComment = serde_json::from_str(raw).unwrap();
        assert_eq!(comment.kind, "comment");
        assert_eq!(comment.body.content, "LGTM");
        assert_eq!(comment.post.unwrap().id, "post1");
    }

    #[test]
    fn test_comment_tolerates_sparse_fields() {
        let raw = r#"{
            "id": "log2",
            "type": "comment",
            "body": {"mimeType": "text/html", "content": "<p>hi</p>"}
        }"#;
        let comment: PostComment = serde_json::from_str(raw).unwrap();
        assert!(comment.creator.is_none());
        assert!(comment.modified_at.is_none());
    }
}
