//! Comment MCP tools.
//!
//! Tools for reading and writing comments on Dooray posts.

use crate::client::comment::CommentListParams;
use crate::client::DoorayClient;
use crate::envelope::{
    check_header, optional_str, optional_u32, require_str, success, ToolFailure,
};
use crate::server::{McpServerResult, Tool};
use crate::types::{ToolDefinition, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

/// Add a comment to a post.
pub struct CreatePostCommentTool {
    client: Arc<DoorayClient>,
}

impl CreatePostCommentTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let project_id = require_str(args, "project_id")?;
        let post_id = require_str(args, "post_id")?;
        let content = require_str(args, "content")?;
        if content.trim().is_empty() {
            return Err(ToolFailure::validation(
                "EMPTY_CONTENT",
                "content must not be blank",
            ));
        }

        let response = self
            .client
            .create_post_comment(&project_id, &post_id, &content)
            .await?;
        check_header(&response.header)?;

        success(
            &response.result,
            "Successfully added a comment to the post",
        )
    }
}

#[async_trait]
impl Tool for CreatePostCommentTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_project_create_post_comment",
            "Add a comment to a Dooray post (task). The content supports markdown.",
        )
        .with_category("comment")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "project_id": {"type": "string", "description": "Dooray project ID"},
                "post_id": {"type": "string", "description": "Post ID to comment on"},
                "content": {"type": "string", "description": "Comment content (markdown)"}
            },
            "required": ["project_id", "post_id", "content"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_project_create_post_comment"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// List comments on a post.
pub struct ListPostCommentsTool {
    client: Arc<DoorayClient>,
}

impl ListPostCommentsTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let project_id = require_str(args, "project_id")?;
        let post_id = require_str(args, "post_id")?;

        let params = CommentListParams {
            page: optional_u32(args, "page"),
            size: optional_u32(args, "size"),
            order: optional_str(args, "order"),
        };

        let response = self
            .client
            .list_post_comments(&project_id, &post_id, &params)
            .await?;
        check_header(&response.header)?;

        let count = response.result.len();
        success(
            &response.result,
            format!("Successfully fetched {count} comments"),
        )
    }
}

#[async_trait]
impl Tool for ListPostCommentsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_project_list_post_comments",
            "List the comments on a Dooray post (task).",
        )
        .with_category("comment")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "project_id": {"type": "string", "description": "Dooray project ID"},
                "post_id": {"type": "string", "description": "Post ID whose comments to list"},
                "page": {"type": "number", "description": "Page number to fetch (0-based)"},
                "size": {"type": "number", "description": "Results per page"},
                "order": {
                    "type": "string",
                    "description": "Sort order: 'createdAt' or '-createdAt'"
                }
            },
            "required": ["project_id", "post_id"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_project_list_post_comments"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// Fetch a single comment.
pub struct GetPostCommentTool {
    client: Arc<DoorayClient>,
}

impl GetPostCommentTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let project_id = require_str(args, "project_id")?;
        let post_id = require_str(args, "post_id")?;
        let comment_id = require_str(args, "comment_id")?;

        let response = self
            .client
            .get_post_comment(&project_id, &post_id, &comment_id)
            .await?;
        check_header(&response.header)?;

        success(&response.result, "Successfully fetched the comment")
    }
}

#[async_trait]
impl Tool for GetPostCommentTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_project_get_post_comment",
            "Fetch a single comment on a Dooray post.",
        )
        .with_category("comment")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "project_id": {"type": "string", "description": "Dooray project ID"},
                "post_id": {"type": "string", "description": "Post ID the comment belongs to"},
                "comment_id": {
                    "type": "string",
                    "description": "Comment ID (retrievable via dooray_project_list_post_comments)"
                }
            },
            "required": ["project_id", "post_id", "comment_id"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_project_get_post_comment"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// Replace the content of a comment.
pub struct UpdatePostCommentTool {
    client: Arc<DoorayClient>,
}

impl UpdatePostCommentTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let project_id = require_str(args, "project_id")?;
        let post_id = require_str(args, "post_id")?;
        let comment_id = require_str(args, "comment_id")?;
        let content = require_str(args, "content")?;
        if content.trim().is_empty() {
            return Err(ToolFailure::validation(
                "EMPTY_CONTENT",
                "content must not be blank",
            ));
        }

        let response = self
            .client
            .update_post_comment(&project_id, &post_id, &comment_id, &content)
            .await?;
        check_header(&response.header)?;

        success(
            &json!({
                "project_id": project_id,
                "post_id": post_id,
                "comment_id": comment_id,
                "updated": true
            }),
            "Successfully updated the comment",
        )
    }
}

#[async_trait]
impl Tool for UpdatePostCommentTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_project_update_post_comment",
            "Replace the content of a comment on a Dooray post.",
        )
        .with_category("comment")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "project_id": {"type": "string", "description": "Dooray project ID"},
                "post_id": {"type": "string", "description": "Post ID the comment belongs to"},
                "comment_id": {"type": "string", "description": "Comment ID to update"},
                "content": {"type": "string", "description": "New comment content (markdown)"}
            },
            "required": ["project_id", "post_id", "comment_id", "content"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_project_update_post_comment"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// Delete a comment.
pub struct DeletePostCommentTool {
    client: Arc<DoorayClient>,
}

impl DeletePostCommentTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let project_id = require_str(args, "project_id")?;
        let post_id = require_str(args, "post_id")?;
        let comment_id = require_str(args, "comment_id")?;

        let header = self
            .client
            .delete_post_comment(&project_id, &post_id, &comment_id)
            .await?;
        check_header(&header)?;

        success(
            &json!({
                "project_id": project_id,
                "post_id": post_id,
                "comment_id": comment_id,
                "deleted": true
            }),
            "Successfully deleted the comment",
        )
    }
}

#[async_trait]
impl Tool for DeletePostCommentTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_project_delete_post_comment",
            "Delete a comment from a Dooray post.",
        )
        .with_category("comment")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "project_id": {"type": "string", "description": "Dooray project ID"},
                "post_id": {"type": "string", "description": "Post ID the comment belongs to"},
                "comment_id": {"type": "string", "description": "Comment ID to delete"}
            },
            "required": ["project_id", "post_id", "comment_id"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_project_delete_post_comment"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// All comment tools, sharing one client.
pub fn comment_tools(client: &Arc<DoorayClient>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(CreatePostCommentTool::new(client.clone())),
        Arc::new(ListPostCommentsTool::new(client.clone())),
        Arc::new(GetPostCommentTool::new(client.clone())),
        Arc::new(UpdatePostCommentTool::new(client.clone())),
        Arc::new(DeletePostCommentTool::new(client.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DoorayConfig;

    fn test_client() -> Arc<DoorayClient> {
        Arc::new(DoorayClient::new(&DoorayConfig::new(
            "http://localhost:9",
            "test-key",
        )))
    }

    #[test]
    fn test_comment_tool_definitions() {
        let tools = comment_tools(&test_client());
        assert_eq!(tools.len(), 5);
    }

    #[tokio::test]
    async fn test_missing_comment_id_short_circuits() {
        let tool = DeletePostCommentTool::new(test_client());
        let result = tool
            .execute(json!({"project_id": "p1", "post_id": "t1"}))
            .await
            .unwrap();
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("MISSING_COMMENT_ID"));
    }

    #[tokio::test]
    async fn test_blank_content_rejected() {
        let tool = CreatePostCommentTool::new(test_client());
        let result = tool
            .execute(json!({"project_id": "p1", "post_id": "t1", "content": ""}))
            .await
            .unwrap();
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("EMPTY_CONTENT"));
    }
}
