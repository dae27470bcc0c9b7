//! Project MCP tools.
//!
//! Tools for browsing projects and creating, updating, and transitioning
//! posts (Dooray project tasks).

use crate::client::project::{
    CreatePostRequest, CreatePostUser, CreatePostUsers, PostListParams, ProjectListParams,
    UpdatePostRequest,
};
use crate::client::types::PostBody;
use crate::client::DoorayClient;
use crate::envelope::{
    check_header, optional_str, optional_str_list, optional_u32, require_str, require_str_list,
    success, ToolFailure,
};
use crate::server::{McpServerResult, Tool};
use crate::types::{ToolDefinition, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

const DEFAULT_PRIORITY: &str = "none";

fn recipients(member_ids: &[String]) -> Vec<CreatePostUser> {
    member_ids
        .iter()
        .map(|id| CreatePostUser::member(id.clone()))
        .collect()
}

/// List projects the account belongs to.
pub struct ListProjectsTool {
    client: Arc<DoorayClient>,
}

impl ListProjectsTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let params = ProjectListParams {
            page: optional_u32(args, "page"),
            size: optional_u32(args, "size"),
            kind: optional_str(args, "type"),
            scope: optional_str(args, "scope"),
            state: optional_str(args, "state"),
        };

        let response = self.client.list_projects(&params).await?;
        check_header(&response.header)?;

        let count = response.result.len();
        success(
            &response.result,
            format!("Successfully fetched {count} projects"),
        )
    }
}

#[async_trait]
impl Tool for ListProjectsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_project_list_projects",
            "List the Dooray projects the account is a member of. Use this to find a project ID by code.",
        )
        .with_category("project")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "page": {
                    "type": "number",
                    "description": "Page number to fetch (0-based)"
                },
                "size": {
                    "type": "number",
                    "description": "Results per page (default: 20)"
                },
                "type": {
                    "type": "string",
                    "description": "Project type filter, e.g. 'public' or 'private'"
                },
                "scope": {
                    "type": "string",
                    "description": "Project scope filter"
                },
                "state": {
                    "type": "string",
                    "description": "Project state filter, e.g. 'active' or 'archived'"
                }
            }
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_project_list_projects"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// List posts of a project with optional filters.
pub struct ListPostsTool {
    client: Arc<DoorayClient>,
}

impl ListPostsTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let project_id = require_str(args, "project_id")?;

        let params = PostListParams {
            page: optional_u32(args, "page"),
            size: optional_u32(args, "size"),
            from_member_ids: optional_str_list(args, "from_member_ids"),
            to_member_ids: optional_str_list(args, "to_member_ids"),
            cc_member_ids: optional_str_list(args, "cc_member_ids"),
            tag_ids: optional_str_list(args, "tag_ids"),
            parent_post_id: optional_str(args, "parent_post_id"),
            post_number: optional_str(args, "post_number"),
            post_workflow_classes: optional_str_list(args, "post_workflow_classes"),
            post_workflow_ids: optional_str_list(args, "post_workflow_ids"),
            milestone_ids: optional_str_list(args, "milestone_ids"),
            subjects: optional_str(args, "subjects"),
            created_at: optional_str(args, "created_at"),
            updated_at: optional_str(args, "updated_at"),
            due_at: optional_str(args, "due_at"),
            order: optional_str(args, "order"),
        };

        let response = self.client.list_posts(&project_id, &params).await?;
        check_header(&response.header)?;

        let count = response.result.len();
        success(
            &response.result,
            format!("Successfully fetched {count} posts"),
        )
    }
}

#[async_trait]
impl Tool for ListPostsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_project_list_posts",
            "List the posts (tasks) of a Dooray project. Supports filtering by members, tags, workflow, milestone, and dates.",
        )
        .with_category("project")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "project_id": {
                    "type": "string",
                    "description": "Dooray project ID"
                },
                "page": {"type": "number", "description": "Page number to fetch (0-based)"},
                "size": {"type": "number", "description": "Results per page"},
                "from_member_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Filter by sender member IDs"
                },
                "to_member_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Filter by assignee member IDs"
                },
                "cc_member_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Filter by cc'd member IDs"
                },
                "tag_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Filter by tag IDs"
                },
                "parent_post_id": {"type": "string", "description": "Filter by parent post"},
                "post_number": {"type": "string", "description": "Filter by post number"},
                "post_workflow_classes": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Filter by workflow class: registered, working, closed"
                },
                "post_workflow_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Filter by workflow IDs"
                },
                "milestone_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Filter by milestone IDs"
                },
                "subjects": {"type": "string", "description": "Filter by subject text"},
                "created_at": {"type": "string", "description": "Creation date range filter"},
                "updated_at": {"type": "string", "description": "Update date range filter"},
                "due_at": {"type": "string", "description": "Due date range filter"},
                "order": {"type": "string", "description": "Sort order, e.g. 'createdAt' or '-createdAt'"}
            },
            "required": ["project_id"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_project_list_posts"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// Fetch a single post with its body and attachments.
pub struct GetPostTool {
    client: Arc<DoorayClient>,
}

impl GetPostTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let project_id = require_str(args, "project_id")?;
        let post_id = require_str(args, "post_id")?;

        let response = self.client.get_post(&project_id, &post_id).await?;
        check_header(&response.header)?;

        let subject = response.result.subject.clone();
        success(
            &response.result,
            format!("Successfully fetched post '{subject}'"),
        )
    }
}

#[async_trait]
impl Tool for GetPostTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_project_get_post",
            "Fetch a single Dooray post (task), including its body and attachments.",
        )
        .with_category("project")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "project_id": {
                    "type": "string",
                    "description": "Dooray project ID"
                },
                "post_id": {
                    "type": "string",
                    "description": "Post ID (retrievable via dooray_project_list_posts)"
                }
            },
            "required": ["project_id", "post_id"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_project_get_post"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// Create a new post.
pub struct CreatePostTool {
    client: Arc<DoorayClient>,
}

impl CreatePostTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let project_id = require_str(args, "project_id")?;
        let subject = require_str(args, "subject")?;
        let body = require_str(args, "body")?;
        let to_member_ids = require_str_list(args, "to_member_ids")?;
        if subject.trim().is_empty() {
            return Err(ToolFailure::validation(
                "EMPTY_SUBJECT",
                "subject must not be blank",
            ));
        }

        let request = CreatePostRequest {
            parent_post_id: optional_str(args, "parent_post_id"),
            users: CreatePostUsers {
                to: recipients(&to_member_ids),
                cc: optional_str_list(args, "cc_member_ids")
                    .map(|ids| recipients(&ids))
                    .unwrap_or_default(),
            },
            subject: subject.clone(),
            body: PostBody::markdown(body),
            due_date: optional_str(args, "due_date"),
            due_date_flag: true,
            milestone_id: optional_str(args, "milestone_id"),
            tag_ids: optional_str_list(args, "tag_ids").unwrap_or_default(),
            priority: optional_str(args, "priority").unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
        };

        let response = self.client.create_post(&project_id, &request).await?;
        check_header(&response.header)?;

        success(
            &response.result,
            format!("Successfully created post '{subject}'"),
        )
    }
}

#[async_trait]
impl Tool for CreatePostTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_project_create_post",
            "Create a new Dooray post (task) assigned to one or more members.",
        )
        .with_category("project")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "project_id": {
                    "type": "string",
                    "description": "Dooray project ID"
                },
                "subject": {
                    "type": "string",
                    "description": "Title of the new post"
                },
                "body": {
                    "type": "string",
                    "description": "Content of the new post (markdown)"
                },
                "to_member_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Organization member IDs to assign the post to"
                },
                "cc_member_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Organization member IDs to cc (optional)"
                },
                "parent_post_id": {"type": "string", "description": "Parent post ID (optional)"},
                "due_date": {"type": "string", "description": "Due date, ISO 8601 (optional)"},
                "milestone_id": {"type": "string", "description": "Milestone ID (optional)"},
                "tag_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Tag IDs (optional)"
                },
                "priority": {
                    "type": "string",
                    "description": "Priority: highest, high, normal, low, lowest, or none (default)"
                }
            },
            "required": ["project_id", "subject", "body", "to_member_ids"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_project_create_post"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// Update an existing post.
pub struct UpdatePostTool {
    client: Arc<DoorayClient>,
}

impl UpdatePostTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let project_id = require_str(args, "project_id")?;
        let post_id = require_str(args, "post_id")?;
        let subject = require_str(args, "subject")?;
        let body = require_str(args, "body")?;
        let to_member_ids = require_str_list(args, "to_member_ids")?;

        let request = UpdatePostRequest {
            users: CreatePostUsers {
                to: recipients(&to_member_ids),
                cc: optional_str_list(args, "cc_member_ids")
                    .map(|ids| recipients(&ids))
                    .unwrap_or_default(),
            },
            subject: subject.clone(),
            body: PostBody::markdown(body),
            version: args.get("version").and_then(Value::as_i64),
            due_date: optional_str(args, "due_date"),
            due_date_flag: true,
            milestone_id: optional_str(args, "milestone_id"),
            tag_ids: optional_str_list(args, "tag_ids").unwrap_or_default(),
            priority: optional_str(args, "priority").unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
        };

        let response = self
            .client
            .update_post(&project_id, &post_id, &request)
            .await?;
        check_header(&response.header)?;

        success(
            &json!({
                "project_id": project_id,
                "post_id": post_id,
                "subject": subject,
                "updated": true
            }),
            format!("Successfully updated post '{subject}'"),
        )
    }
}

#[async_trait]
impl Tool for UpdatePostTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_project_update_post",
            "Update an existing Dooray post (task). Subject, body, and recipients are replaced as supplied.",
        )
        .with_category("project")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "project_id": {"type": "string", "description": "Dooray project ID"},
                "post_id": {"type": "string", "description": "Post ID to update"},
                "subject": {"type": "string", "description": "New title"},
                "body": {"type": "string", "description": "New content (markdown)"},
                "to_member_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Organization member IDs to assign the post to"
                },
                "cc_member_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Organization member IDs to cc (optional)"
                },
                "version": {"type": "number", "description": "Post version for optimistic locking (optional)"},
                "due_date": {"type": "string", "description": "Due date, ISO 8601 (optional)"},
                "milestone_id": {"type": "string", "description": "Milestone ID (optional)"},
                "tag_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Tag IDs (optional)"
                },
                "priority": {
                    "type": "string",
                    "description": "Priority: highest, high, normal, low, lowest, or none (default)"
                }
            },
            "required": ["project_id", "post_id", "subject", "body", "to_member_ids"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_project_update_post"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// Transition the workflow state of a post.
pub struct SetPostWorkflowTool {
    client: Arc<DoorayClient>,
}

impl SetPostWorkflowTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let project_id = require_str(args, "project_id")?;
        let post_id = require_str(args, "post_id")?;
        let workflow_id = require_str(args, "workflow_id")?;

        let response = self
            .client
            .set_post_workflow(&project_id, &post_id, &workflow_id)
            .await?;
        check_header(&response.header)?;

        success(
            &json!({
                "project_id": project_id,
                "post_id": post_id,
                "workflow_id": workflow_id,
                "updated": true
            }),
            "Successfully changed the post workflow state",
        )
    }
}

#[async_trait]
impl Tool for SetPostWorkflowTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_project_set_post_workflow",
            "Change the workflow state of a Dooray post for all assignees.",
        )
        .with_category("project")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "project_id": {"type": "string", "description": "Dooray project ID"},
                "post_id": {"type": "string", "description": "Post ID to transition"},
                "workflow_id": {"type": "string", "description": "Target workflow ID"}
            },
            "required": ["project_id", "post_id", "workflow_id"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_project_set_post_workflow"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// Transition the workflow state of a post for a single assignee.
pub struct UpdatePostUserWorkflowTool {
    client: Arc<DoorayClient>,
}

impl UpdatePostUserWorkflowTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let project_id = require_str(args, "project_id")?;
        let post_id = require_str(args, "post_id")?;
        let organization_member_id = require_str(args, "organization_member_id")?;
        let workflow_id = require_str(args, "workflow_id")?;

        let response = self
            .client
            .update_post_user_workflow(&project_id, &post_id, &organization_member_id, &workflow_id)
            .await?;
        check_header(&response.header)?;

        success(
            &json!({
                "project_id": project_id,
                "post_id": post_id,
                "organization_member_id": organization_member_id,
                "workflow_id": workflow_id,
                "updated": true
            }),
            "Successfully changed the assignee's workflow state",
        )
    }
}

#[async_trait]
impl Tool for UpdatePostUserWorkflowTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_project_update_post_user_workflow",
            "Change the workflow state of a Dooray post for one specific assignee.",
        )
        .with_category("project")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "project_id": {"type": "string", "description": "Dooray project ID"},
                "post_id": {"type": "string", "description": "Post ID to transition"},
                "organization_member_id": {
                    "type": "string",
                    "description": "Assignee whose state changes"
                },
                "workflow_id": {"type": "string", "description": "Target workflow ID"}
            },
            "required": ["project_id", "post_id", "organization_member_id", "workflow_id"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_project_update_post_user_workflow"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// Mark a post as done.
pub struct SetPostDoneTool {
    client: Arc<DoorayClient>,
}

impl SetPostDoneTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let project_id = require_str(args, "project_id")?;
        let post_id = require_str(args, "post_id")?;

        let response = self.client.set_post_done(&project_id, &post_id).await?;
        check_header(&response.header)?;

        success(
            &json!({
                "project_id": project_id,
                "post_id": post_id,
                "done": true
            }),
            "Successfully marked the post as done",
        )
    }
}

#[async_trait]
impl Tool for SetPostDoneTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_project_set_post_done",
            "Mark a Dooray post (task) as done.",
        )
        .with_category("project")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "project_id": {"type": "string", "description": "Dooray project ID"},
                "post_id": {"type": "string", "description": "Post ID to complete"}
            },
            "required": ["project_id", "post_id"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_project_set_post_done"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// Set the parent of a post.
pub struct SetPostParentTool {
    client: Arc<DoorayClient>,
}

impl SetPostParentTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let project_id = require_str(args, "project_id")?;
        let post_id = require_str(args, "post_id")?;
        let parent_post_id = require_str(args, "parent_post_id")?;

        let response = self
            .client
            .set_post_parent(&project_id, &post_id, &parent_post_id)
            .await?;
        check_header(&response.header)?;

        success(
            &json!({
                "project_id": project_id,
                "post_id": post_id,
                "parent_post_id": parent_post_id,
                "updated": true
            }),
            "Successfully set the parent post",
        )
    }
}

#[async_trait]
impl Tool for SetPostParentTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_project_set_post_parent",
            "Set the parent post of a Dooray post, making it a subtask.",
        )
        .with_category("project")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "project_id": {"type": "string", "description": "Dooray project ID"},
                "post_id": {"type": "string", "description": "Post ID to re-parent"},
                "parent_post_id": {"type": "string", "description": "New parent post ID"}
            },
            "required": ["project_id", "post_id", "parent_post_id"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_project_set_post_parent"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// All project tools, sharing one client.
pub fn project_tools(client: &Arc<DoorayClient>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ListProjectsTool::new(client.clone())),
        Arc::new(ListPostsTool::new(client.clone())),
        Arc::new(GetPostTool::new(client.clone())),
        Arc::new(CreatePostTool::new(client.clone())),
        Arc::new(UpdatePostTool::new(client.clone())),
        Arc::new(SetPostWorkflowTool::new(client.clone())),
        Arc::new(UpdatePostUserWorkflowTool::new(client.clone())),
        Arc::new(SetPostDoneTool::new(client.clone())),
        Arc::new(SetPostParentTool::new(client.clone())),
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
    fn test_project_tool_definitions() {
        let tools = project_tools(&test_client());
        assert_eq!(tools.len(), 9);

        let names: Vec<_> = tools.iter().map(|t| t.definition().name).collect();
        assert!(names.contains(&"dooray_project_list_posts".to_string()));
        assert!(names.contains(&"dooray_project_update_post_user_workflow".to_string()));
    }

    #[tokio::test]
    async fn test_missing_project_id_short_circuits() {
        let tool = ListPostsTool::new(test_client());
        let result = tool.execute(json!({})).await.unwrap();
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("MISSING_PROJECT_ID"));
    }

    #[tokio::test]
    async fn test_create_post_requires_recipients() {
        let tool = CreatePostTool::new(test_client());
        let result = tool
            .execute(json!({
                "project_id": "p1",
                "subject": "task",
                "body": "details"
            }))
            .await
            .unwrap();
        assert!(result.is_error);
        assert!(result
            .first_text()
            .unwrap()
            .contains("MISSING_TO_MEMBER_IDS"));
    }

    #[tokio::test]
    async fn test_set_workflow_requires_workflow_id() {
        let tool = SetPostWorkflowTool::new(test_client());
        let result = tool
            .execute(json!({"project_id": "p1", "post_id": "t1"}))
            .await
            .unwrap();
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("MISSING_WORKFLOW_ID"));
    }
}
