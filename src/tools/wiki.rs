//! Wiki MCP tools.
//!
//! Tools for browsing and editing Dooray wiki pages. Each tool validates its
//! named arguments, performs one wiki operation through the shared client,
//! and renders the outcome as a tool envelope.

use crate::client::wiki::{CreateWikiPageRequest, UpdateWikiPageRequest, WikiPageBody, WikiReferrer};
use crate::client::DoorayClient;
use crate::envelope::{
    check_header, optional_str, optional_u32, require_str, require_str_list, success, ToolFailure,
};
use crate::server::{McpServerResult, Tool};
use crate::types::{ToolDefinition, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

/// List wikis accessible to the authenticated member.
pub struct ListWikisTool {
    client: Arc<DoorayClient>,
}

impl ListWikisTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let page = optional_u32(args, "page");
        let size = optional_u32(args, "size");

        let response = self.client.list_wikis(page, size).await?;
        check_header(&response.header)?;

        let count = response.result.len();
        success(
            &response.result,
            format!("Successfully fetched the wiki list ({count} wikis)"),
        )
    }
}

#[async_trait]
impl Tool for ListWikisTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_wiki_list_projects",
            "List the Dooray wikis the account can access. Use this to find a wiki ID by name.",
        )
        .with_category("wiki")
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
                }
            }
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_wiki_list_projects"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// List wiki pages of a project, optionally below a parent page.
pub struct ListWikiPagesTool {
    client: Arc<DoorayClient>,
}

impl ListWikiPagesTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let project_id = require_str(args, "project_id")?;
        let parent_page_id = optional_str(args, "parent_page_id");

        let response = self
            .client
            .list_wiki_pages(&project_id, parent_page_id.as_deref())
            .await?;
        check_header(&response.header)?;

        let count = response.result.len();
        let message = if parent_page_id.is_some() {
            format!("Successfully fetched {count} child wiki pages")
        } else {
            format!("Successfully fetched {count} wiki pages")
        };
        success(&response.result, message)
    }
}

#[async_trait]
impl Tool for ListWikiPagesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_wiki_list_pages",
            "List the wiki pages of a project. Pass parent_page_id to list the children of a page instead of the top-level pages.",
        )
        .with_category("wiki")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "project_id": {
                    "type": "string",
                    "description": "Dooray project ID"
                },
                "parent_page_id": {
                    "type": "string",
                    "description": "Parent page ID (optional; omit to list top-level pages)"
                }
            },
            "required": ["project_id"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_wiki_list_pages"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// Fetch a single wiki page with its content.
pub struct GetWikiPageTool {
    client: Arc<DoorayClient>,
}

impl GetWikiPageTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let project_id = require_str(args, "project_id")?;
        let page_id = require_str(args, "page_id")?;

        let response = self.client.get_wiki_page(&project_id, &page_id).await?;
        check_header(&response.header)?;

        let subject = response.result.subject.clone();
        success(
            &response.result,
            format!("Successfully fetched wiki page '{subject}'"),
        )
    }
}

#[async_trait]
impl Tool for GetWikiPageTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_wiki_get_page",
            "Fetch a single Dooray wiki page, including its body content.",
        )
        .with_category("wiki")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "project_id": {
                    "type": "string",
                    "description": "Dooray project ID"
                },
                "page_id": {
                    "type": "string",
                    "description": "Wiki page ID (retrievable via dooray_wiki_list_pages)"
                }
            },
            "required": ["project_id", "page_id"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_wiki_get_page"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// Create a new wiki page.
pub struct CreateWikiPageTool {
    client: Arc<DoorayClient>,
}

impl CreateWikiPageTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let wiki_id = require_str(args, "wiki_id")?;
        let subject = require_str(args, "subject")?;
        let body = require_str(args, "body")?;
        if subject.trim().is_empty() {
            return Err(ToolFailure::validation(
                "EMPTY_SUBJECT",
                "subject must not be blank",
            ));
        }

        let request = CreateWikiPageRequest {
            subject: subject.clone(),
            body,
            parent_page_id: optional_str(args, "parent_page_id"),
        };

        let response = self.client.create_wiki_page(&wiki_id, &request).await?;
        check_header(&response.header)?;

        success(
            &response.result,
            format!("Successfully created wiki page '{subject}'"),
        )
    }
}

#[async_trait]
impl Tool for CreateWikiPageTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_wiki_create_page",
            "Create a new Dooray wiki page. The body supports markdown.",
        )
        .with_category("wiki")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "wiki_id": {
                    "type": "string",
                    "description": "Wiki ID (retrievable via dooray_wiki_list_projects)"
                },
                "subject": {
                    "type": "string",
                    "description": "Title of the new page"
                },
                "body": {
                    "type": "string",
                    "description": "Content of the new page (markdown)"
                },
                "parent_page_id": {
                    "type": "string",
                    "description": "Parent page ID (optional; omit to create at the top level)"
                }
            },
            "required": ["wiki_id", "subject", "body"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_wiki_create_page"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// Update subject, body, and/or parent of a wiki page in one call.
pub struct UpdateWikiPageTool {
    client: Arc<DoorayClient>,
}

impl UpdateWikiPageTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let wiki_id = require_str(args, "wiki_id")?;
        let page_id = require_str(args, "page_id")?;
        let subject = optional_str(args, "subject");
        let body = optional_str(args, "body");
        let parent_page_id = optional_str(args, "parent_page_id");

        if subject.is_none() && body.is_none() && parent_page_id.is_none() {
            return Err(ToolFailure::validation(
                "NO_UPDATE_CONTENT",
                "Nothing to update: provide at least one of subject, body, or parent_page_id",
            ));
        }

        let mut updated_fields = Vec::new();
        if subject.is_some() {
            updated_fields.push("subject");
        }
        if body.is_some() {
            updated_fields.push("content");
        }
        if parent_page_id.is_some() {
            updated_fields.push("parent page");
        }

        let request = UpdateWikiPageRequest {
            subject,
            body: body.map(WikiPageBody::markdown),
            parent_page_id,
        };

        let response = self
            .client
            .update_wiki_page(&wiki_id, &page_id, &request)
            .await?;
        check_header(&response.header)?;

        let subject = response.result.subject.clone();
        success(
            &response.result,
            format!(
                "Successfully updated {} of wiki page '{subject}'",
                updated_fields.join(", ")
            ),
        )
    }
}

#[async_trait]
impl Tool for UpdateWikiPageTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_wiki_update_page",
            "Update an existing Dooray wiki page. Any combination of subject, body, and parent page can be changed.",
        )
        .with_category("wiki")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "wiki_id": {
                    "type": "string",
                    "description": "Wiki ID (retrievable via dooray_wiki_list_projects)"
                },
                "page_id": {
                    "type": "string",
                    "description": "Wiki page ID to update"
                },
                "subject": {
                    "type": "string",
                    "description": "New title (optional)"
                },
                "body": {
                    "type": "string",
                    "description": "New content in markdown (optional)"
                },
                "parent_page_id": {
                    "type": "string",
                    "description": "New parent page ID (optional)"
                }
            },
            "required": ["wiki_id", "page_id"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_wiki_update_page"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// Update only the title of a wiki page.
pub struct UpdateWikiPageTitleTool {
    client: Arc<DoorayClient>,
}

impl UpdateWikiPageTitleTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let wiki_id = require_str(args, "wiki_id")?;
        let page_id = require_str(args, "page_id")?;
        let subject = require_str(args, "subject")?;
        if subject.trim().is_empty() {
            return Err(ToolFailure::validation(
                "EMPTY_SUBJECT",
                "subject must not be blank",
            ));
        }

        let response = self
            .client
            .update_wiki_page_title(&wiki_id, &page_id, &subject)
            .await?;
        check_header(&response.header)?;

        success(
            &json!({
                "wiki_id": wiki_id,
                "page_id": page_id,
                "new_subject": subject,
                "updated": true
            }),
            format!("Successfully updated the wiki page title to '{subject}'"),
        )
    }
}

#[async_trait]
impl Tool for UpdateWikiPageTitleTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_wiki_update_page_title",
            "Update only the title of a Dooray wiki page, leaving the content untouched.",
        )
        .with_category("wiki")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "wiki_id": {
                    "type": "string",
                    "description": "Wiki ID (retrievable via dooray_wiki_list_projects)"
                },
                "page_id": {
                    "type": "string",
                    "description": "Wiki page ID to update"
                },
                "subject": {
                    "type": "string",
                    "description": "New page title"
                }
            },
            "required": ["wiki_id", "page_id", "subject"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_wiki_update_page_title"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// Update only the content of a wiki page.
pub struct UpdateWikiPageContentTool {
    client: Arc<DoorayClient>,
}

impl UpdateWikiPageContentTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let wiki_id = require_str(args, "wiki_id")?;
        let page_id = require_str(args, "page_id")?;
        let body = require_str(args, "body")?;

        let response = self
            .client
            .update_wiki_page_content(&wiki_id, &page_id, &body)
            .await?;
        check_header(&response.header)?;

        success(
            &json!({
                "wiki_id": wiki_id,
                "page_id": page_id,
                "updated": true
            }),
            "Successfully updated the wiki page content",
        )
    }
}

#[async_trait]
impl Tool for UpdateWikiPageContentTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_wiki_update_page_content",
            "Replace the content of a Dooray wiki page, leaving the title untouched.",
        )
        .with_category("wiki")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "wiki_id": {
                    "type": "string",
                    "description": "Wiki ID (retrievable via dooray_wiki_list_projects)"
                },
                "page_id": {
                    "type": "string",
                    "description": "Wiki page ID to update"
                },
                "body": {
                    "type": "string",
                    "description": "New page content (markdown)"
                }
            },
            "required": ["wiki_id", "page_id", "body"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_wiki_update_page_content"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// Replace the referrer list of a wiki page.
pub struct UpdateWikiPageReferrersTool {
    client: Arc<DoorayClient>,
}

impl UpdateWikiPageReferrersTool {
    pub fn new(client: Arc<DoorayClient>) -> Self {
        Self { client }
    }

    async fn run(&self, args: &Value) -> Result<ToolResult, ToolFailure> {
        let wiki_id = require_str(args, "wiki_id")?;
        let page_id = require_str(args, "page_id")?;
        let member_ids = require_str_list(args, "referrer_member_ids")?;

        let referrers: Vec<WikiReferrer> = member_ids
            .iter()
            .map(|id| WikiReferrer::member(id.clone()))
            .collect();

        let response = self
            .client
            .update_wiki_page_referrers(&wiki_id, &page_id, &referrers)
            .await?;
        check_header(&response.header)?;

        let count = referrers.len();
        success(
            &json!({
                "wiki_id": wiki_id,
                "page_id": page_id,
                "referrer_count": count,
                "updated": true
            }),
            format!("Successfully updated wiki page referrers ({count} members)"),
        )
    }
}

#[async_trait]
impl Tool for UpdateWikiPageReferrersTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "dooray_wiki_update_page_referrers",
            "Replace the referrer member list of a Dooray wiki page.",
        )
        .with_category("wiki")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "wiki_id": {
                    "type": "string",
                    "description": "Wiki ID (retrievable via dooray_wiki_list_projects)"
                },
                "page_id": {
                    "type": "string",
                    "description": "Wiki page ID to update"
                },
                "referrer_member_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Organization member IDs to set as referrers"
                }
            },
            "required": ["wiki_id", "page_id", "referrer_member_ids"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "dooray_wiki_update_page_referrers"))]
    async fn execute(&self, args: Value) -> McpServerResult<ToolResult> {
        Ok(self.run(&args).await.unwrap_or_else(ToolFailure::into_result))
    }
}

/// All wiki tools, sharing one client.
pub fn wiki_tools(client: &Arc<DoorayClient>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ListWikisTool::new(client.clone())),
        Arc::new(ListWikiPagesTool::new(client.clone())),
        Arc::new(GetWikiPageTool::new(client.clone())),
        Arc::new(CreateWikiPageTool::new(client.clone())),
        Arc::new(UpdateWikiPageTool::new(client.clone())),
        Arc::new(UpdateWikiPageTitleTool::new(client.clone())),
        Arc::new(UpdateWikiPageContentTool::new(client.clone())),
        Arc::new(UpdateWikiPageReferrersTool::new(client.clone())),
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
    fn test_wiki_tool_definitions() {
        let tools = wiki_tools(&test_client());
        assert_eq!(tools.len(), 8);

        let names: Vec<_> = tools.iter().map(|t| t.definition().name).collect();
        assert!(names.contains(&"dooray_wiki_list_projects".to_string()));
        assert!(names.contains(&"dooray_wiki_update_page_referrers".to_string()));
    }

    #[test]
    fn test_required_args_in_schema() {
        let tool = GetWikiPageTool::new(test_client());
        let schema = tool.definition().input_schema;
        let required: Vec<_> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        assert_eq!(required, vec!["project_id", "page_id"]);
    }

    #[tokio::test]
    async fn test_missing_wiki_id_short_circuits() {
        let tool = CreateWikiPageTool::new(test_client());
        let result = tool
            .execute(json!({"subject": "s", "body": "b"}))
            .await
            .unwrap();
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("MISSING_WIKI_ID"));
    }

    #[tokio::test]
    async fn test_blank_subject_rejected() {
        let tool = UpdateWikiPageTitleTool::new(test_client());
        let result = tool
            .execute(json!({"wiki_id": "w1", "page_id": "p1", "subject": "   "}))
            .await
            .unwrap();
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("EMPTY_SUBJECT"));
    }

    #[tokio::test]
    async fn test_update_without_fields_rejected() {
        let tool = UpdateWikiPageTool::new(test_client());
        let result = tool
            .execute(json!({"wiki_id": "w1", "page_id": "p1"}))
            .await
            .unwrap();
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("NO_UPDATE_CONTENT"));
    }
}
