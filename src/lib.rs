//! # Dooray MCP
//!
//! An MCP (Model Context Protocol) server exposing the Dooray! collaboration
//! suite REST API as typed tools.
//!
//! ## Overview
//!
//! The crate handles:
//! - **Client**: one shared HTTP client issuing authenticated calls against
//!   the Dooray API and classifying every outcome into a typed result
//! - **Tools**: one tool per remote capability, each validating its named
//!   arguments and rendering a uniform success/error envelope
//! - **Server**: a tool registry behind a JSON-RPC 2.0 stdio loop
//!
//! ## Available Tools
//!
//! ### Wiki
//! - `dooray_wiki_list_projects`: list accessible wikis
//! - `dooray_wiki_list_pages`: list pages of a project (or children of a page)
//! - `dooray_wiki_get_page`: fetch a page with its content
//! - `dooray_wiki_create_page`: create a page
//! - `dooray_wiki_update_page`: update subject/body/parent in one call
//! - `dooray_wiki_update_page_title` / `_content` / `_referrers`: field-scoped updates
//!
//! ### Project
//! - `dooray_project_list_projects`: list projects the account belongs to
//! - `dooray_project_list_posts`: list posts (tasks) with filters
//! - `dooray_project_get_post`: fetch a post
//! - `dooray_project_create_post` / `_update_post`: create and update posts
//! - `dooray_project_set_post_workflow` / `_update_post_user_workflow`:
//!   workflow transitions (for all assignees / for one assignee)
//! - `dooray_project_set_post_done` / `_set_post_parent`: state mutations
//!
//! ### Comment
//! - `dooray_project_create_post_comment`, `_list_post_comments`,
//!   `_get_post_comment`, `_update_post_comment`, `_delete_post_comment`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dooray_mcp::{all_tools, DoorayClient, DoorayConfig, McpServer};
//! use std::sync::Arc;
//!
//! async fn serve() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DoorayConfig::from_env()?;
//!     let client = Arc::new(DoorayClient::new(&config));
//!
//!     let server = McpServer::dooray();
//!     server.register_tools(all_tools(&client)).await;
//!     server.run_stdio().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod envelope;
pub mod server;
pub mod tools;
pub mod types;

// Re-export main types
pub use client::{ApiError, ApiResult, DoorayClient};
pub use config::{ConfigError, DoorayConfig};
pub use envelope::{ToolErrorKind, ToolFailure};
pub use server::{McpServer, McpServerError, McpServerResult, Tool};
pub use types::{
    ContentBlock, McpError, McpRequest, McpResponse, RequestId, ServerCapabilities, ServerInfo,
    ToolCall, ToolDefinition, ToolResult,
};

// Re-export tool collections
pub use tools::{all_tools, comment_tools, project_tools, wiki_tools};
