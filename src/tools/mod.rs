//! Dooray MCP tools.
//!
//! One module per remote domain. Every tool holds the shared client and is
//! constructed once at startup.

pub mod comment;
pub mod project;
pub mod wiki;

pub use comment::comment_tools;
pub use project::project_tools;
pub use wiki::wiki_tools;

use crate::client::DoorayClient;
use crate::server::Tool;
use std::sync::Arc;

/// Get all available MCP tools wired to the given client.
///
/// - Wiki: list/read/create/update pages, field-scoped title/content/referrer updates
/// - Project: list projects and posts, create/update posts, workflow transitions
/// - Comment: CRUD on post comments
pub fn all_tools(client: &Arc<DoorayClient>) -> Vec<Arc<dyn Tool>> {
    let mut tools = Vec::new();

    // Wiki tools (8)
    tools.extend(wiki_tools(client));

    // Project tools (9)
    tools.extend(project_tools(client));

    // Comment tools (5)
    tools.extend(comment_tools(client));

    tools
}
