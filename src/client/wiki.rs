//! Wiki operations (`/wiki/v1`).
//!
//! Listing and reading pages return typed results; the field-scoped update
//! endpoints (title, content, referrers) signal success through the header
//! alone and use the nullable path.

use super::types::{Creator, Member, DoorayResponse, DoorayUnitResponse, MIME_MARKDOWN};
use super::{with_query, ApiResult, DoorayClient, Query};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

/// A wiki visible to the authenticated member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wiki {
    pub id: String,
    pub project: WikiProject,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<WikiHome>,
}

/// Project owning a wiki.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiProject {
    pub id: String,
}

/// Home page reference of a wiki.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiHome {
    pub page_id: String,
}

/// Wiki page summary, as returned by listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiPage {
    pub id: String,
    pub wiki_id: String,
    pub version: i64,
    pub root: bool,
    pub creator: Creator,
    pub subject: String,
}

/// Body of a wiki page; content may be absent on summary reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiPageBody {
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl WikiPageBody {
    pub fn markdown(content: impl Into<String>) -> Self {
        Self {
            mime_type: MIME_MARKDOWN.to_string(),
            content: Some(content.into()),
        }
    }
}

/// Full wiki page detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiPageDetail {
    pub id: String,
    pub wiki_id: String,
    pub version: i64,
    pub root: bool,
    pub creator: Creator,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<WikiPageBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_page_id: Option<String>,
}

/// Request to create a wiki page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWikiPageRequest {
    pub subject: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_page_id: Option<String>,
}

/// Result of creating a wiki page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedWikiPage {
    pub id: String,
    pub wiki_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_page_id: Option<String>,
    pub version: i64,
}

/// Request to update a wiki page; only the supplied fields change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWikiPageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<WikiPageBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_page_id: Option<String>,
}

/// A member referenced by a wiki page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiReferrer {
    #[serde(rename = "type")]
    pub kind: String,
    pub member: Member,
}

impl WikiReferrer {
    /// Referrer entry for an organization member.
    pub fn member(organization_member_id: impl Into<String>) -> Self {
        Self {
            kind: "member".to_string(),
            member: Member::new(organization_member_id),
        }
    }
}

impl DoorayClient {
    /// List wikis accessible to the authenticated member.
    #[instrument(skip(self))]
    pub async fn list_wikis(
        &self,
        page: Option<u32>,
        size: Option<u32>,
    ) -> ApiResult<DoorayResponse<Vec<Wiki>>> {
        let mut query = Query::new();
        query.push_opt("page", page.as_ref());
        query.push_opt("size", size.as_ref());

        self.execute(
            "GET /wiki/v1/wikis",
            StatusCode::OK,
            with_query(self.get("/wiki/v1/wikis"), &query),
        )
        .await
    }

    /// List wiki pages of a project, optionally scoped to a parent page.
    #[instrument(skip(self))]
    pub async fn list_wiki_pages(
        &self,
        project_id: &str,
        parent_page_id: Option<&str>,
    ) -> ApiResult<DoorayResponse<Vec<WikiPage>>> {
        let path = format!("/wiki/v1/wikis/{project_id}/pages");
        let mut query = Query::new();
        if let Some(parent_page_id) = parent_page_id {
            query.push("parentPageId", parent_page_id);
        }

        self.execute(
            &format!("GET {path}"),
            StatusCode::OK,
            with_query(self.get(&path), &query),
        )
        .await
    }

    /// Fetch a single wiki page.
    #[instrument(skip(self))]
    pub async fn get_wiki_page(
        &self,
        project_id: &str,
        page_id: &str,
    ) -> ApiResult<DoorayResponse<WikiPageDetail>> {
        let path = format!("/wiki/v1/wikis/{project_id}/pages/{page_id}");
        self.execute(&format!("GET {path}"), StatusCode::OK, self.get(&path))
            .await
    }

    /// Create a wiki page. The remote replies 201 Created.
    #[instrument(skip(self, request))]
    pub async fn create_wiki_page(
        &self,
        wiki_id: &str,
        request: &CreateWikiPageRequest,
    ) -> ApiResult<DoorayResponse<CreatedWikiPage>> {
        let path = format!("/wiki/v1/wikis/{wiki_id}/pages");
        self.execute(
            &format!("POST {path}"),
            StatusCode::CREATED,
            self.post(&path).json(request),
        )
        .await
    }

    /// Update a wiki page (subject, body, and/or parent page).
    #[instrument(skip(self, request))]
    pub async fn update_wiki_page(
        &self,
        wiki_id: &str,
        page_id: &str,
        request: &UpdateWikiPageRequest,
    ) -> ApiResult<DoorayResponse<WikiPageDetail>> {
        let path = format!("/wiki/v1/wikis/{wiki_id}/pages/{page_id}");
        self.execute(
            &format!("PUT {path}"),
            StatusCode::OK,
            self.put(&path).json(request),
        )
        .await
    }

    /// Update only the title of a wiki page.
    #[instrument(skip(self, subject))]
    pub async fn update_wiki_page_title(
        &self,
        wiki_id: &str,
        page_id: &str,
        subject: &str,
    ) -> ApiResult<DoorayUnitResponse> {
        let path = format!("/wiki/v1/wikis/{wiki_id}/pages/{page_id}/title");
        self.execute_unit(
            &format!("PUT {path}"),
            StatusCode::OK,
            self.put(&path).json(&json!({ "subject": subject })),
        )
        .await
    }

    /// Update only the content of a wiki page (markdown).
    #[instrument(skip(self, body))]
    pub async fn update_wiki_page_content(
        &self,
        wiki_id: &str,
        page_id: &str,
        body: &str,
    ) -> ApiResult<DoorayUnitResponse> {
        let path = format!("/wiki/v1/wikis/{wiki_id}/pages/{page_id}/content");
        self.execute_unit(
            &format!("PUT {path}"),
            StatusCode::OK,
            self.put(&path).json(&json!({
                "body": { "mimeType": MIME_MARKDOWN, "content": body }
            })),
        )
        .await
    }

    /// Replace the referrer list of a wiki page.
    #[instrument(skip(self, referrers))]
    pub async fn update_wiki_page_referrers(
        &self,
        wiki_id: &str,
        page_id: &str,
        referrers: &[WikiReferrer],
    ) -> ApiResult<DoorayUnitResponse> {
        let path = format!("/wiki/v1/wikis/{wiki_id}/pages/{page_id}/referrers");
        self.execute_unit(
            &format!("PUT {path}"),
            StatusCode::OK,
            self.put(&path).json(&json!({ "referrers": referrers })),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wiki_page_wire_shape() {
        let raw = r#"{
            "id": "page1",
            "wikiId": "wiki1",
            "version": 3,
            "root": false,
            "creator": {"type": "member", "member": {"organizationMemberId": "m1"}},
            "subject": "Release notes"
        }"#;
        let page: WikiPage = serde_json::from_str(raw).unwrap();
        assert_eq!(page.wiki_id, "wiki1");
        assert_eq!(page.creator.member.organization_member_id, "m1");
    }

    #[test]
    fn test_create_request_omits_absent_parent() {
        let request = CreateWikiPageRequest {
            subject: "title".to_string(),
            body: "content".to_string(),
            parent_page_id: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("parentPageId").is_none());
    }

    #[test]
    fn test_referrer_member() {
        let referrer = WikiReferrer::member("m42");
        let json = serde_json::to_value(&referrer).unwrap();
        assert_eq!(json["type"], "member");
        assert_eq!(json["member"]["organizationMemberId"], "m42");
    }

    #[test]
    fn test_update_request_only_serializes_supplied_fields() {
        let request = UpdateWikiPageRequest {
            subject: Some("new title".to_string()),
            body: None,
            parent_page_id: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["subject"], "new title");
        assert!(json.get("body").is_none());
    }
}
