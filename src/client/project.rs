//! Project and post operations (`/project/v1`).
//!
//! Posts are Dooray's project tasks. Listing supports a wide filter surface
//! whose optional and collection parameters follow the query-encoding
//! contract in [`super::Query`]. The state-transition endpoints
//! (set-workflow, set-done, set-parent-post, per-user workflow) signal
//! success through the header alone.

use super::types::{DoorayResponse, DoorayUnitResponse, Member, PostBody};
use super::{with_query, ApiResult, DoorayClient, Query};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A user reachable by email rather than membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailUser {
    pub email_address: String,
    pub name: String,
}

/// A project member group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub project_member_group_id: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

/// A participant of a post: member, email user, or group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUser {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_user: Option<EmailUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Group>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Workflow>,
}

/// Sender and recipients of a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostUsers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<PostUser>,
    #[serde(default)]
    pub to: Vec<PostUser>,
    #[serde(default)]
    pub cc: Vec<PostUser>,
}

/// A project visible to the authenticated member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Project reference embedded in a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: String,
    pub code: String,
}

/// Parent post reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentPost {
    pub id: String,
    pub number: String,
    pub subject: String,
}

/// Milestone reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub name: String,
}

/// Tag reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
}

/// Workflow state of a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
}

/// Attachment metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFile {
    pub id: String,
    pub name: String,
    pub size: i64,
}

/// Post summary, as returned by the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub subject: String,
    pub project: ProjectInfo,
    pub task_number: String,
    pub closed: bool,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date_flag: Option<bool>,
    pub number: i64,
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentPost>,
    pub workflow_class: String,
    pub workflow: Workflow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<Milestone>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub users: PostUsers,
}

/// Full post detail, including the body and attachments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub id: String,
    pub subject: String,
    pub project: ProjectInfo,
    pub task_number: String,
    pub closed: bool,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date_flag: Option<bool>,
    pub number: i64,
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentPost>,
    pub workflow_class: String,
    pub workflow: Workflow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<Milestone>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub body: PostBody,
    pub users: PostUsers,
    #[serde(default)]
    pub files: Vec<PostFile>,
}

/// Recipient of a post under creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostUser {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_user: Option<EmailUser>,
}

impl CreatePostUser {
    /// Recipient entry for an organization member.
    pub fn member(organization_member_id: impl Into<String>) -> Self {
        Self {
            kind: "member".to_string(),
            member: Some(Member::new(organization_member_id)),
            email_user: None,
        }
    }
}

/// Recipients of a post under creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostUsers {
    pub to: Vec<CreatePostUser>,
    #[serde(default)]
    pub cc: Vec<CreatePostUser>,
}

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_post_id: Option<String>,
    pub users: CreatePostUsers,
    pub subject: String,
    pub body: PostBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub due_date_flag: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    pub priority: String,
}

/// Request to update a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub users: CreatePostUsers,
    pub subject: String,
    pub body: PostBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub due_date_flag: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    pub priority: String,
}

/// Result of creating a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedPost {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SetWorkflowRequest<'a> {
    workflow_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SetParentPostRequest<'a> {
    parent_post_id: &'a str,
}

/// Filters for listing projects.
#[derive(Debug, Clone, Default)]
pub struct ProjectListParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub kind: Option<String>,
    pub scope: Option<String>,
    pub state: Option<String>,
}

/// Filters for listing posts. Absent scalars and absent-or-empty collections
/// are omitted from the query string entirely.
#[derive(Debug, Clone, Default)]
pub struct PostListParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub from_member_ids: Option<Vec<String>>,
    pub to_member_ids: Option<Vec<String>>,
    pub cc_member_ids: Option<Vec<String>>,
    pub tag_ids: Option<Vec<String>>,
    pub parent_post_id: Option<String>,
    pub post_number: Option<String>,
    pub post_workflow_classes: Option<Vec<String>>,
    pub post_workflow_ids: Option<Vec<String>>,
    pub milestone_ids: Option<Vec<String>>,
    pub subjects: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub due_at: Option<String>,
    pub order: Option<String>,
}

impl PostListParams {
    fn to_query(&self) -> Query {
        let mut query = Query::new();
        query.push_opt("page", self.page.as_ref());
        query.push_opt("size", self.size.as_ref());
        query.push_list("fromMemberIds", self.from_member_ids.as_deref());
        query.push_list("toMemberIds", self.to_member_ids.as_deref());
        query.push_list("ccMemberIds", self.cc_member_ids.as_deref());
        query.push_list("tagIds", self.tag_ids.as_deref());
        query.push_opt("parentPostId", self.parent_post_id.as_ref());
        query.push_opt("postNumber", self.post_number.as_ref());
        query.push_list("postWorkflowClasses", self.post_workflow_classes.as_deref());
        query.push_list("postWorkflowIds", self.post_workflow_ids.as_deref());
        query.push_list("milestoneIds", self.milestone_ids.as_deref());
        query.push_opt("subjects", self.subjects.as_ref());
        query.push_opt("createdAt", self.created_at.as_ref());
        query.push_opt("updatedAt", self.updated_at.as_ref());
        query.push_opt("dueAt", self.due_at.as_ref());
        query.push_opt("order", self.order.as_ref());
        query
    }
}

impl DoorayClient {
    /// List projects the authenticated member belongs to.
    #[instrument(skip(self, params))]
    pub async fn list_projects(
        &self,
        params: &ProjectListParams,
    ) -> ApiResult<DoorayResponse<Vec<Project>>> {
        let mut query = Query::new();
        query.push("member", "me");
        query.push_opt("page", params.page.as_ref());
        query.push_opt("size", params.size.as_ref());
        query.push_opt("type", params.kind.as_ref());
        query.push_opt("scope", params.scope.as_ref());
        query.push_opt("state", params.state.as_ref());

        self.execute(
            "GET /project/v1/projects",
            StatusCode::OK,
            with_query(self.get("/project/v1/projects"), &query),
        )
        .await
    }

    /// List posts of a project, filtered.
    #[instrument(skip(self, params))]
    pub async fn list_posts(
        &self,
        project_id: &str,
        params: &PostListParams,
    ) -> ApiResult<DoorayResponse<Vec<Post>>> {
        let path = format!("/project/v1/projects/{project_id}/posts");
        self.execute(
            &format!("GET {path}"),
            StatusCode::OK,
            with_query(self.get(&path), &params.to_query()),
        )
        .await
    }

    /// Fetch a single post.
    #[instrument(skip(self))]
    pub async fn get_post(
        &self,
        project_id: &str,
        post_id: &str,
    ) -> ApiResult<DoorayResponse<PostDetail>> {
        let path = format!("/project/v1/projects/{project_id}/posts/{post_id}");
        self.execute(&format!("GET {path}"), StatusCode::OK, self.get(&path))
            .await
    }

    /// Create a post. The remote replies 200 OK, not 201.
    #[instrument(skip(self, request))]
    pub async fn create_post(
        &self,
        project_id: &str,
        request: &CreatePostRequest,
    ) -> ApiResult<DoorayResponse<CreatedPost>> {
        let path = format!("/project/v1/projects/{project_id}/posts");
        self.execute(
            &format!("POST {path}"),
            StatusCode::OK,
            self.post(&path).json(request),
        )
        .await
    }

    /// Update a post.
    #[instrument(skip(self, request))]
    pub async fn update_post(
        &self,
        project_id: &str,
        post_id: &str,
        request: &UpdatePostRequest,
    ) -> ApiResult<DoorayUnitResponse> {
        let path = format!("/project/v1/projects/{project_id}/posts/{post_id}");
        self.execute_unit(
            &format!("PUT {path}"),
            StatusCode::OK,
            self.put(&path).json(request),
        )
        .await
    }

    /// Transition the workflow state of a post.
    #[instrument(skip(self))]
    pub async fn set_post_workflow(
        &self,
        project_id: &str,
        post_id: &str,
        workflow_id: &str,
    ) -> ApiResult<DoorayUnitResponse> {
        let path = format!("/project/v1/projects/{project_id}/posts/{post_id}/set-workflow");
        self.execute_unit(
            &format!("POST {path}"),
            StatusCode::OK,
            self.post(&path).json(&SetWorkflowRequest { workflow_id }),
        )
        .await
    }

    /// Transition the workflow state of a post for one recipient.
    ///
    /// Distinct from [`set_post_workflow`](Self::set_post_workflow); the two
    /// remote operations are independent and are not unified here.
    #[instrument(skip(self))]
    pub async fn update_post_user_workflow(
        &self,
        project_id: &str,
        post_id: &str,
        organization_member_id: &str,
        workflow_id: &str,
    ) -> ApiResult<DoorayUnitResponse> {
        let path =
            format!("/project/v1/projects/{project_id}/posts/{post_id}/to/{organization_member_id}");
        self.execute_unit(
            &format!("PUT {path}"),
            StatusCode::OK,
            self.put(&path).json(&SetWorkflowRequest { workflow_id }),
        )
        .await
    }

    /// Mark a post as done.
    #[instrument(skip(self))]
    pub async fn set_post_done(
        &self,
        project_id: &str,
        post_id: &str,
    ) -> ApiResult<DoorayUnitResponse> {
        let path = format!("/project/v1/projects/{project_id}/posts/{post_id}/set-done");
        self.execute_unit(&format!("POST {path}"), StatusCode::OK, self.post(&path))
            .await
    }

    /// Set the parent of a post.
    #[instrument(skip(self))]
    pub async fn set_post_parent(
        &self,
        project_id: &str,
        post_id: &str,
        parent_post_id: &str,
    ) -> ApiResult<DoorayUnitResponse> {
        let path = format!("/project/v1/projects/{project_id}/posts/{post_id}/set-parent-post");
        self.execute_unit(
            &format!("POST {path}"),
            StatusCode::OK,
            self.post(&path).json(&SetParentPostRequest { parent_post_id }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_list_params_query_contract() {
        let params = PostListParams {
            page: Some(0),
            to_member_ids: Some(vec!["m1".to_string(), "m2".to_string()]),
            tag_ids: Some(vec![]),
            ..Default::default()
        };
        let query = params.to_query();
        let pairs = query.pairs();

        assert!(pairs.contains(&("page", "0".to_string())));
        assert!(pairs.contains(&("toMemberIds", "m1,m2".to_string())));
        // empty collection and absent scalars are omitted entirely
        assert!(!pairs.iter().any(|(key, _)| *key == "tagIds"));
        assert!(!pairs.iter().any(|(key, _)| *key == "size"));
    }

    #[test]
    fn test_create_post_request_shape() {
        let request = CreatePostRequest {
            parent_post_id: None,
            users: CreatePostUsers {
                to: vec![CreatePostUser::member("m1")],
                cc: vec![],
            },
            subject: "Ship it".to_string(),
            body: PostBody::markdown("details"),
            due_date: None,
            due_date_flag: true,
            milestone_id: None,
            tag_ids: vec![],
            priority: "none".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["users"]["to"][0]["member"]["organizationMemberId"], "m1");
        assert_eq!(json["body"]["mimeType"], "text/x-markdown");
        assert!(json.get("parentPostId").is_none());
    }

    #[test]
    fn test_post_deserializes_without_optional_fields() {
        let raw = r#"{
            "id": "post1",
            "subject": "Fix the build",
            "project": {"id": "p1", "code": "CORE"},
            "taskNumber": "CORE-17",
            "closed": false,
            "createdAt": "2024-01-01T00:00:00+09:00",
            "updatedAt": "2024-01-02T00:00:00+09:00",
            "number": 17,
            "priority": "high",
            "workflowClass": "working",
            "workflow": {"id": "w2", "name": "In progress"},
            "users": {
                "from": {"type": "member", "member": {"organizationMemberId": "m1"}},
                "to": [],
                "cc": []
            }
        }"#;
        let post: Post = serde_json::from_str(raw).unwrap();
        assert_eq!(post.task_number, "CORE-17");
        assert!(post.milestone.is_none());
        assert!(post.tags.is_empty());
    }
}
