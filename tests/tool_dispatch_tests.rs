//! Tool-boundary tests.
//!
//! These exercise the full dispatch pipeline against a mock remote: argument
//! validation short-circuits before any HTTP call, remote outcomes of every
//! class render into exactly one envelope, and the envelope carries the
//! stable machine-readable codes.

use dooray_mcp::{all_tools, DoorayClient, DoorayConfig, McpRequest, McpServer, Tool, ToolResult};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestFixture {
    server: MockServer,
    client: Arc<DoorayClient>,
}

impl TestFixture {
    async fn new() -> Self {
        let server = MockServer::start().await;
        let client = Arc::new(DoorayClient::new(&DoorayConfig::new(
            server.uri(),
            "test-api-key",
        )));
        Self { server, client }
    }

    fn tool(&self, name: &str) -> Arc<dyn Tool> {
        all_tools(&self.client)
            .into_iter()
            .find(|t| t.definition().name == name)
            .unwrap_or_else(|| panic!("unknown tool {name}"))
    }

    async fn call(&self, name: &str, args: Value) -> ToolResult {
        self.tool(name).execute(args).await.unwrap()
    }
}

fn ok_header() -> Value {
    json!({"isSuccessful": true, "resultCode": 0, "resultMessage": "success"})
}

fn envelope(result: &ToolResult) -> Value {
    serde_json::from_str(result.first_text().unwrap()).unwrap()
}

#[tokio::test]
async fn test_missing_argument_short_circuits_without_http_call() {
    let fixture = TestFixture::new().await;

    // any outbound call would trip this expectation at verification time
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&fixture.server)
        .await;

    let result = fixture
        .call("dooray_wiki_list_pages", json!({"parent_page_id": "x"}))
        .await;
    assert!(result.is_error);

    let body = envelope(&result);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["type"], "PARAMETER_MISSING");
    assert_eq!(body["error"]["code"], "MISSING_PROJECT_ID");
}

#[tokio::test]
async fn test_every_required_argument_yields_its_own_code() {
    let fixture = TestFixture::new().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&fixture.server)
        .await;

    let cases = [
        ("dooray_wiki_get_page", json!({"project_id": "p1"}), "MISSING_PAGE_ID"),
        ("dooray_wiki_create_page", json!({"subject": "s", "body": "b"}), "MISSING_WIKI_ID"),
        (
            "dooray_wiki_update_page_title",
            json!({"wiki_id": "w1", "page_id": "p1"}),
            "MISSING_SUBJECT",
        ),
        (
            "dooray_project_create_post",
            json!({"project_id": "p1", "subject": "s", "body": "b"}),
            "MISSING_TO_MEMBER_IDS",
        ),
        (
            "dooray_project_set_post_parent",
            json!({"project_id": "p1", "post_id": "t1"}),
            "MISSING_PARENT_POST_ID",
        ),
        (
            "dooray_project_update_post_comment",
            json!({"project_id": "p1", "post_id": "t1", "comment_id": "c1"}),
            "MISSING_CONTENT",
        ),
    ];

    for (tool, args, code) in cases {
        let result = fixture.call(tool, args).await;
        assert!(result.is_error, "{tool} should fail");
        let body = envelope(&result);
        assert_eq!(body["error"]["code"], code, "{tool}");
    }
}

#[tokio::test]
async fn test_empty_listing_reports_zero_count() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/wiki/v1/wikis/p1/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "header": ok_header(),
            "result": []
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let result = fixture
        .call("dooray_wiki_list_pages", json!({"project_id": "p1"}))
        .await;
    assert!(!result.is_error);

    let body = envelope(&result);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!([]));
    assert!(
        body["message"].as_str().unwrap().contains('0'),
        "message should state the zero count: {}",
        body["message"]
    );
}

#[tokio::test]
async fn test_remote_logical_failure_inside_200() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/wiki/v1/wikis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "header": {"isSuccessful": false, "resultCode": 4000, "resultMessage": "quota exceeded"},
            "result": []
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let result = fixture.call("dooray_wiki_list_projects", json!({})).await;
    assert!(result.is_error);

    let body = envelope(&result);
    assert_eq!(body["error"]["type"], "API_ERROR");
    assert_eq!(body["error"]["code"], "DOORAY_API_4000");
    assert_eq!(body["message"], "quota exceeded");
}

#[tokio::test]
async fn test_status_mismatch_with_remote_header_keeps_remote_code() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/project/v1/projects/p1/posts/t1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "header": {"isSuccessful": false, "resultCode": -300, "resultMessage": "no permission"}
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let result = fixture
        .call(
            "dooray_project_get_post",
            json!({"project_id": "p1", "post_id": "t1"}),
        )
        .await;
    assert!(result.is_error);

    let body = envelope(&result);
    assert_eq!(body["error"]["code"], "DOORAY_API_-300");
    assert!(body["message"].as_str().unwrap().contains("no permission"));
}

#[tokio::test]
async fn test_unparseable_500_renders_internal_error() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/wiki/v1/wikis"))
        .respond_with(ResponseTemplate::new(500).set_body_string("gateway exploded"))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let result = fixture.call("dooray_wiki_list_projects", json!({})).await;
    assert!(result.is_error);

    let body = envelope(&result);
    assert_eq!(body["error"]["type"], "INTERNAL_ERROR");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("500"), "{message}");
    assert!(message.contains("gateway exploded"), "{message}");
    assert!(body["error"]["details"].is_string());
}

#[tokio::test]
async fn test_create_wiki_page_success_carries_new_id() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/wiki/v1/wikis/wiki1/pages"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "header": ok_header(),
            "result": {"id": "page-9", "wikiId": "wiki1", "version": 1}
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let result = fixture
        .call(
            "dooray_wiki_create_page",
            json!({"wiki_id": "wiki1", "subject": "Design", "body": "# Design"}),
        )
        .await;
    assert!(!result.is_error);

    let body = envelope(&result);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], "page-9");
    assert!(body["message"].as_str().unwrap().contains("Design"));
}

#[tokio::test]
async fn test_mutation_without_result_renders_summary() {
    let fixture = TestFixture::new().await;

    Mock::given(method("PUT"))
        .and(path("/wiki/v1/wikis/w1/pages/p1/title"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "header": ok_header(),
            "result": null
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let result = fixture
        .call(
            "dooray_wiki_update_page_title",
            json!({"wiki_id": "w1", "page_id": "p1", "subject": "Renamed"}),
        )
        .await;
    assert!(!result.is_error);

    let body = envelope(&result);
    assert_eq!(body["data"]["new_subject"], "Renamed");
    assert_eq!(body["data"]["updated"], true);
}

#[tokio::test]
async fn test_delete_comment_uses_no_body_path() {
    let fixture = TestFixture::new().await;

    Mock::given(method("DELETE"))
        .and(path("/project/v1/projects/p1/posts/t1/logs/c1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let result = fixture
        .call(
            "dooray_project_delete_post_comment",
            json!({"project_id": "p1", "post_id": "t1", "comment_id": "c1"}),
        )
        .await;
    assert!(!result.is_error);

    let body = envelope(&result);
    assert_eq!(body["data"]["deleted"], true);
}

#[tokio::test]
async fn test_transport_failure_renders_internal_error() {
    // nothing listens on port 1; no mock server involved
    let client = Arc::new(DoorayClient::new(&DoorayConfig::new(
        "http://127.0.0.1:1",
        "key",
    )));
    let tool = all_tools(&client)
        .into_iter()
        .find(|t| t.definition().name == "dooray_project_set_post_done")
        .unwrap();

    let result = tool
        .execute(json!({"project_id": "p1", "post_id": "t1"}))
        .await
        .unwrap();
    assert!(result.is_error);

    let body: Value = serde_json::from_str(result.first_text().unwrap()).unwrap();
    assert_eq!(body["error"]["type"], "INTERNAL_ERROR");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Error during API call: "));
}

#[tokio::test]
async fn test_full_server_dispatch_over_tools_call() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/wiki/v1/wikis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "header": ok_header(),
            "result": [{
                "id": "wiki1",
                "project": {"id": "p1"},
                "name": "Team Wiki",
                "type": "wiki",
                "scope": "private"
            }]
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let server = McpServer::dooray();
    server.register_tools(all_tools(&fixture.client)).await;

    let request = McpRequest::new(1i64, "tools/call").with_params(json!({
        "name": "dooray_wiki_list_projects",
        "arguments": {}
    }));
    let response = server.handle_request(request).await.unwrap();

    let result = response.result.unwrap();
    assert_eq!(result["isError"], false);
    let text = result["content"][0]["text"].as_str().unwrap();
    let body: Value = serde_json::from_str(text).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["name"], "Team Wiki");
}

#[tokio::test]
async fn test_tools_list_exposes_all_tools() {
    let fixture = TestFixture::new().await;

    let server = McpServer::dooray();
    server.register_tools(all_tools(&fixture.client)).await;

    let request = McpRequest::new(1i64, "tools/list");
    let response = server.handle_request(request).await.unwrap();
    let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();

    assert_eq!(tools.len(), 22);
    assert!(tools
        .iter()
        .any(|t| t["name"] == "dooray_project_create_post_comment"));
    // wire field name follows the MCP schema
    assert!(tools.iter().all(|t| t.get("inputSchema").is_some()));
}
