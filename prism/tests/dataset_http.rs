//! DatasetClient against a mock dataset API: trigger query/body, progress parsing,
//! download shape, and the poller driving all three over HTTP.

mod init_logging;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{bearer_token, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prism::{
    DatasetClient, DiscussionClient, DiscussionSearchOptions, JobBackend, JobError, JobOutcome,
    JobPoller, JobStatus, PollConfig, PostDetailOptions, TriggerRequest,
};

fn client(server: &MockServer) -> DatasetClient {
    DatasetClient::new("test-key").with_base_url(server.uri())
}

/// **Scenario**: discovery trigger sends dataset/type/discover_by params and the records as body.
#[tokio::test]
async fn trigger_sends_params_and_reads_snapshot_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/datasets/v3/trigger"))
        .and(bearer_token("test-key"))
        .and(query_param("dataset_id", "gd_posts"))
        .and(query_param("include_errors", "true"))
        .and(query_param("type", "discover_new"))
        .and(query_param("discover_by", "keyword"))
        .and(body_json(json!([{"keyword": "laptops"}])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"snapshot_id": "s_123"})))
        .expect(1)
        .mount(&server)
        .await;

    let request = TriggerRequest::new("gd_posts", vec![json!({"keyword": "laptops"})])
        .discover_new_by("keyword");
    let response = client(&server).trigger(&request).await.unwrap();
    assert_eq!(response.job_id.as_deref(), Some("s_123"));
}

#[tokio::test]
async fn trigger_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/datasets/v3/trigger"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let err = client(&server)
        .trigger(&TriggerRequest::new("gd_posts", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, JobError::Status { status: 401, ref body } if body == "bad key"));
}

#[tokio::test]
async fn progress_parses_status_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/datasets/v3/progress/s_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/datasets/v3/progress/s_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"snapshot_id": "s_2"})))
        .mount(&server)
        .await;

    let c = client(&server);
    assert_eq!(c.progress("s_1").await.unwrap(), JobStatus::Running);
    assert_eq!(c.progress("s_2").await.unwrap(), JobStatus::Unknown(String::new()));
}

/// **Scenario**: download asks for JSON; a single object is wrapped as one record.
#[tokio::test]
async fn download_wraps_single_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/datasets/v3/snapshot/s_1"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"a": 1}, {"a": 2}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/datasets/v3/snapshot/s_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"a": 3})))
        .mount(&server)
        .await;

    let c = client(&server);
    assert_eq!(c.download("s_1").await.unwrap().len(), 2);
    assert_eq!(c.download("s_2").await.unwrap(), vec![json!({"a": 3})]);
}

/// **Scenario**: discussion search and comment retrieval end to end over HTTP.
#[tokio::test]
async fn discussion_client_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/datasets/v3/trigger"))
        .and(query_param("dataset_id", "gd_posts"))
        .and(body_json(json!([{
            "keyword": "best budget laptop 2024",
            "date": "All time",
            "sort_by": "Hot",
            "num_of_posts": 30
        }])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"snapshot_id": "s_posts"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/datasets/v3/trigger"))
        .and(query_param("dataset_id", "gd_comments"))
        .and(body_json(json!([{
            "url": "https://reddit.test/1",
            "days_back": 10,
            "load_all_replies": false,
            "comment_limit": ""
        }])))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"snapshot_id": "s_comments"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/datasets/v3/progress/s_posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ready"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/datasets/v3/progress/s_comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ready"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/datasets/v3/snapshot/s_posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"title": "Budget picks", "url": "https://reddit.test/1", "description": "d"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/datasets/v3/snapshot/s_comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"comment_id": "c1", "comment": "Get the Acer", "date_posted": "2024-01-02"}
        ])))
        .mount(&server)
        .await;

    let poller = JobPoller::new(
        Arc::new(client(&server)),
        PollConfig {
            max_poll_attempts: 3,
            poll_delay: Duration::from_millis(10),
        },
    );
    let discussions = DiscussionClient::new(poller, "gd_posts", "gd_comments");

    let posts = discussions
        .search("best budget laptop 2024", &DiscussionSearchOptions::default())
        .await
        .unwrap();
    assert_eq!(posts.total_found, 1);
    assert_eq!(posts.posts[0].url, "https://reddit.test/1");

    let details = discussions
        .retrieve_details(&["https://reddit.test/1".to_string()], &PostDetailOptions::default())
        .await
        .unwrap();
    assert_eq!(details.total_retrieved, 1);
    assert_eq!(details.comments[0].content, "Get the Acer");
}

/// **Scenario**: a stalled progress endpoint times out per request, each timeout uses up
/// one attempt, and the job ends as TimedOut well within the wall-clock budget.
#[tokio::test]
async fn stalled_progress_uses_up_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/datasets/v3/trigger"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"snapshot_id": "s_slow"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/datasets/v3/progress/s_slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "ready"}))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let backend = client(&server).with_request_timeout(Duration::from_millis(200));
    let poller = JobPoller::new(
        Arc::new(backend),
        PollConfig {
            max_poll_attempts: 2,
            poll_delay: Duration::from_millis(10),
        },
    );

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        poller.run(&TriggerRequest::new("gd_posts", vec![])),
    )
    .await
    .expect("poll loop must finish within its budget");

    match outcome {
        JobOutcome::TimedOut(job) => {
            assert_eq!(job.attempts_made, 2);
            assert!(matches!(job.status, JobStatus::Unknown(_)), "{:?}", job.status);
        }
        other => panic!("expected TimedOut, got {:?}", other),
    }
}
