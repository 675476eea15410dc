use std::time::Duration;

use pretty_assertions::assert_eq;
use triage_engine::{AnalysisApi, ApiError, ClientSettings, ReqwestAnalysisApi};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> ClientSettings {
    ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    }
}

#[tokio::test]
async fn upload_returns_receipt_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"success": true, "analysis_id": "analysis_20240101_120000", "filename": "report.txt"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let api = ReqwestAnalysisApi::new(&settings_for(&server)).expect("client");
    let receipt = api
        .upload("report.txt", b"patient is stable".to_vec())
        .await
        .expect("upload ok");

    assert_eq!(receipt.analysis_id, "analysis_20240101_120000");
    assert_eq!(receipt.filename.as_deref(), Some("report.txt"));
}

#[tokio::test]
async fn upload_surfaces_service_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"success": false, "error": "No file uploaded"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let api = ReqwestAnalysisApi::new(&settings_for(&server)).expect("client");
    let err = api.upload("report.txt", Vec::new()).await.unwrap_err();
    assert_eq!(err, ApiError::Service("No file uploaded".to_string()));
}

#[tokio::test]
async fn upload_reads_error_body_on_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_raw(r#"{"error": "disk full"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let api = ReqwestAnalysisApi::new(&settings_for(&server)).expect("client");
    let err = api.upload("report.txt", Vec::new()).await.unwrap_err();
    assert_eq!(err, ApiError::Service("disk full".to_string()));
}

#[tokio::test]
async fn upload_falls_back_to_http_status_without_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let api = ReqwestAnalysisApi::new(&settings_for(&server)).expect("client");
    let err = api.upload("report.txt", Vec::new()).await.unwrap_err();
    assert_eq!(err, ApiError::HttpStatus(502));
}

#[tokio::test]
async fn upload_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        request_timeout: Duration::from_millis(50),
        ..settings_for(&server)
    };
    let api = ReqwestAnalysisApi::new(&settings).expect("client");
    let err = api.upload("report.txt", Vec::new()).await.unwrap_err();
    assert_eq!(err, ApiError::Timeout);
}

#[tokio::test]
async fn status_decodes_a_full_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/analysis_1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{
                "status": "running_agents",
                "agent_progress": {
                    "cardiologist": {"status": "completed", "progress": 100},
                    "final": {"status": "waiting", "progress": 0}
                },
                "results": {"Cardiologist": "**Findings**\nNormal."}
            }"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let api = ReqwestAnalysisApi::new(&settings_for(&server)).expect("client");
    let response = api.status("analysis_1").await.expect("status ok");

    assert_eq!(response.status, "running_agents");
    assert!(!response.is_terminal());
    let cardiologist = &response.agent_progress["cardiologist"];
    assert_eq!(cardiologist.status, "completed");
    assert_eq!(cardiologist.progress, 100);
    assert_eq!(
        response.results.get("Cardiologist").map(String::as_str),
        Some("**Findings**\nNormal.")
    );
}

#[tokio::test]
async fn status_surfaces_unknown_job_as_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_raw(r#"{"error": "Analysis not found"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let api = ReqwestAnalysisApi::new(&settings_for(&server)).expect("client");
    let err = api.status("missing").await.unwrap_err();
    assert_eq!(err, ApiError::Service("Analysis not found".to_string()));
}

#[tokio::test]
async fn malformed_status_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/analysis_1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let api = ReqwestAnalysisApi::new(&settings_for(&server)).expect("client");
    let err = api.status("analysis_1").await.unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse(_)));
}
