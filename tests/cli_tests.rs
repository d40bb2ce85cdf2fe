use assert_cmd::Command;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn repo(name: &str) -> Value {
    json!({
        "name": name,
        "full_name": format!("org/{}", name),
        "description": null,
        "html_url": format!("https://ghe.example.com/org/{}", name)
    })
}

fn titles(output: &std::process::Output) -> Vec<String> {
    stdout_json(output)["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap().to_string())
        .collect()
}

fn command(server: &MockServer, cache_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ghe-repos").unwrap();
    cmd.env_clear()
        .env("GHE_REPOS_HOST", server.uri())
        .env("GHE_REPOS_CACHE_DIR", cache_dir.path());
    cmd
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_prints_matching_items() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/v3/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "name": "alpha",
                "full_name": "org/alpha",
                "description": "First",
                "html_url": "https://ghe.example.com/org/alpha"
            },
            {
                "name": "beta",
                "full_name": "org/beta",
                "description": null,
                "html_url": "https://ghe.example.com/org/beta"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let output = Command::cargo_bin("ghe-repos")
        .unwrap()
        .env_clear()
        .env("GHE_REPOS_HOST", server.uri())
        .env("GHE_REPOS_CACHE_DIR", cache_dir.path())
        .arg("  alp ")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!({
            "items": [{
                "uid": "org/alpha",
                "title": "org/alpha",
                "subtitle": "First",
                "arg": "https://ghe.example.com/org/alpha",
                "valid": true,
                "icon": {"path": "github_32.png"}
            }]
        })
    );
    assert!(cache_dir.path().join("repos.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_failure_reported_as_error_item() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/v3/repositories"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let output = Command::cargo_bin("ghe-repos")
        .unwrap()
        .env_clear()
        .env("GHE_REPOS_HOST", server.uri())
        .env("GHE_REPOS_CACHE_DIR", cache_dir.path())
        .arg("anything")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let value = stdout_json(&output);
    let items = value["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["valid"], json!(false));
    assert!(items[0]["subtitle"].as_str().unwrap().contains("503"));
    assert!(!cache_dir.path().join("repos.json").exists());
}

#[test]
fn test_missing_host_is_reported() {
    let cache_dir = TempDir::new().unwrap();
    let output = Command::cargo_bin("ghe-repos")
        .unwrap()
        .env_clear()
        .env("GHE_REPOS_CACHE_DIR", cache_dir.path())
        .arg("anything")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let value = stdout_json(&output);
    assert!(
        value["items"][0]["subtitle"]
            .as_str()
            .unwrap()
            .contains("GHE_REPOS_HOST")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stale_cache_refreshed_with_wait_refresh() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/v3/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo("new")])))
        .expect(1)
        .mount(&server)
        .await;

    let stale_at = chrono::Utc::now().timestamp() - 3600;
    std::fs::write(
        cache_dir.path().join("repos.json"),
        serde_json::to_vec(&json!({"created_at": stale_at, "data": [repo("old")]})).unwrap(),
    )
    .unwrap();

    let output = command(&server, &cache_dir)
        .arg("--wait-refresh")
        .output()
        .unwrap();

    assert!(output.status.success());
    // The stale list is shown; the refreshed one lands in the cache
    assert_eq!(titles(&output), vec!["org/old"]);
    let cached: Value =
        serde_json::from_slice(&std::fs::read(cache_dir.path().join("repos.json")).unwrap())
            .unwrap();
    assert_eq!(cached["data"], json!([repo("new")]));
    assert!(cached["created_at"].as_i64().unwrap() > stale_at);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_first_page_skips_next_link() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    let link = format!("<{}/api/v3/repositories?since=1>; rel=\"next\"", server.uri());
    Mock::given(method("GET"))
        .and(path("/api/v3/repositories"))
        .and(query_param("since", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo("second")])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/repositories"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([repo("first")]))
                .insert_header("link", link.as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let output = command(&server, &cache_dir)
        .arg("--first-page")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(titles(&output), vec!["org/first"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_insecure_flag_warns() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/v3/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo("alpha")])))
        .mount(&server)
        .await;

    let output = command(&server, &cache_dir)
        .arg("--insecure")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TLS certificate verification is disabled"));
    assert_eq!(titles(&output), vec!["org/alpha"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_log_file_receives_logs() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    let log_dir = TempDir::new().unwrap();
    let log_file = log_dir.path().join("logs").join("ghe-repos.log");
    Mock::given(method("GET"))
        .and(path("/api/v3/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo("alpha")])))
        .mount(&server)
        .await;

    let output = command(&server, &cache_dir)
        .env("GHE_REPOS_LOG_FILE", &log_file)
        .env("GHE_REPOS_LOG_LEVEL", "debug")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(output.stderr.is_empty());
    let logs = std::fs::read_to_string(&log_file).unwrap();
    assert!(logs.contains("done fetching"));
}
