//! Integration tests for the archive crawler
//!
//! These tests use wiremock to serve a small conversation archive and run
//! the full coordinator cycle over an HTTP document session.

use convo_archiver::config::Config;
use convo_archiver::conversation::Scope;
use convo_archiver::crawler::{Coordinator, CrawlMode, ImmediateGate};
use convo_archiver::document::HttpDocument;
use convo_archiver::output::{FileSink, MemorySink};
use convo_archiver::state::SeenSet;
use convo_archiver::storage::{SqliteStorage, Storage};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server, with no delays
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.session.start_url = format!("{}/", base_url);
    config.session.navigation_timeout_ms = 5_000;
    config.session.sidebar_timeout_ms = 0;
    config.session.item_timeout_ms = 5_000;
    config.session.settle_ms = 0;
    config.session.scope_settle_ms = 0;
    config
}

fn document(config: &Config) -> HttpDocument {
    HttpDocument::from_config(&config.session).expect("Failed to build HTTP session")
}

fn chat_page(title: &str, user: &str, assistant: &str) -> String {
    format!(
        r#"<html><head><title>{}</title></head><body><main>
        <div data-message-author-role="user">{}</div>
        <div data-message-author-role="assistant">{}</div>
        </main></body></html>"#,
        title, user, assistant
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Mounts a start page with the given links inside the sidebar
async fn mount_home(server: &MockServer, links: &[(&str, &str)]) {
    let anchors: String = links
        .iter()
        .map(|(href, text)| format!(r#"<a href="{}">{}</a>"#, href, text))
        .collect::<Vec<_>>()
        .join("\n");
    mount_page(
        server,
        "/",
        format!(
            "<html><head><title>Archive</title></head><body><nav>{}</nav></body></html>",
            anchors
        ),
    )
    .await;
}

#[tokio::test]
async fn test_failed_item_is_skipped_and_not_seen() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri());

    mount_home(&server, &[("/c/1", "One"), ("/c/2", "Two"), ("/c/3", "Three")]).await;
    mount_page(&server, "/c/1", chat_page("One", "Hello", "Hi there")).await;
    Mock::given(method("GET"))
        .and(path("/c/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/c/3", chat_page("Three", "Weather?", "Sunny")).await;

    let mut coordinator = Coordinator::new(config.clone(), document(&config), MemorySink::new());
    let mut seen = SeenSet::new();
    let report = coordinator
        .run(&CrawlMode::RootOnly, &mut ImmediateGate, &mut seen)
        .await
        .expect("Run failed");

    assert_eq!(report.attempted(), 3);
    assert_eq!(report.exported(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.seen, 2);

    let base = server.uri();
    assert_eq!(
        coordinator.sink().identities(),
        vec![format!("{}/c/1", base), format!("{}/c/3", base)]
    );
}

#[tokio::test]
async fn test_repeated_links_are_exported_once() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri());

    mount_home(
        &server,
        &[
            ("/c/1", "One"),
            ("/c/1/", "One (trailing slash)"),
            ("/c/1#turn-4", "One (fragment)"),
            ("/c/2", "Two"),
        ],
    )
    .await;
    mount_page(&server, "/c/1", chat_page("One", "Hello", "Hi")).await;
    mount_page(&server, "/c/2", chat_page("Two", "Bye", "Ciao")).await;

    let mut coordinator = Coordinator::new(config.clone(), document(&config), MemorySink::new());
    let report = coordinator
        .run(&CrawlMode::RootOnly, &mut ImmediateGate, &mut SeenSet::new())
        .await
        .expect("Run failed");

    assert_eq!(report.phases[0].discovered, 2);
    assert_eq!(report.exported(), 2);
    assert_eq!(coordinator.sink().records().len(), 2);
}

#[tokio::test]
async fn test_project_phase_only_visits_project_conversations() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri());

    mount_home(
        &server,
        &[
            ("/c/1", "Root chat"),
            ("/g/g-p-1-research/project", "Research"),
        ],
    )
    .await;
    mount_page(
        &server,
        "/g/g-p-1-research/project",
        r#"<html><body><nav><a href="/c/1">Root chat</a></nav>
        <main><a href="/g/g-p-1-research/c/9">Paper notes</a></main></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        &server,
        "/g/g-p-1-research/c/9",
        chat_page("Paper notes", "Summarize", "Done"),
    )
    .await;

    let mut coordinator = Coordinator::new(config.clone(), document(&config), MemorySink::new());
    let report = coordinator
        .run(
            &CrawlMode::Project("research".to_string()),
            &mut ImmediateGate,
            &mut SeenSet::new(),
        )
        .await
        .expect("Run failed");

    assert_eq!(report.phases.len(), 1);
    assert_eq!(report.exported(), 1);
    let records = coordinator.sink().records();
    assert_eq!(records[0].conversation.title, "Paper notes");
    assert_eq!(
        records[0].conversation.scope,
        Scope::Named("research".to_string())
    );
}

#[tokio::test]
async fn test_all_scopes_without_projects_keeps_every_reference() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri());

    mount_home(&server, &[("/c/1", "One"), ("/c/2", "Two")]).await;
    mount_page(&server, "/c/1", chat_page("One", "a", "b")).await;
    mount_page(&server, "/c/2", chat_page("Two", "c", "d")).await;

    let mut coordinator = Coordinator::new(config.clone(), document(&config), MemorySink::new());
    let report = coordinator
        .run(&CrawlMode::AllScopes, &mut ImmediateGate, &mut SeenSet::new())
        .await
        .expect("Run failed");

    assert_eq!(report.phases.len(), 1);
    assert_eq!(report.phases[0].scope, Scope::Root);
    assert_eq!(report.exported(), 2);
    assert_eq!(coordinator.sink().mode(), Some(&CrawlMode::AllScopes));
}

#[tokio::test]
async fn test_content_filter_skips_unmatched_conversations() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri());

    mount_home(&server, &[("/c/1", "Trip"), ("/c/2", "Recipe")]).await;
    mount_page(&server, "/c/1", chat_page("Trip", "Train to Dortmund?", "Via Hamm")).await;
    mount_page(&server, "/c/2", chat_page("Recipe", "Pancakes?", "Flour and eggs")).await;

    let mut coordinator = Coordinator::new(config.clone(), document(&config), MemorySink::new())
        .with_filter(vec!["dortmund".to_string()]);
    let mut seen = SeenSet::new();
    let report = coordinator
        .run(&CrawlMode::RootOnly, &mut ImmediateGate, &mut seen)
        .await
        .expect("Run failed");

    assert_eq!(report.attempted(), 2);
    assert_eq!(report.exported(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 0);
    assert_eq!(seen.len(), 1);
}

#[tokio::test]
async fn test_rejected_export_leaves_conversation_unseen() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri());
    let rejected = format!("{}/c/2", server.uri());

    mount_home(&server, &[("/c/1", "One"), ("/c/2", "Two")]).await;
    mount_page(&server, "/c/1", chat_page("One", "a", "b")).await;
    mount_page(&server, "/c/2", chat_page("Two", "c", "d")).await;

    let sink = MemorySink::new().reject(rejected.clone());
    let mut coordinator = Coordinator::new(config.clone(), document(&config), sink);
    let mut seen = SeenSet::new();
    let report = coordinator
        .run(&CrawlMode::RootOnly, &mut ImmediateGate, &mut seen)
        .await
        .expect("Run failed");

    assert_eq!(report.exported(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(seen.len(), 1);
    assert!(seen.iter().all(|identity| identity.as_str() != rejected));
}

#[tokio::test]
async fn test_unreachable_project_does_not_abort_run() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri());

    mount_home(&server, &[("/c/1", "One")]).await;
    mount_page(&server, "/c/1", chat_page("One", "a", "b")).await;

    let mut coordinator = Coordinator::new(config.clone(), document(&config), MemorySink::new());
    let report = coordinator
        .run(
            &CrawlMode::Project("Nowhere".to_string()),
            &mut ImmediateGate,
            &mut SeenSet::new(),
        )
        .await
        .expect("Run failed");

    assert_eq!(report.phases.len(), 1);
    assert!(report.phases[0].navigation_failed);
    assert_eq!(report.unreachable_scopes().len(), 1);
    assert_eq!(report.attempted(), 0);
}

#[tokio::test]
async fn test_unreachable_start_page_fails_run() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut coordinator = Coordinator::new(config.clone(), document(&config), MemorySink::new());
    let result = coordinator
        .run(&CrawlMode::RootOnly, &mut ImmediateGate, &mut SeenSet::new())
        .await;

    assert!(result.is_err());
    assert!(coordinator.sink().records().is_empty());
}

#[tokio::test]
async fn test_file_sink_writes_export_directory() {
    let server = MockServer::start().await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = create_test_config(&server.uri());
    config.output.manifest_path = temp_dir
        .path()
        .join("manifest.db")
        .to_string_lossy()
        .into_owned();

    mount_home(&server, &[("/c/1", "Trip")]).await;
    mount_page(
        &server,
        "/c/1",
        chat_page("Trip to Dortmund", "Train to Dortmund?", "Via Hamm"),
    )
    .await;

    let root = temp_dir.path().join("export");
    let manifest = SqliteStorage::new(std::path::Path::new(&config.output.manifest_path))
        .expect("Failed to open manifest");
    let sink = FileSink::new(&root, &config.output, "test-hash").with_manifest(manifest);

    let mut coordinator = Coordinator::new(config.clone(), document(&config), sink)
        .with_tags(vec!["Dortmund".to_string(), "OWL".to_string()]);
    let report = coordinator
        .run(&CrawlMode::RootOnly, &mut ImmediateGate, &mut SeenSet::new())
        .await
        .expect("Run failed");
    assert_eq!(report.exported(), 1);

    assert!(root.join("export_info.json").exists());
    assert!(root.join("summary.md").exists());

    let markdown: Vec<_> = std::fs::read_dir(root.join("markdown"))
        .expect("Missing markdown directory")
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(markdown.len(), 1);
    let transcript = std::fs::read_to_string(markdown[0].path()).expect("Unreadable transcript");
    assert!(transcript.contains("### User\n\nTrain to Dortmund?"));
    assert!(transcript.contains("### Assistant\n\nVia Hamm"));

    let metadata_path = std::fs::read_dir(root.join("metadata"))
        .expect("Missing metadata directory")
        .filter_map(|e| e.ok())
        .next()
        .expect("No metadata written")
        .path();
    let metadata: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(metadata_path).expect("Unreadable metadata"))
            .expect("Invalid metadata JSON");
    assert_eq!(metadata["chat_title"], "Trip to Dortmund");
    assert_eq!(metadata["keywords_found"], serde_json::json!(["Dortmund"]));
    assert_eq!(metadata["turn_count"], 2);

    let html_count = std::fs::read_dir(root.join("raw_html"))
        .expect("Missing raw_html directory")
        .count();
    assert_eq!(html_count, 1);

    let (_, sink) = coordinator.into_parts();
    let manifest = sink.manifest().expect("Manifest detached");
    assert_eq!(manifest.count_runs().unwrap(), 1);
    assert_eq!(manifest.count_conversations().unwrap(), 1);
    let run = manifest.get_latest_run().unwrap().expect("No run recorded");
    assert_eq!(run.totals.exported, 1);
}
