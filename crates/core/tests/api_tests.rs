//! Library API integration tests
use std::time::Duration;

use rstest::rstest;
use voiceprint_core::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(get_fixture_path(name)).unwrap()
}

#[test]
fn test_parse_substack_fixture() {
    let document = fetch_file(&get_fixture_path("substack_rss.xml")).unwrap();
    let entries = parse_feed(&document).unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].title, "Why I Stopped Running");
    assert!(entries[0].raw_body.contains("I used to run everywhere"));
    assert_eq!(
        entries[0].link.as_deref(),
        Some("https://slowlane.substack.com/p/why-i-stopped-running")
    );
    assert_eq!(entries[2].published.as_deref(), Some("Sun, 31 Dec 2023 09:00:00 GMT"));
}

#[rstest]
#[case("substack_rss.xml", FeedDialect::Rss, 3)]
#[case("atom.xml", FeedDialect::Atom, 2)]
#[case("stub_posts.xml", FeedDialect::Rss, 3)]
#[case("empty_feed.xml", FeedDialect::Rss, 0)]
fn test_entries_in_document_order(#[case] fixture: &str, #[case] dialect: FeedDialect, #[case] count: usize) {
    let document = FeedDocument::new(fixture, read_fixture(fixture));
    let (found, entries) = FeedParser::new().parse_with_dialect(&document).unwrap();

    assert_eq!(found, dialect);
    assert_eq!(entries.len(), count);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.position, i);
    }
}

#[rstest]
#[case("not_a_feed.txt")]
#[case("html_page.html")]
fn test_non_feed_documents_are_malformed(#[case] fixture: &str) {
    let result = prepare_prompt_from_str(&read_fixture(fixture), DEFAULT_INSTRUCTION);
    assert!(matches!(result, Err(VoiceprintError::FeedMalformed { .. })));
}

#[test]
fn test_substack_prompt_is_clean_prose() {
    let prepared = prepare_prompt_from_str(&read_fixture("substack_rss.xml"), DEFAULT_INSTRUCTION).unwrap();
    let prompt = prepared.prompt.as_str();

    assert_eq!(prepared.entries_found, 3);
    assert_eq!(prepared.entries_dropped, 1);
    assert_eq!(prepared.samples.len(), 2);
    assert!(prompt.starts_with("You are an expert ghostwriter"));
    assert!(prompt.contains("Here is the sample content:\n\nI used to run everywhere."));
    assert!(prompt.contains("doorways & faces."));
    assert!(prompt.contains("The criteria\nA good bench faces something."));
    assert!(!prompt.contains('<'));
    assert!(!prompt.contains("Subscribe"));
    assert!(!prompt.contains("Share"));
    assert!(!prompt.contains("Thanks for reading"));
    assert!(!prompt.contains("The winner."));
    assert!(!prompt.contains("Back soon."));
}

#[test]
fn test_samples_keep_feed_order() {
    let prepared = prepare_prompt_from_str(&read_fixture("substack_rss.xml"), "Go.").unwrap();
    let text = prepared.corpus.text();

    let first = text.find("I used to run everywhere").unwrap();
    let second = text.find("A good bench").unwrap();
    assert!(first < second);
    assert_eq!(prepared.samples[0].title, "Why I Stopped Running");
    assert_eq!(prepared.samples[1].title, "Benches, Ranked");
}

#[test]
fn test_atom_fixture_prompt() {
    let prepared = prepare_prompt_from_str(&read_fixture("atom.xml"), "Go.").unwrap();

    assert_eq!(prepared.dialect, FeedDialect::Atom);
    assert_eq!(prepared.samples.len(), 2);
    assert_eq!(prepared.samples[0].title, "Notes on Weather");
    assert_eq!(prepared.samples[0].link.as_deref(), Some("https://notes.example.com/weather"));
    assert!(prepared.prompt.as_str().contains("The fog came in at noon"));
    assert!(!prepared.prompt.as_str().contains("Fog, briefly."));
    assert!(prepared.prompt.as_str().contains("Only a summary here"));
}

#[rstest]
#[case("empty_feed.xml")]
#[case("stub_posts.xml")]
fn test_feeds_without_prose_have_no_usable_content(#[case] fixture: &str) {
    let result = prepare_prompt_from_str(&read_fixture(fixture), DEFAULT_INSTRUCTION);
    assert!(matches!(result, Err(VoiceprintError::NoUsableContent { .. })));
}

#[test]
fn test_boilerplate_kept_when_stripping_disabled() {
    let config = StyleConfig::builder().strip_boilerplate(false).build();
    let document = FeedDocument::new("substack_rss.xml", read_fixture("substack_rss.xml"));
    let prepared = prepare_document_with_config(&document, "Go.", &config).unwrap();

    assert!(prepared.prompt.as_str().contains("Thanks for reading The Slow Lane!"));
}

#[test]
fn test_budget_applies_to_fixture() {
    let config = StyleConfig::builder().char_budget(300).build();
    let document = FeedDocument::new("substack_rss.xml", read_fixture("substack_rss.xml"));
    let prepared = prepare_document_with_config(&document, "Go.", &config).unwrap();

    assert_eq!(prepared.samples.len(), 1);
    assert_eq!(prepared.corpus.omitted(), 1);
    assert!(prepared.corpus.char_count() <= 300);
}

#[test]
fn test_json_report_for_fixture() {
    let prepared = prepare_prompt_from_str(&read_fixture("substack_rss.xml"), "Go.").unwrap();
    let json = convert_to_json(&prepared, None, &JsonConfig::default()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["dialect"], "rss");
    assert_eq!(value["stats"]["samples_included"], 2);
    assert_eq!(value["samples"][1]["title"], "Benches, Ranked");
}

#[tokio::test]
async fn test_locate_skips_missing_feed_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(read_fixture("substack_rss.xml")))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(FetchConfig::default()).unwrap();
    let document = locate_and_fetch(&transport, &server.uri(), DEFAULT_PLATFORM_DOMAIN).await.unwrap();

    assert_eq!(document.url, format!("{}/rss", server.uri()));
    assert!(document.body.contains("The Slow Lane"));
}

#[tokio::test]
async fn test_locate_prefers_feed_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(read_fixture("atom.xml")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(read_fixture("substack_rss.xml")))
        .expect(0)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(FetchConfig::default()).unwrap();
    let document = locate_and_fetch(&transport, &format!("{}/", server.uri()), DEFAULT_PLATFORM_DOMAIN)
        .await
        .unwrap();

    assert_eq!(document.url, format!("{}/feed", server.uri()));
}

#[tokio::test]
async fn test_server_error_moves_to_next_candidate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(read_fixture("atom.xml")))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(FetchConfig::default()).unwrap();
    let document = locate_and_fetch(&transport, &server.uri(), DEFAULT_PLATFORM_DOMAIN).await.unwrap();

    assert!(document.url.ends_with("/rss"));
}

#[tokio::test]
async fn test_all_candidates_fail() {
    let server = MockServer::start().await;

    let transport = HttpTransport::new(FetchConfig::default()).unwrap();
    let err = locate_and_fetch(&transport, &server.uri(), DEFAULT_PLATFORM_DOMAIN).await.unwrap_err();

    match err {
        VoiceprintError::FeedUnreachable { identifier, .. } => assert_eq!(identifier, server.uri()),
        other => panic!("unexpected error: {other}"),
    }

    let requests = server.received_requests().await.unwrap();
    let paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
    assert_eq!(paths, vec!["/feed", "/rss"]);
}

#[tokio::test]
async fn test_http_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(FetchConfig::default()).unwrap();
    let err = transport.get(&format!("{}/feed", server.uri())).await.unwrap_err();

    assert!(matches!(err, VoiceprintError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(FetchConfig { timeout: Some(1), ..Default::default() }).unwrap();
    let err = transport.get(&format!("{}/feed", server.uri())).await.unwrap_err();

    assert!(matches!(err, VoiceprintError::Timeout { timeout: 1 }));
}

#[tokio::test]
async fn test_extractor_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(read_fixture("substack_rss.xml")))
        .mount(&server)
        .await;

    let extractor = StyleExtractor::with_config(StyleConfig::default()).unwrap();
    let prepared = extractor.prepare(&server.uri(), "Describe the voice.").await.unwrap();

    assert_eq!(prepared.source_url, format!("{}/feed", server.uri()));
    assert!(prepared.prompt.as_str().starts_with("Describe the voice.\n\nI used to run everywhere."));
}

#[tokio::test]
async fn test_extractor_reports_empty_publication() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(read_fixture("empty_feed.xml")))
        .mount(&server)
        .await;

    let extractor = StyleExtractor::new().unwrap();
    let err = extractor.prepare(&server.uri(), DEFAULT_INSTRUCTION).await.unwrap_err();

    assert!(matches!(err, VoiceprintError::NoUsableContent { origin: Some(_) }));
}
