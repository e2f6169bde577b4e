/// Library loading across both providers, plus the consumers built on it
mod common;

use chat_history_explorer::export::{ExportFormat, export_conversation};
use chat_history_explorer::filters::{apply_filters, parse_filter};
use chat_history_explorer::indexer::{FavoriteSet, load_library};
use chat_history_explorer::models::{BlockFilter, Provider};
use chat_history_explorer::parsers::ParseOptions;
use chat_history_explorer::search::{HitKind, strict_search};
use chat_history_explorer::utils::Settings;
use common::*;

fn populated() -> (ExportDir, Settings) {
    let dir = ExportDir::new();
    dir.write_chatgpt(&export_of(vec![
        ChatGptConversationBuilder::new("gpt-old", "Sourdough starter")
            .create_time(serde_json::json!(1_600_000_000.0))
            .message("a", "user", "how often do I feed it")
            .build(),
        ChatGptConversationBuilder::new("gpt-new", "Borrow checker")
            .message("b", "user", "why does the borrow checker reject this")
            .message("c", "assistant", "because of overlapping borrows")
            .build(),
    ]));
    dir.write_claude(&export_of(vec![
        ClaudeConversationBuilder::new("claude-1", "Trip plan")
            .created_at("2024-06-01T08:00:00Z")
            .message(
                ClaudeMessageBuilder::new("m1", "human")
                    .created_at("2024-06-01T08:00:00Z")
                    .text("plan a trip to Lisbon")
                    .attachment("itinerary.txt", "day one: borrow a bike"),
            )
            .build(),
    ]));
    let favorites = dir.write_favorites(&[("claude", "claude-1")]);

    let settings = Settings::new(
        dir.path().to_path_buf(),
        Some(dir.chatgpt_dir()),
        Some(dir.claude_dir()),
        Some(favorites),
    );
    (dir, settings)
}

fn load(settings: &Settings) -> chat_history_explorer::Library {
    let favorites = FavoriteSet::load(&settings.favorites_path).unwrap();
    load_library(settings, &ParseOptions::default(), &favorites)
}

#[test]
fn test_library_merges_providers_newest_first() {
    let (_dir, settings) = populated();
    let library = load(&settings);

    let ids: Vec<&str> = library.conversations().iter().map(|c| c.external_id.as_str()).collect();
    assert_eq!(ids, vec!["claude-1", "gpt-new", "gpt-old"]);
    assert!(library.get(Provider::Claude, "claude-1").unwrap().is_favorite);
    assert!(!library.get(Provider::ChatGpt, "gpt-new").unwrap().is_favorite);
    assert_eq!(library.failed_providers(), 0);
    assert_eq!(library.warnings().count(), 0);
}

#[test]
fn test_filters_over_library() {
    let (_dir, settings) = populated();
    let library = load(&settings);

    let favorites = apply_filters(library.conversations(), &parse_filter("favorite:true").unwrap());
    assert_eq!(favorites.len(), 1);

    let recent_chatgpt =
        apply_filters(library.conversations(), &parse_filter("provider:chatgpt since:2021-01-01").unwrap());
    let ids: Vec<&str> = recent_chatgpt.iter().map(|c| c.external_id.as_str()).collect();
    assert_eq!(ids, vec!["gpt-new"]);
}

#[test]
fn test_search_over_library_includes_attachment_text() {
    let (_dir, settings) = populated();
    let library = load(&settings);

    let hits = strict_search(library.conversations(), "borrow", 20);
    let kinds: Vec<(HitKind, &str)> = hits.iter().map(|h| (h.kind, h.conversation_id.as_str())).collect();
    assert_eq!(
        kinds,
        vec![
            (HitKind::Message, "claude-1"),
            (HitKind::Conversation, "gpt-new"),
            (HitKind::Message, "gpt-new"),
            (HitKind::Message, "gpt-new"),
        ]
    );

    let phrase = strict_search(library.conversations(), "\"overlapping borrows\"", 20);
    assert_eq!(phrase.len(), 1);
}

#[test]
fn test_export_writes_one_file_per_conversation() {
    let (dir, settings) = populated();
    let library = load(&settings);
    let out = dir.path().join("exports");

    let hidden_attachments = BlockFilter { include_attachments: false, ..BlockFilter::all() };
    let mut paths = Vec::new();
    for conversation in library.conversations() {
        paths.push(export_conversation(conversation, &hidden_attachments, ExportFormat::Markdown, &out).unwrap());
    }

    assert_eq!(paths.len(), 3);
    assert!(paths.iter().all(|p| p.extension().is_some_and(|ext| ext == "md")));
    let claude = std::fs::read_to_string(&paths[0]).unwrap();
    assert!(paths[0].starts_with(out.join("claude")));
    assert!(paths[0].file_name().unwrap().to_string_lossy().starts_with("2024-06-01-"));
    assert!(claude.starts_with("# Trip plan\n"));
    assert!(claude.contains("- Open URL: https://claude.ai/chat/claude-1"));
    assert!(claude.contains("plan a trip to Lisbon"));
    assert!(!claude.contains("borrow a bike"));
}

#[test]
fn test_one_bad_export_leaves_the_other_loaded() {
    let (dir, settings) = populated();
    dir.write_export(&dir.chatgpt_dir(), "{ not json");

    let library = load(&settings);

    assert_eq!(library.len(), 1);
    assert_eq!(library.failed_providers(), 1);
    let status = library.status(Provider::ChatGpt).unwrap();
    assert!(!status.is_loaded());
    assert!(status.failure_message().is_some());
}
