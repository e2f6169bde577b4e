use std::fs;
use std::hint::black_box;

use chat_history_explorer::parsers::{ParseOptions, parse_export};
use chat_history_explorer::search::strict_search;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Map, Value, json};
use tempfile::TempDir;

const MESSAGES_PER_CONVERSATION: usize = 20;

/// Linear chain of `MESSAGES_PER_CONVERSATION` nodes with one abandoned fork
fn chatgpt_conversation(index: usize) -> Value {
    let mut mapping = Map::new();
    mapping.insert("root".to_string(), json!({"id": "root", "parent": null, "children": ["n0"], "message": null}));

    for i in 0..MESSAGES_PER_CONVERSATION {
        let id = format!("n{}", i);
        let mut children = vec![];
        if i + 1 < MESSAGES_PER_CONVERSATION {
            children.push(json!(format!("n{}", i + 1)));
        }
        if i == 3 {
            children.push(json!("fork"));
        }
        let parent = if i == 0 { "root".to_string() } else { format!("n{}", i - 1) };
        let role = if i % 2 == 0 { "user" } else { "assistant" };
        mapping.insert(
            id.clone(),
            json!({
                "id": id,
                "parent": parent,
                "children": children,
                "message": {
                    "id": id,
                    "author": {"role": role},
                    "create_time": 1_700_000_000.0 + (index * 100 + i) as f64,
                    "content": {"content_type": "text", "parts": [format!("Message {} of conversation {} about parsing", i, index)]}
                }
            }),
        );
    }
    mapping.insert(
        "fork".to_string(),
        json!({
            "id": "fork",
            "parent": "n3",
            "children": [],
            "message": {"id": "fork", "author": {"role": "assistant"}, "content": {"content_type": "text", "parts": ["regenerated"]}}
        }),
    );

    json!({
        "id": format!("conv-{}", index),
        "title": format!("Conversation {}", index),
        "create_time": 1_700_000_000.0 + (index * 100) as f64,
        "mapping": Value::Object(mapping),
        "current_node": format!("n{}", MESSAGES_PER_CONVERSATION - 1)
    })
}

/// Write a synthetic ChatGPT export with N conversations
fn generate_export(num_conversations: usize) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let conversations: Vec<Value> = (0..num_conversations).map(chatgpt_conversation).collect();
    let path = dir.path().join("conversations.json");
    fs::write(&path, Value::Array(conversations).to_string()).unwrap();
    (dir, path)
}

fn bench_parse_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_export");

    for size in [10, 100, 1_000].iter() {
        let (_dir, path) = generate_export(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| parse_export(black_box(&path), &ParseOptions::default()).unwrap());
        });
    }

    group.finish();
}

fn bench_strict_search(c: &mut Criterion) {
    let (_dir, path) = generate_export(1_000);
    let export = parse_export(&path, &ParseOptions::default()).unwrap();

    c.bench_function("strict_search_1000_conversations", |b| {
        b.iter(|| strict_search(&export.conversations, black_box("conversation 999"), 20));
    });
}

criterion_group!(benches, bench_parse_export, bench_strict_search);
criterion_main!(benches);
