//! Integration tests for concurrent access patterns

use amplify_engine::graph::{SharedGraph, VertexKind};
use amplify_engine::ingest::catalog::StaticCatalog;
use amplify_engine::ingest::IngestionPipeline;
use amplify_engine::persistence;
use amplify_engine::similarity::recommend;
use amplify_engine::stats;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

fn large_catalog() -> StaticCatalog {
    let mut catalog = StaticCatalog::new();
    for artist in 0..20 {
        let name = format!("Artist {}", artist);
        let titles: Vec<String> = (0..10).map(|t| format!("Song {}-{}", artist, t)).collect();
        let tracks: Vec<(&str, &[&str])> = titles.iter().map(|t| (t.as_str(), &[][..])).collect();
        catalog = catalog.with_artist(&name, &["Shared", "Other"], &tracks);
    }
    catalog
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_partial_songs() {
    let graph = SharedGraph::default();
    let pipeline = Arc::new(IngestionPipeline::new(
        graph.clone(),
        Arc::new(large_catalog()),
        Duration::from_secs(5),
    ));

    // Seed one song so recommend has a base
    pipeline.import_artist("Artist 0").await.unwrap();
    let base = graph.read().await.find("Song 0-0", VertexKind::Song).unwrap();

    let mut join_set = JoinSet::new();

    for artist in 1..20 {
        let pipeline = Arc::clone(&pipeline);
        join_set.spawn(async move {
            pipeline.import_artist(&format!("Artist {}", artist)).await.unwrap();
        });
    }

    for _ in 0..20 {
        let graph = graph.clone();
        join_set.spawn(async move {
            for _ in 0..10 {
                let g = graph.read().await;
                // Every song is linked to exactly its artist and both genres
                for song in g.vertices_by_kind(VertexKind::Song) {
                    assert_eq!(g.degree(song.id), 3, "partial song {}", song.name);
                }
                let recs = recommend(&g, base, 5).unwrap();
                assert!(recs.iter().all(|r| r.vertex.id != base));
                drop(g);
                tokio::task::yield_now().await;
            }
        });
    }

    while let Some(result) = join_set.join_next().await {
        result.unwrap();
    }

    let g = graph.read().await;
    assert_eq!(g.count_by_kind(VertexKind::Song), 200);
    assert_eq!(g.count_by_kind(VertexKind::Artist), 20);
    assert_eq!(g.count_by_kind(VertexKind::Genre), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_replace_is_atomic_for_readers() {
    let graph = SharedGraph::default();
    let pipeline = IngestionPipeline::new(graph.clone(), Arc::new(StaticCatalog::new()), Duration::from_secs(5));
    pipeline.seed_demo().await.unwrap();

    let demo_text = persistence::encode(&*graph.read().await);
    let demo_stats = stats::snapshot(&*graph.read().await);

    let mut join_set = JoinSet::new();

    for i in 0..10 {
        let graph = graph.clone();
        let text = demo_text.clone();
        join_set.spawn(async move {
            let replacement = if i % 2 == 0 {
                persistence::decode(&text).unwrap()
            } else {
                amplify_engine::graph::Graph::new()
            };
            graph.replace(replacement).await;
        });
    }

    for _ in 0..10 {
        let graph = graph.clone();
        let demo_stats = demo_stats.clone();
        join_set.spawn(async move {
            for _ in 0..10 {
                let snapshot = stats::snapshot(&*graph.read().await);
                assert!(snapshot.vertices == 0 || snapshot == demo_stats);
                tokio::task::yield_now().await;
            }
        });
    }

    while let Some(result) = join_set.join_next().await {
        result.unwrap();
    }
}
