//! Similarity Engine
//!
//! Structural similarity only: Jaccard over neighbor-id sets. For songs the
//! profile is the set of non-song neighbors (artists, genres, unknowns), so
//! songs linked directly to each other do not inflate their own overlap.

use amplify_common::{Error, Result};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::graph::{Graph, Vertex, VertexId, VertexKind};

/// One ranked recommendation
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub vertex: Vertex,
    pub score: f64,
}

/// Neighbor-id profile used for similarity
pub fn profile(graph: &Graph, id: VertexId) -> Result<BTreeSet<VertexId>> {
    let vertex = graph.vertex(id)?;
    let skip_songs = vertex.kind == VertexKind::Song;

    Ok(graph
        .neighbor_ids(id)
        .filter(|other| {
            !skip_songs
                || graph
                    .vertex(*other)
                    .map(|v| v.kind != VertexKind::Song)
                    .unwrap_or(false)
        })
        .collect())
}

/// `|A ∩ B| / |A ∪ B|`, defined as 0 when both sets are empty
pub fn jaccard_sets(a: &BTreeSet<VertexId>, b: &BTreeSet<VertexId>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Jaccard similarity of two vertices' profiles, in `[0, 1]`
pub fn jaccard(graph: &Graph, a: VertexId, b: VertexId) -> Result<f64> {
    let pa = profile(graph, a)?;
    let pb = profile(graph, b)?;
    Ok(jaccard_sets(&pa, &pb))
}

/// Rank every other song by similarity to `song_id`
///
/// Songs with zero overlap are not recommendations and are left out.
/// Ordering: score descending, then vertex id ascending.
pub fn recommend(graph: &Graph, song_id: VertexId, limit: usize) -> Result<Vec<Recommendation>> {
    if limit == 0 {
        return Err(Error::invalid("limit must be at least 1"));
    }

    let base = graph.vertex(song_id)?;
    if base.kind != VertexKind::Song {
        return Err(Error::invalid(format!(
            "vertex {} is a {}, not a song",
            song_id, base.kind
        )));
    }

    let base_profile = profile(graph, song_id)?;
    if base_profile.is_empty() {
        tracing::debug!(song_id, "Song has no artist/genre connections");
        return Ok(Vec::new());
    }

    let mut ranked: Vec<Recommendation> = Vec::new();
    for candidate in graph.vertices_by_kind(VertexKind::Song) {
        if candidate.id == song_id {
            continue;
        }
        let score = jaccard_sets(&base_profile, &profile(graph, candidate.id)?);
        if score > 0.0 {
            ranked.push(Recommendation {
                vertex: candidate.clone(),
                score,
            });
        }
    }

    ranked.sort_by(|x, y| {
        y.score
            .partial_cmp(&x.score)
            .unwrap_or(Ordering::Equal)
            .then(x.vertex.id.cmp(&y.vertex.id))
    });
    ranked.truncate(limit);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two songs by one artist, genres {rock, pop} and {rock}; one unrelated song
    fn fixture() -> (Graph, VertexId, VertexId, VertexId) {
        let mut g = Graph::new();
        let artist = g.create_vertex("The Beatles", VertexKind::Artist).unwrap();
        let rock = g.create_vertex("Rock", VertexKind::Genre).unwrap();
        let pop = g.create_vertex("Pop", VertexKind::Genre).unwrap();
        let jazz = g.create_vertex("Jazz", VertexKind::Genre).unwrap();

        let hey_jude = g.create_vertex("Hey Jude", VertexKind::Song).unwrap();
        let let_it_be = g.create_vertex("Let It Be", VertexKind::Song).unwrap();
        let so_what = g.create_vertex("So What", VertexKind::Song).unwrap();

        for (song, targets) in [
            (hey_jude, vec![artist, rock, pop]),
            (let_it_be, vec![artist, rock]),
            (so_what, vec![jazz]),
        ] {
            for t in targets {
                g.connect(song, t, 1.0).unwrap();
            }
        }
        (g, hey_jude, let_it_be, so_what)
    }

    #[test]
    fn test_jaccard_fraction() {
        let (g, a, b, _) = fixture();
        let score = jaccard(&g, a, b).unwrap();
        assert!((score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_jaccard_symmetric() {
        let (g, a, b, c) = fixture();
        for (x, y) in [(a, b), (a, c), (b, c)] {
            assert_eq!(jaccard(&g, x, y).unwrap(), jaccard(&g, y, x).unwrap());
        }
    }

    #[test]
    fn test_jaccard_self() {
        let (mut g, a, _, _) = fixture();
        assert_eq!(jaccard(&g, a, a).unwrap(), 1.0);

        let lonely = g.create_vertex("Lonely", VertexKind::Song).unwrap();
        assert_eq!(jaccard(&g, lonely, lonely).unwrap(), 0.0);
    }

    #[test]
    fn test_jaccard_empty_sets_is_zero() {
        let mut g = Graph::new();
        let a = g.create_vertex("a", VertexKind::Song).unwrap();
        let b = g.create_vertex("b", VertexKind::Song).unwrap();
        assert_eq!(jaccard(&g, a, b).unwrap(), 0.0);
    }

    #[test]
    fn test_song_neighbors_excluded_from_profile() {
        let (mut g, a, b, _) = fixture();
        let before = jaccard(&g, a, b).unwrap();
        g.connect(a, b, 1.0).unwrap();
        assert_eq!(jaccard(&g, a, b).unwrap(), before);
    }

    #[test]
    fn test_jaccard_unknown_vertex() {
        let (g, a, _, _) = fixture();
        assert!(matches!(jaccard(&g, a, 999), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_recommend_orders_and_excludes_self() {
        let (mut g, a, b, _) = fixture();
        let pop = g.find("Pop", VertexKind::Genre).unwrap();
        let rock = g.find("Rock", VertexKind::Genre).unwrap();
        // Same score as `b` (2/3) but created later
        let twin = g.create_vertex("Twin", VertexKind::Song).unwrap();
        g.connect(twin, pop, 1.0).unwrap();
        g.connect(twin, rock, 1.0).unwrap();

        let recs = recommend(&g, a, 10).unwrap();
        let ids: Vec<VertexId> = recs.iter().map(|r| r.vertex.id).collect();

        assert_eq!(ids, vec![b, twin]);
        assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(!ids.contains(&a));
    }

    #[test]
    fn test_recommend_respects_limit() {
        let (g, a, b, _) = fixture();
        let recs = recommend(&g, a, 1).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].vertex.id, b);
    }

    #[test]
    fn test_recommend_zero_limit_rejected() {
        let (g, a, _, _) = fixture();
        assert!(matches!(recommend(&g, a, 0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_recommend_single_song_graph() {
        let mut g = Graph::new();
        let song = g.create_vertex("Solo", VertexKind::Song).unwrap();
        let genre = g.create_vertex("Rock", VertexKind::Genre).unwrap();
        g.connect(song, genre, 1.0).unwrap();
        assert!(recommend(&g, song, 5).unwrap().is_empty());
    }

    #[test]
    fn test_recommend_requires_song() {
        let (g, _, _, _) = fixture();
        let artist = g.find("The Beatles", VertexKind::Artist).unwrap();
        assert!(matches!(recommend(&g, artist, 5), Err(Error::InvalidArgument(_))));
    }
}
