//! Fixed demonstration catalog behind "Inicializar Demo"

use super::SongRecord;

/// `(song, artist, genres)`
const DEMO_SONGS: &[(&str, &str, &[&str])] = &[
    ("Hey Jude", "The Beatles", &["Rock", "Pop"]),
    ("Let It Be", "The Beatles", &["Rock", "Pop"]),
    ("Bohemian Rhapsody", "Queen", &["Rock", "Progressive Rock"]),
    ("We Will Rock You", "Queen", &["Rock"]),
    ("Wish You Were Here", "Pink Floyd", &["Progressive Rock", "Rock"]),
    ("Comfortably Numb", "Pink Floyd", &["Progressive Rock", "Rock"]),
    ("Stairway to Heaven", "Led Zeppelin", &["Classic Rock", "Rock"]),
    ("Kashmir", "Led Zeppelin", &["Classic Rock", "Rock"]),
    ("Fix You", "Coldplay", &["Pop", "Alternative"]),
    ("Viva La Vida", "Coldplay", &["Pop", "Alternative"]),
    ("Radioactive", "Imagine Dragons", &["Alternative", "Rock"]),
    ("Demons", "Imagine Dragons", &["Alternative", "Pop"]),
    ("Do I Wanna Know?", "Arctic Monkeys", &["Alternative", "Rock"]),
    ("R U Mine?", "Arctic Monkeys", &["Alternative", "Rock"]),
];

pub const DEMO_ARTISTS: &[&str] = &[
    "The Beatles",
    "Queen",
    "Pink Floyd",
    "Led Zeppelin",
    "Coldplay",
    "Imagine Dragons",
    "Arctic Monkeys",
];

pub const DEMO_GENRES: &[&str] = &["Rock", "Pop", "Alternative", "Classic Rock", "Progressive Rock"];

/// Demo songs as ingestion records
pub fn demo_records() -> Vec<SongRecord> {
    DEMO_SONGS
        .iter()
        .map(|(title, artist, genres)| SongRecord {
            title: title.to_string(),
            artists: vec![artist.to_string()],
            genres: genres.iter().map(|g| g.to_string()).collect(),
        })
        .collect()
}

pub fn demo_song_count() -> usize {
    DEMO_SONGS.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_demo_lists_are_consistent() {
        let records = demo_records();
        let artists: BTreeSet<&str> = records.iter().flat_map(|r| r.artists.iter().map(String::as_str)).collect();
        let genres: BTreeSet<&str> = records.iter().flat_map(|r| r.genres.iter().map(String::as_str)).collect();

        assert_eq!(artists, DEMO_ARTISTS.iter().copied().collect());
        assert_eq!(genres, DEMO_GENRES.iter().copied().collect());
        assert_eq!(demo_song_count(), 14);
    }
}
