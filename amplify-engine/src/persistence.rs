//! Persistence Layer
//!
//! Line-oriented text format, ids preserved exactly:
//!
//! ```text
//! # amplify-graph v1
//! next_id 17
//! vertices 2
//! 0	artista	Queen
//! 1	musica	Bohemian Rhapsody
//! edges 1
//! 0	1	1
//! ```
//!
//! Fields are tab separated; names escape `\\`, `\t`, `\n` and `\r`.

use amplify_common::{Error, Result};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::graph::{Edge, Graph, Vertex, VertexId, VertexKind};

const HEADER: &str = "# amplify-graph v1";

/// Serialize a graph to the text format
pub fn encode(graph: &Graph) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(&format!("next_id {}\n", graph.next_id()));

    out.push_str(&format!("vertices {}\n", graph.vertex_count()));
    for v in graph.vertices() {
        out.push_str(&format!("{}\t{}\t{}\n", v.id, v.kind.as_str(), escape(&v.name)));
    }

    out.push_str(&format!("edges {}\n", graph.edge_count()));
    for e in graph.edges() {
        out.push_str(&format!("{}\t{}\t{}\n", e.a, e.b, e.weight));
    }
    out
}

/// Parse and validate the text format into a new graph
pub fn decode(text: &str) -> Result<Graph> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));

    let (_, header) = lines.next().ok_or_else(|| corrupt(1, "empty file"))?;
    if header.trim_end() != HEADER {
        return Err(corrupt(1, "unrecognised header"));
    }

    let next_id: VertexId = parse_keyed(lines.next(), "next_id")?;

    let vertex_count: usize = parse_keyed(lines.next(), "vertices")?;
    let mut vertices = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        let (n, line) = lines
            .next()
            .ok_or_else(|| corrupt(0, "file ends inside vertex section"))?;
        let mut fields = line.splitn(3, '\t');
        let id = parse_field(fields.next(), n, "vertex id")?;
        let kind_str = fields.next().ok_or_else(|| corrupt(n, "missing vertex kind"))?;
        let kind = VertexKind::parse_strict(kind_str)
            .ok_or_else(|| corrupt(n, &format!("unknown vertex kind '{}'", kind_str)))?;
        let name = unescape(fields.next().ok_or_else(|| corrupt(n, "missing vertex name"))?)
            .map_err(|msg| corrupt(n, &msg))?;
        vertices.push(Vertex { id, name, kind });
    }

    let edge_count: usize = parse_keyed(lines.next(), "edges")?;
    let mut edges = Vec::with_capacity(edge_count);
    for _ in 0..edge_count {
        let (n, line) = lines
            .next()
            .ok_or_else(|| corrupt(0, "file ends inside edge section"))?;
        let mut fields = line.split('\t');
        let a = parse_field(fields.next(), n, "edge endpoint")?;
        let b = parse_field(fields.next(), n, "edge endpoint")?;
        let weight = parse_field(fields.next(), n, "edge weight")?;
        if fields.next().is_some() {
            return Err(corrupt(n, "trailing fields on edge line"));
        }
        edges.push(Edge { a, b, weight });
    }

    if let Some((n, extra)) = lines.find(|(_, l)| !l.trim().is_empty()) {
        return Err(corrupt(n, &format!("unexpected trailing content '{}'", extra)));
    }

    Graph::restore(next_id, vertices, edges)
        .map_err(|e| Error::Storage(format!("invalid graph file: {}", e)))
}

/// Write the encoded graph to `path` via a uniquely named temporary sibling
///
/// Each save gets its own temporary file, so concurrent saves never share
/// one; the last rename to a destination wins.
pub async fn save_to(text: &str, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| storage_io("create directory", &dir, e))?;

    let text = text.to_owned();
    let destination = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomically(&text, &dir, &destination))
        .await
        .map_err(|e| Error::Storage(format!("save task failed: {}", e)))?
}

fn write_atomically(text: &str, dir: &Path, destination: &Path) -> Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| storage_io("create temporary file in", dir, e))?;
    let tmp_path = tmp.path().to_path_buf();

    tmp.write_all(text.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| storage_io("write", &tmp_path, e))?;
    tmp.persist(destination)
        .map_err(|e| storage_io("rename", destination, e.error))?;
    Ok(())
}

/// Read and decode a graph file without touching any live graph
pub async fn load_from(path: &Path) -> Result<Graph> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| storage_io("read", path, e))?;
    decode(&text)
}

/// Resolve a caller-supplied file name inside the data folder
///
/// Absolute paths and parent-directory components are rejected.
pub fn resolve_in_folder(data_folder: &Path, requested: &str) -> Result<PathBuf> {
    let requested = requested.trim();
    if requested.is_empty() {
        return Err(Error::invalid("path must not be empty"));
    }

    let relative = Path::new(requested);
    for component in relative.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(Error::invalid(format!(
                    "path '{}' must stay inside the data folder",
                    requested
                )))
            }
        }
    }
    Ok(data_folder.join(relative))
}

fn parse_keyed<T: std::str::FromStr>(line: Option<(usize, &str)>, key: &str) -> Result<T> {
    let (n, line) = line.ok_or_else(|| corrupt(0, &format!("missing '{}' line", key)))?;
    let value = line
        .strip_prefix(key)
        .and_then(|rest| rest.strip_prefix(' '))
        .ok_or_else(|| corrupt(n, &format!("expected '{} <value>'", key)))?;
    value
        .trim()
        .parse()
        .map_err(|_| corrupt(n, &format!("invalid value for '{}'", key)))
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>, line: usize, what: &str) -> Result<T> {
    field
        .ok_or_else(|| corrupt(line, &format!("missing {}", what)))?
        .trim()
        .parse()
        .map_err(|_| corrupt(line, &format!("invalid {}", what)))
}

fn corrupt(line: usize, message: &str) -> Error {
    if line == 0 {
        Error::Storage(format!("corrupt graph file: {}", message))
    } else {
        Error::Storage(format!("corrupt graph file (line {}): {}", line, message))
    }
}

fn storage_io(action: &str, path: &Path, err: std::io::Error) -> Error {
    Error::Storage(format!("failed to {} {}: {}", action, path.display(), err))
}

fn escape(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(field: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => return Err(format!("unknown escape '\\{}'", other)),
            None => return Err("dangling escape".to_string()),
        }
    }
    Ok(out)
}
