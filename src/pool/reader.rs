//! Graphs from a directory of adjacency text files.
//!
//! # File Format
//!
//! ```text
//! node size children
//! 10 4 11 12
//! 11 2 13
//! 12 2 13
//! 13 1
//! ```
//!
//! The first line is the literal header. Each following non-blank line is
//! `node size child...`. Node ids may be sparse; they are remapped to dense
//! ids in ascending order. Every child needs a line of its own.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{DagPool, NamedDag};
use crate::error::{Result, ScheduleError};
use crate::models::{Dag, DagBuilder, Weight};

const HEADER: [&str; 3] = ["node", "size", "children"];

/// Reads every `.txt` graph under a directory, in path order.
///
/// Files whose first line is not the graph header are skipped.
#[derive(Debug, Clone)]
pub struct DagReader {
    paths: Vec<PathBuf>,
    limit: usize,
    batch_size: usize,
    cursor: usize,
    produced: usize,
}

impl DagReader {
    /// Lists `directory` recursively.
    ///
    /// # Errors
    /// [`ScheduleError::Io`] if the directory cannot be listed, or
    /// [`ScheduleError::InvalidParameter`] for a zero batch size.
    pub fn new(directory: impl AsRef<Path>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(ScheduleError::invalid_parameter(
                "batchSize",
                0.0,
                "must be at least 1",
            ));
        }
        let mut paths = Vec::new();
        collect_text_files(directory.as_ref(), &mut paths)?;
        paths.sort();
        Ok(Self {
            limit: paths.len(),
            paths,
            batch_size,
            cursor: 0,
            produced: 0,
        })
    }

    /// Reads at most `limit` graphs. Skipped files do not count.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Candidate files, sorted.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

fn collect_text_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_text_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "txt") {
            out.push(path);
        }
    }
    Ok(())
}

/// Whether `text` starts with the graph header line.
fn has_header(text: &str) -> bool {
    text.lines()
        .next()
        .is_some_and(|line| line.split_whitespace().eq(HEADER))
}

/// Parses the body of a graph file (header already checked).
pub(crate) fn parse_graph(source_name: &str, text: &str) -> Result<Dag> {
    let parse_error = |line: usize, message: String| ScheduleError::Parse {
        source_name: source_name.to_string(),
        line,
        message,
    };

    let mut nodes: BTreeMap<u64, (Weight, Vec<u64>)> = BTreeMap::new();
    for (index, line) in text.lines().enumerate().skip(1) {
        let line_no = index + 1;
        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            continue;
        };
        let number = |token: &str| {
            token
                .parse::<u64>()
                .map_err(|_| parse_error(line_no, format!("`{token}` is not a non-negative integer")))
        };
        let node = number(first)?;
        let size = match tokens.next() {
            Some(token) => number(token)?,
            None => return Err(parse_error(line_no, format!("node {node} has no size"))),
        };
        let children = tokens.map(number).collect::<Result<Vec<_>>>()?;
        nodes.insert(node, (size, children));
    }

    let ids: BTreeSet<u64> = nodes
        .iter()
        .flat_map(|(&node, (_, children))| std::iter::once(node).chain(children.iter().copied()))
        .collect();
    let dense: BTreeMap<u64, usize> = ids.into_iter().enumerate().map(|(i, id)| (id, i)).collect();

    // Children without a line of their own stay unweighted and are rejected
    // by the builder.
    let mut builder = DagBuilder::new();
    for (node, (size, children)) in &nodes {
        builder.set_weight(dense[node], *size);
        for child in children {
            builder.add_edge(dense[node], dense[child]);
        }
    }
    builder.build()
}

impl DagPool for DagReader {
    fn next_batch(&mut self, buffer: &mut Vec<NamedDag>) -> Result<usize> {
        buffer.clear();
        while self.cursor < self.paths.len()
            && self.produced < self.limit
            && buffer.len() < self.batch_size
        {
            let path = &self.paths[self.cursor];
            self.cursor += 1;

            let text = fs::read_to_string(path)?;
            if !has_header(&text) {
                warn!(path = %path.display(), "skipping file without graph header");
                continue;
            }
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let dag = parse_graph(&path.display().to_string(), &text)?;
            debug!(name = %name, vertices = dag.vertex_count(), "read graph");
            buffer.push(NamedDag::new(name, dag));
            self.produced += 1;
        }
        Ok(buffer.len())
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn sample_count(&self) -> usize {
        self.limit.min(self.paths.len())
    }
}
