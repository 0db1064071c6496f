//! Topology readers for the TGF, NA and SIF text formats, plus the
//! tab-separated dump of trained conditional probability tables.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    time::SystemTime,
};

use log::{info, trace};

use crate::{errors::ParseError, network::Network};

impl Network {
    /// Reads a network topology, dispatching on the file extension
    /// (`.tgf`, `.na`, `.sif`), then assigns parents from adjacency and
    /// rejects cyclic graphs.
    ///
    /// # Errors
    ///
    /// * If the extension is unknown, the file unreadable or malformed.
    /// * If the loaded parent relation contains a cycle.
    pub fn read_network(&mut self, path: &Path) -> Result<(), ParseError> {
        let extension = path
            .extension()
            .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
            .ok_or_else(|| ParseError::UnknownExtension(path.display().to_string()))?;
        match extension.as_str() {
            "tgf" => self.read_tgf(path)?,
            "na" => self.read_na(path)?,
            "sif" => self.read_sif(path)?,
            _ => return Err(ParseError::UnknownExtension(path.display().to_string())),
        }
        self.assign_parents();
        self.cycle_check()?;
        Ok(())
    }

    /// Reads a TGF topology: node lines `<id> <name>` up to a line holding
    /// only `#`, then edge lines `<id_parent> <id_child>`. Original
    /// identifiers are remapped densely in file order.
    fn read_tgf(&mut self, path: &Path) -> Result<(), ParseError> {
        self.reset_topology();
        let mut in_edge_section = false;
        let mut edges = 0usize;
        let mut pending_edges: Vec<(usize, usize)> = Vec::new();

        for (index, line) in open_lines(path)?.enumerate() {
            let line = io_guard(line, path)?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed == "#" {
                in_edge_section = true;
                continue;
            }
            let mut tokens = trimmed.split_whitespace();
            if in_edge_section {
                let (parent, child) = two_ids(&mut tokens)
                    .ok_or_else(|| malformed("tgf", index, trimmed))?;
                pending_edges.push((parent, child));
            } else {
                let id = tokens
                    .next()
                    .and_then(|token| token.parse::<usize>().ok())
                    .ok_or_else(|| malformed("tgf", index, trimmed))?;
                let name = tokens.next().ok_or_else(|| malformed("tgf", index, trimmed))?;
                self.add_node(id, name)?;
            }
        }
        if pending_edges.is_empty() {
            return Err(ParseError::NoEdges);
        }

        self.init_adjacency();
        for (parent, child) in pending_edges {
            trace!("edge {parent} -> {child}");
            self.add_edge(self.dense_id(parent)?, self.dense_id(child)?)?;
            edges += 1;
        }
        info!("read {} nodes and {} edges from `{}`", self.node_count(), edges, path.display());
        Ok(())
    }

    /// Reads an NA node file: the header line is skipped, body lines are
    /// `<id> <discard> <name>`.
    fn read_na(&mut self, path: &Path) -> Result<(), ParseError> {
        self.reset_topology();
        for (index, line) in open_lines(path)?.enumerate().skip(1) {
            let line = io_guard(line, path)?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut tokens = trimmed.split_whitespace();
            let id = tokens
                .next()
                .and_then(|token| token.parse::<usize>().ok())
                .ok_or_else(|| malformed("na", index, trimmed))?;
            let _discard = tokens.next().ok_or_else(|| malformed("na", index, trimmed))?;
            let name = tokens.next().ok_or_else(|| malformed("na", index, trimmed))?;
            self.add_node(id, name)?;
        }
        self.init_adjacency();
        info!("read {} nodes from `{}`", self.node_count(), path.display());
        Ok(())
    }

    /// Reads a SIF edge file, `<id_parent> <relation> <id_child>` per line.
    /// The node alphabet must have been established by a prior NA load.
    fn read_sif(&mut self, path: &Path) -> Result<(), ParseError> {
        if self.node_count() == 0 {
            return Err(ParseError::MissingNodeFile);
        }
        let mut edges = 0usize;
        for (index, line) in open_lines(path)?.enumerate() {
            let line = io_guard(line, path)?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut tokens = trimmed.split_whitespace();
            let parent = tokens
                .next()
                .and_then(|token| token.parse::<usize>().ok())
                .ok_or_else(|| malformed("sif", index, trimmed))?;
            let _relation = tokens.next().ok_or_else(|| malformed("sif", index, trimmed))?;
            let child = tokens
                .next()
                .and_then(|token| token.parse::<usize>().ok())
                .ok_or_else(|| malformed("sif", index, trimmed))?;
            trace!("edge {parent} -> {child}");
            self.add_edge(self.dense_id(parent)?, self.dense_id(child)?)?;
            edges += 1;
        }
        info!("read {} edges from `{}`", edges, path.display());
        Ok(())
    }

    /// Dumps the trained CPTs as tab-separated lines
    /// `node  value  parent..  parent-config  probability` into a
    /// timestamped `Parameters_<timestamp>` file under `dir`, and returns
    /// the path written to.
    ///
    /// # Errors
    ///
    /// * If the file cannot be created or written.
    pub fn save_parameters(&self, dir: &Path) -> Result<PathBuf, std::io::Error> {
        let timestamp =
            humantime::format_rfc3339_seconds(SystemTime::now()).to_string().replace(':', "-");
        let path = dir.join(format!("Parameters_{timestamp}"));
        let mut file = BufWriter::new(File::create(&path)?);

        for node in self.nodes() {
            let table = node.probabilities();
            for row in 0..table.row_count() {
                let config = table
                    .row_names()
                    .get(row)
                    .cloned()
                    .unwrap_or_else(|| row.to_string());
                for (col, value) in node.values_excluding_na().iter().enumerate() {
                    write!(file, "{}\t{}\t", node.name(), value)?;
                    for &parent in node.parents() {
                        write!(file, "{}\t", self.node(parent).name())?;
                    }
                    writeln!(file, "{}\t{}", config, node.probability(row, col))?;
                }
            }
        }
        file.flush()?;
        Ok(path)
    }
}

fn open_lines(path: &Path) -> Result<std::io::Lines<BufReader<File>>, ParseError> {
    let file = File::open(path)
        .map_err(|source| ParseError::Io { path: path.display().to_string(), source })?;
    Ok(BufReader::new(file).lines())
}

fn io_guard(line: std::io::Result<String>, path: &Path) -> Result<String, ParseError> {
    line.map_err(|source| ParseError::Io { path: path.display().to_string(), source })
}

fn malformed(kind: &'static str, index: usize, content: &str) -> ParseError {
    ParseError::MalformedLine { kind, line: index + 1, content: content.to_owned() }
}

fn two_ids<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<(usize, usize)> {
    let first = tokens.next()?.parse::<usize>().ok()?;
    let second = tokens.next()?.parse::<usize>().ok()?;
    Some((first, second))
}
