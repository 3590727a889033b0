//! Where plot objects come from.

use std::collections::HashMap;

use emtf_core::{Error, Result};
use emtf_root::{Graph, Histogram, RootFile};

/// Keyed access to pre-built histograms and graphs.
pub trait ObjectSource {
    /// Name used in error messages (usually the file path).
    fn source_name(&self) -> String;

    /// Histogram stored under `key`.
    fn histogram(&self, key: &str) -> Result<Histogram>;

    /// Graph stored under `key`.
    fn graph(&self, key: &str) -> Result<Graph>;
}

impl ObjectSource for RootFile {
    fn source_name(&self) -> String {
        self.path().display().to_string()
    }

    fn histogram(&self, key: &str) -> Result<Histogram> {
        if !self.contains(key) {
            return Err(missing(self, key));
        }
        Ok(self.get_histogram(key)?)
    }

    fn graph(&self, key: &str) -> Result<Graph> {
        if !self.contains(key) {
            return Err(missing(self, key));
        }
        Ok(self.get_graph(key)?)
    }
}

fn missing(src: &impl ObjectSource, key: &str) -> Error {
    Error::MissingObject { key: key.to_string(), source_name: src.source_name() }
}

/// Objects held in memory, keyed by their names.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjects {
    name: String,
    histograms: HashMap<String, Histogram>,
    graphs: HashMap<String, Graph>,
}

impl MemoryObjects {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Add a histogram under its own name.
    pub fn with_histogram(mut self, h: Histogram) -> Self {
        self.histograms.insert(h.name.clone(), h);
        self
    }

    /// Add a graph under its own name.
    pub fn with_graph(mut self, g: Graph) -> Self {
        self.graphs.insert(g.name.clone(), g);
        self
    }
}

impl ObjectSource for MemoryObjects {
    fn source_name(&self) -> String {
        self.name.clone()
    }

    fn histogram(&self, key: &str) -> Result<Histogram> {
        self.histograms.get(key).cloned().ok_or_else(|| missing(self, key))
    }

    fn graph(&self, key: &str) -> Result<Graph> {
        self.graphs.get(key).cloned().ok_or_else(|| missing(self, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_name_the_source() {
        let src = MemoryObjects::new("mem").with_histogram(Histogram::uniform("h", 0.0, 1.0, vec![1.0]));
        assert!(src.histogram("h").is_ok());
        match src.graph("h") {
            Err(Error::MissingObject { key, source_name }) => {
                assert_eq!(key, "h");
                assert_eq!(source_name, "mem");
            }
            other => panic!("expected MissingObject, got {other:?}"),
        }
    }
}
