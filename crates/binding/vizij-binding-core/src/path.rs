//! Slash-separated property paths (`"Player/Stats/Lives"`).
//!
//! Every segment but the last names a nested view-model slot; the last names
//! the property itself. Segments are matched verbatim, spaces included.

use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::error::BindingError;

#[derive(Clone, PartialEq, Eq)]
pub struct PropertyPath {
    segments: Rc<[String]>,
}

impl PropertyPath {
    pub fn parse(path: &str) -> Result<Self, BindingError> {
        let invalid = |reason: &'static str| BindingError::InvalidPath {
            path: path.to_string(),
            reason,
        };
        if path.is_empty() {
            return Err(invalid("path is empty"));
        }
        let segments: Vec<String> = path.split('/').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(invalid("path contains an empty segment"));
        }
        Ok(Self {
            segments: segments.into(),
        })
    }

    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Nested-slot hops leading to the leaf.
    pub fn parents(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    pub fn leaf(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl fmt::Debug for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyPath({self})")
    }
}

/// Memoizes path splits. Hosts resolve the same handful of paths every frame,
/// so a small bounded cache avoids re-splitting them.
#[derive(Debug)]
pub struct PathCache {
    entries: HashMap<String, PropertyPath>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl PathCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    pub fn resolve(&mut self, path: &str) -> Result<PropertyPath, BindingError> {
        if let Some(parsed) = self.entries.get(path) {
            self.hits += 1;
            return Ok(parsed.clone());
        }
        self.misses += 1;
        let parsed = PropertyPath::parse(path)?;
        if self.capacity == 0 {
            return Ok(parsed);
        }
        if self.entries.len() >= self.capacity {
            log::trace!("path cache full ({} entries), clearing", self.entries.len());
            self.entries.clear();
        }
        self.entries.insert(path.to_string(), parsed.clone());
        Ok(parsed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_parents_and_leaf() {
        let p = PropertyPath::parse("Player/Stats/Lives").unwrap();
        assert_eq!(p.parents(), ["Player", "Stats"]);
        assert_eq!(p.leaf(), "Lives");
        assert_eq!(p.depth(), 3);
        assert_eq!(p.to_string(), "Player/Stats/Lives");

        let flat = PropertyPath::parse("Max Health").unwrap();
        assert!(flat.parents().is_empty());
        assert_eq!(flat.leaf(), "Max Health");
    }

    #[test]
    fn rejects_empty_paths_and_segments() {
        for bad in ["", "/", "A//B", "A/", "/A"] {
            let err = PropertyPath::parse(bad).unwrap_err();
            assert!(matches!(err, BindingError::InvalidPath { .. }), "{bad}");
        }
    }

    #[test]
    fn cache_counts_hits_and_stays_bounded() {
        let mut cache = PathCache::new(2);
        cache.resolve("A/B").unwrap();
        cache.resolve("A/B").unwrap();
        assert_eq!(cache.stats(), (1, 1));

        cache.resolve("C").unwrap();
        cache.resolve("D").unwrap();
        assert!(cache.len() <= 2);
        assert!(cache.resolve("").is_err());
    }
}
