//! Depth-limited breadth-first search over a JSON tree
//!
//! The walker visits one depth level at a time. Every property of every object
//! on the level is offered to a ranking predicate; the lowest rank on the
//! shallowest level wins, so alias priority beats object iteration order but
//! never beats depth.

use serde_json::Value;

/// Default depth bound for payload searches
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// A matched property
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit<'a> {
    pub key: &'a str,
    pub value: &'a Value,
    /// Depth of the object holding `key` (the root object is depth 0)
    pub depth: usize,
    /// Rank the predicate assigned (lower is better)
    pub rank: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeWalker {
    max_depth: usize,
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl TreeWalker {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Find the best-ranked property on the shallowest level that has one.
    ///
    /// `rank` returns `None` for properties that do not match.
    pub fn find<'a, F>(&self, root: &'a Value, mut rank: F) -> Option<Hit<'a>>
    where
        F: FnMut(&str, &Value) -> Option<usize>,
    {
        let mut level: Vec<&'a Value> = vec![root];
        let mut depth = 0;

        while !level.is_empty() && depth <= self.max_depth {
            let mut best: Option<Hit<'a>> = None;
            let mut next: Vec<&'a Value> = Vec::new();

            for node in level {
                match node {
                    Value::Object(map) => {
                        for (key, value) in map {
                            if let Some(r) = rank(key, value) {
                                if best.map_or(true, |b| r < b.rank) {
                                    best = Some(Hit {
                                        key: key.as_str(),
                                        value,
                                        depth,
                                        rank: r,
                                    });
                                }
                            }
                            if is_container(value) {
                                next.push(value);
                            }
                        }
                    }
                    Value::Array(items) => {
                        next.extend(items.iter().filter(|item| is_container(item)));
                    }
                    _ => {}
                }
            }

            if best.is_some() {
                return best;
            }
            level = next;
            depth += 1;
        }

        None
    }
}

fn is_container(value: &Value) -> bool {
    value.is_object() || value.is_array()
}
