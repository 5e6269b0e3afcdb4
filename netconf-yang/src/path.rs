//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::Error;

// Single step of an instance path.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum PathArg {
    // Container, leaf, choice or the list/leaf-list node itself.
    Node(String),
    // List entry identified by its key values.
    Entry {
        name: String,
        keys: BTreeMap<String, String>,
    },
}

/// Absolute path addressing a node in a data tree.
///
/// A list entry is addressed by two steps, the list node followed by the
/// keyed entry, so `/mod:list[name='a']` parses into
/// `[Node("mod:list"), Entry { name: "mod:list", keys: {name: a} }]`. The
/// empty path addresses the datastore root.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstancePath(Vec<PathArg>);

// ===== impl PathArg =====

impl PathArg {
    pub fn node(name: impl Into<String>) -> PathArg {
        PathArg::Node(name.into())
    }

    pub fn entry<K, V>(
        name: impl Into<String>,
        keys: impl IntoIterator<Item = (K, V)>,
    ) -> PathArg
    where
        K: Into<String>,
        V: Into<String>,
    {
        PathArg::Entry {
            name: name.into(),
            keys: keys
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PathArg::Node(name) => name,
            PathArg::Entry { name, .. } => name,
        }
    }
}

impl std::fmt::Display for PathArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathArg::Node(name) => write!(f, "{name}"),
            PathArg::Entry { name, keys } => {
                let predicates = keys
                    .iter()
                    .map(|(key, value)| {
                        let quote = if value.contains('\'') { '"' } else { '\'' };
                        format!("[{key}={quote}{value}{quote}]")
                    })
                    .join("");
                write!(f, "{name}{predicates}")
            }
        }
    }
}

// ===== impl InstancePath =====

impl InstancePath {
    pub fn new(args: Vec<PathArg>) -> InstancePath {
        InstancePath(args)
    }

    pub fn root() -> InstancePath {
        InstancePath(Vec::new())
    }

    pub fn args(&self) -> &[PathArg] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&PathArg> {
        self.0.last()
    }

    pub fn parent(&self) -> Option<InstancePath> {
        self.0
            .split_last()
            .map(|(_, parent)| InstancePath(parent.to_vec()))
    }

    // Returns a new path with the given step appended.
    pub fn child(&self, arg: PathArg) -> InstancePath {
        let mut args = self.0.clone();
        args.push(arg);
        InstancePath(args)
    }

    // Returns a new path with all steps of a relative path appended.
    pub fn join(&self, relative: &InstancePath) -> InstancePath {
        let mut args = self.0.clone();
        args.extend(relative.0.iter().cloned());
        InstancePath(args)
    }
}

impl std::fmt::Display for InstancePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }

        for (i, arg) in self.0.iter().enumerate() {
            // The list node is implied by the entry that follows it.
            if let PathArg::Node(name) = arg
                && let Some(PathArg::Entry { name: next, .. }) =
                    self.0.get(i + 1)
                && name == next
            {
                continue;
            }
            write!(f, "/{arg}")?;
        }
        Ok(())
    }
}

impl FromStr for InstancePath {
    type Err = Error;

    fn from_str(path: &str) -> Result<InstancePath, Error> {
        let trimmed = path.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return Ok(InstancePath::root());
        }
        let Some(relative) = trimmed.strip_prefix('/') else {
            return Err(Error::InvalidPath(
                path.to_owned(),
                "path must be absolute",
            ));
        };

        let mut args = Vec::new();
        for segment in split_segments(relative) {
            let segment_args = parse_segment(segment)
                .map_err(|reason| Error::InvalidPath(path.to_owned(), reason))?;
            args.extend(segment_args);
        }

        Ok(InstancePath(args))
    }
}

impl TryFrom<String> for InstancePath {
    type Error = Error;

    fn try_from(path: String) -> Result<InstancePath, Error> {
        path.parse()
    }
}

impl From<InstancePath> for String {
    fn from(path: InstancePath) -> String {
        path.to_string()
    }
}

impl From<Vec<PathArg>> for InstancePath {
    fn from(args: Vec<PathArg>) -> InstancePath {
        InstancePath(args)
    }
}

// ===== helper functions =====

// Splits a path on '/' separators that aren't part of a quoted key value.
fn split_segments(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut quote = None;
    let mut start = 0;

    for (i, c) in path.char_indices() {
        match (quote, c) {
            (None, '\'' | '"') => quote = Some(c),
            (Some(open), c) if c == open => quote = None,
            (None, '/') => {
                segments.push(&path[start..i]);
                start = i + 1;
            }
            _ => (),
        }
    }
    segments.push(&path[start..]);

    segments
}

fn parse_segment(segment: &str) -> Result<Vec<PathArg>, &'static str> {
    let (name, mut predicates) = match segment.find('[') {
        Some(pos) => segment.split_at(pos),
        None => (segment, ""),
    };
    let name = name.trim();
    if name.is_empty() {
        return Err("empty node name");
    }
    if predicates.is_empty() {
        return Ok(vec![PathArg::node(name)]);
    }

    let mut keys = BTreeMap::new();
    while !predicates.is_empty() {
        let body = predicates.strip_prefix('[').ok_or("expected '['")?;
        let (key, body) =
            body.split_once('=').ok_or("expected '=' in key predicate")?;
        let key = key.trim();
        if key.is_empty() {
            return Err("empty key name");
        }

        let body = body.trim_start();
        let quote = body
            .chars()
            .next()
            .filter(|c| *c == '\'' || *c == '"')
            .ok_or("key value must be quoted")?;
        let body = &body[1..];
        let end = body.find(quote).ok_or("unterminated key value")?;
        let value = &body[..end];
        predicates = body[end + 1..]
            .trim_start()
            .strip_prefix(']')
            .ok_or("expected ']'")?;

        if keys.insert(key.to_owned(), value.to_owned()).is_some() {
            return Err("duplicate key predicate");
        }
    }

    Ok(vec![
        PathArg::node(name),
        PathArg::Entry {
            name: name.to_owned(),
            keys,
        },
    ])
}

// ===== unit tests =====
