//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::path::PathArg;

/// Normalized data node.
///
/// `Choice`, `Map` and `LeafSet` are mixin nodes: they group their children
/// but have no element of their own once encoded on the wire.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DataNode {
    Container {
        name: String,
        #[serde(default)]
        children: Vec<DataNode>,
    },
    Choice {
        name: String,
        #[serde(default)]
        children: Vec<DataNode>,
    },
    Map {
        name: String,
        #[serde(default)]
        entries: Vec<DataNode>,
    },
    MapEntry {
        name: String,
        keys: BTreeMap<String, String>,
        #[serde(default)]
        children: Vec<DataNode>,
    },
    Leaf {
        name: String,
        value: String,
    },
    LeafSet {
        name: String,
        #[serde(default)]
        values: Vec<String>,
    },
}

// ===== impl DataNode =====

impl DataNode {
    pub fn container(name: impl Into<String>, children: Vec<DataNode>) -> Self {
        DataNode::Container {
            name: name.into(),
            children,
        }
    }

    pub fn leaf(name: impl Into<String>, value: impl Into<String>) -> Self {
        DataNode::Leaf {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn map(name: impl Into<String>, entries: Vec<DataNode>) -> Self {
        DataNode::Map {
            name: name.into(),
            entries,
        }
    }

    // Creates a list entry. Key leaves missing from `children` are added.
    pub fn map_entry<K, V>(
        name: impl Into<String>,
        keys: impl IntoIterator<Item = (K, V)>,
        children: Vec<DataNode>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let keys: BTreeMap<String, String> = keys
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        let entry = DataNode::MapEntry {
            name: name.into(),
            keys,
            children: Vec::new(),
        };
        entry.with_children(children)
    }

    pub fn name(&self) -> &str {
        match self {
            DataNode::Container { name, .. }
            | DataNode::Choice { name, .. }
            | DataNode::Map { name, .. }
            | DataNode::MapEntry { name, .. }
            | DataNode::Leaf { name, .. }
            | DataNode::LeafSet { name, .. } => name,
        }
    }

    pub fn identifier(&self) -> PathArg {
        match self {
            DataNode::MapEntry { name, keys, .. } => PathArg::Entry {
                name: name.clone(),
                keys: keys.clone(),
            },
            _ => PathArg::Node(self.name().to_owned()),
        }
    }

    // Returns whether this node is the one addressed by the given step.
    pub fn matches(&self, arg: &PathArg) -> bool {
        match (self, arg) {
            (DataNode::MapEntry { name, keys, .. }, PathArg::Entry {
                name: arg_name,
                keys: arg_keys,
            }) => name == arg_name && keys == arg_keys,
            (DataNode::MapEntry { .. }, PathArg::Node(_)) => false,
            (_, PathArg::Node(arg_name)) => self.name() == arg_name,
            (_, PathArg::Entry { .. }) => false,
        }
    }

    pub fn is_mixin(&self) -> bool {
        matches!(
            self,
            DataNode::Choice { .. } | DataNode::Map { .. } | DataNode::LeafSet { .. }
        )
    }

    // Returns whether this is a mixin node without any content.
    pub fn is_empty_mixin(&self) -> bool {
        match self {
            DataNode::Choice { children, .. } => children.is_empty(),
            DataNode::Map { entries, .. } => entries.is_empty(),
            DataNode::LeafSet { values, .. } => values.is_empty(),
            _ => false,
        }
    }

    fn is_leaf_kind(&self) -> bool {
        matches!(self, DataNode::Leaf { .. } | DataNode::LeafSet { .. })
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            DataNode::Leaf { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn children(&self) -> &[DataNode] {
        match self {
            DataNode::Container { children, .. }
            | DataNode::Choice { children, .. }
            | DataNode::MapEntry { children, .. } => children,
            DataNode::Map { entries, .. } => entries,
            DataNode::Leaf { .. } | DataNode::LeafSet { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<DataNode>> {
        match self {
            DataNode::Container { children, .. }
            | DataNode::Choice { children, .. }
            | DataNode::MapEntry { children, .. } => Some(children),
            DataNode::Map { entries, .. } => Some(entries),
            DataNode::Leaf { .. } | DataNode::LeafSet { .. } => None,
        }
    }

    pub fn into_children(self) -> Vec<DataNode> {
        match self {
            DataNode::Container { children, .. }
            | DataNode::Choice { children, .. }
            | DataNode::MapEntry { children, .. } => children,
            DataNode::Map { entries, .. } => entries,
            DataNode::Leaf { .. } | DataNode::LeafSet { .. } => Vec::new(),
        }
    }

    pub fn child(&self, arg: &PathArg) -> Option<&DataNode> {
        self.children().iter().find(|child| child.matches(arg))
    }

    // Looks up a descendant using a relative sequence of steps.
    pub fn find(&self, args: &[PathArg]) -> Option<&DataNode> {
        args.iter().try_fold(self, |node, arg| node.child(arg))
    }

    // Returns a copy of this node holding the given children instead of its
    // own.
    pub fn with_children(&self, children: Vec<DataNode>) -> DataNode {
        match self {
            DataNode::Container { name, .. } => DataNode::Container {
                name: name.clone(),
                children,
            },
            DataNode::Choice { name, .. } => DataNode::Choice {
                name: name.clone(),
                children,
            },
            DataNode::Map { name, .. } => DataNode::Map {
                name: name.clone(),
                entries: children,
            },
            DataNode::MapEntry { name, keys, .. } => {
                let mut entry = DataNode::MapEntry {
                    name: name.clone(),
                    keys: keys.clone(),
                    children: key_leaves(keys),
                };
                entry.merge(DataNode::MapEntry {
                    name: name.clone(),
                    keys: keys.clone(),
                    children,
                });
                entry
            }
            DataNode::Leaf { .. } | DataNode::LeafSet { .. } => self.clone(),
        }
    }

    /// Merges another node addressed by the same identifier into this one.
    ///
    /// Children present on both sides are merged recursively, children only
    /// present in `other` are appended. Leaf values are overwritten and
    /// leaf-list values are unioned.
    pub fn merge(&mut self, other: DataNode) {
        match (self, other) {
            (DataNode::Leaf { value, .. }, DataNode::Leaf { value: new, .. }) => {
                *value = new;
            }
            (
                DataNode::LeafSet { values, .. },
                DataNode::LeafSet { values: new, .. },
            ) => {
                for value in new {
                    if !values.contains(&value) {
                        values.push(value);
                    }
                }
            }
            (node, other) => {
                if node.is_leaf_kind() || other.is_leaf_kind() {
                    *node = other;
                    return;
                }
                let Some(children) = node.children_mut() else {
                    return;
                };
                for child in other.into_children() {
                    let arg = child.identifier();
                    match children.iter_mut().find(|c| c.matches(&arg)) {
                        Some(existing) => existing.merge(child),
                        None => children.push(child),
                    }
                }
            }
        }
    }

    // Creates an empty node for a missing ancestor addressed by `arg`. The
    // following step decides whether a plain node is a list.
    pub fn synthesize(arg: &PathArg, next: Option<&PathArg>) -> DataNode {
        match (arg, next) {
            (PathArg::Node(name), Some(PathArg::Entry { name: next, .. }))
                if name == next =>
            {
                DataNode::map(name.clone(), Vec::new())
            }
            (PathArg::Node(name), _) => DataNode::container(name.clone(), Vec::new()),
            (PathArg::Entry { name, keys }, _) => DataNode::MapEntry {
                name: name.clone(),
                keys: keys.clone(),
                children: key_leaves(keys),
            },
        }
    }
}

// ===== helper functions =====

fn key_leaves(keys: &BTreeMap<String, String>) -> Vec<DataNode> {
    keys.iter()
        .map(|(key, value)| DataNode::leaf(key.clone(), value.clone()))
        .collect()
}

// ===== unit tests =====
