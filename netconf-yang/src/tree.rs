//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::{Deserialize, Serialize};

use crate::common::{EffectiveOperation, ErrorTag, ErrorType, RpcError};
use crate::node::DataNode;
use crate::path::{InstancePath, PathArg};

// Name of the container wrapping the top-level nodes of a datastore.
pub const DATA_ROOT: &str = "data";

/// In-memory datastore contents.
///
/// Edits follow the NETCONF `edit-config` operation semantics.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(transparent)]
pub struct DataTree {
    nodes: Vec<DataNode>,
}

// ===== impl DataTree =====

impl DataTree {
    pub fn new() -> DataTree {
        DataTree::default()
    }

    pub fn from_nodes(nodes: Vec<DataNode>) -> DataTree {
        let mut tree = DataTree { nodes };
        tree.prune();
        tree
    }

    pub fn nodes(&self) -> &[DataNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, path: &InstancePath) -> Option<&DataNode> {
        let (first, rest) = path.args().split_first()?;
        self.nodes
            .iter()
            .find(|node| node.matches(first))?
            .find(rest)
    }

    pub fn contains(&self, path: &InstancePath) -> bool {
        self.get(path).is_some()
    }

    // Returns the whole datastore wrapped in the root container.
    pub fn to_data_node(&self) -> DataNode {
        DataNode::container(DATA_ROOT, self.nodes.clone())
    }

    // Reads the node at the given path. The root path reads the whole
    // datastore.
    pub fn read(&self, path: &InstancePath) -> Option<DataNode> {
        if path.is_empty() {
            return Some(self.to_data_node());
        }
        self.get(path).cloned()
    }

    /// Reads the node at the given path restricted to the given fields.
    ///
    /// Each field is a path relative to the selected node. Fields crossing a
    /// list are applied to every list entry. An empty field list selects the
    /// whole node.
    pub fn select(
        &self,
        path: &InstancePath,
        fields: &[InstancePath],
    ) -> Option<DataNode> {
        let node = self.read(path)?;
        if fields.is_empty() {
            return Some(node);
        }

        let mut selected: Option<DataNode> = None;
        for field in fields {
            let Some(projection) = project(&node, field.args()) else {
                continue;
            };
            match &mut selected {
                Some(selected) => selected.merge(projection),
                None => selected = Some(projection),
            }
        }
        selected
    }

    // Returns a tree holding only the selected node and its ancestors.
    pub fn subtree(
        &self,
        path: &InstancePath,
        fields: &[InstancePath],
    ) -> DataTree {
        let mut tree = DataTree::new();
        if let Some(node) = self.select(path, fields) {
            let result =
                tree.apply(path, Some(node), EffectiveOperation::Replace);
            debug_assert!(result.is_ok(), "selection off its path: {result:?}");
        }
        tree
    }

    /// Applies a single edit at the given path.
    ///
    /// `merge`, `replace` and `create` create any missing ancestor. On
    /// failure the tree may be partially modified, callers needing atomicity
    /// apply edits to a copy.
    pub fn apply(
        &mut self,
        path: &InstancePath,
        data: Option<DataNode>,
        operation: EffectiveOperation,
    ) -> Result<(), RpcError> {
        let Some((last, ancestors)) = path.args().split_last() else {
            return self.apply_root(data, operation);
        };

        match operation {
            EffectiveOperation::None => Ok(()),
            EffectiveOperation::Merge
            | EffectiveOperation::Replace
            | EffectiveOperation::Create => {
                let data = check_data(path, last, data, operation)?;
                let siblings = siblings_mut(&mut self.nodes, path, ancestors)
                    .ok_or_else(|| bad_element(path))?;
                let position = siblings.iter().position(|node| node.matches(last));
                match (operation, position) {
                    (EffectiveOperation::Create, Some(_)) => {
                        return Err(RpcError::new(
                            ErrorType::Protocol,
                            ErrorTag::DataExists,
                            format!("data already exists at {path}"),
                        ));
                    }
                    (EffectiveOperation::Merge, Some(pos)) => {
                        siblings[pos].merge(data)
                    }
                    (_, Some(pos)) => siblings[pos] = data,
                    (_, None) => siblings.push(data),
                }
                self.prune();
                Ok(())
            }
            EffectiveOperation::Delete | EffectiveOperation::Remove => {
                let removed = find_siblings_mut(&mut self.nodes, ancestors)
                    .and_then(|siblings| {
                        let pos =
                            siblings.iter().position(|node| node.matches(last))?;
                        Some(siblings.remove(pos))
                    });
                if removed.is_none()
                    && operation == EffectiveOperation::Delete
                {
                    return Err(RpcError::new(
                        ErrorType::Protocol,
                        ErrorTag::DataMissing,
                        format!("data is missing at {path}"),
                    ));
                }
                self.prune();
                Ok(())
            }
        }
    }

    // Edit addressing the whole datastore. The data, when present, is the
    // root container holding the new top-level nodes.
    fn apply_root(
        &mut self,
        data: Option<DataNode>,
        operation: EffectiveOperation,
    ) -> Result<(), RpcError> {
        let nodes = data.map(DataNode::into_children).unwrap_or_default();
        match operation {
            EffectiveOperation::None => (),
            EffectiveOperation::Merge => {
                let mut root = self.to_data_node();
                root.merge(DataNode::container(DATA_ROOT, nodes));
                self.nodes = root.into_children();
            }
            EffectiveOperation::Replace => self.nodes = nodes,
            EffectiveOperation::Create => {
                for node in nodes {
                    let arg = node.identifier();
                    if self.nodes.iter().any(|n| n.matches(&arg)) {
                        return Err(RpcError::new(
                            ErrorType::Protocol,
                            ErrorTag::DataExists,
                            format!("data already exists at /{arg}"),
                        ));
                    }
                    self.nodes.push(node);
                }
            }
            EffectiveOperation::Delete | EffectiveOperation::Remove => {
                self.nodes.clear()
            }
        }
        self.prune();
        Ok(())
    }

    // Drops mixin nodes left without content.
    fn prune(&mut self) {
        prune_nodes(&mut self.nodes);
    }
}

impl From<DataNode> for DataTree {
    // Converts a root container into the tree it wraps.
    fn from(root: DataNode) -> DataTree {
        DataTree::from_nodes(root.into_children())
    }
}

// ===== helper functions =====

fn check_data(
    path: &InstancePath,
    last: &PathArg,
    data: Option<DataNode>,
    operation: EffectiveOperation,
) -> Result<DataNode, RpcError> {
    let Some(data) = data else {
        return Err(RpcError::new(
            ErrorType::Protocol,
            ErrorTag::MissingElement,
            format!("{operation} at {path} requires data"),
        ));
    };
    if !data.matches(last) {
        return Err(RpcError::new(
            ErrorType::Protocol,
            ErrorTag::BadElement,
            format!("data '{}' doesn't match {path}", data.identifier()),
        ));
    }
    Ok(data)
}

fn bad_element(path: &InstancePath) -> RpcError {
    RpcError::new(
        ErrorType::Protocol,
        ErrorTag::BadElement,
        format!("{path} crosses a leaf node"),
    )
}

// Walks down to the list holding the addressed node, creating missing
// ancestors on the way.
fn siblings_mut<'a>(
    mut nodes: &'a mut Vec<DataNode>,
    path: &InstancePath,
    ancestors: &[PathArg],
) -> Option<&'a mut Vec<DataNode>> {
    for (i, arg) in ancestors.iter().enumerate() {
        let pos = match nodes.iter().position(|node| node.matches(arg)) {
            Some(pos) => pos,
            None => {
                nodes.push(DataNode::synthesize(arg, path.args().get(i + 1)));
                nodes.len() - 1
            }
        };
        nodes = nodes[pos].children_mut()?;
    }
    Some(nodes)
}

// Walks down to the list holding the addressed node without modifying the
// tree.
fn find_siblings_mut<'a>(
    mut nodes: &'a mut Vec<DataNode>,
    ancestors: &[PathArg],
) -> Option<&'a mut Vec<DataNode>> {
    for arg in ancestors {
        let pos = nodes.iter().position(|node| node.matches(arg))?;
        nodes = nodes[pos].children_mut()?;
    }
    Some(nodes)
}

fn prune_nodes(nodes: &mut Vec<DataNode>) {
    for node in nodes.iter_mut() {
        if let Some(children) = node.children_mut() {
            prune_nodes(children);
        }
    }
    nodes.retain(|node| !node.is_empty_mixin());
}

// Projects a node onto a relative field path.
fn project(node: &DataNode, args: &[PathArg]) -> Option<DataNode> {
    let Some((first, rest)) = args.split_first() else {
        return Some(node.clone());
    };

    if let DataNode::Map { .. } = node {
        // Fields apply to each entry of a list.
        let entries = node
            .children()
            .iter()
            .filter_map(|entry| project(entry, args))
            .collect::<Vec<_>>();
        if entries.is_empty() {
            return None;
        }
        return Some(node.with_children(entries));
    }

    let child = node.child(first)?;
    let projection = project(child, rest)?;
    Some(node.with_children(vec![projection]))
}

// ===== unit tests =====
