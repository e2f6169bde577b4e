//! Active-branch resolution over ChatGPT's parent-pointer `mapping`.
//!
//! The mapping is held as an arena keyed by node id; nodes refer to each other
//! by id only, so forks and even corrupt back-references never create
//! ownership cycles.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::parsers::text::f64_or_none;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("no root node (a node with a null parent)")]
    NoRoot,

    #[error("current_node {current} does not reach a root (dangling parent {parent})")]
    Unreachable { current: String, parent: String },

    #[error("parent chain of {0} loops back on itself")]
    Cycle(String),
}

#[derive(Debug, Clone)]
pub struct TreeNode<'a> {
    pub parent: Option<&'a str>,
    pub children: Vec<&'a str>,
    pub message: Option<&'a Map<String, Value>>,
}

impl TreeNode<'_> {
    fn create_time(&self) -> Option<f64> {
        self.message.and_then(|message| f64_or_none(message.get("create_time")))
    }
}

/// Walked branch, root to tip, including message-less nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveBranch<'a> {
    pub node_ids: Vec<&'a str>,
    /// `current_node` was missing, so the first-child chain was used
    pub used_fallback: bool,
    /// Steps where no child led toward `current_node`
    pub tie_breaks: usize,
}

#[derive(Debug, Clone)]
pub struct ConversationTree<'a> {
    nodes: HashMap<&'a str, TreeNode<'a>>,
    /// Mapping iteration order, for deterministic "first" choices
    order: Vec<&'a str>,
}

impl<'a> ConversationTree<'a> {
    /// Build the arena. Non-object entries are ignored.
    pub fn from_mapping(mapping: &'a Map<String, Value>) -> Self {
        let mut nodes = HashMap::with_capacity(mapping.len());
        let mut order = Vec::with_capacity(mapping.len());

        for (id, raw) in mapping {
            let Some(raw) = raw.as_object() else {
                continue;
            };
            let children = raw
                .get("children")
                .and_then(Value::as_array)
                .map(|children| children.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            nodes.insert(
                id.as_str(),
                TreeNode {
                    parent: raw.get("parent").and_then(Value::as_str),
                    children,
                    message: raw.get("message").and_then(Value::as_object),
                },
            );
            order.push(id.as_str());
        }

        Self { nodes, order }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TreeNode<'a>> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// First node, in mapping order, whose parent is null.
    pub fn find_root(&self) -> Option<&'a str> {
        self.order.iter().copied().find(|id| self.nodes.get(id).is_some_and(|node| node.parent.is_none()))
    }

    /// Resolve the branch ending at `current_node`.
    ///
    /// Children off the `current_node` ancestry are forks (abandoned edits) and
    /// are dropped. A missing or unknown `current_node` falls back to the
    /// first-child chain from the root.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] when there is no root, or when the ancestry of
    /// `current_node` dangles or loops before reaching one.
    pub fn active_branch(&self, current_node: Option<&str>) -> Result<ActiveBranch<'a>, TreeError> {
        let fallback_root = self.find_root().ok_or(TreeError::NoRoot)?;

        let Some(current) = current_node.and_then(|id| self.nodes.get_key_value(id)).map(|(k, _)| *k)
        else {
            return Ok(ActiveBranch {
                node_ids: self.first_child_chain(fallback_root),
                used_fallback: true,
                tie_breaks: 0,
            });
        };

        let ancestry = self.ancestry(current)?;
        let on_path: HashSet<&str> = ancestry.iter().copied().collect();
        // ancestry always ends at a parent-less node
        let root = ancestry.last().copied().unwrap_or(fallback_root);

        let mut node_ids = vec![root];
        let mut visited: HashSet<&str> = HashSet::from([root]);
        let mut tie_breaks = 0;
        let mut cursor = root;

        while cursor != current {
            let children = self.existing_children(cursor);
            let next = children.iter().copied().find(|child| on_path.contains(child)).or_else(|| {
                let chosen = self.latest_child(&children);
                if chosen.is_some() {
                    tie_breaks += 1;
                }
                chosen
            });
            let Some(next) = next else {
                break;
            };
            if !visited.insert(next) {
                break;
            }
            node_ids.push(next);
            cursor = next;
        }

        Ok(ActiveBranch { node_ids, used_fallback: false, tie_breaks })
    }

    /// Message-bearing nodes of a branch, in order.
    pub fn messages<'b>(
        &'b self,
        branch: &'b ActiveBranch<'a>,
    ) -> impl Iterator<Item = (&'a str, &'a Map<String, Value>)> + 'b {
        branch
            .node_ids
            .iter()
            .filter_map(|id| self.nodes.get(id).and_then(|node| node.message).map(|message| (*id, message)))
    }

    /// `current` up to its root, validated.
    fn ancestry(&self, current: &'a str) -> Result<Vec<&'a str>, TreeError> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = current;

        loop {
            if !seen.insert(cursor) {
                return Err(TreeError::Cycle(current.to_string()));
            }
            chain.push(cursor);

            let parent = self.nodes.get(cursor).and_then(|node| node.parent);
            match parent {
                None => return Ok(chain),
                Some(parent) => match self.nodes.get_key_value(parent) {
                    Some((key, _)) => cursor = key,
                    None => {
                        return Err(TreeError::Unreachable {
                            current: current.to_string(),
                            parent: parent.to_string(),
                        });
                    }
                },
            }
        }
    }

    fn existing_children(&self, id: &str) -> Vec<&'a str> {
        self.nodes
            .get(id)
            .map(|node| node.children.iter().copied().filter(|child| self.contains(child)).collect())
            .unwrap_or_default()
    }

    /// Child with the latest message `create_time`, else the first child.
    fn latest_child(&self, children: &[&'a str]) -> Option<&'a str> {
        let mut best: Option<(&'a str, f64)> = None;
        for &child in children {
            let Some(time) = self.nodes.get(child).and_then(TreeNode::create_time) else {
                continue;
            };
            if best.is_none_or(|(_, best_time)| time > best_time) {
                best = Some((child, time));
            }
        }
        best.map(|(child, _)| child).or_else(|| children.first().copied())
    }

    fn first_child_chain(&self, root: &'a str) -> Vec<&'a str> {
        let mut chain = vec![root];
        let mut visited: HashSet<&str> = HashSet::from([root]);
        let mut cursor = root;

        while let Some(next) = self.existing_children(cursor).first().copied() {
            if !visited.insert(next) {
                break;
            }
            chain.push(next);
            cursor = next;
        }
        chain
    }
}
