//! The class inheritance graph.
//!
//! Nodes are keyed by class-name symbol. The petgraph structure owns the
//! nodes and carries the parent-to-child edges; every other reference into
//! the graph is a `Symbol` key. Each node also records its single parent
//! link and a running descendant count. Cool is single-inheritance, so the
//! graph is a forest rooted at the synthetic `_no_class` node, and subtype
//! queries are upward walks along the parent links.

use fixedbitset::FixedBitSet;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::Dfs;
use std::collections::{HashMap, HashSet};

use coolc_dsl::symbol::Symbol;

pub type ClassNode = NodeIndex;

/// Attaching a child created a parent chain that loops back on itself.
#[derive(Debug, PartialEq, Eq)]
pub struct CycleDetected;

#[derive(Debug)]
struct NodeData {
    parent: Option<Symbol>,
    num_descendants: usize,
}

#[derive(Debug)]
pub struct InheritanceGraph {
    graph: StableDiGraph<Symbol, (), u32>,
    nodes: HashMap<Symbol, (ClassNode, NodeData)>,
}

impl InheritanceGraph {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            nodes: HashMap::new(),
        }
    }

    /// Adds a node for the class if absent. A node may be created before
    /// the class itself is declared, when it is first referenced as a
    /// parent.
    pub fn add_node(&mut self, name: Symbol) -> ClassNode {
        match self.nodes.get(&name) {
            Some(node_and_data) => node_and_data.0,
            None => {
                let node = self.graph.add_node(name);
                self.nodes.insert(
                    name,
                    (
                        node,
                        NodeData {
                            parent: None,
                            num_descendants: 0,
                        },
                    ),
                );
                node
            }
        }
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.nodes.contains_key(&name)
    }

    /// Returns the parent class, or `None` for an unattached node (a class
    /// referenced but never declared) and for the forest root.
    pub fn parent(&self, name: Symbol) -> Option<Symbol> {
        self.nodes.get(&name).and_then(|node| node.1.parent)
    }

    pub fn has_parent(&self, name: Symbol) -> bool {
        self.parent(name).is_some()
    }

    pub fn num_descendants(&self, name: Symbol) -> usize {
        self.nodes
            .get(&name)
            .map(|node| node.1.num_descendants)
            .unwrap_or(0)
    }

    /// Attaches `child` under `parent` and bumps descendant counts along
    /// the ancestor chain. Both nodes must already exist.
    ///
    /// Detects a cycle by watching for a repeated class while walking the
    /// chain upward; the walk also serves as the count update, so a cycle
    /// is found the moment it is formed.
    pub fn add_child(&mut self, parent: Symbol, child: Symbol) -> Result<(), CycleDetected> {
        let delta = self.num_descendants(child) + 1;
        let parent_node = self.node(parent);
        let child_node = self.node(child);
        self.graph.add_edge(parent_node, child_node, ());
        self.data_mut(child).parent = Some(parent);

        let mut visited = HashSet::new();
        visited.insert(parent);
        self.data_mut(parent).num_descendants += delta;

        let mut cursor = self.parent(parent);
        while let Some(ancestor) = cursor {
            if !visited.insert(ancestor) {
                return Err(CycleDetected);
            }
            self.data_mut(ancestor).num_descendants += delta;
            cursor = self.parent(ancestor);
        }
        Ok(())
    }

    /// True when walking the parent links from `child` reaches `ancestor`.
    /// Reflexive: every class in the graph is a child of itself.
    pub fn is_child_of_or_equal(&self, child: Symbol, ancestor: Symbol) -> bool {
        if !self.contains(child) || !self.contains(ancestor) {
            return false;
        }
        let mut cursor = Some(child);
        while let Some(name) = cursor {
            if name == ancestor {
                return true;
            }
            cursor = self.parent(name);
        }
        false
    }

    /// The most specific class that is an ancestor-or-self of both inputs:
    /// collect the ancestor set of one side, then walk the other side
    /// upward until the first hit.
    ///
    /// Returns `None` only when one side is not in the graph; any two
    /// attached classes meet at `Object`.
    pub fn first_common_ancestor(&self, left: Symbol, right: Symbol) -> Option<Symbol> {
        if !self.contains(left) || !self.contains(right) {
            return None;
        }
        let mut ancestors = HashSet::new();
        let mut cursor = Some(left);
        while let Some(name) = cursor {
            ancestors.insert(name);
            cursor = self.parent(name);
        }

        let mut cursor = Some(right);
        while let Some(name) = cursor {
            if ancestors.contains(&name) {
                return Some(name);
            }
            cursor = self.parent(name);
        }
        None
    }

    /// Depth-first traversal over the descendants of `start`, the class
    /// itself included.
    pub fn dfs(&self, start: Symbol) -> Option<GraphDfs> {
        let start = self.nodes.get(&start)?.0;
        Some(GraphDfs {
            dfs: Dfs::new(&self.graph, start),
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, name: Symbol) -> ClassNode {
        self.nodes
            .get(&name)
            .expect("inheritance node created before attachment")
            .0
    }

    fn data_mut(&mut self, name: Symbol) -> &mut NodeData {
        &mut self
            .nodes
            .get_mut(&name)
            .expect("inheritance node created before attachment")
            .1
    }
}

impl Default for InheritanceGraph {
    fn default() -> Self {
        Self::new()
    }
}

pub struct GraphDfs {
    dfs: Dfs<ClassNode, FixedBitSet>,
}

impl GraphDfs {
    pub fn next(&mut self, graph: &InheritanceGraph) -> Option<Symbol> {
        self.dfs.next(&graph.graph).map(|node| graph.graph[node])
    }
}
