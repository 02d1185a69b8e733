// src/aggregate/arena.rs
//! (level, FQN)-indexed node arena used while the tree is under
//! construction. Parent/child links are ids, not references, so ownership
//! stays unambiguous until the arena freezes into the nested report tree.

use crate::metric::MetricId;
use crate::report::{MetricsNode, NodeKind};
use crate::types::{MemberKind, MetricValue, SourceLocation, SymbolLevel};
use std::collections::{BTreeMap, HashMap};

pub type NodeId = usize;

/// A node under construction.
#[derive(Debug)]
pub struct ArenaNode {
    pub level: SymbolLevel,
    pub name: String,
    pub fqn: String,
    pub member_kind: Option<MemberKind>,
    pub state_machine_coverage: bool,
    pub is_new: bool,
    pub location: Option<SourceLocation>,
    pub metrics: BTreeMap<MetricId, MetricValue>,
    pub children: Vec<NodeId>,
}

impl ArenaNode {
    fn new(level: SymbolLevel, name: &str, fqn: &str) -> Self {
        Self {
            level,
            name: name.to_string(),
            fqn: fqn.to_string(),
            member_kind: None,
            state_machine_coverage: false,
            is_new: false,
            location: None,
            metrics: BTreeMap::new(),
            children: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct NodeArena {
    nodes: Vec<ArenaNode>,
    index: HashMap<(SymbolLevel, String), NodeId>,
}

impl NodeArena {
    /// Creates the arena with the fixed singleton Solution root.
    #[must_use]
    pub fn new(solution_name: &str) -> Self {
        let root = ArenaNode::new(SymbolLevel::Solution, solution_name, solution_name);
        let mut index = HashMap::new();
        let _ = index.insert((SymbolLevel::Solution, solution_name.to_string()), 0);
        Self {
            nodes: vec![root],
            index,
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &ArenaNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut ArenaNode {
        &mut self.nodes[id]
    }

    #[must_use]
    pub fn lookup(&self, level: SymbolLevel, fqn: &str) -> Option<NodeId> {
        self.index.get(&(level, fqn.to_string())).copied()
    }

    /// Looks up the node for (level, fqn), creating it under `parent` on
    /// first sight. Ancestors are always resolved before descendants, so a
    /// child id is strictly greater than its parent's.
    pub fn resolve(&mut self, parent: NodeId, level: SymbolLevel, name: &str, fqn: &str) -> NodeId {
        if let Some(id) = self.lookup(level, fqn) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(ArenaNode::new(level, name, fqn));
        let _ = self.index.insert((level, fqn.to_string()), id);
        self.nodes[parent].children.push(id);
        id
    }

    /// Freezes the arena into the nested, immutable tree. Children are
    /// ordered by FQN so the result is identical whatever order documents
    /// arrived in.
    #[must_use]
    pub fn into_tree(self) -> MetricsNode {
        let mut slots: Vec<Option<ArenaNode>> = self.nodes.into_iter().map(Some).collect();
        let mut built: Vec<Option<MetricsNode>> = (0..slots.len()).map(|_| None).collect();
        // Child ids are greater than parent ids, so reverse order is
        // bottom-up.
        for id in (0..slots.len()).rev() {
            let Some(node) = slots[id].take() else { continue };
            let mut children: Vec<MetricsNode> = node
                .children
                .iter()
                .filter_map(|c| built.get_mut(*c).and_then(Option::take))
                .collect();
            children.sort_by(|a, b| a.fqn.cmp(&b.fqn));
            let kind = match node.level {
                SymbolLevel::Solution => NodeKind::Solution,
                SymbolLevel::Assembly => NodeKind::Assembly,
                SymbolLevel::Namespace => NodeKind::Namespace,
                SymbolLevel::Type => NodeKind::Type,
                SymbolLevel::Member => NodeKind::Member {
                    member_kind: node.member_kind.unwrap_or(MemberKind::Method),
                    state_machine_coverage: node.state_machine_coverage,
                },
            };
            built[id] = Some(MetricsNode {
                name: node.name,
                fqn: node.fqn,
                kind,
                is_new: node.is_new,
                location: node.location,
                metrics: node.metrics,
                children,
            });
        }
        built[0].take().unwrap_or_else(|| MetricsNode {
            name: String::new(),
            fqn: String::new(),
            kind: NodeKind::Solution,
            is_new: false,
            location: None,
            metrics: BTreeMap::new(),
            children: Vec::new(),
        })
    }
}
