// src/aggregate/baseline.rs
//! Baseline comparison: deltas and new-symbol flags.
//!
//! Nodes match by (level, FQN). No match means the symbol is new; a match
//! yields delta = current - baseline wherever both values are present.
//! An absent baseline node is not an error, deltas are simply omitted.

use super::arena::NodeArena;
use crate::report::{MetricsNode, MetricsReport};
use crate::types::SymbolLevel;
use std::collections::HashMap;

pub fn apply_baseline(arena: &mut NodeArena, baseline: &MetricsReport) {
    let mut index: HashMap<(SymbolLevel, &str), &MetricsNode> = HashMap::new();
    let mut stack = vec![&baseline.solution];
    while let Some(node) = stack.pop() {
        let _ = index.insert((node.level(), node.fqn.as_str()), node);
        stack.extend(node.children.iter());
    }

    for id in 0..arena.len() {
        let (level, fqn) = {
            let node = arena.node(id);
            (node.level, node.fqn.clone())
        };
        match index.get(&(level, fqn.as_str())) {
            None => arena.node_mut(id).is_new = true,
            Some(base) => {
                let node = arena.node_mut(id);
                node.is_new = false;
                for (metric, cell) in &mut node.metrics {
                    let base_value = base.metric(*metric).and_then(|m| m.value);
                    if let (Some(current), Some(previous)) = (cell.value, base_value) {
                        cell.delta = Some(current - previous);
                    }
                }
            }
        }
    }
}
