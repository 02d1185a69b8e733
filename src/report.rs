// src/report.rs
//! The merged, immutable report handed to renderers and serializers.

use crate::metric::MetricId;
use crate::thresholds::ThresholdTable;
use crate::types::{
    Inconsistency, MemberKind, MetricValue, SourceLocation, Status, SuppressedSymbol, SymbolLevel,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind-specific payload of a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level")]
pub enum NodeKind {
    Solution,
    Assembly,
    Namespace,
    Type,
    Member {
        member_kind: MemberKind,
        /// Coverage was absorbed from a compiler-generated state-machine
        /// type rather than reported against the method directly.
        #[serde(default)]
        state_machine_coverage: bool,
    },
}

impl NodeKind {
    #[must_use]
    pub fn level(&self) -> SymbolLevel {
        match self {
            Self::Solution => SymbolLevel::Solution,
            Self::Assembly => SymbolLevel::Assembly,
            Self::Namespace => SymbolLevel::Namespace,
            Self::Type => SymbolLevel::Type,
            Self::Member { .. } => SymbolLevel::Member,
        }
    }
}

/// One node of the 5-level tree. Exactly one node exists per distinct FQN at
/// each level; children are ordered and owned top-down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsNode {
    pub name: String,
    pub fqn: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub location: Option<SourceLocation>,
    #[serde(default)]
    pub metrics: BTreeMap<MetricId, MetricValue>,
    #[serde(default)]
    pub children: Vec<MetricsNode>,
}

impl MetricsNode {
    #[must_use]
    pub fn level(&self) -> SymbolLevel {
        self.kind.level()
    }

    #[must_use]
    pub fn metric(&self, id: MetricId) -> Option<&MetricValue> {
        self.metrics.get(&id)
    }

    /// Direct child lookup by FQN.
    #[must_use]
    pub fn child(&self, fqn: &str) -> Option<&MetricsNode> {
        self.children.iter().find(|c| c.fqn == fqn)
    }

    /// Depth-first visit of this node and everything below it.
    pub fn walk(&self, visit: &mut impl FnMut(&MetricsNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// First descendant (or self) with the given level and FQN.
    #[must_use]
    pub fn find(&self, level: SymbolLevel, fqn: &str) -> Option<&MetricsNode> {
        if self.level() == level && self.fqn == fqn {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(level, fqn))
    }
}

/// Everything about the run that is not the tree itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub solution_name: String,
    pub document_paths: Vec<String>,
    pub thresholds: ThresholdTable,
    #[serde(default)]
    pub suppressed_symbols: Vec<SuppressedSymbol>,
    #[serde(default)]
    pub rule_descriptions: BTreeMap<String, String>,
}

/// The final report: metadata plus the solution root. Never mutated after
/// construction completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub metadata: ReportMetadata,
    pub solution: MetricsNode,
}

impl MetricsReport {
    /// Count of nodes per worst-observed status, for summary output.
    #[must_use]
    pub fn status_counts(&self) -> BTreeMap<Status, usize> {
        let mut counts = BTreeMap::new();
        self.solution.walk(&mut |node| {
            let worst = node
                .metrics
                .values()
                .map(|m| m.status)
                .max()
                .unwrap_or(Status::Na);
            *counts.entry(worst).or_insert(0) += 1;
        });
        counts
    }

    /// True if any node carries any metric in Error status.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        let mut found = false;
        self.solution.walk(&mut |node| {
            found |= node.metrics.values().any(|m| m.status == Status::Error);
        });
        found
    }
}

/// A completed run: the report plus the recoverable inconsistencies observed
/// while producing it.
#[derive(Debug, Clone)]
pub struct AggregationOutcome {
    pub report: MetricsReport,
    pub warnings: Vec<Inconsistency>,
}
