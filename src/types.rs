// src/types.rs
use crate::metric::MetricId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Granularity at which a metric or threshold applies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum SymbolLevel {
    Solution,
    Assembly,
    Namespace,
    Type,
    Member,
}

impl SymbolLevel {
    pub const ALL: &'static [Self] = &[
        Self::Solution,
        Self::Assembly,
        Self::Namespace,
        Self::Type,
        Self::Member,
    ];

    /// Level name lookup for threshold override payloads. Unknown names are
    /// the caller's problem (the resolver ignores them).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|l| format!("{l:?}").eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for SymbolLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Structural kind of a raw element as reported by a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Assembly,
    Namespace,
    Type,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberKind {
    Method,
    Property,
    Field,
    Event,
}

/// Where a symbol lives on disk, as far as the reporting tool knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    #[serde(default)]
    pub start_line: Option<u32>,
    #[serde(default)]
    pub end_line: Option<u32>,
}

/// One sub-category slice of a diagnostics metric (count per rule id).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub count: u64,
    #[serde(default)]
    pub details: Vec<String>,
}

/// A raw metric observation attached to a `RawElement`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMetric {
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub breakdown: Option<BTreeMap<String, BreakdownEntry>>,
}

/// One fact from one source document. Immutable once parsed; consumed exactly
/// once during merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawElement {
    pub kind: ElementKind,
    pub name: String,
    #[serde(default)]
    pub fqn: Option<String>,
    #[serde(default)]
    pub parent_fqn: Option<String>,
    #[serde(default)]
    pub assembly: Option<String>,
    #[serde(default)]
    pub member_kind: Option<MemberKind>,
    #[serde(default)]
    pub location: Option<SourceLocation>,
    #[serde(default)]
    pub metrics: BTreeMap<MetricId, RawMetric>,
}

impl RawElement {
    /// The identity string used for duplicate detection and merge keying.
    #[must_use]
    pub fn identity(&self) -> &str {
        self.fqn.as_deref().unwrap_or(&self.name)
    }

    /// Returns true if any diagnostics metric reports at least one violation.
    /// Such members are never kind-excluded (diagnostics must always surface).
    #[must_use]
    pub fn has_violations(&self) -> bool {
        self.metrics
            .iter()
            .any(|(id, m)| id.is_diagnostic() && m.value.unwrap_or(0.0) > 0.0)
    }
}

/// The output of one upstream parser invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub path: String,
    #[serde(default)]
    pub solution_hint: Option<String>,
    #[serde(default)]
    pub elements: Vec<RawElement>,
    /// Rule id -> description; populated by the diagnostics source only.
    #[serde(default)]
    pub rule_descriptions: BTreeMap<String, String>,
}

/// Threshold evaluation outcome, ordered so `Error` is the worst.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Status {
    #[default]
    #[serde(rename = "NA")]
    Na,
    Success,
    Warning,
    Error,
}

/// An externally declared exemption for a (symbol, metric) pair. Best-effort
/// input: any field may be missing and incomplete entries are skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuppressedSymbol {
    #[serde(default)]
    pub fqn: Option<String>,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub rule_id: Option<String>,
    #[serde(default)]
    pub justification: Option<String>,
}

/// Suppression data attached to a merged metric value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionRef {
    pub rule_id: String,
    pub justification: String,
}

/// One metric cell of the merged tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricValue {
    pub value: Option<f64>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub breakdown: Option<BTreeMap<String, BreakdownEntry>>,
    #[serde(default)]
    pub suppression: Option<SuppressionRef>,
}

impl MetricValue {
    #[must_use]
    pub fn from_raw(raw: &RawMetric) -> Self {
        Self {
            value: raw.value,
            unit: raw.unit.clone(),
            breakdown: raw.breakdown.clone(),
            ..Self::default()
        }
    }

    /// A suppression never alters the computed status; it only flags the cell
    /// so presentation layers can de-emphasize it.
    #[must_use]
    pub fn suppressed(&self) -> bool {
        self.suppression.is_some()
    }
}

/// A recoverable inconsistency observed during a run. Accumulated alongside a
/// still-valid report, never fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Inconsistency {
    /// Two sources reported different values for the same node/metric; the
    /// first value was kept.
    MetricConflict {
        fqn: String,
        metric: String,
        kept: f64,
        ignored: f64,
    },
    /// A suppression entry was missing its identity or metric and was skipped.
    SkippedSuppression { reason: String },
    /// A threshold override named a metric this build does not know.
    UnknownOverrideMetric { name: String },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MetricConflict {
                fqn,
                metric,
                kept,
                ignored,
            } => write!(
                f,
                "conflicting values for {metric} on '{fqn}': kept {kept}, ignored {ignored}"
            ),
            Self::SkippedSuppression { reason } => {
                write!(f, "skipped suppression entry: {reason}")
            }
            Self::UnknownOverrideMetric { name } => {
                write!(f, "threshold override names unknown metric '{name}'")
            }
        }
    }
}
