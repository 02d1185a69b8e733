//! Metric identity and per-metric aggregation rules.
//!
//! The identifier set is closed over the three source families (coverage,
//! code-quality, diagnostics) plus a numeric escape hatch: threshold override
//! payloads may name a metric by number, which synthesizes a `Custom` id so
//! newer producers keep working against an older binary.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// How child values combine into a parent value during rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollup {
    /// Arithmetic mean — percentages, complexity, index-style metrics.
    Mean,
    /// Sum — line counts and violation counts.
    Sum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricId {
    // Coverage family
    LineCoverage,
    BranchCoverage,
    MethodCoverage,
    // Code-quality family
    CyclomaticComplexity,
    MaintainabilityIndex,
    ClassCoupling,
    DepthOfInheritance,
    SourceLines,
    ExecutableLines,
    // Diagnostics family
    Violations,
    // Forward-compatible: synthesized from a numeric name in override payloads.
    Custom(u32),
}

impl MetricId {
    pub const BUILTIN: &'static [Self] = &[
        Self::LineCoverage,
        Self::BranchCoverage,
        Self::MethodCoverage,
        Self::CyclomaticComplexity,
        Self::MaintainabilityIndex,
        Self::ClassCoupling,
        Self::DepthOfInheritance,
        Self::SourceLines,
        Self::ExecutableLines,
        Self::Violations,
    ];

    /// Resolves a builtin id by name, or synthesizes a `Custom` id from a
    /// purely numeric name. Anything else is unknown.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        for id in Self::BUILTIN {
            if id.to_string().eq_ignore_ascii_case(name) {
                return Some(*id);
            }
        }
        name.parse::<u32>().ok().map(Self::Custom)
    }

    /// Fallback polarity, used when a threshold definition does not say.
    #[must_use]
    pub fn higher_is_better(self) -> bool {
        matches!(
            self,
            Self::LineCoverage
                | Self::BranchCoverage
                | Self::MethodCoverage
                | Self::MaintainabilityIndex
        )
    }

    /// The aggregation rule applied when rolling this metric up to ancestors.
    #[must_use]
    pub fn rollup(self) -> Rollup {
        match self {
            Self::SourceLines | Self::ExecutableLines | Self::Violations => Rollup::Sum,
            _ => Rollup::Mean,
        }
    }

    /// Returns true for the diagnostics-family metrics that carry a per-rule
    /// breakdown.
    #[must_use]
    pub fn is_diagnostic(self) -> bool {
        matches!(self, Self::Violations)
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineCoverage => write!(f, "LineCoverage"),
            Self::BranchCoverage => write!(f, "BranchCoverage"),
            Self::MethodCoverage => write!(f, "MethodCoverage"),
            Self::CyclomaticComplexity => write!(f, "CyclomaticComplexity"),
            Self::MaintainabilityIndex => write!(f, "MaintainabilityIndex"),
            Self::ClassCoupling => write!(f, "ClassCoupling"),
            Self::DepthOfInheritance => write!(f, "DepthOfInheritance"),
            Self::SourceLines => write!(f, "SourceLines"),
            Self::ExecutableLines => write!(f, "ExecutableLines"),
            Self::Violations => write!(f, "Violations"),
            Self::Custom(n) => write!(f, "{n}"),
        }
    }
}

// String form on the wire so metric maps serialize as plain JSON objects.
impl Serialize for MetricId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MetricId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| D::Error::custom(format!("unknown metric identifier '{s}'")))
    }
}
