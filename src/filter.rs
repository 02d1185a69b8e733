// src/filter.rs
//! Name-pattern exclusion filters, applied before an element may create or
//! contribute to any node. An excluded element contributes nothing, not even
//! partial metrics to its would-be ancestors.

use crate::error::Result;
use crate::normalize::{normalize_type_name, parent_identity};
use crate::types::{ElementKind, MemberKind, RawElement};
use regex::Regex;

/// Member simple names excluded out of the box: constructors and the known
/// compiler-generated state-machine methods.
pub const DEFAULT_EXCLUDED_MEMBERS: &[&str] = &[".ctor", ".cctor", "MoveNext", "SetStateMachine"];

/// Pattern list delimiters accepted in filter configuration strings.
const DELIMITERS: &[char] = &[',', ';'];

/// How a plain (wildcard-free) pattern matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Substring,
}

/// A compiled set of exclusion patterns.
///
/// Entries containing `*`/`?` compile to anchored regexes (all other
/// characters escaped); plain entries match per the configured mode.
#[derive(Debug, Clone)]
pub struct PatternSet {
    literals: Vec<String>,
    wildcards: Vec<Regex>,
    mode: MatchMode,
}

impl PatternSet {
    /// Compiles a `,`/`;`-delimited pattern list.
    ///
    /// # Errors
    /// Returns an error if a wildcard pattern fails to compile.
    pub fn compile(patterns: &str, mode: MatchMode) -> Result<Self> {
        let mut literals = Vec::new();
        let mut wildcards = Vec::new();
        for entry in patterns.split(DELIMITERS).map(str::trim) {
            if entry.is_empty() {
                continue;
            }
            if entry.contains('*') || entry.contains('?') {
                wildcards.push(Regex::new(&wildcard_to_regex(entry))?);
            } else {
                literals.push(entry.to_string());
            }
        }
        Ok(Self {
            literals,
            wildcards,
            mode,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty() && self.wildcards.is_empty()
    }

    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        let literal_hit = match self.mode {
            MatchMode::Exact => self.literals.iter().any(|l| l == candidate),
            MatchMode::Substring => self.literals.iter().any(|l| candidate.contains(l.as_str())),
        };
        literal_hit || self.wildcards.iter().any(|re| re.is_match(candidate))
    }
}

/// Translates a `*`/`?` wildcard pattern into an anchored regex, escaping
/// every other character.
fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}

/// Excludes members by their normalized simple name (leading dot stripped).
#[derive(Debug, Clone)]
pub struct MemberNameFilter {
    patterns: PatternSet,
    excludes_ctor: bool,
}

impl MemberNameFilter {
    /// Builds the filter from a user pattern list on top of the defaults.
    ///
    /// # Errors
    /// Returns an error if a wildcard pattern fails to compile.
    pub fn new(patterns: &str) -> Result<Self> {
        let mut combined = DEFAULT_EXCLUDED_MEMBERS.join(",");
        if !patterns.trim().is_empty() {
            combined.push(',');
            combined.push_str(patterns);
        }
        Self::from_patterns(&combined)
    }

    /// Builds the filter from an explicit pattern list only (no defaults).
    ///
    /// # Errors
    /// Returns an error if a wildcard pattern fails to compile.
    pub fn from_patterns(patterns: &str) -> Result<Self> {
        // Store and compare dot-stripped so ".ctor" and "ctor" are the same.
        let stripped: Vec<String> = patterns
            .split(DELIMITERS)
            .map(|p| p.trim().trim_start_matches('.').to_string())
            .filter(|p| !p.is_empty())
            .collect();
        let excludes_ctor = stripped.iter().any(|p| p == "ctor");
        let patterns = PatternSet::compile(&stripped.join(","), MatchMode::Exact)?;
        Ok(Self {
            patterns,
            excludes_ctor,
        })
    }

    /// Checks a normalized simple member name; any parameter list and a
    /// leading dot are ignored.
    #[must_use]
    pub fn excludes_name(&self, name: &str) -> bool {
        let simple = name.split('(').next().unwrap_or(name);
        self.patterns.matches(simple.trim_start_matches('.'))
    }

    /// Checks a full member FQN. A member whose name equals its enclosing
    /// type's name is an implicit constructor form and follows the ctor rule.
    #[must_use]
    pub fn excludes_member(&self, fqn: &str) -> bool {
        let head = fqn.split('(').next().unwrap_or(fqn);
        let head = head.trim_end_matches('.');
        let Some(dot) = head.rfind('.') else {
            return self.excludes_name(head);
        };
        let member = &head[dot + 1..];
        if self.excludes_name(member) {
            return true;
        }
        let enclosing = head[..dot]
            .trim_end_matches('.')
            .rsplit('.')
            .next()
            .unwrap_or("");
        self.excludes_ctor && !enclosing.is_empty() && member == normalize_type_name(enclosing)
    }
}

/// Excludes members by structural kind. A member carrying at least one
/// diagnostics violation is never excluded, whatever its kind.
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct MemberKindFilter {
    pub exclude_methods: bool,
    pub exclude_properties: bool,
    pub exclude_fields: bool,
    pub exclude_events: bool,
}

impl MemberKindFilter {
    #[must_use]
    pub fn excludes(&self, kind: MemberKind, has_violations: bool) -> bool {
        if has_violations {
            return false;
        }
        match kind {
            MemberKind::Method => self.exclude_methods,
            MemberKind::Property => self.exclude_properties,
            MemberKind::Field => self.exclude_fields,
            MemberKind::Event => self.exclude_events,
        }
    }
}

/// Filter configuration exactly as the CLI layer hands it over: three
/// delimited pattern strings plus the four member-kind booleans.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    pub member_patterns: String,
    pub assembly_patterns: String,
    pub type_patterns: String,
    pub kinds: MemberKindFilter,
}

/// The four compiled filters, applied together during merge.
#[derive(Debug, Clone)]
pub struct Filters {
    members: MemberNameFilter,
    kinds: MemberKindFilter,
    assemblies: PatternSet,
    types: PatternSet,
}

impl Filters {
    /// Compiles all four filters from their configuration strings.
    ///
    /// # Errors
    /// Returns an error if any wildcard pattern fails to compile.
    pub fn compile(config: &FilterConfig) -> Result<Self> {
        Ok(Self {
            members: MemberNameFilter::new(&config.member_patterns)?,
            kinds: config.kinds,
            assemblies: PatternSet::compile(&config.assembly_patterns, MatchMode::Substring)?,
            types: PatternSet::compile(&config.type_patterns, MatchMode::Substring)?,
        })
    }

    /// Decides whether a (normalized) element is excluded from the report.
    #[must_use]
    pub fn excludes(&self, element: &RawElement) -> bool {
        if let Some(assembly) = element.assembly.as_deref() {
            if self.assemblies.matches(assembly) {
                return true;
            }
        }
        match element.kind {
            ElementKind::Assembly => self.assemblies.matches(element.identity()),
            ElementKind::Namespace => false,
            ElementKind::Type => self.types.matches(element.identity()),
            ElementKind::Member => self.excludes_member(element),
        }
    }

    fn excludes_member(&self, element: &RawElement) -> bool {
        // Members of an excluded type must not resurrect the type node. When
        // the source omits the parent FQN, the enclosing type is derived from
        // the member FQN exactly as merge resolution would derive it.
        let parent = element
            .parent_fqn
            .clone()
            .unwrap_or_else(|| parent_identity(element.identity()));
        if !parent.is_empty() && self.types.matches(&parent) {
            return true;
        }
        if let Some(kind) = element.member_kind {
            if self.kinds.excludes(kind, element.has_violations()) {
                return true;
            }
        }
        if self.members.excludes_name(&element.name) {
            return true;
        }
        element
            .fqn
            .as_deref()
            .is_some_and(|fqn| self.members.excludes_member(fqn))
    }
}
