//! Symbol-name canonicalization.
//!
//! The source tools name the same symbol differently: the code-metrics source
//! writes fully-qualified parameter types (`Run(System.String)`), coverage
//! writes short, sometimes nullable-annotated ones (`Run(string? path)`), and
//! diagnostics sometimes omit the list entirely. Everything funnels through
//! these pure functions so one method always lands on one canonical
//! `Name(...)` form, whatever convention produced it.
//!
//! All functions are total: blank input and malformed text (mismatched
//! parentheses) come back unchanged, never as a panic.

/// Placeholder substituted for any parameter list.
const PARAMS_PLACEHOLDER: &str = "(...)";

/// Constructor markers as emitted by the code-metrics source. Re-prefixed to
/// the dot form the other sources use.
const CTOR_MARKER: &str = "#ctor";
const CCTOR_MARKER: &str = "#cctor";

/// Canonicalizes a raw method signature into `Name(...)` form.
///
/// The parameter list is located by balanced-parenthesis matching (depth
/// tracked, so nested parens inside parameter types do not break it) and its
/// contents replaced with a fixed placeholder. Anything after the closing
/// paren (e.g. a ` : ReturnType` suffix) is dropped. Input without a
/// parameter list gets name normalization only.
#[must_use]
pub fn normalize_signature(raw: &str) -> String {
    if raw.trim().is_empty() {
        return raw.to_string();
    }
    let Some(open) = raw.find('(') else {
        return normalize_method_name(raw);
    };
    // Mismatched parens: fall back to the original string untouched.
    if matching_paren(raw.as_bytes(), open).is_none() {
        return raw.to_string();
    }
    let name = normalize_method_name(&raw[..open]);
    format!("{name}{PARAMS_PLACEHOLDER}")
}

/// Normalizes a bare method name (the part before any parameter list).
///
/// Strips generic arity markers (`` List`1 ``) and `<T>` parameter lists,
/// but preserves bracket-delimited sentinel names and compiler-generated
/// names (`<Run>b__0`, `<Fetch>d__3`), recognized by what follows the
/// closing bracket. Constructor markers are re-prefixed with a dot.
#[must_use]
pub fn normalize_method_name(raw: &str) -> String {
    let name = raw.trim();
    if name.is_empty() {
        return raw.to_string();
    }
    if name == CCTOR_MARKER {
        return ".cctor".to_string();
    }
    if name == CTOR_MARKER {
        return ".ctor".to_string();
    }
    strip_generic(name)
}

/// Normalizes a type name: strips arity markers and truncates at the first
/// unmatched `<` to drop generic arguments. Sentinel and compiler-generated
/// names pass through unchanged.
#[must_use]
pub fn normalize_type_name(raw: &str) -> String {
    let name = raw.trim();
    if name.is_empty() {
        return raw.to_string();
    }
    strip_generic(name)
}

/// Derives the parent identity of an FQN by dropping its last dot segment.
/// Parameter lists and a doubled dot (`Type..ctor`) are handled so member
/// FQNs resolve to their type, and types to their namespace (empty for the
/// global namespace).
#[must_use]
pub fn parent_identity(fqn: &str) -> String {
    let head = fqn.split('(').next().unwrap_or(fqn);
    let head = head.trim_end_matches('.');
    match head.rfind('.') {
        Some(dot) => head[..dot].trim_end_matches('.').to_string(),
        None => String::new(),
    }
}

/// Shared generic-stripping walk for method and type names.
fn strip_generic(name: &str) -> String {
    // A name starting with '<' is either a sentinel (`<Module>`) or a
    // compiler-generated symbol (`<Run>d__3`); both keep their brackets.
    if name.starts_with('<') {
        return name.to_string();
    }
    let stripped = strip_arity(name);
    match generic_open(&stripped) {
        Some(i) => stripped[..i].to_string(),
        None => stripped,
    }
}

/// Removes every backtick arity marker (`` `1 ``) from the name.
fn strip_arity(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '`' {
            while matches!(chars.peek(), Some(d) if d.is_ascii_digit()) {
                let _ = chars.next();
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Index of the first `<` that opens a genuine generic argument list.
///
/// A balanced `<...>` followed by identifier text is a compiler-generated
/// name segment and is skipped; an unbalanced `<` counts as opening.
fn generic_open(name: &str) -> Option<usize> {
    let bytes = name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'<' {
            match matching_angle(bytes, i) {
                Some(close) => {
                    let generated = matches!(
                        bytes.get(close + 1),
                        Some(c) if c.is_ascii_alphanumeric() || *c == b'_' || *c == b'|'
                    );
                    if generated {
                        i = close + 1;
                        continue;
                    }
                    return Some(i);
                }
                None => return Some(i),
            }
        }
        i += 1;
    }
    None
}

/// Index of the `>` matching the `<` at `open`, if balanced.
fn matching_angle(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'<' => depth += 1,
            b'>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Index of the `)` matching the `(` at `open`, if balanced.
fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
