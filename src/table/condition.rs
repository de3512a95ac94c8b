//! Selection predicates and the choice between index and full scans.

use std::cmp::Ordering;

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    /// Whether `lhs <op> rhs` holds, given `lhs.cmp(rhs)`.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Ne => ordering != Ordering::Equal,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Le => ordering != Ordering::Greater,
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Ge => ordering != Ordering::Less,
        }
    }
}

/// A predicate on one attribute of a tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Key(Comparison, i32),
    Value(Comparison, String),
}

impl Condition {
    pub fn matches(&self, key: i32, value: &str) -> bool {
        match self {
            Condition::Key(op, operand) => op.holds(key.cmp(operand)),
            Condition::Value(op, operand) => op.holds(value.cmp(operand.as_str())),
        }
    }
}

/// How a select reaches its tuples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPlan {
    /// Walk the index from `lower` (or the first key) up to `upper`.
    IndexRange {
        lower: Option<i32>,
        upper: Option<i32>,
    },
    /// The key conditions contradict each other; nothing can match.
    NoMatch,
    /// Read every tuple in the record file.
    FullScan,
}

/// Pick a scan strategy for `conditions`.
///
/// The index is only worth using when every condition is a key range or
/// equality; `Ne` and value predicates need every tuple anyway.
pub fn plan(conditions: &[Condition], has_index: bool) -> ScanPlan {
    if !has_index || conditions.is_empty() {
        return ScanPlan::FullScan;
    }

    let mut lower: Option<i32> = None;
    let mut upper: Option<i32> = None;
    for condition in conditions {
        let (lo, hi) = match condition {
            Condition::Key(op, operand) => match key_bounds(*op, *operand) {
                KeyBounds::Range(lo, hi) => (lo, hi),
                KeyBounds::Empty => return ScanPlan::NoMatch,
                KeyBounds::Unbounded => return ScanPlan::FullScan,
            },
            Condition::Value(..) => return ScanPlan::FullScan,
        };
        if let Some(lo) = lo {
            lower = Some(lower.map_or(lo, |cur| cur.max(lo)));
        }
        if let Some(hi) = hi {
            upper = Some(upper.map_or(hi, |cur| cur.min(hi)));
        }
    }

    match (lower, upper) {
        (Some(lo), Some(hi)) if lo > hi => ScanPlan::NoMatch,
        (lower, upper) => ScanPlan::IndexRange { lower, upper },
    }
}

/// What a single key predicate says about the range of matching keys.
enum KeyBounds {
    Range(Option<i32>, Option<i32>),
    /// No key can satisfy the predicate.
    Empty,
    /// Matching keys do not form one range.
    Unbounded,
}

fn key_bounds(op: Comparison, operand: i32) -> KeyBounds {
    match op {
        Comparison::Eq => KeyBounds::Range(Some(operand), Some(operand)),
        Comparison::Ge => KeyBounds::Range(Some(operand), None),
        Comparison::Le => KeyBounds::Range(None, Some(operand)),
        Comparison::Gt => operand
            .checked_add(1)
            .map_or(KeyBounds::Empty, |lo| KeyBounds::Range(Some(lo), None)),
        Comparison::Lt => operand
            .checked_sub(1)
            .map_or(KeyBounds::Empty, |hi| KeyBounds::Range(None, Some(hi))),
        Comparison::Ne => KeyBounds::Unbounded,
    }
}
