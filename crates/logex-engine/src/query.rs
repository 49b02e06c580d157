//! Backend-agnostic query representation.
//!
//! A [`Query`] is an ordered conjunction of [`Clause`]s plus a fixed sort and
//! a size cap. It carries no backend-specific types; each executor interprets
//! it on its own terms.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::params::DEFAULT_MAX_RESULTS;
use crate::types::{Field, LogRecord, Partition};

/// One atomic match condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Clause {
    /// Exact equality on a field.
    Term {
        /// Field to compare
        field: Field,
        /// Expected value
        value: String,
    },
    /// Inclusive range on a time field.
    Range {
        /// Field to compare
        field: Field,
        /// Lower bound (inclusive)
        gte: DateTime<FixedOffset>,
        /// Upper bound (inclusive)
        lte: DateTime<FixedOffset>,
    },
    /// Every whitespace or comma separated token of `value` must match.
    MatchAll {
        /// Field to search
        field: Field,
        /// Token list
        value: String,
    },
}

impl Clause {
    /// Returns the field this clause constrains.
    #[must_use]
    pub const fn field(&self) -> Field {
        match self {
            Self::Term { field, .. } | Self::Range { field, .. } | Self::MatchAll { field, .. } => {
                *field
            }
        }
    }

    /// Checks whether a record stored at `timestamp` satisfies this clause.
    ///
    /// Index clauses are routing constraints and always hold here; callers
    /// select partitions with [`Query::partitions`] before matching.
    #[must_use]
    pub fn admits(&self, timestamp: DateTime<Utc>, record: &LogRecord) -> bool {
        match self {
            Self::Term {
                field: Field::Index,
                ..
            } => true,
            Self::Term { field, value } => {
                record.field_values(*field).iter().any(|v| v == value)
            }
            Self::Range { gte, lte, .. } => *gte <= timestamp && timestamp <= *lte,
            Self::MatchAll { field, value } => {
                let present = record.field_values(*field);
                tokens(value).all(|token| present.iter().any(|v| v == token))
            }
        }
    }
}

/// Splits a match value into its sub-terms.
pub(crate) fn tokens(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
}

/// How clauses are combined. Only conjunction is supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Every clause must hold
    #[default]
    And,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Newest first
    #[default]
    Desc,
}

impl SortOrder {
    /// Returns the string representation of this order.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Desc => "desc",
        }
    }
}

/// Result ordering of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    /// Field to sort on
    pub field: Field,
    /// Direction
    pub order: SortOrder,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: Field::Timestamp,
            order: SortOrder::Desc,
        }
    }
}

/// A compiled, immutable query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    clauses: Vec<Clause>,
    combinator: Combinator,
    sort: SortSpec,
    size_limit: usize,
}

impl Default for Query {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_MAX_RESULTS)
    }
}

impl Query {
    /// Creates a conjunctive query sorted by timestamp, newest first.
    #[must_use]
    pub fn new(clauses: Vec<Clause>, size_limit: usize) -> Self {
        Self {
            clauses,
            combinator: Combinator::And,
            sort: SortSpec::default(),
            size_limit,
        }
    }

    /// Returns the clauses in compilation order.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Returns how clauses are combined.
    #[must_use]
    pub const fn combinator(&self) -> Combinator {
        self.combinator
    }

    /// Returns the sort order and field.
    #[must_use]
    pub const fn sort(&self) -> SortSpec {
        self.sort
    }

    /// Returns the maximum number of records to return.
    #[must_use]
    pub const fn size_limit(&self) -> usize {
        self.size_limit
    }

    /// Returns the partitions this query targets.
    ///
    /// Without an index clause every partition is searched. An index value
    /// naming no partition (or two index clauses that disagree) targets none.
    #[must_use]
    pub fn partitions(&self) -> Vec<Partition> {
        let mut targets = Partition::ALL.to_vec();
        for clause in &self.clauses {
            if let Clause::Term {
                field: Field::Index,
                value,
            } = clause
            {
                let wanted = Partition::parse(value);
                targets.retain(|p| Some(*p) == wanted);
            }
        }
        targets
    }

    /// Returns the clauses that constrain record content, skipping routing.
    pub fn filter_clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().filter(|c| c.field() != Field::Index)
    }

    /// Checks whether a record stored at `timestamp` satisfies every clause.
    #[must_use]
    pub fn admits(&self, timestamp: DateTime<Utc>, record: &LogRecord) -> bool {
        match self.combinator {
            Combinator::And => self.clauses.iter().all(|c| c.admits(timestamp, record)),
        }
    }
}
