//! Compilation of filter parameters into a [`Query`].
//!
//! Each [`Dimension`] handler inspects one part of the filter and contributes
//! zero or more clauses. Handlers run in the fixed order of [`Dimension::ALL`]
//! and every contributed clause is combined with AND.

use tracing::debug;

use crate::params::{DEFAULT_MAX_RESULTS, FilterParameters};
use crate::query::{Clause, Query};
use crate::types::Field;
use crate::validate::{parse_max_results, parse_timestamp};

/// A filter dimension and its clause handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// `namespace` → exact term
    Namespace,
    /// `podname` → exact term
    Pod,
    /// `containername` → exact term
    Container,
    /// `index` → partition routing term
    Index,
    /// `labels` → one all-tokens match per label
    Labels,
    /// `starttime` + `finishtime` → inclusive range
    TimeRange,
    /// `level` → exact term
    Level,
}

impl Dimension {
    /// All handlers in compilation order.
    pub const ALL: [Self; 7] = [
        Self::Namespace,
        Self::Pod,
        Self::Container,
        Self::Index,
        Self::Labels,
        Self::TimeRange,
        Self::Level,
    ];

    /// Returns the clauses this dimension contributes for `params`.
    #[must_use]
    pub fn clauses(self, params: &FilterParameters) -> Vec<Clause> {
        fn term(field: Field, value: Option<&str>) -> Vec<Clause> {
            value
                .map(|v| Clause::Term {
                    field,
                    value: v.to_string(),
                })
                .into_iter()
                .collect()
        }

        match self {
            Self::Namespace => term(Field::Namespace, params.namespace()),
            Self::Pod => term(Field::Pod, params.pod_name()),
            Self::Container => term(Field::Container, params.container_name()),
            Self::Index => term(Field::Index, params.index()),
            Self::Level => term(Field::Level, params.level()),
            Self::Labels => params
                .labels()
                .map(|label| Clause::MatchAll {
                    field: Field::FlatLabels,
                    value: label.trim().to_string(),
                })
                .collect(),
            Self::TimeRange => params
                .time_bounds()
                .and_then(|(start, finish)| {
                    Some(Clause::Range {
                        field: Field::Timestamp,
                        gte: parse_timestamp(start).ok()?,
                        lte: parse_timestamp(finish).ok()?,
                    })
                })
                .into_iter()
                .collect(),
        }
    }
}

/// Compiles filter parameters into a query.
///
/// Deterministic and pure. Parameters should be validated first; values that
/// fail to parse here contribute no clause and the size falls back to the
/// default.
#[must_use]
pub fn compile(params: &FilterParameters) -> Query {
    let clauses: Vec<Clause> = Dimension::ALL
        .into_iter()
        .flat_map(|dimension| dimension.clauses(params))
        .collect();

    let size_limit = params
        .max_results()
        .and_then(|raw| parse_max_results(raw).ok())
        .unwrap_or(DEFAULT_MAX_RESULTS);

    debug!(clauses = clauses.len(), size_limit, "compiled log query");
    Query::new(clauses, size_limit)
}
