//! Constraint values attached to a collection query: filters, sort keys and projections.
//!
//! Values stay as raw strings here; the collection query coerces them using the
//! collection's schema at execution time.

/// A condition on a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String),
    Ne(String),
    /// Inclusive range; at least one bound is expected to be set.
    Range {
        gte: Option<String>,
        lte: Option<String>,
    },
}

/// Conjunction of field conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Condition)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(field, Condition::Eq(value.into()));
        self
    }

    pub fn ne(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(field, Condition::Ne(value.into()));
        self
    }

    pub fn range(
        mut self,
        field: impl Into<String>,
        gte: Option<String>,
        lte: Option<String>,
    ) -> Self {
        if gte.is_some() || lte.is_some() {
            self.push(field, Condition::Range { gte, lte });
        }
        self
    }

    pub fn push(&mut self, field: impl Into<String>, condition: Condition) {
        self.clauses.push((field.into(), condition));
    }

    /// Adds every clause of `other`; the result matches documents matching both.
    pub fn merge(&mut self, other: Filter) {
        self.clauses.extend(other.clauses);
    }

    pub fn clauses(&self) -> &[(String, Condition)] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Ordered list of sort keys; earlier keys take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Parses `"-rating,name"` style specifications.
    ///
    /// Segments are trimmed and empty segments skipped, so `"-ratingsAverage, price"`
    /// and `"a,,b"` are accepted. A leading `-` means descending.
    pub fn parse(spec: &str) -> Self {
        let keys = spec
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "-")
            .map(|segment| match segment.strip_prefix('-') {
                Some(field) => SortKey {
                    field: field.trim().to_string(),
                    direction: SortDirection::Desc,
                },
                None => SortKey {
                    field: segment.to_string(),
                    direction: SortDirection::Asc,
                },
            })
            .collect();

        Self { keys }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Field exclusion list applied to returned documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    excluded: Vec<String>,
}

impl Projection {
    pub fn exclude<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn includes(&self, field: &str) -> bool {
        !self.excluded.iter().any(|f| f == field)
    }

    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }
}
