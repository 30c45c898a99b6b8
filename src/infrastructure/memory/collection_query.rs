//! [`CollectionQuery`] over an in-memory snapshot of JSON documents.

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;

use crate::domain::query::{
    CollectionQuery, CollectionSchema, Condition, Document, FieldDef, Filter, Projection,
    SortDirection, SortSpec, TypedValue,
};
use crate::error::AppError;

/// A compiled condition with coerced operands.
enum Predicate<'a> {
    Eq(&'a FieldDef, TypedValue),
    Ne(&'a FieldDef, TypedValue),
    Range {
        field: &'a FieldDef,
        gte: Option<TypedValue>,
        lte: Option<TypedValue>,
    },
}

impl Predicate<'_> {
    fn matches(&self, document: &Document) -> bool {
        match self {
            Predicate::Eq(field, expected) => {
                read(field, document).is_some_and(|v| v.compare(expected) == Ordering::Equal)
            }
            Predicate::Ne(field, expected) => {
                read(field, document).is_none_or(|v| v.compare(expected) != Ordering::Equal)
            }
            Predicate::Range { field, gte, lte } => match read(field, document) {
                Some(value) => {
                    gte.as_ref()
                        .is_none_or(|min| value.compare(min) != Ordering::Less)
                        && lte
                            .as_ref()
                            .is_none_or(|max| value.compare(max) != Ordering::Greater)
                }
                None => false,
            },
        }
    }
}

fn read(field: &FieldDef, document: &Document) -> Option<TypedValue> {
    document.get(field.name).and_then(|v| field.read(v))
}

/// Query over a snapshot of documents taken when the query was created.
///
/// Documents carry every schema field, hidden ones included; hidden fields
/// are stripped on [`CollectionQuery::exec`]. Nulls and missing values sort
/// lowest, ties are broken by ascending `id`.
pub struct MemoryCollectionQuery {
    schema: &'static CollectionSchema,
    documents: Vec<Document>,
    filter: Filter,
    sort: SortSpec,
    projection: Projection,
    window: Option<(u64, u64)>,
}

impl MemoryCollectionQuery {
    pub fn new(schema: &'static CollectionSchema, documents: Vec<Document>) -> Self {
        Self {
            schema,
            documents,
            filter: Filter::new(),
            sort: SortSpec::default(),
            projection: Projection::default(),
            window: None,
        }
    }

    fn compile(&self) -> Result<Vec<Predicate<'static>>, AppError> {
        self.filter
            .clauses()
            .iter()
            .map(|(name, condition)| {
                let field = self.schema.comparable_field(name, "filter")?;
                Ok(match condition {
                    Condition::Eq(raw) => Predicate::Eq(field, field.coerce(raw)?),
                    Condition::Ne(raw) => Predicate::Ne(field, field.coerce(raw)?),
                    Condition::Range { gte, lte } => Predicate::Range {
                        field,
                        gte: gte.as_deref().map(|raw| field.coerce(raw)).transpose()?,
                        lte: lte.as_deref().map(|raw| field.coerce(raw)).transpose()?,
                    },
                })
            })
            .collect()
    }

    fn matching(&self) -> Result<Vec<&Document>, AppError> {
        let predicates = self.compile()?;
        Ok(self
            .documents
            .iter()
            .filter(|doc| predicates.iter().all(|p| p.matches(doc)))
            .collect())
    }

    fn sort_keys(&self) -> Result<Vec<(&'static FieldDef, SortDirection)>, AppError> {
        self.sort
            .keys()
            .iter()
            .map(|key| {
                self.schema
                    .comparable_field(&key.field, "sort")
                    .map(|field| (field, key.direction))
            })
            .collect()
    }

    fn project(&self, document: &Document) -> Document {
        document
            .iter()
            .filter(|(name, _)| {
                self.projection.includes(name)
                    && self.schema.field(name).is_some_and(|f| !f.hidden)
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

fn compare_documents(
    a: &Document,
    b: &Document,
    keys: &[(&FieldDef, SortDirection)],
) -> Ordering {
    for (field, direction) in keys {
        let ordering = match (read(field, a), read(field, b)) {
            (Some(x), Some(y)) => x.compare(&y),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        let ordering = match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    let id = |doc: &Document| doc.get("id").and_then(Value::as_i64);
    id(a).cmp(&id(b))
}

#[async_trait]
impl CollectionQuery for MemoryCollectionQuery {
    fn find(&mut self, filter: Filter) {
        self.filter.merge(filter);
    }

    fn sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    fn select(&mut self, projection: Projection) {
        self.projection = projection;
    }

    fn skip_limit(&mut self, skip: u64, limit: u64) {
        self.window = Some((skip, limit));
    }

    async fn count_documents(&self) -> Result<u64, AppError> {
        Ok(self.matching()?.len() as u64)
    }

    async fn exec(self) -> Result<Vec<Document>, AppError> {
        let keys = self.sort_keys()?;
        let mut matching = self.matching()?;
        matching.sort_by(|a, b| compare_documents(a, b, &keys));

        let (skip, limit) = self.window.unwrap_or((0, u64::MAX));
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(matching
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| self.project(doc))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::{FieldKind, Filter};
    use serde_json::json;

    const FIELDS: &[FieldDef] = &[
        FieldDef::new("id", "id", FieldKind::Id),
        FieldDef::new("name", "name", FieldKind::Text),
        FieldDef::new("price", "price", FieldKind::Number),
        FieldDef::new("tags", "tags", FieldKind::Composite),
        FieldDef::hidden("secret", "secret", FieldKind::Bool),
    ];

    static SCHEMA: CollectionSchema = CollectionSchema {
        name: "items",
        table: "items",
        fields: FIELDS,
    };

    fn docs() -> Vec<Document> {
        [
            json!({ "id": 1, "name": "b", "price": 30.0, "tags": [], "secret": false }),
            json!({ "id": 2, "name": "a", "price": 10.0, "tags": [], "secret": true }),
            json!({ "id": 3, "name": "c", "price": null, "tags": [] }),
            json!({ "id": 4, "name": "a", "price": 20.0, "tags": [], "secret": false }),
        ]
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
    }

    fn ids(documents: &[Document]) -> Vec<i64> {
        documents
            .iter()
            .filter_map(|d| d.get("id").and_then(Value::as_i64))
            .collect()
    }

    #[tokio::test]
    async fn test_ne_matches_missing_values() {
        let mut query = MemoryCollectionQuery::new(&SCHEMA, docs());
        query.find(Filter::new().ne("secret", "true"));

        assert_eq!(ids(&query.exec().await.unwrap()), vec![1, 3, 4]);
    }

    #[tokio::test]
    async fn test_range_excludes_nulls() {
        let mut query = MemoryCollectionQuery::new(&SCHEMA, docs());
        query.find(Filter::new().range("price", Some("10".into()), Some("20".into())));

        assert_eq!(query.count_documents().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_nulls_sort_lowest() {
        let mut query = MemoryCollectionQuery::new(&SCHEMA, docs());
        query.sort(SortSpec::parse("price"));
        assert_eq!(ids(&query.exec().await.unwrap()), vec![3, 2, 4, 1]);

        let mut query = MemoryCollectionQuery::new(&SCHEMA, docs());
        query.sort(SortSpec::parse("-price"));
        assert_eq!(ids(&query.exec().await.unwrap()), vec![1, 4, 2, 3]);
    }

    #[tokio::test]
    async fn test_ties_break_on_id() {
        let mut query = MemoryCollectionQuery::new(&SCHEMA, docs());
        query.sort(SortSpec::parse("name"));

        assert_eq!(ids(&query.exec().await.unwrap()), vec![2, 4, 1, 3]);
    }

    #[tokio::test]
    async fn test_hidden_and_excluded_fields_are_stripped() {
        let mut query = MemoryCollectionQuery::new(&SCHEMA, docs());
        query.select(Projection::exclude(["tags"]));

        for doc in query.exec().await.unwrap() {
            assert!(!doc.contains_key("secret"));
            assert!(!doc.contains_key("tags"));
            assert!(doc.contains_key("name"));
        }
    }

    #[tokio::test]
    async fn test_malformed_value_is_rejected() {
        let mut query = MemoryCollectionQuery::new(&SCHEMA, docs());
        query.find(Filter::new().range("price", Some("abc".into()), None));

        let err = query.count_documents().await.unwrap_err();
        assert_eq!(err.message(), "Invalid price: abc");
    }

    #[tokio::test]
    async fn test_unknown_sort_field_is_rejected() {
        let mut query = MemoryCollectionQuery::new(&SCHEMA, docs());
        query.sort(SortSpec::parse("-tags"));

        assert!(query.exec().await.is_err());
    }

    #[tokio::test]
    async fn test_window_past_end_is_empty() {
        let mut query = MemoryCollectionQuery::new(&SCHEMA, docs());
        query.skip_limit(10, 5);

        assert!(query.exec().await.unwrap().is_empty());
    }
}
