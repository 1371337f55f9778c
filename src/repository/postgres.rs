//! PostgreSQL document store
//!
//! Every collection shares the `documents` table: one JSONB row per document,
//! keyed by `(collection, id)`. Filters are translated into parameterised SQL.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::{postgres::PgPoolOptions, types::Json, Pool, Postgres, QueryBuilder};

use super::filter::{Condition, Filter, Scalar};
use super::store::{Document, DocumentStore, Patch, StoreResult, UpdateOutcome, ID_FIELD};
use crate::{config::DatabaseConfig, models::reference::ObjectRef};

const ADD_TO_SET: &str = r#"
    WITH target AS (
        SELECT id, doc FROM documents
        WHERE collection = $1 AND id = ANY($2)
        FOR UPDATE
    ),
    merged AS (
        SELECT t.id, t.doc,
               jsonb_set(t.doc, ARRAY[$3::text], cur.members || COALESCE((
                   SELECT jsonb_agg(to_jsonb(v.value) ORDER BY v.ord)
                   FROM unnest($4::text[]) WITH ORDINALITY AS v(value, ord)
                   WHERE NOT cur.members @> jsonb_build_array(v.value)
               ), '[]'::jsonb)) AS new_doc
        FROM target t
        CROSS JOIN LATERAL (
            SELECT CASE WHEN jsonb_typeof(t.doc -> $3::text) = 'array'
                        THEN t.doc -> $3::text
                        ELSE '[]'::jsonb END AS members
        ) cur
    ),
    updated AS (
        UPDATE documents d SET doc = m.new_doc
        FROM merged m
        WHERE d.collection = $1 AND d.id = m.id AND m.new_doc IS DISTINCT FROM m.doc
        RETURNING d.id
    )
    SELECT (SELECT COUNT(*) FROM target), (SELECT COUNT(*) FROM updated)
"#;

const UPDATE_FIELDS: &str = r#"
    WITH target AS (
        SELECT id, doc FROM documents
        WHERE collection = $1 AND id = $2
        FOR UPDATE
    ),
    updated AS (
        UPDATE documents d SET doc = t.doc || $3
        FROM target t
        WHERE d.collection = $1 AND d.id = t.id AND (t.doc || $3) IS DISTINCT FROM t.doc
        RETURNING d.id
    )
    SELECT (SELECT COUNT(*) FROM target), (SELECT COUNT(*) FROM updated)
"#;

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: Pool<Postgres>,
}

impl PgDocumentStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Open a connection pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the `documents` table and its indexes
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Append `AND <condition>` for every condition in `filter`
fn push_conditions(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    for condition in filter.conditions() {
        qb.push(" AND ");
        match condition {
            Condition::Contains { field, needle } => {
                qb.push("position(lower(")
                    .push_bind(needle.clone())
                    .push(") in lower(doc ->> ")
                    .push_bind(*field)
                    .push(")) > 0");
            }
            Condition::Equals { field, value } => {
                qb.push("doc -> ")
                    .push_bind(*field)
                    .push(" = ")
                    .push_bind(Json(value.clone()));
            }
            Condition::HasMember { field, value } => {
                qb.push("doc -> ")
                    .push_bind(*field)
                    .push(" @> ")
                    .push_bind(Json(json!([value])));
            }
            Condition::AtLeast { field, bound } => push_bound(qb, *field, bound, ">="),
            Condition::AtMost { field, bound } => push_bound(qb, *field, bound, "<="),
            Condition::NonEmpty { field } => {
                qb.push("CASE WHEN jsonb_typeof(doc -> ")
                    .push_bind(*field)
                    .push(") = 'array' THEN jsonb_array_length(doc -> ")
                    .push_bind(*field)
                    .push(") > 0 ELSE false END");
            }
            Condition::IdIn { ids } => {
                let ids: Vec<String> = ids.iter().map(ObjectRef::to_hex).collect();
                qb.push("id = ANY(").push_bind(ids).push(")");
            }
        }
    }
}

fn push_bound(qb: &mut QueryBuilder<'_, Postgres>, field: &'static str, bound: &Scalar, op: &str) {
    let (json_type, cast) = match bound {
        Scalar::Number(_) => ("number", "double precision"),
        Scalar::Date(_) => ("string", "date"),
    };
    qb.push("CASE WHEN jsonb_typeof(doc -> ")
        .push_bind(field)
        .push(format!(") = '{}' THEN (doc ->> ", json_type))
        .push_bind(field)
        .push(format!(")::{} END {} ", cast, op));
    match *bound {
        Scalar::Number(n) => qb.push_bind(n),
        Scalar::Date(d) => qb.push_bind(d),
    };
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, collection: &str, mut doc: Document) -> StoreResult<ObjectRef> {
        let id = ObjectRef::generate();
        doc.insert(ID_FIELD.to_string(), id.into());

        sqlx::query("INSERT INTO documents (collection, id, doc) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id.to_hex())
            .bind(Json(Value::Object(doc)))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn find_by_id(&self, collection: &str, id: &ObjectRef) -> StoreResult<Option<Document>> {
        let row = sqlx::query_scalar::<_, Json<Document>>(
            "SELECT doc FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id.to_hex())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|Json(doc)| doc))
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        skip: u64,
        limit: Option<u64>,
    ) -> StoreResult<Vec<Document>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM documents WHERE collection = ");
        qb.push_bind(collection.to_string());
        push_conditions(&mut qb, filter);
        qb.push(" ORDER BY id OFFSET ").push_bind(skip as i64);
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }

        let rows = qb
            .build_query_scalar::<Json<Document>>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM documents WHERE collection = ");
        qb.push_bind(collection.to_string());
        push_conditions(&mut qb, filter);

        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count as u64)
    }

    async fn update_fields(&self, collection: &str, id: &ObjectRef, patch: Patch) -> StoreResult<UpdateOutcome> {
        let mut fields = patch.into_document();
        fields.remove(ID_FIELD);

        let (matched, modified): (i64, i64) = sqlx::query_as(UPDATE_FIELDS)
            .bind(collection)
            .bind(id.to_hex())
            .bind(Json(Value::Object(fields)))
            .fetch_one(&self.pool)
            .await?;
        Ok(UpdateOutcome {
            matched: matched as u64,
            modified: modified as u64,
        })
    }

    async fn delete(&self, collection: &str, id: &ObjectRef) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.to_hex())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn add_to_set(
        &self,
        collection: &str,
        ids: &[ObjectRef],
        field: &str,
        values: &[ObjectRef],
    ) -> StoreResult<UpdateOutcome> {
        let ids: Vec<String> = ids.iter().map(ObjectRef::to_hex).collect();
        let mut seen = HashSet::with_capacity(values.len());
        let members: Vec<String> = values.iter().filter(|v| seen.insert(**v)).map(ObjectRef::to_hex).collect();

        let (matched, modified): (i64, i64) = sqlx::query_as(ADD_TO_SET)
            .bind(collection)
            .bind(ids)
            .bind(field)
            .bind(members)
            .fetch_one(&self.pool)
            .await?;
        Ok(UpdateOutcome {
            matched: matched as u64,
            modified: modified as u64,
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
