use serde_json::{Map, Value};
use sqlx::{postgres::PgArguments, PgPool, Row};

use crate::database::DatabaseError;
use crate::resource::Resource;

/// Table-scoped data access for telemetry records.
///
/// Records are dynamic JSON objects; the column set for every statement comes
/// from the static [`Resource`] configuration, never from request input, so
/// identifier interpolation is safe and values are always bound parameters.
#[derive(Clone)]
pub struct RecordStore {
    pool: PgPool,
}

impl RecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn count(&self, resource: &Resource) -> Result<i64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) AS count FROM \"{}\"", resource.kind);
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    /// One page of records ordered by id ascending.
    pub async fn select_page(
        &self,
        resource: &Resource,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Value>, DatabaseError> {
        // row_to_json keeps the column set dynamic across resource kinds
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{}\" ORDER BY id LIMIT $1 OFFSET $2) t",
            resource.kind
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(row.try_get::<Value, _>("row")?);
        }
        Ok(records)
    }

    /// Insert a record and return the generated id. The id column is always
    /// server-assigned; `fields` must already be reduced to the resource's
    /// recognized field set.
    pub async fn insert(
        &self,
        resource: &Resource,
        fields: &Map<String, Value>,
    ) -> Result<i64, DatabaseError> {
        let columns = resource
            .required_fields
            .iter()
            .map(|f| format!("\"{}\"", f))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=resource.required_fields.len())
            .map(|i| format!("${}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING id",
            resource.kind, columns, placeholders
        );

        let mut query = sqlx::query(&sql);
        for field in resource.required_fields {
            query = bind_value(query, fields.get(*field).unwrap_or(&Value::Null));
        }

        let row = query.fetch_one(&self.pool).await?;
        let id: i64 = row.try_get("id")?;
        Ok(id)
    }

    pub async fn fetch_by_id(
        &self,
        resource: &Resource,
        id: i64,
    ) -> Result<Option<Value>, DatabaseError> {
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{}\" WHERE id = $1) t",
            resource.kind
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        match row {
            Some(r) => Ok(Some(r.try_get::<Value, _>("row")?)),
            None => Ok(None),
        }
    }

    /// Replace the recognized columns of the row matching `id`. Returns the
    /// affected-row count; zero means no such id.
    pub async fn update_by_id(
        &self,
        resource: &Resource,
        id: i64,
        fields: &Map<String, Value>,
    ) -> Result<u64, DatabaseError> {
        let assignments = resource
            .required_fields
            .iter()
            .enumerate()
            .map(|(i, f)| format!("\"{}\" = ${}", f, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE \"{}\" SET {} WHERE id = ${}",
            resource.kind,
            assignments,
            resource.required_fields.len() + 1
        );

        let mut query = sqlx::query(&sql);
        for field in resource.required_fields {
            query = bind_value(query, fields.get(*field).unwrap_or(&Value::Null));
        }
        query = query.bind(id);

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_id(&self, resource: &Resource, id: i64) -> Result<u64, DatabaseError> {
        let sql = format!("DELETE FROM \"{}\" WHERE id = $1", resource.kind);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

/// Bind a JSON scalar as the matching Postgres type.
fn bind_value<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<f64> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        // Nested values have no column representation here; pass through as JSONB
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}
