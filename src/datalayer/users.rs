use sea_query::{Expr, Order, PostgresQueryBuilder, Query, SimpleExpr, Value};
use sqlx::postgres::PgArguments;
use sqlx::{FromRow, PgPool, Postgres};
use std::sync::Arc;
use tracing::debug;

use crate::datalayer::types::{User, Users};
use crate::errors::errors::{ServiceError, ServiceResult};
use crate::validation::{UserChanges, ValidUserInput};

/// Postgres SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Persistent store for the user resource
///
/// All six operations run against the shared connection pool; uniqueness
/// of `email` and atomic id assignment are enforced by the database, so
/// the store itself holds no state beyond the pool handle.
#[derive(Clone)]
pub struct UserStore {
    pool: Arc<PgPool>,
}

impl UserStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// All users, ordered ascending by id
    pub async fn list_all(&self) -> ServiceResult<Vec<User>> {
        let (sql, values) = Query::select()
            .columns(user_columns())
            .from(Users::Table)
            .order_by(Users::Id, Order::Asc)
            .build(PostgresQueryBuilder);

        debug!(sql = %sql, "Listing users");

        let rows = bind_values(sqlx::query(&sql), values)
            .fetch_all(&*self.pool)
            .await
            .map_err(map_storage_error)?;

        rows.iter().map(decode_user).collect()
    }

    /// Fetch a single user by id
    pub async fn get_by_id(&self, id: i64) -> ServiceResult<User> {
        let (sql, values) = Query::select()
            .columns(user_columns())
            .from(Users::Table)
            .and_where(Expr::col(Users::Id).eq(id))
            .build(PostgresQueryBuilder);

        let row = bind_values(sqlx::query(&sql), values)
            .fetch_optional(&*self.pool)
            .await
            .map_err(map_storage_error)?
            .ok_or(ServiceError::NotFound)?;

        decode_user(&row)
    }

    /// Insert a new user; the database assigns the id
    pub async fn create(&self, input: &ValidUserInput) -> ServiceResult<User> {
        let now = chrono::Utc::now();

        let mut stmt = Query::insert();
        stmt.into_table(Users::Table)
            .columns([
                Users::Name,
                Users::Email,
                Users::Age,
                Users::CreatedAt,
                Users::UpdatedAt,
            ])
            .values_panic(
                [
                    Value::from(input.name.clone()),
                    Value::from(input.email.clone()),
                    Value::from(input.age),
                    Value::from(now),
                    Value::from(now),
                ]
                .map(SimpleExpr::Value),
            )
            .returning(Query::returning().columns(user_columns()));
        let (sql, values) = stmt.build(PostgresQueryBuilder);

        let row = bind_values(sqlx::query(&sql), values)
            .fetch_one(&*self.pool)
            .await
            .map_err(map_storage_error)?;

        decode_user(&row)
    }

    /// Overwrite all mutable fields of the user with the given id
    pub async fn replace(&self, id: i64, input: &ValidUserInput) -> ServiceResult<User> {
        let now = chrono::Utc::now();

        let mut stmt = Query::update();
        stmt.table(Users::Table)
            .values([
                (Users::Name, SimpleExpr::Value(Value::from(input.name.clone()))),
                (
                    Users::Email,
                    SimpleExpr::Value(Value::from(input.email.clone())),
                ),
                (Users::Age, SimpleExpr::Value(Value::from(input.age))),
                (Users::UpdatedAt, SimpleExpr::Value(Value::from(now))),
            ])
            .and_where(Expr::col(Users::Id).eq(id))
            .returning(Query::returning().columns(user_columns()));
        let (sql, values) = stmt.build(PostgresQueryBuilder);

        let row = bind_values(sqlx::query(&sql), values)
            .fetch_optional(&*self.pool)
            .await
            .map_err(map_storage_error)?
            .ok_or(ServiceError::NotFound)?;

        decode_user(&row)
    }

    /// Overwrite only the fields supplied by a partial update
    pub async fn patch(&self, id: i64, changes: &UserChanges) -> ServiceResult<User> {
        let now = chrono::Utc::now();

        let mut stmt = Query::update();
        stmt.table(Users::Table)
            .value(Users::UpdatedAt, SimpleExpr::Value(Value::from(now)));

        // Only the supplied fields land in the SET list.
        if let Some(name) = &changes.name {
            stmt.value(Users::Name, SimpleExpr::Value(Value::from(name.clone())));
        }
        if let Some(email) = &changes.email {
            stmt.value(Users::Email, SimpleExpr::Value(Value::from(email.clone())));
        }
        if let Some(age) = changes.age {
            stmt.value(Users::Age, SimpleExpr::Value(Value::from(age)));
        }

        stmt.and_where(Expr::col(Users::Id).eq(id))
            .returning(Query::returning().columns(user_columns()));
        let (sql, values) = stmt.build(PostgresQueryBuilder);

        let row = bind_values(sqlx::query(&sql), values)
            .fetch_optional(&*self.pool)
            .await
            .map_err(map_storage_error)?
            .ok_or(ServiceError::NotFound)?;

        decode_user(&row)
    }

    /// Remove the user with the given id, returning its last-known state
    pub async fn delete(&self, id: i64) -> ServiceResult<User> {
        let mut stmt = Query::delete();
        stmt.from_table(Users::Table)
            .and_where(Expr::col(Users::Id).eq(id))
            .returning(Query::returning().columns(user_columns()));
        let (sql, values) = stmt.build(PostgresQueryBuilder);

        let row = bind_values(sqlx::query(&sql), values)
            .fetch_optional(&*self.pool)
            .await
            .map_err(map_storage_error)?
            .ok_or(ServiceError::NotFound)?;

        decode_user(&row)
    }
}

fn user_columns() -> [Users; 6] {
    [
        Users::Id,
        Users::Name,
        Users::Email,
        Users::Age,
        Users::CreatedAt,
        Users::UpdatedAt,
    ]
}

fn decode_user(row: &sqlx::postgres::PgRow) -> ServiceResult<User> {
    User::from_row(row).map_err(|e| ServiceError::Unexpected(e.to_string()))
}

/// Map driver failures to the service's closed error set
///
/// The only constraint on the users table a valid request can trip is the
/// unique email index, so SQLSTATE 23505 means an email collision.
fn map_storage_error(e: sqlx::Error) -> ServiceError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            ServiceError::EmailConflict
        }
        _ => ServiceError::Unexpected(e.to_string()),
    }
}

/// Bind sea-query values onto an sqlx query in order
fn bind_values<'a>(
    mut query: sqlx::query::Query<'a, Postgres, PgArguments>,
    values: sea_query::Values,
) -> sqlx::query::Query<'a, Postgres, PgArguments> {
    for value in values.0 {
        query = match value {
            Value::Bool(v) => query.bind(v),
            Value::TinyInt(v) => query.bind(v.map(|x| x as i16)),
            Value::SmallInt(v) => query.bind(v),
            Value::Int(v) => query.bind(v),
            Value::BigInt(v) => query.bind(v),
            Value::TinyUnsigned(v) => query.bind(v.map(|x| x as i16)),
            Value::SmallUnsigned(v) => query.bind(v.map(|x| x as i32)),
            Value::Unsigned(v) => query.bind(v.map(|x| x as i64)),
            Value::BigUnsigned(v) => query.bind(v.map(|x| x as i64)),
            Value::Float(v) => query.bind(v),
            Value::Double(v) => query.bind(v),
            Value::String(v) => query.bind(v.map(|s| *s)),
            Value::Char(v) => query.bind(v.map(|c| c.to_string())),
            Value::Bytes(v) => query.bind(v.map(|b| *b)),
            Value::ChronoDate(v) => query.bind(v.map(|d| *d)),
            Value::ChronoTime(v) => query.bind(v.map(|t| *t)),
            Value::ChronoDateTime(v) => query.bind(v.map(|dt| *dt)),
            Value::ChronoDateTimeUtc(v) => query.bind(v.map(|dt| *dt)),
            Value::ChronoDateTimeLocal(v) => query.bind(v.map(|dt| *dt)),
            Value::ChronoDateTimeWithTimeZone(v) => query.bind(v.map(|dt| *dt)),
        };
    }
    query
}
