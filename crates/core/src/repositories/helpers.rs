//! Query helpers shared by the repository services.

use crate::pagination::{Page, PageRequest};
use crate::{MedicardError, MedicardResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

/// Escape `%`, `_` and `\` so `input` matches literally inside a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `%input%`, escaped, for case-insensitive substring matching.
pub(crate) fn contains_pattern(input: &str) -> String {
    format!("%{}%", escape_like(input))
}

/// Whether a row with `id` exists in `table`. `table` is always a literal from this crate.
pub(crate) async fn row_exists(pool: &SqlitePool, table: &'static str, id: i64) -> MedicardResult<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?)");
    let exists = sqlx::query_scalar::<_, bool>(&sql)
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

/// Check a foreign key supplied in a request body.
///
/// A dangling reference in a body is the caller's mistake, so it is reported as
/// `InvalidInput` rather than `NotFound`.
pub(crate) async fn ensure_reference(
    pool: &SqlitePool,
    table: &'static str,
    field: &str,
    id: Option<i64>,
) -> MedicardResult<()> {
    match id {
        Some(id) if !row_exists(pool, table, id).await? => Err(MedicardError::InvalidInput(
            format!("{field} {id} does not exist"),
        )),
        _ => Ok(()),
    }
}

/// Map a unique-constraint violation to `Conflict`; every other error passes through.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: impl FnOnce() -> String) -> MedicardError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            MedicardError::Conflict(message())
        }
        _ => MedicardError::Database(err),
    }
}

/// Run a count query and a page query over the same `FROM ... WHERE` clause.
///
/// `from` must contain the `FROM` and any joins. `push_filters` is called once per query and
/// appends ` AND ...` conditions to a `WHERE 1 = 1` clause, so the count is always taken over
/// exactly the set being paged.
pub(crate) async fn fetch_page<T, F>(
    pool: &SqlitePool,
    columns: &str,
    from: &str,
    order_by: &str,
    request: PageRequest,
    push_filters: F,
) -> MedicardResult<Page<T>>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    F: Fn(&mut QueryBuilder<'_, Sqlite>),
{
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) ");
    count.push(from).push(" WHERE 1 = 1");
    push_filters(&mut count);
    let total_items: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut select = QueryBuilder::<Sqlite>::new("SELECT ");
    select.push(columns).push(" ").push(from).push(" WHERE 1 = 1");
    push_filters(&mut select);
    select
        .push(" ORDER BY ")
        .push(order_by)
        .push(" LIMIT ")
        .push_bind(request.per_page())
        .push(" OFFSET ")
        .push_bind(request.offset());
    let items = select.build_query_as::<T>().fetch_all(pool).await?;

    Ok(Page {
        items,
        request,
        total_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("ICU"), "ICU");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
    }
}
