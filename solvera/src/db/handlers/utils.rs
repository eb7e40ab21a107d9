//! Query helpers shared by the content repositories.

use sqlx::{Postgres, QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

/// Append `AND (LOWER(col1) LIKE $n OR LOWER(col2) LIKE $n ...)` for a substring search.
///
/// LIKE wildcards in the term are escaped so `50%` matches literally.
pub fn push_search(query: &mut QueryBuilder<'_, Postgres>, columns: &[&str], search: &str) {
    let pattern = format!("%{}%", escape_like(&search.to_lowercase()));

    query.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            query.push(" OR ");
        }
        query.push(format!("LOWER(COALESCE({column}, '')) LIKE "));
        query.push_bind(pattern.clone());
        query.push(" ESCAPE '\\'");
    }
    query.push(")");
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Group child rows (already in display order) by their parent id.
pub fn group_by_parent<T>(rows: Vec<T>, parent_of: impl Fn(&T) -> Uuid) -> HashMap<Uuid, Vec<T>> {
    let mut grouped: HashMap<Uuid, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(parent_of(&row)).or_default().push(row);
    }
    grouped
}

/// Display order for a submitted child: its explicit value, else its 1-based array position.
pub fn position_order(order: Option<i32>, index: usize) -> i32 {
    order.unwrap_or_else(|| i32::try_from(index + 1).unwrap_or(i32::MAX))
}
