//! FAQ collections owned by products and solutions.

use crate::api::models::common::FaqInput;
use crate::db::{
    errors::Result,
    handlers::utils::{group_by_parent, position_order},
    models::common::Faq,
};
use sqlx::PgConnection;
use std::collections::HashMap;
use uuid::Uuid;

/// Which aggregate a FAQ collection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaqOwner {
    Product,
    Solution,
}

impl FaqOwner {
    fn table(&self) -> &'static str {
        match self {
            FaqOwner::Product => "product_faqs",
            FaqOwner::Solution => "solution_faqs",
        }
    }

    fn parent_column(&self) -> &'static str {
        match self {
            FaqOwner::Product => "product_id",
            FaqOwner::Solution => "solution_id",
        }
    }
}

/// Replace the parent's FAQ collection with `faqs`.
pub async fn replace(conn: &mut PgConnection, owner: FaqOwner, parent_id: Uuid, faqs: &[FaqInput]) -> Result<()> {
    let (table, column) = (owner.table(), owner.parent_column());

    sqlx::query(&format!("DELETE FROM {table} WHERE {column} = $1"))
        .bind(parent_id)
        .execute(&mut *conn)
        .await?;

    let insert = format!("INSERT INTO {table} (id, {column}, question, answer, sequence) VALUES ($1, $2, $3, $4, $5)");
    for (index, faq) in faqs.iter().enumerate() {
        sqlx::query(&insert)
            .bind(Uuid::new_v4())
            .bind(parent_id)
            .bind(&faq.question)
            .bind(&faq.answer)
            .bind(position_order(faq.sequence, index))
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Load FAQ collections for the given parents, in display order.
pub async fn load(conn: &mut PgConnection, owner: FaqOwner, parent_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Faq>>> {
    let (table, column) = (owner.table(), owner.parent_column());

    let rows = sqlx::query_as::<_, Faq>(&format!(
        "SELECT {column} AS parent_id, id, question, answer, sequence FROM {table} \
         WHERE {column} = ANY($1) ORDER BY sequence, created_at, id"
    ))
    .bind(parent_ids)
    .fetch_all(&mut *conn)
    .await?;

    Ok(group_by_parent(rows, |faq| faq.parent_id))
}
