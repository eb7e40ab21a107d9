//! Database repository for service pages and their five section collections.

use crate::api::models::services::{
    CompetencyInput, FocusItemInput, MethodologyInput, OfferingInput, QuickStepInput, ServicePageCreate, ServicePageUpdate,
};
use crate::db::{
    errors::{DbError, Result},
    handlers::{
        repository::Repository,
        slugs::{SlugTable, Slugs},
        utils::{group_by_parent, position_order, push_search},
    },
    models::services::{
        ServiceCompetency, ServiceFocusItem, ServiceMethodology, ServiceOffering, ServicePageDBResponse, ServiceQuickStep,
    },
};
use crate::slugs;
use crate::types::{ServicePageId, abbrev_uuid};
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

/// Nullable text columns of `service_pages`, in the order of [`create_text`] / [`update_text`].
const OPTIONAL_TEXT_COLUMNS: [&str; 16] = [
    "hero_tagline",
    "hero_bg_image",
    "focus_section_tagline",
    "focus_section_heading",
    "focus_section_desc",
    "quick_step_heading",
    "quick_step_subheading",
    "quick_step_footer",
    "offering_heading",
    "offering_desc",
    "methodology_heading",
    "methodology_desc",
    "methodology_footer",
    "competency_heading",
    "competency_desc",
    "competency_footer",
];

fn create_text(r: &ServicePageCreate) -> [Option<&str>; 16] {
    [
        r.hero_tagline.as_deref(),
        r.hero_bg_image.as_deref(),
        r.focus_section_tagline.as_deref(),
        r.focus_section_heading.as_deref(),
        r.focus_section_desc.as_deref(),
        r.quick_step_heading.as_deref(),
        r.quick_step_subheading.as_deref(),
        r.quick_step_footer.as_deref(),
        r.offering_heading.as_deref(),
        r.offering_desc.as_deref(),
        r.methodology_heading.as_deref(),
        r.methodology_desc.as_deref(),
        r.methodology_footer.as_deref(),
        r.competency_heading.as_deref(),
        r.competency_desc.as_deref(),
        r.competency_footer.as_deref(),
    ]
}

fn update_text(r: &ServicePageUpdate) -> [Option<&str>; 16] {
    [
        r.hero_tagline.as_deref(),
        r.hero_bg_image.as_deref(),
        r.focus_section_tagline.as_deref(),
        r.focus_section_heading.as_deref(),
        r.focus_section_desc.as_deref(),
        r.quick_step_heading.as_deref(),
        r.quick_step_subheading.as_deref(),
        r.quick_step_footer.as_deref(),
        r.offering_heading.as_deref(),
        r.offering_desc.as_deref(),
        r.methodology_heading.as_deref(),
        r.methodology_desc.as_deref(),
        r.methodology_footer.as_deref(),
        r.competency_heading.as_deref(),
        r.competency_desc.as_deref(),
        r.competency_footer.as_deref(),
    ]
}

/// Filter for listing service pages
#[derive(Debug, Clone)]
pub struct ServicePageFilter {
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>,
}

impl ServicePageFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit, search: None }
    }

    pub fn with_search(mut self, search: String) -> Self {
        self.search = Some(search);
        self
    }

    fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if let Some(ref search) = self.search {
            push_search(query, &["page_name", "slug", "hero_heading"], search);
        }
    }
}

pub struct ServicePages<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for ServicePages<'c> {
    type CreateRequest = ServicePageCreate;
    type UpdateRequest = ServicePageUpdate;
    type Response = ServicePageDBResponse;
    type Id = ServicePageId;
    type Filter = ServicePageFilter;

    #[instrument(skip(self, request), fields(page_name = %request.page_name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id = Uuid::new_v4();
        {
            let mut tx = self.db.begin().await?;

            let base = slugs::requested_base(request.slug.as_deref(), &request.page_name);
            let slug = Slugs::new(&mut tx).allocate(&base, None).await?;

            let mut query = QueryBuilder::<Postgres>::new(
                "INSERT INTO service_pages (id, slug, slug_is_custom, page_name, hero_heading, quick_step_layout, methodology_layout",
            );
            for column in OPTIONAL_TEXT_COLUMNS {
                query.push(", ");
                query.push(column);
            }
            query.push(") VALUES (");
            query.push_bind(id);
            query.push(", ");
            query.push_bind(slug);
            query.push(", ");
            query.push_bind(slugs::is_explicit(request.slug.as_deref()));
            query.push(", ");
            query.push_bind(request.page_name.trim().to_string());
            query.push(", ");
            query.push_bind(request.hero_heading.clone());
            query.push(", ");
            query.push_bind(request.quick_step_layout);
            query.push(", ");
            query.push_bind(request.methodology_layout);
            for value in create_text(request) {
                query.push(", NULLIF(");
                query.push_bind(value.map(str::to_string));
                query.push(", '')");
            }
            query.push(")");
            query.build().execute(&mut *tx).await?;

            replace_focus_items(&mut tx, id, &request.focus_items).await?;
            replace_quick_steps(&mut tx, id, &request.quick_steps).await?;
            replace_offerings(&mut tx, id, &request.offerings).await?;
            replace_methodologies(&mut tx, id, &request.methodologies).await?;
            replace_competencies(&mut tx, id, &request.competencies).await?;

            tx.commit().await?;
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(service_page_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let page = sqlx::query_as::<_, ServicePageDBResponse>("SELECT * FROM service_pages WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        match page {
            Some(page) => Ok(self.with_children(vec![page]).await?.pop()),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let pages = sqlx::query_as::<_, ServicePageDBResponse>("SELECT * FROM service_pages WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        let pages = self.with_children(pages).await?;
        Ok(pages.into_iter().map(|p| (p.id, p)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM service_pages WHERE 1=1");
        filter.push_conditions(&mut query);

        query.push(" ORDER BY updated_at DESC, id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let pages = query.build_query_as::<ServicePageDBResponse>().fetch_all(&mut *self.db).await?;
        self.with_children(pages).await
    }

    #[instrument(skip(self), fields(service_page_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM service_pages WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(service_page_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        {
            let mut tx = self.db.begin().await?;

            let (old_name, slug_is_custom): (String, bool) =
                sqlx::query_as("SELECT page_name, slug_is_custom FROM service_pages WHERE id = $1 FOR UPDATE")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or(DbError::NotFound)?;

            let new_name = request.page_name.as_deref().map(str::trim);
            let slug = if slugs::needs_recompute(request.slug.as_deref(), &old_name, new_name, slug_is_custom) {
                let base = slugs::requested_base(request.slug.as_deref(), new_name.unwrap_or(&old_name));
                Some(Slugs::new(&mut tx).allocate(&base, Some((SlugTable::ServicePages, id))).await?)
            } else {
                None
            };

            let mut query = QueryBuilder::<Postgres>::new("UPDATE service_pages SET slug = COALESCE(");
            query.push_bind(slug);
            query.push(", slug), slug_is_custom = slug_is_custom OR ");
            query.push_bind(slugs::is_explicit(request.slug.as_deref()));
            query.push(", page_name = COALESCE(");
            query.push_bind(new_name.map(str::to_string));
            query.push(", page_name), hero_heading = COALESCE(");
            query.push_bind(request.hero_heading.clone());
            query.push(", hero_heading), quick_step_layout = COALESCE(");
            query.push_bind(request.quick_step_layout);
            query.push(", quick_step_layout), methodology_layout = COALESCE(");
            query.push_bind(request.methodology_layout);
            query.push(", methodology_layout)");
            for (column, value) in OPTIONAL_TEXT_COLUMNS.iter().zip(update_text(request)) {
                let value = value.map(str::to_string);
                query.push(format!(", {column} = CASE WHEN "));
                query.push_bind(value.clone());
                query.push(format!("::text IS NULL THEN {column} ELSE NULLIF("));
                query.push_bind(value);
                query.push(", '') END");
            }
            query.push(", updated_at = NOW() WHERE id = ");
            query.push_bind(id);
            query.build().execute(&mut *tx).await?;

            if let Some(ref items) = request.focus_items {
                replace_focus_items(&mut tx, id, items).await?;
            }
            if let Some(ref steps) = request.quick_steps {
                replace_quick_steps(&mut tx, id, steps).await?;
            }
            if let Some(ref offerings) = request.offerings {
                replace_offerings(&mut tx, id, offerings).await?;
            }
            if let Some(ref phases) = request.methodologies {
                replace_methodologies(&mut tx, id, phases).await?;
            }
            if let Some(ref competencies) = request.competencies {
                replace_competencies(&mut tx, id, competencies).await?;
            }

            tx.commit().await?;
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }
}

async fn clear_children(conn: &mut PgConnection, table: &str, page_id: ServicePageId) -> Result<()> {
    sqlx::query(&format!("DELETE FROM {table} WHERE service_page_id = $1"))
        .bind(page_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn replace_focus_items(conn: &mut PgConnection, page_id: ServicePageId, items: &[FocusItemInput]) -> Result<()> {
    clear_children(conn, "service_focus_items", page_id).await?;

    for (index, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO service_focus_items (id, service_page_id, card_title, card_desc, icon_image, display_order)
            VALUES ($1, $2, $3, NULLIF($4, ''), NULLIF($5, ''), $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(page_id)
        .bind(&item.card_title)
        .bind(&item.card_desc)
        .bind(&item.icon_image)
        .bind(position_order(item.display_order, index))
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn replace_quick_steps(conn: &mut PgConnection, page_id: ServicePageId, steps: &[QuickStepInput]) -> Result<()> {
    clear_children(conn, "service_quick_steps", page_id).await?;

    for (index, step) in steps.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO service_quick_steps (id, service_page_id, step_label, step_title, step_desc, checklist, step_order)
            VALUES ($1, $2, NULLIF($3, ''), $4, NULLIF($5, ''), $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(page_id)
        .bind(&step.step_label)
        .bind(&step.step_title)
        .bind(&step.step_desc)
        .bind(&step.checklist)
        .bind(position_order(step.step_order, index))
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn replace_offerings(conn: &mut PgConnection, page_id: ServicePageId, offerings: &[OfferingInput]) -> Result<()> {
    clear_children(conn, "service_offerings", page_id).await?;

    for (index, offering) in offerings.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO service_offerings (
                id, service_page_id, title, description, checklist, icon_image,
                highlight_badge, button_text, button_url, display_order
            )
            VALUES ($1, $2, $3, NULLIF($4, ''), $5, NULLIF($6, ''), NULLIF($7, ''), NULLIF($8, ''), NULLIF($9, ''), $10)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(page_id)
        .bind(&offering.title)
        .bind(&offering.description)
        .bind(&offering.checklist)
        .bind(&offering.icon_image)
        .bind(&offering.highlight_badge)
        .bind(&offering.button_text)
        .bind(&offering.button_url)
        .bind(position_order(offering.display_order, index))
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn replace_methodologies(conn: &mut PgConnection, page_id: ServicePageId, phases: &[MethodologyInput]) -> Result<()> {
    clear_children(conn, "service_methodologies", page_id).await?;

    for (index, phase) in phases.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO service_methodologies (id, service_page_id, phase_number, phase_title, phase_desc, icon_image, phase_order)
            VALUES ($1, $2, NULLIF($3, ''), $4, NULLIF($5, ''), NULLIF($6, ''), $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(page_id)
        .bind(&phase.phase_number)
        .bind(&phase.phase_title)
        .bind(&phase.phase_desc)
        .bind(&phase.icon_image)
        .bind(position_order(phase.phase_order, index))
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn replace_competencies(conn: &mut PgConnection, page_id: ServicePageId, competencies: &[CompetencyInput]) -> Result<()> {
    clear_children(conn, "service_competencies", page_id).await?;

    for (index, competency) in competencies.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO service_competencies (id, service_page_id, skill_name, percentage_value, rank_order)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(page_id)
        .bind(&competency.skill_name)
        .bind(competency.percentage_value)
        .bind(position_order(competency.rank_order, index))
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

impl<'c> ServicePages<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &ServicePageFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM service_pages WHERE 1=1");
        filter.push_conditions(&mut query);

        let count: (i64,) = query.build_query_as().fetch_one(&mut *self.db).await?;
        Ok(count.0)
    }

    /// Every service page, most recently updated first.
    #[instrument(skip(self), err)]
    pub async fn list_all(&mut self) -> Result<Vec<ServicePageDBResponse>> {
        let pages = sqlx::query_as::<_, ServicePageDBResponse>("SELECT * FROM service_pages ORDER BY updated_at DESC, id")
            .fetch_all(&mut *self.db)
            .await?;

        self.with_children(pages).await
    }

    #[instrument(skip(self), fields(slug = %slug), err)]
    pub async fn get_by_slug(&mut self, slug: &str) -> Result<Option<ServicePageDBResponse>> {
        let page = sqlx::query_as::<_, ServicePageDBResponse>("SELECT * FROM service_pages WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&mut *self.db)
            .await?;

        match page {
            Some(page) => Ok(self.with_children(vec![page]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn with_children(&mut self, mut pages: Vec<ServicePageDBResponse>) -> Result<Vec<ServicePageDBResponse>> {
        if pages.is_empty() {
            return Ok(pages);
        }
        let ids: Vec<ServicePageId> = pages.iter().map(|p| p.id).collect();

        let focus_items = sqlx::query_as::<_, ServiceFocusItem>(
            "SELECT * FROM service_focus_items WHERE service_page_id = ANY($1) ORDER BY display_order, created_at, id",
        )
        .bind(&ids)
        .fetch_all(&mut *self.db)
        .await?;
        let quick_steps = sqlx::query_as::<_, ServiceQuickStep>(
            "SELECT * FROM service_quick_steps WHERE service_page_id = ANY($1) ORDER BY step_order, created_at, id",
        )
        .bind(&ids)
        .fetch_all(&mut *self.db)
        .await?;
        let offerings = sqlx::query_as::<_, ServiceOffering>(
            "SELECT * FROM service_offerings WHERE service_page_id = ANY($1) ORDER BY display_order, created_at, id",
        )
        .bind(&ids)
        .fetch_all(&mut *self.db)
        .await?;
        let methodologies = sqlx::query_as::<_, ServiceMethodology>(
            "SELECT * FROM service_methodologies WHERE service_page_id = ANY($1) ORDER BY phase_order, created_at, id",
        )
        .bind(&ids)
        .fetch_all(&mut *self.db)
        .await?;
        let competencies = sqlx::query_as::<_, ServiceCompetency>(
            "SELECT * FROM service_competencies WHERE service_page_id = ANY($1) ORDER BY rank_order, created_at, id",
        )
        .bind(&ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut focus_items = group_by_parent(focus_items, |r| r.service_page_id);
        let mut quick_steps = group_by_parent(quick_steps, |r| r.service_page_id);
        let mut offerings = group_by_parent(offerings, |r| r.service_page_id);
        let mut methodologies = group_by_parent(methodologies, |r| r.service_page_id);
        let mut competencies = group_by_parent(competencies, |r| r.service_page_id);

        for page in &mut pages {
            page.focus_items = focus_items.remove(&page.id).unwrap_or_default();
            page.quick_steps = quick_steps.remove(&page.id).unwrap_or_default();
            page.offerings = offerings.remove(&page.id).unwrap_or_default();
            page.methodologies = methodologies.remove(&page.id).unwrap_or_default();
            page.competencies = competencies.remove(&page.id).unwrap_or_default();
        }
        Ok(pages)
    }
}
