use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::event::{Event, EventStatus, NewEvent};
use crate::models::organizer::{NewOrganizer, Organizer, OrganizerStatus};
use crate::models::page::{Page, PageRequest};
use crate::repository::{EventRepository, OrganizerRepository, RepoError};

fn map_write_error(err: sqlx::Error) -> RepoError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::UniqueViolation,
        _ => RepoError::Database(err),
    }
}

/// `ORDER BY` clause; columns come from the sortable whitelists only.
fn order_by(page: &PageRequest) -> String {
    match page.sort {
        Some(sort) => format!("ORDER BY {} {}, id", sort.column, sort.direction.as_sql()),
        None => "ORDER BY created_at, id".to_string(),
    }
}

fn total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

#[derive(Clone)]
pub struct PgOrganizerRepository {
    pool: PgPool,
}

impl PgOrganizerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizerRepository for PgOrganizerRepository {
    async fn find_by_id_and_status(
        &self,
        id: Uuid,
        status: OrganizerStatus,
    ) -> Result<Option<Organizer>, RepoError> {
        let organizer = sqlx::query_as::<_, Organizer>(
            "SELECT * FROM organizers WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(organizer)
    }

    async fn find_all_by_status(
        &self,
        status: OrganizerStatus,
        page: &PageRequest,
    ) -> Result<Page<Organizer>, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM organizers WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT * FROM organizers WHERE status = $1 {} LIMIT $2 OFFSET $3",
            order_by(page)
        );
        let rows = sqlx::query_as::<_, Organizer>(&sql)
            .bind(status.as_str())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(rows, page, total(count)))
    }

    async fn exists_by_user_id(&self, user_id: &str) -> Result<bool, RepoError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM organizers WHERE user_id = $1 AND status <> 'DELETED')",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, organizer: NewOrganizer) -> Result<Organizer, RepoError> {
        sqlx::query_as::<_, Organizer>(
            r#"
            INSERT INTO organizers
                (user_id, organization_name, contact_email, contact_phone, document_number, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&organizer.user_id)
        .bind(&organizer.organization_name)
        .bind(&organizer.contact_email)
        .bind(&organizer.contact_phone)
        .bind(&organizer.document_number)
        .bind(organizer.status.as_str())
        .bind(&organizer.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn update(&self, organizer: &Organizer) -> Result<Organizer, RepoError> {
        sqlx::query_as::<_, Organizer>(
            r#"
            UPDATE organizers
            SET organization_name = $2,
                contact_email = $3,
                contact_phone = $4,
                document_number = $5,
                status = $6,
                updated_by = $7,
                updated_at = now(),
                version = version + 1
            WHERE id = $1 AND version = $8
            RETURNING *
            "#,
        )
        .bind(organizer.id)
        .bind(&organizer.organization_name)
        .bind(&organizer.contact_email)
        .bind(&organizer.contact_phone)
        .bind(&organizer.document_number)
        .bind(organizer.status.as_str())
        .bind(&organizer.updated_by)
        .bind(organizer.version)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(RepoError::StaleVersion {
            id: organizer.id,
            expected: organizer.version,
        })
    }
}

#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn find_by_id_and_status(
        &self,
        id: Uuid,
        status: EventStatus,
    ) -> Result<Option<Event>, RepoError> {
        let event =
            sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 AND status = $2")
                .bind(id)
                .bind(status.as_str())
                .fetch_optional(&self.pool)
                .await?;
        Ok(event)
    }

    async fn find_all_by_status(
        &self,
        status: EventStatus,
        page: &PageRequest,
    ) -> Result<Page<Event>, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT * FROM events WHERE status = $1 {} LIMIT $2 OFFSET $3",
            order_by(page)
        );
        let rows = sqlx::query_as::<_, Event>(&sql)
            .bind(status.as_str())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(rows, page, total(count)))
    }

    async fn insert(&self, event: NewEvent) -> Result<Event, RepoError> {
        sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events
                (name, description, location, start_datetime, end_datetime, status, organizer_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.start_datetime)
        .bind(event.end_datetime)
        .bind(event.status.as_str())
        .bind(&event.organizer_id)
        .bind(&event.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn update(&self, event: &Event) -> Result<Event, RepoError> {
        sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET name = $2,
                description = $3,
                location = $4,
                start_datetime = $5,
                end_datetime = $6,
                status = $7,
                updated_by = $8,
                updated_at = now(),
                version = version + 1
            WHERE id = $1 AND version = $9
            RETURNING *
            "#,
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.start_datetime)
        .bind(event.end_datetime)
        .bind(event.status.as_str())
        .bind(&event.updated_by)
        .bind(event.version)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(RepoError::StaleVersion {
            id: event.id,
            expected: event.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::page::{Direction, SortOrder};

    #[test]
    fn test_order_by_defaults_to_creation_order() {
        let page = PageRequest {
            page: 0,
            size: 20,
            sort: None,
        };
        assert_eq!(order_by(&page), "ORDER BY created_at, id");
    }

    #[test]
    fn test_order_by_uses_whitelisted_column() {
        let page = PageRequest {
            page: 1,
            size: 20,
            sort: Some(SortOrder {
                column: "organization_name",
                direction: Direction::Desc,
            }),
        };
        assert_eq!(order_by(&page), "ORDER BY organization_name DESC, id");
    }

    fn new_organizer(user_id: &str, name: &str) -> NewOrganizer {
        NewOrganizer {
            user_id: user_id.into(),
            organization_name: name.into(),
            contact_email: format!("{user_id}@example.com"),
            contact_phone: "555".into(),
            document_number: "123".into(),
            status: OrganizerStatus::Active,
            created_by: user_id.into(),
        }
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_live_user_id_is_unique_until_deleted(pool: PgPool) {
        let repo = PgOrganizerRepository::new(pool);
        let first = repo.insert(new_organizer("u1", "Acme")).await.unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(first.status, OrganizerStatus::Active);

        let err = repo.insert(new_organizer("u1", "Acme 2")).await.unwrap_err();
        assert!(matches!(err, RepoError::UniqueViolation));

        let mut deleted = first.clone();
        deleted.status = OrganizerStatus::Deleted;
        repo.update(&deleted).await.unwrap();

        assert!(!repo.exists_by_user_id("u1").await.unwrap());
        assert!(repo.insert(new_organizer("u1", "Acme again")).await.is_ok());
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_versioned_update_returns_row_and_rejects_stale(pool: PgPool) {
        let repo = PgOrganizerRepository::new(pool);
        let stored = repo.insert(new_organizer("u1", "Acme")).await.unwrap();

        let mut edited = stored.clone();
        edited.contact_phone = "999".into();
        edited.updated_by = Some("u1".into());
        let saved = repo.update(&edited).await.unwrap();
        assert_eq!(saved.version, 2);
        assert_eq!(saved.contact_phone, "999");
        assert_eq!(saved.created_at, stored.created_at);

        let err = repo.update(&stored).await.unwrap_err();
        assert!(matches!(err, RepoError::StaleVersion { expected: 1, .. }));
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_events_page_and_filter_by_status(pool: PgPool) {
        let repo = PgEventRepository::new(pool);
        let start = chrono::Utc::now() + chrono::Duration::days(1);
        for (name, status) in [
            ("Bravo", EventStatus::Active),
            ("Alpha", EventStatus::Active),
            ("Draft", EventStatus::Draft),
        ] {
            repo.insert(NewEvent {
                name: name.into(),
                description: None,
                location: "Hall".into(),
                start_datetime: start,
                end_datetime: start + chrono::Duration::hours(1),
                status,
                organizer_id: "u1".into(),
                created_by: "u1".into(),
            })
            .await
            .unwrap();
        }

        let page = PageRequest {
            page: 0,
            size: 1,
            sort: Some(SortOrder {
                column: "name",
                direction: Direction::Asc,
            }),
        };
        let result = repo
            .find_all_by_status(EventStatus::Active, &page)
            .await
            .unwrap();
        assert_eq!(result.total_elements, 2);
        assert_eq!(result.total_pages, 2);
        assert_eq!(result.content[0].name, "Alpha");
    }
}
