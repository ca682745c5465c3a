//! In-process store with the same uniqueness and versioning rules as the
//! PostgreSQL schema. Used when no `DATABASE_URL` is configured and in tests.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::event::{Event, EventStatus, NewEvent};
use crate::models::organizer::{NewOrganizer, Organizer, OrganizerStatus};
use crate::models::page::{Direction, Page, PageRequest};
use crate::repository::{EventRepository, OrganizerRepository, RepoError};

trait Sortable {
    fn id(&self) -> Uuid;
    fn compare_column(&self, other: &Self, column: &str) -> Ordering;
}

impl Sortable for Organizer {
    fn id(&self) -> Uuid {
        self.id
    }

    fn compare_column(&self, other: &Self, column: &str) -> Ordering {
        match column {
            "organization_name" => self.organization_name.cmp(&other.organization_name),
            "contact_email" => self.contact_email.cmp(&other.contact_email),
            "updated_at" => self.updated_at.cmp(&other.updated_at),
            _ => self.created_at.cmp(&other.created_at),
        }
    }
}

impl Sortable for Event {
    fn id(&self) -> Uuid {
        self.id
    }

    fn compare_column(&self, other: &Self, column: &str) -> Ordering {
        match column {
            "name" => self.name.cmp(&other.name),
            "location" => self.location.cmp(&other.location),
            "start_datetime" => self.start_datetime.cmp(&other.start_datetime),
            "end_datetime" => self.end_datetime.cmp(&other.end_datetime),
            "updated_at" => self.updated_at.cmp(&other.updated_at),
            _ => self.created_at.cmp(&other.created_at),
        }
    }
}

fn paginate<T: Sortable>(mut rows: Vec<T>, page: &PageRequest) -> Page<T> {
    let (column, direction) = page
        .sort
        .map(|s| (s.column, s.direction))
        .unwrap_or(("created_at", Direction::Asc));

    rows.sort_by(|a, b| {
        let ord = a.compare_column(b, column);
        let ord = match direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        };
        ord.then_with(|| a.id().cmp(&b.id()))
    });

    let total = rows.len() as u64;
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let content = rows
        .into_iter()
        .skip(offset)
        .take(page.size as usize)
        .collect();
    Page::new(content, page, total)
}

#[derive(Default)]
pub struct InMemoryOrganizerRepository {
    rows: Mutex<HashMap<Uuid, Organizer>>,
}

impl InMemoryOrganizerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrganizerRepository for InMemoryOrganizerRepository {
    async fn find_by_id_and_status(
        &self,
        id: Uuid,
        status: OrganizerStatus,
    ) -> Result<Option<Organizer>, RepoError> {
        let rows = self.rows.lock().await;
        Ok(rows.get(&id).filter(|o| o.status == status).cloned())
    }

    async fn find_all_by_status(
        &self,
        status: OrganizerStatus,
        page: &PageRequest,
    ) -> Result<Page<Organizer>, RepoError> {
        let rows = self.rows.lock().await;
        let matching = rows.values().filter(|o| o.status == status).cloned().collect();
        Ok(paginate(matching, page))
    }

    async fn exists_by_user_id(&self, user_id: &str) -> Result<bool, RepoError> {
        let rows = self.rows.lock().await;
        Ok(rows
            .values()
            .any(|o| o.user_id == user_id && o.status != OrganizerStatus::Deleted))
    }

    async fn insert(&self, organizer: NewOrganizer) -> Result<Organizer, RepoError> {
        let mut rows = self.rows.lock().await;
        let taken = rows.values().any(|o| {
            o.user_id == organizer.user_id && o.status != OrganizerStatus::Deleted
        });
        if taken {
            return Err(RepoError::UniqueViolation);
        }

        let now = Utc::now();
        let stored = Organizer {
            id: Uuid::new_v4(),
            user_id: organizer.user_id,
            organization_name: organizer.organization_name,
            contact_email: organizer.contact_email,
            contact_phone: organizer.contact_phone,
            document_number: organizer.document_number,
            status: organizer.status,
            created_by: Some(organizer.created_by),
            updated_by: None,
            created_at: now,
            updated_at: now,
            version: 1,
        };
        rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, organizer: &Organizer) -> Result<Organizer, RepoError> {
        let mut rows = self.rows.lock().await;
        let stale = RepoError::StaleVersion {
            id: organizer.id,
            expected: organizer.version,
        };
        let current = match rows.get_mut(&organizer.id) {
            Some(current) if current.version == organizer.version => current,
            _ => return Err(stale),
        };

        current.organization_name = organizer.organization_name.clone();
        current.contact_email = organizer.contact_email.clone();
        current.contact_phone = organizer.contact_phone.clone();
        current.document_number = organizer.document_number.clone();
        current.status = organizer.status;
        current.updated_by = organizer.updated_by.clone();
        current.updated_at = Utc::now();
        current.version += 1;
        Ok(current.clone())
    }
}

#[derive(Default)]
pub struct InMemoryEventRepository {
    rows: Mutex<HashMap<Uuid, Event>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn find_by_id_and_status(
        &self,
        id: Uuid,
        status: EventStatus,
    ) -> Result<Option<Event>, RepoError> {
        let rows = self.rows.lock().await;
        Ok(rows.get(&id).filter(|e| e.status == status).cloned())
    }

    async fn find_all_by_status(
        &self,
        status: EventStatus,
        page: &PageRequest,
    ) -> Result<Page<Event>, RepoError> {
        let rows = self.rows.lock().await;
        let matching = rows.values().filter(|e| e.status == status).cloned().collect();
        Ok(paginate(matching, page))
    }

    async fn insert(&self, event: NewEvent) -> Result<Event, RepoError> {
        let now = Utc::now();
        let stored = Event {
            id: Uuid::new_v4(),
            name: event.name,
            description: event.description,
            location: event.location,
            start_datetime: event.start_datetime,
            end_datetime: event.end_datetime,
            status: event.status,
            organizer_id: event.organizer_id,
            created_by: Some(event.created_by),
            updated_by: None,
            created_at: now,
            updated_at: now,
            version: 1,
        };
        self.rows.lock().await.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, event: &Event) -> Result<Event, RepoError> {
        let mut rows = self.rows.lock().await;
        let stale = RepoError::StaleVersion {
            id: event.id,
            expected: event.version,
        };
        let current = match rows.get_mut(&event.id) {
            Some(current) if current.version == event.version => current,
            _ => return Err(stale),
        };

        current.name = event.name.clone();
        current.description = event.description.clone();
        current.location = event.location.clone();
        current.start_datetime = event.start_datetime;
        current.end_datetime = event.end_datetime;
        current.status = event.status;
        current.updated_by = event.updated_by.clone();
        current.updated_at = Utc::now();
        current.version += 1;
        Ok(current.clone())
    }
}
