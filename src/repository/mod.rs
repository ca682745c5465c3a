//! Persistence gateway for organizers and events.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::event::{Event, EventStatus, NewEvent};
use crate::models::organizer::{NewOrganizer, Organizer, OrganizerStatus};
use crate::models::page::{Page, PageRequest};

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryEventRepository, InMemoryOrganizerRepository};
pub use postgres::{PgEventRepository, PgOrganizerRepository};

#[derive(Debug, Error)]
pub enum RepoError {
    /// A live record with the same unique key already exists.
    #[error("unique constraint violated")]
    UniqueViolation,

    /// The record changed since it was read.
    #[error("record {id} is no longer at version {expected}")]
    StaleVersion { id: Uuid, expected: i32 },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait OrganizerRepository: Send + Sync {
    async fn find_by_id_and_status(
        &self,
        id: Uuid,
        status: OrganizerStatus,
    ) -> Result<Option<Organizer>, RepoError>;

    async fn find_all_by_status(
        &self,
        status: OrganizerStatus,
        page: &PageRequest,
    ) -> Result<Page<Organizer>, RepoError>;

    /// Only non-deleted organizers count.
    async fn exists_by_user_id(&self, user_id: &str) -> Result<bool, RepoError>;

    /// Fails with [`RepoError::UniqueViolation`] if the user already owns a live organizer.
    async fn insert(&self, organizer: NewOrganizer) -> Result<Organizer, RepoError>;

    /// Writes the mutable fields if `organizer.version` is still current and
    /// returns the stored row with its bumped version.
    async fn update(&self, organizer: &Organizer) -> Result<Organizer, RepoError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn find_by_id_and_status(
        &self,
        id: Uuid,
        status: EventStatus,
    ) -> Result<Option<Event>, RepoError>;

    async fn find_all_by_status(
        &self,
        status: EventStatus,
        page: &PageRequest,
    ) -> Result<Page<Event>, RepoError>;

    async fn insert(&self, event: NewEvent) -> Result<Event, RepoError>;

    async fn update(&self, event: &Event) -> Result<Event, RepoError>;
}
