use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::repository::{
    InMemoryEventRepository, InMemoryOrganizerRepository, PgEventRepository,
    PgOrganizerRepository,
};
use crate::services::{EventService, OrganizerService};

#[derive(Clone)]
pub struct AppState {
    pub organizers: OrganizerService,
    pub events: EventService,
}

impl AppState {
    pub fn new(organizers: OrganizerService, events: EventService) -> Self {
        Self { organizers, events }
    }

    pub fn postgres(pool: PgPool, config: &Config) -> Self {
        Self::new(
            OrganizerService::new(
                Arc::new(PgOrganizerRepository::new(pool.clone())),
                config.paging,
            ),
            EventService::new(
                Arc::new(PgEventRepository::new(pool)),
                config.paging,
                config.event_initial_status,
            ),
        )
    }

    pub fn in_memory(config: &Config) -> Self {
        Self::new(
            OrganizerService::new(Arc::new(InMemoryOrganizerRepository::new()), config.paging),
            EventService::new(
                Arc::new(InMemoryEventRepository::new()),
                config.paging,
                config.event_initial_status,
            ),
        )
    }
}
