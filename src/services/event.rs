use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::config::PagingConfig;
use crate::identity::{Caller, MANAGING_ROLES};
use crate::models::event::{
    Event, EventCreateRequest, EventStatus, EventUpdateRequest, EventView, NewEvent,
    EVENT_SORTABLE,
};
use crate::models::page::{Page, PageParams};
use crate::repository::EventRepository;
use crate::utils::error::AppError;

pub const EVENT_NOT_FOUND: &str = "Event not found";

#[derive(Clone)]
pub struct EventService {
    repo: Arc<dyn EventRepository>,
    paging: PagingConfig,
    initial_status: EventStatus,
}

impl EventService {
    pub fn new(
        repo: Arc<dyn EventRepository>,
        paging: PagingConfig,
        initial_status: EventStatus,
    ) -> Self {
        Self {
            repo,
            paging,
            initial_status,
        }
    }

    #[instrument(skip(self, caller, request), fields(organizer_id = %caller.user_id()))]
    pub async fn create(
        &self,
        caller: &Caller,
        request: EventCreateRequest,
    ) -> Result<Event, AppError> {
        caller.require_any_role(MANAGING_ROLES)?;
        if caller.user_id().trim().is_empty() {
            return Err(AppError::invalid_argument("Caller user id must not be blank"));
        }
        request.validate()?;
        validate_schedule(
            request.start_datetime,
            request.end_datetime,
            (true, true),
            Utc::now(),
        )?;

        let event = self
            .repo
            .insert(NewEvent::from_request(request, caller, self.initial_status))
            .await?;

        info!(event_id = %event.id, status = %event.status, "Event created");
        Ok(event)
    }

    #[instrument(skip(self, request, caller), fields(event_id = %id, caller = %caller.user_id()))]
    pub async fn update(
        &self,
        id: Uuid,
        request: EventUpdateRequest,
        caller: &Caller,
    ) -> Result<Event, AppError> {
        caller.require_any_role(MANAGING_ROLES)?;
        let mut event = self.find_active(id).await?;
        caller.authorize_owner(&event.organizer_id)?;
        request.validate()?;

        let schedule_checks = (
            request.start_datetime.is_some(),
            request.end_datetime.is_some(),
        );
        let touches_schedule = request.touches_schedule();
        request.merge_into(&mut event);
        if touches_schedule {
            validate_schedule(
                event.start_datetime,
                event.end_datetime,
                schedule_checks,
                Utc::now(),
            )?;
        }
        event.updated_by = Some(caller.identity().to_string());

        let saved = self.repo.update(&event).await?;
        info!(version = saved.version, "Event updated");
        Ok(saved)
    }

    #[instrument(skip(self), fields(event_id = %id))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<EventView, AppError> {
        debug!("Getting event by id");
        self.find_active(id).await.map(EventView::from)
    }

    #[instrument(skip(self, params))]
    pub async fn list(&self, params: &PageParams) -> Result<Page<EventView>, AppError> {
        let request = params.resolve(&self.paging, EVENT_SORTABLE)?;
        let page = self
            .repo
            .find_all_by_status(EventStatus::Active, &request)
            .await?;
        debug!("Listed {} events", page.content.len());
        Ok(page.map(EventView::from))
    }

    /// Soft delete; not idempotent.
    #[instrument(skip(self, caller), fields(event_id = %id, caller = %caller.user_id()))]
    pub async fn delete(&self, id: Uuid, caller: &Caller) -> Result<(), AppError> {
        caller.require_any_role(MANAGING_ROLES)?;
        let mut event = self.find_active(id).await?;
        caller.authorize_owner(&event.organizer_id)?;

        if !event.status.can_transition_to(EventStatus::Deleted) {
            return Err(AppError::NotFound(EVENT_NOT_FOUND.to_string()));
        }
        event.status = EventStatus::Deleted;
        event.updated_by = Some(caller.identity().to_string());

        self.repo.update(&event).await?;
        info!("Event deleted");
        Ok(())
    }

    async fn find_active(&self, id: Uuid) -> Result<Event, AppError> {
        self.repo
            .find_by_id_and_status(id, EventStatus::Active)
            .await?
            .ok_or_else(|| AppError::NotFound(EVENT_NOT_FOUND.to_string()))
    }
}

/// `future` selects which of (start, end) must lie after `now`.
fn validate_schedule(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    future: (bool, bool),
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let mut fields = BTreeMap::new();
    if future.0 && start <= now {
        fields.insert("startDatetime".to_string(), "must be in the future".to_string());
    }
    if future.1 && end <= now {
        fields.insert("endDatetime".to_string(), "must be in the future".to_string());
    }
    if end < start {
        fields
            .entry("endDatetime".to_string())
            .or_insert_with(|| "must not be before startDatetime".to_string());
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(AppError::invalid_fields(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryEventRepository;
    use chrono::Duration;

    fn service_with(initial_status: EventStatus) -> EventService {
        EventService::new(
            Arc::new(InMemoryEventRepository::new()),
            PagingConfig::default(),
            initial_status,
        )
    }

    fn service() -> EventService {
        service_with(EventStatus::Active)
    }

    fn launch() -> EventCreateRequest {
        let now = Utc::now();
        EventCreateRequest {
            name: "Launch party".into(),
            description: Some("Drinks on the roof".into()),
            location: "Rooftop".into(),
            start_datetime: now + Duration::days(7),
            end_datetime: now + Duration::days(7) + Duration::hours(4),
        }
    }

    fn user(id: &str) -> Caller {
        Caller::new(id, ["ORGANIZER"])
    }

    #[tokio::test]
    async fn test_create_sets_owner_and_initial_status() {
        let event = service().create(&user("u1"), launch()).await.unwrap();
        assert_eq!(event.organizer_id, "u1");
        assert_eq!(event.status, EventStatus::Active);
        assert_eq!(event.created_by.as_deref(), Some("u1"));

        let draft = service_with(EventStatus::Draft)
            .create(&user("u1"), launch())
            .await
            .unwrap();
        assert_eq!(draft.status, EventStatus::Draft);
    }

    #[tokio::test]
    async fn test_draft_events_are_not_visible() {
        let service = service_with(EventStatus::Draft);
        let draft = service.create(&user("u1"), launch()).await.unwrap();

        assert!(matches!(
            service.get_by_id(draft.id).await,
            Err(AppError::NotFound(_))
        ));
        let page = service.list(&PageParams::default()).await.unwrap();
        assert!(page.content.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_past_schedule() {
        let mut request = launch();
        request.start_datetime = Utc::now() - Duration::hours(1);
        match service().create(&user("u1"), request).await.unwrap_err() {
            AppError::InvalidArgument { fields: Some(fields), .. } => {
                assert!(fields.contains_key("startDatetime"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_end_before_start() {
        let mut request = launch();
        request.end_datetime = request.start_datetime - Duration::hours(1);
        let err = service().create(&user("u1"), request).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_update_merges_present_fields_only() {
        let service = service();
        let event = service.create(&user("u1"), launch()).await.unwrap();

        let request = EventUpdateRequest {
            location: Some("Basement".into()),
            ..Default::default()
        };
        let updated = service.update(event.id, request, &user("u1")).await.unwrap();

        assert_eq!(updated.location, "Basement");
        assert_eq!(updated.name, event.name);
        assert_eq!(updated.description, event.description);
        assert_eq!(updated.organizer_id, "u1");
        assert_eq!(updated.updated_by.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_update_rejects_schedule_inversion() {
        let service = service();
        let event = service.create(&user("u1"), launch()).await.unwrap();

        let request = EventUpdateRequest {
            end_datetime: Some(event.start_datetime - Duration::minutes(5)),
            ..Default::default()
        };
        let err = service.update(event.id, request, &user("u1")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_only_owner_or_admin_mutates() {
        let service = service();
        let event = service.create(&user("u1"), launch()).await.unwrap();

        let err = service
            .update(event.id, EventUpdateRequest::default(), &user("u2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = service.delete(event.id, &user("u2")).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let admin = Caller::new("admin-1", ["ROLE_ADMIN"]);
        service.delete(event.id, &admin).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let service = service();
        let event = service.create(&user("u1"), launch()).await.unwrap();

        service.delete(event.id, &user("u1")).await.unwrap();
        let err = service.delete(event.id, &user("u1")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(matches!(
            service.get_by_id(event.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_pages_active_events() {
        let service = service();
        for _ in 0..3 {
            service.create(&user("u1"), launch()).await.unwrap();
        }
        let params = PageParams {
            page: Some(1),
            size: Some(2),
            sort: Some("name,asc".into()),
        };
        let page = service.list(&params).await.unwrap();
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_validate_schedule_only_checks_requested_bounds() {
        let now = Utc::now();
        let past = now - Duration::days(1);
        let future = now + Duration::days(1);
        assert!(validate_schedule(past, future, (false, true), now).is_ok());
        assert!(validate_schedule(past, future, (true, true), now).is_err());
    }

    #[tokio::test]
    async fn test_update_missing_or_deleted_is_not_found() {
        let service = service();
        let err = service
            .update(Uuid::new_v4(), EventUpdateRequest::default(), &user("u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let event = service.create(&user("u1"), launch()).await.unwrap();
        service.delete(event.id, &user("u1")).await.unwrap();
        let request = EventUpdateRequest {
            name: Some("Revived".into()),
            ..Default::default()
        };
        let err = service.update(event.id, request, &user("u1")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_plain_user_cannot_create_events() {
        let service = service();
        let err = service
            .create(&Caller::new("u1", ["USER"]), launch())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let page = service.list(&PageParams::default()).await.unwrap();
        assert_eq!(page.total_elements, 0);
    }
}
