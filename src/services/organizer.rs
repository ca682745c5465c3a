use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::PagingConfig;
use crate::identity::{Caller, MANAGING_ROLES};
use crate::models::organizer::{
    NewOrganizer, Organizer, OrganizerCreateRequest, OrganizerStatus, OrganizerUpdateRequest,
    OrganizerView, ORGANIZER_SORTABLE,
};
use crate::models::page::{Page, PageParams};
use crate::repository::{OrganizerRepository, RepoError};
use crate::utils::error::AppError;

pub const ORGANIZER_NOT_FOUND: &str = "Organizer not found";
pub const ORGANIZER_ALREADY_EXISTS: &str = "An organizer is already registered for this user";

/// Lifecycle rules for organizer profiles: one live profile per user,
/// owner-or-admin mutation, soft deletion.
#[derive(Clone)]
pub struct OrganizerService {
    repo: Arc<dyn OrganizerRepository>,
    paging: PagingConfig,
}

impl OrganizerService {
    pub fn new(repo: Arc<dyn OrganizerRepository>, paging: PagingConfig) -> Self {
        Self { repo, paging }
    }

    #[instrument(skip(self, caller, request), fields(user_id = %caller.user_id()))]
    pub async fn create(
        &self,
        caller: &Caller,
        request: OrganizerCreateRequest,
    ) -> Result<Organizer, AppError> {
        caller.require_any_role(MANAGING_ROLES)?;
        if caller.user_id().trim().is_empty() {
            return Err(AppError::invalid_argument("Caller user id must not be blank"));
        }
        request.validate()?;

        if self.repo.exists_by_user_id(caller.user_id()).await? {
            warn!("Organizer already registered for caller");
            return Err(AppError::Conflict(ORGANIZER_ALREADY_EXISTS.to_string()));
        }

        // The pre-check above can race with a concurrent create; the storage
        // unique index is what actually decides.
        let organizer = self
            .repo
            .insert(NewOrganizer::from_request(request, caller))
            .await
            .map_err(|e| match e {
                RepoError::UniqueViolation => {
                    AppError::Conflict(ORGANIZER_ALREADY_EXISTS.to_string())
                }
                other => other.into(),
            })?;

        info!(organizer_id = %organizer.id, "Organizer created");
        Ok(organizer)
    }

    #[instrument(skip(self, request, caller), fields(organizer_id = %id, caller = %caller.user_id()))]
    pub async fn update(
        &self,
        id: Uuid,
        request: OrganizerUpdateRequest,
        caller: &Caller,
    ) -> Result<Organizer, AppError> {
        caller.require_any_role(MANAGING_ROLES)?;
        let mut organizer = self.find_active(id).await?;
        caller.authorize_owner(&organizer.user_id)?;
        request.validate()?;

        request.merge_into(&mut organizer);
        organizer.updated_by = Some(caller.identity().to_string());

        let saved = self.repo.update(&organizer).await?;
        info!(version = saved.version, "Organizer updated");
        Ok(saved)
    }

    #[instrument(skip(self), fields(organizer_id = %id))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<OrganizerView, AppError> {
        debug!("Getting organizer by id");
        self.find_active(id).await.map(OrganizerView::from)
    }

    #[instrument(skip(self, params))]
    pub async fn list(&self, params: &PageParams) -> Result<Page<OrganizerView>, AppError> {
        let request = params.resolve(&self.paging, ORGANIZER_SORTABLE)?;
        let page = self
            .repo
            .find_all_by_status(OrganizerStatus::Active, &request)
            .await?;
        debug!("Listed {} organizers", page.content.len());
        Ok(page.map(OrganizerView::from))
    }

    /// Soft delete. A second call on the same id fails with `NotFound`.
    #[instrument(skip(self, caller), fields(organizer_id = %id, caller = %caller.user_id()))]
    pub async fn delete(&self, id: Uuid, caller: &Caller) -> Result<(), AppError> {
        caller.require_any_role(MANAGING_ROLES)?;
        let mut organizer = self.find_active(id).await?;
        caller.authorize_owner(&organizer.user_id)?;

        if !organizer.status.can_transition_to(OrganizerStatus::Deleted) {
            return Err(AppError::NotFound(ORGANIZER_NOT_FOUND.to_string()));
        }
        organizer.status = OrganizerStatus::Deleted;
        organizer.updated_by = Some(caller.identity().to_string());

        self.repo.update(&organizer).await?;
        info!("Organizer deleted");
        Ok(())
    }

    async fn find_active(&self, id: Uuid) -> Result<Organizer, AppError> {
        self.repo
            .find_by_id_and_status(id, OrganizerStatus::Active)
            .await?
            .ok_or_else(|| AppError::NotFound(ORGANIZER_NOT_FOUND.to_string()))
    }
}
