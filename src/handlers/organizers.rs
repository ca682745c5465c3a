use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::identity::Caller;
use crate::models::organizer::{OrganizerCreateRequest, OrganizerUpdateRequest, OrganizerView};
use crate::models::page::PageParams;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::{AppJson, AppPath, AppQuery};
use crate::utils::response::{created, no_content, success};

/// POST /organizers
pub async fn create_organizer(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(request): AppJson<OrganizerCreateRequest>,
) -> Result<Response, AppError> {
    let organizer = state.organizers.create(&caller, request).await?;
    Ok(created(OrganizerView::from(organizer), "Organizer created"))
}

/// PUT /organizers/{id}
pub async fn update_organizer(
    State(state): State<AppState>,
    caller: Caller,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<OrganizerUpdateRequest>,
) -> Result<Response, AppError> {
    let organizer = state.organizers.update(id, request, &caller).await?;
    Ok(success(OrganizerView::from(organizer), "Organizer updated"))
}

/// GET /organizers/{id}
pub async fn get_organizer(
    State(state): State<AppState>,
    _caller: Caller,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let organizer = state.organizers.get_by_id(id).await?;
    Ok(success(organizer, "Organizer found"))
}

/// GET /organizers?page=&size=&sort=
pub async fn list_organizers(
    State(state): State<AppState>,
    _caller: Caller,
    AppQuery(params): AppQuery<PageParams>,
) -> Result<Response, AppError> {
    let page = state.organizers.list(&params).await?;
    Ok(success(page, "Organizers listed"))
}

/// DELETE /organizers/{id}
pub async fn delete_organizer(
    State(state): State<AppState>,
    caller: Caller,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    state.organizers.delete(id, &caller).await?;
    Ok(no_content())
}
