use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::identity::Caller;
use crate::models::event::{EventCreateRequest, EventUpdateRequest, EventView};
use crate::models::page::PageParams;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::{AppJson, AppPath, AppQuery};
use crate::utils::response::{created, no_content, success};

pub async fn create_event(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(request): AppJson<EventCreateRequest>,
) -> Result<Response, AppError> {
    let event = state.events.create(&caller, request).await?;
    Ok(created(EventView::from(event), "Event created"))
}

pub async fn update_event(
    State(state): State<AppState>,
    caller: Caller,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<EventUpdateRequest>,
) -> Result<Response, AppError> {
    let event = state.events.update(id, request, &caller).await?;
    Ok(success(EventView::from(event), "Event updated"))
}

pub async fn get_event(
    State(state): State<AppState>,
    _caller: Caller,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let event = state.events.get_by_id(id).await?;
    Ok(success(event, "Event found"))
}

pub async fn list_events(
    State(state): State<AppState>,
    _caller: Caller,
    AppQuery(params): AppQuery<PageParams>,
) -> Result<Response, AppError> {
    let page = state.events.list(&params).await?;
    Ok(success(page, "Events listed"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    caller: Caller,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    state.events.delete(id, &caller).await?;
    Ok(no_content())
}
