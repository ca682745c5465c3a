//! Conversions between wire payloads and stored records.
//!
//! Update payloads are merged field by field: a field left out of the request
//! keeps its stored value. Identity, ownership, status and creation audit
//! fields are never written from a payload.

use crate::identity::Caller;
use crate::models::event::{Event, EventCreateRequest, EventStatus, EventUpdateRequest, EventView, NewEvent};
use crate::models::organizer::{
    NewOrganizer, Organizer, OrganizerCreateRequest, OrganizerStatus, OrganizerUpdateRequest,
    OrganizerView,
};

impl NewOrganizer {
    pub fn from_request(request: OrganizerCreateRequest, caller: &Caller) -> Self {
        Self {
            user_id: caller.user_id().to_string(),
            organization_name: request.organization_name,
            contact_email: request.contact_email,
            contact_phone: request.contact_phone,
            document_number: request.document_number,
            status: OrganizerStatus::Active,
            created_by: caller.identity().to_string(),
        }
    }
}

impl OrganizerUpdateRequest {
    pub fn merge_into(self, target: &mut Organizer) {
        if let Some(organization_name) = self.organization_name {
            target.organization_name = organization_name;
        }
        if let Some(contact_email) = self.contact_email {
            target.contact_email = contact_email;
        }
        if let Some(contact_phone) = self.contact_phone {
            target.contact_phone = contact_phone;
        }
        if let Some(document_number) = self.document_number {
            target.document_number = document_number;
        }
    }
}

impl From<Organizer> for OrganizerView {
    fn from(organizer: Organizer) -> Self {
        Self {
            id: organizer.id,
            user_id: organizer.user_id,
            organization_name: organizer.organization_name,
            contact_email: organizer.contact_email,
            contact_phone: organizer.contact_phone,
            document_number: organizer.document_number,
            status: organizer.status,
            created_by: organizer.created_by,
            updated_by: organizer.updated_by,
            created_at: organizer.created_at,
            updated_at: organizer.updated_at,
        }
    }
}

impl NewEvent {
    pub fn from_request(request: EventCreateRequest, caller: &Caller, status: EventStatus) -> Self {
        Self {
            name: request.name,
            description: request.description,
            location: request.location,
            start_datetime: request.start_datetime,
            end_datetime: request.end_datetime,
            status,
            organizer_id: caller.user_id().to_string(),
            created_by: caller.identity().to_string(),
        }
    }
}

impl EventUpdateRequest {
    pub fn merge_into(self, target: &mut Event) {
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(description) = self.description {
            target.description = Some(description);
        }
        if let Some(location) = self.location {
            target.location = location;
        }
        if let Some(start_datetime) = self.start_datetime {
            target.start_datetime = start_datetime;
        }
        if let Some(end_datetime) = self.end_datetime {
            target.end_datetime = end_datetime;
        }
    }
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            name: event.name,
            description: event.description,
            location: event.location,
            start_datetime: event.start_datetime,
            end_datetime: event.end_datetime,
            status: event.status,
            organizer_id: event.organizer_id,
            created_by: event.created_by,
            updated_by: event.updated_by,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn stored_organizer() -> Organizer {
        let now = Utc::now();
        Organizer {
            id: Uuid::new_v4(),
            user_id: "u1".into(),
            organization_name: "Acme".into(),
            contact_email: "a@x.com".into(),
            contact_phone: "555".into(),
            document_number: "123".into(),
            status: OrganizerStatus::Active,
            created_by: Some("u1".into()),
            updated_by: None,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    #[test]
    fn test_new_organizer_takes_owner_from_caller() {
        let caller = Caller::new("u1", Vec::<String>::new()).with_username("alice");
        let request = OrganizerCreateRequest {
            organization_name: "Acme".into(),
            contact_email: "a@x.com".into(),
            contact_phone: "555".into(),
            document_number: "123".into(),
        };

        let organizer = NewOrganizer::from_request(request, &caller);
        assert_eq!(organizer.user_id, "u1");
        assert_eq!(organizer.created_by, "alice");
        assert_eq!(organizer.status, OrganizerStatus::Active);
    }

    #[test]
    fn test_organizer_merge_ignores_absent_fields() {
        let mut organizer = stored_organizer();
        let before = organizer.clone();

        OrganizerUpdateRequest {
            contact_phone: Some("999".into()),
            ..Default::default()
        }
        .merge_into(&mut organizer);

        assert_eq!(organizer.contact_phone, "999");
        assert_eq!(organizer.organization_name, before.organization_name);
        assert_eq!(organizer.contact_email, before.contact_email);
        assert_eq!(organizer.user_id, before.user_id);
        assert_eq!(organizer.status, before.status);
        assert_eq!(organizer.created_by, before.created_by);
    }

    #[test]
    fn test_event_merge_keeps_description_when_absent() {
        let now = Utc::now();
        let mut event = Event {
            id: Uuid::new_v4(),
            name: "Launch".into(),
            description: Some("Original".into()),
            location: "Hall A".into(),
            start_datetime: now + Duration::days(1),
            end_datetime: now + Duration::days(2),
            status: EventStatus::Active,
            organizer_id: "u1".into(),
            created_by: Some("u1".into()),
            updated_by: None,
            created_at: now,
            updated_at: now,
            version: 1,
        };

        EventUpdateRequest {
            location: Some("Hall B".into()),
            ..Default::default()
        }
        .merge_into(&mut event);

        assert_eq!(event.location, "Hall B");
        assert_eq!(event.description.as_deref(), Some("Original"));
        assert_eq!(event.organizer_id, "u1");
    }
}
