pub mod event;
pub mod organizer;

pub use event::EventService;
pub use organizer::OrganizerService;
