pub mod error;
pub mod events;
pub mod permission;
pub mod ticket;
pub mod ticket_service;

pub use error::ServiceError;
pub use events::{EventSink, LogEventSink, TicketEvent};
pub use permission::{Actor, PermissionPolicy};
pub use ticket_service::TicketService;
