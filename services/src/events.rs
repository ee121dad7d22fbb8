use thiserror::Error;

/// Workflow notification emitted after a successful mutation. Delivery
/// is fire-and-forget; a sink failure never rolls back the mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketEvent {
    Created { ticket_id: i64 },
    Updated { ticket_id: i64 },
    Deleted { ticket_id: i64 },
}

impl TicketEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TicketEvent::Created { .. } => "ticket.create",
            TicketEvent::Updated { .. } => "ticket.update",
            TicketEvent::Deleted { .. } => "ticket.delete",
        }
    }

    pub fn ticket_id(&self) -> i64 {
        match self {
            TicketEvent::Created { ticket_id }
            | TicketEvent::Updated { ticket_id }
            | TicketEvent::Deleted { ticket_id } => *ticket_id,
        }
    }
}

#[derive(Debug, Error)]
#[error("event sink failure: {0}")]
pub struct EventError(pub String);

/// Collaborator interface for notification delivery. Implemented by the
/// surrounding infrastructure (mailer, message bus, ...).
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &TicketEvent) -> Result<(), EventError>;
}

/// Default sink: writes events to the log and nothing else.
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn publish(&self, event: &TicketEvent) -> Result<(), EventError> {
        log::info!("{} ticket_id={}", event.name(), event.ticket_id());
        Ok(())
    }
}
