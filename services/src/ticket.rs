use serde::Deserialize;
use validator::Validate;

use db::models::tickets::{TicketPriority, TicketStatus};

pub use db::models::ticket_messages::Model as TicketMessage;
pub use db::models::tickets::Model as Ticket;

/// Page size applied when a listing request does not name one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Input for opening a ticket. The opening message always starts the
/// ticket in `Open` status.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTicket {
    #[validate(length(min = 1, max = 255, message = "Subject cannot be empty"))]
    pub subject: String,

    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub content: String,

    pub priority: TicketPriority,
}

/// Input for appending a message to an existing ticket. The message's
/// own status drives the ticket's status; priority falls back to the
/// ticket's current priority when not overridden.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReplyTicket {
    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub content: String,

    pub status: TicketStatus,

    pub priority: Option<TicketPriority>,
}

/// User-supplied listing parameters, still in token form. `state`
/// defaults to "open"; the literal "all" clears the status filter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TicketListParams {
    pub state: Option<String>,
    pub priority: Option<String>,
    pub page: u64,
    pub per_page: u64,
}

impl Default for TicketListParams {
    fn default() -> Self {
        Self {
            state: None,
            priority: None,
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_default_to_first_page() {
        let params = TicketListParams::default();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, DEFAULT_PAGE_SIZE);
        assert!(params.state.is_none());
        assert!(params.priority.is_none());
    }
}
