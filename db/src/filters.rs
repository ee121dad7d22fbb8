use crate::models::tickets::{TicketPriority, TicketStatus};

/// Query-side filter for ticket listings. `None` means "don't filter on
/// this column".
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub user_id: Option<i64>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
}

impl TicketFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: TicketPriority) -> Self {
        self.priority = Some(priority);
        self
    }
}
