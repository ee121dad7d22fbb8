pub mod m202601120001_create_users;
pub mod m202601120002_create_tickets;
pub mod m202601120003_create_ticket_messages;
