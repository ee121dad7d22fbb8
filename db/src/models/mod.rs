pub mod ticket_messages;
pub mod tickets;
pub mod user;
