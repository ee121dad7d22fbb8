use std::sync::Arc;

use log::warn;
use sea_orm::{DatabaseConnection, TransactionTrait};
use validator::Validate;

use db::{
    filters::TicketFilter,
    models::{
        ticket_messages,
        tickets::{self, TicketPriority, TicketStatus},
        user,
    },
    repositories::{
        repository::{Page, Repository},
        ticket_repository::TicketRepository,
    },
};

use crate::error::ServiceError;
use crate::events::{EventSink, TicketEvent};
use crate::permission::{Actor, PermissionPolicy};
use crate::ticket::{CreateTicket, ReplyTicket, TicketListParams};

/// Listing falls back to open tickets when no state token is supplied.
pub const DEFAULT_LIST_STATE: &str = "open";

/// Orchestrates the ticket use cases: create, show, reply, delete and
/// list. Collaborators are injected once at construction; there is no
/// runtime service lookup.
pub struct TicketService {
    db: DatabaseConnection,
    events: Arc<dyn EventSink>,
}

impl TicketService {
    pub fn new(db: DatabaseConnection, events: Arc<dyn EventSink>) -> Self {
        Self { db, events }
    }

    /// Opens a ticket together with its opening message. Both rows are
    /// written in one transaction so a ticket can never exist without
    /// its first message.
    pub async fn create_ticket(
        &self,
        author: &user::Model,
        input: CreateTicket,
    ) -> Result<(tickets::Model, ticket_messages::Model), ServiceError> {
        input.validate()?;

        let txn = self.db.begin().await?;
        let ticket = tickets::Model::create(
            &txn,
            author.id,
            &input.subject,
            TicketStatus::Open,
            input.priority,
        )
        .await?;
        let message = ticket_messages::Model::create(
            &txn,
            ticket.id,
            author.id,
            &input.content,
            TicketStatus::Open,
            input.priority,
        )
        .await?;
        txn.commit().await?;

        self.emit(TicketEvent::Created { ticket_id: ticket.id });

        Ok((ticket, message))
    }

    /// Appends a message to the thread and moves the ticket into the
    /// message's status/priority. A closed ticket only accepts a reply
    /// whose status is `Open` (an explicit reopen).
    pub async fn reply_to_ticket(
        &self,
        actor: &Actor,
        ticket_id: i64,
        input: ReplyTicket,
    ) -> Result<ticket_messages::Model, ServiceError> {
        let ticket = self.find_ticket(ticket_id).await?;
        PermissionPolicy::require_reply(actor, &ticket)?;
        input.validate()?;

        if ticket.status.is_closed() && input.status != TicketStatus::Open {
            return Err(ServiceError::InvalidState(format!(
                "ticket {ticket_id} is closed; reply with status 'open' to reopen it"
            )));
        }

        let author_id = actor
            .id()
            .ok_or_else(|| ServiceError::Forbidden("authentication required".to_string()))?;
        let priority = input.priority.unwrap_or(ticket.priority);

        let txn = self.db.begin().await?;
        let message = ticket_messages::Model::create(
            &txn,
            ticket.id,
            author_id,
            &input.content,
            input.status,
            priority,
        )
        .await?;
        ticket
            .sync_state(&txn, message.status, message.priority)
            .await?;
        txn.commit().await?;

        self.emit(TicketEvent::Updated { ticket_id });

        Ok(message)
    }

    /// Removes the ticket and its whole thread. Admin only.
    pub async fn delete_ticket(&self, actor: &Actor, ticket_id: i64) -> Result<(), ServiceError> {
        let ticket = self.find_ticket(ticket_id).await?;
        PermissionPolicy::require_delete(actor, &ticket)?;

        // Messages go with the ticket via the cascade FK.
        TicketRepository::delete(&self.db, ticket.id).await?;

        self.emit(TicketEvent::Deleted { ticket_id });

        Ok(())
    }

    /// The ticket plus its thread in insertion order, for actors allowed
    /// to see it.
    pub async fn get_ticket(
        &self,
        actor: &Actor,
        ticket_id: i64,
    ) -> Result<(tickets::Model, Vec<ticket_messages::Model>), ServiceError> {
        let ticket = self.find_ticket(ticket_id).await?;
        PermissionPolicy::require_view(actor, &ticket)?;

        let thread = ticket_messages::Model::find_all_for_ticket(&self.db, ticket.id).await?;
        Ok((ticket, thread))
    }

    /// Filtered, paginated listing, newest first. Non-admin actors only
    /// ever see their own tickets.
    pub async fn list_tickets(
        &self,
        actor: &Actor,
        params: TicketListParams,
    ) -> Result<Page<tickets::Model>, ServiceError> {
        let mut filter = TicketFilter::new();

        let state = params.state.as_deref().unwrap_or(DEFAULT_LIST_STATE);
        if state != "all" {
            let status = state.parse::<TicketStatus>().map_err(|_| {
                ServiceError::Validation(format!("unknown ticket state '{state}'"))
            })?;
            filter = filter.with_status(status);
        }

        if let Some(token) = params.priority.as_deref() {
            let priority = token.parse::<TicketPriority>().map_err(|_| {
                ServiceError::Validation(format!("unknown ticket priority '{token}'"))
            })?;
            filter = filter.with_priority(priority);
        }

        match actor {
            Actor::Anonymous => {
                return Err(ServiceError::Forbidden("authentication required".to_string()));
            }
            Actor::User { admin: true, .. } => {}
            Actor::User { id, .. } => {
                filter = filter.with_user_id(*id);
            }
        }

        let page = TicketRepository::filter(
            &self.db,
            &filter,
            params.page,
            params.per_page,
            Some("-created_at,-id".to_string()),
        )
        .await?;

        Ok(page)
    }

    async fn find_ticket(&self, ticket_id: i64) -> Result<tickets::Model, ServiceError> {
        TicketRepository::find_by_id(&self.db, ticket_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("ticket {ticket_id} does not exist")))
    }

    fn emit(&self, event: TicketEvent) {
        if let Err(err) = self.events.publish(&event) {
            warn!(
                "failed to publish {} for ticket {}: {}",
                event.name(),
                event.ticket_id(),
                err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventError;
    use db::test_utils::setup_test_db;
    use std::sync::Mutex;

    struct RecordingEventSink {
        events: Mutex<Vec<TicketEvent>>,
    }

    impl RecordingEventSink {
        fn new() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
            }
        }

        fn recorded(&self) -> Vec<TicketEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl EventSink for RecordingEventSink {
        fn publish(&self, event: &TicketEvent) -> Result<(), EventError> {
            self.events.lock().unwrap().push(*event);
            Ok(())
        }
    }

    struct FailingEventSink;

    impl EventSink for FailingEventSink {
        fn publish(&self, _event: &TicketEvent) -> Result<(), EventError> {
            Err(EventError("sink is down".to_string()))
        }
    }

    async fn setup() -> (TicketService, Arc<RecordingEventSink>, DatabaseConnection) {
        let db = setup_test_db().await;
        let sink = Arc::new(RecordingEventSink::new());
        let service = TicketService::new(db.clone(), sink.clone());
        (service, sink, db)
    }

    async fn seed_user(db: &DatabaseConnection, name: &str, admin: bool) -> user::Model {
        user::Model::create(db, name, &format!("{name}@example.com"), admin)
            .await
            .unwrap()
    }

    fn create_input(subject: &str, priority: TicketPriority) -> CreateTicket {
        CreateTicket {
            subject: subject.to_string(),
            content: "it does not work".to_string(),
            priority,
        }
    }

    fn reply_input(status: TicketStatus, priority: Option<TicketPriority>) -> ReplyTicket {
        ReplyTicket {
            content: "following up".to_string(),
            status,
            priority,
        }
    }

    #[tokio::test]
    async fn create_ticket_opens_with_exactly_one_message() {
        let (service, sink, db) = setup().await;
        let author = seed_user(&db, "u1", false).await;

        let (ticket, message) = service
            .create_ticket(&author, create_input("Printer broken", TicketPriority::Low))
            .await
            .unwrap();

        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority, TicketPriority::Low);
        assert_eq!(ticket.user_id, author.id);
        assert_eq!(message.ticket_id, ticket.id);
        assert_eq!(message.user_id, author.id);
        assert_eq!(
            ticket_messages::Model::count_for_ticket(&db, ticket.id)
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            sink.recorded(),
            vec![TicketEvent::Created { ticket_id: ticket.id }]
        );
    }

    #[tokio::test]
    async fn create_ticket_rejects_empty_content() {
        let (service, sink, db) = setup().await;
        let author = seed_user(&db, "u1", false).await;

        let mut input = create_input("Subject", TicketPriority::Medium);
        input.content = String::new();

        let err = service.create_ticket(&author, input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(sink.recorded().is_empty());
    }

    #[tokio::test]
    async fn replies_grow_the_thread_in_order_and_sync_the_ticket() {
        let (service, sink, db) = setup().await;
        let author = seed_user(&db, "u1", false).await;
        let actor = Actor::from(&author);

        let (ticket, _) = service
            .create_ticket(&author, create_input("Flaky wifi", TicketPriority::Medium))
            .await
            .unwrap();

        service
            .reply_to_ticket(&actor, ticket.id, reply_input(TicketStatus::Closed, None))
            .await
            .unwrap();

        let (closed, thread) = service.get_ticket(&actor, ticket.id).await.unwrap();
        assert_eq!(closed.status, TicketStatus::Closed);
        assert_eq!(thread.len(), 2);

        // Reopen through a reply whose own status is open.
        service
            .reply_to_ticket(&actor, ticket.id, reply_input(TicketStatus::Open, None))
            .await
            .unwrap();

        let (reopened, thread) = service.get_ticket(&actor, ticket.id).await.unwrap();
        assert_eq!(reopened.status, TicketStatus::Open);
        assert_eq!(thread.len(), 3);

        let updates = sink
            .recorded()
            .into_iter()
            .filter(|e| matches!(e, TicketEvent::Updated { .. }))
            .count();
        assert_eq!(updates, 2);
    }

    #[tokio::test]
    async fn closed_ticket_rejects_replies_that_do_not_reopen() {
        let (service, _, db) = setup().await;
        let author = seed_user(&db, "u1", false).await;
        let actor = Actor::from(&author);

        let (ticket, _) = service
            .create_ticket(&author, create_input("Dead pixel", TicketPriority::Low))
            .await
            .unwrap();
        service
            .reply_to_ticket(&actor, ticket.id, reply_input(TicketStatus::Closed, None))
            .await
            .unwrap();

        let err = service
            .reply_to_ticket(&actor, ticket.id, reply_input(TicketStatus::Closed, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        assert_eq!(
            ticket_messages::Model::count_for_ticket(&db, ticket.id)
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn reply_inherits_ticket_priority_unless_overridden() {
        let (service, _, db) = setup().await;
        let author = seed_user(&db, "u1", false).await;
        let actor = Actor::from(&author);

        let (ticket, _) = service
            .create_ticket(&author, create_input("Slow laptop", TicketPriority::Low))
            .await
            .unwrap();

        let inherited = service
            .reply_to_ticket(&actor, ticket.id, reply_input(TicketStatus::Open, None))
            .await
            .unwrap();
        assert_eq!(inherited.priority, TicketPriority::Low);

        let overridden = service
            .reply_to_ticket(
                &actor,
                ticket.id,
                reply_input(TicketStatus::Open, Some(TicketPriority::Critical)),
            )
            .await
            .unwrap();
        assert_eq!(overridden.priority, TicketPriority::Critical);

        let (synced, _) = service.get_ticket(&actor, ticket.id).await.unwrap();
        assert_eq!(synced.priority, TicketPriority::Critical);
    }

    #[tokio::test]
    async fn outsider_is_rejected_without_mutation() {
        let (service, sink, db) = setup().await;
        let author = seed_user(&db, "u1", false).await;
        let outsider = seed_user(&db, "u2", false).await;
        let outsider_actor = Actor::from(&outsider);

        let (ticket, _) = service
            .create_ticket(&author, create_input("Printer broken", TicketPriority::Low))
            .await
            .unwrap();

        let err = service
            .get_ticket(&outsider_actor, ticket.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = service
            .reply_to_ticket(
                &outsider_actor,
                ticket.id,
                reply_input(TicketStatus::Open, None),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = service
            .delete_ticket(&outsider_actor, ticket.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        // Nothing happened: one message, one create event.
        assert_eq!(
            ticket_messages::Model::count_for_ticket(&db, ticket.id)
                .await
                .unwrap(),
            1
        );
        assert_eq!(sink.recorded().len(), 1);
    }

    #[tokio::test]
    async fn admin_delete_removes_ticket_and_publishes_one_event() {
        let (service, sink, db) = setup().await;
        let author = seed_user(&db, "u1", false).await;
        let admin = seed_user(&db, "admin", true).await;
        let admin_actor = Actor::from(&admin);

        let (ticket, _) = service
            .create_ticket(&author, create_input("Printer broken", TicketPriority::Low))
            .await
            .unwrap();

        service.delete_ticket(&admin_actor, ticket.id).await.unwrap();

        assert!(
            TicketRepository::find_by_id(&db, ticket.id)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(
            ticket_messages::Model::count_for_ticket(&db, ticket.id)
                .await
                .unwrap(),
            0
        );

        let deletes: Vec<_> = sink
            .recorded()
            .into_iter()
            .filter(|e| matches!(e, TicketEvent::Deleted { .. }))
            .collect();
        assert_eq!(deletes, vec![TicketEvent::Deleted { ticket_id: ticket.id }]);
    }

    #[tokio::test]
    async fn missing_ticket_is_not_found() {
        let (service, _, db) = setup().await;
        let admin = seed_user(&db, "admin", true).await;
        let actor = Actor::from(&admin);

        let err = service.delete_ticket(&actor, 424242).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = service.get_ticket(&actor, 424242).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn listing_defaults_to_open_and_scopes_non_admins() {
        let (service, _, db) = setup().await;
        let alice = seed_user(&db, "alice", false).await;
        let bob = seed_user(&db, "bob", false).await;
        let admin = seed_user(&db, "admin", true).await;

        let (a1, _) = service
            .create_ticket(&alice, create_input("a open", TicketPriority::Low))
            .await
            .unwrap();
        let (a2, _) = service
            .create_ticket(&alice, create_input("a closed", TicketPriority::Low))
            .await
            .unwrap();
        service
            .reply_to_ticket(
                &Actor::from(&alice),
                a2.id,
                reply_input(TicketStatus::Closed, None),
            )
            .await
            .unwrap();
        service
            .create_ticket(&bob, create_input("b open", TicketPriority::High))
            .await
            .unwrap();

        // Alice with the default state token sees only her open ticket.
        let page = service
            .list_tickets(&Actor::from(&alice), TicketListParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, a1.id);

        // "all" clears the status filter but not the ownership scope.
        let page = service
            .list_tickets(
                &Actor::from(&alice),
                TicketListParams {
                    state: Some("all".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 2);

        // The admin sees everyone's open tickets.
        let page = service
            .list_tickets(&Actor::from(&admin), TicketListParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);

        // Priority tokens narrow further.
        let page = service
            .list_tickets(
                &Actor::from(&admin),
                TicketListParams {
                    priority: Some("high".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);

        let err = service
            .list_tickets(
                &Actor::from(&admin),
                TicketListParams {
                    state: Some("bogus".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = service
            .list_tickets(&Actor::Anonymous, TicketListParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn event_sink_failure_does_not_fail_the_mutation() {
        let db = setup_test_db().await;
        let service = TicketService::new(db.clone(), Arc::new(FailingEventSink));
        let author = seed_user(&db, "u1", false).await;

        let (ticket, _) = service
            .create_ticket(&author, create_input("Still works", TicketPriority::Medium))
            .await
            .unwrap();

        assert!(
            TicketRepository::find_by_id(&db, ticket.id)
                .await
                .unwrap()
                .is_some()
        );
    }
}
