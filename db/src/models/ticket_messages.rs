use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, PaginatorTrait, QueryOrder, entity::prelude::*};
use serde::{Deserialize, Serialize};

use super::tickets::{TicketPriority, TicketStatus};

/// One post within a ticket's thread. The first message of a ticket is
/// its opening message; thread order is insertion order.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "ticket_messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub ticket_id: i64,
    pub user_id: i64,

    pub content: String,

    /// The status this message drives the ticket into.
    pub status: TicketStatus,
    pub priority: TicketPriority,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tickets::Entity",
        from = "Column::TicketId",
        to = "super::tickets::Column::Id"
    )]
    Ticket,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::tickets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        ticket_id: i64,
        user_id: i64,
        content: &str,
        status: TicketStatus,
        priority: TicketPriority,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        let active = ActiveModel {
            ticket_id: Set(ticket_id),
            user_id: Set(user_id),
            content: Set(content.to_owned()),
            status: Set(status),
            priority: Set(priority),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active.insert(db).await
    }

    /// The ticket's thread in insertion order.
    pub async fn find_all_for_ticket<C: ConnectionTrait>(
        db: &C,
        ticket_id: i64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TicketId.eq(ticket_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub async fn count_for_ticket<C: ConnectionTrait>(
        db: &C,
        ticket_id: i64,
    ) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::TicketId.eq(ticket_id))
            .count(db)
            .await
    }
}
