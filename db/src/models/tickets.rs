use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::DeriveActiveEnum;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A support request thread. Status and priority always mirror the
/// latest accepted message of the thread.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// The user who opened the ticket.
    pub user_id: i64,

    pub subject: String,

    pub status: TicketStatus,
    pub priority: TicketPriority,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ticket_status")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TicketStatus {
    #[sea_orm(string_value = "open")]
    Open,

    #[sea_orm(string_value = "in_progress")]
    InProgress,

    #[sea_orm(string_value = "on_hold")]
    OnHold,

    #[sea_orm(string_value = "resolved")]
    Resolved,

    #[sea_orm(string_value = "closed")]
    Closed,
}

impl TicketStatus {
    /// Only a closed ticket refuses further replies.
    pub fn is_closed(&self) -> bool {
        matches!(self, TicketStatus::Closed)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ticket_priority")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TicketPriority {
    #[sea_orm(string_value = "low")]
    Low,

    #[sea_orm(string_value = "medium")]
    Medium,

    #[sea_orm(string_value = "high")]
    High,

    #[sea_orm(string_value = "critical")]
    Critical,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(has_many = "super::ticket_messages::Entity")]
    TicketMessages,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::ticket_messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketMessages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Inserts a ticket row. Generic over the connection so it can run
    /// inside the same transaction as its opening message.
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        user_id: i64,
        subject: &str,
        status: TicketStatus,
        priority: TicketPriority,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        let active = ActiveModel {
            user_id: Set(user_id),
            subject: Set(subject.to_owned()),
            status: Set(status),
            priority: Set(priority),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active.insert(db).await
    }

    /// Re-points the ticket's status and priority at its latest message.
    pub async fn sync_state<C: ConnectionTrait>(
        self,
        db: &C,
        status: TicketStatus,
        priority: TicketPriority,
    ) -> Result<Model, DbErr> {
        let mut active: ActiveModel = self.into();

        active.status = Set(status);
        active.priority = Set(priority);
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }
}
