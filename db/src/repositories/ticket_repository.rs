use crate::filters::TicketFilter;
use crate::models::tickets::{Column, Entity};
use crate::repositories::repository::Repository;
use sea_orm::{ColumnTrait, Condition, QueryFilter, QueryOrder, Select};

pub struct TicketRepository;

impl Repository<Entity, TicketFilter> for TicketRepository {
    fn apply_filter(query: Select<Entity>, filter: &TicketFilter) -> Select<Entity> {
        let mut condition = Condition::all();
        if let Some(user_id) = filter.user_id {
            condition = condition.add(Column::UserId.eq(user_id));
        }
        if let Some(status) = filter.status {
            condition = condition.add(Column::Status.eq(status));
        }
        if let Some(priority) = filter.priority {
            condition = condition.add(Column::Priority.eq(priority));
        }
        query.filter(condition)
    }

    fn apply_sorting(mut query: Select<Entity>, sort_by: Option<String>) -> Select<Entity> {
        if let Some(sort_param) = sort_by {
            for sort in sort_param.split(',') {
                let (field, asc) = if let Some(stripped) = sort.strip_prefix('-') {
                    (stripped, false)
                } else {
                    (sort, true)
                };

                query = match field {
                    "id" => {
                        if asc {
                            query.order_by_asc(Column::Id)
                        } else {
                            query.order_by_desc(Column::Id)
                        }
                    }
                    "user_id" => {
                        if asc {
                            query.order_by_asc(Column::UserId)
                        } else {
                            query.order_by_desc(Column::UserId)
                        }
                    }
                    "subject" => {
                        if asc {
                            query.order_by_asc(Column::Subject)
                        } else {
                            query.order_by_desc(Column::Subject)
                        }
                    }
                    "status" => {
                        if asc {
                            query.order_by_asc(Column::Status)
                        } else {
                            query.order_by_desc(Column::Status)
                        }
                    }
                    "priority" => {
                        if asc {
                            query.order_by_asc(Column::Priority)
                        } else {
                            query.order_by_desc(Column::Priority)
                        }
                    }
                    "created_at" => {
                        if asc {
                            query.order_by_asc(Column::CreatedAt)
                        } else {
                            query.order_by_desc(Column::CreatedAt)
                        }
                    }
                    "updated_at" => {
                        if asc {
                            query.order_by_asc(Column::UpdatedAt)
                        } else {
                            query.order_by_desc(Column::UpdatedAt)
                        }
                    }
                    _ => query,
                };
            }
        }
        query
    }
}
