use std::future::Future;
use std::pin::Pin;

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, PaginatorTrait,
    PrimaryKeyTrait, Select,
};

/// One page of a filtered listing, with the overall match count so
/// callers can render pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Persistence collaborator over a SeaORM entity. The connection is
/// always passed in explicitly; implementors only describe how their
/// filter type maps onto the entity's columns.
pub trait Repository<E, F>: Send + Sync
where
    E: EntityTrait,
    E::Model: Sync + Send + 'static,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send + 'static,
    E::Model: IntoActiveModel<E::ActiveModel>,
    F: Send + Sync,
{
    fn apply_filter(query: Select<E>, filter: &F) -> Select<E>;

    fn apply_sorting(query: Select<E>, sort_by: Option<String>) -> Select<E>;

    fn create<'a>(
        db: &'a DatabaseConnection,
        active_model: E::ActiveModel,
    ) -> Pin<Box<dyn Future<Output = Result<E::Model, DbErr>> + Send + 'a>> {
        Box::pin(async move { active_model.insert(db).await })
    }

    fn update<'a>(
        db: &'a DatabaseConnection,
        active_model: E::ActiveModel,
    ) -> Pin<Box<dyn Future<Output = Result<E::Model, DbErr>> + Send + 'a>> {
        Box::pin(async move { active_model.update(db).await })
    }

    fn delete<'a>(
        db: &'a DatabaseConnection,
        id: <E::PrimaryKey as PrimaryKeyTrait>::ValueType,
    ) -> Pin<Box<dyn Future<Output = Result<(), DbErr>> + Send + 'a>> {
        Box::pin(async move {
            E::delete_by_id(id).exec(db).await?;
            Ok(())
        })
    }

    fn find_by_id<'a>(
        db: &'a DatabaseConnection,
        id: <E::PrimaryKey as PrimaryKeyTrait>::ValueType,
    ) -> Pin<Box<dyn Future<Output = Result<Option<E::Model>, DbErr>> + Send + 'a>> {
        Box::pin(async move { E::find_by_id(id).one(db).await })
    }

    fn find_one<'a>(
        db: &'a DatabaseConnection,
        filter: &'a F,
        sort_by: Option<String>,
    ) -> Pin<Box<dyn Future<Output = Result<Option<E::Model>, DbErr>> + Send + 'a>> {
        Box::pin(async move {
            let query = Self::apply_filter(E::find(), filter);
            let query = Self::apply_sorting(query, sort_by);
            query.one(db).await
        })
    }

    fn find_all<'a>(
        db: &'a DatabaseConnection,
        filter: &'a F,
        sort_by: Option<String>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<E::Model>, DbErr>> + Send + 'a>> {
        Box::pin(async move {
            let query = Self::apply_filter(E::find(), filter);
            let query = Self::apply_sorting(query, sort_by);
            query.all(db).await
        })
    }

    /// Filtered, sorted and paginated listing. `page` is 1-based.
    fn filter<'a>(
        db: &'a DatabaseConnection,
        filter: &'a F,
        page: u64,
        per_page: u64,
        sort_by: Option<String>,
    ) -> Pin<Box<dyn Future<Output = Result<Page<E::Model>, DbErr>> + Send + 'a>> {
        Box::pin(async move {
            let query = Self::apply_filter(E::find(), filter);
            let query = Self::apply_sorting(query, sort_by);

            let page_index = page.saturating_sub(1);
            let per_page = per_page.max(1);
            let paginator =
                <Select<E> as PaginatorTrait<'_, _>>::paginate(query, db, per_page);
            let total = paginator.num_items().await?;
            let items = paginator.fetch_page(page_index).await?;

            Ok(Page {
                items,
                total,
                page: page_index + 1,
                per_page,
            })
        })
    }

    fn count<'a>(
        db: &'a DatabaseConnection,
        filter: &'a F,
    ) -> Pin<Box<dyn Future<Output = Result<u64, DbErr>> + Send + 'a>> {
        Box::pin(async move {
            let query = Self::apply_filter(E::find(), filter);
            <Select<E> as PaginatorTrait<'_, _>>::count(query, db).await
        })
    }

    fn exists<'a>(
        db: &'a DatabaseConnection,
        filter: &'a F,
    ) -> Pin<Box<dyn Future<Output = Result<bool, DbErr>> + Send + 'a>> {
        Box::pin(async move {
            let count = Self::count(db, filter).await?;
            Ok(count > 0)
        })
    }
}
