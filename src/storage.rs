use crate::entities;
use crate::errors::ChikaError;
use crate::schemas::{Page, Property, PropertyCreate, PropertyFilter};
use crate::settings::Database as DbCfg;
use migration::Migrator;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, Database, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

/// Rows per INSERT statement during bulk replace, kept well below SQLite's
/// bound-parameter limit.
const INSERT_CHUNK: usize = 200;

pub async fn init(cfg: &DbCfg) -> Result<DatabaseConnection, ChikaError> {
    let db = Database::connect(&cfg.url).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn get_property(db: &DatabaseConnection, id: i32) -> Result<Option<Property>, ChikaError> {
    use entities::property::Entity;

    let model = Entity::find_by_id(id).one(db).await?;
    Ok(model.map(Property::from))
}

/// Rows in insertion order. Negative offsets and non-positive limits are
/// rejected before any query runs.
pub async fn list_properties(
    db: &DatabaseConnection,
    offset: i64,
    limit: i64,
) -> Result<Vec<Property>, ChikaError> {
    use entities::property::{Column, Entity};

    let page = Page::new(offset, limit)?;
    let models = Entity::find()
        .order_by_asc(Column::Id)
        .offset(page.offset())
        .limit(page.limit())
        .all(db)
        .await?;

    Ok(models.into_iter().map(Property::from).collect())
}

pub async fn search_properties(
    db: &DatabaseConnection,
    filter: &PropertyFilter,
    offset: i64,
    limit: i64,
) -> Result<Vec<Property>, ChikaError> {
    use entities::property::{Column, Entity};

    filter.validate()?;
    let page = Page::new(offset, limit)?;

    let mut cond = Condition::all();
    if let Some(needle) = filter.name_needle() {
        let pattern = format!("%{}%", escape_like(needle));
        cond = cond.add(Column::Name.like(LikeExpr::new(pattern).escape('\\')));
    }
    if let Some(min) = filter.min_price {
        cond = cond.add(Column::Price.gte(min));
    }
    if let Some(max) = filter.max_price {
        cond = cond.add(Column::Price.lte(max));
    }

    let models = Entity::find()
        .filter(cond)
        .order_by_asc(Column::Id)
        .offset(page.offset())
        .limit(page.limit())
        .all(db)
        .await?;

    Ok(models.into_iter().map(Property::from).collect())
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub async fn count_properties(db: &DatabaseConnection) -> Result<u64, ChikaError> {
    use entities::property::Entity;

    Ok(Entity::find().count(db).await?)
}

pub async fn create_property(
    db: &DatabaseConnection,
    input: PropertyCreate,
) -> Result<Property, ChikaError> {
    let property = entities::property::ActiveModel {
        id: NotSet,
        name: Set(input.name),
        address: Set(input.address),
        price: Set(input.price),
    };

    let model = property.insert(db).await?;
    tracing::debug!(id = model.id, "created property");
    Ok(Property::from(model))
}

/// Replace every field of an existing row. Returns `None` if the id is unknown.
pub async fn update_property(
    db: &DatabaseConnection,
    id: i32,
    input: PropertyCreate,
) -> Result<Option<Property>, ChikaError> {
    use entities::property::Entity;

    let Some(existing) = Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut property = existing.into_active_model();
    property.name = Set(input.name);
    property.address = Set(input.address);
    property.price = Set(input.price);

    // The row can vanish between the lookup and the write
    match property.update(db).await {
        Ok(model) => Ok(Some(Property::from(model))),
        Err(DbErr::RecordNotUpdated) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_property(db: &DatabaseConnection, id: i32) -> Result<bool, ChikaError> {
    use entities::property::Entity;

    let result = Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Drop every row and insert `rows` in a single transaction. Identifiers keep
/// counting up from the previous high-water mark.
pub async fn replace_all(
    db: &DatabaseConnection,
    rows: Vec<PropertyCreate>,
) -> Result<u64, ChikaError> {
    use entities::property::Entity;

    let txn = db.begin().await?;

    let removed = Entity::delete_many().exec(&txn).await?.rows_affected;
    tracing::debug!(removed, "cleared properties table");

    let mut inserted = 0u64;
    for chunk in rows.chunks(INSERT_CHUNK) {
        let models = chunk.iter().map(|row| entities::property::ActiveModel {
            id: NotSet,
            name: Set(row.name.clone()),
            address: Set(row.address.clone()),
            price: Set(row.price),
        });
        Entity::insert_many(models).exec(&txn).await?;
        inserted += chunk.len() as u64;
    }

    txn.commit().await?;
    Ok(inserted)
}
