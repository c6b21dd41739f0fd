use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;

use crate::{
    audit::log_audit,
    config::StockPolicy,
    dto::products::{CreateProductRequest, UpdateProductRequest},
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    models::{MAX_UNIT_PRICE, Money, Product},
    state::AppState,
};

pub async fn find_product<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Option<Product>> {
    let product = Products::find_by_id(id)
        .one(db)
        .await?
        .map(product_from_entity);
    Ok(product)
}

pub async fn get_product<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Product> {
    match find_product(db, id).await? {
        Some(p) => Ok(p),
        None => Err(AppError::NotFound),
    }
}

pub async fn get_product_by_barcode<C: ConnectionTrait>(
    db: &C,
    barcode: &str,
) -> AppResult<Product> {
    let product = Products::find()
        .filter(Column::Barcode.eq(barcode))
        .one(db)
        .await?;
    match product {
        Some(p) => Ok(product_from_entity(p)),
        None => Err(AppError::NotFound),
    }
}

pub async fn list_products<C: ConnectionTrait>(db: &C) -> AppResult<Vec<Product>> {
    let items = Products::find()
        .order_by_asc(Column::Name)
        .order_by_asc(Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();
    Ok(items)
}

pub async fn create_product(state: &AppState, payload: CreateProductRequest) -> AppResult<Product> {
    let name = validate_name(&payload.name)?;
    validate_price(payload.price)?;

    let now: DateTimeWithTimeZone = Utc::now().into();
    let product = ActiveModel {
        id: NotSet,
        name: Set(name),
        description: Set(payload.description),
        price: Set(payload.price.cents()),
        stock_quantity: Set(payload.stock_quantity),
        category: Set(payload.category),
        barcode: Set(non_blank(payload.barcode)),
        image_path: Set(non_blank(payload.image_path)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.orm,
        None,
        "product_created",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(product_from_entity(product))
}

pub async fn update_product(
    state: &AppState,
    id: i32,
    payload: UpdateProductRequest,
) -> AppResult<Product> {
    let existing = match Products::find_by_id(id).one(&state.orm).await? {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(validate_name(&name)?);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
        active.price = Set(price.cents());
    }
    if let Some(stock) = payload.stock_quantity {
        active.stock_quantity = Set(stock);
    }
    if let Some(category) = payload.category {
        active.category = Set(Some(category));
    }
    if let Some(barcode) = payload.barcode {
        active.barcode = Set(non_blank(Some(barcode)));
    }
    if let Some(image_path) = payload.image_path {
        active.image_path = Set(non_blank(Some(image_path)));
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.orm,
        None,
        "product_updated",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(product_from_entity(product))
}

/// Remove a product. A product still referenced by bill lines is refused
/// by the database as a constraint violation and stays in place.
pub async fn delete_product(state: &AppState, id: i32) -> AppResult<()> {
    let result = Products::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(product_id = id, "product deleted");

    if let Err(err) = log_audit(
        &state.orm,
        None,
        "product_deleted",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(())
}

pub async fn count_products<C: ConnectionTrait>(db: &C) -> AppResult<u64> {
    Ok(Products::find().count(db).await?)
}

/// Overwrite the stock counter of a product. This is not a delta; callers
/// that want to deduct use [`decrement_stock`].
pub async fn set_stock(state: &AppState, id: i32, quantity: i32) -> AppResult<Product> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let result = Products::update_many()
        .col_expr(Column::StockQuantity, Expr::value(quantity))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Id.eq(id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.orm,
        None,
        "stock_set",
        Some("products"),
        Some(serde_json::json!({ "product_id": id, "stock_quantity": quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    get_product(&state.orm, id).await
}

/// Deduct `quantity` units in a single statement evaluated by the database,
/// so concurrent confirmations touching the same product cannot lose an
/// update. Under [`StockPolicy::Reject`] the statement only matches while
/// enough stock remains.
pub async fn decrement_stock<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    quantity: i32,
    policy: StockPolicy,
) -> AppResult<()> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut update = Products::update_many()
        .col_expr(
            Column::StockQuantity,
            Expr::col(Column::StockQuantity).sub(quantity),
        )
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Id.eq(product_id));
    if policy == StockPolicy::Reject {
        update = update.filter(Column::StockQuantity.gte(quantity));
    }

    let result = update.exec(db).await?;
    if result.rows_affected > 0 {
        return Ok(());
    }

    match find_product(db, product_id).await? {
        Some(_) => Err(AppError::InsufficientStock {
            product_id,
            requested: quantity,
        }),
        None => Err(AppError::NotFound),
    }
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("product name is required".into()));
    }
    Ok(name.to_owned())
}

fn validate_price(price: Money) -> AppResult<()> {
    if price.is_negative() {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if price > MAX_UNIT_PRICE {
        return Err(AppError::BadRequest(format!("price must not exceed {MAX_UNIT_PRICE}")));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: Money::from_cents(model.price),
        stock_quantity: model.stock_quantity,
        category: model.category,
        barcode: model.barcode,
        image_path: model.image_path,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
