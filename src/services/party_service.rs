use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::OnConflict;

use crate::{
    dto::customers::{CreateCustomerRequest, UpdateCustomerRequest},
    entity::{
        customers::{
            ActiveModel as CustomerActive, Column as CustomerCol, Entity as Customers,
            Model as CustomerModel,
        },
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    models::{Customer, User},
};

pub const WALK_IN_USERNAME: &str = "walkin";
pub const WALK_IN_NAME: &str = "Walk-in Customer";

pub async fn get_customer<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Customer> {
    let customer = Customers::find_by_id(id).one(db).await?;
    match customer {
        Some(c) => Ok(customer_from_entity(c)),
        None => Err(AppError::NotFound),
    }
}

pub async fn list_customers<C: ConnectionTrait>(db: &C) -> AppResult<Vec<Customer>> {
    let customers = Customers::find()
        .order_by_asc(CustomerCol::Name)
        .order_by_asc(CustomerCol::Id)
        .all(db)
        .await?
        .into_iter()
        .map(customer_from_entity)
        .collect();
    Ok(customers)
}

pub async fn create_customer<C: ConnectionTrait>(
    db: &C,
    payload: CreateCustomerRequest,
) -> AppResult<Customer> {
    let name = validate_name(&payload.name)?;
    let username = validate_username(payload.username)?;

    let now: DateTimeWithTimeZone = Utc::now().into();
    let customer = CustomerActive {
        id: NotSet,
        name: Set(name),
        username: Set(username),
        email: Set(payload.email),
        phone: Set(payload.phone),
        address: Set(payload.address),
        password: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    Ok(customer_from_entity(customer))
}

pub async fn update_customer<C: ConnectionTrait>(
    db: &C,
    id: i32,
    payload: UpdateCustomerRequest,
) -> AppResult<Customer> {
    let existing = match Customers::find_by_id(id).one(db).await? {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    if is_walk_in(&existing) {
        return Err(AppError::Conflict("the walk-in customer cannot be modified".into()));
    }

    let mut active: CustomerActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(validate_name(&name)?);
    }
    if let Some(username) = payload.username {
        active.username = Set(validate_username(Some(username))?);
    }
    if let Some(email) = payload.email {
        active.email = Set(Some(email));
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }
    active.updated_at = Set(Utc::now().into());

    let customer = active.update(db).await?;
    Ok(customer_from_entity(customer))
}

/// Remove a customer. Customers with bills are refused by the database as a
/// constraint violation; the walk-in customer is never removed.
pub async fn delete_customer<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<()> {
    let existing = match Customers::find_by_id(id).one(db).await? {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    if is_walk_in(&existing) {
        return Err(AppError::Conflict("the walk-in customer cannot be deleted".into()));
    }

    let result = Customers::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    tracing::info!(customer_id = id, "customer deleted");
    Ok(())
}

pub async fn count_customers<C: ConnectionTrait>(db: &C) -> AppResult<u64> {
    Ok(Customers::find().count(db).await?)
}

pub async fn get_user<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<User> {
    let user = Users::find_by_id(id).one(db).await?;
    match user {
        Some(u) => Ok(user_from_entity(u)),
        None => Err(AppError::NotFound),
    }
}

/// Register a staff account. The password is stored as an argon2 hash.
pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
    full_name: &str,
    role: &str,
) -> AppResult<User> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("username is required".into()));
    }
    if password.is_empty() {
        return Err(AppError::BadRequest("password is required".into()));
    }

    let taken = Users::find()
        .filter(UserCol::Username.eq(username))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(format!("username `{username}` is already taken")));
    }

    let user = UserActive {
        id: NotSet,
        username: Set(username.to_owned()),
        password: Set(hash_password(password)?),
        full_name: Set(full_name.to_owned()),
        role: Set(role.to_owned()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;

    tracing::info!(user_id = user.id, role, "user created");
    Ok(user_from_entity(user))
}

pub async fn find_user_by_username<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> AppResult<Option<User>> {
    let user = Users::find()
        .filter(UserCol::Username.eq(username))
        .one(db)
        .await?;
    Ok(user.map(user_from_entity))
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

/// Id of the sentinel customer that bills without a named customer belong
/// to. Inserts it the first time it is needed.
pub async fn ensure_walk_in_customer<C: ConnectionTrait>(db: &C) -> AppResult<i32> {
    if let Some(existing) = find_walk_in(db).await? {
        return Ok(existing);
    }

    let now: DateTimeWithTimeZone = Utc::now().into();
    let row = CustomerActive {
        id: NotSet,
        name: Set(WALK_IN_NAME.to_owned()),
        username: Set(Some(WALK_IN_USERNAME.to_owned())),
        email: Set(None),
        phone: Set(None),
        address: Set(None),
        password: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    // A concurrent caller may insert it first; the unique username absorbs
    // the race and both read back the same row.
    let inserted = Customers::insert(row)
        .on_conflict(
            OnConflict::column(CustomerCol::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    let id = find_walk_in(db).await?.ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("walk-in customer missing after insert"))
    })?;
    if inserted > 0 {
        tracing::info!(customer_id = id, "walk-in customer created");
    }
    Ok(id)
}

async fn find_walk_in<C: ConnectionTrait>(db: &C) -> AppResult<Option<i32>> {
    let existing = Customers::find()
        .filter(CustomerCol::Username.eq(WALK_IN_USERNAME))
        .one(db)
        .await?;
    Ok(existing.map(|c| c.id))
}

fn is_walk_in(model: &CustomerModel) -> bool {
    model.username.as_deref() == Some(WALK_IN_USERNAME)
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("customer name is required".into()));
    }
    Ok(name.to_owned())
}

fn validate_username(username: Option<String>) -> AppResult<Option<String>> {
    let username = username
        .map(|u| u.trim().to_owned())
        .filter(|u| !u.is_empty());
    if username.as_deref() == Some(WALK_IN_USERNAME) {
        return Err(AppError::Conflict(format!("username `{WALK_IN_USERNAME}` is reserved")));
    }
    Ok(username)
}

fn customer_from_entity(model: CustomerModel) -> Customer {
    Customer {
        id: model.id,
        name: model.name,
        username: model.username,
        email: model.email,
        phone: model.phone,
        address: model.address,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        username: model.username,
        full_name: model.full_name,
        role: model.role,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
