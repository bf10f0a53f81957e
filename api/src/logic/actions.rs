use futures::future::BoxFuture;
use serde_json::{json, Value};
use tracing::info;

use crate::db::{datasets, users};
use crate::logic::{
    check_access, optional_str, optional_str_list, required_i64, required_str, Context, LogicError,
};

pub type ActionResult = Result<Value, LogicError>;

/// A named business-logic entry point.
pub type ActionFn = for<'a> fn(&'a Context, Value) -> BoxFuture<'a, ActionResult>;

/// Every registered action name, in registry order.
pub const ACTION_NAMES: &[&str] = &[
    "dataset_create",
    "dataset_show",
    "dataset_update",
    "dataset_delete",
    "dataset_list",
    "user_create",
    "user_show",
];

/// Looks up an action function by name.
pub fn get_action(name: &str) -> Option<ActionFn> {
    let action: ActionFn = match name {
        "dataset_create" => dataset_create,
        "dataset_show" => dataset_show,
        "dataset_update" => dataset_update,
        "dataset_delete" => dataset_delete,
        "dataset_list" => dataset_list,
        "user_create" => user_create,
        "user_show" => user_show,
        _ => return None,
    };
    Some(action)
}

fn dataset_to_value(dataset: &datasets::Dataset) -> Value {
    json!({
        "id": dataset.id,
        "name": dataset.name,
        "title": dataset.title,
        "notes": dataset.notes,
        "owner": dataset.owner,
        "tags": dataset.tags,
    })
}

fn user_to_value(user: &users::User) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "sysadmin": user.sysadmin,
    })
}

pub fn dataset_create(context: &Context, data: Value) -> BoxFuture<'_, ActionResult> {
    Box::pin(async move {
        check_access("dataset_create", context, &data).await?;
        let pool = context.db()?;

        let name = required_str(&data, "name")?;
        if name.is_empty() {
            return Err(LogicError::Validation("name must not be empty".into()));
        }
        let title = optional_str(&data, "title");
        let notes = optional_str(&data, "notes");
        let tags = optional_str_list(&data, "tags")?;
        let owner = optional_str(&data, "owner")
            .or(context.user.as_deref())
            .unwrap_or("");

        let id = datasets::create_dataset(pool, name, title, notes, owner, &tags).await?;
        info!(id, name, "dataset created");

        let dataset = datasets::read_dataset(pool, id)
            .await?
            .ok_or_else(|| LogicError::NotFound(format!("dataset {id}")))?;
        Ok(dataset_to_value(&dataset))
    })
}

pub fn dataset_show(context: &Context, data: Value) -> BoxFuture<'_, ActionResult> {
    Box::pin(async move {
        check_access("dataset_show", context, &data).await?;
        let pool = context.db()?;

        // Datasets can be addressed by id or by name.
        let dataset = if let Some(name) = optional_str(&data, "name") {
            datasets::read_dataset_by_name(pool, name).await?
        } else {
            let id = required_i64(&data, "id")?;
            datasets::read_dataset(pool, id).await?
        };

        let dataset = dataset.ok_or_else(|| LogicError::NotFound("dataset".into()))?;
        Ok(dataset_to_value(&dataset))
    })
}

pub fn dataset_update(context: &Context, data: Value) -> BoxFuture<'_, ActionResult> {
    Box::pin(async move {
        check_access("dataset_update", context, &data).await?;
        let pool = context.db()?;

        let id = required_i64(&data, "id")?;
        let title = optional_str(&data, "title");
        let notes = optional_str(&data, "notes");
        let tags = optional_str_list(&data, "tags")?;

        datasets::update_dataset(pool, id, title, notes, &tags)
            .await?
            .ok_or_else(|| LogicError::NotFound(format!("dataset {id}")))?;
        info!(id, "dataset updated");

        let dataset = datasets::read_dataset(pool, id)
            .await?
            .ok_or_else(|| LogicError::NotFound(format!("dataset {id}")))?;
        Ok(dataset_to_value(&dataset))
    })
}

pub fn dataset_delete(context: &Context, data: Value) -> BoxFuture<'_, ActionResult> {
    Box::pin(async move {
        check_access("dataset_delete", context, &data).await?;
        let pool = context.db()?;

        let id = required_i64(&data, "id")?;
        datasets::delete_dataset(pool, id)
            .await?
            .ok_or_else(|| LogicError::NotFound(format!("dataset {id}")))?;
        info!(id, "dataset deleted");

        Ok(json!({ "id": id }))
    })
}

pub fn dataset_list(context: &Context, data: Value) -> BoxFuture<'_, ActionResult> {
    Box::pin(async move {
        check_access("dataset_list", context, &data).await?;
        let pool = context.db()?;

        let datasets = datasets::read_all_datasets(pool).await?;
        let datasets: Vec<Value> = datasets.iter().map(dataset_to_value).collect();
        Ok(json!({ "datasets": datasets }))
    })
}

pub fn user_create(context: &Context, data: Value) -> BoxFuture<'_, ActionResult> {
    Box::pin(async move {
        check_access("user_create", context, &data).await?;
        let pool = context.db()?;

        let name = required_str(&data, "name")?;
        if name.is_empty() {
            return Err(LogicError::Validation("name must not be empty".into()));
        }
        let email = required_str(&data, "email")?;
        let sysadmin = data
            .get("sysadmin")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let id = users::create_user(pool, name, email, sysadmin).await?;
        info!(id, name, "user created");

        let user = users::read_user(pool, id)
            .await?
            .ok_or_else(|| LogicError::NotFound(format!("user {id}")))?;
        Ok(user_to_value(&user))
    })
}

pub fn user_show(context: &Context, data: Value) -> BoxFuture<'_, ActionResult> {
    Box::pin(async move {
        check_access("user_show", context, &data).await?;
        let pool = context.db()?;

        let user = if let Some(name) = optional_str(&data, "name") {
            users::read_user_by_name(pool, name).await?
        } else {
            let id = required_i64(&data, "id")?;
            users::read_user(pool, id).await?
        };

        let user = user.ok_or_else(|| LogicError::NotFound("user".into()))?;
        Ok(user_to_value(&user))
    })
}
