use futures::future::BoxFuture;
use serde_json::Value;

use crate::db::{datasets, users};
use crate::logic::{required_i64, AuthVerdict, Context, LogicError};

pub type AuthResult = Result<AuthVerdict, LogicError>;

/// A named authorization check.
pub type AuthFn = for<'a> fn(&'a Context, &'a Value) -> BoxFuture<'a, AuthResult>;

/// Looks up an auth function by name.
pub fn get_auth(name: &str) -> Option<AuthFn> {
    let auth: AuthFn = match name {
        "dataset_create" => dataset_create,
        "dataset_show" => anyone,
        "dataset_update" => dataset_update,
        "dataset_delete" => dataset_delete,
        "dataset_list" => anyone,
        "user_create" => sysadmin_only,
        "user_show" => anyone,
        _ => return None,
    };
    Some(auth)
}

/// Checks that run for read-only operations: everyone passes, including
/// anonymous callers.
fn anyone<'a>(_context: &'a Context, _data: &'a Value) -> BoxFuture<'a, AuthResult> {
    Box::pin(async move { Ok(AuthVerdict::allow()) })
}

fn dataset_create<'a>(context: &'a Context, _data: &'a Value) -> BoxFuture<'a, AuthResult> {
    Box::pin(async move {
        match &context.user {
            Some(user) if !user.is_empty() => Ok(AuthVerdict::allow()),
            _ => Ok(AuthVerdict::deny("only named users may create datasets")),
        }
    })
}

fn dataset_update<'a>(context: &'a Context, data: &'a Value) -> BoxFuture<'a, AuthResult> {
    Box::pin(async move {
        let Some(user) = context.user.as_deref() else {
            return Ok(AuthVerdict::deny("only named users may update datasets"));
        };

        if is_sysadmin(context, user).await? {
            return Ok(AuthVerdict::allow());
        }

        let id = required_i64(data, "id")?;
        let dataset = datasets::read_dataset(context.db()?, id)
            .await?
            .ok_or_else(|| LogicError::NotFound(format!("dataset {id}")))?;
        if dataset.owner == user {
            Ok(AuthVerdict::allow())
        } else {
            Ok(AuthVerdict::deny(format!(
                "user {user} does not own dataset {id}"
            )))
        }
    })
}

fn dataset_delete<'a>(context: &'a Context, data: &'a Value) -> BoxFuture<'a, AuthResult> {
    sysadmin_only(context, data)
}

fn sysadmin_only<'a>(context: &'a Context, _data: &'a Value) -> BoxFuture<'a, AuthResult> {
    Box::pin(async move {
        let Some(user) = context.user.as_deref() else {
            return Ok(AuthVerdict::deny("sysadmin required"));
        };
        if is_sysadmin(context, user).await? {
            Ok(AuthVerdict::allow())
        } else {
            Ok(AuthVerdict::deny(format!("user {user} is not a sysadmin")))
        }
    })
}

async fn is_sysadmin(context: &Context, user: &str) -> Result<bool, LogicError> {
    let user = users::read_user_by_name(context.db()?, user).await?;
    Ok(user.map(|u| u.sysadmin).unwrap_or(false))
}
