//! Business-logic entry points and their authorization checks.
//!
//! Every operation on the catalog goes through a named action function that
//! takes a [`Context`] and a JSON payload. Actions and auth functions are
//! registered in explicit name-to-function tables (see [`actions::get_action`]
//! and [`auth::get_auth`]) so an unknown name is caught by a lookup, not by a
//! failed attribute access at call time.

pub mod actions;
pub mod auth;

use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;

/// Ambient metadata passed to every action and auth function.
#[derive(Clone, Default)]
pub struct Context {
    /// Name of the calling user, `None` when the call is anonymous.
    pub user: Option<String>,

    /// Skip authorization checks entirely. Reserved for test helpers and
    /// internal calls; request handlers always leave this off.
    pub ignore_auth: bool,

    /// Handle to the database the call operates on.
    pub pool: Option<PgPool>,
}

impl Context {
    pub fn new(pool: PgPool, user: Option<String>) -> Self {
        Self {
            user,
            ignore_auth: false,
            pool: Some(pool),
        }
    }

    /// The database handle, or a validation error when the context was built
    /// without one.
    pub fn db(&self) -> Result<&PgPool, LogicError> {
        self.pool
            .as_ref()
            .ok_or_else(|| LogicError::Validation("context has no database handle".into()))
    }
}

#[derive(Debug, Error)]
pub enum LogicError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("invalid payload: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthVerdict {
    pub success: bool,
    pub msg: Option<String>,
}

impl AuthVerdict {
    pub fn allow() -> Self {
        Self {
            success: true,
            msg: None,
        }
    }

    pub fn deny(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            msg: Some(msg.into()),
        }
    }
}

/// Runs the named auth function unless the context bypasses authorization.
///
/// A denial becomes [`LogicError::NotAuthorized`] so actions can bail out
/// with `?`.
pub async fn check_access(name: &str, context: &Context, data: &Value) -> Result<(), LogicError> {
    if context.ignore_auth {
        return Ok(());
    }

    let auth_fn = auth::get_auth(name)
        .ok_or_else(|| LogicError::NotAuthorized(format!("no auth function named {name}")))?;
    let verdict = auth_fn(context, data).await?;
    if verdict.success {
        Ok(())
    } else {
        Err(LogicError::NotAuthorized(
            verdict.msg.unwrap_or_else(|| format!("access denied: {name}")),
        ))
    }
}

pub(crate) fn required_str<'a>(data: &'a Value, key: &str) -> Result<&'a str, LogicError> {
    data.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| LogicError::Validation(format!("missing required field: {key}")))
}

pub(crate) fn optional_str<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

pub(crate) fn optional_str_list(data: &Value, key: &str) -> Result<Vec<String>, LogicError> {
    match data.get(key) {
        None | Some(Value::Null) => Ok(vec![]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| LogicError::Validation(format!("{key} must be a string list")))
            })
            .collect(),
        Some(_) => Err(LogicError::Validation(format!(
            "{key} must be a string list"
        ))),
    }
}

pub(crate) fn required_i64(data: &Value, key: &str) -> Result<i64, LogicError> {
    data.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| LogicError::Validation(format!("missing required field: {key}")))
}
