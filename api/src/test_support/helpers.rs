use serde_json::Value;
use sqlx::PgPool;

use crate::logic::{actions, auth, AuthVerdict, Context, LogicError};

/// The user name actions run under when a test does not pick one.
pub const ANONYMOUS_LOCAL_USER: &str = "127.0.0.1";

/// Per-call context overrides for [`call_action`].
///
/// Unset fields fall back to the helper defaults: the anonymous local user
/// and `ignore_auth = true`. Setting `ignore_auth` to `Some(false)` is the
/// explicit way to exercise a real authorization-enforced path through an
/// action.
#[derive(Default)]
pub struct ContextParams {
    pub user: Option<String>,
    pub ignore_auth: Option<bool>,
}

pub(crate) fn build_call_context(pool: PgPool, params: ContextParams) -> Context {
    Context {
        user: params
            .user
            .or_else(|| Some(ANONYMOUS_LOCAL_USER.to_string())),
        ignore_auth: params.ignore_auth.unwrap_or(true),
        pool: Some(pool),
    }
}

/// Calls the named action function and returns its result.
///
/// A nicer way for test code to invoke an action than wiring up a [`Context`]
/// by hand. Note: by default this skips authorization, so action tests stay
/// focused on the action itself; the auth functions have their own tests
/// through [`call_auth`]. Pass `ContextParams { ignore_auth: Some(false), .. }`
/// to run the real authorization check instead.
///
/// Fails with whatever error the underlying action returns. Panics if no
/// action with that name is registered.
pub async fn call_action(
    pool: &PgPool,
    action_name: &str,
    params: ContextParams,
    data: Value,
) -> Result<Value, LogicError> {
    let context = build_call_context(pool.clone(), params);
    let action = actions::get_action(action_name)
        .unwrap_or_else(|| panic!("no action named {action_name}"));
    action(&context, data).await
}

/// Calls the named auth function and returns its verdict.
///
/// The context must already carry a user and a database handle; tests are
/// expected to decide both explicitly when testing authorization, so missing
/// either one panics before any dispatch happens. Panics if no auth function
/// with that name is registered.
pub async fn call_auth(
    auth_name: &str,
    context: &Context,
    data: Value,
) -> Result<AuthVerdict, LogicError> {
    assert!(
        context.user.is_some(),
        "call_auth requires a user in the context"
    );
    assert!(
        context.pool.is_some(),
        "call_auth requires a database handle in the context"
    );

    let auth_fn =
        auth::get_auth(auth_name).unwrap_or_else(|| panic!("no auth function named {auth_name}"));
    auth_fn(context, &data).await
}
