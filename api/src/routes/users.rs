use actix_web::{
    get, post,
    web::{Data, Json, Path},
    HttpRequest, Responder,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::logic::{actions, Context};
use crate::routes::{extract_user, ApiError};

#[derive(Deserialize)]
struct PostUserRequest {
    name: String,
    email: String,
    #[serde(default)]
    sysadmin: bool,
}

#[post("/users")]
pub async fn create_user(
    req: HttpRequest,
    pool: Data<PgPool>,
    user: Json<PostUserRequest>,
) -> Result<impl Responder, ApiError> {
    let context = Context::new(pool.get_ref().clone(), extract_user(&req));
    let action = actions::get_action("user_create").expect("user_create is registered");
    let user = user.0;
    let result = action(
        &context,
        json!({
            "name": user.name,
            "email": user.email,
            "sysadmin": user.sysadmin,
        }),
    )
    .await?;
    Ok(Json(result))
}

#[get("/users/{user_name}")]
pub async fn read_user(
    req: HttpRequest,
    pool: Data<PgPool>,
    user_name: Path<String>,
) -> Result<impl Responder, ApiError> {
    let context = Context::new(pool.get_ref().clone(), extract_user(&req));
    let action = actions::get_action("user_show").expect("user_show is registered");
    let result = action(&context, json!({ "name": *user_name })).await?;
    Ok(Json(result))
}
