use actix_web::{
    delete, get, post,
    web::{Data, Form, Json, Path},
    HttpRequest, HttpResponse, Responder,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::logic::{actions, Context};
use crate::routes::{extract_user, ApiError};
use crate::startup::UiSettings;

#[derive(Deserialize)]
struct PostDatasetRequest {
    name: String,
    title: Option<String>,
    notes: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Deserialize)]
struct UpdateDatasetRequest {
    title: Option<String>,
    notes: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

fn dispatch_context(pool: &Data<PgPool>, req: &HttpRequest) -> Context {
    Context::new(pool.get_ref().clone(), extract_user(req))
}

#[post("/datasets")]
pub async fn create_dataset(
    req: HttpRequest,
    pool: Data<PgPool>,
    dataset: Json<PostDatasetRequest>,
) -> Result<impl Responder, ApiError> {
    let context = dispatch_context(&pool, &req);
    let action = actions::get_action("dataset_create").expect("dataset_create is registered");
    let dataset = dataset.0;
    let result = action(
        &context,
        json!({
            "name": dataset.name,
            "title": dataset.title,
            "notes": dataset.notes,
            "tags": dataset.tags,
        }),
    )
    .await?;
    Ok(Json(result))
}

#[get("/datasets/{dataset_id}")]
pub async fn read_dataset(
    req: HttpRequest,
    pool: Data<PgPool>,
    dataset_id: Path<i64>,
) -> Result<impl Responder, ApiError> {
    let context = dispatch_context(&pool, &req);
    let action = actions::get_action("dataset_show").expect("dataset_show is registered");
    let result = action(&context, json!({ "id": *dataset_id })).await?;
    Ok(Json(result))
}

#[post("/datasets/{dataset_id}")]
pub async fn update_dataset(
    req: HttpRequest,
    pool: Data<PgPool>,
    dataset_id: Path<i64>,
    dataset: Json<UpdateDatasetRequest>,
) -> Result<impl Responder, ApiError> {
    let context = dispatch_context(&pool, &req);
    let action = actions::get_action("dataset_update").expect("dataset_update is registered");
    let dataset = dataset.0;
    let result = action(
        &context,
        json!({
            "id": *dataset_id,
            "title": dataset.title,
            "notes": dataset.notes,
            "tags": dataset.tags,
        }),
    )
    .await?;
    Ok(Json(result))
}

#[delete("/datasets/{dataset_id}")]
pub async fn delete_dataset(
    req: HttpRequest,
    pool: Data<PgPool>,
    dataset_id: Path<i64>,
) -> Result<impl Responder, ApiError> {
    let context = dispatch_context(&pool, &req);
    let action = actions::get_action("dataset_delete").expect("dataset_delete is registered");
    let result = action(&context, json!({ "id": *dataset_id })).await?;
    Ok(Json(result))
}

#[get("/datasets")]
pub async fn read_all_datasets(
    req: HttpRequest,
    pool: Data<PgPool>,
) -> Result<impl Responder, ApiError> {
    let context = dispatch_context(&pool, &req);
    let action = actions::get_action("dataset_list").expect("dataset_list is registered");
    let result = action(&context, json!({})).await?;
    Ok(Json(result))
}

/// Renders the dataset edit form.
///
/// The form posts back to itself with two submit buttons sharing the `save`
/// field name: `finish` updates the dataset and `delete` removes it. Tags are
/// repeated entries of one `tags` field.
#[get("/datasets/{dataset_id}/edit")]
pub async fn edit_dataset_page(
    req: HttpRequest,
    pool: Data<PgPool>,
    ui: Data<UiSettings>,
    dataset_id: Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let mut context = dispatch_context(&pool, &req);
    // Rendering the form is a read; the permission gate is on submission.
    context.ignore_auth = true;
    let action = actions::get_action("dataset_show").expect("dataset_show is registered");
    let dataset = action(&context, json!({ "id": *dataset_id })).await?;

    let title = dataset["title"].as_str().unwrap_or("");
    let notes = dataset["notes"].as_str().unwrap_or("");
    let name = dataset["name"].as_str().unwrap_or("");
    let tags = dataset["tags"]
        .as_array()
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t.as_str())
                .map(|t| format!(r#"<input type="text" name="tags" value="{t}">"#))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    let body = if ui.legacy {
        format!(
            r#"<html><body><table><tr><td>
<form action="/datasets/{id}/edit" method="post">
<b>{name}</b>
<input type="text" name="title" value="{title}">
<textarea name="notes">{notes}</textarea>
{tags}
<input type="submit" name="save" value="finish">
<input type="submit" name="save" value="delete">
</form>
</td></tr></table></body></html>"#,
            id = *dataset_id,
        )
    } else {
        format!(
            r#"<html><body>
<form action="/datasets/{id}/edit" method="post">
<h1>{name}</h1>
<input type="text" name="title" value="{title}">
<textarea name="notes">{notes}</textarea>
{tags}
<button type="submit" name="save" value="finish">Save</button>
<button type="submit" name="save" value="delete">Delete</button>
</form>
</body></html>"#,
            id = *dataset_id,
        )
    };

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// Handles the edit form submission.
///
/// The payload arrives as raw urlencoded pairs because `tags` repeats and the
/// pressed submit button decides what happens.
#[post("/datasets/{dataset_id}/edit")]
pub async fn edit_dataset_submit(
    req: HttpRequest,
    pool: Data<PgPool>,
    dataset_id: Path<i64>,
    form: Form<Vec<(String, String)>>,
) -> Result<impl Responder, ApiError> {
    let context = dispatch_context(&pool, &req);

    let mut title = None;
    let mut notes = None;
    let mut tags = Vec::new();
    let mut save = None;
    for (name, value) in form.0 {
        match name.as_str() {
            "title" => title = Some(value),
            "notes" => notes = Some(value),
            "tags" => tags.push(value),
            "save" => save = Some(value),
            _ => {}
        }
    }

    let result = match save.as_deref() {
        Some("delete") => {
            let action =
                actions::get_action("dataset_delete").expect("dataset_delete is registered");
            action(&context, json!({ "id": *dataset_id })).await?
        }
        _ => {
            let action =
                actions::get_action("dataset_update").expect("dataset_update is registered");
            action(
                &context,
                json!({
                    "id": *dataset_id,
                    "title": title,
                    "notes": notes,
                    "tags": tags,
                }),
            )
            .await?
        }
    };

    Ok(Json(result))
}
