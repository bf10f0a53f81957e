use sqlx::{postgres::PgRow, PgPool, Row};

pub struct Dataset {
    pub id: i64,
    pub name: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub owner: String,
    pub tags: Vec<String>,
}

pub async fn create_dataset(
    pool: &PgPool,
    name: &str,
    title: Option<&str>,
    notes: Option<&str>,
    owner: &str,
    tags: &[String],
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        insert into datasets (name, title, notes, owner, tags)
        values ($1, $2, $3, $4, $5)
        returning id
        "#,
    )
    .bind(name)
    .bind(title)
    .bind(notes)
    .bind(owner)
    .bind(tags)
    .fetch_one(pool)
    .await?;

    row.try_get("id")
}

pub async fn read_dataset(pool: &PgPool, dataset_id: i64) -> Result<Option<Dataset>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        select id, name, title, notes, owner, tags
        from datasets
        where id = $1
        "#,
    )
    .bind(dataset_id)
    .fetch_optional(pool)
    .await?;

    row.map(dataset_from_row).transpose()
}

pub async fn read_dataset_by_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<Dataset>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        select id, name, title, notes, owner, tags
        from datasets
        where name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    row.map(dataset_from_row).transpose()
}

pub async fn update_dataset(
    pool: &PgPool,
    dataset_id: i64,
    title: Option<&str>,
    notes: Option<&str>,
    tags: &[String],
) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        update datasets
        set title = $1, notes = $2, tags = $3
        where id = $4
        returning id
        "#,
    )
    .bind(title)
    .bind(notes)
    .bind(tags)
    .bind(dataset_id)
    .fetch_optional(pool)
    .await?;

    row.map(|r| r.try_get("id")).transpose()
}

pub async fn delete_dataset(pool: &PgPool, dataset_id: i64) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        delete from datasets
        where id = $1
        returning id
        "#,
    )
    .bind(dataset_id)
    .fetch_optional(pool)
    .await?;

    row.map(|r| r.try_get("id")).transpose()
}

pub async fn read_all_datasets(pool: &PgPool) -> Result<Vec<Dataset>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        select id, name, title, notes, owner, tags
        from datasets
        order by id
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(dataset_from_row).collect()
}

fn dataset_from_row(row: PgRow) -> Result<Dataset, sqlx::Error> {
    Ok(Dataset {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        title: row.try_get("title")?,
        notes: row.try_get("notes")?,
        owner: row.try_get("owner")?,
        tags: row.try_get("tags")?,
    })
}
