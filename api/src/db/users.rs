use sqlx::{PgPool, Row};

pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub sysadmin: bool,
}

pub async fn create_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    sysadmin: bool,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        insert into users (name, email, sysadmin)
        values ($1, $2, $3)
        returning id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(sysadmin)
    .fetch_one(pool)
    .await?;

    row.try_get("id")
}

pub async fn read_user(pool: &PgPool, user_id: i64) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        select id, name, email, sysadmin
        from users
        where id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.map(user_from_row).transpose()
}

pub async fn read_user_by_name(pool: &PgPool, name: &str) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        select id, name, email, sysadmin
        from users
        where name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    row.map(user_from_row).transpose()
}

fn user_from_row(row: sqlx::postgres::PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        sysadmin: row.try_get("sysadmin")?,
    })
}
