use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coach_core::{Coach, CoachError, CoachRepository, CoachResult, UpdateCoachCommand};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

const SELECT_COACH: &str =
    r#"SELECT id, name, description, photo, created_time, updated_time FROM "coach""#;

pub struct PgCoachRepository {
    pool: PgPool,
}

impl PgCoachRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> CoachResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| CoachError::remote("coach_repository.connect", e))?;
        tracing::info!(max_connections, "connected to postgres");
        Ok(Self::new(pool))
    }
}

/// `UPDATE` touching only the columns the command overwrites.
fn update_query(cmd: &UpdateCoachCommand) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(r#"UPDATE "coach" SET "#);
    {
        let mut set = query.separated(", ");
        for (field, value) in cmd.set_fields() {
            set.push(format!("{field} = "));
            set.push_bind_unseparated(value.to_string());
        }
        set.push("updated_time = ");
        set.push_bind_unseparated(cmd.updated_time);
    }
    query.push(" WHERE id = ");
    query.push_bind(cmd.id);
    query
}

fn row_to_coach(row: &PgRow) -> Result<Coach, sqlx::Error> {
    Ok(Coach {
        id: row.try_get::<Uuid, _>("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        photo: row.try_get::<Option<String>, _>("photo")?.unwrap_or_default(),
        created_time: row.try_get::<DateTime<Utc>, _>("created_time")?,
        updated_time: row.try_get::<DateTime<Utc>, _>("updated_time")?,
    })
}

#[async_trait]
impl CoachRepository for PgCoachRepository {
    async fn create(&self, coach: Coach) -> CoachResult<Coach> {
        sqlx::query(
            r#"
            INSERT INTO "coach" (id, name, description, photo, created_time, updated_time)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(coach.id)
        .bind(&coach.name)
        .bind(&coach.description)
        .bind(&coach.photo)
        .bind(coach.created_time)
        .bind(coach.updated_time)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(coach_id = %coach.id, error = %e, "failed to insert coach");
            CoachError::remote("coach_repository.create", e)
        })?;

        Ok(coach)
    }

    async fn get_by_id(&self, id: Uuid) -> CoachResult<Coach> {
        let sql = format!("{SELECT_COACH} WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CoachError::remote("coach_repository.get_by_id", e))?;

        match row {
            Some(row) => {
                row_to_coach(&row).map_err(|e| CoachError::remote("coach_repository.get_by_id", e))
            }
            None => Err(CoachError::not_found("Coach", id.to_string())),
        }
    }

    async fn update(&self, cmd: &UpdateCoachCommand) -> CoachResult<()> {
        let mut query = update_query(cmd);
        query.build().execute(&self.pool).await.map_err(|e| {
            tracing::error!(coach_id = %cmd.id, error = %e, "failed to update coach");
            CoachError::remote("coach_repository.update", e)
        })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> CoachResult<()> {
        sqlx::query(r#"DELETE FROM "coach" WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| CoachError::remote("coach_repository.delete", e))?;
        Ok(())
    }

    async fn list_all(&self) -> CoachResult<Vec<Coach>> {
        let sql = format!("{SELECT_COACH} ORDER BY created_time, id");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CoachError::remote("coach_repository.list_all", e))?;

        rows.iter()
            .map(row_to_coach)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CoachError::remote("coach_repository.list_all", e))
    }
}
