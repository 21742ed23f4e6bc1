use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// Development seed: template catalog and trainer roster. Idempotent, each
/// block is skipped once its table has rows.
pub async fn seed_development_data(db: &PgPool) -> anyhow::Result<()> {
    seed_templates(db).await?;
    seed_trainers_and_schedules(db).await?;
    Ok(())
}

async fn seed_templates(db: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM templates"#)
        .fetch_one(db)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let templates = [
        ("Beginner Full Body", "3x/week full body plan untuk pemula."),
        ("Push Pull Legs", "Split PPL untuk intermediate (6 hari / minggu)."),
        ("Fat Loss Starter", "Kombinasi strength + cardio ringan."),
    ];
    for (name, description) in templates {
        sqlx::query(r#"INSERT INTO templates (name, description) VALUES ($1, $2)"#)
            .bind(name)
            .bind(description)
            .execute(db)
            .await?;
    }

    info!("seeded workout templates");
    Ok(())
}

async fn seed_trainers_and_schedules(db: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM trainers"#)
        .fetch_one(db)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let trainers = [
        ("Raka Putra", "Strength coach. Fokus compound lifts.", "Strength"),
        ("Nadia Sari", "Fat loss & mobility. Friendly untuk pemula.", "Fat Loss"),
        ("Dimas Pratama", "Hypertrophy programming.", "Hypertrophy"),
    ];
    for (name, bio, specialty) in trainers {
        let trainer_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO trainers (name, bio, specialty)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(bio)
        .bind(specialty)
        .fetch_one(db)
        .await?;

        // Mon / Wed / Fri evening slots
        for day_of_week in [1, 3, 5] {
            sqlx::query(
                r#"
                INSERT INTO trainer_schedules (trainer_id, day_of_week, start_time, end_time, location)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(trainer_id)
            .bind(day_of_week)
            .bind("17:00")
            .bind("20:00")
            .bind("Main Floor")
            .execute(db)
            .await?;
        }
    }

    info!("seeded trainers and schedules");
    Ok(())
}
