use async_trait::async_trait;
use chrono::{NaiveDate, Weekday};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::JournalStore;
use crate::error::{AppError, AppResult};
use crate::models::habit::{Habit, NewHabit};
use crate::models::journal::Journal;
use crate::models::mood::{Mood, MoodLabel};
use crate::models::schedule::day_column;
use crate::models::user::{NewUser, User};

pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Unique violations become conflicts; everything else stays a database error.
fn unique_violation_as_conflict(err: sqlx::Error, message: impl Fn(Option<&str>) -> String) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::Conflict(message(db_err.constraint()));
        }
    }
    AppError::Database(err)
}

#[async_trait]
impl JournalStore for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.db)
            .await?;
        Ok(())
    }

    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            unique_violation_as_conflict(e, |constraint| match constraint {
                Some("users_email_key") => "That email is already registered".into(),
                _ => "That username is taken".into(),
            })
        })
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn username_taken(&self, username: &str) -> AppResult<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn email_taken(&self, email: &str) -> AppResult<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn insert_journal(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        entry: &str,
    ) -> AppResult<Option<Journal>> {
        let journal = sqlx::query_as::<_, Journal>(
            r#"
            INSERT INTO journals (id, user_id, entry_date, entry)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, entry_date) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .bind(entry)
        .fetch_optional(&self.db)
        .await?;
        Ok(journal)
    }

    async fn journal_for_date(&self, user_id: Uuid, date: NaiveDate) -> AppResult<Option<Journal>> {
        let journal = sqlx::query_as::<_, Journal>(
            "SELECT * FROM journals WHERE user_id = $1 AND entry_date = $2",
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?;
        Ok(journal)
    }

    async fn list_journals(&self, user_id: Uuid) -> AppResult<Vec<Journal>> {
        let journals = sqlx::query_as::<_, Journal>(
            "SELECT * FROM journals WHERE user_id = $1 ORDER BY entry_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(journals)
    }

    async fn journals_between(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Journal>> {
        let journals = sqlx::query_as::<_, Journal>(
            r#"
            SELECT * FROM journals
            WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
            ORDER BY entry_date ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;
        Ok(journals)
    }

    async fn insert_mood(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        mood: MoodLabel,
    ) -> AppResult<Option<Mood>> {
        let mood = sqlx::query_as::<_, Mood>(
            r#"
            INSERT INTO moods (id, user_id, mood_date, mood)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, mood_date) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .bind(mood)
        .fetch_optional(&self.db)
        .await?;
        Ok(mood)
    }

    async fn mood_for_date(&self, user_id: Uuid, date: NaiveDate) -> AppResult<Option<Mood>> {
        let mood = sqlx::query_as::<_, Mood>(
            "SELECT * FROM moods WHERE user_id = $1 AND mood_date = $2",
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?;
        Ok(mood)
    }

    async fn list_moods(&self, user_id: Uuid) -> AppResult<Vec<Mood>> {
        let moods = sqlx::query_as::<_, Mood>(
            "SELECT * FROM moods WHERE user_id = $1 ORDER BY mood_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(moods)
    }

    async fn moods_between(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Mood>> {
        let moods = sqlx::query_as::<_, Mood>(
            r#"
            SELECT * FROM moods
            WHERE user_id = $1 AND mood_date BETWEEN $2 AND $3
            ORDER BY mood_date ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;
        Ok(moods)
    }

    async fn create_habit(&self, user_id: Uuid, new_habit: NewHabit) -> AppResult<Habit> {
        let days = new_habit.days;
        sqlx::query_as::<_, Habit>(
            r#"
            INSERT INTO habits (id, user_id, description, importance,
                                sunday, monday, tuesday, wednesday, thursday, friday, saturday)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&new_habit.description)
        .bind(new_habit.importance)
        .bind(days.sunday)
        .bind(days.monday)
        .bind(days.tuesday)
        .bind(days.wednesday)
        .bind(days.thursday)
        .bind(days.friday)
        .bind(days.saturday)
        .fetch_one(&self.db)
        .await
        .map_err(|e| unique_violation_as_conflict(e, |_| "You already track that habit".into()))
    }

    async fn list_habits(&self, user_id: Uuid) -> AppResult<Vec<Habit>> {
        let habits = sqlx::query_as::<_, Habit>(
            "SELECT * FROM habits WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(habits)
    }

    async fn habits_due_on(&self, user_id: Uuid, day: Weekday) -> AppResult<Vec<Habit>> {
        let sql = format!(
            "SELECT * FROM habits WHERE user_id = $1 AND {} ORDER BY created_at ASC",
            day_column(day)
        );
        let habits = sqlx::query_as::<_, Habit>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;
        Ok(habits)
    }

    async fn delete_habit(&self, user_id: Uuid, habit_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM habits WHERE id = $1 AND user_id = $2")
            .bind(habit_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
