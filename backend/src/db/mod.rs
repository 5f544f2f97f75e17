//! Persistence for users, journal entries, moods and habits.
//!
//! Handlers only see [`JournalStore`]. [`PgStore`] backs production; [`MemoryStore`]
//! keeps everything in process for local runs without `DATABASE_URL` and for tests.
//! Both enforce the same uniqueness rules: one username/email per user, one journal
//! entry and one mood per user per day, one habit description per user.

use async_trait::async_trait;
use chrono::{NaiveDate, Weekday};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::habit::{Habit, NewHabit};
use crate::models::journal::Journal;
use crate::models::mood::{Mood, MoodLabel};
use crate::models::user::{NewUser, User};

mod memory;
mod pool;
mod postgres;

pub use memory::MemoryStore;
pub use pool::create_pool;
pub use postgres::PgStore;

#[async_trait]
pub trait JournalStore: Send + Sync {
    async fn ping(&self) -> AppResult<()>;

    async fn create_user(&self, new_user: NewUser) -> AppResult<User>;
    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn username_taken(&self, username: &str) -> AppResult<bool>;
    async fn email_taken(&self, email: &str) -> AppResult<bool>;

    /// `None` when the user already has an entry for `date`.
    async fn insert_journal(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        entry: &str,
    ) -> AppResult<Option<Journal>>;
    async fn journal_for_date(&self, user_id: Uuid, date: NaiveDate) -> AppResult<Option<Journal>>;
    /// Newest first.
    async fn list_journals(&self, user_id: Uuid) -> AppResult<Vec<Journal>>;
    async fn journals_between(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Journal>>;

    /// `None` when the user already logged a mood for `date`.
    async fn insert_mood(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        mood: MoodLabel,
    ) -> AppResult<Option<Mood>>;
    async fn mood_for_date(&self, user_id: Uuid, date: NaiveDate) -> AppResult<Option<Mood>>;
    /// Newest first.
    async fn list_moods(&self, user_id: Uuid) -> AppResult<Vec<Mood>>;
    async fn moods_between(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Mood>>;

    async fn create_habit(&self, user_id: Uuid, new_habit: NewHabit) -> AppResult<Habit>;
    /// Oldest first.
    async fn list_habits(&self, user_id: Uuid) -> AppResult<Vec<Habit>>;
    /// Habits with the flag for `day` set, oldest first.
    async fn habits_due_on(&self, user_id: Uuid, day: Weekday) -> AppResult<Vec<Habit>>;
    /// `false` when no habit with that id belongs to the user.
    async fn delete_habit(&self, user_id: Uuid, habit_id: Uuid) -> AppResult<bool>;
}

/// Opens the pool and applies pending migrations.
pub async fn connect_postgres(url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let db = create_pool(url, max_connections).await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("Database migrations applied");
    Ok(db)
}
