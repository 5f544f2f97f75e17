use async_trait::async_trait;
use chrono::{NaiveDate, Utc, Weekday};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::JournalStore;
use crate::error::{AppError, AppResult};
use crate::models::habit::{Habit, NewHabit};
use crate::models::journal::Journal;
use crate::models::mood::{Mood, MoodLabel};
use crate::models::schedule::due_on;
use crate::models::user::{NewUser, User};

/// In-process store with the same uniqueness rules as the Postgres schema.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    journals: Vec<Journal>,
    moods: Vec<Mood>,
    habits: Vec<Habit>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JournalStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        let mut tables = self.inner.lock().await;
        if tables.users.iter().any(|u| u.username == new_user.username) {
            return Err(AppError::Conflict("That username is taken".into()));
        }
        if tables.users.iter().any(|u| u.email == new_user.email) {
            return Err(AppError::Conflict("That email is already registered".into()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let tables = self.inner.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.inner.lock().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn username_taken(&self, username: &str) -> AppResult<bool> {
        let tables = self.inner.lock().await;
        Ok(tables.users.iter().any(|u| u.username == username))
    }

    async fn email_taken(&self, email: &str) -> AppResult<bool> {
        let tables = self.inner.lock().await;
        Ok(tables.users.iter().any(|u| u.email == email))
    }

    async fn insert_journal(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        entry: &str,
    ) -> AppResult<Option<Journal>> {
        let mut tables = self.inner.lock().await;
        if tables
            .journals
            .iter()
            .any(|j| j.user_id == user_id && j.entry_date == date)
        {
            return Ok(None);
        }

        let journal = Journal {
            id: Uuid::new_v4(),
            user_id,
            entry_date: date,
            entry: entry.to_string(),
            created_at: Utc::now(),
        };
        tables.journals.push(journal.clone());
        Ok(Some(journal))
    }

    async fn journal_for_date(&self, user_id: Uuid, date: NaiveDate) -> AppResult<Option<Journal>> {
        let tables = self.inner.lock().await;
        Ok(tables
            .journals
            .iter()
            .find(|j| j.user_id == user_id && j.entry_date == date)
            .cloned())
    }

    async fn list_journals(&self, user_id: Uuid) -> AppResult<Vec<Journal>> {
        let tables = self.inner.lock().await;
        let mut journals: Vec<Journal> = tables
            .journals
            .iter()
            .filter(|j| j.user_id == user_id)
            .cloned()
            .collect();
        journals.sort_by(|a, b| b.entry_date.cmp(&a.entry_date));
        Ok(journals)
    }

    async fn journals_between(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Journal>> {
        let tables = self.inner.lock().await;
        let mut journals: Vec<Journal> = tables
            .journals
            .iter()
            .filter(|j| j.user_id == user_id && (start..=end).contains(&j.entry_date))
            .cloned()
            .collect();
        journals.sort_by_key(|j| j.entry_date);
        Ok(journals)
    }

    async fn insert_mood(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        mood: MoodLabel,
    ) -> AppResult<Option<Mood>> {
        let mut tables = self.inner.lock().await;
        if tables
            .moods
            .iter()
            .any(|m| m.user_id == user_id && m.mood_date == date)
        {
            return Ok(None);
        }

        let mood = Mood {
            id: Uuid::new_v4(),
            user_id,
            mood_date: date,
            mood,
            created_at: Utc::now(),
        };
        tables.moods.push(mood.clone());
        Ok(Some(mood))
    }

    async fn mood_for_date(&self, user_id: Uuid, date: NaiveDate) -> AppResult<Option<Mood>> {
        let tables = self.inner.lock().await;
        Ok(tables
            .moods
            .iter()
            .find(|m| m.user_id == user_id && m.mood_date == date)
            .cloned())
    }

    async fn list_moods(&self, user_id: Uuid) -> AppResult<Vec<Mood>> {
        let tables = self.inner.lock().await;
        let mut moods: Vec<Mood> = tables
            .moods
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        moods.sort_by(|a, b| b.mood_date.cmp(&a.mood_date));
        Ok(moods)
    }

    async fn moods_between(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Mood>> {
        let tables = self.inner.lock().await;
        let mut moods: Vec<Mood> = tables
            .moods
            .iter()
            .filter(|m| m.user_id == user_id && (start..=end).contains(&m.mood_date))
            .cloned()
            .collect();
        moods.sort_by_key(|m| m.mood_date);
        Ok(moods)
    }

    async fn create_habit(&self, user_id: Uuid, new_habit: NewHabit) -> AppResult<Habit> {
        let mut tables = self.inner.lock().await;
        if tables
            .habits
            .iter()
            .any(|h| h.user_id == user_id && h.description == new_habit.description)
        {
            return Err(AppError::Conflict("You already track that habit".into()));
        }

        let habit = Habit {
            id: Uuid::new_v4(),
            user_id,
            description: new_habit.description,
            importance: new_habit.importance,
            days: new_habit.days,
            created_at: Utc::now(),
        };
        tables.habits.push(habit.clone());
        Ok(habit)
    }

    async fn list_habits(&self, user_id: Uuid) -> AppResult<Vec<Habit>> {
        let tables = self.inner.lock().await;
        Ok(tables
            .habits
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn habits_due_on(&self, user_id: Uuid, day: Weekday) -> AppResult<Vec<Habit>> {
        let tables = self.inner.lock().await;
        Ok(due_on(
            tables.habits.iter().filter(|h| h.user_id == user_id),
            day,
        ))
    }

    async fn delete_habit(&self, user_id: Uuid, habit_id: Uuid) -> AppResult<bool> {
        let mut tables = self.inner.lock().await;
        let before = tables.habits.len();
        tables
            .habits
            .retain(|h| !(h.id == habit_id && h.user_id == user_id));
        Ok(tables.habits.len() < before)
    }
}
