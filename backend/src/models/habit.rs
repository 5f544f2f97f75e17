use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::schedule::{DayCode, DayFlags};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub importance: i16,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub days: DayFlags,
    pub created_at: DateTime<Utc>,
}

pub struct NewHabit {
    pub description: String,
    pub importance: i16,
    pub days: DayFlags,
}

/// Importance choices offered by the add-habit form.
pub const IMPORTANCE_CHOICES: [(i16, &str); 4] = [(0, "None"), (1, "!"), (2, "!!"), (3, "!!!")];

pub fn importance_marks(importance: i16) -> &'static str {
    IMPORTANCE_CHOICES
        .iter()
        .find(|(level, _)| *level == importance)
        .map(|(_, marks)| *marks)
        .unwrap_or("None")
}

/// A habit as listed on the habits and home pages.
#[derive(Debug, Serialize)]
pub struct HabitView {
    #[serde(flatten)]
    pub habit: Habit,
    pub importance_marks: &'static str,
    pub day_codes: Vec<DayCode>,
}

impl From<Habit> for HabitView {
    fn from(habit: Habit) -> Self {
        Self {
            importance_marks: importance_marks(habit.importance),
            day_codes: habit.days.codes(),
            habit,
        }
    }
}
