use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Mood {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood_date: NaiveDate,
    pub mood: MoodLabel,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "mood_label")]
pub enum MoodLabel {
    Happy,
    Excited,
    Sad,
    Angry,
    Scared,
}

impl MoodLabel {
    /// Button order on the mood form.
    pub const ALL: [MoodLabel; 5] = [
        MoodLabel::Happy,
        MoodLabel::Excited,
        MoodLabel::Sad,
        MoodLabel::Angry,
        MoodLabel::Scared,
    ];
}

impl std::str::FromStr for MoodLabel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoodLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

impl MoodLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            MoodLabel::Happy => "Happy",
            MoodLabel::Excited => "Excited",
            MoodLabel::Sad => "Sad",
            MoodLabel::Angry => "Angry",
            MoodLabel::Scared => "Scared",
        }
    }
}
