//! # Form payloads and page view models
//!
//! Conventions:
//! - `*Form`  → deserialized from an `application/x-www-form-urlencoded` body and
//!   serialized back (minus secrets) when the form is re-rendered
//! - `*Data`  → the `data` member of a rendered [`crate::views::Page`]
//! - Field errors are collected into [`FormErrors`], keyed by form field name

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::models::habit::{HabitView, IMPORTANCE_CHOICES};
use crate::models::journal::Journal;
use crate::models::mood::{Mood, MoodLabel};
use crate::models::schedule::DayCode;

// ============================================================================
// Field errors
// ============================================================================

/// Per-field error messages, rendered next to the offending inputs.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Runs the form's `validator` rules and collects their messages.
    pub fn validate(form: &impl Validate) -> Self {
        match form.validate() {
            Ok(()) => Self::default(),
            Err(errors) => Self::from(errors),
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FormErrors::default();
        for (field, field_errors) in errors.field_errors() {
            for err in field_errors {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", err.code));
                out.add(field, message);
            }
        }
        out
    }
}

/// A form as handed to the page: what was submitted and what was wrong with it.
#[derive(Debug, Default, Serialize)]
pub struct FormView<T: Serialize> {
    pub values: T,
    pub errors: FormErrors,
}

impl<T: Serialize + Default> FormView<T> {
    pub fn blank() -> Self {
        Self {
            values: T::default(),
            errors: FormErrors::default(),
        }
    }
}

// ============================================================================
// Auth
// ============================================================================

/// POST /register
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct RegistrationForm {
    #[serde(default)]
    #[validate(length(min = 2, max = 20, message = "Field must be between 2 and 20 characters long."))]
    pub username: String,

    #[serde(default)]
    #[validate(
        email(message = "Invalid email address."),
        length(max = 120, message = "Field cannot be longer than 120 characters.")
    )]
    pub email: String,

    #[serde(default, skip_serializing)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,

    #[serde(default, skip_serializing)]
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn check(&self) -> FormErrors {
        let mut errors = FormErrors::validate(self);
        if self.confirm_password.is_empty() {
            errors.add("confirm_password", "This field is required.");
        } else if self.confirm_password != self.password {
            errors.add("confirm_password", "Field must be equal to password.");
        }
        errors
    }
}

/// POST /login
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 2, max = 20, message = "Field must be between 2 and 20 characters long."))]
    pub username: String,

    #[serde(default, skip_serializing)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
}

// ============================================================================
// Home: journal and mood
// ============================================================================

/// POST /home/journal
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct JournalForm {
    #[serde(default)]
    pub entry: String,
}

impl JournalForm {
    pub fn check(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        if self.entry.trim().is_empty() {
            errors.add("entry", "This field is required.");
        }
        errors
    }
}

/// POST /home/mood. `mood` is the label of the pressed button.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MoodForm {
    #[serde(default)]
    pub mood: Option<String>,
}

impl MoodForm {
    pub fn parse(&self) -> Result<MoodLabel, FormErrors> {
        let mut errors = FormErrors::default();
        match self.mood.as_deref().map(str::parse::<MoodLabel>) {
            Some(Ok(label)) => return Ok(label),
            Some(Err(())) => errors.add("mood", "Not a valid choice."),
            None => errors.add("mood", "Pick a mood."),
        }
        Err(errors)
    }
}

#[derive(Debug, Serialize)]
pub struct MoodFormView {
    pub choices: [MoodLabel; 5],
    pub errors: FormErrors,
}

impl MoodFormView {
    pub fn new(errors: FormErrors) -> Self {
        Self {
            choices: MoodLabel::ALL,
            errors,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HomeData {
    pub today: NaiveDate,
    pub habits: Vec<HabitView>,
    /// Absent once today's entry is written.
    pub journal_form: Option<FormView<JournalForm>>,
    /// Absent once today's mood is logged.
    pub mood_form: Option<MoodFormView>,
}

// ============================================================================
// Habits
// ============================================================================

/// POST /habits/add. `days` repeats once per ticked checkbox.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct AddHabitForm {
    #[serde(default)]
    #[validate(length(min = 2, max = 50, message = "Field must be between 2 and 50 characters long."))]
    pub description: String,

    #[serde(default)]
    pub importance: Option<String>,

    #[serde(default)]
    pub days: Vec<String>,
}

/// A habit form that passed every check.
#[derive(Debug, PartialEq)]
pub struct ValidHabit {
    pub description: String,
    pub importance: i16,
    pub days: Vec<DayCode>,
}

impl AddHabitForm {
    /// Length rules apply to the trimmed description.
    pub fn parse(&self) -> Result<ValidHabit, FormErrors> {
        let trimmed = AddHabitForm {
            description: self.description.trim().to_string(),
            ..self.clone()
        };
        let mut errors = FormErrors::validate(&trimmed);

        let importance = match self.importance.as_deref().map(str::trim) {
            None | Some("") => Some(0),
            Some(raw) => raw
                .parse::<i16>()
                .ok()
                .filter(|level| IMPORTANCE_CHOICES.iter().any(|(choice, _)| choice == level)),
        };
        if importance.is_none() {
            errors.add("importance", "Not a valid choice.");
        }

        let mut days = Vec::with_capacity(self.days.len());
        for raw in &self.days {
            match raw.parse::<DayCode>() {
                Ok(code) => days.push(code),
                Err(()) => errors.add("days", format!("'{}' is not a valid choice for this field.", raw)),
            }
        }

        match importance {
            Some(importance) if errors.is_empty() => Ok(ValidHabit {
                description: trimmed.description,
                importance,
                days,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DayChoice {
    pub code: DayCode,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ImportanceChoice {
    pub value: i16,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AddHabitData {
    pub form: FormView<AddHabitForm>,
    pub importance_choices: Vec<ImportanceChoice>,
    pub day_choices: Vec<DayChoice>,
}

impl AddHabitData {
    pub fn new(form: FormView<AddHabitForm>) -> Self {
        Self {
            form,
            importance_choices: IMPORTANCE_CHOICES
                .iter()
                .map(|&(value, label)| ImportanceChoice { value, label })
                .collect(),
            day_choices: DayCode::ALL
                .into_iter()
                .map(|code| DayChoice {
                    code,
                    label: code.label(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HabitsData {
    pub habits: Vec<HabitView>,
}

// ============================================================================
// History pages
// ============================================================================

#[derive(Debug, Serialize)]
pub struct JournalsData {
    pub journals: Vec<Journal>,
}

#[derive(Debug, Serialize)]
pub struct MoodsData {
    pub moods: Vec<Mood>,
}

/// GET /calendar?month=YYYY-MM
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub weekday: DayCode,
    pub mood: Option<MoodLabel>,
    pub has_journal: bool,
}

#[derive(Debug, Serialize)]
pub struct CalendarData {
    /// `YYYY-MM`
    pub month: String,
    pub previous_month: String,
    pub next_month: String,
    pub days: Vec<CalendarDay>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn habit_form(description: &str, importance: Option<&str>, days: &[&str]) -> AddHabitForm {
        AddHabitForm {
            description: description.into(),
            importance: importance.map(String::from),
            days: days.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_registration_requires_matching_confirmation() {
        let mut form = RegistrationForm {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "hunter22".into(),
            confirm_password: "hunter22".into(),
        };
        assert!(form.check().is_empty());

        form.confirm_password = "hunter23".into();
        let errors = form.check();
        assert_eq!(
            errors.get("confirm_password").unwrap(),
            &["Field must be equal to password.".to_string()]
        );
    }

    #[test]
    fn test_registration_field_rules() {
        let form = RegistrationForm {
            username: "a".into(),
            email: "not-an-email".into(),
            password: String::new(),
            confirm_password: String::new(),
        };
        let errors = form.check();
        assert!(errors.get("username").is_some());
        assert!(errors.get("email").is_some());
        assert!(errors.get("password").is_some());
        assert!(errors.get("confirm_password").is_some());
    }

    /// A syntactically valid address exactly `len` characters long.
    fn email_of_len(len: usize) -> String {
        format!("ada@{}.{}.com", "a".repeat(60), "b".repeat(len - 69))
    }

    #[test]
    fn test_registration_email_fits_the_users_table() {
        let mut form = RegistrationForm {
            username: "ada".into(),
            email: email_of_len(120),
            password: "hunter22".into(),
            confirm_password: "hunter22".into(),
        };
        assert_eq!(form.email.len(), 120);
        assert!(form.check().is_empty());

        form.email = email_of_len(121);
        assert_eq!(
            form.check().get("email").unwrap(),
            &["Field cannot be longer than 120 characters.".to_string()]
        );
    }

    #[test]
    fn test_journal_entry_must_not_be_blank() {
        let form = JournalForm {
            entry: "   \n".into(),
        };
        assert!(form.check().get("entry").is_some());
        let form = JournalForm {
            entry: "Walked by the river.".into(),
        };
        assert!(form.check().is_empty());
    }

    #[test]
    fn test_mood_form_parses_labels() {
        let form = MoodForm {
            mood: Some("Excited".into()),
        };
        assert_eq!(form.parse().unwrap(), MoodLabel::Excited);

        let form = MoodForm {
            mood: Some("Bored".into()),
        };
        assert!(form.parse().unwrap_err().get("mood").is_some());
        assert!(MoodForm::default().parse().is_err());
    }

    #[test]
    fn test_habit_form_maps_days_and_importance() {
        let parsed = habit_form("Read 20 pages", Some("2"), &["sun", "wed"])
            .parse()
            .unwrap();
        assert_eq!(
            parsed,
            ValidHabit {
                description: "Read 20 pages".into(),
                importance: 2,
                days: vec![DayCode::Sun, DayCode::Wed],
            }
        );

        let parsed = habit_form("Stretch", None, &[]).parse().unwrap();
        assert_eq!(parsed.importance, 0);
        assert!(parsed.days.is_empty());
    }

    #[test]
    fn test_habit_form_rejects_bad_choices() {
        let errors = habit_form("x", Some("7"), &["mon", "funday"])
            .parse()
            .unwrap_err();
        assert!(errors.get("description").is_some());
        assert!(errors.get("importance").is_some());
        assert_eq!(errors.get("days").unwrap().len(), 1);
    }

    #[test]
    fn test_habit_description_length_ignores_padding() {
        assert!(habit_form("   ", None, &["mon"])
            .parse()
            .unwrap_err()
            .get("description")
            .is_some());
        assert!(habit_form(" a ", None, &["mon"])
            .parse()
            .unwrap_err()
            .get("description")
            .is_some());

        let parsed = habit_form("  Run  ", None, &["mon"]).parse().unwrap();
        assert_eq!(parsed.description, "Run");
    }
}
