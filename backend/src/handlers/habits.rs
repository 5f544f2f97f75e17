use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use axum_extra::extract::Form;
use tower_sessions::Session;
use uuid::Uuid;

use crate::auth::middleware::CurrentUser;
use crate::dto::{AddHabitData, AddHabitForm, FormErrors, FormView, HabitsData};
use crate::error::{AppError, AppResult};
use crate::flash;
use crate::models::habit::{HabitView, NewHabit};
use crate::models::schedule::DayFlags;
use crate::models::user::User;
use crate::views::{render, render_with_status};
use crate::AppState;

pub async fn list_habits(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    session: Session,
) -> AppResult<Response> {
    let habits = state
        .store
        .list_habits(user.id)
        .await?
        .into_iter()
        .map(HabitView::from)
        .collect();

    render(&session, "habits", Some(&user), HabitsData { habits }).await
}

pub async fn add_habit_form(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    session: Session,
) -> AppResult<Response> {
    render(
        &session,
        "add_habit",
        Some(&user),
        AddHabitData::new(FormView::blank()),
    )
    .await
}

pub async fn add_habit(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    session: Session,
    Form(form): Form<AddHabitForm>,
) -> AppResult<Response> {
    let valid = match form.parse() {
        Ok(valid) => valid,
        Err(errors) => return rerender_add_habit(&session, &user, form, errors).await,
    };

    let new_habit = NewHabit {
        description: valid.description,
        importance: valid.importance,
        days: DayFlags::from_codes(valid.days),
    };

    match state.store.create_habit(user.id, new_habit).await {
        Ok(habit) => {
            tracing::info!(user_id = %user.id, habit_id = %habit.id, "Habit created");
            Ok(Redirect::to("/habits").into_response())
        }
        Err(AppError::Conflict(message)) => {
            flash::failure(&session, message.as_str()).await?;
            let mut errors = FormErrors::default();
            errors.add("description", message);
            rerender_add_habit(&session, &user, form, errors).await
        }
        Err(e) => Err(e),
    }
}

async fn rerender_add_habit(
    session: &Session,
    user: &User,
    form: AddHabitForm,
    errors: FormErrors,
) -> AppResult<Response> {
    render_with_status(
        session,
        StatusCode::UNPROCESSABLE_ENTITY,
        "add_habit",
        Some(user),
        AddHabitData::new(FormView {
            values: form,
            errors,
        }),
    )
    .await
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    session: Session,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Redirect> {
    if !state.store.delete_habit(user.id, habit_id).await? {
        return Err(AppError::NotFound("Habit not found".into()));
    }

    tracing::info!(user_id = %user.id, habit_id = %habit_id, "Habit deleted");
    flash::success(&session, "Habit deleted.").await?;
    Ok(Redirect::to("/habits"))
}
