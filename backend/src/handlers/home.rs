use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use chrono::Datelike;
use tower_sessions::Session;

use crate::auth::middleware::CurrentUser;
use crate::auth::session::current_user;
use crate::dto::{FormErrors, FormView, HomeData, JournalForm, MoodForm, MoodFormView};
use crate::error::AppResult;
use crate::flash;
use crate::models::habit::HabitView;
use crate::models::user::User;
use crate::views::{render, render_with_status};
use crate::AppState;

const JOURNAL_ALREADY_WRITTEN: &str = "You already wrote in your journal today.";
const MOOD_ALREADY_LOGGED: &str = "You already logged your mood today.";

pub async fn landing(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let user = current_user(&state, &session).await?;
    render(&session, "index", user.as_ref(), ()).await
}

pub async fn home(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    session: Session,
) -> AppResult<Response> {
    render_home(
        &state,
        &session,
        &user,
        StatusCode::OK,
        FormView::blank(),
        FormErrors::default(),
    )
    .await
}

pub async fn journal_submit(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    session: Session,
    Form(form): Form<JournalForm>,
) -> AppResult<Response> {
    let today = state.clock.today();
    if state.store.journal_for_date(user.id, today).await?.is_some() {
        flash::failure(&session, JOURNAL_ALREADY_WRITTEN).await?;
        return Ok(Redirect::to("/home").into_response());
    }

    let errors = form.check();
    if !errors.is_empty() {
        let journal_form = FormView {
            values: form,
            errors,
        };
        return render_home(
            &state,
            &session,
            &user,
            StatusCode::UNPROCESSABLE_ENTITY,
            journal_form,
            FormErrors::default(),
        )
        .await;
    }

    match state.store.insert_journal(user.id, today, &form.entry).await? {
        Some(journal) => {
            tracing::debug!(user_id = %user.id, journal_id = %journal.id, date = %today, "Journal entry saved");
        }
        None => {
            flash::failure(&session, JOURNAL_ALREADY_WRITTEN).await?;
        }
    }
    Ok(Redirect::to("/home").into_response())
}

pub async fn mood_submit(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    session: Session,
    Form(form): Form<MoodForm>,
) -> AppResult<Response> {
    let today = state.clock.today();
    if state.store.mood_for_date(user.id, today).await?.is_some() {
        flash::failure(&session, MOOD_ALREADY_LOGGED).await?;
        return Ok(Redirect::to("/home").into_response());
    }

    let label = match form.parse() {
        Ok(label) => label,
        Err(errors) => {
            return render_home(
                &state,
                &session,
                &user,
                StatusCode::UNPROCESSABLE_ENTITY,
                FormView::blank(),
                errors,
            )
            .await;
        }
    };

    match state.store.insert_mood(user.id, today, label).await? {
        Some(mood) => {
            tracing::debug!(user_id = %user.id, mood = ?mood.mood, date = %today, "Mood logged");
        }
        // Lost a race with a concurrent submission.
        None => {
            flash::failure(&session, MOOD_ALREADY_LOGGED).await?;
        }
    }
    Ok(Redirect::to("/home").into_response())
}

/// Today's habits plus whichever of the journal and mood forms are still open.
async fn render_home(
    state: &AppState,
    session: &Session,
    user: &User,
    status: StatusCode,
    journal_form: FormView<JournalForm>,
    mood_errors: FormErrors,
) -> AppResult<Response> {
    let today = state.clock.today();
    let habits = state
        .store
        .habits_due_on(user.id, today.weekday())
        .await?
        .into_iter()
        .map(HabitView::from)
        .collect();

    let wrote_journal = state.store.journal_for_date(user.id, today).await?.is_some();
    let logged_mood = state.store.mood_for_date(user.id, today).await?.is_some();

    let data = HomeData {
        today,
        habits,
        journal_form: (!wrote_journal).then_some(journal_form),
        mood_form: (!logged_mood).then(|| MoodFormView::new(mood_errors)),
    };
    render_with_status(session, status, "home", Some(user), data).await
}
