use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tower_sessions::Session;

use crate::auth::{
    password::{hash_password, verify_password},
    session::{current_user, log_in, log_out},
};
use crate::dto::{FormErrors, FormView, LoginForm, RegistrationForm};
use crate::error::{AppError, AppResult};
use crate::flash;
use crate::models::user::NewUser;
use crate::views::{render, render_with_status};
use crate::AppState;

/// Shown for an unknown username and for a wrong password alike.
pub const LOGIN_FAILED: &str = "incorrect username or password";

pub async fn register_form(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Response> {
    let user = current_user(&state, &session).await?;
    render(
        &session,
        "register",
        user.as_ref(),
        FormView::<RegistrationForm>::blank(),
    )
    .await
}

pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(mut form): Form<RegistrationForm>,
) -> AppResult<Response> {
    form.username = form.username.trim().to_string();
    form.email = form.email.trim().to_string();

    let mut errors = form.check();
    if errors.is_empty() {
        if state.store.username_taken(&form.username).await? {
            errors.add("username", "That username is taken. Please choose a different one.");
        }
        if state.store.email_taken(&form.email).await? {
            errors.add("email", "That email is already registered.");
        }
        if !errors.is_empty() {
            flash::failure(&session, "That username or email is already in use").await?;
        }
    }
    if !errors.is_empty() {
        return rerender_registration(&session, form, errors).await;
    }

    let password_hash = hash_password(&form.password)?;
    let created = state
        .store
        .create_user(NewUser {
            username: form.username.clone(),
            email: form.email.clone(),
            password_hash,
        })
        .await;

    let user = match created {
        Ok(user) => user,
        // Lost a race with a concurrent registration of the same name.
        Err(AppError::Conflict(message)) => {
            flash::failure(&session, message.as_str()).await?;
            let mut errors = FormErrors::default();
            errors.add("username", message);
            return rerender_registration(&session, form, errors).await;
        }
        Err(e) => return Err(e),
    };

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");
    flash::success(
        &session,
        format!("Digital Bullet Journal account created for {}!!", user.username),
    )
    .await?;
    Ok(Redirect::to("/login").into_response())
}

async fn rerender_registration(
    session: &Session,
    form: RegistrationForm,
    errors: FormErrors,
) -> AppResult<Response> {
    render_with_status(
        session,
        StatusCode::UNPROCESSABLE_ENTITY,
        "register",
        None,
        FormView {
            values: form,
            errors,
        },
    )
    .await
}

pub async fn login_form(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let user = current_user(&state, &session).await?;
    render(&session, "login", user.as_ref(), FormView::<LoginForm>::blank()).await
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let errors = FormErrors::validate(&form);
    if !errors.is_empty() {
        return render_with_status(
            &session,
            StatusCode::UNPROCESSABLE_ENTITY,
            "login",
            None,
            FormView {
                values: form,
                errors,
            },
        )
        .await;
    }

    let user = state.store.find_user_by_username(&form.username).await?;
    let user = match user {
        Some(user) if verify_password(&form.password, &user.password_hash)? => user,
        _ => {
            tracing::warn!(username = %form.username, "Failed login attempt");
            flash::failure(&session, LOGIN_FAILED).await?;
            return render_with_status(
                &session,
                StatusCode::UNAUTHORIZED,
                "login",
                None,
                FormView {
                    values: form,
                    errors: FormErrors::default(),
                },
            )
            .await;
        }
    };

    log_in(&session, user.id).await?;
    tracing::info!(user_id = %user.id, "User logged in");
    flash::success(&session, format!("welcome {}!", user.username)).await?;
    Ok(Redirect::to("/home").into_response())
}

pub async fn logout(session: Session) -> AppResult<Redirect> {
    log_out(&session).await?;
    Ok(Redirect::to("/login"))
}
