use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::server::AppState;
use crate::db::models::{NewUser, User};
use crate::db::repo;
use crate::error::Result;

#[derive(Debug, Deserialize)]
pub struct UserForm {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let users = repo::list_users_newest_first(&state.db).await?;
    Ok(Html(render_index(&users)))
}

/// POST /
///
/// Always redirects back to the listing. Failures are logged and dropped, the
/// browser never sees them.
pub async fn create_from_form(
    State(state): State<Arc<AppState>>,
    form: std::result::Result<Form<UserForm>, FormRejection>,
) -> Response {
    match form {
        Ok(Form(form)) => {
            let user = NewUser {
                username: form.username,
                email: form.email,
            };
            if let Err(e) = repo::insert_user(&state.db, &user).await {
                tracing::warn!("Ignoring failed form submission: {}", e);
            }
        }
        Err(rejection) => {
            tracing::warn!("Ignoring malformed form submission: {}", rejection);
        }
    }

    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

pub fn render_index(users: &[User]) -> String {
    let mut html = String::from(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Users</title>
    <style>
        body { font-family: system-ui, sans-serif; max-width: 800px; margin: 2rem auto; padding: 1rem; }
        h1 { color: #333; }
        ul { list-style: none; padding: 0; }
        li { padding: 0.5rem 0; border-bottom: 1px solid #eee; }
    </style>
</head>
<body>
    <h1>All Users</h1>
    <form action="/" method="POST">
        <input name="username" type="text" placeholder="Enter a username" required>
        <input name="email" type="email" placeholder="Enter an email address" required>
        <input type="submit" value="Submit">
    </form>
    <hr>
"#,
    );

    if users.is_empty() {
        html.push_str("    <p>No users!</p>\n");
    } else {
        html.push_str("    <ul>\n");
        for user in users {
            html.push_str(&format!(
                "        <li><strong>{}</strong> - <span>{}</span></li>\n",
                html_escape(&user.username),
                html_escape(&user.email)
            ));
        }
        html.push_str("    </ul>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
