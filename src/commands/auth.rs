// src/commands/auth.rs

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{LoginRequest, SignupRequest};
use crate::services::LibraryService;
use crate::session::Session;
use crate::utils::console;

/// Register a new admin account.
pub async fn run_signup(service: &LibraryService, request: &SignupRequest) -> Result<()> {
    console::header("Sign Up");
    let admin = service.signup(request).await?;
    console::success(&format!("Account created for {}", admin.email));
    console::sub_item("Log in with 'lms login' to continue");
    Ok(())
}

/// Check credentials and open a session.
pub async fn run_login(service: &LibraryService, data_dir: &Path, request: &LoginRequest) -> Result<()> {
    console::header("Log In");
    let Some(admin) = service.login(request).await? else {
        console::error("Invalid login details");
        return Err(AppError::validation("Invalid login details"));
    };

    let session = Session::new(admin);
    session.save(data_dir).await?;
    let who = if session.admin.name.is_empty() {
        &session.admin.email
    } else {
        &session.admin.name
    };
    console::success(&format!("Welcome, {who}"));
    Ok(())
}

pub async fn run_logout(data_dir: &Path) -> Result<()> {
    if Session::clear(data_dir).await? {
        console::success("Logged out");
    } else {
        console::info("No active session");
    }
    Ok(())
}

/// Show the logged-in admin.
pub async fn run_profile(data_dir: &Path) -> Result<()> {
    let session = Session::require(data_dir).await?;
    let admin = &session.admin;
    console::summary(
        "Profile",
        &[
            ("Name", admin.name.clone()),
            ("Email", admin.email.clone()),
            ("Gender", admin.gender.clone()),
            ("Phone", admin.phone_number.clone()),
            (
                "Logged in",
                session.logged_in_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            ),
        ],
    );
    Ok(())
}
