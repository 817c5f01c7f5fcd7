// src/validation.rs

//! Form rules applied before any storage call.
//!
//! Each check returns the first violated rule as [`AppError::Validation`]
//! carrying the message the admin sees next to the field.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::{Book, LoginRequest, Reader, SignupRequest};

static ISBN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{9}[\dXx]|97[89]\d{10})$").expect("valid ISBN pattern"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[a-zA-Z]+[a-zA-Z0-9.-]*\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

static READER_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10}$").expect("valid phone pattern"));

static SIGNUP_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?\d{10}$").expect("valid phone pattern"));

const PASSWORD_SPECIALS: &str = "@$!%*?&";

fn required(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(message));
    }
    Ok(())
}

fn email(value: &str) -> Result<()> {
    required(value, "Email is required")?;
    if !EMAIL.is_match(value.trim()) {
        return Err(AppError::validation("Invalid email address"));
    }
    Ok(())
}

pub fn isbn(value: &str) -> Result<()> {
    required(value, "ISBN is required")?;
    if !ISBN.is_match(value.trim()) {
        return Err(AppError::validation(
            "ISBN must be a 10-digit ISBN or a 13-digit ISBN starting with 978/979",
        ));
    }
    Ok(())
}

/// 8 to 20 characters from letters, digits and `@$!%*?&`, with at least one
/// lowercase, uppercase, digit and special character.
pub fn password(value: &str) -> Result<()> {
    required(value, "Password is required")?;
    let len = value.chars().count();
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));
    let strong = value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if !(8..=20).contains(&len) || !allowed || !strong {
        return Err(AppError::validation(
            "Password must be 8-20 characters with an uppercase letter, a lowercase letter, a number and one of @$!%*?&",
        ));
    }
    Ok(())
}

pub fn book(book: &Book) -> Result<()> {
    isbn(&book.isbn)?;
    required(&book.title, "Title is required")?;
    required(&book.author, "Author is required")?;
    required(&book.category, "Category is required")?;
    if !book.price.is_finite() || book.price < 0.0 {
        return Err(AppError::validation("Price must be a non-negative number"));
    }
    Ok(())
}

pub fn reader(reader: &Reader) -> Result<()> {
    required(&reader.name, "Name is required")?;
    email(&reader.email)?;
    if !READER_PHONE.is_match(reader.phone_no.trim()) {
        return Err(AppError::validation("Phone number must be exactly 10 digits"));
    }
    required(&reader.gender, "Gender is required")?;
    if reader.age == 0 {
        return Err(AppError::validation("Age must be greater than 0"));
    }
    Ok(())
}

pub fn login(request: &LoginRequest) -> Result<()> {
    email(&request.email)?;
    password(&request.password)
}

pub fn signup(request: &SignupRequest) -> Result<()> {
    required(&request.name, "Name is required")?;
    email(&request.email)?;
    required(&request.gender, "Gender is required")?;
    if !SIGNUP_PHONE.is_match(request.phone_number.trim()) {
        return Err(AppError::validation("Phone number must be 10 digits"));
    }
    required(&request.password, "Password is required")?;
    if request.password != request.confirm_password {
        return Err(AppError::validation("Passwords do not match"));
    }
    Ok(())
}
