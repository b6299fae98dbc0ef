//! Client-side form validation.
//!
//! Every check here runs before a request is sent. Messages are the ones
//! shown inline next to the form.

use thiserror::Error;

use crate::model::{Credentials, ModuleDraft, Registration, Role, UserId};

/// A form failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: &str) -> Self {
        Self(message.to_string())
    }
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Login form.
pub fn credentials(username: &str, password: &str) -> Result<Credentials, ValidationError> {
    if blank(username) || password.is_empty() {
        return Err(ValidationError::new(
            "Please enter your username and password.",
        ));
    }
    Ok(Credentials {
        username: username.trim().to_string(),
        password: password.to_string(),
    })
}

/// Raw registration form input.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub password: String,
    /// Defaults to `learner` when absent.
    pub role: Option<Role>,
}

pub fn registration(form: RegistrationForm) -> Result<Registration, ValidationError> {
    let required = [
        &form.firstname,
        &form.lastname,
        &form.username,
        &form.email,
        &form.password,
    ];
    if required.iter().any(|field| blank(field)) {
        return Err(ValidationError::new("Please fill in all required fields."));
    }
    Ok(Registration {
        firstname: form.firstname.trim().to_string(),
        lastname: form.lastname.trim().to_string(),
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        password: form.password,
        role: form.role.unwrap_or(Role::Learner),
    })
}

/// Password-reset form.
pub fn reset_email(email: &str) -> Result<String, ValidationError> {
    if blank(email) {
        return Err(ValidationError::new(
            "Please enter your email address for password reset.",
        ));
    }
    Ok(email.trim().to_string())
}

/// Raw admin module form input. Numeric fields arrive as text.
#[derive(Debug, Clone)]
pub struct ModuleForm {
    pub title: String,
    pub description: String,
    pub credits: String,
    pub lecturer_id: String,
    pub pages: String,
    pub is_published: bool,
}

impl Default for ModuleForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            credits: String::new(),
            lecturer_id: String::new(),
            pages: String::new(),
            is_published: true,
        }
    }
}

/// Validate the admin module form and convert it to a request payload.
pub fn module(form: &ModuleForm) -> Result<ModuleDraft, ValidationError> {
    if blank(&form.title) || blank(&form.credits) || blank(&form.lecturer_id) || blank(&form.pages)
    {
        return Err(ValidationError::new(
            "Please fill in all required fields (Title, Credits, Lecturer ID, Pages).",
        ));
    }
    let credits = match form.credits.trim().parse::<i64>() {
        Ok(n) if n > 0 => n as u32,
        _ => return Err(ValidationError::new("Credits must be a positive number.")),
    };
    let lecturer_id = match form.lecturer_id.trim().parse::<UserId>() {
        Ok(n) if n > 0 => n,
        _ => {
            return Err(ValidationError::new(
                "Lecturer ID must be a positive number.",
            ))
        }
    };
    let pages = match form.pages.trim().parse::<i64>() {
        Ok(n) if n >= 0 => n as u32,
        _ => {
            return Err(ValidationError::new(
                "Pages must be a non-negative number.",
            ))
        }
    };
    Ok(ModuleDraft {
        title: form.title.trim().to_string(),
        description: form.description.trim().to_string(),
        credits,
        lecturer_id,
        pages,
        is_published: form.is_published,
    })
}

/// Lecturer id typed into the assign-instructor prompt.
pub fn lecturer_id(input: &str) -> Result<UserId, ValidationError> {
    match input.trim().parse::<UserId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::new(
            "Invalid Lecturer ID. Please enter a positive number.",
        )),
    }
}

/// Raw lecturer module form input.
#[derive(Debug, Clone, Default)]
pub struct LecturerModuleForm {
    pub title: String,
    pub code: String,
    pub description: String,
}

pub fn lecturer_module(form: &LecturerModuleForm) -> Result<(), ValidationError> {
    if blank(&form.title) || blank(&form.code) || blank(&form.description) {
        return Err(ValidationError::new("Please fill all module fields."));
    }
    Ok(())
}
