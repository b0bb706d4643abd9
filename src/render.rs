//! Subject and body templating per notification kind.
//!
//! Pure string assembly: each builder renders the subject, HTML, and
//! plain-text bodies up front and keeps the inputs in the task's `data`
//! map so a queued task can be inspected or replayed later.

use std::collections::HashMap;

use crate::queue::{NotificationKind, NotificationTask};

const APP_NAME: &str = "Tandem";

/// Email verification code.
pub fn verification(to: &str, code: &str) -> NotificationTask {
    let mut data = HashMap::new();
    data.insert("code".to_string(), code.to_string());
    NotificationTask::new(
        NotificationKind::Verification,
        to,
        format!("{APP_NAME} verification code"),
        format!("<p>Your {APP_NAME} verification code is <strong>{code}</strong>. It expires in 15 minutes.</p>"),
        format!("Your {APP_NAME} verification code is {code}. It expires in 15 minutes."),
        data,
    )
}

/// Password-reset token.
pub fn password_reset(to: &str, token: &str) -> NotificationTask {
    let mut data = HashMap::new();
    data.insert("token".to_string(), token.to_string());
    NotificationTask::new(
        NotificationKind::PasswordReset,
        to,
        format!("Reset your {APP_NAME} password"),
        format!("<p>Use this token to reset your {APP_NAME} password: <strong>{token}</strong>. It expires in 30 minutes.</p>"),
        format!("Use this token to reset your {APP_NAME} password: {token}. It expires in 30 minutes."),
        data,
    )
}

/// Greeting for a freshly registered user.
pub fn welcome(to: &str, name: &str) -> NotificationTask {
    let mut data = HashMap::new();
    data.insert("name".to_string(), name.to_string());
    NotificationTask::new(
        NotificationKind::Welcome,
        to,
        format!("Welcome to {APP_NAME}, {name}!"),
        format!("<p>Hi {name}, welcome to {APP_NAME}. Pair up and start keeping your shared memories.</p>"),
        format!("Hi {name}, welcome to {APP_NAME}. Pair up and start keeping your shared memories."),
        data,
    )
}

/// Anniversary reminder for a paired couple.
pub fn anniversary(to: &str, partner: &str, years: u32) -> NotificationTask {
    let mut data = HashMap::new();
    data.insert("partner".to_string(), partner.to_string());
    data.insert("years".to_string(), years.to_string());
    NotificationTask::new(
        NotificationKind::Anniversary,
        to,
        format!("Your anniversary with {partner} is coming up"),
        format!("<p>It has been {years} wonderful years with {partner}. Why not add a memory to celebrate?</p>"),
        format!("It has been {years} wonderful years with {partner}. Why not add a memory to celebrate?"),
        data,
    )
}

/// Festival greeting (seasonal campaigns).
pub fn festival(to: &str, festival: &str) -> NotificationTask {
    let mut data = HashMap::new();
    data.insert("festival".to_string(), festival.to_string());
    NotificationTask::new(
        NotificationKind::Festival,
        to,
        format!("Happy {festival} from {APP_NAME}"),
        format!("<p>Happy {festival}! Capture the moment together on {APP_NAME}.</p>"),
        format!("Happy {festival}! Capture the moment together on {APP_NAME}."),
        data,
    )
}

/// Free-form notification with caller-supplied subject and message.
pub fn generic(to: &str, subject: &str, message: &str) -> NotificationTask {
    let mut data = HashMap::new();
    data.insert("message".to_string(), message.to_string());
    NotificationTask::new(
        NotificationKind::GenericNotification,
        to,
        subject,
        format!("<p>{message}</p>"),
        message,
        data,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_keeps_inputs_in_data() {
        let task = verification("a@b.com", "123456");
        assert_eq!(task.kind, NotificationKind::Verification);
        assert_eq!(task.to_address, "a@b.com");
        assert_eq!(task.data.get("code").map(String::as_str), Some("123456"));
        assert!(task.html_body.contains("123456"));
        assert!(task.text_body.contains("123456"));
        assert_eq!(task.retry_count, 0);
    }

    #[test]
    fn anniversary_renders_partner_and_years() {
        let task = anniversary("a@b.com", "Sam", 3);
        assert!(task.text_body.contains("3 wonderful years with Sam"));
        assert_eq!(task.data.get("years").map(String::as_str), Some("3"));
    }
}
