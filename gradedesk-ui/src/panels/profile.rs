//! Profile panel

use gradedesk_common::api::types::{ProfileResponse, UserProfile};

/// Shown for profile fields the server left empty
pub const MISSING_FIELD: &str = "-";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePanel {
    pub email: Option<String>,
    /// Editable inputs
    pub full_name: String,
    pub class_name: String,
    loaded: bool,
}

impl ProfilePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Fill the inputs from a `GET /me` response
    pub fn apply(&mut self, response: &ProfileResponse) {
        self.email = response.email.clone();
        self.full_name = response.profile.full_name.clone().unwrap_or_default();
        self.class_name = response.profile.class_name.clone().unwrap_or_default();
        self.loaded = true;
    }

    /// Body for `POST /me`
    pub fn to_update(&self) -> UserProfile {
        UserProfile {
            full_name: Some(self.full_name.trim().to_string()),
            class_name: Some(self.class_name.trim().to_string()),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Email: {}", or_missing(self.email.as_deref().unwrap_or(""))),
            format!("Full name: {}", or_missing(&self.full_name)),
            format!("Class: {}", or_missing(&self.class_name)),
        ]
    }
}

fn or_missing(value: &str) -> &str {
    if value.is_empty() {
        MISSING_FIELD
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_render_dash() {
        let mut panel = ProfilePanel::new();
        panel.apply(&ProfileResponse {
            email: Some("t@school.org".to_string()),
            profile: UserProfile {
                full_name: Some("Ms. Rao".to_string()),
                class_name: None,
            },
            ..Default::default()
        });

        assert!(panel.is_loaded());
        assert_eq!(
            panel.lines(),
            vec!["Email: t@school.org", "Full name: Ms. Rao", "Class: -"]
        );
    }

    #[test]
    fn test_update_trims_inputs() {
        let panel = ProfilePanel {
            full_name: " Ms. Rao ".to_string(),
            class_name: "7B".to_string(),
            ..Default::default()
        };
        assert_eq!(
            panel.to_update(),
            UserProfile {
                full_name: Some("Ms. Rao".to_string()),
                class_name: Some("7B".to_string()),
            }
        );
    }
}
