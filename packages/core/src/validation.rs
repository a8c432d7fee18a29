// ABOUTME: Input validation for cycle creation, updates and SLA extension
// ABOUTME: Collects every field problem instead of failing on the first one

use std::fmt;

use crate::types::{CycleCreateInput, CycleUpdateInput, Platform, SquadsConfig};

pub const MAX_RELEASE_LENGTH: usize = 64;
pub const MAX_VERSION_LENGTH: usize = 32;

/// Upper bound for a single extension request.
pub const MAX_EXTENSION_HOURS: u32 = 168;

/// Validation errors for cycle data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn is_http_link(link: &str) -> bool {
    link.starts_with("http://") || link.starts_with("https://")
}

fn check_release(release: &str, errors: &mut Vec<ValidationError>) {
    if release.trim().is_empty() {
        errors.push(ValidationError::new("release", "Release is required"));
    } else if release.chars().count() > MAX_RELEASE_LENGTH {
        errors.push(ValidationError::new(
            "release",
            format!("Release must be at most {} characters", MAX_RELEASE_LENGTH),
        ));
    }
}

fn check_version(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.chars().count() > MAX_VERSION_LENGTH {
        errors.push(ValidationError::new(
            field,
            format!("Version must be at most {} characters", MAX_VERSION_LENGTH),
        ));
    }
}

fn check_link(link: &str, errors: &mut Vec<ValidationError>) {
    let link = link.trim();
    if !link.is_empty() && !is_http_link(link) {
        errors.push(ValidationError::new(
            "linkPlanoTestes",
            "Test plan link must start with http:// or https://",
        ));
    }
}

/// Validates cycle data for creation. When a catalogue is supplied, every
/// selected squad must exist in it.
pub fn validate_cycle_create(
    data: &CycleCreateInput,
    catalogue: Option<&SquadsConfig>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    check_release(&data.release, &mut errors);

    if data.platform == Platform::Unknown {
        errors.push(ValidationError::new(
            "plataforma",
            "Platform must be Android or iOS",
        ));
    }

    check_version("versaoHomolog", &data.staging_version, &mut errors);
    check_version("versaoFirebase", &data.firebase_version, &mut errors);
    check_version("versaoAlpha", &data.alpha_version, &mut errors);
    check_link(&data.test_plan_link, &mut errors);

    if let Some(catalogue) = catalogue {
        for squad in &data.selected_squads {
            if !catalogue.contains(squad) {
                errors.push(ValidationError::new(
                    "squads_selecionadas",
                    format!("Unknown squad: {}", squad),
                ));
            }
        }
    }

    errors
}

/// Validates a partial cycle update
pub fn validate_cycle_update(data: &CycleUpdateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(ref release) = data.release {
        check_release(release, &mut errors);
    }
    if let Some(ref v) = data.staging_version {
        check_version("versaoHomolog", v, &mut errors);
    }
    if let Some(ref v) = data.firebase_version {
        check_version("versaoFirebase", v, &mut errors);
    }
    if let Some(ref v) = data.alpha_version {
        check_version("versaoAlpha", v, &mut errors);
    }
    if let Some(ref link) = data.test_plan_link {
        check_link(link, &mut errors);
    }

    errors
}

/// Extension hours must be a positive whole number within a week.
pub fn validate_hours(hours: u32) -> Result<u32, ValidationError> {
    if hours == 0 {
        Err(ValidationError::new("horas", "Hours must be greater than zero"))
    } else if hours > MAX_EXTENSION_HOURS {
        Err(ValidationError::new(
            "horas",
            format!("Hours must be at most {}", MAX_EXTENSION_HOURS),
        ))
    } else {
        Ok(hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SquadEntry;

    fn valid_input() -> CycleCreateInput {
        CycleCreateInput {
            release: "5.12.0".to_string(),
            platform: Platform::Android,
            staging_version: "5.12.0-rc1".to_string(),
            firebase_version: "5.12.0 (4411)".to_string(),
            alpha_version: "5.12.0-alpha".to_string(),
            test_plan_link: "https://plan.example.com".to_string(),
            selected_squads: vec!["Pagamentos".to_string()],
            ..Default::default()
        }
    }

    fn catalogue() -> SquadsConfig {
        SquadsConfig {
            squads: vec![SquadEntry {
                id: Some(1),
                squad: "Pagamentos".to_string(),
                modules: vec!["Pix".to_string()],
            }],
        }
    }

    #[test]
    fn test_valid_create_input() {
        assert!(validate_cycle_create(&valid_input(), Some(&catalogue())).is_empty());
    }

    #[test]
    fn test_empty_release() {
        let data = CycleCreateInput {
            release: "  ".to_string(),
            ..valid_input()
        };
        let errors = validate_cycle_create(&data, None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "release");
    }

    #[test]
    fn test_collects_every_problem() {
        let data = CycleCreateInput {
            release: "x".repeat(65),
            platform: Platform::Unknown,
            alpha_version: "v".repeat(33),
            test_plan_link: "ftp://plan".to_string(),
            selected_squads: vec!["Fantasma".to_string()],
            ..valid_input()
        };
        let fields: Vec<String> = validate_cycle_create(&data, Some(&catalogue()))
            .into_iter()
            .map(|e| e.field)
            .collect();

        assert_eq!(
            fields,
            vec![
                "release",
                "plataforma",
                "versaoAlpha",
                "linkPlanoTestes",
                "squads_selecionadas"
            ]
        );
    }

    #[test]
    fn test_unknown_squads_pass_without_catalogue() {
        let data = CycleCreateInput {
            selected_squads: vec!["Fantasma".to_string()],
            ..valid_input()
        };
        assert!(validate_cycle_create(&data, None).is_empty());
    }

    #[test]
    fn test_update_validation() {
        let data = CycleUpdateInput {
            release: Some(String::new()),
            test_plan_link: Some("https://ok".to_string()),
            ..Default::default()
        };
        let errors = validate_cycle_update(&data);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "release");
    }

    #[test]
    fn test_validate_hours() {
        assert!(validate_hours(0).is_err());
        assert_eq!(validate_hours(3), Ok(3));
        assert!(validate_hours(MAX_EXTENSION_HOURS + 1).is_err());
    }
}
