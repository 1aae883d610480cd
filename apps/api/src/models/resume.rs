use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Validation error: name is required")]
    MissingName,

    #[error("Validation error: invalid resume payload: {0}")]
    Malformed(String),
}

/// Résumé data as submitted by the caller.
///
/// Everything except `name` is optional; absent or `null` collections become empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<EducationEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub dates: String,
    /// Free-text responsibilities; the refinement input.
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub date: String,
}

impl ResumeRecord {
    /// Parses and validates a JSON request body.
    pub fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
        let record: ResumeRecord =
            serde_json::from_slice(body).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        Ok(())
    }

    /// `email | phone | linkedin`, with empty strings for missing fields.
    pub fn contact_line(&self) -> String {
        [&self.email, &self.phone, &self.linkedin]
            .iter()
            .map(|field| field.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl ExperienceEntry {
    pub fn heading(&self) -> String {
        format!("{} | {} | {}", self.title, self.company, self.dates)
    }
}

impl EducationEntry {
    pub fn line(&self) -> String {
        format!("{} | {} | {}", self.degree, self.institution, self.date)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_record_deserializes() {
        let body = serde_json::json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "555-0100",
            "linkedin": "linkedin.com/in/jane",
            "profile": "Backend engineer.",
            "experience": [{
                "title": "Engineer",
                "company": "Acme",
                "dates": "2020-2023",
                "details": "Built APIs. Ran on-call."
            }],
            "education": [{"degree": "BSc CS", "institution": "State U", "date": "2019"}],
            "skills": ["Rust", "SQL"]
        });
        let record = ResumeRecord::from_json(body.to_string().as_bytes()).unwrap();
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.experience[0].heading(), "Engineer | Acme | 2020-2023");
        assert_eq!(record.education[0].line(), "BSc CS | State U | 2019");
        assert_eq!(record.skills, vec!["Rust", "SQL"]);
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let record = ResumeRecord::from_json(br#"{"name": "Jane Doe", "skills": null}"#).unwrap();
        assert!(record.experience.is_empty());
        assert!(record.education.is_empty());
        assert!(record.skills.is_empty());
        assert!(record.profile.is_none());
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let err = ResumeRecord::from_json(br#"{"email": "a@b.c"}"#).unwrap_err();
        assert!(matches!(err, ValidationError::MissingName));
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let err = ResumeRecord::from_json(br#"{"name": "   "}"#).unwrap_err();
        assert!(matches!(err, ValidationError::MissingName));
    }

    #[test]
    fn test_non_object_body_is_malformed() {
        let err = ResumeRecord::from_json(b"[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));

        let err = ResumeRecord::from_json(b"not json").unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }

    #[test]
    fn test_experience_entry_missing_field_is_malformed() {
        let body = br#"{"name": "Jane", "experience": [{"title": "Engineer"}]}"#;
        let err = ResumeRecord::from_json(body).unwrap_err();
        assert!(err.to_string().contains("company"), "got {err}");
    }

    #[test]
    fn test_contact_line_keeps_separators_for_missing_fields() {
        let record = ResumeRecord {
            name: "Jane".to_string(),
            phone: Some("555-0100".to_string()),
            ..Default::default()
        };
        assert_eq!(record.contact_line(), " | 555-0100 | ");
    }
}
