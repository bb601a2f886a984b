//! # Request Model
//!
//! The input side of the generator: who the prescription is for, which
//! domains they picked, and the text block a language model wrote for them.
//! All of it arrives as JSON and is validated here before layout starts.

pub mod catalog;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::CareerDocError;

pub use catalog::{DomainCatalog, DomainEntry, RoleRecord};

/// Upper bound on the number of domains one prescription may cover.
pub const MAX_DOMAINS: usize = 3;

/// The candidate's current situation, as chosen on the intake form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "Working Professional")]
    WorkingProfessional,
    #[serde(rename = "Student")]
    Student,
    #[serde(rename = "Job Seeker")]
    JobSeeker,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::WorkingProfessional => "Working Professional",
            Status::Student => "Student",
            Status::JobSeeker => "Job Seeker",
        };
        f.write_str(s)
    }
}

/// Text written by the language model. Every field may be missing or
/// `null`; missing fields render as empty.
///
/// Values may contain `<b>...</b>` markup, parsed by [`crate::richtext`].
/// A failed generation carries `error` instead of content and is refused by
/// [`AiContent::ensure_generated`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiContent {
    #[serde(deserialize_with = "null_as_empty")]
    pub intro_line: String,
    #[serde(deserialize_with = "bullet_list")]
    pub domain_bullets: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub projects_bullet: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub final_sentence: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub domains_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AiContent {
    /// Parse a model response. A response carrying an `"error"` key is
    /// turned into [`CareerDocError::AiContent`].
    pub fn from_json(json: &str) -> Result<Self, CareerDocError> {
        let content: AiContent = serde_json::from_str(json)?;
        content.ensure_generated()?;
        Ok(content)
    }

    /// Fail when the model reported an error instead of content.
    pub fn ensure_generated(&self) -> Result<(), CareerDocError> {
        match &self.error {
            Some(err) => Err(CareerDocError::AiContent(err.clone())),
            None => Ok(()),
        }
    }

    /// Fill `domains_title` from the selection when the model left it out.
    pub fn with_domains_title(mut self, domains: &[String]) -> Self {
        if self.domains_title.trim().is_empty() {
            self.domains_title = domains_title(domains);
        }
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Models sometimes answer a single bullet as a bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Bullets {
    One(String),
    Many(Vec<Option<String>>),
}

fn bullet_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Bullets>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Bullets::One(bullet)) if bullet.trim().is_empty() => Vec::new(),
        Some(Bullets::One(bullet)) => vec![bullet],
        Some(Bullets::Many(bullets)) => bullets.into_iter().flatten().collect(),
    })
}

/// Human-readable join of the selected domains, e.g. "Finance & Retail".
pub fn domains_title(domains: &[String]) -> String {
    domains.join(" & ")
}

/// Everything needed to render one prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionRequest {
    pub name: String,
    #[serde(default)]
    pub status: Status,
    pub domains: Vec<String>,
    #[serde(default)]
    pub ai_content: AiContent,
}

impl PrescriptionRequest {
    pub fn from_json(json: &str) -> Result<Self, CareerDocError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the constraints the intake form enforces. All problems are
    /// reported together.
    pub fn validate(&self) -> Result<(), CareerDocError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("Name is required".to_string());
        }
        if self.domains.is_empty() {
            errors.push("Select at least one domain".to_string());
        }
        if self.domains.len() > MAX_DOMAINS {
            errors.push(format!("Select at most {} domains", MAX_DOMAINS));
        }
        for (i, d) in self.domains.iter().enumerate() {
            if self.domains[..i].contains(d) {
                errors.push(format!("Domain '{}' is selected more than once", d));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CareerDocError::Validation(errors))
        }
    }

    /// The AI content with `domains_title` guaranteed to be set.
    pub fn resolved_ai_content(&self) -> AiContent {
        self.ai_content.clone().with_domains_title(&self.domains)
    }
}

/// File name for a generated document:
/// `Prescription_{safe_name}_{timestamp}.pdf`.
///
/// The name keeps only alphanumerics, spaces and underscores, drops
/// trailing whitespace, and turns spaces into underscores.
pub fn output_file_name(name: &str, unix_timestamp: i64) -> String {
    let safe: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_')
        .collect();
    let safe = safe.trim_end().replace(' ', "_");
    format!("Prescription_{}_{}.pdf", safe, unix_timestamp)
}
