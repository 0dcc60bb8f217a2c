use super::dates::resolve_entry_date;
use super::error::{ValidationError, ValidationResult};
use super::request::{require_id, validate_description, validate_hours};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fs, path::Path};

/// A batch of entries, grouped by client and project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyFile {
    #[serde(default)]
    pub clients: Vec<ApplyClient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyClient {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub projects: Vec<ApplyProject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyProject {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub entries: Vec<ApplyEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyEntry {
    #[serde(default)]
    pub date: String,
    #[serde(deserialize_with = "hours_from_number_or_text")]
    pub hours: f64,
    #[serde(default)]
    pub description: Option<String>,
}

// YAML files written by hand often quote numbers
fn hours_from_number_or_text<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Hours {
        Number(f64),
        Text(String),
    }

    match Hours::deserialize(deserializer)? {
        Hours::Number(n) => Ok(n),
        Hours::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// One entry ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedEntry {
    pub client_id: String,
    pub project_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> ValidationResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        match extension {
            "json" => Ok(FileFormat::Json),
            "yaml" | "yml" => Ok(FileFormat::Yaml),
            other => Err(ValidationError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl ApplyFile {
    pub fn load(path: &Path) -> ValidationResult<Self> {
        let format = FileFormat::from_path(path)?;
        let contents = fs::read_to_string(path).map_err(|source| ValidationError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, format).map_err(|message| ValidationError::ParseFile {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(contents: &str, format: FileFormat) -> Result<Self, String> {
        match format {
            FileFormat::Json => serde_json::from_str(contents).map_err(|err| err.to_string()),
            FileFormat::Yaml => serde_yaml::from_str(contents).map_err(|err| err.to_string()),
        }
    }

    /// Validates every entry. Nothing is returned unless all of them pass,
    /// so a bad line never leaves half a file applied.
    pub fn plan(&self, today: NaiveDate, date_format: &str) -> ValidationResult<Vec<PlannedEntry>> {
        let mut planned = Vec::new();

        for client in &self.clients {
            let client_id = require_id("client id", Some(client.client_id.as_str()))?;
            for project in &client.projects {
                let project_id = require_id("project id", Some(project.project_id.as_str()))?;
                for entry in &project.entries {
                    if entry.date.trim().is_empty() {
                        return Err(ValidationError::MissingDate);
                    }
                    planned.push(PlannedEntry {
                        client_id: client_id.clone(),
                        project_id: project_id.clone(),
                        date: resolve_entry_date(Some(entry.date.as_str()), false, today, date_format)?,
                        description: validate_description(entry.description.as_deref())?,
                        hours: validate_hours(entry.hours)?,
                    });
                }
            }
        }

        Ok(planned)
    }

    /// A sample covering the first two days of the current week.
    pub fn example(today: NaiveDate, date_format: &str) -> Self {
        let monday = today - Days::new(today.weekday().num_days_from_monday() as u64);
        let entries: Vec<ApplyEntry> = (0..2)
            .map(|offset| ApplyEntry {
                date: (monday + Days::new(offset)).format(date_format).to_string(),
                hours: 8.0,
                description: Some("Something Meaningful".into()),
            })
            .collect();

        let clients = ["client_id_1", "client_id_2"]
            .into_iter()
            .map(|client_id| ApplyClient {
                client_id: client_id.into(),
                projects: ["project_id_1", "project_id_2"]
                    .into_iter()
                    .map(|project_id| ApplyProject {
                        project_id: project_id.into(),
                        entries: entries.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self { clients }
    }
}
