use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Represents a single task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque identifier, assigned by the store on creation.
    pub id: String,
    /// Display title. Never empty for a stored task.
    pub title: String,
    /// Free-form notes.
    #[serde(default)]
    pub description: String,
    /// Optional due date. Encoded as `null` or `{"Valid": true, "Time": ...}`.
    #[serde(default, with = "due_date_format")]
    pub due_date: Option<DueDate>,
    /// Whether the task has been completed.
    #[serde(default)]
    pub completed: bool,
    /// Soft-delete flag. Archived tasks stay in the store but are hidden.
    #[serde(default)]
    pub is_archived: bool,
}

impl Task {
    /// Whether the task belongs in the default (non-archived) view.
    pub fn is_visible(&self) -> bool {
        !self.is_archived
    }
}

/// A due date that is known to be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueDate {
    pub time: DateTime<Utc>,
}

impl DueDate {
    pub fn at(time: DateTime<Utc>) -> Self {
        DueDate { time }
    }

    /// Calendar date of the due time.
    pub fn date(&self) -> NaiveDate {
        self.time.date_naive()
    }
}

/// Input for creating a task. The store assigns the id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: Option<DueDate>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_due_date(mut self, due_date: Option<DueDate>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Builds an unsaved task with fresh lifecycle flags and an empty id.
    pub fn into_task(self) -> Task {
        Task {
            id: String::new(),
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            completed: false,
            is_archived: false,
        }
    }
}

/// Parses user input into a due date.
///
/// Accepts `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
/// Blank input means "no due date".
pub fn parse_due_date(input: &str) -> Result<Option<DueDate>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| Some(DueDate::at(dt.and_utc())))
            .ok_or_else(|| format!("Invalid due date '{}'.", input));
    }
    DateTime::parse_from_rfc3339(input)
        .map(|dt| Some(DueDate::at(dt.with_timezone(&Utc))))
        .map_err(|e| format!("Invalid due date '{}': {}. Use YYYY-MM-DD.", input, e))
}

/// Wire format for the nullable due date.
///
/// Upstream services encode SQL null times as `{"Valid": false, "Time": "0001-01-01T00:00:00Z"}`,
/// which decodes to `None` here.
mod due_date_format {
    use super::DueDate;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct NullTime {
        #[serde(rename = "Valid", default)]
        valid: bool,
        #[serde(rename = "Time", default)]
        time: Option<DateTime<Utc>>,
    }

    pub fn serialize<S>(value: &Option<DueDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(due) => NullTime {
                valid: true,
                time: Some(due.time),
            }
            .serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DueDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<NullTime>::deserialize(deserializer)?;
        Ok(match raw {
            Some(NullTime {
                valid: true,
                time: Some(time),
            }) => Some(DueDate::at(time)),
            _ => None,
        })
    }
}
