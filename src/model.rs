use std::fmt;

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored task as the file store sees it: an arbitrary JSON object that
/// carries at least an `id`.
pub type Record = Map<String, Value>;

const TOKEN_LEN: usize = 21;

/// Opaque task identity. Never derived from the title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Random URL-safe token, used by the store for every created record.
    pub fn generate() -> Self {
        let token: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    /// Deterministic id for a locally added card: one past the largest
    /// numeric id, or `0` when no id is numeric.
    pub fn next_sequential<'a>(existing: impl IntoIterator<Item = &'a TaskId>) -> Self {
        let next = next_numeric_id(existing.into_iter().filter_map(|id| id.0.parse().ok()));
        Self(next.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// `max(ids) + 1`, or `0` for an empty sequence. An id of `u64::MAX` has no
/// successor and is skipped; the result still differs from every input.
pub fn next_numeric_id(ids: impl IntoIterator<Item = u64>) -> u64 {
    ids.into_iter()
        .filter_map(|id| id.checked_add(1))
        .max()
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Todo,
    Doing,
    Review,
    Done,
}

impl Status {
    /// Column order on the board.
    pub const ALL: [Status; 4] = [Status::Todo, Status::Doing, Status::Review, Status::Done];

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "todo" => Ok(Self::Todo),
            "doing" => Ok(Self::Doing),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            _ => anyhow::bail!("invalid status '{s}': must be todo, doing, review, or done"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "To-Do",
            Self::Doing => "Doing",
            Self::Review => "Review",
            Self::Done => "Done",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Todo => ".",
            Self::Doing => "*",
            Self::Review => "?",
            Self::Done => "x",
        }
    }

    /// Position of this status in [`Status::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Todo => 0,
            Self::Doing => 1,
            Self::Review => 2,
            Self::Done => 3,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub status: Status,
    pub category: String,
    pub assignee: String,
    #[serde(rename = "storyPoints")]
    pub story_points: u32,
}

impl Task {
    /// Decode a stored record. Records are never validated on the way in, so
    /// missing or mistyped fields fall back to defaults here.
    pub fn from_record(record: &Record) -> Self {
        let text = |key: &str| -> String {
            match record.get(key) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => String::new(),
            }
        };
        let status = record
            .get("status")
            .and_then(Value::as_str)
            .and_then(|s| Status::parse(s).ok())
            .unwrap_or_default();
        let story_points = match record.get("storyPoints") {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.round() as i64))
                .map(clamp_points)
                .unwrap_or(0),
            _ => 0,
        };
        Self {
            id: TaskId::new(text("id")),
            title: text("title"),
            status,
            category: text("category"),
            assignee: text("assignee"),
            story_points,
        }
    }

    /// Fields of this task as a store payload, without the id.
    pub fn to_fields(&self) -> Record {
        let mut fields = Record::new();
        fields.insert("title".into(), Value::String(self.title.clone()));
        fields.insert("status".into(), Value::String(self.status.as_str().into()));
        fields.insert("category".into(), Value::String(self.category.clone()));
        fields.insert("assignee".into(), Value::String(self.assignee.clone()));
        fields.insert("storyPoints".into(), Value::from(self.story_points));
        fields
    }
}

/// Clamp a signed point value into the valid range.
pub fn clamp_points(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubgoalStatus {
    #[default]
    Todo,
    Doing,
    Done,
}

impl SubgoalStatus {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "todo" => Ok(Self::Todo),
            "doing" => Ok(Self::Doing),
            "done" => Ok(Self::Done),
            _ => anyhow::bail!("invalid subgoal status '{s}': must be todo, doing, or done"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "To-Do",
            Self::Doing => "Doing",
            Self::Done => "Done",
        }
    }

    /// Next value in the status selector, wrapping around.
    pub fn cycle(self) -> Self {
        match self {
            Self::Todo => Self::Doing,
            Self::Doing => Self::Done,
            Self::Done => Self::Todo,
        }
    }
}

impl fmt::Display for SubgoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgoal {
    pub id: u64,
    pub title: String,
    pub status: SubgoalStatus,
}
