use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: i64,
    pub html_content: String,
    pub note_date: DateTime<FixedOffset>,
}

impl Note {
    pub fn date(&self) -> NaiveDate {
        self.note_date.date_naive()
    }
}

#[derive(Debug, Serialize)]
pub struct CreateNoteRequest {
    pub html_content: String,
}

#[derive(Debug, Serialize)]
pub struct CreateProjectsRequest {
    pub projects: Vec<String>,
}

/// A mention-bearing paragraph and the projects it mentions.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExcerptNode {
    pub projects: Vec<String>,
    pub node: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateExcerptsRequest {
    pub excerpts: Vec<ExcerptNode>,
    pub date: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProjectPrefixQuery<'a> {
    pub prefix: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NoteByDateQuery {
    pub date: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct MonthNotesQuery {
    pub year: i32,
    pub month: u32,
}
