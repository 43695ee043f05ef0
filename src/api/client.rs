use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::api::types::{
    CreateNoteRequest, CreateProjectsRequest, ExcerptNode, MonthNotesQuery, Note, NoteByDateQuery,
    Project, ProjectPrefixQuery, UpdateExcerptsRequest,
};
use crate::error::{DaynoteError, Result};

#[derive(Clone)]
pub struct NotesClient {
    client: Client,
    base_url: String,
    token: String,
}

impl NotesClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.get(format!("{}{}", self.base_url, path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.post(format!("{}{}", self.base_url, path)))
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.put(format!("{}{}", self.base_url, path)))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        if self.token.is_empty() {
            req
        } else {
            req.bearer_auth(&self.token)
        }
    }

    pub async fn search_projects(&self, prefix: &str) -> Result<Vec<Project>> {
        let resp = self
            .get("/api/projects")
            .query(&ProjectPrefixQuery { prefix })
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json::<Vec<Project>>().await?)
    }

    pub async fn create_projects(&self, names: Vec<String>) -> Result<Vec<Project>> {
        let resp = self
            .post("/api/projects/batch")
            .json(&CreateProjectsRequest { projects: names })
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json::<Vec<Project>>().await?)
    }

    /// Fetch the note for `date`. A missing note is `Ok(None)`, not an error.
    pub async fn note_by_date(&self, date: NaiveDate) -> Result<Option<Note>> {
        let resp = self
            .get("/api/notes/by-date")
            .query(&NoteByDateQuery {
                date: date.format("%Y-%m-%d").to_string(),
            })
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = ensure_success(resp).await?;
        Ok(Some(resp.json::<Note>().await?))
    }

    /// Days of `month` that already have a note.
    pub async fn month_notes(&self, year: i32, month: u32) -> Result<Vec<u32>> {
        let resp = self
            .get("/api/notes/for-month")
            .query(&MonthNotesQuery { year, month })
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json::<Option<Vec<u32>>>().await?.unwrap_or_default())
    }

    pub async fn create_note(&self, html_content: String) -> Result<Note> {
        let resp = self
            .post("/api/notes")
            .json(&CreateNoteRequest { html_content })
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json::<Note>().await?)
    }

    /// Replace the project excerpts recorded for the note on `date`.
    pub async fn update_excerpts(&self, date: NaiveDate, excerpts: Vec<ExcerptNode>) -> Result<()> {
        let resp = self
            .put("/api/notes/excerpts")
            .json(&UpdateExcerptsRequest {
                excerpts,
                date: date.format("%Y-%m-%d").to_string(),
            })
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }
}

async fn ensure_success(resp: Response) -> Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_default();
    Err(DaynoteError::Api { status, message })
}
