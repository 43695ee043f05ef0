use tokio::sync::mpsc;

use daynote::mention::{extract_mentions, find_mention_parents, render_html, to_document};
use daynote::switcher::CalendarDate;

use crate::api::client::NotesClient;
use crate::api::types::{ExcerptNode, Note};
use crate::error::{ErrorInfo, Result};

use super::state::{AppMessage, Request, SaveRequest};

pub(super) fn dispatch(
    request: Request,
    client: &NotesClient,
    tx: &mpsc::UnboundedSender<AppMessage>,
) {
    match request {
        Request::LoadNote(date) => spawn_fetch_note(client, date, tx),
        Request::LoadMonth { year, month } => spawn_fetch_month(client, year, month, tx),
        Request::Save(save) => spawn_save(client, save, tx),
    }
}

pub(super) fn spawn_fetch_note(
    client: &NotesClient,
    date: CalendarDate,
    tx: &mpsc::UnboundedSender<AppMessage>,
) {
    let client_clone = client.clone();
    let tx_clone = tx.clone();
    tokio::spawn(async move {
        match client_clone.note_by_date(date.naive()).await {
            Ok(note) => {
                let _ = tx_clone.send(AppMessage::NoteLoaded(date, note));
            }
            Err(e) => {
                tracing::warn!(%date, error = %e, "failed to load note");
                let info = ErrorInfo::from_error(&e);
                let _ = tx_clone.send(AppMessage::NoteLoadFailed(date, info));
            }
        }
    });
}

/// Highlights are cosmetic, so a failed month lookup is only logged.
pub(super) fn spawn_fetch_month(
    client: &NotesClient,
    year: i32,
    month: u32,
    tx: &mpsc::UnboundedSender<AppMessage>,
) {
    let client_clone = client.clone();
    let tx_clone = tx.clone();
    tokio::spawn(async move {
        match client_clone.month_notes(year, month).await {
            Ok(days) => {
                let _ = tx_clone.send(AppMessage::MonthLoaded { year, month, days });
            }
            Err(e) => {
                tracing::warn!(year, month, error = %e, "failed to load note days");
            }
        }
    });
}

pub(super) fn spawn_save(
    client: &NotesClient,
    request: SaveRequest,
    tx: &mpsc::UnboundedSender<AppMessage>,
) {
    let client_clone = client.clone();
    let tx_clone = tx.clone();
    tokio::spawn(async move {
        match save_note(&client_clone, &request).await {
            Ok(note) => {
                tracing::info!(date = %request.date, id = note.id, "note saved");
                let _ = tx_clone.send(AppMessage::Saved {
                    date: request.date,
                    text: request.text,
                    note,
                });
            }
            Err(e) => {
                tracing::warn!(date = %request.date, error = %e, "save failed");
                let _ = tx_clone.send(AppMessage::ApiError(ErrorInfo::Save(e.to_string())));
            }
        }
    });
}

/// Create missing projects, store the note, then record which paragraphs
/// mention which projects.
pub(super) async fn save_note(client: &NotesClient, request: &SaveRequest) -> Result<Note> {
    let labels = extract_mentions(&request.text, request.trigger);
    let missing = missing_projects(client, &labels).await?;
    if !missing.is_empty() {
        tracing::info!(count = missing.len(), "creating projects");
        client.create_projects(missing).await?;
    }

    let note = client
        .create_note(render_html(&request.text, request.trigger))
        .await?;

    let doc = to_document(&request.text, request.trigger);
    let excerpts: Vec<ExcerptNode> = find_mention_parents(&doc)
        .into_iter()
        .map(|parent| ExcerptNode {
            projects: parent.mentioned,
            node: parent.node,
        })
        .collect();
    client
        .update_excerpts(request.date.naive(), excerpts)
        .await?;

    Ok(note)
}

async fn missing_projects(client: &NotesClient, labels: &[String]) -> Result<Vec<String>> {
    let mut missing = Vec::new();
    for label in labels {
        let known = client.search_projects(label).await?;
        if !known.iter().any(|p| &p.name == label) {
            missing.push(label.clone());
        }
    }
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DaynoteError;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn project_json(id: i64, name: &str) -> serde_json::Value {
        json!({"id": id, "name": name, "created_at": "2024-06-15T09:30:00Z"})
    }

    fn note_json() -> serde_json::Value {
        json!({"id": 5, "html_content": "", "note_date": "2024-06-15T00:00:00Z"})
    }

    fn request(text: &str) -> SaveRequest {
        SaveRequest {
            date: CalendarDate::new(2024, 6, 15).unwrap(),
            text: text.into(),
            trigger: '@',
        }
    }

    #[tokio::test]
    async fn save_creates_only_unknown_projects() {
        let server = MockServer::start().await;
        let client = NotesClient::new(&server.uri(), "t");

        Mock::given(method("GET"))
            .and(path("/api/projects"))
            .and(query_param("prefix", "alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                project_json(1, "alice"),
                project_json(2, "alice smith"),
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/projects"))
            .and(query_param("prefix", "garden"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/projects/batch"))
            .and(body_json(json!({"projects": ["garden"]})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([project_json(3, "garden")])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/notes"))
            .respond_with(ResponseTemplate::new(201).set_body_json(note_json()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/notes/excerpts"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let note = save_note(&client, &request("call @[alice]\nplant @[garden]"))
            .await
            .unwrap();
        assert_eq!(note.id, 5);

        let requests = server.received_requests().await.unwrap();
        let put = requests
            .iter()
            .find(|r| r.method.as_str() == "PUT")
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
        assert_eq!(body["date"], "2024-06-15");
        assert_eq!(body["excerpts"][0]["projects"], json!(["alice"]));
        assert_eq!(body["excerpts"][1]["projects"], json!(["garden"]));
    }

    #[tokio::test]
    async fn save_without_mentions_skips_project_calls() {
        let server = MockServer::start().await;
        let client = NotesClient::new(&server.uri(), "t");

        Mock::given(method("POST"))
            .and(path("/api/notes"))
            .and(body_json(json!({"html_content": "<p>quiet day</p>"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(note_json()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/notes/excerpts"))
            .and(body_json(json!({"excerpts": [], "date": "2024-06-15"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        save_note(&client, &request("quiet day")).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| r.url.path() != "/api/projects"));
    }

    #[tokio::test]
    async fn save_stops_when_note_is_rejected() {
        let server = MockServer::start().await;
        let client = NotesClient::new(&server.uri(), "t");

        Mock::given(method("POST"))
            .and(path("/api/notes"))
            .respond_with(ResponseTemplate::new(422).set_body_string("bad note"))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/notes/excerpts"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let err = save_note(&client, &request("text")).await.unwrap_err();
        assert!(matches!(err, DaynoteError::Api { status: 422, .. }));
    }
}
