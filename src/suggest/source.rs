use std::future::Future;

use crate::api::client::NotesClient;
use crate::error::Result;

/// Async lookup of mention labels for a query.
pub trait SuggestionSource: Clone + Send + Sync + 'static {
    fn suggest(&self, query: String) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Projects whose name starts with the query, in server order.
impl SuggestionSource for NotesClient {
    fn suggest(&self, query: String) -> impl Future<Output = Result<Vec<String>>> + Send {
        let client = self.clone();
        async move {
            let projects = client.search_projects(&query).await?;
            Ok(projects.into_iter().map(|p| p.name).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn notes_client_suggests_project_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/projects"))
            .and(query_param("prefix", "wo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "work", "created_at": "2024-06-15T09:30:00Z"},
                {"id": 2, "name": "woodshop", "created_at": "2024-06-16T09:30:00Z"}
            ])))
            .mount(&server)
            .await;

        let client = NotesClient::new(&server.uri(), "t");
        let labels = client.suggest("wo".into()).await.unwrap();
        assert_eq!(labels, vec!["work", "woodshop"]);
    }
}
