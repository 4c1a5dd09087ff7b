#[cfg(test)]
mod tests {
    use parley::api::{ApiClient, ApiError, ChatHistory, Health, HealthMonitor};
    use reqwest::Client;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, endpoint: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_health_reports_healthy() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/api/health",
            ResponseTemplate::new(200).set_body_json(json!({
                "status": "healthy",
                "timestamp": "2024-01-01T00:00:00Z",
                "service": "chat-api",
                "version": "1.0.0"
            })),
        )
        .await;

        let mut monitor = HealthMonitor::new(ApiClient::new(Client::new(), server.uri()));
        assert_eq!(monitor.status(), Health::Unknown);

        assert_eq!(monitor.check().await, Health::Healthy);
        assert!(monitor.error().is_none());
        assert!(!monitor.is_loading());
    }

    #[tokio::test]
    async fn test_health_other_status_is_unhealthy_without_error() {
        let server = MockServer::start().await;
        mount(&server, "/api/health", ResponseTemplate::new(200).set_body_json(json!({"status": "degraded"}))).await;

        let mut monitor = HealthMonitor::new(ApiClient::new(Client::new(), server.uri()));

        assert_eq!(monitor.check().await, Health::Unhealthy);
        assert!(monitor.error().is_none());
    }

    #[tokio::test]
    async fn test_health_failure_records_error() {
        let server = MockServer::start().await;
        mount(&server, "/api/health", ResponseTemplate::new(503).set_body_string("maintenance")).await;

        let mut monitor = HealthMonitor::new(ApiClient::new(Client::new(), server.uri()));

        assert_eq!(monitor.check().await, Health::Unhealthy);
        assert_eq!(monitor.error(), Some("HTTP 503: maintenance"));
    }

    #[tokio::test]
    async fn test_stats_lists_recent_chats() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/api/stats",
            ResponseTemplate::new(200).set_body_json(json!({
                "recentChats": [{
                    "timestamp": "2024-01-01T00:00:00Z",
                    "model": "deepseek-chat",
                    "messagesCount": 3,
                    "tokensUsed": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
                }]
            })),
        )
        .await;

        let mut history = ChatHistory::new(ApiClient::new(Client::new(), server.uri()));
        let entries = history.fetch().await;

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].messages_count, 3);
        assert_eq!(entries[0].tokens_used.total_tokens, 15);
        assert!(history.error().is_none());
    }

    #[tokio::test]
    async fn test_stats_without_recent_chats_is_empty() {
        let server = MockServer::start().await;
        mount(&server, "/api/stats", ResponseTemplate::new(200).set_body_json(json!({}))).await;

        let mut history = ChatHistory::new(ApiClient::new(Client::new(), server.uri()));

        assert!(history.fetch().await.is_empty());
        assert!(history.error().is_none());
    }

    #[tokio::test]
    async fn test_stats_error_surfaces_status_and_body() {
        let server = MockServer::start().await;
        mount(&server, "/api/stats", ResponseTemplate::new(500).set_body_string("boom")).await;

        let api = ApiClient::new(Client::new(), format!("{}/", server.uri()));
        match api.stats().await {
            Err(ApiError::Http { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected result: {:?}", other.map(|s| s.recent_chats.len())),
        }

        let mut history = ChatHistory::new(api);
        history.fetch().await;
        assert_eq!(history.error(), Some("HTTP 500: boom"));
        assert!(history.entries().is_empty());
    }
}
