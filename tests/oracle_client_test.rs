#[cfg(test)]
mod oracle_client_integration_tests {
    use serde_json::json;

    use perfcore::config::OracleConfig;
    use perfcore::metrics::CriterionAverage;
    use perfcore::oracle::{
        summarize_or_fallback, ChatCompletionClient, SummaryOracle, FALLBACK_SUMMARY,
    };

    fn config_for(server: &mockito::ServerGuard) -> OracleConfig {
        OracleConfig {
            base_url: server.url(),
            api_key: "test-key".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 5,
        }
    }

    fn criteria() -> Vec<CriterionAverage> {
        vec![CriterionAverage {
            name: "quality".to_string(),
            average_score: 8.0,
            frequency: 4,
        }]
    }

    #[tokio::test]
    async fn client_extracts_the_completion_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{
                        "message": {"content": "Consistent, high-quality delivery."}
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ChatCompletionClient::new(config_for(&server));
        let summary = client
            .summarize(&["shipped ahead of schedule".to_string()], &criteria())
            .await
            .unwrap();

        assert_eq!(summary, "Consistent, high-quality delivery.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_becomes_the_fallback_string() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let client = ChatCompletionClient::new(config_for(&server));
        let summary = summarize_or_fallback(&client, &[], &criteria()).await;
        assert_eq!(summary, FALLBACK_SUMMARY);
    }

    #[tokio::test]
    async fn empty_completion_becomes_the_fallback_string() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"choices": [{"message": {"content": "  "}}]}).to_string())
            .create_async()
            .await;

        let client = ChatCompletionClient::new(config_for(&server));
        let summary = summarize_or_fallback(&client, &[], &[]).await;
        assert_eq!(summary, FALLBACK_SUMMARY);
    }
}
