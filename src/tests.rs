#[cfg(test)]
mod integration_tests {
    use std::sync::Arc;

    use crate::schemas::{ForecastFormRequest, HealthResponse, WorkflowResponse};
    use crate::test_utils::test_utils::{june_series, setup_test_app};
    use crate::workflow::MISSING_NAME_WARNING;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use common::{ApiResponse, PriceSeries};
    use market::InMemoryProvider;

    fn server_with(provider: Arc<InMemoryProvider>) -> (TestServer, tracing::subscriber::DefaultGuard) {
        let (app, guard) = setup_test_app(provider);
        (TestServer::new(app).unwrap(), guard)
    }

    #[tokio::test]
    async fn test_health_check() {
        let (server, _guard) = server_with(Arc::new(InMemoryProvider::default()));

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: HealthResponse = response.json();
        assert_eq!(body.status, "healthy");
        assert_eq!(body.provider, "memory");
        assert_eq!(body.symbol, "BZ=F");
    }

    #[tokio::test]
    async fn test_form_page() {
        let (server, _guard) = server_with(Arc::new(InMemoryProvider::default()));

        let response = server.get("/").await;

        response.assert_status(StatusCode::OK);
        let html = response.text();
        assert!(html.contains("<form method=\"post\" action=\"/\">"));
        assert!(html.contains("name=\"name\""));
        assert!(!html.contains("alert"));
    }

    #[tokio::test]
    async fn test_form_submission_renders_forecast() {
        let provider = Arc::new(InMemoryProvider::new(june_series()));
        let (server, _guard) = server_with(provider.clone());

        let response = server
            .post("/")
            .form(&ForecastFormRequest {
                name: "Ana".to_string(),
            })
            .await;

        response.assert_status(StatusCode::OK);
        let html = response.text();
        assert!(html.contains("Hello, Ana! Here is the forecast for BZ=F:"));
        assert!(html.contains("Historical data used: 16-05-2024 to 14-06-2024"));
        assert!(html.contains("<td>17-06-2024</td>"));
        assert!(html.contains("<td>21-06-2024</td>"));
        assert!(html.contains("forecast-chart"));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_form_submission_without_name() {
        let provider = Arc::new(InMemoryProvider::new(june_series()));
        let (server, _guard) = server_with(provider.clone());

        let response = server
            .post("/")
            .form(&ForecastFormRequest {
                name: "  ".to_string(),
            })
            .await;

        response.assert_status(StatusCode::OK);
        let html = response.text();
        assert_eq!(html.matches("alert-warning").count(), 1);
        assert!(html.contains(MISSING_NAME_WARNING));
        assert!(!html.contains("<table"));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_form_submission_with_empty_series() {
        let (server, _guard) = server_with(Arc::new(InMemoryProvider::new(PriceSeries::empty())));

        let response = server
            .post("/")
            .form(&ForecastFormRequest {
                name: "Ana".to_string(),
            })
            .await;

        response.assert_status(StatusCode::OK);
        let html = response.text();
        assert_eq!(html.matches("alert-error").count(), 1);
        assert!(html.contains("An error occurred while processing the data: Insufficient data"));
        assert!(!html.contains("<table"));
        assert!(!html.contains("forecast-chart"));
    }

    #[tokio::test]
    async fn test_api_forecast() {
        let (server, _guard) = server_with(Arc::new(InMemoryProvider::new(june_series())));

        let response = server
            .post("/api/v1/forecast")
            .json(&ForecastFormRequest {
                name: "Ana".to_string(),
            })
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<WorkflowResponse> = response.json();
        assert!(body.success);
        assert_eq!(body.data.state, "succeeded");
        assert_eq!(body.data.table.len(), 5);
        assert_eq!(body.data.table[0].date, "17-06-2024");

        let forecast = body.data.forecast.unwrap();
        assert_eq!(forecast.input_series.len(), 22);
        assert_eq!(forecast.predictions.len(), 5);

        let range = body.data.historical_range.unwrap();
        assert_eq!(range.start_date.to_string(), "2024-05-16");
        assert_eq!(range.end_date.to_string(), "2024-06-14");
    }

    #[tokio::test]
    async fn test_api_forecast_without_name() {
        let provider = Arc::new(InMemoryProvider::new(june_series()));
        let (server, _guard) = server_with(provider.clone());

        let response = server
            .post("/api/v1/forecast")
            .json(&ForecastFormRequest::default())
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: ApiResponse<WorkflowResponse> = response.json();
        assert!(!body.success);
        assert_eq!(body.message, MISSING_NAME_WARNING);
        assert_eq!(body.data.state, "idle");
        assert!(body.data.forecast.is_none());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_api_forecast_provider_failure() {
        let provider = Arc::new(InMemoryProvider::failing("No data found, symbol may be delisted"));
        let (server, _guard) = server_with(provider);

        let response = server
            .post("/api/v1/forecast")
            .json(&ForecastFormRequest {
                name: "Ana".to_string(),
            })
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        let body: ApiResponse<WorkflowResponse> = response.json();
        assert!(!body.success);
        assert_eq!(body.data.state, "failed");
        assert!(body.message.contains("symbol may be delisted"));
        assert!(body.data.table.is_empty());
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let (server, _guard) = server_with(Arc::new(InMemoryProvider::default()));

        let response = server.get("/api-docs/openapi.json").await;

        response.assert_status(StatusCode::OK);
        let doc: serde_json::Value = response.json();
        assert!(doc["paths"]["/api/v1/forecast"]["post"].is_object());
        assert!(doc["paths"]["/health"]["get"].is_object());
    }
}
