use api_client::error::ApiError;
use api_client::{fetch_financial_statements, ApiClient, FiindoClient, StatementKind};
use configuration::ApiConfig;
use core_types::{FiscalPeriod, PeriodType, QuarterIndex};
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> FiindoClient {
    let config = ApiConfig {
        base_url: server.uri(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        timeout_secs: 5,
    };
    FiindoClient::new(&config).unwrap()
}

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn health_check_sends_bearer_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("authorization", "Bearer Test.User"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"Ok, service is running\""))
        .expect(1)
        .mount(&server)
        .await;

    let message = client_for(&server).health_check().await.unwrap();
    assert_eq!(message, "Ok, service is running");
}

#[tokio::test]
async fn unexpected_health_body_is_unhealthy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"Maintenance\""))
        .mount(&server)
        .await;

    let result = client_for(&server).health_check().await;
    assert!(matches!(result, Err(ApiError::Unhealthy(_))));
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/symbols"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    match client_for(&server).fetch_symbols().await {
        Err(ApiError::Status { status, body, .. }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "unauthorized");
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_json_is_a_deserialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/symbols"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let result = client_for(&server).fetch_symbols().await;
    assert!(matches!(result, Err(ApiError::Deserialization { .. })));
}

#[tokio::test]
async fn profile_is_read_from_the_first_data_row() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/v1/general/ABC.L",
        json!({
            "fundamentals": {
                "profile": {
                    "data": [{ "symbol": "ABC.L", "industry": "Consumer Electronics", "price": 42.5 }]
                }
            }
        }),
    )
    .await;
    mount_json(&server, "/api/v1/general/NONE.L", json!({ "fundamentals": {} })).await;

    let client = client_for(&server);
    let profile = client.fetch_profile("ABC.L").await.unwrap().unwrap();
    assert_eq!(profile.industry.as_deref(), Some("Consumer Electronics"));
    assert_eq!(profile.price, Some(dec!(42.5)));

    assert!(client.fetch_profile("NONE.L").await.unwrap().is_none());
}

#[tokio::test]
async fn eod_price_uses_the_most_recent_close() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/v1/eod/ABC.L",
        json!({
            "stockprice": {
                "data": [
                    { "date": "2024-01-02", "close": 10.0 },
                    { "date": "2024-01-04", "close": 12.0 },
                    { "date": "2024-01-03", "close": 11.0 }
                ]
            }
        }),
    )
    .await;

    let price = client_for(&server).fetch_eod_price("ABC.L").await.unwrap();
    assert_eq!(price, Some(dec!(12)));
}

#[tokio::test]
async fn statements_are_assembled_from_both_feeds() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/v1/financials/ABC.L/income_statement",
        json!({
            "fundamentals": { "financials": { "income_statement": { "data": [
                { "date": "2023-12-31", "period": "Q4", "calendarYear": "2023",
                  "revenue": 120, "netIncome": 12, "weightedAverageShsOut": 10 },
                { "date": "2023-09-30", "period": "Q3", "calendarYear": "2023",
                  "revenue": 100, "netIncome": 10, "weightedAverageShsOut": 10 }
            ] } } }
        }),
    )
    .await;
    mount_json(
        &server,
        "/api/v1/financials/ABC.L/balance_sheet_statement",
        json!({
            "fundamentals": { "financials": { "balance_sheet_statement": { "data": [
                { "date": "2023-12-31", "period": "FY", "calendarYear": 2023,
                  "totalDebt": 50, "totalEquity": 100 }
            ] } } }
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/eod/ABC.L"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let statements = fetch_financial_statements(&client, "ABC.L", Some(dec!(30)))
        .await
        .unwrap();

    assert_eq!(statements.len(), 3);
    // EOD lookup failed, so the profile price is carried instead.
    assert!(statements.iter().all(|s| s.price == Some(dec!(30))));

    let q4 = statements
        .iter()
        .find(|s| s.period == FiscalPeriod::Quarter(QuarterIndex::new(2023, 4).unwrap()))
        .unwrap();
    assert_eq!(q4.net_income, Some(dec!(12)));
    assert_eq!(q4.total_debt, None);

    let fy = statements
        .iter()
        .find(|s| s.period.period_type() == Some(PeriodType::FiscalYear))
        .unwrap();
    assert_eq!(fy.total_equity, Some(dec!(100)));
}

#[tokio::test]
async fn missing_statement_branch_reads_as_no_rows() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/v1/financials/ABC.L/income_statement",
        json!({ "fundamentals": { "financials": {} } }),
    )
    .await;

    let rows = client_for(&server)
        .fetch_statement_rows("ABC.L", StatementKind::Income)
        .await
        .unwrap();
    assert!(rows.is_empty());
}
