use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crypto_market_etl::config::MarketsQuery;
use crypto_market_etl::error::ExtractError;
use crypto_market_etl::services::coingecko::CoinGeckoService;

/// Serve one canned HTTP response and hand back the request line
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/api/v3", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let request = String::from_utf8_lossy(&buf);
        let request_line = request.lines().next().unwrap_or_default().to_string();
        let _ = tx.send(request_line);

        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });

    (base_url, rx)
}

fn service(base_url: String) -> CoinGeckoService {
    CoinGeckoService::new(base_url, MarketsQuery::default(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_markets_sends_query_and_decodes_records() {
    let body = r#"[
        {"id":"bitcoin","symbol":"btc","name":"Bitcoin","current_price":50000,"market_cap":1e12,"total_volume":5e10,"last_updated":"2024-01-01T00:00:00Z"},
        {"id":"ethereum","symbol":"eth","name":"Ethereum","current_price":3000.5,"market_cap":3.6e11,"total_volume":1.2e10,"last_updated":"2024-01-01T00:00:05.123Z"}
    ]"#;
    let (base_url, request_line) = serve_once("200 OK", body).await;

    let records = service(base_url).fetch_markets().await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "bitcoin");
    assert_eq!(records[1].current_price, Some(3000.5));

    let request_line = request_line.await.unwrap();
    assert!(request_line.starts_with("GET /api/v3/coins/markets?"));
    assert!(request_line.contains("vs_currency=usd"));
    assert!(request_line.contains("ids=bitcoin%2Cethereum%2Csolana"));
    assert!(request_line.contains("order=market_cap_desc"));
    assert!(request_line.contains("sparkline=false"));
}

#[tokio::test]
async fn test_non_success_status_is_an_extract_error() {
    let (base_url, _) = serve_once(
        "429 Too Many Requests",
        r#"{"status":{"error_code":429,"error_message":"rate limited"}}"#,
    )
    .await;

    let err = service(base_url).fetch_markets().await.unwrap_err();

    match err {
        ExtractError::Status { status, body } => {
            assert_eq!(status.as_u16(), 429);
            assert!(body.contains("rate limited"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unexpected_body_is_a_decode_error() {
    let (base_url, _) = serve_once("200 OK", r#"{"error":"not a list"}"#).await;

    let err = service(base_url).fetch_markets().await.unwrap_err();
    assert!(matches!(err, ExtractError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_an_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/api/v3", listener.local_addr().unwrap());
    drop(listener);

    let err = service(base_url).fetch_markets().await.unwrap_err();
    assert!(matches!(err, ExtractError::Http(_)));
}
