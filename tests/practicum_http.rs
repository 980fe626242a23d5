use homework_bot::practicum::{ApiError, HomeworkApi, PracticumClient};
use reqwest::Url;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve exactly one HTTP response and hand back the raw request head.
async fn one_shot_server(status_line: &'static str, body: &'static str) -> (Url, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
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
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&buf).to_string()
    });
    let url = Url::parse(&format!("http://{}/api/user_api/homework_statuses/", addr)).unwrap();
    (url, handle)
}

#[tokio::test]
async fn ok_response_is_returned_verbatim() {
    let body = r#"{"homeworks":[{"homework_name":"hw1","status":"approved"}],"current_date":1000,"extra":true}"#;
    let (url, server) = one_shot_server("200 OK", body).await;
    let client = PracticumClient::with_endpoint("tok".into(), url);

    let value = client.fetch(42).await.unwrap();
    assert_eq!(value["current_date"], 1000);
    assert_eq!(value["extra"], true);

    let head = server.await.unwrap().to_lowercase();
    assert!(head.starts_with("get /api/user_api/homework_statuses/?from_date=42 "));
    assert!(head.contains("authorization: oauth tok"));
}

#[tokio::test]
async fn non_200_is_wrong_status() {
    let (url, server) = one_shot_server("404 Not Found", r#"{"code":"not_found"}"#).await;
    let client = PracticumClient::with_endpoint("tok".into(), url);

    let err = client.fetch(1).await.unwrap_err();
    match err {
        ApiError::WrongStatus { code, reason, body } => {
            assert_eq!(code, 404);
            assert_eq!(reason, "Not Found");
            assert!(body.contains("not_found"));
        }
        other => panic!("wrong error: {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn invalid_json_is_decode_error() {
    let (url, server) = one_shot_server("200 OK", "<html>").await;
    let client = PracticumClient::with_endpoint("tok".into(), url);

    assert!(matches!(client.fetch(1).await, Err(ApiError::Decode(_))));
    server.await.unwrap();
}

#[tokio::test]
async fn refused_connection_is_connection_error() {
    // bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let url = Url::parse(&format!("http://{}/api/", addr)).unwrap();
    let client = PracticumClient::with_endpoint("tok".into(), url);

    match client.fetch(77).await.unwrap_err() {
        ApiError::Connection {
            endpoint, params, ..
        } => {
            assert!(endpoint.contains(&addr.port().to_string()));
            assert_eq!(params, "from_date=77");
        }
        other => panic!("wrong error: {other:?}"),
    }
}
