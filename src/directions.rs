use crate::config::Config;
use crate::core::DirectionsClient;
use crate::error::{FetchCause, RouteError};
use crate::models::{DirectionsResponse, RouteQuery};
use anyhow::Error;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Google Directions JSON API.
#[derive(Clone)]
pub struct GoogleDirections {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoogleDirections {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Self::new(&config.base_url, config.api_key.clone(), config.timeout)
    }

    fn endpoint(&self) -> String {
        format!("{}/directions/json", self.base_url)
    }
}

impl DirectionsClient for GoogleDirections {
    fn directions<'a>(&'a self, query: &'a RouteQuery) -> Pin<Box<dyn Future<Output = Result<DirectionsResponse, RouteError>> + 'a>> {
        Box::pin(async move {
            let url = self.endpoint();
            let response = self
                .client
                .get(&url)
                .query(&[
                    ("origin", query.origin.to_string()),
                    ("destination", query.destination.to_string()),
                    ("key", self.api_key.clone()),
                ])
                .send()
                .await
                .map_err(|e| {
                    // reqwest includes the full URL in its message, credential included.
                    log::error!("directions request to {} failed", url);
                    FetchCause::Transport(e.without_url().to_string())
                })?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| FetchCause::Transport(e.without_url().to_string()))?;

            if !status.is_success() {
                log::error!("directions service returned {}. Body: {}", status, text);
                return Err(FetchCause::HttpStatus {
                    status: status.as_u16(),
                    body: text,
                }
                .into());
            }

            let resp: DirectionsResponse = serde_json::from_str(&text).map_err(|e| {
                log::error!("Failed to parse DirectionsResponse. Error: {}. Body: {}", e, text);
                FetchCause::Parse(e)
            })?;
            Ok(resp)
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::Coordinate;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    // Serves a single canned response and hands back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });
        (format!("http://{}/maps/api/", addr), handle)
    }

    fn query() -> RouteQuery {
        RouteQuery {
            origin: Coordinate::new(38.5, -120.2),
            destination: Coordinate::new(-8.839988, 13.289437),
        }
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GoogleDirections::new("https://maps.googleapis.com/maps/api/", "k".into(), Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint(), "https://maps.googleapis.com/maps/api/directions/json");
    }

    #[tokio::test]
    async fn test_directions_sends_query() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"routes": [{"overview_polyline": {"points": "_p~iF~ps|U"}}], "status": "OK"}"#,
        )
        .await;
        let client = GoogleDirections::new(&base, "secret".into(), Duration::from_secs(5)).unwrap();
        let resp = client.directions(&query()).await.unwrap();
        assert_eq!(resp.routes[0].polyline.points, "_p~iF~ps|U");

        let request = server.await.unwrap();
        let request_line = request.lines().next().unwrap();
        assert!(request_line.starts_with("GET /maps/api/directions/json?"), "{}", request_line);
        assert!(request_line.contains("origin=38.5%2C-120.2"), "{}", request_line);
        assert!(request_line.contains("destination=-8.839988%2C13.289437"), "{}", request_line);
        assert!(request_line.contains("key=secret"), "{}", request_line);
    }

    #[tokio::test]
    async fn test_directions_http_status() {
        let (base, server) = serve_once("503 Service Unavailable", r#"{"error": "busy"}"#).await;
        let client = GoogleDirections::new(&base, "secret".into(), Duration::from_secs(5)).unwrap();
        match client.directions(&query()).await {
            Err(RouteError::FetchFailed(FetchCause::HttpStatus { status, body })) => {
                assert_eq!(status, 503);
                assert_eq!(body, r#"{"error": "busy"}"#);
            }
            other => panic!("unexpected {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_directions_malformed_body() {
        let (base, server) = serve_once("200 OK", "<html>not json</html>").await;
        let client = GoogleDirections::new(&base, "secret".into(), Duration::from_secs(5)).unwrap();
        let res = client.directions(&query()).await;
        assert!(matches!(res, Err(RouteError::FetchFailed(FetchCause::Parse(_)))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_directions_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without ever answering.
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let client = GoogleDirections::new(&format!("http://{}", addr), "secret".into(), Duration::from_millis(200)).unwrap();
        let started = std::time::Instant::now();
        let res = client.directions(&query()).await;
        assert!(matches!(res, Err(RouteError::FetchFailed(FetchCause::Transport(_)))), "{:?}", res);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_directions_transport_failure_hides_key() {
        // Bind then drop to get a port nobody listens on.
        let addr = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();
        let client = GoogleDirections::new(&format!("http://{}", addr), "secret".into(), Duration::from_secs(5)).unwrap();
        match client.directions(&query()).await {
            Err(RouteError::FetchFailed(FetchCause::Transport(message))) => assert!(!message.contains("secret")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
