//! Messages API client against a local fake server.

use memecap::captioning::{
    AnthropicProvider, CAPTION_PROMPT, CaptionProvider, PLACEHOLDER_CAPTION, ProviderError,
    caption_or_placeholder,
};
use memecap::config::ProviderConfig;
use std::io::Read;
use std::sync::mpsc;
use tiny_http::{Header, Response, Server};

/// One request as the fake server saw it.
struct Captured {
    method: String,
    url: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Answer exactly one request with `status` and `body`, reporting what was
/// received. Returns the API base URL to configure.
fn serve_once(status: u16, body: &'static str) -> (String, mpsc::Receiver<Captured>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let mut request = server.recv().unwrap();
        let mut received = String::new();
        request.as_reader().read_to_string(&mut received).unwrap();
        let captured = Captured {
            method: request.method().to_string(),
            url: request.url().to_string(),
            headers: request
                .headers()
                .iter()
                .map(|h| {
                    (
                        h.field.as_str().as_str().to_ascii_lowercase(),
                        h.value.as_str().to_string(),
                    )
                })
                .collect(),
            body: received,
        };
        let response = Response::from_string(body)
            .with_status_code(status)
            .with_header("Content-Type: application/json".parse::<Header>().unwrap());
        request.respond(response).unwrap();
        tx.send(captured).unwrap();
    });

    (format!("http://127.0.0.1:{port}/v1"), rx)
}

fn provider(api_url: String) -> AnthropicProvider {
    let settings = ProviderConfig {
        api_url,
        timeout_secs: 5,
        ..ProviderConfig::default()
    };
    AnthropicProvider::new(settings, Some("test-key".to_string())).unwrap()
}

#[tokio::test]
async fn sends_image_and_prompt_and_returns_caption() {
    let (url, rx) = serve_once(
        200,
        r#"{"id":"msg_01","type":"message","role":"assistant",
            "content":[{"type":"text","text":"Me pretending to work\n"}],
            "stop_reason":"end_turn"}"#,
    );

    let caption = provider(url)
        .request_caption(b"fake image bytes", "image/jpg")
        .await
        .unwrap();
    assert_eq!(caption, "Me pretending to work");

    let seen = rx.recv().unwrap();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.url, "/v1/messages");
    assert_eq!(seen.header("x-api-key"), Some("test-key"));
    assert_eq!(seen.header("anthropic-version"), Some("2023-06-01"));
    assert!(
        seen.header("content-type")
            .is_some_and(|v| v.starts_with("application/json"))
    );

    let body: serde_json::Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(body["model"], "claude-sonnet-4-20250514");
    assert_eq!(body["max_tokens"], 1000);
    let content = &body["messages"][0]["content"];
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(content[0]["type"], "image");
    assert_eq!(content[0]["source"]["type"], "base64");
    // "image/jpg" is normalised before sending
    assert_eq!(content[0]["source"]["media_type"], "image/jpeg");
    assert_eq!(content[0]["source"]["data"], "ZmFrZSBpbWFnZSBieXRlcw==");
    assert_eq!(content[1]["type"], "text");
    assert_eq!(content[1]["text"], CAPTION_PROMPT);
}

#[tokio::test]
async fn unknown_media_type_is_sent_as_jpeg() {
    let (url, rx) = serve_once(200, r#"{"content":[{"type":"text","text":"ok"}]}"#);
    provider(url)
        .request_caption(b"tiff bytes", "image/tiff")
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(&rx.recv().unwrap().body).unwrap();
    assert_eq!(
        body["messages"][0]["content"][0]["source"]["media_type"],
        "image/jpeg"
    );
}

#[tokio::test]
async fn error_status_keeps_api_message() {
    let (url, _rx) = serve_once(
        529,
        r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#,
    );
    let result = provider(url).request_caption(b"x", "image/png").await;
    match result {
        Err(ProviderError::Status { status, message }) => {
            assert_eq!(status, 529);
            assert_eq!(message, "Overloaded (overloaded_error)");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_text_shows_placeholder() {
    let (url, _rx) = serve_once(200, r#"{"content":[{"type":"image"}]}"#);
    let result = provider(url).request_caption(b"x", "image/png").await;
    assert!(matches!(result, Err(ProviderError::Malformed(_))));
    assert_eq!(caption_or_placeholder(result), PLACEHOLDER_CAPTION);
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Bind and drop to get a port nobody listens on.
    let port = {
        let server = Server::http("127.0.0.1:0").unwrap();
        server.server_addr().to_ip().unwrap().port()
    };
    let result = provider(format!("http://127.0.0.1:{port}/v1"))
        .request_caption(b"x", "image/png")
        .await;
    assert!(matches!(result, Err(ProviderError::Network(_))));
}
