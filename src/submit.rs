use tracing::{info, warn};
use wrap_context::{arg_context, liab};

use crate::form_model::Payload;

/// Posts the form entries as a JSON object. Any non-2xx status is an error.
pub async fn post_json(
    client: &reqwest::Client,
    endpoint: &str,
    payload: &Payload,
) -> anyhow::Result<()> {
    let response = arg_context!(client.post(endpoint).json(payload).send().await)?;
    let status = response.status();

    if !status.is_success() {
        warn!(%endpoint, %status, "form submission rejected");
        liab!("Request failed: {}", status.as_u16());
    }

    info!(%endpoint, %status, "form submitted");
    anyhow::Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        sync::oneshot,
    };

    /// Accepts one request, hands its body back and answers with `status_line`
    async fn serve_once(status_line: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let (sender, receiver) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buffer = [0u8; 1024];

            loop {
                let read = socket.read(&mut buffer).await.unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buffer[..read]);

                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);

                    if request.len() >= end + 4 + length {
                        let _ = sender.send(text[end + 4..].to_string());
                        break;
                    }
                }
            }

            let response = format!("HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n", status_line);
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        (format!("http://{}/post", address), receiver)
    }

    fn payload() -> Payload {
        Payload::from_iter([
            ("full_name".to_string(), "Jane Doe".to_string()),
            ("assets".to_string(), "5M+".to_string()),
        ])
    }

    #[tokio::test]
    async fn posts_entries_as_json_object() {
        let (endpoint, body) = serve_once("200 OK").await;

        post_json(&reqwest::Client::new(), &endpoint, &payload())
            .await
            .unwrap();

        let body: serde_json::Value = serde_json::from_str(&body.await.unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "full_name": "Jane Doe", "assets": "5M+" })
        );
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (endpoint, _body) = serve_once("500 Internal Server Error").await;

        let err = post_json(&reqwest::Client::new(), &endpoint, &payload())
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("Request failed: 500"));
    }
}
