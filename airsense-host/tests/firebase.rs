use airsense_api::SensorRecord;
use airsense_embedded::CloudPush;
use airsense_host::publish::FirebaseClient;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

fn record() -> SensorRecord {
    SensorRecord {
        humidity: 55.0,
        temperature_c: 18.5,
        pm1_0: 7,
        pm2_5: 11,
        pm10: 15,
        time: "2024-3-7 9:5:3".into(),
    }
}

/// Accepts one request, answers with `status` and `body`, and returns the raw request.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];

        loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if request.len() >= head_end + 4 + length || n == 0 {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        String::from_utf8(request).unwrap()
    });

    (base_url, handle)
}

#[tokio::test]
async fn test_push_returns_assigned_key() {
    let (base_url, server) = serve_once("200 OK", r#"{"name":"-NabcXYZ"}"#).await;
    let mut client = FirebaseClient::with_base_url(base_url, "secret").unwrap();

    let key = client.push("/ENV-DATA-LOG", &record()).await.unwrap();
    assert_eq!(key, "-NabcXYZ");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /ENV-DATA-LOG.json?auth=secret HTTP/1.1"));
    assert!(request.contains("\"temperature_C\":18.5"));
    assert!(request.contains("\"PM2_5\":11"));
    assert!(request.contains("\"time\":\"2024-3-7 9:5:3\""));
}

#[tokio::test]
async fn test_rejected_push_is_an_error() {
    let (base_url, server) =
        serve_once("401 Unauthorized", r#"{"error":"Permission denied"}"#).await;
    let mut client = FirebaseClient::with_base_url(base_url, "wrong").unwrap();

    let err = client.push("/ENV-DATA-LOG", &record()).await.unwrap_err();
    assert!(err.to_string().contains("401"));

    server.await.unwrap();
}
