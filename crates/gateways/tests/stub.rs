use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    routing::post,
};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use engine::{
    InvoiceError, InvoiceGateway, InvoiceRequest, Money, Notification, Notifier, NotifyError,
};
use gateways::{LogMailer, SmtpConfig, SmtpMailer, XenditClient, XenditConfig};

#[derive(Clone, Default)]
struct Recorded {
    calls: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

impl Recorded {
    fn push(&self, headers: &HeaderMap, body: Value) {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        self.calls.lock().unwrap().push((auth, body));
    }
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn invoice_request() -> InvoiceRequest {
    InvoiceRequest {
        external_id: "reservation-7".to_string(),
        payer_name: "Ana".to_string(),
        payer_email: "ana@example.com".to_string(),
        item_name: "Avanza".to_string(),
        amount: Money::new(150_50),
        description: "Rental of Avanza".to_string(),
    }
}

fn xendit(addr: SocketAddr) -> XenditClient {
    XenditClient::new(XenditConfig::new("xnd_test_key").base_url(format!("http://{addr}"))).unwrap()
}

#[tokio::test]
async fn xendit_invoice_is_created() {
    let recorded = Recorded::default();
    let router = Router::new()
        .route(
            "/v2/invoices",
            post(
                |State(recorded): State<Recorded>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    recorded.push(&headers, body);
                    Json(json!({
                        "id": "inv_123",
                        "invoice_url": "https://checkout.example/inv_123",
                        "status": "PENDING"
                    }))
                },
            ),
        )
        .with_state(recorded.clone());
    let addr = serve(router).await;

    let invoice = xendit(addr)
        .create_invoice(invoice_request())
        .await
        .unwrap();
    assert_eq!(invoice.id, "inv_123");
    assert_eq!(invoice.url, "https://checkout.example/inv_123");

    let calls = recorded.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (auth, body) = &calls[0];
    // base64("xnd_test_key:")
    assert_eq!(auth.as_deref(), Some("Basic eG5kX3Rlc3Rfa2V5Og=="));
    assert_eq!(body["external_id"], "reservation-7");
    assert_eq!(body["amount"].as_f64(), Some(150.5));
    assert_eq!(body["currency"], "IDR");
    assert_eq!(body["invoice_duration"], 86_400);
    assert_eq!(body["customer"]["name"], "Ana");
    assert_eq!(body["customer"]["email"], "ana@example.com");
    assert_eq!(body["items"][0]["name"], "Avanza");
    assert_eq!(body["items"][0]["quantity"], 1);
}

#[tokio::test]
async fn xendit_error_status_is_creation_failure() {
    let router = Router::new().route(
        "/v2/invoices",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error_code": "API_VALIDATION_ERROR", "message": "amount too low"})),
            )
        }),
    );
    let addr = serve(router).await;

    let err = xendit(addr)
        .create_invoice(invoice_request())
        .await
        .unwrap_err();
    match err {
        InvoiceError::CreationFailed(msg) => assert!(msg.contains("amount too low")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn xendit_response_without_url_is_creation_failure() {
    let router = Router::new().route(
        "/v2/invoices",
        post(|| async { Json(json!({"id": "inv_123"})) }),
    );
    let addr = serve(router).await;

    let err = xendit(addr)
        .create_invoice(invoice_request())
        .await
        .unwrap_err();
    assert!(matches!(err, InvoiceError::CreationFailed(_)));
}

#[tokio::test]
async fn xendit_unreachable_is_creation_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = xendit(addr)
        .create_invoice(invoice_request())
        .await
        .unwrap_err();
    assert!(matches!(err, InvoiceError::CreationFailed(_)));
}

/// What an SMTP stub session saw.
#[derive(Debug, Default)]
struct SmtpSession {
    commands: Vec<String>,
    data: String,
}

/// Serves one SMTP session, answering `RCPT TO` with `rcpt_reply`.
async fn smtp_stub(
    rcpt_reply: &'static str,
) -> (SocketAddr, tokio::task::JoinHandle<SmtpSession>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();
        let mut session = SmtpSession::default();

        write.write_all(b"220 stub ESMTP\r\n").await.unwrap();
        let mut in_data = false;
        while let Ok(Some(line)) = lines.next_line().await {
            if in_data {
                if line == "." {
                    in_data = false;
                    write.write_all(b"250 2.0.0 queued\r\n").await.unwrap();
                } else {
                    session.data.push_str(&line);
                    session.data.push('\n');
                }
                continue;
            }
            let verb = line.split_whitespace().next().unwrap_or("").to_ascii_uppercase();
            session.commands.push(line.clone());
            let reply = match verb.as_str() {
                "EHLO" | "HELO" => "250 stub\r\n",
                "RCPT" => rcpt_reply,
                "DATA" => {
                    in_data = true;
                    "354 end data with <CR><LF>.<CR><LF>\r\n"
                }
                "QUIT" => {
                    write.write_all(b"221 bye\r\n").await.unwrap();
                    break;
                }
                _ => "250 2.0.0 ok\r\n",
            };
            write.write_all(reply.as_bytes()).await.unwrap();
        }
        session
    });
    (addr, handle)
}

fn smtp_mailer(addr: SocketAddr) -> SmtpMailer {
    SmtpMailer::new(SmtpConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        username: String::new(),
        password: String::new(),
        sender_name: "Car Rental".to_string(),
        sender_email: "noreply@rental.example".to_string(),
        starttls: false,
        timeout_secs: 5,
    })
    .unwrap()
}

fn notification() -> Notification {
    Notification {
        to: "ana@example.com".to_string(),
        subject: "Welcome".to_string(),
        body: "Hello Ana".to_string(),
    }
}

#[tokio::test]
async fn smtp_mailer_delivers_message() {
    let (addr, session) = smtp_stub("250 2.1.5 ok\r\n").await;

    smtp_mailer(addr).send(notification()).await.unwrap();

    let session = session.await.unwrap();
    assert!(
        session
            .commands
            .iter()
            .any(|cmd| cmd.starts_with("MAIL FROM:<noreply@rental.example>"))
    );
    assert!(
        session
            .commands
            .iter()
            .any(|cmd| cmd.starts_with("RCPT TO:<ana@example.com>"))
    );
    assert!(session.data.contains("Subject: Welcome"));
    assert!(session.data.contains("Hello Ana"));
}

#[tokio::test]
async fn smtp_rejection_is_reported() {
    let (addr, _session) = smtp_stub("550 5.1.1 no such user\r\n").await;

    let err = smtp_mailer(addr).send(notification()).await.unwrap_err();
    assert!(matches!(err, NotifyError::Failed(_)));
}

#[tokio::test]
async fn log_mailer_always_succeeds() {
    assert!(LogMailer.send(notification()).await.is_ok());
}
