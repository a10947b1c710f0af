use bulk_scheduler::components::bulk_schedule::{generate, SchedulePreference};
use bulk_scheduler::components::conflict_check::{
    ConflictChecker, ConflictSource, HttpConflictSource,
};
use chrono::NaiveDate;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

/// What the local endpoint saw
#[derive(Debug)]
struct ReceivedRequest {
    url: String,
    authorization: Option<String>,
}

/// Serve one request on a random local port and return the base URL
fn serve_once(status: u16, body: &'static str) -> (String, mpsc::Receiver<ReceivedRequest>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let authorization = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Authorization"))
                .map(|h| h.value.as_str().to_string());
            let _ = tx.send(ReceivedRequest {
                url: request.url().to_string(),
                authorization,
            });

            let header =
                tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                    .unwrap();
            let response = tiny_http::Response::from_string(body)
                .with_status_code(status)
                .with_header(header);
            let _ = request.respond(response);
        }
    });

    (format!("http://127.0.0.1:{}/api", port), rx)
}

#[tokio::test]
async fn test_fetches_counts_with_token() {
    let (base_url, received) = serve_once(
        200,
        r#"{"conflicts":[{"date":"2024-01-02","time":"09:00","count":5}]}"#,
    );
    let source = HttpConflictSource::new(&base_url, Some("secret".to_string())).unwrap();

    let counts = source
        .existing_counts(
            &[NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()],
            &["09:00".to_string()],
        )
        .await
        .unwrap();

    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].count, 5);

    let request = received.recv().unwrap();
    assert_eq!(
        request.url,
        "/api/appointments/conflicts?dates=2024-01-02&times=09%3A00"
    );
    assert_eq!(request.authorization.as_deref(), Some("Bearer secret"));
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let (base_url, _received) = serve_once(500, r#"{"error":"database down"}"#);
    let source = HttpConflictSource::new(&base_url, None).unwrap();

    let err = source
        .existing_counts(
            &[NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()],
            &["09:00".to_string()],
        )
        .await
        .unwrap_err();

    assert!(err.to_string().contains("HTTP 500"));
    assert!(err.to_string().contains("database down"));
}

#[tokio::test]
async fn test_checker_marks_full_slots_from_endpoint() {
    let (base_url, _received) = serve_once(
        200,
        r#"[{"date":"2024-01-02","time":"09:00","count":5},{"date":"2024-01-09","time":"09:00","count":2}]"#,
    );
    let source = HttpConflictSource::new(&base_url, None).unwrap();
    let checker = ConflictChecker::with_default_threshold(Arc::new(source));

    let slots = generate(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        &[SchedulePreference::new(2, "09:00")],
        3,
        60,
    );
    let conflicts = checker.check_conflicts(&slots).await;

    assert!(conflicts.is_full(&slots[0]));
    assert!(!conflicts.is_full(&slots[1]));
    assert_eq!(conflicts.count_for(&slots[1]), 2);
    assert_eq!(conflicts.count_for(&slots[2]), 0);
}

#[tokio::test]
async fn test_checker_fails_open_on_bad_body() {
    let (base_url, _received) = serve_once(200, "not json");
    let source = HttpConflictSource::new(&base_url, None).unwrap();
    let checker = ConflictChecker::with_default_threshold(Arc::new(source));

    let slots = generate(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        &[SchedulePreference::new(2, "09:00")],
        2,
        60,
    );
    let conflicts = checker.check_conflicts(&slots).await;

    assert!(conflicts.is_empty());
}
