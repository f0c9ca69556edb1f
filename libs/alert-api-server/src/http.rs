use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};

use alert_store::StoreError;

use super::page::render_alert;
use super::AppState;

// ═══════════════════════════════════════════════════════════════
//  GET /{id}
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.searcher.find(&id).await {
        Ok(record) => Html(render_alert(&record)).into_response(),
        Err(e @ StoreError::NotFound { .. }) => {
            tracing::debug!(%id, "alert lookup miss");
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!(%id, error = %e, "alert lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use alert_store::{AlertRecord, DailyLogWriter, LogSearcher, Status};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::{router, AppState};

    fn alert(id: &str) -> AlertRecord {
        AlertRecord {
            id: id.into(),
            timestamp: "2021-Oct-27 13:40:04".into(),
            source: "mC".into(),
            task_name: "cpu-usage-gt-10".into(),
            short_message: "cpu usage on > 10%".into(),
            long_message: "<b>line1</b>\nline2".into(),
            status: Status::ActionRequired,
        }
    }

    fn app(dir: &std::path::Path) -> axum::Router {
        let searcher = LogSearcher::new(dir, NonZeroU32::new(2).unwrap());
        router(AppState::new(searcher))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_owned());
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn found_alert_renders_html() {
        let tmp = tempfile::tempdir().unwrap();
        let mut writer = DailyLogWriter::open(tmp.path()).unwrap();
        writer.append(&alert("A1")).unwrap();
        writer.close().unwrap();

        let (status, content_type, body) = get(app(tmp.path()), "/A1").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/html"));
        assert!(body.contains("cpu-usage-gt-10"));
        assert!(body.contains("&lt;b&gt;line1&lt;/b&gt;\nline2"));
        assert!(!body.contains("<b>line1"));
    }

    #[tokio::test]
    async fn unknown_id_is_404() {
        let tmp = tempfile::tempdir().unwrap();
        let (status, _, body) = get(app(tmp.path()), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("'nope' not found"));
    }

    #[tokio::test]
    async fn malformed_block_is_500() {
        let tmp = tempfile::tempdir().unwrap();
        // The two-day window still covers this date if the request lands after midnight.
        let today = chrono::Local::now().date_naive();
        std::fs::write(
            alert_store::layout::path_for(tmp.path(), today),
            "bad\nshort\nENDOFbad\n\n",
        )
        .unwrap();

        let (status, _, body) = get(app(tmp.path()), "/bad").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.starts_with("malformed record"));
    }
}
