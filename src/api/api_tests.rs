#[cfg(test)]
mod router_tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::api::{app_state::AppState, create_router};
    use crate::config::AppConfig;
    use crate::index::embedding::SimpleEmbeddingModel;
    use crate::index::{SemanticIndex, create_vector_index};
    use crate::models::patient::PatientInfo;
    use crate::observability::AppMetrics;
    use crate::services::generation::SimpleTextGenerator;
    use crate::services::notes::NoteGenerator;
    use crate::services::session::DocumentationSession;

    async fn full_app(seed: bool) -> (Router, AppState) {
        let index = SemanticIndex::new(
            Box::new(SimpleEmbeddingModel::new(64)),
            create_vector_index(64),
        )
        .unwrap();
        let notes = NoteGenerator::new(Box::new(SimpleTextGenerator), 2048);
        let mut session =
            DocumentationSession::new(PatientInfo::new(62, "male"), Some(index), Some(notes));
        if seed {
            session.seed_demo_events().await.unwrap();
        }
        build(session)
    }

    fn degraded_app() -> (Router, AppState) {
        build(DocumentationSession::new(
            PatientInfo::new(62, "male"),
            None,
            None,
        ))
    }

    fn build(session: DocumentationSession) -> (Router, AppState) {
        let state = AppState::new(session, AppMetrics::default());
        let router = create_router(state.clone(), &AppConfig::development().server);
        (router, state)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_chat_records_symptom() {
        let (app, state) = full_app(false).await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/chat",
                json!({"text": "Patient has headache after breakfast"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let reply = body["reply"].as_str().unwrap();
        assert!(reply.starts_with("Symptom documented: headache"));
        assert!(reply.contains("Food relation: after food"));

        let session = state.session.lock().await;
        assert_eq!(session.timeline().len(), 1);
        assert_eq!(session.index_len(), Some(1));
    }

    #[tokio::test]
    async fn test_chat_accepts_message_alias() {
        let (app, _) = full_app(false).await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/chat",
                json!({"message": "Gave metformin 1000mg in morning"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let reply = body["reply"].as_str().unwrap();
        assert!(reply.contains("Medication documented: metformin"));
        assert!(reply.contains("Dose: 1000mg"));
        assert!(reply.contains("Time: morning"));
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_text() {
        let (app, state) = full_app(false).await;

        let (status, body) = send(&app, post_json("/api/chat", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");

        let (status, _) = send(&app, post_json("/api/chat", json!({"text": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(state.session.lock().await.timeline().is_empty());
    }

    #[tokio::test]
    async fn test_chat_extraction_miss_is_guidance() {
        let (app, state) = full_app(false).await;

        let (status, body) = send(
            &app,
            post_json("/api/chat", json!({"text": "note patient resting"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert!(
            body["reply"]
                .as_str()
                .unwrap()
                .starts_with("No recognized symptom found in text.")
        );
        assert!(state.session.lock().await.timeline().is_empty());
        assert!(state.metrics.gather().contains("extraction_misses_total 1"));
    }

    #[tokio::test]
    async fn test_patient_info_counts_and_mode() {
        let (app, _) = full_app(true).await;

        let (status, body) = send(&app, get("/api/patient-info")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["patient_info"]["age"], 62);
        assert_eq!(body["patient_info"]["gender"], "male");
        assert_eq!(body["symptom_count"], 2);
        assert_eq!(body["medication_count"], 2);
        assert_eq!(body["mode"], "full");

        let (_, body) = send(&degraded_app().0, get("/api/patient-info")).await;
        assert_eq!(body["mode"], "degraded");
        assert_eq!(body["symptom_count"], 0);
    }

    #[tokio::test]
    async fn test_timeline_is_chronological() {
        let (app, _) = full_app(true).await;

        let (status, body) = send(&app, get("/api/timeline")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 4);

        let stamps: Vec<&str> = body["events"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["timestamp"].as_str().unwrap())
            .collect();
        let mut sorted = stamps.clone();
        sorted.sort();
        assert_eq!(stamps, sorted);
        assert_eq!(body["events"][0]["medication"], "lisinopril");
        assert_eq!(body["events"][0]["type"], "medication");
    }

    #[tokio::test]
    async fn test_frequency_endpoints() {
        let (app, _) = full_app(true).await;

        let (status, body) = send(&app, get("/api/symptoms/Headache/frequency")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["events"][0]["frequency_marker"], "again");

        let (_, body) = send(&app, get("/api/medications/warfarin/frequency")).await;
        assert_eq!(body["total"], 0);
        assert!(body["events"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notes_full_mode() {
        let (app, state) = full_app(true).await;

        let (status, body) = send(&app, post_json("/api/notes/medications", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["note_type"], "medications");
        assert_eq!(body["event_count"], 2);
        assert!(
            body["note"]
                .as_str()
                .unwrap()
                .starts_with("=== MEDICATION ADMINISTRATION RECORD ===")
        );
        assert!(state.metrics.gather().contains("notes_generated_total 1"));
    }

    #[tokio::test]
    async fn test_notes_degraded_mode_is_unavailable() {
        let (app, _) = degraded_app();

        let (status, body) = send(&app, post_json("/api/notes/symptoms", json!({}))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_search() {
        let (app, _) = full_app(true).await;

        let (status, body) = send(&app, get("/api/search?q=medication%20metformin%201000%20mg&k=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_results"], 2);
        assert_eq!(body["results"][0]["event"]["medication"], "metformin");

        let (status, _) = send(&app, get("/api/search?q=fever&k=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, get("/api/search")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route_returns_404() {
        let (app, _) = full_app(false).await;
        let (status, _) = send(&app, get("/api/sessions")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
