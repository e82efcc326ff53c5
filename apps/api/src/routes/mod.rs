pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::applications::handlers as applications;
use crate::companies::handlers as companies;
use crate::files::handlers as files;
use crate::report::handlers as report;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Applications
        .route(
            "/api/applications",
            get(applications::handle_list_applications)
                .post(applications::handle_create_application),
        )
        .route(
            "/api/applications/export-for-llm",
            get(report::handle_export_for_llm),
        )
        .route(
            "/api/applications/:id",
            get(applications::handle_get_application)
                .put(applications::handle_update_application)
                .delete(applications::handle_delete_application),
        )
        .route(
            "/api/applications/:id/files",
            get(applications::handle_list_application_files)
                .post(applications::handle_upload_application_file),
        )
        // Resume versions
        .route(
            "/api/resumes",
            get(resumes::handle_list_resumes).post(resumes::handle_create_resume),
        )
        .route(
            "/api/resumes/:id",
            get(resumes::handle_get_resume)
                .put(resumes::handle_update_resume)
                .delete(resumes::handle_delete_resume),
        )
        .route(
            "/api/resumes/:id/download",
            get(resumes::handle_download_resume),
        )
        .route(
            "/api/resumes/:id/upload",
            post(resumes::handle_upload_resume_file),
        )
        // Target companies
        .route(
            "/api/companies",
            get(companies::handle_list_companies).post(companies::handle_create_company),
        )
        .route(
            "/api/companies/:id",
            get(companies::handle_get_company)
                .put(companies::handle_update_company)
                .delete(companies::handle_delete_company),
        )
        // Application files
        .route(
            "/api/files/:id",
            get(files::handle_get_file).delete(files::handle_delete_file),
        )
        .route("/api/files/:id/download", get(files::handle_download_file))
        .layer(upload_limit)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const BOUNDARY: &str = "jobdesk-test-boundary";

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn multipart_request(uri: &str, fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Request<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, contents)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(contents);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn app() -> Router {
        build_router(AppState::in_memory())
    }

    async fn create_application(app: &Router, body: Value) -> Value {
        let response = send(app, json_request(Method::POST, "/api/applications", body)).await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(&app(), empty_request(Method::GET, "/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_application_status_flow() {
        let app = app();
        let created = create_application(
            &app,
            json!({"company": "Acme", "title": "Rust Engineer", "modality": ["Remote"]}),
        )
        .await;
        assert_eq!(created["status"], "Applied");
        assert_eq!(created["status_history"].as_array().unwrap().len(), 1);
        let id = created["id"].as_str().unwrap().to_string();
        let uri = format!("/api/applications/{id}");

        let response = send(
            &app,
            json_request(
                Method::PUT,
                &uri,
                json!({
                    "status": "Phone Screen",
                    "status_history": [{"status": "Offer", "date": "2020-01-01T00:00:00Z"}]
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        let history: Vec<&str> = updated["status_history"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["status"].as_str().unwrap())
            .collect();
        assert_eq!(history, vec!["Applied", "Phone Screen"]);
        assert_eq!(updated["modality"], json!(["Remote"]));

        let fetched = body_json(send(&app, empty_request(Method::GET, &uri)).await).await;
        assert_eq!(fetched["status"], "Phone Screen");
    }

    #[tokio::test]
    async fn test_unknown_application_is_404() {
        let response = send(
            &app(),
            empty_request(
                Method::GET,
                "/api/applications/00000000-0000-0000-0000-000000000000",
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_blank_company_is_400() {
        let response = send(
            &app(),
            json_request(
                Method::POST,
                "/api/applications",
                json!({"company": " ", "title": "Engineer"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_export_for_llm() {
        let app = app();
        for status in ["Applied", "Applied", "Phone Screen", "Offer", "Rejected"] {
            create_application(
                &app,
                json!({"company": "Acme", "title": "Engineer", "status": status}),
            )
            .await;
        }

        let response = send(
            &app,
            empty_request(Method::GET, "/api/applications/export-for-llm"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response).await;
        assert_eq!(report["format"], "markdown");
        let text = report["text"].as_str().unwrap();
        assert!(text.contains("Active Applications: 3\n"));
        assert!(text.contains("Interview Stage: 1\n"));
        assert!(text.contains("- Applied: 2\n"));
    }

    #[tokio::test]
    async fn test_application_files_upload_download_and_cascade() {
        let app = app();
        let created = create_application(&app, json!({"company": "Acme", "title": "SRE"})).await;
        let id = created["id"].as_str().unwrap().to_string();
        let files_uri = format!("/api/applications/{id}/files");

        let response = send(
            &app,
            multipart_request(&files_uri, &[("file_type", "cover_letter")], Some(("letter.pdf", b"%PDF-1.7"))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let uploaded = body_json(response).await;
        assert_eq!(
            uploaded["file_path"],
            format!("applications/{id}/cover_letter/letter.pdf")
        );

        let listed = body_json(send(&app, empty_request(Method::GET, &files_uri)).await).await;
        let file_id = listed[0]["id"].as_str().unwrap().to_string();

        let response = send(
            &app,
            empty_request(Method::GET, &format!("/api/files/{file_id}/download")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"%PDF-1.7");

        let response = send(
            &app,
            empty_request(Method::DELETE, &format!("/api/applications/{id}")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let listed = body_json(send(&app, empty_request(Method::GET, &files_uri)).await).await;
        assert_eq!(listed, json!([]));
        let response = send(&app, empty_request(Method::GET, &format!("/api/files/{file_id}"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_file_type() {
        let app = app();
        let created = create_application(&app, json!({"company": "Acme", "title": "SRE"})).await;
        let id = created["id"].as_str().unwrap();
        let response = send(
            &app,
            multipart_request(
                &format!("/api/applications/{id}/files"),
                &[("file_type", "portfolio")],
                Some(("site.pdf", b"x")),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_resume_create_and_download() {
        let app = app();
        let response = send(
            &app,
            multipart_request(
                "/api/resumes",
                &[("name", "Backend v3"), ("target_roles", "Backend"), ("description", "")],
                Some(("cv.pdf", b"resume bytes")),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let resume = body_json(response).await;
        assert_eq!(resume["name"], "Backend v3");
        assert_eq!(resume["description"], Value::Null);
        let id = resume["id"].as_str().unwrap();

        let response = send(
            &app,
            empty_request(Method::GET, &format!("/api/resumes/{id}/download")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"cv.pdf\""
        );
    }

    #[tokio::test]
    async fn test_company_crud() {
        let app = app();
        let response = send(
            &app,
            json_request(Method::POST, "/api/companies", json!({"name": "Hooli", "priority": 5})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let company = body_json(response).await;
        let uri = format!("/api/companies/{}", company["id"].as_str().unwrap());

        let updated = body_json(
            send(&app, json_request(Method::PUT, &uri, json!({"status": "Applied"}))).await,
        )
        .await;
        assert_eq!(updated["status"], "Applied");
        assert_eq!(updated["priority"], 5);

        let response = send(&app, empty_request(Method::DELETE, &uri)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(&app, empty_request(Method::GET, &uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
