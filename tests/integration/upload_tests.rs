//! Multipart uploads and serving the stored files back

use crate::common::fixtures::{Session, TestContext};
use crate::{call, test_app};
use actix_web::http::{StatusCode, header};
use actix_web::test::TestRequest;

const BOUNDARY: &str = "----taskhub-test-boundary";

/// One part of a hand-built multipart body
struct Part<'a> {
    field: &'a str,
    filename: &'a str,
    mime: &'a str,
    data: &'a [u8],
}

fn multipart(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.field, part.filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.mime).as_bytes());
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload(uri: &str, session: &Session, parts: &[Part<'_>]) -> TestRequest {
    TestRequest::post()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", session.token)))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart(parts))
}

#[actix_web::test]
async fn test_single_upload_is_stored_and_served() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;

    let (status, body) = call!(
        app,
        upload(
            "/api/upload",
            &alice,
            &[Part {
                field: "file",
                filename: "notes.pdf",
                mime: "application/pdf",
                data: b"%PDF-1.4 tiny",
            }]
        )
    );
    assert_eq!(status, StatusCode::OK, "{}", body);
    let file = &body["data"];
    assert_eq!(file["name"], "notes.pdf");
    assert_eq!(file["size"], 13);
    assert_eq!(file["type"], "application/pdf");
    let url = file["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/file-"));
    assert!(url.ends_with(".pdf"));

    let resp = actix_web::test::call_service(&app, TestRequest::get().uri(&url).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = actix_web::test::read_body(resp).await;
    assert_eq!(&bytes[..], b"%PDF-1.4 tiny");
}

#[actix_web::test]
async fn test_upload_rejects_disallowed_types() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;

    let (status, body) = call!(
        app,
        upload(
            "/api/upload",
            &alice,
            &[Part {
                field: "file",
                filename: "setup.exe",
                mime: "application/x-msdownload",
                data: b"MZ",
            }]
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid file type. Only images and documents are allowed."
    );
}

#[actix_web::test]
async fn test_multiple_upload_and_missing_files() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;

    let (status, body) = call!(
        app,
        upload(
            "/api/upload/multiple",
            &alice,
            &[
                Part {
                    field: "files",
                    filename: "a.png",
                    mime: "image/png",
                    data: b"\x89PNG",
                },
                Part {
                    field: "files",
                    filename: "b.docx",
                    mime: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                    data: b"PK\x03\x04",
                },
            ]
        )
    );
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][1]["name"], "b.docx");

    // Parts under another field name are ignored
    let (status, body) = call!(
        app,
        upload(
            "/api/upload",
            &alice,
            &[Part {
                field: "attachment",
                filename: "a.png",
                mime: "image/png",
                data: b"\x89PNG",
            }]
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file uploaded");
}

#[actix_web::test]
async fn test_upload_requires_authentication() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let (status, _) = call!(
        app,
        TestRequest::post()
            .uri("/api/upload")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(multipart(&[]))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_rejected_batch_leaves_no_files_behind() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;

    let (status, body) = call!(
        app,
        upload(
            "/api/upload/multiple",
            &alice,
            &[
                Part {
                    field: "files",
                    filename: "a.png",
                    mime: "image/png",
                    data: b"\x89PNG",
                },
                Part {
                    field: "files",
                    filename: "setup.exe",
                    mime: "application/x-msdownload",
                    data: b"MZ",
                },
            ]
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid file type. Only images and documents are allowed."
    );

    let left = std::fs::read_dir(ctx.state.storage.files.base_path())
        .unwrap()
        .count();
    assert_eq!(left, 0);
}
