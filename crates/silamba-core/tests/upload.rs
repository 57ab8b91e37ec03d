use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use silamba_core::upload::{ImageUploader, UploadError, UploadTarget};

async fn imagekit(body: Bytes) -> impl IntoResponse {
    let body = String::from_utf8_lossy(&body);
    if body.contains("name=\"publicKey\"") && body.contains("name=\"fileName\"") {
        (
            StatusCode::OK,
            Json(json!({ "url": "https://ik.imagekit.io/studio/frame.jpg" })),
        )
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({ "message": "Missing publicKey" })))
    }
}

async fn cloudinary_rejects() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": { "message": "Upload preset not found" } })),
    )
}

async fn cloudinary_accepts() -> Json<serde_json::Value> {
    Json(json!({ "secure_url": "https://res.cloudinary.com/studio/image/upload/v1/frame.jpg" }))
}

async fn serve() -> String {
    let app = Router::new()
        .route("/imagekit", post(imagekit))
        .route("/cloudinary/bad", post(cloudinary_rejects))
        .route("/cloudinary/good", post(cloudinary_accepts));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn cloudinary() -> UploadTarget {
    UploadTarget::Cloudinary {
        cloud_name: "studio".to_string(),
        upload_preset: "ml_default".to_string(),
    }
}

#[tokio::test]
async fn test_imagekit_upload_returns_optimized_url() {
    let base = serve().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.jpg");
    std::fs::write(&path, b"not really a jpeg").unwrap();

    let uploader = ImageUploader::new(UploadTarget::ImageKit {
        public_key: "public_test".to_string(),
    })
    .unwrap()
    .with_endpoint(format!("{}/imagekit", base));

    let url = uploader.upload_file(&path).await.unwrap();
    assert_eq!(url, "https://ik.imagekit.io/studio/frame.jpg?tr=f-auto,q-80");
}

#[tokio::test]
async fn test_cloudinary_upload_rewrites_delivery_path() {
    let base = serve().await;
    let uploader = ImageUploader::new(cloudinary())
        .unwrap()
        .with_endpoint(format!("{}/cloudinary/good", base));

    let url = uploader.upload_bytes("frame.jpg", vec![1, 2, 3]).await.unwrap();
    assert_eq!(
        url,
        "https://res.cloudinary.com/studio/image/upload/f_auto,q_auto/v1/frame.jpg"
    );
}

#[tokio::test]
async fn test_provider_rejection_carries_message() {
    let base = serve().await;
    let uploader = ImageUploader::new(cloudinary())
        .unwrap()
        .with_endpoint(format!("{}/cloudinary/bad", base));

    match uploader.upload_bytes("frame.jpg", vec![1, 2, 3]).await {
        Err(UploadError::Rejected { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Upload preset not found");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let uploader = ImageUploader::new(cloudinary()).unwrap();
    let err = uploader
        .upload_file(std::path::Path::new("/definitely/not/here.jpg"))
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::Io { .. }));
}
