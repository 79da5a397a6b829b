use axum::{
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "web"]
struct WebAssets;

/// Serve the form page and its embedded assets
pub async fn serve_static(uri: Uri) -> Response {
    let path = match uri.path().trim_start_matches('/') {
        "" => "index.html",
        path => path,
    };

    if let Some(content) = <WebAssets as Embed>::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime.as_ref())],
            content.data.into_owned(),
        )
            .into_response();
    }

    if path == "index.html" {
        return Html(FALLBACK_HTML).into_response();
    }

    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

const FALLBACK_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Car Price Estimator</title>
</head>
<body>
    <h1>Car Price Estimator</h1>
    <p>The web assets were not embedded in this build. POST the ten inputs as JSON to
    <code>/api/predict</code>; see <code>/api/features</code> for field names and ranges.</p>
</body>
</html>
"#;
