use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// `/`: the page that drives both endpoints.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
