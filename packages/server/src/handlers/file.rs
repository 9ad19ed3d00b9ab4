use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use common::storage::FileKey;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/files/{key}",
    tag = "Files",
    operation_id = "getFile",
    summary = "Stream a stored entry file",
    description = "Streams a file by its opaque storage key with a content type guessed from the key's extension.",
    params(("key" = String, Path, description = "Opaque file key")),
    responses(
        (status = 200, description = "File bytes"),
        (status = 400, description = "Malformed key (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(key))]
pub async fn get_file(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = FileKey::parse(&key)?;

    let reader = state.files.get_stream(&key).await?;
    let stream = ReaderStream::new(reader);

    let content_type = mime_guess::from_ext(key.extension())
        .first_or_octet_stream()
        .to_string();

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        Body::from_stream(stream),
    ))
}
