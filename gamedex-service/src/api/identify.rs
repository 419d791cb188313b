//! Image-to-character identification endpoint.

use axum::{
    Json,
    extract::{Multipart, State},
};
use std::sync::Arc;
use tracing::info;

use crate::error::{ServiceError, ServiceResult};

use super::AppState;
use super::games::ReportResponse;

/// Identify which of a game's characters an uploaded image most resembles.
///
/// Multipart form with two fields: `game_name` (text) and `image` (file).
pub async fn identify_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ServiceResult<Json<ReportResponse>> {
    let mut game_name: Option<String> = None;
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::InvalidRequest {
            message: format!("Invalid multipart payload: {}", e),
        })?
    {
        let field_name = field.name().map(|s| s.to_string());
        match field_name.as_deref() {
            Some("game_name") => {
                let value = field.text().await.map_err(|e| ServiceError::InvalidRequest {
                    message: format!("Invalid game_name field: {}", e),
                })?;
                game_name = Some(value);
            }
            Some("image") => {
                let content_type = field.content_type().map(|s| s.to_string());
                if let Some(content_type) = content_type {
                    if !content_type.starts_with("image/") {
                        return Err(ServiceError::InvalidRequest {
                            message: format!("Unsupported content type: {}", content_type),
                        });
                    }
                }
                let bytes = field.bytes().await.map_err(|e| ServiceError::InvalidRequest {
                    message: format!("Failed to read image field: {}", e),
                })?;
                image = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let game_name = game_name
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ServiceError::InvalidRequest {
            message: "game_name field is required".to_string(),
        })?;
    let image = image
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ServiceError::InvalidRequest {
            message: "image field is required".to_string(),
        })?;

    // Checked against the live config so settings updates apply immediately
    let max_image_bytes = state
        .service
        .config
        .dynamic()
        .limits
        .max_image_size_bytes;
    ensure_image_size(image.len(), max_image_bytes)?;

    info!(game = %game_name, bytes = image.len(), "Identification request");

    let text = state
        .service
        .identify_character(&game_name, &image)
        .await?;

    Ok(Json(ReportResponse { text }))
}

fn ensure_image_size(len: usize, max_bytes: u64) -> ServiceResult<()> {
    if len as u64 > max_bytes {
        return Err(ServiceError::InvalidRequest {
            message: format!(
                "Image is {} bytes; the configured maximum is {} bytes",
                len, max_bytes
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_size_within_limit_is_accepted() {
        assert!(ensure_image_size(1024, 1024).is_ok());
        assert!(ensure_image_size(0, 1024).is_ok());
    }

    #[test]
    fn test_image_size_over_limit_is_rejected() {
        let result = ensure_image_size(2048, 1024);
        assert!(matches!(
            result,
            Err(ServiceError::InvalidRequest { .. })
        ));
    }
}
