/*
 * Responsibility
 * - POST /itinerary/add (multipart: title, description, location, user, image)
 * - GET  /itinerary/all
 */
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::dto::itineraries::{ItineraryCreatedResponse, ItineraryResponse},
    error::AppError,
    services::itinerary::{ImageKind, ItinerarySubmission, UNSUPPORTED_IMAGE, UploadedImage},
    state::AppState,
};

pub async fn add_itinerary(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ItineraryCreatedResponse>), AppError> {
    let submission = read_submission(multipart?).await?;

    let row = state.itineraries.add(submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(ItineraryCreatedResponse {
            message: "Itinerary posted successfully!",
            id: row.id,
        }),
    ))
}

pub async fn list_itineraries(
    State(state): State<AppState>,
) -> Result<Json<Vec<ItineraryResponse>>, AppError> {
    let rows = state.itineraries.list_all().await?;
    Ok(Json(rows.into_iter().map(ItineraryResponse::from).collect()))
}

async fn read_submission(mut multipart: Multipart) -> Result<ItinerarySubmission, AppError> {
    let mut title = None;
    let mut description = None;
    let mut location = None;
    let mut owner = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        match field.name() {
            Some("title") => title = Some(field.text().await.map_err(malformed)?),
            Some("description") => description = Some(field.text().await.map_err(malformed)?),
            Some("location") => location = Some(field.text().await.map_err(malformed)?),
            Some("user") => owner = Some(field.text().await.map_err(malformed)?),
            Some("image") => {
                // The bytes are sniffed again in the service; this only fails early.
                if field
                    .content_type()
                    .is_some_and(|ct| ImageKind::from_mime(ct).is_none())
                {
                    return Err(AppError::bad_request(UNSUPPORTED_IMAGE));
                }
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(malformed)?;
                image = Some(UploadedImage {
                    file_name,
                    data: data.to_vec(),
                });
            }
            // Unknown parts are drained and ignored.
            _ => {}
        }
    }

    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::bad_request("Title is required"))?;
    let image = image
        .filter(|i| !i.data.is_empty())
        .ok_or_else(|| AppError::bad_request("Image is required"))?;
    let owner_id = owner
        .as_deref()
        .map(str::trim)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| AppError::bad_request("A valid user id is required"))?;

    Ok(ItinerarySubmission {
        title,
        description: description.unwrap_or_default(),
        location: location.unwrap_or_default(),
        owner_id,
        image,
    })
}

fn malformed(err: MultipartError) -> AppError {
    tracing::warn!(error = %err, "rejected multipart body");
    AppError::bad_request(err.body_text())
}
