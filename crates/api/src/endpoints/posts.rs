//! Post endpoints: feeds, detail, create, edit, comments.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::Uri,
    response::Response,
};
use serde::Deserialize;
use zapis_common::{AppError, AppResult, FeedCache};
use zapis_core::services::comment::CreateCommentInput;
use zapis_core::{CreatePostInput, ImageUpload, UpdatePostInput, guard};

use super::FeedQuery;
use crate::extractors::MaybeAuthUser;
use crate::middleware::AppState;
use crate::response::{self, PageResponse, PostDetailResponse};

/// Fields of the multipart post form.
#[derive(Debug, Default)]
struct PostForm {
    text: Option<String>,
    group_slug: Option<String>,
    image: Option<ImageUpload>,
}

async fn read_post_form(mut multipart: Multipart) -> AppResult<PostForm> {
    let mut form = PostForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "text" => {
                form.text = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            "group" => {
                let slug = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.group_slug = (!slug.is_empty()).then_some(slug);
            }
            "image" => {
                let filename = field.file_name().unwrap_or("upload.bin").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
                    .to_vec();
                if !data.is_empty() {
                    form.image = Some(ImageUpload {
                        filename,
                        content_type,
                        data,
                    });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// `GET /api/posts` — the global feed, served through the page cache.
pub async fn global_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Response, AppError> {
    let page_number = query.page_number();
    let key = FeedCache::page_key("global", page_number);

    if let Some(cached) = state.feed_cache.get(&key).await {
        return Ok(response::ok(cached));
    }

    let page = state.timeline.global_feed(page_number).await?;
    let payload = serde_json::to_value(PageResponse::from(page))
        .map_err(|e| AppError::Internal(e.to_string()))?;
    state.feed_cache.set(&key, payload.clone()).await;

    Ok(response::ok(payload))
}

/// `POST /api/posts` — publish a post.
pub async fn create_post(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    uri: Uri,
    multipart: Multipart,
) -> Result<Response, AppError> {
    if let Some(denied) =
        response::deny(guard::can_create_post(viewer.as_ref(), super::full_path(&uri)))
    {
        return Ok(denied);
    }
    let author = viewer.ok_or(AppError::Unauthorized)?;

    let form = read_post_form(multipart).await?;
    let text = form
        .text
        .ok_or_else(|| AppError::BadRequest("text field is required".to_string()))?;

    let post = state
        .posts
        .create(
            &author,
            CreatePostInput {
                text,
                group_slug: form.group_slug,
                image: form.image,
            },
        )
        .await?;

    Ok(response::created(post))
}

/// `GET /api/posts/{id}` — a post with comments and author context.
pub async fn single_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let detail = state.timeline.single_post(&id).await?;

    Ok(response::ok(PostDetailResponse {
        post: detail.post,
        author: detail.author.into(),
        comments: detail.comments,
        author_post_count: detail.author_post_count,
    }))
}

/// `POST /api/posts/{id}` — edit a post. Author only; everyone else is
/// sent away before the form is read.
pub async fn edit_post(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<String>,
    uri: Uri,
    multipart: Multipart,
) -> Result<Response, AppError> {
    // Anonymous editors go to login before the post is even looked up.
    let Some(viewer) = viewer else {
        return response::deny(guard::login_redirect(super::full_path(&uri)))
            .ok_or(AppError::Unauthorized);
    };

    let post = state.posts.get_by_id(&id).await?;

    if let Some(denied) =
        response::deny(guard::can_edit_post(Some(&viewer), &post, super::full_path(&uri)))
    {
        return Ok(denied);
    }

    let form = read_post_form(multipart).await?;
    let text = form
        .text
        .ok_or_else(|| AppError::BadRequest("text field is required".to_string()))?;

    let updated = state
        .posts
        .update(
            post,
            UpdatePostInput {
                text,
                group_slug: form.group_slug,
                image: form.image,
            },
        )
        .await?;

    Ok(response::ok(updated))
}

/// JSON body for adding a comment.
#[derive(Debug, Deserialize)]
pub struct CommentBody {
    /// Comment text.
    pub text: String,
}

/// `POST /api/posts/{id}/comments` — add a comment.
pub async fn create_comment(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<String>,
    uri: Uri,
    Json(body): Json<CommentBody>,
) -> Result<Response, AppError> {
    if let Some(denied) = response::deny(guard::can_comment(viewer.as_ref(), super::full_path(&uri)))
    {
        return Ok(denied);
    }
    let author = viewer.ok_or(AppError::Unauthorized)?;

    let comment = state
        .comments
        .create(&author, &id, CreateCommentInput { text: body.text })
        .await?;

    Ok(response::created(comment))
}
