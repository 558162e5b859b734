//! Chat record routes.
//!
//! Each handler performs exactly one store operation and then either renders
//! a page or redirects back to the list.  `PATCH` and `DELETE` are routed on
//! their native verbs; the rendered pages submit them from script.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Form, Router};
use tracing::info;

use crate::db::{ChatStore, MsgUpdate, NewChat, StoreError};
use crate::error::ServerError;
use crate::state::AppState;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chats",           get(list_chats).post(create_chat))
        .route("/chats/new",       get(new_chat_form))
        .route("/chats/{id}/edit", get(edit_chat_form))
        .route("/chats/{id}",      patch(update_chat).delete(delete_chat))
}

/// `302 Found` back to the list page.
fn redirect_to_list() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/chats")]).into_response()
}

// ── Handlers ──────────────────────────────────────────────────────────────────

pub async fn list_chats(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, ServerError> {
    let chats = state.store.list_all().await?;
    Ok(Html(state.views.list(&chats)?))
}

pub async fn new_chat_form(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, ServerError> {
    Ok(Html(state.views.new_form()?))
}

/// The redirect is only issued once the write has completed.
pub async fn create_chat(
    State(state): State<Arc<AppState>>,
    Form(chat): Form<NewChat>,
) -> Result<Response, ServerError> {
    let record = state.store.create(chat).await?;
    info!(id = %record.id, "chat saved");
    Ok(redirect_to_list())
}

/// A missing record still renders the page, just without a form.
pub async fn edit_chat_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, ServerError> {
    let chat = match state.store.get_by_id(&id).await {
        Ok(chat) => Some(chat),
        Err(StoreError::NotFound(_)) => None,
        Err(e) => return Err(e.into()),
    };
    Ok(Html(state.views.edit_form(chat.as_ref())?))
}

pub async fn update_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(update): Form<MsgUpdate>,
) -> Result<Response, ServerError> {
    let record = state.store.update_msg(&id, update).await?;
    info!(id = %record.id, "chat updated");
    Ok(redirect_to_list())
}

pub async fn delete_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ServerError> {
    state.store.delete_by_id(&id).await?;
    info!(%id, "chat deleted");
    Ok(redirect_to_list())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::db::ChatRecord;

    async fn setup() -> (Arc<AppState>, Router) {
        let state = AppState::for_tests().await;
        let app = crate::routes::build(Arc::clone(&state));
        (state, app)
    }

    fn form(method: Method, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn empty(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn seed(state: &AppState, msg: &str) -> ChatRecord {
        state
            .store
            .create(NewChat {
                from: "A".into(),
                to: "B".into(),
                msg: msg.into(),
            })
            .await
            .unwrap()
    }

    fn assert_redirects_to_list(response: &Response) {
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/chats");
    }

    #[tokio::test]
    async fn root_is_working() {
        let (_, app) = setup().await;
        let response = app.oneshot(empty(Method::GET, "/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "working");
    }

    #[tokio::test]
    async fn empty_list_renders() {
        let (_, app) = setup().await;
        let response = app.oneshot(empty(Method::GET, "/chats")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("No chats yet."));
    }

    #[tokio::test]
    async fn new_form_renders_without_store() {
        let (_, app) = setup().await;
        let response = app.oneshot(empty(Method::GET, "/chats/new")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("action=\"/chats\""));
    }

    #[tokio::test]
    async fn create_persists_then_redirects() {
        let (state, app) = setup().await;
        let response = app
            .clone()
            .oneshot(form(Method::POST, "/chats", "from=A&to=B&msg=hi+there"))
            .await
            .unwrap();
        assert_redirects_to_list(&response);

        let chats = state.store.list_all().await.unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].from, "A");
        assert_eq!(chats[0].to, "B");
        assert_eq!(chats[0].msg, "hi there");

        let list = body_text(app.oneshot(empty(Method::GET, "/chats")).await.unwrap()).await;
        assert!(list.contains("hi there"));
    }

    #[tokio::test]
    async fn create_with_missing_field_is_rejected() {
        let (state, app) = setup().await;
        let response = app
            .oneshot(form(Method::POST, "/chats", "from=A&msg=hi"))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
        assert!(state.store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_with_empty_fields_is_stored() {
        let (state, app) = setup().await;
        let response = app
            .oneshot(form(Method::POST, "/chats", "from=&to=&msg="))
            .await
            .unwrap();
        assert_redirects_to_list(&response);

        let chats = state.store.list_all().await.unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].msg, "");
    }

    #[tokio::test]
    async fn storage_failure_is_a_generic_500() {
        let (state, app) = setup().await;
        state.store.close().await;

        let response = app.oneshot(empty(Method::GET, "/chats")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert!(body.contains("internal server error"));
        assert!(!body.to_lowercase().contains("pool"));
    }

    #[tokio::test]
    async fn edit_form_is_prefilled() {
        let (state, app) = setup().await;
        let chat = seed(&state, "original").await;
        let response = app
            .oneshot(empty(Method::GET, &format!("/chats/{}/edit", chat.id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(">original</textarea>"));
    }

    #[tokio::test]
    async fn edit_of_unknown_chat_renders_notice() {
        let (_, app) = setup().await;
        let response = app
            .oneshot(empty(Method::GET, &format!("/chats/{}/edit", Uuid::new_v4())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Chat not found."));
    }

    #[tokio::test]
    async fn edit_of_malformed_id_is_bad_request() {
        let (_, app) = setup().await;
        let response = app
            .oneshot(empty(Method::GET, "/chats/12345/edit"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn patch_updates_only_msg() {
        let (state, app) = setup().await;
        let chat = seed(&state, "before").await;
        let response = app
            .oneshot(form(Method::PATCH, &format!("/chats/{}", chat.id), "msg=after"))
            .await
            .unwrap();
        assert_redirects_to_list(&response);

        let updated = state.store.get_by_id(&chat.id.to_string()).await.unwrap();
        assert_eq!(updated.msg, "after");
        assert_eq!(updated.from, chat.from);
        assert_eq!(updated.to, chat.to);
        assert_eq!(updated.date, chat.date);
    }

    #[tokio::test]
    async fn patch_can_clear_msg() {
        let (state, app) = setup().await;
        let chat = seed(&state, "before").await;
        let response = app
            .oneshot(form(Method::PATCH, &format!("/chats/{}", chat.id), "msg="))
            .await
            .unwrap();
        assert_redirects_to_list(&response);
        let updated = state.store.get_by_id(&chat.id.to_string()).await.unwrap();
        assert_eq!(updated.msg, "");
    }

    #[tokio::test]
    async fn patch_of_malformed_id_is_bad_request() {
        let (_, app) = setup().await;
        let response = app
            .oneshot(form(Method::PATCH, "/chats/42", "msg=after"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_of_malformed_id_is_bad_request() {
        let (_, app) = setup().await;
        let response = app.oneshot(empty(Method::DELETE, "/chats/42")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn patch_of_unknown_chat_is_not_found() {
        let (_, app) = setup().await;
        let response = app
            .oneshot(form(
                Method::PATCH,
                &format!("/chats/{}", Uuid::new_v4()),
                "msg=after",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_removes_and_tolerates_repeats() {
        let (state, app) = setup().await;
        let chat = seed(&state, "bye").await;
        let uri = format!("/chats/{}", chat.id);

        let response = app.clone().oneshot(empty(Method::DELETE, &uri)).await.unwrap();
        assert_redirects_to_list(&response);
        assert!(state.store.list_all().await.unwrap().is_empty());

        let response = app.oneshot(empty(Method::DELETE, &uri)).await.unwrap();
        assert_redirects_to_list(&response);
    }

    #[tokio::test]
    async fn unrouted_paths_fall_back_to_static_assets() {
        let (_, app) = setup().await;
        let response = app
            .clone()
            .oneshot(empty(Method::GET, "/style.css"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(empty(Method::GET, "/no-such-file.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
