//! Login and logout handlers
//!
//! Login drives the guest-to-account merge: authenticate, submit the
//! local library, and only persist the session once the merge has
//! succeeded. On merge failure the user stays a guest with their data
//! intact and can simply retry.

use anyhow::{bail, Context, Result};
use tracing::warn;

use shelfmark_core::{ApiClient, GuestStore, MergeEngine, SessionStore};

use crate::output::Output;

pub async fn login(
    store: &GuestStore,
    api: &ApiClient,
    sessions: &SessionStore,
    email: String,
    output: &Output,
) -> Result<()> {
    if sessions.load().is_authenticated() {
        bail!("Already logged in. Run 'shelfmark logout' first.");
    }

    let response = api.login(&email).await.context("Login failed")?;
    let user = api
        .me(&response.token)
        .await
        .context("Failed to fetch account details")?;

    let mut engine = MergeEngine::new();
    let outcome = engine
        .merge(store, api, &response.token)
        .await
        .context("Failed to merge guest data; you are still a guest and nothing was lost. Retry with 'shelfmark login'")?;

    sessions
        .login(user, response.token)
        .context("Failed to save session")?;

    if outcome.merged_entries > 0 {
        output.success(&format!(
            "Logged in as {}. Merged {} guest entr{} into your account.",
            email,
            outcome.merged_entries,
            if outcome.merged_entries == 1 { "y" } else { "ies" }
        ));
    } else {
        output.success(&format!("Logged in as {}.", email));
    }
    Ok(())
}

pub async fn logout(api: &ApiClient, sessions: &SessionStore, output: &Output) -> Result<()> {
    let state = sessions.load();
    if state.is_guest() {
        output.message("Not logged in.");
        return Ok(());
    }

    // Best effort: the local session is cleared even if the server
    // cannot be reached.
    if let Some(token) = state.token() {
        if let Err(err) = api.logout(token).await {
            warn!(error = %err, "server logout failed, clearing local session anyway");
        }
    }

    sessions.logout().context("Failed to clear session")?;
    output.success("Logged out.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use shelfmark_core::{Config, Entry, MediaItem, MediaType, Status};

    use crate::output::OutputFormat;

    fn test_config(temp_dir: &TempDir, api_url: String) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            api_url,
        }
    }

    fn add_book(store: &GuestStore, title: &str) {
        let media = MediaItem::new(MediaType::Book, title);
        let entry = Entry::new(media.id, Status::Planned);
        store.add_entry(&entry, &media).unwrap();
    }

    async fn mount_auth_endpoints(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-1"})))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": uuid::Uuid::new_v4(),
                "email": "reader@example.com",
                "name": "Reader",
                "created_at": "2026-01-01T00:00:00Z",
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn login_with_failed_merge_keeps_guest_session() {
        let server = MockServer::start().await;
        mount_auth_endpoints(&server).await;
        Mock::given(method("POST"))
            .and(path("/guest/merge"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"error": "database unavailable"})),
            )
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir, server.uri());
        let store = GuestStore::with_config(config.clone());
        add_book(&store, "Dune");
        let before = store.entries();

        let api = ApiClient::new(server.uri()).unwrap();
        let sessions = SessionStore::new(config.clone());
        let output = Output::new(OutputFormat::Quiet);

        let result = login(
            &store,
            &api,
            &sessions,
            "reader@example.com".to_string(),
            &output,
        )
        .await;

        // Merge failure: no session is persisted and the local library
        // is intact, so the user can simply retry
        assert!(result.is_err());
        assert!(sessions.load().is_guest());
        assert!(!config.session_path().exists());
        assert_eq!(store.entries(), before);
    }

    #[tokio::test]
    async fn login_persists_session_after_successful_merge() {
        let server = MockServer::start().await;
        mount_auth_endpoints(&server).await;
        Mock::given(method("POST"))
            .and(path("/guest/merge"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir, server.uri());
        let store = GuestStore::with_config(config.clone());
        add_book(&store, "Dune");

        let api = ApiClient::new(server.uri()).unwrap();
        let sessions = SessionStore::new(config.clone());
        let output = Output::new(OutputFormat::Quiet);

        login(
            &store,
            &api,
            &sessions,
            "reader@example.com".to_string(),
            &output,
        )
        .await
        .unwrap();

        let state = sessions.load();
        assert!(state.is_authenticated());
        assert_eq!(state.token(), Some("tok-1"));
        assert!(store.is_empty());
    }
}
