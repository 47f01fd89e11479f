//! Login and registration
//!
//! These run before a [`Session`] exists, so they work on the credential
//! store and a bare [`ApiClient`] rather than on [`crate::App`].

use crate::error::{ActionError, ActionResult};
use gradedesk_common::api::types::{NewUser, UserAccount};
use gradedesk_common::api::ApiClient;
use gradedesk_common::{CredentialStore, Error, Session, SessionGuard};
use std::sync::Arc;
use tracing::{info, warn};

const LOGIN_FAILED: &str = "Login failed";

fn require_credentials(email: &str, password: &str) -> ActionResult<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ActionError::validation(
            "Please enter your email and password.",
        ));
    }
    Ok(())
}

/// Exchange email and password for a token and persist it
pub async fn login(
    api: &ApiClient,
    store: Arc<CredentialStore>,
    email: &str,
    password: &str,
) -> ActionResult<Session> {
    require_credentials(email, password)?;

    let token = api
        .login(email.trim(), password)
        .await
        .map_err(login_failure)?;
    store.store(&token.access_token)?;
    info!("Logged in as {}", email.trim());

    SessionGuard::enforce(store).map_err(|redirect| ActionError::validation(redirect.to_string()))
}

/// Keep the server's detail; replace the status-only fallback
fn login_failure(err: Error) -> Error {
    warn!("Login rejected: {}", err);
    match err {
        Error::Request { status, message } if message == format!("Request failed: {}", status) => {
            Error::Request {
                status,
                message: LOGIN_FAILED.to_string(),
            }
        }
        Error::Unauthorized(message) if message == "Request failed: 401" => {
            Error::Unauthorized(LOGIN_FAILED.to_string())
        }
        other => other,
    }
}

/// Create an account; the caller logs in separately
pub async fn register(api: &ApiClient, email: &str, password: &str) -> ActionResult<UserAccount> {
    require_credentials(email, password)?;

    let account = api
        .register(&NewUser {
            email: email.trim().to_string(),
            password: password.to_string(),
        })
        .await?;
    info!("Registered account {}", account.email);
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gradedesk_common::api::{ApiRequest, RequestBody, Transport};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct TokenServer {
        seen: Mutex<Vec<ApiRequest>>,
    }

    #[async_trait]
    impl Transport for TokenServer {
        async fn send(&self, request: ApiRequest) -> gradedesk_common::Result<Value> {
            self.seen.lock().unwrap().push(request);
            Ok(json!({ "access_token": "tok-1", "token_type": "bearer" }))
        }
    }

    #[tokio::test]
    async fn test_login_persists_token() {
        let server = Arc::new(TokenServer {
            seen: Mutex::new(Vec::new()),
        });
        let api = ApiClient::new(server.clone());
        let store = Arc::new(CredentialStore::in_memory(None));

        let session = login(&api, Arc::clone(&store), " t@school.org ", "pw")
            .await
            .unwrap();
        assert_eq!(session.credentials().token().as_deref(), Some("tok-1"));

        let seen = server.seen.lock().unwrap();
        assert_eq!(seen[0].path, "/token");
        assert_eq!(
            seen[0].body,
            RequestBody::Form(vec![
                ("username".to_string(), "t@school.org".to_string()),
                ("password".to_string(), "pw".to_string()),
            ])
        );
    }

    #[test]
    fn test_login_failure_fallback() {
        let err = login_failure(Error::Unauthorized("Request failed: 401".to_string()));
        assert_eq!(err.to_string(), "Login failed");

        let err = login_failure(Error::Unauthorized("Incorrect email or password".to_string()));
        assert_eq!(err.to_string(), "Incorrect email or password");

        let err = login_failure(Error::Request {
            status: 500,
            message: "Request failed: 500".to_string(),
        });
        assert_eq!(err.to_string(), "Login failed");
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let server = Arc::new(TokenServer {
            seen: Mutex::new(Vec::new()),
        });
        let api = ApiClient::new(server.clone());
        let store = Arc::new(CredentialStore::in_memory(None));

        let err = login(&api, Arc::clone(&store), "t@school.org", "")
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Validation(_)));
        assert!(server.seen.lock().unwrap().is_empty());
        assert!(!store.has_token());
    }
}
