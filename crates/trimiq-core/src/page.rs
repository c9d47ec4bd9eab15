//! Page routing and the access gate.
//!
//! `PageController` is what runs on every page load: it checks for the
//! session credential, redirects to login when it is missing, and wires up
//! the editor when the editor page loads.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{has_credential, TokenStore};
use crate::editor::Editor;
use crate::models::{Balance, ProcessVideoRequest, ProcessVideoResponse, RegisterRequest};

pub const LOGIN_PATH: &str = "/login.html";
pub const REGISTER_PATH: &str = "/register.html";
pub const EDITOR_PATH: &str = "/editor.html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Login,
    Register,
    Editor,
    /// Any other path. Gated like the editor, with nothing to wire.
    Other(String),
}

impl Page {
    /// Resolve a path by suffix, so `/app/login.html` is the login page.
    pub fn from_path(path: &str) -> Self {
        if path.ends_with(LOGIN_PATH) {
            Page::Login
        } else if path.ends_with(REGISTER_PATH) {
            Page::Register
        } else if path.ends_with(EDITOR_PATH) {
            Page::Editor
        } else {
            Page::Other(path.to_string())
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Page::Login => LOGIN_PATH,
            Page::Register => REGISTER_PATH,
            Page::Editor => EDITOR_PATH,
            Page::Other(path) => path.as_str(),
        }
    }

    /// Pages reachable without a credential
    pub fn is_public(&self) -> bool {
        matches!(self, Page::Login | Page::Register)
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Login => "Login",
            Page::Register => "Register",
            Page::Editor => "Editor",
            Page::Other(path) => path.as_str(),
        }
    }
}

/// True when a load of `path` must be sent to the login page.
pub fn requires_login(path: &str, has_credential: bool) -> bool {
    !has_credential && !Page::from_path(path).is_public()
}

/// What a page load decided.
///
/// The redirect does not cancel the rest of the load: an unauthenticated
/// load of the editor still reports `init_editor`. Adapters that navigate
/// eagerly should follow `redirect` and ignore the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub page: Page,
    pub redirect: Option<Page>,
    pub init_editor: bool,
}

impl LoadOutcome {
    /// The page the user ends up on
    pub fn destination(&self) -> &Page {
        self.redirect.as_ref().unwrap_or(&self.page)
    }
}

pub struct PageController {
    store: Arc<dyn TokenStore>,
    api: ApiClient,
}

impl PageController {
    pub fn new(store: Arc<dyn TokenStore>, api: ApiClient) -> Self {
        Self { store, api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The stored credential, if any. Unreadable storage counts as empty.
    pub fn token(&self) -> Option<String> {
        match self.store.get() {
            Ok(token) => token.filter(|t| has_credential(Some(t))),
            Err(e) => {
                warn!(error = %e, "Failed to read stored token");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Initial load check for `path`.
    pub fn on_load(&self, path: &str) -> LoadOutcome {
        let page = Page::from_path(path);
        let redirect = requires_login(path, self.is_authenticated()).then_some(Page::Login);
        if redirect.is_some() {
            info!(path = path, "No credential stored, redirecting to login");
        }
        LoadOutcome {
            init_editor: page == Page::Editor,
            page,
            redirect,
        }
    }

    /// Wire the editor page.
    ///
    /// The returned future is the balance fetch; spawn it rather than await
    /// it so initialization does not wait on the network.
    pub fn init_editor(
        &self,
    ) -> (Editor, impl Future<Output = Result<Balance, ApiError>> + Send + 'static) {
        debug!("Initializing editor bindings");
        (Editor::wire(), self.fetch_balance())
    }

    /// Single best-effort balance fetch with the stored credential.
    pub fn fetch_balance(&self) -> impl Future<Output = Result<Balance, ApiError>> + Send + 'static {
        let token = self.token();
        let api = self.api.clone();
        async move {
            let token = token.ok_or(ApiError::Unauthorized)?;
            api.with_token(token).fetch_balance().await
        }
    }

    /// Submit a render job with the stored credential.
    pub fn generate_video(
        &self,
        request: ProcessVideoRequest,
    ) -> impl Future<Output = Result<ProcessVideoResponse, ApiError>> + Send + 'static {
        let token = self.token();
        let api = self.api.clone();
        async move {
            let token = token.ok_or(ApiError::Unauthorized)?;
            api.with_token(token).process_video(&request).await
        }
    }

    /// Remove the credential and go to the login page. Safe to call when
    /// nothing is stored.
    pub fn logout(&self) -> Page {
        if let Err(e) = self.store.remove() {
            warn!(error = %e, "Failed to remove stored token");
        }
        info!("Logged out");
        Page::Login
    }

    /// Log in and store the returned token. Returns the page to show next.
    ///
    /// API failures come back as `ApiError` inside the `anyhow::Error`.
    pub async fn login(&self, email: &str, password: &str) -> Result<Page> {
        let login = self.api.login(email, password).await?;
        self.store
            .set(&login.access_token)
            .context("Failed to store token")?;
        Ok(Page::Editor)
    }

    /// Create an account. Returns the server's confirmation message.
    pub async fn register(&self, request: &RegisterRequest) -> Result<String, ApiError> {
        let response = self.api.register(request).await?;
        info!(username = %request.username, "Registered");
        Ok(response.message)
    }
}
