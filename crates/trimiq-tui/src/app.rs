//! Application state management for the trimIQ terminal client.
//!
//! This module contains the `App` struct that plays the browser's part: it
//! holds the current page, the form state for the login and register pages,
//! the editor's selections, and the channel that background requests report
//! back on.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use trimiq_core::api::ApiError;
use trimiq_core::editor::{Editor, EditorState, ElementEvent, ElementId, Reaction};
use trimiq_core::models::{Balance, ProcessVideoResponse, RegisterRequest};
use trimiq_core::page::EDITOR_PATH;
use trimiq_core::view::BalanceView;
use trimiq_core::{ApiClient, Config, Page, PageController, TokenStore};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for email and username input.
const MAX_EMAIL_LENGTH: usize = 64;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for the text prompt.
const MAX_PROMPT_LENGTH: usize = 500;

/// Maximum length for the file picker path input.
const MAX_PATH_LENGTH: usize = 1024;

/// Separator between several paths in the file picker
pub const PICKER_SEPARATOR: char = ';';

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    /// File picker open for the given file input
    PickingFile(ElementId),
    EditingPrompt,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
    RegisterLink,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::RegisterLink,
            LoginFocus::RegisterLink => LoginFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::RegisterLink,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::Button => LoginFocus::Password,
            LoginFocus::RegisterLink => LoginFocus::Button,
        }
    }
}

/// Register form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterFocus {
    Username,
    Email,
    Password,
    Button,
    LoginLink,
}

impl RegisterFocus {
    pub fn next(&self) -> Self {
        match self {
            RegisterFocus::Username => RegisterFocus::Email,
            RegisterFocus::Email => RegisterFocus::Password,
            RegisterFocus::Password => RegisterFocus::Button,
            RegisterFocus::Button => RegisterFocus::LoginLink,
            RegisterFocus::LoginLink => RegisterFocus::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            RegisterFocus::Username => RegisterFocus::LoginLink,
            RegisterFocus::Email => RegisterFocus::Username,
            RegisterFocus::Password => RegisterFocus::Email,
            RegisterFocus::Button => RegisterFocus::Password,
            RegisterFocus::LoginLink => RegisterFocus::Button,
        }
    }
}

/// Focusable controls on the editor page, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorFocus {
    VideoUpload,
    AudioUpload,
    Prompt,
    Resolution,
    PaymentToggle,
    Generate,
    Logout,
}

impl EditorFocus {
    pub fn next(&self) -> Self {
        match self {
            EditorFocus::VideoUpload => EditorFocus::AudioUpload,
            EditorFocus::AudioUpload => EditorFocus::Prompt,
            EditorFocus::Prompt => EditorFocus::Resolution,
            EditorFocus::Resolution => EditorFocus::PaymentToggle,
            EditorFocus::PaymentToggle => EditorFocus::Generate,
            EditorFocus::Generate => EditorFocus::Logout,
            EditorFocus::Logout => EditorFocus::VideoUpload,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            EditorFocus::VideoUpload => EditorFocus::Logout,
            EditorFocus::AudioUpload => EditorFocus::VideoUpload,
            EditorFocus::Prompt => EditorFocus::AudioUpload,
            EditorFocus::Resolution => EditorFocus::Prompt,
            EditorFocus::PaymentToggle => EditorFocus::Resolution,
            EditorFocus::Generate => EditorFocus::PaymentToggle,
            EditorFocus::Logout => EditorFocus::Generate,
        }
    }

    /// The page element behind this control, for controls that have one
    pub fn element(&self) -> Option<ElementId> {
        match self {
            EditorFocus::VideoUpload => Some(ElementId::VideoUpload),
            EditorFocus::AudioUpload => Some(ElementId::AudioUpload),
            EditorFocus::PaymentToggle => Some(ElementId::PaymentToggle),
            EditorFocus::Generate => Some(ElementId::GenerateBtn),
            EditorFocus::Logout => Some(ElementId::Logout),
            EditorFocus::Prompt | EditorFocus::Resolution => None,
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned requests.
///
/// Each carries the page-load number it was started under so results from a
/// page the user already left are dropped.
enum BackgroundResult {
    Balance(u64, Result<Balance, ApiError>),
    Generated(u64, Result<ProcessVideoResponse, ApiError>),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub controller: PageController,

    // Navigation
    pub page: Page,
    pub state: AppState,
    load_id: u64,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,
    pub login_notice: Option<String>,

    // Register form state
    pub register_username: String,
    pub register_email: String,
    pub register_password: String,
    pub register_focus: RegisterFocus,
    pub register_error: Option<String>,

    // Editor state
    editor: Option<Editor>,
    pub editor_state: EditorState,
    pub editor_focus: EditorFocus,
    pub balance_view: BalanceView,
    pub generating: bool,
    pub last_video: Option<ProcessVideoResponse>,
    pub picker_input: String,

    // Background task channel
    bg_rx: mpsc::Receiver<BackgroundResult>,
    bg_tx: mpsc::Sender<BackgroundResult>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config, store: Arc<dyn TokenStore>) -> Result<Self> {
        let api = ApiClient::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        debug!(api = api.base_url(), backend = ?config.token_backend, "App::new()");
        let controller = PageController::new(store, api);

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Prefill from env vars or config
        let login_email = std::env::var("TRIMIQ_EMAIL")
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();
        let login_password = std::env::var("TRIMIQ_PASSWORD").unwrap_or_default();

        let editor_state = EditorState::new(config.default_resolution);

        Ok(Self {
            config,
            controller,

            page: Page::Login,
            state: AppState::Normal,
            load_id: 0,

            login_email,
            login_password,
            login_focus: LoginFocus::Email,
            login_error: None,
            login_notice: None,

            register_username: String::new(),
            register_email: String::new(),
            register_password: String::new(),
            register_focus: RegisterFocus::Username,
            register_error: None,

            editor: None,
            editor_state,
            editor_focus: EditorFocus::VideoUpload,
            balance_view: BalanceView::new(),
            generating: false,
            last_video: None,
            picker_input: String::new(),

            bg_rx: rx,
            bg_tx: tx,

            status_message: None,
        })
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Load a page by path, applying the access gate.
    pub fn navigate(&mut self, path: &str) {
        let outcome = self.controller.on_load(path);
        self.load_id += 1;
        self.editor = None;
        self.state = AppState::Normal;
        self.status_message = None;

        let destination = outcome.destination().clone();
        debug!(path = path, destination = destination.path(), "Page load");

        match destination {
            Page::Login => self.show_login(),
            Page::Register => self.show_register(),
            Page::Editor if outcome.init_editor => self.init_editor(),
            _ => {}
        }
        self.page = destination;
    }

    pub fn go_to(&mut self, page: &Page) {
        let path = page.path().to_string();
        self.navigate(&path);
    }

    fn show_login(&mut self) {
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    fn show_register(&mut self) {
        self.register_focus = RegisterFocus::Username;
        self.register_error = None;
    }

    fn init_editor(&mut self) {
        let (editor, fetch) = self.controller.init_editor();
        self.editor = Some(editor);
        self.editor_state = EditorState::new(self.config.default_resolution);
        self.editor_focus = EditorFocus::VideoUpload;
        self.balance_view = BalanceView::new();
        self.generating = false;

        let tx = self.bg_tx.clone();
        let load_id = self.load_id;
        tokio::spawn(async move {
            let outcome = fetch.await;
            Self::send_result(&tx, BackgroundResult::Balance(load_id, outcome)).await;
        });
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();

        if email.is_empty() || password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return Err(anyhow::anyhow!("Email and password required"));
        }

        self.login_error = None;
        self.login_notice = None;

        match self.controller.login(&email, &password).await {
            Ok(next) => {
                self.config.last_email = Some(email);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_password.clear();
                info!("Login successful");
                self.go_to(&next);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(login_error_message(&e));
                Err(e)
            }
        }
    }

    /// Attempt registration with the register form
    pub async fn attempt_register(&mut self) -> Result<()> {
        let request = RegisterRequest {
            username: self.register_username.trim().to_string(),
            email: self.register_email.trim().to_string(),
            password: self.register_password.clone(),
        };

        if request.username.is_empty() || request.email.is_empty() || request.password.is_empty() {
            self.register_error = Some("Username, email and password required".to_string());
            return Err(anyhow::anyhow!("Username, email and password required"));
        }

        self.register_error = None;

        match self.controller.register(&request).await {
            Ok(message) => {
                self.register_password.clear();
                self.login_email = request.email;
                self.go_to(&Page::Login);
                self.login_notice = Some(message);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Registration failed");
                self.register_error = Some(e.user_message());
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // Editor
    // =========================================================================

    /// Deliver an element event to the editor, as a browser would.
    pub fn dispatch(&mut self, event: ElementEvent) {
        let Some(ref editor) = self.editor else {
            return;
        };

        match editor.dispatch(&event, &mut self.editor_state, &self.controller) {
            Reaction::Ignored => {}
            Reaction::OpenPicker(input) => {
                self.picker_input.clear();
                self.state = AppState::PickingFile(input);
            }
            Reaction::Handled(_) => {
                if let Some(request) = self.editor_state.take_generate_request() {
                    self.spawn_generate(request);
                }
            }
            Reaction::Navigate(page) => self.go_to(&page),
        }
    }

    /// Activate the focused control
    pub fn activate_focused(&mut self) {
        match self.editor_focus {
            EditorFocus::Prompt => self.state = AppState::EditingPrompt,
            EditorFocus::Resolution => {
                self.editor_state.resolution = self.editor_state.resolution.next();
            }
            EditorFocus::PaymentToggle => {
                // A checkbox flips and then reports its new state
                let checked = !self.editor_state.payment_mode.is_checked();
                self.dispatch(ElementEvent::Toggled {
                    target: ElementId::PaymentToggle,
                    checked,
                });
            }
            EditorFocus::Generate if self.generating => {
                self.status_message = Some("A video is already being generated".to_string());
            }
            focus => {
                if let Some(element) = focus.element() {
                    self.dispatch(ElementEvent::Click(element));
                }
            }
        }
    }

    /// Close the picker, reporting the chosen files as a change on its input
    pub fn submit_picker(&mut self) {
        let AppState::PickingFile(input) = self.state else {
            return;
        };
        self.state = AppState::Normal;

        let files = parse_picker_input(&self.picker_input);
        self.picker_input.clear();
        // Cancelling a picker fires no change event
        if files.is_empty() {
            return;
        }
        self.dispatch(ElementEvent::FilesChosen { target: input, files });
    }

    pub fn cancel_picker(&mut self) {
        self.picker_input.clear();
        self.state = AppState::Normal;
    }

    fn spawn_generate(&mut self, request: trimiq_core::models::ProcessVideoRequest) {
        self.generating = true;
        self.last_video = None;

        let fut = self.controller.generate_video(request);
        let tx = self.bg_tx.clone();
        let load_id = self.load_id;
        tokio::spawn(async move {
            let outcome = fut.await;
            Self::send_result(&tx, BackgroundResult::Generated(load_id, outcome)).await;
        });
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Helper to send background results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<BackgroundResult>, result: BackgroundResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send background result - channel closed");
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.bg_rx.try_recv() {
            self.process_background_result(result);
        }
    }

    fn process_background_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Balance(load_id, outcome) => {
                if load_id != self.load_id {
                    debug!(load_id, "Dropping balance from an earlier page load");
                    return;
                }
                self.balance_view.apply(&outcome);
            }
            BackgroundResult::Generated(load_id, outcome) => {
                if load_id != self.load_id {
                    return;
                }
                self.generating = false;
                match outcome {
                    Ok(video) => {
                        info!(url = %video.video_url, "Video generated");
                        self.editor_state.notice = Some(video.summary());
                        self.last_video = Some(video);
                    }
                    Err(e) => {
                        error!(error = %e, "Video generation failed");
                        self.editor_state.notice = Some(format!("Generation failed: {}", e.user_message()));
                    }
                }
            }
        }
    }

    pub fn is_editor_ready(&self) -> bool {
        self.editor.is_some()
    }
}

/// Path the client opens first
pub fn start_path() -> &'static str {
    EDITOR_PATH
}

/// Split the picker's text into paths. Blank entries are skipped.
pub fn parse_picker_input(input: &str) -> Vec<PathBuf> {
    input
        .split(PICKER_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Map a login failure to something short for the form
pub fn login_error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api_err) => api_err.user_message(),
        None => format!("Login failed: {}", err),
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an email or username character should be accepted
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

pub fn can_add_prompt_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PROMPT_LENGTH && is_valid_input_char(c)
}

pub fn can_add_path_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PATH_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use trimiq_core::auth::MemoryTokenStore;
    use trimiq_core::models::PaymentMode;

    fn app_with_token(token: Option<&str>) -> App {
        let store = match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        };
        let config = Config {
            api_base_url: "http://127.0.0.1:1".to_string(),
            request_timeout_secs: 1,
            ..Config::default()
        };
        App::new(config, Arc::new(store)).unwrap()
    }

    // -------------------------------------------------------------------------
    // Focus Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_login_focus_cycle() {
        assert_eq!(LoginFocus::Email.next(), LoginFocus::Password);
        assert_eq!(LoginFocus::RegisterLink.next(), LoginFocus::Email); // Wraps around
        assert_eq!(LoginFocus::Email.prev(), LoginFocus::RegisterLink);
    }

    #[test]
    fn test_register_focus_cycle() {
        let mut focus = RegisterFocus::Username;
        for _ in 0..5 {
            focus = focus.next();
        }
        assert_eq!(focus, RegisterFocus::Username);
        assert_eq!(RegisterFocus::Username.prev(), RegisterFocus::LoginLink);
    }

    #[test]
    fn test_editor_focus_elements() {
        assert_eq!(EditorFocus::VideoUpload.element(), Some(ElementId::VideoUpload));
        assert_eq!(EditorFocus::Generate.element(), Some(ElementId::GenerateBtn));
        assert_eq!(EditorFocus::Prompt.element(), None);
        assert_eq!(EditorFocus::Logout.next(), EditorFocus::VideoUpload);
        assert_eq!(EditorFocus::VideoUpload.prev(), EditorFocus::Logout);
    }

    // -------------------------------------------------------------------------
    // Helper Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_picker_input() {
        assert_eq!(
            parse_picker_input(" /tmp/a.mp4 ; ;/tmp/b c.mp4"),
            vec![PathBuf::from("/tmp/a.mp4"), PathBuf::from("/tmp/b c.mp4")]
        );
        assert!(parse_picker_input("   ").is_empty());
    }

    #[test]
    fn test_login_error_message() {
        let err: anyhow::Error = ApiError::Unauthorized.into();
        assert_eq!(login_error_message(&err), "Invalid email or password");

        let other = anyhow::anyhow!("Failed to store token");
        assert_eq!(login_error_message(&other), "Login failed: Failed to store token");
    }

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char(0, 'a'));
        assert!(can_add_email_char(0, '@'));
        assert!(!can_add_email_char(64, 'a'));
        assert!(!can_add_email_char(0, ' '));
        assert!(!can_add_email_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\x00'));
    }

    // -------------------------------------------------------------------------
    // Navigation Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_navigate_without_token_lands_on_login() {
        let mut app = app_with_token(None);
        app.navigate(start_path());
        assert_eq!(app.page, Page::Login);
        assert!(!app.is_editor_ready());
    }

    #[tokio::test]
    async fn test_navigate_to_register_without_token() {
        let mut app = app_with_token(None);
        app.go_to(&Page::Register);
        assert_eq!(app.page, Page::Register);
    }

    #[tokio::test]
    async fn test_editor_upload_opens_picker() {
        let mut app = app_with_token(Some("tok"));
        app.navigate(start_path());
        assert_eq!(app.page, Page::Editor);
        assert!(app.is_editor_ready());

        app.editor_focus = EditorFocus::AudioUpload;
        app.activate_focused();
        assert_eq!(app.state, AppState::PickingFile(ElementId::AudioInput));

        // Cancelled picker changes nothing
        app.submit_picker();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.editor_state.audio_file.is_none());
    }

    #[tokio::test]
    async fn test_editor_payment_toggle() {
        let mut app = app_with_token(Some("tok"));
        app.navigate(start_path());

        app.editor_focus = EditorFocus::PaymentToggle;
        app.activate_focused();
        assert_eq!(app.editor_state.payment_mode, PaymentMode::AdSupported);
        app.activate_focused();
        assert_eq!(app.editor_state.payment_mode, PaymentMode::Balance);
    }

    #[tokio::test]
    async fn test_editor_logout_returns_to_login() {
        let mut app = app_with_token(Some("tok"));
        app.navigate(start_path());

        app.editor_focus = EditorFocus::Logout;
        app.activate_focused();
        assert_eq!(app.page, Page::Login);
        assert!(!app.controller.is_authenticated());

        // The gate now holds
        app.navigate(start_path());
        assert_eq!(app.page, Page::Login);
    }

    #[tokio::test]
    async fn test_failed_balance_leaves_view_blank() {
        let mut app = app_with_token(Some("tok"));
        app.navigate(start_path());

        // Unroutable backend: wait for the spawned fetch to report
        let result = tokio::time::timeout(Duration::from_secs(5), app.bg_rx.recv())
            .await
            .unwrap()
            .unwrap();
        app.process_background_result(result);

        assert_eq!(app.balance_view, BalanceView::default());
        assert_eq!(app.page, Page::Editor);
    }

    #[tokio::test]
    async fn test_stale_balance_is_dropped() {
        let mut app = app_with_token(Some("tok"));
        app.navigate(start_path());
        let stale = app.load_id;
        app.navigate(start_path());

        app.process_background_result(BackgroundResult::Balance(
            stale,
            Ok(Balance { balance: 1.0, ad_revenue: 2.0 }),
        ));
        assert_eq!(app.balance_view.balance_text, None);

        app.process_background_result(BackgroundResult::Balance(
            app.load_id,
            Ok(Balance { balance: 1.0, ad_revenue: 2.0 }),
        ));
        assert_eq!(app.balance_view.balance_text.as_deref(), Some("Balance: ₹1.00"));
    }
}
