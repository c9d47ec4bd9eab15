//! Editor page wiring.
//!
//! The editor is a fixed set of elements, each identified by the same id
//! the web page uses. `Editor::wire` registers the bindings between them;
//! adapters feed user activity in as `ElementEvent`s and act on the
//! returned `Reaction`.

use std::path::PathBuf;

use tracing::debug;

use crate::models::{PaymentMode, ProcessVideoRequest, Resolution};
use crate::page::{Page, PageController};

/// Elements the editor page is expected to have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    VideoUpload,
    VideoInput,
    AudioUpload,
    AudioInput,
    GenerateBtn,
    PaymentToggle,
    Logout,
    UserBalance,
    TotalEarnings,
}

impl ElementId {
    pub fn id(&self) -> &'static str {
        match self {
            ElementId::VideoUpload => "video-upload",
            ElementId::VideoInput => "video-input",
            ElementId::AudioUpload => "audio-upload",
            ElementId::AudioInput => "audio-input",
            ElementId::GenerateBtn => "generate-btn",
            ElementId::PaymentToggle => "payment-toggle",
            ElementId::Logout => "logout",
            ElementId::UserBalance => "user-balance",
            ElementId::TotalEarnings => "total-earnings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
    Change,
}

/// User activity on an editor element
#[derive(Debug, Clone, PartialEq)]
pub enum ElementEvent {
    Click(ElementId),
    /// A file input's selection changed
    FilesChosen { target: ElementId, files: Vec<PathBuf> },
    /// A checkbox changed
    Toggled { target: ElementId, checked: bool },
}

impl ElementEvent {
    pub fn target(&self) -> ElementId {
        match self {
            ElementEvent::Click(target)
            | ElementEvent::FilesChosen { target, .. }
            | ElementEvent::Toggled { target, .. } => *target,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            ElementEvent::Click(_) => EventKind::Click,
            ElementEvent::FilesChosen { .. } | ElementEvent::Toggled { .. } => EventKind::Change,
        }
    }
}

/// What a binding does when its event fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Open the (hidden) file input's picker
    OpenPicker(ElementId),
    HandleVideoUpload,
    HandleAudioUpload,
    GenerateVideo,
    TogglePaymentMode,
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub target: ElementId,
    pub kind: EventKind,
    pub action: Action,
}

/// Result of dispatching an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// No binding for this event
    Ignored,
    /// The adapter must open the picker for this file input
    OpenPicker(ElementId),
    /// A collaborator handled the event
    Handled(Action),
    Navigate(Page),
}

/// Collaborators the editor delegates to. Each receives the triggering event.
pub trait EditorHooks {
    fn handle_video_upload(&mut self, event: &ElementEvent);
    fn handle_audio_upload(&mut self, event: &ElementEvent);
    fn generate_video(&mut self, event: &ElementEvent);
    fn toggle_payment_mode(&mut self, event: &ElementEvent);
}

/// Registered editor bindings
#[derive(Debug, Clone)]
pub struct Editor {
    bindings: Vec<Binding>,
}

impl Editor {
    /// Register every editor binding.
    pub fn wire() -> Self {
        let mut editor = Self { bindings: Vec::new() };

        // Upload triggers open their hidden inputs
        editor.bind(ElementId::VideoUpload, EventKind::Click, Action::OpenPicker(ElementId::VideoInput));
        editor.bind(ElementId::VideoInput, EventKind::Change, Action::HandleVideoUpload);
        editor.bind(ElementId::AudioUpload, EventKind::Click, Action::OpenPicker(ElementId::AudioInput));
        editor.bind(ElementId::AudioInput, EventKind::Change, Action::HandleAudioUpload);

        editor.bind(ElementId::GenerateBtn, EventKind::Click, Action::GenerateVideo);
        editor.bind(ElementId::PaymentToggle, EventKind::Change, Action::TogglePaymentMode);
        editor.bind(ElementId::Logout, EventKind::Click, Action::Logout);

        editor
    }

    fn bind(&mut self, target: ElementId, kind: EventKind, action: Action) {
        self.bindings.push(Binding { target, kind, action });
    }

    /// Look up the action bound to an event
    pub fn action_for(&self, event: &ElementEvent) -> Option<Action> {
        let (target, kind) = (event.target(), event.kind());
        self.bindings
            .iter()
            .find(|b| b.target == target && b.kind == kind)
            .map(|b| b.action)
    }

    pub fn dispatch(
        &self,
        event: &ElementEvent,
        hooks: &mut dyn EditorHooks,
        controller: &PageController,
    ) -> Reaction {
        let Some(action) = self.action_for(event) else {
            return Reaction::Ignored;
        };
        debug!(element = event.target().id(), ?action, "Dispatching editor event");

        match action {
            Action::OpenPicker(input) => return Reaction::OpenPicker(input),
            Action::HandleVideoUpload => hooks.handle_video_upload(event),
            Action::HandleAudioUpload => hooks.handle_audio_upload(event),
            Action::GenerateVideo => hooks.generate_video(event),
            Action::TogglePaymentMode => hooks.toggle_payment_mode(event),
            Action::Logout => return Reaction::Navigate(controller.logout()),
        }
        Reaction::Handled(action)
    }
}

// ============================================================================
// Default collaborators
// ============================================================================

/// Editor selections, and the default collaborators that maintain them.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    pub video_files: Vec<PathBuf>,
    pub audio_file: Option<PathBuf>,
    pub text_prompt: String,
    pub resolution: Resolution,
    pub payment_mode: PaymentMode,
    /// Last message for the user from a collaborator
    pub notice: Option<String>,
    pending_generate: Option<ProcessVideoRequest>,
}

impl EditorState {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            ..Self::default()
        }
    }

    /// Take the render job queued by `generate_video`, if any
    pub fn take_generate_request(&mut self) -> Option<ProcessVideoRequest> {
        self.pending_generate.take()
    }

    fn chosen_files(event: &ElementEvent) -> (Vec<PathBuf>, Vec<PathBuf>) {
        match event {
            ElementEvent::FilesChosen { files, .. } => {
                files.iter().cloned().partition(|f| f.is_file())
            }
            _ => (Vec::new(), Vec::new()),
        }
    }

    fn missing_notice(missing: &[PathBuf]) -> String {
        let names: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
        format!("File not found: {}", names.join(", "))
    }
}

impl EditorHooks for EditorState {
    fn handle_video_upload(&mut self, event: &ElementEvent) {
        let (found, missing) = Self::chosen_files(event);
        let mut added = 0;
        for file in found {
            if !self.video_files.contains(&file) {
                self.video_files.push(file);
                added += 1;
            }
        }
        self.notice = if missing.is_empty() {
            Some(format!("Added {} video(s)", added))
        } else {
            Some(Self::missing_notice(&missing))
        };
    }

    fn handle_audio_upload(&mut self, event: &ElementEvent) {
        let (found, missing) = Self::chosen_files(event);
        if let Some(file) = found.into_iter().next() {
            self.notice = Some(format!("Audio track: {}", file.display()));
            self.audio_file = Some(file);
        } else if !missing.is_empty() {
            self.notice = Some(Self::missing_notice(&missing));
        }
    }

    fn generate_video(&mut self, _event: &ElementEvent) {
        let prompt = self.text_prompt.trim();
        if self.video_files.is_empty() && self.audio_file.is_none() && prompt.is_empty() {
            self.notice = Some("Add a video, an audio track or a prompt first".to_string());
            return;
        }
        self.pending_generate = Some(ProcessVideoRequest {
            audio_file: self.audio_file.clone(),
            video_files: self.video_files.clone(),
            text_prompt: (!prompt.is_empty()).then(|| prompt.to_string()),
            resolution: self.resolution,
        });
        self.notice = Some("Generating video...".to_string());
    }

    fn toggle_payment_mode(&mut self, event: &ElementEvent) {
        if let ElementEvent::Toggled { checked, .. } = event {
            self.payment_mode = PaymentMode::from_checked(*checked);
            self.notice = Some(format!("Payment: {}", self.payment_mode.label()));
        }
    }
}
