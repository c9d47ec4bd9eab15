use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use trimiq_core::editor::ElementId;
use trimiq_core::utils::{truncate_path, truncate_string};
use trimiq_core::Page;

use crate::app::{App, AppState, EditorFocus, LoginFocus, RegisterFocus, PICKER_SEPARATOR};

use super::styles;

/// Width of text fields in the login and register forms
const FIELD_WIDTH: usize = 24;

/// Widest file path shown in the media list
const MAX_PATH_DISPLAY: usize = 48;

const LOGO: [&str; 3] = [
    "   ╔╦╗╦═╗╦╔╦╗╦╔═╗ ",
    "    ║ ╠╦╝║║║║║║ ║ ",
    "    ╩ ╩╚═╩╩ ╩╩╚═╩╝",
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Page content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_page(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::PickingFile(input) => render_picker_overlay(frame, app, input),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("  trimIQ · {}", app.page.title());
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title.clone(), styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize)
                .saturating_sub(title.chars().count() + help_hint.len() + 4),
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_page(frame: &mut Frame, app: &App, area: Rect) {
    match app.page {
        Page::Login => render_login(frame, app, area),
        Page::Register => render_register(frame, app, area),
        Page::Editor => render_editor(frame, app, area),
        Page::Other(ref path) => render_other(frame, path, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.page {
        Page::Editor => "[r]eload | [q]uit",
        _ => "[Esc] back | Ctrl+C quit",
    };

    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None => format!(" {} ", app.controller.api().base_url()),
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

// ============================================================================
// Forms
// ============================================================================

fn logo_lines() -> Vec<Line<'static>> {
    LOGO.iter()
        .map(|l| Line::from(Span::styled(format!("        {}", l), styles::title_style())))
        .collect()
}

/// One `Label: [value▌]` row
fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let shown: String = {
        let len = value.chars().count();
        value.chars().skip(len.saturating_sub(FIELD_WIDTH)).collect()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:>9}: [", label), styles::muted_style()),
        Span::styled(
            format!("{:<width$}{}", shown, cursor, width = FIELD_WIDTH),
            styles::control_style(focused),
        ),
        Span::styled("]", styles::muted_style()),
    ])
}

fn masked(password: &str) -> String {
    "*".repeat(password.chars().count().min(FIELD_WIDTH))
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    Line::from(vec![
        Span::raw("             ["),
        Span::styled(text, styles::control_style(focused)),
        Span::raw("]"),
    ])
}

fn link_line(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::highlight_style()
    };
    Line::from(vec![Span::raw("        "), Span::styled(label.to_string(), style)])
}

fn form_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default())
}

fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let extra = usize::from(app.login_error.is_some()) + usize::from(app.login_notice.is_some());
    let area = centered_rect_fixed(48, 13 + 2 * extra as u16, area);
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));
    lines.push(field_line("Email", &app.login_email, app.login_focus == LoginFocus::Email));
    lines.push(field_line(
        "Password",
        &masked(&app.login_password),
        app.login_focus == LoginFocus::Password,
    ));
    lines.push(Line::from(""));
    lines.push(button_line("Login", app.login_focus == LoginFocus::Button));
    lines.push(Line::from(""));
    lines.push(link_line(
        "No account? Register",
        app.login_focus == LoginFocus::RegisterLink,
    ));

    if let Some(ref notice) = app.login_notice {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", notice), styles::success_style())));
    }
    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    frame.render_widget(Paragraph::new(lines).block(form_block()), area);
}

fn render_register(frame: &mut Frame, app: &App, area: Rect) {
    let height = if app.register_error.is_some() { 16 } else { 14 };
    let area = centered_rect_fixed(48, height, area);
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));
    lines.push(field_line(
        "Username",
        &app.register_username,
        app.register_focus == RegisterFocus::Username,
    ));
    lines.push(field_line(
        "Email",
        &app.register_email,
        app.register_focus == RegisterFocus::Email,
    ));
    lines.push(field_line(
        "Password",
        &masked(&app.register_password),
        app.register_focus == RegisterFocus::Password,
    ));
    lines.push(Line::from(""));
    lines.push(button_line("Register", app.register_focus == RegisterFocus::Button));
    lines.push(Line::from(""));
    lines.push(link_line(
        "Have an account? Login",
        app.register_focus == RegisterFocus::LoginLink,
    ));

    if let Some(ref error) = app.register_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    frame.render_widget(Paragraph::new(lines).block(form_block()), area);
}

fn render_other(frame: &mut Frame, path: &str, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(format!(" Nothing to show at {}", path), styles::muted_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Press ", styles::muted_style()),
            Span::styled("e", styles::help_key_style()),
            Span::styled(" to open the editor", styles::muted_style()),
        ]),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ============================================================================
// Editor
// ============================================================================

fn render_editor(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    render_editor_controls(frame, app, chunks[0]);
    render_account_panel(frame, app, chunks[1]);
}

fn control_line(label: String, focus: EditorFocus, app: &App) -> Line<'static> {
    let focused = app.editor_focus == focus;
    let marker = if focused { "▶ " } else { "  " };
    Line::from(vec![
        Span::styled(marker, styles::highlight_style()),
        Span::styled(label, styles::control_style(focused)),
    ])
}

fn file_lines(files: &[std::path::PathBuf], empty: &str) -> Vec<Line<'static>> {
    if files.is_empty() {
        return vec![Line::from(Span::styled(format!("      {}", empty), styles::muted_style()))];
    }
    files
        .iter()
        .map(|f| {
            Line::from(Span::styled(
                format!("      • {}", truncate_path(&f.display().to_string(), MAX_PATH_DISPLAY)),
                styles::list_item_style(),
            ))
        })
        .collect()
}

fn render_editor_controls(frame: &mut Frame, app: &App, area: Rect) {
    let state = &app.editor_state;
    let mut lines = Vec::new();

    lines.push(control_line("[ Upload video ]".to_string(), EditorFocus::VideoUpload, app));
    lines.extend(file_lines(&state.video_files, "no videos selected"));
    lines.push(Line::from(""));

    lines.push(control_line("[ Upload audio ]".to_string(), EditorFocus::AudioUpload, app));
    let audio: Vec<std::path::PathBuf> = state.audio_file.iter().cloned().collect();
    lines.extend(file_lines(&audio, "no audio track"));
    lines.push(Line::from(""));

    let editing = app.state == AppState::EditingPrompt;
    let prompt = if state.text_prompt.is_empty() && !editing {
        "(optional)".to_string()
    } else {
        truncate_string(&state.text_prompt, 60)
    };
    let cursor = if editing { "▌" } else { "" };
    lines.push(control_line(format!("Prompt: {}{}", prompt, cursor), EditorFocus::Prompt, app));
    lines.push(control_line(
        format!("Resolution: < {} >", state.resolution),
        EditorFocus::Resolution,
        app,
    ));
    let checkbox = if state.payment_mode.is_checked() { "[x]" } else { "[ ]" };
    lines.push(control_line(
        format!("{} Ad-supported ({})", checkbox, state.payment_mode.label()),
        EditorFocus::PaymentToggle,
        app,
    ));
    lines.push(Line::from(""));

    let generate = if app.generating {
        "[ Generating... ]"
    } else {
        "[ Generate video ]"
    };
    lines.push(control_line(generate.to_string(), EditorFocus::Generate, app));
    lines.push(control_line("[ Logout ]".to_string(), EditorFocus::Logout, app));

    let block = Block::default()
        .title(Span::styled(" Media ", styles::title_style()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_account_panel(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.balance_view;
    let loaded = view.balance_text.is_some();

    let mut lines = vec![
        Line::from(Span::styled(
            view.text_of(ElementId::UserBalance).unwrap_or("Balance: …").to_string(),
            styles::amount_style(loaded),
        )),
        Line::from(Span::styled(
            view.text_of(ElementId::TotalEarnings).unwrap_or("Earned: …").to_string(),
            styles::amount_style(view.earnings_text.is_some()),
        )),
    ];
    if let Some(fetched_at) = view.fetched_at {
        let local = fetched_at.with_timezone(&chrono::Local);
        lines.push(Line::from(Span::styled(
            format!("updated {}", local.format("%H:%M")),
            styles::muted_style(),
        )));
    }

    if let Some(ref notice) = app.editor_state.notice {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(notice.clone(), styles::highlight_style())));
    }

    if let Some(ref video) = app.last_video {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Last render", styles::title_style())));
        lines.push(Line::from(Span::styled(video.video_url.clone(), styles::success_style())));
    }

    let block = Block::default()
        .title(Span::styled(" Account ", styles::title_style()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

// ============================================================================
// Overlays
// ============================================================================

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_picker_overlay(frame: &mut Frame, app: &App, input: ElementId) {
    let area = centered_rect_fixed(64, 9, frame.area());
    frame.render_widget(Clear, area);

    let (title, hint) = match input {
        ElementId::AudioInput => (" Choose audio ", "One audio file"),
        _ => (" Choose videos ", "Separate several files with"),
    };

    let shown = truncate_path(&app.picker_input, 56);
    let mut hint_spans = vec![Span::styled(format!(" {}", hint), styles::muted_style())];
    if input != ElementId::AudioInput {
        hint_spans.push(Span::styled(format!(" {}", PICKER_SEPARATOR), styles::help_key_style()));
    }

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" Path: ", styles::muted_style()),
            Span::styled(format!("{}▌", shown), styles::selected_style()),
        ]),
        Line::from(""),
        Line::from(hint_spans),
        Line::from(""),
        Line::from(vec![
            Span::styled(" [Enter]", styles::help_key_style()),
            Span::styled(" choose  ", styles::muted_style()),
            Span::styled("[Esc]", styles::help_key_style()),
            Span::styled(" cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(Span::styled(title, styles::title_style()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 22, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ])
    };

    let mut help_text = logo_lines();
    help_text.push(Line::from(Span::styled(
        format!("              version {}", version),
        styles::muted_style(),
    )));
    help_text.extend([
        Line::from(""),
        Line::from(Span::styled(" Forms", styles::highlight_style())),
        key("Tab/↑/↓", "Move between fields"),
        key("Enter", "Next field / submit"),
        key("Esc", "Back (quits from login)"),
        Line::from(""),
        Line::from(Span::styled(" Editor", styles::highlight_style())),
        key("↑/↓", "Move between controls"),
        key("Enter", "Activate control"),
        key("←/→", "Change resolution"),
        key("r", "Reload page (refetch balance)"),
        key("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ]);

    frame.render_widget(Paragraph::new(help_text).block(form_block()), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 10, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    frame.render_widget(Paragraph::new(lines).block(form_block()), area);
}
