use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;
use sentinel_core::catalog::SubAgent;
use sentinel_core::{
    quick_commands, AgentMode, ChatMessage, Config, MessageKind, Sender, SessionState, UserAction,
};
use sentinel_exec::{Clock, RandomProbe, SessionDriver, SessionObserver, SystemClock};
use tracing::info;

use crate::error::CliError;
use crate::output;

const MAX_POLL: Duration = Duration::from_millis(100);

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
    }
}

pub fn run(
    config: Config,
    seed: Option<u64>,
    journal: Option<Box<dyn SessionObserver>>,
) -> Result<(), CliError> {
    let probe = RandomProbe::new(config.connection.loss_probability, seed);
    let mut driver = SessionDriver::new(config, SystemClock, probe);
    if let Some(observer) = journal {
        driver.observe(observer);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, crossterm::cursor::Hide)?;
    let _guard = TuiGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    run_app(&mut terminal, &mut driver)?;
    info!(messages = driver.state().transcript.last_seq(), "console closed");
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    driver: &mut SessionDriver<SystemClock, RandomProbe>,
) -> io::Result<()> {
    let mut dirty = true;
    loop {
        driver.tick();
        dirty |= driver.take_frame_request();
        // The spinner animates while replies are pending.
        dirty |= driver.state().is_typing();
        if dirty {
            terminal.draw(|f| ui(f, driver.state()))?;
            dirty = false;
        }

        let timeout = poll_timeout(driver.next_due(), driver.clock().now_ms());
        if !event::poll(timeout)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match key_to_action(key, driver.state()) {
                    KeyHandlerResult::Dispatch(action) => driver.dispatch(action),
                    KeyHandlerResult::Ignore => {}
                    KeyHandlerResult::Exit => return Ok(()),
                }
            }
            Event::Resize(_, _) => dirty = true,
            _ => {}
        }
    }
}

fn poll_timeout(next_due_ms: Option<u64>, now_ms: u64) -> Duration {
    next_due_ms
        .map(|due| Duration::from_millis(due.saturating_sub(now_ms)))
        .map_or(MAX_POLL, |wait| wait.min(MAX_POLL))
}

#[derive(Debug, PartialEq)]
enum KeyHandlerResult {
    Dispatch(UserAction),
    Ignore,
    Exit,
}

fn key_to_action(key: KeyEvent, state: &SessionState) -> KeyHandlerResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return KeyHandlerResult::Exit;
    }
    if state.shutdown_prompt_open() {
        return handle_shutdown_prompt_keys(key);
    }

    match key.code {
        KeyCode::Esc => KeyHandlerResult::Exit,
        KeyCode::Char('t') if ctrl => KeyHandlerResult::Dispatch(UserAction::ToggleChat),
        KeyCode::Char('p') if ctrl => KeyHandlerResult::Dispatch(UserAction::ShowShutdownPrompt),
        _ if !state.interaction.chat_open => KeyHandlerResult::Ignore,
        KeyCode::F(n) => quick_commands(state.mode().uses_cli())
            .get(usize::from(n).wrapping_sub(1))
            .map_or(KeyHandlerResult::Ignore, |quick| {
                KeyHandlerResult::Dispatch(UserAction::SubmitCommand(quick.command.to_string()))
            }),
        KeyCode::Enter => KeyHandlerResult::Dispatch(UserAction::SubmitInput),
        KeyCode::Backspace => KeyHandlerResult::Dispatch(UserAction::InputBackspace),
        KeyCode::Char(c) if !ctrl => KeyHandlerResult::Dispatch(UserAction::InputChar(c)),
        _ => KeyHandlerResult::Ignore,
    }
}

fn handle_shutdown_prompt_keys(key: KeyEvent) -> KeyHandlerResult {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            KeyHandlerResult::Dispatch(UserAction::ConfirmShutdown)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            KeyHandlerResult::Dispatch(UserAction::CancelShutdown)
        }
        _ => KeyHandlerResult::Ignore,
    }
}

#[derive(Clone, Copy)]
struct UiPalette {
    accent: Color,
    success: Color,
    warning: Color,
    danger: Color,
    muted: Color,
    border: Color,
    panel_bg: Color,
}

const PALETTE: UiPalette = UiPalette {
    accent: Color::Cyan,
    success: Color::Green,
    warning: Color::Yellow,
    danger: Color::Red,
    muted: Color::DarkGray,
    border: Color::Blue,
    panel_bg: Color::Black,
};

fn badge_color(mode: AgentMode, palette: UiPalette) -> Color {
    match mode {
        AgentMode::Autonomous => palette.success,
        AgentMode::ManualPaused => palette.warning,
        AgentMode::CliFallback => palette.danger,
    }
}

fn get_spinner() -> &'static str {
    let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let idx = (SystemClock.now_ms() / 100) as usize % frames.len();
    frames[idx]
}

fn message_style(message: &ChatMessage, palette: UiPalette) -> Style {
    match (message.sender, message.kind) {
        (_, MessageKind::System) => Style::default()
            .fg(palette.warning)
            .add_modifier(Modifier::ITALIC),
        (Sender::User, MessageKind::Normal) => Style::default().fg(palette.accent),
        (Sender::Agent, MessageKind::Normal) => Style::default().fg(Color::White),
    }
}

fn build_chat_lines(state: &SessionState, palette: UiPalette) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    for message in state.transcript.iter() {
        let style = message_style(message, palette);
        let speaker = output::speaker(message);
        out.push(Line::from(vec![
            Span::styled(
                format!("{} ", message.time_label()),
                Style::default().fg(palette.muted),
            ),
            Span::styled(speaker.to_string(), style.add_modifier(Modifier::BOLD)),
        ]));
        for raw in message.text.lines() {
            out.push(Line::from(Span::styled(format!("  {raw}"), style)));
        }
    }
    if state.is_typing() {
        let who = if state.mode().uses_cli() {
            "CLI is processing"
        } else {
            "Main Agent is typing"
        };
        out.push(Line::from(Span::styled(
            format!("{} {who}...", get_spinner()),
            Style::default().fg(palette.muted),
        )));
    }
    out
}

/// Rows `lines` occupy once wrapped to `width` columns.
fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn ui(f: &mut ratatui::Frame, state: &SessionState) {
    let palette = PALETTE;
    let chat_open = state.interaction.chat_open;
    let mut constraints = vec![Constraint::Length(3), Constraint::Min(0)];
    if chat_open {
        constraints.push(Constraint::Length(3)); // Input
        constraints.push(Constraint::Length(1)); // Quick commands
    }
    constraints.push(Constraint::Length(1)); // Footer

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(f.area());

    render_header(f, chunks[0], state, palette);
    if chat_open {
        render_chat(f, chunks[1], state, palette);
        render_input(f, chunks[2], state, palette);
        render_quick_commands(f, chunks[3], state, palette);
    } else {
        render_agents(f, chunks[1], palette);
    }
    render_footer(f, chunks[chunks.len() - 1], palette);

    if state.shutdown_prompt_open() {
        let area = centered_rect(60, 25, f.area());
        f.render_widget(Clear, area);
        let block = Block::default()
            .title("Pause Main Agent")
            .borders(Borders::ALL)
            .style(Style::default().bg(palette.panel_bg).fg(Color::White))
            .border_style(Style::default().fg(palette.warning));
        let text = Paragraph::new("Pause the autonomous Main Agent?\nManual control stays active until you type 'enable agent'.\n\n[Y] Confirm  [N] Cancel")
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(text, area);
    }
}

fn render_header(f: &mut ratatui::Frame, area: Rect, state: &SessionState, palette: UiPalette) {
    let mode = state.mode();
    let color = badge_color(mode, palette);
    let text = Line::from(vec![
        Span::styled(
            "AI Sentinel-X",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", Style::default().fg(palette.muted)),
        Span::styled(
            mode.badge_title(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" / ", Style::default().fg(palette.muted)),
        Span::styled(mode.badge_detail(), Style::default().fg(color)),
    ]);
    let header = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border)),
    );
    f.render_widget(header, area);
}

fn render_chat(f: &mut ratatui::Frame, area: Rect, state: &SessionState, palette: UiPalette) {
    let title = if state.mode().uses_cli() {
        "Chat [CLI MODE]"
    } else {
        "Chat"
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .style(Style::default().bg(palette.panel_bg));
    let inner = block.inner(area);
    let lines = build_chat_lines(state, palette);
    let scroll = wrapped_height(&lines, inner.width).saturating_sub(inner.height);
    let chat = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(chat, area);
}

fn render_input(f: &mut ratatui::Frame, area: Rect, state: &SessionState, palette: UiPalette) {
    let prompt = if state.mode().uses_cli() { "cli> " } else { "> " };
    let input = Paragraph::new(Line::from(vec![
        Span::styled(prompt, Style::default().fg(palette.accent)),
        Span::raw(state.interaction.input.clone()),
        Span::styled("█", Style::default().fg(palette.muted)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border)),
    );
    f.render_widget(input, area);
}

fn render_quick_commands(
    f: &mut ratatui::Frame,
    area: Rect,
    state: &SessionState,
    palette: UiPalette,
) {
    let mut spans = Vec::new();
    for (idx, quick) in quick_commands(state.mode().uses_cli()).iter().enumerate() {
        spans.push(Span::styled(
            format!("F{} ", idx + 1),
            Style::default().fg(palette.accent),
        ));
        spans.push(Span::styled(
            format!("{}  ", quick.label),
            Style::default().fg(palette.muted),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_agents(f: &mut ratatui::Frame, area: Rect, palette: UiPalette) {
    let mut lines = vec![Line::from(Span::styled(
        "Sub-agents under Main Agent control",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for spec in SubAgent::all() {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<20}", spec.name),
                Style::default().fg(palette.accent),
            ),
            Span::raw(spec.description),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Chat hidden. Press Ctrl+T to open it.",
        Style::default().fg(palette.muted),
    )));
    let panel = Paragraph::new(lines).block(
        Block::default()
            .title("Overview")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border)),
    );
    f.render_widget(panel, area);
}

fn render_footer(f: &mut ratatui::Frame, area: Rect, palette: UiPalette) {
    let text = Line::from(vec![
        Span::styled("Enter", Style::default().fg(palette.accent)),
        Span::styled(" send ", Style::default().fg(palette.muted)),
        Span::styled("^T", Style::default().fg(palette.accent)),
        Span::styled(" chat ", Style::default().fg(palette.muted)),
        Span::styled("^P", Style::default().fg(palette.accent)),
        Span::styled(" pause agent ", Style::default().fg(palette.muted)),
        Span::styled("Esc", Style::default().fg(palette.warning)),
        Span::styled(" quit", Style::default().fg(palette.muted)),
    ]);
    f.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;
    use sentinel_core::{reduce, MessageDraft, ShellAction};

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn render(state: &SessionState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
        terminal.draw(|f| ui(f, state)).expect("draw");
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn typing_keys_edit_the_input() {
        let state = SessionState::default();
        assert_eq!(
            key_to_action(key(KeyCode::Char('s')), &state),
            KeyHandlerResult::Dispatch(UserAction::InputChar('s'))
        );
        assert!(matches!(
            key_to_action(key(KeyCode::Enter), &state),
            KeyHandlerResult::Dispatch(UserAction::SubmitInput)
        ));
        assert_eq!(key_to_action(key(KeyCode::Esc), &state), KeyHandlerResult::Exit);
        assert_eq!(key_to_action(ctrl('c'), &state), KeyHandlerResult::Exit);
    }

    #[test]
    fn control_chords_toggle_chat_and_open_prompt() {
        let state = SessionState::default();
        assert!(matches!(
            key_to_action(ctrl('t'), &state),
            KeyHandlerResult::Dispatch(UserAction::ToggleChat)
        ));
        assert!(matches!(
            key_to_action(ctrl('p'), &state),
            KeyHandlerResult::Dispatch(UserAction::ShowShutdownPrompt)
        ));
    }

    #[test]
    fn prompt_captures_answer_keys() {
        let mut state = SessionState::default();
        reduce(&mut state, ShellAction::User(UserAction::ShowShutdownPrompt), 0);
        assert!(matches!(
            key_to_action(key(KeyCode::Char('y')), &state),
            KeyHandlerResult::Dispatch(UserAction::ConfirmShutdown)
        ));
        assert!(matches!(
            key_to_action(key(KeyCode::Esc), &state),
            KeyHandlerResult::Dispatch(UserAction::CancelShutdown)
        ));
        assert_eq!(key_to_action(key(KeyCode::Char('x')), &state), KeyHandlerResult::Ignore);
    }

    #[test]
    fn function_keys_submit_quick_commands_for_the_mode() {
        let mut state = SessionState::default();
        assert_eq!(
            key_to_action(key(KeyCode::F(1)), &state),
            KeyHandlerResult::Dispatch(UserAction::SubmitCommand("show active threats".to_string()))
        );
        state.flags.agent_active = false;
        assert_eq!(
            key_to_action(key(KeyCode::F(6)), &state),
            KeyHandlerResult::Dispatch(UserAction::SubmitCommand("enable agent".to_string()))
        );
        assert_eq!(key_to_action(key(KeyCode::F(7)), &state), KeyHandlerResult::Ignore);
        assert_eq!(key_to_action(key(KeyCode::F(0)), &state), KeyHandlerResult::Ignore);
    }

    #[test]
    fn closed_chat_ignores_typing() {
        let mut state = SessionState::default();
        state.interaction.chat_open = false;
        assert_eq!(key_to_action(key(KeyCode::Char('a')), &state), KeyHandlerResult::Ignore);
    }

    #[test]
    fn poll_timeout_is_capped_and_never_negative() {
        assert_eq!(poll_timeout(None, 10), MAX_POLL);
        assert_eq!(poll_timeout(Some(40), 10), Duration::from_millis(30));
        assert_eq!(poll_timeout(Some(5), 10), Duration::ZERO);
        assert_eq!(poll_timeout(Some(10_000), 10), MAX_POLL);
    }

    #[test]
    fn header_shows_the_mode_badge() {
        let mut state = SessionState::default();
        assert!(render(&state).contains("AI Agent Active"));
        state.flags.cli_mode = true;
        let screen = render(&state);
        assert!(screen.contains("CLI MODE - MAIN AGENT OFFLINE"));
        assert!(screen.contains("Chat [CLI MODE]"));
    }

    #[test]
    fn transcript_and_prompt_are_drawn() {
        let mut state = SessionState::default();
        state.transcript.append(MessageDraft::user("status"), 0);
        state.transcript.append(MessageDraft::agent("All systems nominal"), 0);
        reduce(&mut state, ShellAction::User(UserAction::ShowShutdownPrompt), 0);
        let screen = render(&state);
        assert!(screen.contains("All systems nominal"));
        assert!(screen.contains("Pause Main Agent"));
    }

    #[test]
    fn hidden_chat_shows_the_sub_agents() {
        let mut state = SessionState::default();
        state.interaction.chat_open = false;
        let screen = render(&state);
        assert!(screen.contains("ThreatScanner"));
        assert!(screen.contains("Chat hidden"));
        assert!(!screen.contains("All systems"));
    }

    #[test]
    fn wrapped_height_counts_overflow_rows() {
        let lines = vec![Line::raw("x".repeat(25)), Line::raw("")];
        assert_eq!(wrapped_height(&lines, 10), 4);
    }
}
