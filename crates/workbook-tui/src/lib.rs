// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};
use std::collections::BTreeMap;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;
use tracing::{debug, info, trace};
use unicode_width::UnicodeWidthStr;
use workbook_app::{
    AnswerEdit, CONSENT_NOTE, DeferredTask, EMAIL_PLACEHOLDER, FieldId, PageContent, PageKind,
    PageNumber, Prompt, PromptKind, SUBMISSION_DELAY, SUBMIT_LABEL, SUBMITTED_BODY,
    SUBMITTED_TITLE, SUBMITTING_LABEL, ScrollSource, ScrollUpdate, SectionLayout,
    SubmissionState, SubmissionToken, SummaryPayload, Viewport, WorkbookCommand, WorkbookEvent,
    WorkbookState, page, pages, prompt,
};

const IDLE_POLL: Duration = Duration::from_millis(120);
const ANIMATION_POLL: Duration = Duration::from_millis(16);
const STATUS_TTL: Duration = Duration::from_secs(4);
const CHROME_ROWS: u16 = 3;
const MIN_CONTENT_WIDTH: usize = 16;
const INPUT_PREFIX: &str = "  > ";
const CURSOR: &str = "▏";
const PROGRESS_GLYPH: &str = "━";

const ACCENT: Color = Color::Cyan;
const MUTED: Color = Color::Gray;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub smooth_scroll: bool,
    pub show_progress: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            smooth_scroll: true,
            show_progress: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    Scrolled(ScrollUpdate),
    SubmissionElapsed {
        token: SubmissionToken,
    },
    SubmissionFailed {
        token: SubmissionToken,
        message: String,
    },
}

pub trait WorkbookRuntime {
    fn submission_delay(&self) -> Duration {
        SUBMISSION_DELAY
    }

    /// Starts the background half of a submission. The returned task is
    /// cancelled if the view goes away before it reports back.
    fn spawn_submission(
        &mut self,
        token: SubmissionToken,
        _payload: &SummaryPayload,
        tx: Sender<InternalEvent>,
    ) -> Result<DeferredTask> {
        Ok(DeferredTask::schedule(
            self.submission_delay(),
            tx,
            InternalEvent::SubmissionElapsed { token },
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Focus {
    Chip(PageNumber, usize),
    Field(FieldId),
    Email,
}

impl Focus {
    fn page(self) -> PageNumber {
        match self {
            Self::Chip(page, _) => page,
            Self::Field(field) => field.page,
            Self::Email => PageNumber::LAST,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Document {
    lines: Vec<Line<'static>>,
    layout: SectionLayout,
    anchors: BTreeMap<Focus, u32>,
}

struct ViewData {
    options: ViewOptions,
    width: u16,
    client_height: u32,
    scroll_top: u32,
    scroll_target: Option<u32>,
    document: Document,
    focus: Option<Focus>,
    source: ScrollSource,
    last_published: Option<Viewport>,
    status_token: u64,
    status_task: Option<DeferredTask>,
    submission_task: Option<DeferredTask>,
}

impl ViewData {
    fn new(options: ViewOptions, internal_tx: &Sender<InternalEvent>) -> Self {
        let mut source = ScrollSource::new();
        let tx = internal_tx.clone();
        source.subscribe(move |update| {
            let _ = tx.send(InternalEvent::Scrolled(update));
        });

        Self {
            options,
            width: 80,
            client_height: 24,
            scroll_top: 0,
            scroll_target: None,
            document: Document::default(),
            focus: None,
            source,
            last_published: None,
            status_token: 0,
            status_task: None,
            submission_task: None,
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.client_height = u32::from(height.saturating_sub(CHROME_ROWS).max(1));
    }

    fn viewport(&self) -> Viewport {
        self.document
            .layout
            .viewport(self.scroll_top, self.client_height)
    }

    fn max_scroll_top(&self) -> u32 {
        self.viewport().max_scroll_top()
    }

    fn is_animating(&self) -> bool {
        self.scroll_target.is_some()
    }

    /// Starts scrolling to `page`. Returns `false` when the section is not laid out.
    fn request_scroll(&mut self, page: PageNumber) -> bool {
        let Some(section) = self.document.layout.get(page) else {
            trace!(page = %page, "scroll request ignored, section missing");
            return false;
        };
        let target = section.top.min(self.max_scroll_top());
        debug!(page = %page, target, "scroll requested");
        if self.options.smooth_scroll {
            self.scroll_target = Some(target);
        } else {
            self.scroll_top = target;
            self.scroll_target = None;
        }
        true
    }

    fn scroll_by(&mut self, delta: i64) {
        self.scroll_target = None;
        let next = i64::from(self.scroll_top).saturating_add(delta);
        let max = i64::from(self.max_scroll_top());
        self.scroll_top = u32::try_from(next.clamp(0, max)).unwrap_or(0);
    }

    fn advance_animation(&mut self) -> bool {
        let Some(target) = self.scroll_target else {
            return false;
        };
        if self.scroll_top == target {
            self.scroll_target = None;
            return false;
        }
        let step = (target.abs_diff(self.scroll_top) / 3).max(1);
        self.scroll_top = if target > self.scroll_top {
            self.scroll_top + step
        } else {
            self.scroll_top - step
        };
        if self.scroll_top == target {
            self.scroll_target = None;
        }
        true
    }

    fn publish_scroll(&mut self) {
        let viewport = self.viewport();
        if self.last_published == Some(viewport) {
            return;
        }
        self.last_published = Some(viewport);
        self.source.publish(viewport);
    }

    fn ensure_visible(&mut self, focus: Focus) {
        let Some(&row) = self.document.anchors.get(&focus) else {
            return;
        };
        let margin = 2;
        if row < self.scroll_top.saturating_add(margin) {
            self.scroll_top = row.saturating_sub(margin);
        } else if row + margin >= self.scroll_top + self.client_height {
            self.scroll_top = (row + margin + 1).saturating_sub(self.client_height);
        }
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
        self.scroll_target = None;
    }

    fn teardown(&mut self) {
        if let Some(mut task) = self.submission_task.take() {
            task.cancel();
        }
        if let Some(mut task) = self.status_task.take() {
            task.cancel();
        }
        self.source.disconnect();
    }
}

pub fn run_app<R: WorkbookRuntime>(
    state: &mut WorkbookState,
    runtime: &mut R,
    options: ViewOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let (internal_tx, internal_rx) = mpsc::channel();
    let mut view_data = ViewData::new(options, &internal_tx);

    info!("workbook opened");
    let result = event_loop(
        &mut terminal,
        state,
        runtime,
        &mut view_data,
        &internal_tx,
        &internal_rx,
    );
    view_data.teardown();
    info!(
        page = %state.active_page,
        submission = state.submission.as_str(),
        "workbook closed"
    );

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn event_loop<B: Backend, R: WorkbookRuntime>(
    terminal: &mut Terminal<B>,
    state: &mut WorkbookState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    internal_rx: &Receiver<InternalEvent>,
) -> Result<()> {
    loop {
        process_internal_events(state, runtime, view_data, internal_tx, internal_rx);

        let size = terminal.size().context("read terminal size")?;
        view_data.resize(size.width, size.height);
        refresh_document(state, view_data);
        view_data.advance_animation();
        view_data.publish_scroll();

        terminal
            .draw(|frame| render(frame, state, view_data))
            .context("draw frame")?;

        let timeout = if view_data.is_animating() {
            ANIMATION_POLL
        } else {
            IDLE_POLL
        };
        if event::poll(timeout).context("poll event")? {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, view_data, internal_tx, key) {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }
}

fn process_internal_events<R: WorkbookRuntime>(
    state: &mut WorkbookState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        handle_internal_event(state, runtime, view_data, tx, event);
    }
}

fn handle_internal_event<R: WorkbookRuntime>(
    state: &mut WorkbookState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    event: InternalEvent,
) {
    let events = match event {
        InternalEvent::ClearStatus { token } if token == view_data.status_token => {
            state.dispatch(WorkbookCommand::ClearStatus)
        }
        InternalEvent::ClearStatus { .. } => Vec::new(),
        InternalEvent::Scrolled(update) => state.observe_scroll(update),
        InternalEvent::SubmissionElapsed { token } => {
            state.dispatch(WorkbookCommand::SubmissionElapsed(token))
        }
        InternalEvent::SubmissionFailed { token, message } => {
            state.dispatch(WorkbookCommand::SubmissionFailed { token, message })
        }
    };
    apply_events(state, runtime, view_data, tx, events);
}

fn apply_events<R: WorkbookRuntime>(
    state: &mut WorkbookState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    events: Vec<WorkbookEvent>,
) {
    for event in events {
        match event {
            WorkbookEvent::ScrollRequested(page) => {
                view_data.request_scroll(page);
            }
            WorkbookEvent::SubmissionStarted { token, payload } => {
                match runtime.spawn_submission(token, &payload, tx.clone()) {
                    Ok(task) => view_data.submission_task = Some(task),
                    Err(error) => {
                        let follow_up = state.dispatch(WorkbookCommand::SubmissionFailed {
                            token,
                            message: format!("{error:#}"),
                        });
                        apply_events(state, runtime, view_data, tx, follow_up);
                    }
                }
            }
            WorkbookEvent::SubmissionCompleted => {
                view_data.submission_task = None;
                if view_data.focus == Some(Focus::Email) {
                    view_data.focus = None;
                }
            }
            WorkbookEvent::SubmissionFailed(_) => {
                view_data.submission_task = None;
            }
            WorkbookEvent::StatusUpdated(_) => {
                schedule_status_clear(view_data, tx);
            }
            WorkbookEvent::ActivePageChanged(_)
            | WorkbookEvent::ProgressChanged(_)
            | WorkbookEvent::ChipToggled { .. }
            | WorkbookEvent::AnswerChanged(_)
            | WorkbookEvent::EmailChanged
            | WorkbookEvent::ValidationFailed(_)
            | WorkbookEvent::AlertDismissed
            | WorkbookEvent::StatusCleared => {}
        }
    }
}

fn schedule_status_clear(view_data: &mut ViewData, tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    view_data.status_task = Some(DeferredTask::schedule(
        STATUS_TTL,
        tx.clone(),
        InternalEvent::ClearStatus {
            token: view_data.status_token,
        },
    ));
}

fn emit_status<R: WorkbookRuntime>(
    state: &mut WorkbookState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    let events = state.dispatch(WorkbookCommand::SetStatus(message.into()));
    apply_events(state, runtime, view_data, tx, events);
}

fn dispatch_and_apply<R: WorkbookRuntime>(
    state: &mut WorkbookState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: WorkbookCommand,
) {
    let events = state.dispatch(command);
    apply_events(state, runtime, view_data, tx, events);
}

/// Returns `true` when the user asked to quit.
fn handle_key_event<R: WorkbookRuntime>(
    state: &mut WorkbookState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('q') {
        return true;
    }

    // The alert blocks everything until dismissed.
    if state.alert.is_some() {
        dispatch_and_apply(
            state,
            runtime,
            view_data,
            internal_tx,
            WorkbookCommand::DismissAlert,
        );
        return false;
    }

    match view_data.focus {
        Some(focus) => {
            handle_focus_key(state, runtime, view_data, internal_tx, focus, key);
            false
        }
        None => handle_nav_key(state, runtime, view_data, internal_tx, key),
    }
}

fn handle_nav_key<R: WorkbookRuntime>(
    state: &mut WorkbookState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let active = state.active_page;
    let half_page = i64::from(view_data.client_height / 2).max(1);
    let full_page = i64::from(view_data.client_height).max(1);
    let command = match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.scroll_by(1);
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.scroll_by(-1);
            None
        }
        KeyCode::Char('d') => {
            view_data.scroll_by(half_page);
            None
        }
        KeyCode::Char('u') => {
            view_data.scroll_by(-half_page);
            None
        }
        KeyCode::PageDown => {
            view_data.scroll_by(full_page);
            None
        }
        KeyCode::PageUp => {
            view_data.scroll_by(-full_page);
            None
        }
        KeyCode::Char('n') | KeyCode::Char('l') | KeyCode::Right => {
            Some(WorkbookCommand::NavNext)
        }
        KeyCode::Char('p') | KeyCode::Char('h') | KeyCode::Left => {
            Some(WorkbookCommand::NavPrevious)
        }
        KeyCode::Char('g') | KeyCode::Home => {
            Some(WorkbookCommand::ScrollToPage(PageNumber::FIRST))
        }
        KeyCode::Char('G') | KeyCode::End => Some(WorkbookCommand::ScrollToPage(PageNumber::LAST)),
        KeyCode::Char(digit @ '0'..='9') => {
            page_for_digit(digit).map(WorkbookCommand::ScrollToPage)
        }
        KeyCode::Tab => {
            focus_first(state, runtime, view_data, tx, active);
            None
        }
        KeyCode::Enter => match page(active).kind {
            PageKind::Cover => Some(WorkbookCommand::NavNext),
            _ => {
                focus_first(state, runtime, view_data, tx, active);
                None
            }
        },
        _ => None,
    };

    if let Some(command) = command {
        dispatch_and_apply(state, runtime, view_data, tx, command);
    }
    false
}

fn page_for_digit(digit: char) -> Option<PageNumber> {
    match digit {
        '0' => Some(PageNumber::LAST),
        other => other
            .to_digit(10)
            .and_then(|value| u8::try_from(value).ok())
            .and_then(PageNumber::new),
    }
}

fn handle_focus_key<R: WorkbookRuntime>(
    state: &mut WorkbookState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    focus: Focus,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.focus = None;
            return;
        }
        KeyCode::Tab => {
            move_focus(state, view_data, focus, 1);
            return;
        }
        KeyCode::BackTab => {
            move_focus(state, view_data, focus, -1);
            return;
        }
        _ => {}
    }

    match focus {
        Focus::Chip(page_number, index) => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(label) = page(page_number).chips.get(index) {
                    dispatch_and_apply(
                        state,
                        runtime,
                        view_data,
                        tx,
                        WorkbookCommand::ToggleChip((*label).to_owned()),
                    );
                }
            }
            KeyCode::Right => move_focus(state, view_data, focus, 1),
            KeyCode::Left => move_focus(state, view_data, focus, -1),
            _ => {}
        },
        Focus::Field(field) => {
            let edit = match key.code {
                KeyCode::Char(ch) => AnswerEdit::Insert(ch),
                KeyCode::Backspace => AnswerEdit::Backspace,
                KeyCode::Enter if is_multiline(field) => AnswerEdit::Insert('\n'),
                KeyCode::Enter => {
                    move_focus(state, view_data, focus, 1);
                    return;
                }
                _ => return,
            };
            dispatch_and_apply(
                state,
                runtime,
                view_data,
                tx,
                WorkbookCommand::EditAnswer(field, edit),
            );
        }
        Focus::Email => match key.code {
            KeyCode::Char(ch) => {
                let mut email = state.email.clone();
                email.push(ch);
                dispatch_and_apply(state, runtime, view_data, tx, WorkbookCommand::SetEmail(email));
            }
            KeyCode::Backspace => {
                let mut email = state.email.clone();
                email.pop();
                dispatch_and_apply(state, runtime, view_data, tx, WorkbookCommand::SetEmail(email));
            }
            KeyCode::Enter => {
                dispatch_and_apply(state, runtime, view_data, tx, WorkbookCommand::Submit);
            }
            _ => {}
        },
    }
}

fn is_multiline(field: FieldId) -> bool {
    prompt(field).is_some_and(|prompt| matches!(prompt.kind, PromptKind::Area { .. }))
}

fn focus_order(state: &WorkbookState, page_number: PageNumber) -> Vec<Focus> {
    let content = page(page_number);
    let mut order = (0..content.chips.len())
        .map(|index| Focus::Chip(page_number, index))
        .collect::<Vec<_>>();
    order.extend(
        (0..content.prompts.len()).map(|index| Focus::Field(FieldId::new(page_number, index))),
    );
    if content.has_email_form() && !state.submission.is_submitted() {
        order.push(Focus::Email);
    }
    order
}

fn focus_first<R: WorkbookRuntime>(
    state: &mut WorkbookState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    page_number: PageNumber,
) {
    match focus_order(state, page_number).first().copied() {
        Some(focus) => {
            view_data.focus = Some(focus);
            view_data.ensure_visible(focus);
        }
        None => emit_status(
            state,
            runtime,
            view_data,
            tx,
            format!("nothing to fill in on page {page_number}"),
        ),
    }
}

fn move_focus(state: &WorkbookState, view_data: &mut ViewData, current: Focus, delta: isize) {
    let order = focus_order(state, current.page());
    if order.is_empty() {
        view_data.focus = None;
        return;
    }
    let position = order
        .iter()
        .position(|focus| *focus == current)
        .unwrap_or(0) as isize;
    let len = order.len() as isize;
    let next = order[(position + delta).rem_euclid(len) as usize];
    view_data.focus = Some(next);
    view_data.ensure_visible(next);
}

fn refresh_document(state: &WorkbookState, view_data: &mut ViewData) {
    let document = build_document(
        state,
        view_data.focus,
        view_data.width,
        view_data.client_height,
    );
    if view_data.source.layout() != Some(&document.layout) {
        view_data.source.observe(document.layout.clone());
        view_data.last_published = None;
    }
    view_data.document = document;
    view_data.scroll_top = view_data.scroll_top.min(view_data.max_scroll_top());
    if let Some(target) = view_data.scroll_target {
        view_data.scroll_target = Some(target.min(view_data.max_scroll_top()));
    }
}

struct DocumentBuilder {
    lines: Vec<Line<'static>>,
    anchors: BTreeMap<Focus, u32>,
    width: usize,
}

impl DocumentBuilder {
    fn row(&self) -> u32 {
        u32::try_from(self.lines.len()).unwrap_or(u32::MAX)
    }

    fn blank(&mut self) {
        self.lines.push(Line::default());
    }

    fn anchor(&mut self, focus: Focus) {
        let row = self.row();
        self.anchors.insert(focus, row);
    }

    fn push(&mut self, line: Line<'static>) {
        self.lines.push(line);
    }

    fn wrapped(&mut self, indent: &str, text: &str, style: Style) {
        let width = self.width.saturating_sub(indent.width());
        for piece in wrap_text(text, width) {
            self.lines
                .push(Line::from(Span::styled(format!("{indent}{piece}"), style)));
        }
    }
}

fn build_document(
    state: &WorkbookState,
    focus: Option<Focus>,
    width: u16,
    client_height: u32,
) -> Document {
    let mut builder = DocumentBuilder {
        lines: Vec::new(),
        anchors: BTreeMap::new(),
        width: usize::from(width).saturating_sub(2).max(MIN_CONTENT_WIDTH),
    };
    let mut heights = Vec::new();

    for (number, content) in pages() {
        let start = builder.row();
        write_page(&mut builder, state, focus, number, content);
        while builder.row() - start < client_height {
            builder.blank();
        }
        heights.push((number, builder.row() - start));
    }

    Document {
        lines: builder.lines,
        layout: SectionLayout::stacked(heights),
        anchors: builder.anchors,
    }
}

fn write_page(
    builder: &mut DocumentBuilder,
    state: &WorkbookState,
    focus: Option<Focus>,
    number: PageNumber,
    content: &PageContent,
) {
    let muted = Style::default().fg(MUTED);
    let accent = Style::default().fg(ACCENT).add_modifier(Modifier::BOLD);

    builder.push(Line::from(Span::styled(
        format!("{:>2} / {}", number.get(), PageNumber::LAST),
        muted.add_modifier(Modifier::DIM),
    )));
    builder.blank();
    if let Some(eyebrow) = content.eyebrow {
        builder.push(Line::from(Span::styled(eyebrow.to_uppercase(), accent)));
    }
    builder.wrapped("", content.title, Style::default().add_modifier(Modifier::BOLD));
    builder.blank();

    for paragraph in content.body {
        builder.wrapped("", paragraph, muted);
        builder.blank();
    }

    for item in content.checklist {
        builder.wrapped("  ✕ ", item, Style::default());
    }
    if !content.checklist.is_empty() {
        builder.blank();
    }

    for card in content.cards {
        builder.push(Line::from(Span::styled(
            format!("{}. {}", card.number, card.title),
            accent,
        )));
        builder.wrapped("   ", card.description, muted);
        builder.blank();
    }

    if !content.chips.is_empty() {
        write_chips(builder, state, focus, number, content.chips);
        builder.blank();
    }

    for (index, prompt) in content.prompts.iter().enumerate() {
        let field = FieldId::new(number, index);
        let focused = focus == Some(Focus::Field(field));
        write_prompt(builder, state.answers.get(field), focused, field, prompt);
        builder.blank();
    }

    match (content.kind, content.callout) {
        (PageKind::Cover, Some(label)) => {
            builder.push(Line::from(Span::styled(
                format!("[ {label} ]  press enter"),
                Style::default()
                    .fg(Color::Black)
                    .bg(ACCENT)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        (_, Some(callout)) => {
            builder.wrapped(
                "│ ",
                callout,
                Style::default().fg(ACCENT).add_modifier(Modifier::ITALIC),
            );
        }
        (_, None) => {}
    }

    if content.has_email_form() {
        write_email_form(builder, state, focus == Some(Focus::Email));
    }
}

fn write_chips(
    builder: &mut DocumentBuilder,
    state: &WorkbookState,
    focus: Option<Focus>,
    number: PageNumber,
    chips: &[&'static str],
) {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut used = 0_usize;
    for (index, label) in chips.iter().enumerate() {
        let selected = state.chips.is_selected(label);
        let token = format!("[{}] {label}", if selected { "x" } else { " " });
        let token_len = token.width();
        if used > 0 && used + 2 + token_len > builder.width {
            builder.push(Line::from(std::mem::take(&mut spans)));
            used = 0;
        }
        if used > 0 {
            spans.push(Span::raw("  "));
            used += 2;
        }
        builder.anchor(Focus::Chip(number, index));

        let mut style = if selected {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        if focus == Some(Focus::Chip(number, index)) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        spans.push(Span::styled(token, style));
        used += token_len;
    }
    if !spans.is_empty() {
        builder.push(Line::from(spans));
    }
}

fn write_prompt(
    builder: &mut DocumentBuilder,
    value: &str,
    focused: bool,
    field: FieldId,
    prompt: &Prompt,
) {
    builder.wrapped("", prompt.label, Style::default().add_modifier(Modifier::BOLD));
    builder.anchor(Focus::Field(field));

    let rows = usize::from(prompt.kind.rows()).max(1);
    let prefix_style = if focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(MUTED)
    };
    let width = builder.width.saturating_sub(INPUT_PREFIX.width() + 1);

    let (text, text_style) = if value.is_empty() {
        let hint = Style::default().fg(MUTED).add_modifier(Modifier::DIM);
        (prompt.placeholder.unwrap_or_default(), hint)
    } else {
        (value, Style::default())
    };
    let mut lines = wrap_text(text, width)
        .into_iter()
        .map(|piece| {
            Line::from(vec![
                Span::styled(INPUT_PREFIX, prefix_style),
                Span::styled(piece, text_style),
            ])
        })
        .collect::<Vec<_>>();
    if focused {
        let cursor = Span::styled(CURSOR, prefix_style);
        if value.is_empty() {
            if let Some(first) = lines.first_mut() {
                first.spans.insert(1, cursor);
            }
        } else if let Some(last) = lines.last_mut() {
            last.spans.push(cursor);
        }
    }
    while lines.len() < rows {
        lines.push(Line::from(Span::styled(INPUT_PREFIX, prefix_style)));
    }
    for line in lines {
        builder.push(line);
    }
}

fn write_email_form(builder: &mut DocumentBuilder, state: &WorkbookState, focused: bool) {
    if state.submission.is_submitted() {
        builder.push(Line::from(Span::styled(
            format!("✓ {SUBMITTED_TITLE}"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
        builder.wrapped("", SUBMITTED_BODY, Style::default().fg(MUTED));
        return;
    }

    let prefix_style = if focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(MUTED)
    };
    builder.push(Line::from(Span::styled(
        "Email",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    builder.anchor(Focus::Email);
    let mut input = vec![Span::styled(INPUT_PREFIX, prefix_style)];
    if state.email.is_empty() {
        if focused {
            input.push(Span::styled(CURSOR, prefix_style));
        }
        input.push(Span::styled(
            EMAIL_PLACEHOLDER,
            Style::default().fg(MUTED).add_modifier(Modifier::DIM),
        ));
    } else {
        input.push(Span::raw(state.email.clone()));
        if focused {
            input.push(Span::styled(CURSOR, prefix_style));
        }
    }
    builder.push(Line::from(input));
    builder.blank();

    let button = match state.submission {
        SubmissionState::Submitting { .. } => Span::styled(
            format!("[ {SUBMITTING_LABEL} ]"),
            Style::default().fg(MUTED).add_modifier(Modifier::DIM),
        ),
        _ => Span::styled(
            format!("[ {SUBMIT_LABEL} → ]"),
            Style::default()
                .fg(Color::Black)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
    };
    builder.push(Line::from(button));
    if let SubmissionState::Failed { message } = &state.submission {
        builder.wrapped("", message, Style::default().fg(Color::Red));
    }
    builder.blank();
    builder.wrapped("", CONSENT_NOTE, Style::default().fg(MUTED).add_modifier(Modifier::DIM));
}

/// First-fit wrap measured in display columns. Words wider than `width` are
/// split and embedded newlines start new lines. Always returns at least one line.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let options = textwrap::Options::new(width.max(1))
        .break_words(true)
        .wrap_algorithm(textwrap::WrapAlgorithm::FirstFit);
    textwrap::wrap(text, options)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

fn progress_bar_width(progress: f64, width: u16) -> u16 {
    let ratio = (progress / 100.0).clamp(0.0, 1.0);
    (f64::from(width) * ratio).round() as u16
}

fn dock_text(state: &WorkbookState) -> String {
    if !state.dock_visible() {
        return String::new();
    }
    let next = if state.next_enabled() {
        "Next › (n)"
    } else {
        ""
    };
    format!("‹ Previous (p)   {}   {next}", state.dock_label())
        .trim_end()
        .to_owned()
}

fn status_text(state: &WorkbookState, view_data: &ViewData) -> String {
    let mode = if view_data.focus.is_some() {
        "EDIT"
    } else {
        "NAV"
    };
    let hints = if view_data.focus.is_some() {
        "type to edit | tab/shift+tab move | space toggle | enter next/submit | esc done | ctrl+q"
    } else {
        "j/k d/u scroll | n/p page | g/G ends | 1-9,0 jump | tab edit | q quit"
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &WorkbookState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    if view_data.options.show_progress {
        let bar_width = progress_bar_width(state.progress, layout[0].width);
        let bar = Paragraph::new(PROGRESS_GLYPH.repeat(usize::from(bar_width)))
            .style(Style::default().fg(ACCENT));
        frame.render_widget(bar, layout[0]);
    }

    let start = usize::try_from(view_data.scroll_top).unwrap_or(usize::MAX);
    let visible = view_data
        .document
        .lines
        .iter()
        .skip(start)
        .take(usize::from(layout[1].height))
        .cloned()
        .collect::<Vec<_>>();
    let body = Paragraph::new(visible).block(Block::default().padding(Padding::horizontal(1)));
    frame.render_widget(body, layout[1]);

    let dock = Paragraph::new(dock_text(state))
        .style(Style::default().fg(ACCENT))
        .alignment(Alignment::Center);
    frame.render_widget(dock, layout[2]);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(status, layout[3]);

    if let Some(alert) = &state.alert {
        let area = centered_rect(50, 30, frame.area());
        frame.render_widget(Clear, area);
        let popup = Paragraph::new(format!("{alert}\n\npress any key"))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title("alert")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(popup, area);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
