use anyhow::Result;
use chrono::{Local, Utc};
use planner_core::aggregate::{Analytics, TaskStats};
use planner_core::filter::distinct_categories;
use planner_core::{Choice, Planner, Priority, Status, Task, TaskFilter, TaskPatch};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    crossterm::{
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io;
use std::time::{Duration, Instant};

use crate::form::TaskForm;
use crate::format::{due_label, status_marker};

const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Tasks,
    Analytics,
}

impl View {
    fn next(self) -> View {
        match self {
            View::Dashboard => View::Tasks,
            View::Tasks => View::Analytics,
            View::Analytics => View::Dashboard,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum InputMode {
    Normal,
    Search,
    Form,
    DeleteConfirm,
    Help,
}

pub struct Notification {
    pub message: String,
    pub is_error: bool,
    shown_at: Instant,
}

pub struct App {
    pub planner: Planner,
    pub tasks: Vec<Task>,
    pub history: Vec<Task>,
    pub recent: Vec<Task>,
    pub view: View,
    pub task_state: ListState,
    pub filter: TaskFilter,
    pub input_mode: InputMode,
    pub form: Option<TaskForm>,
    pub delete_target: Option<(String, String)>,
    pub notification: Option<Notification>,
}

impl App {
    pub fn new(planner: Planner) -> Self {
        Self {
            planner,
            tasks: vec![],
            history: vec![],
            recent: vec![],
            view: View::Dashboard,
            task_state: ListState::default(),
            filter: TaskFilter::default(),
            input_mode: InputMode::Normal,
            form: None,
            delete_target: None,
            notification: None,
        }
    }

    pub async fn load_tasks(&mut self) {
        self.tasks = self.planner.fetch_tasks().await;
        self.history = self.planner.fetch_history().await;
        self.recent = self.planner.fetch_recent().await;
        self.clamp_selection();
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.filter.apply(&self.tasks)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let index = self.task_state.selected()?;
        self.visible_tasks().get(index).copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_tasks().len();
        let selected = match self.task_state.selected() {
            _ if len == 0 => None,
            Some(i) if i >= len => Some(len - 1),
            Some(i) => Some(i),
            None => Some(0),
        };
        self.task_state.select(selected);
    }

    pub fn next_task(&mut self) {
        let len = self.visible_tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.task_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.task_state.select(Some(i));
    }

    pub fn previous_task(&mut self) {
        let len = self.visible_tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.task_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.task_state.select(Some(i));
    }

    pub fn cycle_status_filter(&mut self) {
        self.filter.status = match self.filter.status {
            Choice::All => Choice::Only(Status::Pending),
            Choice::Only(Status::Pending) => Choice::Only(Status::InProgress),
            Choice::Only(Status::InProgress) => Choice::Only(Status::Completed),
            Choice::Only(Status::Completed) => Choice::All,
        };
        self.clamp_selection();
    }

    pub fn cycle_priority_filter(&mut self) {
        self.filter.priority = match self.filter.priority {
            Choice::All => Choice::Only(Priority::High),
            Choice::Only(Priority::High) => Choice::Only(Priority::Medium),
            Choice::Only(Priority::Medium) => Choice::Only(Priority::Low),
            Choice::Only(Priority::Low) => Choice::All,
        };
        self.clamp_selection();
    }

    pub fn cycle_category_filter(&mut self) {
        let categories = distinct_categories(&self.tasks);
        let next = match &self.filter.category {
            Choice::All => categories.first().cloned(),
            Choice::Only(current) => categories
                .iter()
                .position(|c| c == current)
                .and_then(|i| categories.get(i + 1))
                .cloned(),
        };
        self.filter.category = next.map(Choice::Only).unwrap_or_default();
        self.clamp_selection();
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
        self.clamp_selection();
    }

    pub fn start_search(&mut self) {
        self.view = View::Tasks;
        self.input_mode = InputMode::Search;
    }

    pub fn push_search(&mut self, c: char) {
        self.filter.search.push(c);
        self.clamp_selection();
    }

    pub fn pop_search(&mut self) {
        self.filter.search.pop();
        self.clamp_selection();
    }

    pub fn cancel_search(&mut self) {
        self.filter.search.clear();
        self.input_mode = InputMode::Normal;
        self.clamp_selection();
    }

    pub fn start_creating(&mut self) {
        self.form = Some(TaskForm::create());
        self.input_mode = InputMode::Form;
    }

    pub fn start_editing(&mut self) {
        if let Some(task) = self.selected_task() {
            self.form = Some(TaskForm::edit(task));
            self.input_mode = InputMode::Form;
        }
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.input_mode = InputMode::Normal;
    }

    /// Validation problems keep the form open; storage failures close it
    /// with an error notification and leave the list untouched.
    pub async fn submit_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let new_task = match form.submit() {
            Ok(task) => task,
            Err(err) => {
                self.notify(err.to_string(), true);
                return;
            }
        };

        let result = match form.editing.as_deref() {
            Some(id) => self
                .planner
                .update_task(id, TaskPatch::from(new_task))
                .await
                .map(|_| "Task updated successfully!"),
            None => self
                .planner
                .create_task(new_task)
                .await
                .map(|_| "Task created successfully!"),
        };
        self.cancel_form();

        match result {
            Ok(message) => {
                self.notify(message, false);
                self.load_tasks().await;
            }
            Err(_) => self.notify("Failed to save task. Please try again.", true),
        }
    }

    pub async fn advance_selected_status(&mut self) {
        let Some((id, status)) = self.selected_task().map(|t| (t.id.clone(), t.status)) else {
            return;
        };
        match self.planner.set_status(&id, status.next()).await {
            Ok(()) => {
                self.notify("Task status updated!", false);
                self.load_tasks().await;
            }
            Err(_) => self.notify("Failed to update task status", true),
        }
    }

    pub fn start_delete_confirm(&mut self) {
        if let Some(task) = self.selected_task() {
            self.delete_target = Some((task.id.clone(), task.title.clone()));
            self.input_mode = InputMode::DeleteConfirm;
        }
    }

    pub async fn confirm_delete(&mut self) {
        if let Some((id, _)) = self.delete_target.take() {
            match self.planner.delete_task(&id).await {
                Ok(()) => {
                    self.notify("Task deleted successfully!", false);
                    self.load_tasks().await;
                }
                Err(_) => self.notify("Failed to delete task", true),
            }
        }
        self.cancel_delete_confirm();
    }

    pub fn cancel_delete_confirm(&mut self) {
        self.input_mode = InputMode::Normal;
        self.delete_target = None;
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn hide_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn notify(&mut self, message: impl Into<String>, is_error: bool) {
        self.notification = Some(Notification {
            message: message.into(),
            is_error,
            shown_at: Instant::now(),
        });
    }

    fn expire_notification(&mut self) {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| n.shown_at.elapsed() >= NOTIFICATION_TTL)
        {
            self.notification = None;
        }
    }
}

pub async fn run_app(planner: Planner) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(planner);
    app.load_tasks().await;

    let res = run_app_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

async fn run_app_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.expire_notification();
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('1') => app.view = View::Dashboard,
                KeyCode::Char('2') => app.view = View::Tasks,
                KeyCode::Char('3') => app.view = View::Analytics,
                KeyCode::Tab => app.view = app.view.next(),
                KeyCode::Char('r') => app.load_tasks().await,
                KeyCode::Char('a') => app.start_creating(),
                KeyCode::Char('/') => app.start_search(),
                KeyCode::Char('?') => app.show_help(),
                _ if app.view == View::Tasks => match key.code {
                    KeyCode::Down | KeyCode::Char('j') => app.next_task(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous_task(),
                    KeyCode::Char('e') => app.start_editing(),
                    KeyCode::Char('c') => app.advance_selected_status().await,
                    KeyCode::Char('D') => app.start_delete_confirm(),
                    KeyCode::Char('s') => app.cycle_status_filter(),
                    KeyCode::Char('g') => app.cycle_category_filter(),
                    KeyCode::Char('p') => app.cycle_priority_filter(),
                    KeyCode::Char('x') => app.clear_filters(),
                    _ => {}
                },
                _ => {}
            },
            InputMode::Search => match key.code {
                KeyCode::Enter => app.input_mode = InputMode::Normal,
                KeyCode::Esc => app.cancel_search(),
                KeyCode::Backspace => app.pop_search(),
                KeyCode::Char(c) => app.push_search(c),
                _ => {}
            },
            InputMode::Form => match key.code {
                KeyCode::Enter => app.submit_form().await,
                KeyCode::Esc => app.cancel_form(),
                code => {
                    if let Some(form) = app.form.as_mut() {
                        match code {
                            KeyCode::Tab | KeyCode::Down => form.next_field(),
                            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
                            KeyCode::Left => form.cycle(false),
                            KeyCode::Right => form.cycle(true),
                            KeyCode::Backspace => form.pop_char(),
                            KeyCode::Char(c) => form.push_char(c),
                            _ => {}
                        }
                    }
                }
            },
            InputMode::DeleteConfirm => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete().await,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.cancel_delete_confirm()
                }
                _ => {}
            },
            InputMode::Help => match key.code {
                KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => app.hide_help(),
                _ => {}
            },
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    match app.view {
        View::Dashboard => render_dashboard(f, app, chunks[1]),
        View::Tasks => render_tasks(f, app, chunks[1]),
        View::Analytics => render_analytics(f, app, chunks[1]),
    }
    render_footer(f, app, chunks[2]);

    match app.input_mode {
        InputMode::Form => {
            if let Some(form) = app.form.as_ref() {
                render_form(f, form);
            }
        }
        InputMode::DeleteConfirm => {
            let popup_area = centered_rect(60, 20, f.area());
            f.render_widget(Clear, popup_area);

            let target_name = app
                .delete_target
                .as_ref()
                .map(|(_, title)| title.as_str())
                .unwrap_or("task");
            let confirm_text = format!("Delete '{}'?\n\ny: confirm | n/esc: cancel", target_name);
            let confirm = Paragraph::new(confirm_text)
                .block(Block::default().title("confirm delete").borders(Borders::ALL))
                .style(Style::default().fg(Color::Red));
            f.render_widget(confirm, popup_area);
        }
        InputMode::Help => {
            let popup_area = centered_rect(80, 70, f.area());
            f.render_widget(Clear, popup_area);

            let help_text = "HELP\n\nViews:\n  1/2/3/tab: dashboard, tasks, analytics\n  r: refresh\n\nTasks:\n  j/k: navigate up/down\n  a: new task   e: edit task\n  c: advance status (pending > in progress > completed)\n  D: delete task\n  /: search   s/g/p: cycle status/category/priority filter\n  x: clear filters\n\nForm:\n  tab/up/down: move between fields\n  left/right: cycle priority, status, suggested category\n  enter: save   esc: cancel\n\n?: show/hide this help\nq: quit";
            let help = Paragraph::new(help_text)
                .block(Block::default().title("help").borders(Borders::ALL))
                .style(Style::default().fg(Color::White));
            f.render_widget(help, popup_area);
        }
        InputMode::Normal | InputMode::Search => {}
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let tab = |view: View, label: &'static str| {
        if app.view == view {
            Span::styled(label, Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD))
        } else {
            Span::raw(label)
        }
    };
    let mut spans = vec![
        tab(View::Dashboard, " 1 dashboard "),
        Span::raw("|"),
        tab(View::Tasks, " 2 tasks "),
        Span::raw("|"),
        tab(View::Analytics, " 3 analytics "),
    ];
    if let Some(user) = app.planner.session().user() {
        spans.push(Span::raw(format!("   [{}] {}", user.initials(), user.display_name())));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title("personal learning planner")
            .borders(Borders::ALL),
    );
    f.render_widget(header, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let line = match (&app.notification, &app.input_mode) {
        (Some(n), _) => {
            let color = if n.is_error { Color::Red } else { Color::Green };
            Span::styled(n.message.clone(), Style::default().fg(color))
        }
        (None, InputMode::Search) => Span::raw("type to search | enter: keep | esc: clear"),
        (None, _) => Span::raw("?: help | q: quit"),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let stats = TaskStats::compute(&app.tasks, Utc::now());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(chunks[0]);
    let card_values = [
        ("total tasks", stats.total, Color::Blue),
        ("completed", stats.completed, Color::Green),
        ("in progress", stats.in_progress, Color::Yellow),
        ("overdue", stats.overdue, Color::Red),
    ];
    for ((title, value, color), area) in card_values.into_iter().zip(cards.iter()) {
        let card = Paragraph::new(value.to_string())
            .block(Block::default().title(title).borders(Borders::ALL))
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD));
        f.render_widget(card, *area);
    }

    let progress = Gauge::default()
        .block(Block::default().title("progress").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(stats.completion_rate().round() as u16);
    f.render_widget(progress, chunks[1]);

    let now = Utc::now();
    let items: Vec<ListItem> = if app.recent.is_empty() {
        vec![ListItem::new("No tasks yet. Press 'a' to create one.")]
    } else {
        app.recent.iter().map(|t| task_item(t, now)).collect()
    };
    let recent = List::new(items).block(Block::default().title("recent tasks").borders(Borders::ALL));
    f.render_widget(recent, chunks[2]);
}

fn render_tasks(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);

    let now = Utc::now();
    let visible = app.visible_tasks();
    let shown = visible.len();
    let items: Vec<ListItem> = visible.into_iter().map(|t| task_item(t, now)).collect();

    let mut filter_spans = vec![
        Span::raw(format!("search: {}", app.filter.search)),
        Span::raw(format!(
            "  status: {}  category: {}  priority: {}",
            app.filter.status, app.filter.category, app.filter.priority
        )),
    ];
    let active = app.filter.active_count();
    if active > 0 {
        filter_spans.push(Span::styled(
            format!("  clear ({active})"),
            Style::default().fg(Color::Yellow),
        ));
    }
    let search_style = if app.input_mode == InputMode::Search {
        Style::default().fg(Color::Blue)
    } else {
        Style::default()
    };
    let filters = Paragraph::new(vec![
        Line::from(filter_spans),
        Line::from(format!("Showing {} of {} tasks", shown, app.tasks.len())),
    ])
    .block(Block::default().title("filters").borders(Borders::ALL).border_style(search_style));
    f.render_widget(filters, chunks[0]);

    let tasks = List::new(items)
        .block(
            Block::default()
                .title("tasks")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    f.render_stateful_widget(tasks, chunks[1], &mut app.task_state);
}

fn task_item(task: &Task, now: chrono::DateTime<Utc>) -> ListItem<'static> {
    let color = if task.is_overdue(now) {
        Color::Red
    } else {
        match task.status {
            Status::Completed => Color::Green,
            Status::InProgress => Color::Yellow,
            Status::Pending => Color::White,
        }
    };
    let mut spans = vec![
        Span::styled(
            format!("[{}] {}", status_marker(task.status), task.title),
            Style::default().fg(color),
        ),
        Span::styled(
            format!("  {} | {}", task.category, task.priority.label()),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(due) = task.due_date {
        spans.push(Span::raw(format!("  due {}", due_label(due))));
    }
    ListItem::new(Line::from(spans))
}

fn render_analytics(f: &mut Frame, app: &App, area: Rect) {
    let analytics = Analytics::compute(&app.history, Local::now());
    if analytics.total == 0 {
        let empty = Paragraph::new("No Data Available\n\nCreate some tasks to start seeing your analytics and insights.")
            .block(Block::default().title("analytics").borders(Borders::ALL));
        f.render_widget(empty, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(50),
            Constraint::Min(6),
        ])
        .split(area);
    let summary = Paragraph::new(format!(
        "total {}  completed {}  completion rate {:.1}%  categories {}",
        analytics.total, analytics.completed, analytics.completion_rate, analytics.category_count
    ))
    .block(Block::default().title("overview").borders(Borders::ALL));
    f.render_widget(summary, rows[0]);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    render_bars(f, "status", &analytics.status, top[0]);
    render_bars(f, "priority", &analytics.priority, top[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    let categories: Vec<ListItem> = analytics
        .categories
        .iter()
        .map(|c| ListItem::new(format!("{:<22} {:>3} tasks {:>5.1}%", c.label, c.count, c.percentage)))
        .collect();
    f.render_widget(
        List::new(categories).block(Block::default().title("tasks by category").borders(Borders::ALL)),
        bottom[0],
    );

    let weekly: Vec<ListItem> = analytics
        .weekly
        .iter()
        .map(|day| {
            ListItem::new(format!(
                "{}  created {:>3}  completed {:>3}",
                day.date.format("%b %d"),
                day.created,
                day.completed
            ))
        })
        .collect();
    f.render_widget(
        List::new(weekly).block(Block::default().title("weekly activity").borders(Borders::ALL)),
        bottom[1],
    );
}

fn render_bars(
    f: &mut Frame,
    title: &str,
    buckets: &[planner_core::aggregate::Distribution],
    area: Rect,
) {
    let data: Vec<(&str, u64)> = buckets
        .iter()
        .map(|b| (b.label.as_str(), b.count as u64))
        .collect();
    let chart = BarChart::default()
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .data(data.as_slice())
        .bar_width(11)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Blue))
        .value_style(Style::default().fg(Color::White).bg(Color::Blue));
    f.render_widget(chart, area);
}

fn render_form(f: &mut Frame, form: &TaskForm) {
    let popup_area = centered_rect(70, 60, f.area());
    f.render_widget(Clear, popup_area);

    let mut lines: Vec<Line> = form
        .fields()
        .map(|(field, value)| {
            let style = if field == form.focus {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{:<24}", field.label()), style),
                Span::raw(value),
            ])
        })
        .collect();
    if let Some(preview) = form.due_preview() {
        lines.push(Line::from(format!("{:<24}{preview}", "")));
    }
    lines.push(Line::from(""));
    lines.push(Line::from("enter: save | esc: cancel | tab: next field | left/right: cycle"));

    let popup = Paragraph::new(lines)
        .block(Block::default().title(form.title()).borders(Borders::ALL))
        .style(Style::default().fg(Color::Green))
        .wrap(Wrap { trim: false });
    f.render_widget(popup, popup_area);
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
    use super::*;
    use planner_core::{Database, NewTask, Session, User, parse_due_date};
    use ratatui::backend::TestBackend;

    async fn app_with(titles: &[(&str, &str)]) -> App {
        let db = Database::in_memory().await.expect("in-memory database");
        let planner = Planner::new(db, Session::signed_in(User::new("u1")));
        for (title, category) in titles {
            planner
                .create_task(NewTask::new(*title, *category))
                .await
                .expect("create");
        }
        let mut app = App::new(planner);
        app.load_tasks().await;
        app
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        terminal.draw(|f| ui(f, app)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn form_creates_task_and_refreshes() {
        let mut app = app_with(&[]).await;
        app.start_creating();
        let form = app.form.as_mut().expect("form");
        form.title = "Read Ch.1".into();
        form.category = "Mathematics".into();
        app.submit_form().await;

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.recent.len(), 1);
        assert_eq!(
            app.notification.as_ref().map(|n| n.message.as_str()),
            Some("Task created successfully!")
        );
    }

    #[tokio::test]
    async fn invalid_form_stays_open() {
        let mut app = app_with(&[]).await;
        app.start_creating();
        app.submit_form().await;

        assert_eq!(app.input_mode, InputMode::Form);
        assert!(app.tasks.is_empty());
        let notification = app.notification.as_ref().expect("notification");
        assert!(notification.is_error);
        assert_eq!(notification.message, "Title is required");
    }

    #[tokio::test]
    async fn editing_updates_selected_task() {
        let mut app = app_with(&[("Essay", "Language")]).await;
        app.start_editing();
        app.form.as_mut().expect("form").title = "Essay draft".into();
        app.submit_form().await;

        assert_eq!(app.tasks[0].title, "Essay draft");
        assert_eq!(app.tasks.len(), 1);
    }

    #[tokio::test]
    async fn title_edit_leaves_due_time_alone() {
        let mut app = app_with(&[]).await;
        let due = parse_due_date("2030-06-01T12:30:00Z").expect("due");
        app.planner
            .create_task(NewTask::new("Essay", "Language").with_due_date(due))
            .await
            .expect("create");
        app.load_tasks().await;

        app.start_editing();
        app.form.as_mut().expect("form").title = "Essay draft".into();
        app.submit_form().await;

        assert_eq!(app.tasks[0].title, "Essay draft");
        assert_eq!(app.tasks[0].due_date, Some(due));
    }

    #[tokio::test]
    async fn analytics_groups_categories_in_creation_order() {
        let app = app_with(&[("a", "Science"), ("b", "Art"), ("c", "Art")]).await;

        assert_eq!(app.tasks[0].title, "c");
        let analytics = Analytics::compute(&app.history, Local::now());
        let labels: Vec<_> = analytics.categories.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Science", "Art"]);
    }

    #[tokio::test]
    async fn status_advances_and_delete_confirms() {
        let mut app = app_with(&[("Essay", "Language")]).await;
        app.advance_selected_status().await;
        assert_eq!(app.tasks[0].status, Status::InProgress);

        app.start_delete_confirm();
        assert_eq!(app.input_mode, InputMode::DeleteConfirm);
        app.confirm_delete().await;
        assert!(app.tasks.is_empty());
        assert_eq!(app.task_state.selected(), None);
    }

    #[tokio::test]
    async fn filters_cycle_and_clear() {
        let mut app = app_with(&[("a", "Science"), ("b", "Art"), ("c", "Art")]).await;

        app.cycle_category_filter();
        assert_eq!(app.filter.category, Choice::Only("Art".to_string()));
        assert_eq!(app.visible_tasks().len(), 2);
        app.cycle_category_filter();
        assert_eq!(app.filter.category, Choice::Only("Science".to_string()));
        app.cycle_category_filter();
        assert_eq!(app.filter.category, Choice::All);

        app.cycle_status_filter();
        assert_eq!(app.filter.status, Choice::Only(Status::Pending));
        app.cycle_priority_filter();
        assert_eq!(app.filter.active_count(), 2);
        assert!(app.visible_tasks().is_empty());
        assert_eq!(app.task_state.selected(), None);

        app.clear_filters();
        assert_eq!(app.visible_tasks().len(), 3);
        assert_eq!(app.task_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn navigation_wraps() {
        let mut app = app_with(&[("a", "Art"), ("b", "Art")]).await;
        assert_eq!(app.task_state.selected(), Some(0));
        app.previous_task();
        assert_eq!(app.task_state.selected(), Some(1));
        app.next_task();
        assert_eq!(app.task_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn renders_every_view() {
        let mut app = app_with(&[("Write essay", "Language")]).await;

        assert!(screen(&mut app).contains("total tasks"));

        app.view = View::Tasks;
        assert!(screen(&mut app).contains("Showing 1 of 1 tasks"));

        app.view = View::Analytics;
        assert!(screen(&mut app).contains("weekly activity"));

        app.show_help();
        assert!(screen(&mut app).contains("HELP"));
    }
}
