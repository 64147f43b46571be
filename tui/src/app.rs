//! Event loop and key handling for the terminal front end.
//!
//! Remote calls never block the loop: each `Command` is spawned onto the
//! runtime and its `Outcome` comes back over a channel, applied on the next
//! tick in arrival order.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use todo_core::{Command, Outcome, TaskId, TodoApi, TodoView};

use crate::ui;

const TICK: Duration = Duration::from_millis(50);

/// Which input receives keystrokes when no task is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Draft,
}

pub struct App {
    view: TodoView,
    api: Arc<dyn TodoApi>,
    focus: Focus,
    selected: usize,
    should_quit: bool,
    outcomes_tx: UnboundedSender<Outcome>,
    outcomes_rx: UnboundedReceiver<Outcome>,
}

impl App {
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            view: TodoView::new(),
            api,
            focus: Focus::List,
            selected: 0,
            should_quit: false,
            outcomes_tx,
            outcomes_rx,
        }
    }

    pub fn view(&self) -> &TodoView {
        &self.view
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let load = self.view.mount();
        self.spawn(load);

        while !self.should_quit {
            self.drain_outcomes();
            terminal.draw(|frame| ui::draw(frame, self))?;
            if event::poll(TICK)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Task ids in display order: active first, then completed.
    pub fn display_order(&self) -> Vec<TaskId> {
        let sections = self.view.sections();
        sections
            .active
            .iter()
            .chain(sections.completed.iter())
            .map(|task| task.id)
            .collect()
    }

    fn selected_id(&self) -> Option<TaskId> {
        self.display_order().get(self.selected).copied()
    }

    fn spawn(&self, command: Command) {
        let api = Arc::clone(&self.api);
        let tx = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let outcome = command.run(&*api).await;
            // The receiver only goes away when the app is shutting down.
            let _ = tx.send(outcome);
        });
    }

    fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            self.apply(outcome);
        }
    }

    fn apply(&mut self, outcome: Outcome) {
        self.view.apply(outcome);
        let len = self.view.tasks().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.view.is_loading() {
            if key.code == KeyCode::Char('q') {
                self.should_quit = true;
            }
            return;
        }

        if self.view.editing_id().is_some() {
            self.handle_edit_key(key.code);
        } else {
            match self.focus {
                Focus::Draft => self.handle_draft_key(key.code),
                Focus::List => self.handle_list_key(key.code),
            }
        }
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                if let Some(command) = self.view.save_edit() {
                    self.spawn(command);
                }
            }
            KeyCode::Esc => self.view.cancel_edit(),
            KeyCode::Backspace => {
                if let Some(buffer) = self.view.edit_buffer_mut() {
                    buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(buffer) = self.view.edit_buffer_mut() {
                    buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn handle_draft_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                if let Some(command) = self.view.submit_draft() {
                    self.spawn(command);
                }
            }
            KeyCode::Esc => self.focus = Focus::List,
            KeyCode::Backspace => {
                self.view.draft_mut().pop();
            }
            KeyCode::Char(c) => self.view.draft_mut().push(c),
            _ => {}
        }
    }

    fn handle_list_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('a') | KeyCode::Char('i') => self.focus = Focus::Draft,
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.view.tasks().len() {
                    self.selected += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some(command) = self.selected_id().and_then(|id| self.view.toggle(id)) {
                    self.spawn(command);
                }
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                // Completed tasks are read-only until reopened.
                let id = self
                    .selected_id()
                    .filter(|id| self.view.task(*id).is_some_and(|task| !task.completed));
                if let Some(id) = id {
                    self.view.begin_edit(id);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.spawn(self.view.delete(id));
                }
            }
            _ => {}
        }
    }
}
