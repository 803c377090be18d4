//! TUI module for resobox
//!
//! Shows smoothed input/output levels and the stage chain, sends bypass
//! toggles to the audio thread and starts or stops recordings.

mod chain;
pub mod meters;
pub mod state;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use std::time::Duration;

use resobox::{
    dsp::meter::RmsHistory,
    engine::{ControlHandle, ControlMessage},
};

use super::recording::{RecordEvent, RecordingThread};
use chain::render_chain;
use meters::render_meters;
use state::{SessionInfo, StageView};

/// UI application state
pub struct MeterApp {
    /// Queues to and from the audio callback
    control: ControlHandle,
    recording: RecordingThread,
    /// Last recording status shown in the session bar
    record_status: Option<String>,
    /// UI-side copy of the chain
    stages: Vec<StageView>,
    info: SessionInfo,
    input: RmsHistory,
    output: RmsHistory,
    metering: bool,
    should_quit: bool,
}

impl MeterApp {
    pub fn new(
        control: ControlHandle,
        recording: RecordingThread,
        stages: Vec<StageView>,
        info: SessionInfo,
    ) -> Self {
        Self {
            control,
            recording,
            record_status: None,
            stages,
            info,
            input: RmsHistory::default(),
            output: RmsHistory::default(),
            metering: true,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_readings();
            self.poll_recording();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn poll_readings(&mut self) {
        for reading in self.control.readings() {
            self.input.push(reading.input_rms);
            self.output.push(reading.output_rms);
        }
    }

    fn poll_recording(&mut self) {
        for event in self.recording.poll() {
            self.record_status = Some(match event {
                RecordEvent::Started(path) => format!("→ {}", path.display()),
                RecordEvent::Saved(info) => format!("saved {}", info.path.display()),
                RecordEvent::Failed(err) => format!("record failed: {err}"),
            });
        }
    }

    fn send(&mut self, message: ControlMessage) -> bool {
        match self.control.send(message) {
            Ok(()) => true,
            Err(dropped) => {
                tracing::warn!(?dropped, "control queue full");
                false
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let stage = c as usize - '1' as usize;
                match self.stages.get(stage) {
                    Some(view) if view.inert => {
                        tracing::info!(stage, "no impulse response loaded; stage stays bypassed");
                    }
                    Some(_) => {
                        if self.send(ControlMessage::ToggleBypass { stage }) {
                            self.stages[stage].bypassed = !self.stages[stage].bypassed;
                        }
                    }
                    None => {}
                }
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                if self.send(ControlMessage::SetMetering(!self.metering)) {
                    self.metering = !self.metering;
                    if !self.metering {
                        self.input.clear();
                        self.output.clear();
                    }
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.send(ControlMessage::Reset);
            }
            KeyCode::Char('w') | KeyCode::Char('W') => {
                self.recording.toggle();
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Session bar
                Constraint::Length(5), // Meters
                Constraint::Min(3),    // Chain
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        self.render_session(frame, chunks[0]);
        render_meters(
            frame,
            chunks[1],
            self.input.average(),
            self.output.average(),
            self.metering,
        );
        render_chain(frame, chunks[2], &self.stages);

        let help = Paragraph::new(" [1-9] Bypass stage  [M] Metering  [R] Reset  [W] Record  [Q] Quit")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }

    fn render_session(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let info = &self.info;
        let impulse = match info.impulse_taps {
            Some(taps) => format!("IR {taps} taps"),
            None => "no IR".to_string(),
        };
        let mut spans = vec![
            Span::styled(
                format!(" {} → {}  ", info.input_name, info.output_name),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!(
                    "{:.1}kHz  {} frames  {}ch {}  ",
                    info.sample_rate / 1000.0,
                    info.block_size,
                    info.input_channels,
                    info.format
                ),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(impulse, Style::default().fg(Color::Magenta)),
        ];
        if let Some(elapsed) = self.recording.elapsed() {
            let secs = elapsed.as_secs();
            spans.push(Span::styled(
                format!("  ● REC {:02}:{:02}", secs / 60, secs % 60),
                Style::default().fg(Color::Red),
            ));
        }
        if let Some(status) = &self.record_status {
            spans.push(Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray)));
        }
        let line = Line::from(spans);
        let block = Block::default().title(" resobox ").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(line).block(block), area);
    }
}
