//! TUI module for voicebank
//!
//! Shows the voice pool, the output waveform and its spectrum, and turns key
//! presses into engine messages.

mod spectrum;
pub mod state;
mod status;
mod voices;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;
use tracing::warn;
use voicebank::{AllocationStrategy, SynthMessage, VoiceMode};

use crate::keyboard::Keyboard;
pub use state::EngineSnapshot;

use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_status, AudioStats};
use voices::render_voices;
use waveform::render_waveform;

/// Samples kept for the scope and the FFT.
pub const VIS_BUFFER_SIZE: usize = 2048;

const PORTAMENTO_STEP_MS: f32 = 25.0;
const DETUNE_STEP_CENTS: f32 = 2.0;

pub struct UiApp {
    msg_tx: Producer<SynthMessage>,
    audio_rx: Consumer<f32>,
    state_rx: Consumer<EngineSnapshot>,
    snapshot: EngineSnapshot,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    keyboard: Keyboard,
    sample_rate: f32,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        msg_tx: Producer<SynthMessage>,
        audio_rx: Consumer<f32>,
        state_rx: Consumer<EngineSnapshot>,
        initial: EngineSnapshot,
        sample_rate: f32,
    ) -> Self {
        Self {
            msg_tx,
            audio_rx,
            state_rx,
            snapshot: initial,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            keyboard: Keyboard::new(),
            sample_rate,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_state();

            terminal.draw(|frame| self.render(frame))?;

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

    fn poll_audio(&mut self) {
        let available = self.audio_rx.slots();
        if available == 0 {
            return;
        }

        // Drop the oldest samples so the window always ends at "now".
        let keep = available.min(VIS_BUFFER_SIZE);
        self.audio_buffer.drain(..keep);
        for _ in 0..available - keep {
            let _ = self.audio_rx.pop();
        }
        for _ in 0..keep {
            let sample = self.audio_rx.pop().unwrap_or(0.0);
            self.audio_buffer.push(sample);
        }

        self.spectrum.update(&self.audio_buffer);
    }

    fn poll_state(&mut self) {
        while let Ok(snapshot) = self.state_rx.pop() {
            self.snapshot = snapshot;
        }
    }

    fn send(&mut self, msg: SynthMessage) {
        if self.msg_tx.push(msg).is_err() {
            warn!(?msg, "control queue full, message dropped");
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let snapshot = self.snapshot;
        match key {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => {
                self.keyboard.release_all();
                self.send(SynthMessage::AllNotesOff);
            }
            KeyCode::Char('1') => self.send(SynthMessage::SetMode(VoiceMode::Monophonic)),
            KeyCode::Char('2') => self.send(SynthMessage::SetMode(VoiceMode::Polyphonic)),
            KeyCode::Char('3') => self.send(SynthMessage::SetMode(VoiceMode::Unison)),
            KeyCode::Char('n') => self.send(SynthMessage::SetStrategy(next_strategy(snapshot.strategy))),
            KeyCode::Char('[') => self.send(SynthMessage::SetPortamento {
                ms: (snapshot.portamento_ms - PORTAMENTO_STEP_MS).max(0.0),
            }),
            KeyCode::Char(']') => self.send(SynthMessage::SetPortamento {
                ms: snapshot.portamento_ms + PORTAMENTO_STEP_MS,
            }),
            KeyCode::Char('-') => self.send(SynthMessage::SetUnisonDetune {
                cents: (snapshot.unison_detune - DETUNE_STEP_CENTS).max(0.0),
            }),
            KeyCode::Char('=') => self.send(SynthMessage::SetUnisonDetune {
                cents: snapshot.unison_detune + DETUNE_STEP_CENTS,
            }),
            KeyCode::Char('z') => self.keyboard.shift_octave(-1),
            KeyCode::Char('x') => self.keyboard.shift_octave(1),
            KeyCode::Char(c) => {
                if let Some(msg) = self.keyboard.press(c) {
                    self.send(msg);
                }
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),                                  // Status
                Constraint::Length(self.snapshot.num_voices as u16 + 2), // Voice pool
                Constraint::Min(8),                                     // Scope + spectrum
                Constraint::Length(1),                                  // Help
            ])
            .split(frame.area());

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_status(
            frame,
            rows[0],
            &self.snapshot,
            self.sample_rate,
            self.keyboard.octave(),
            &stats,
        );
        render_voices(frame, rows[1], &self.snapshot);

        let scopes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[2]);
        render_waveform(frame, scopes[0], &self.audio_buffer[self.audio_buffer.len() / 2..]);
        render_spectrum(frame, scopes[1], self.spectrum.data());

        let held: Vec<String> = self.keyboard.latched_notes().map(voices::note_name).collect();
        let help = Paragraph::new(format!(
            " [a-;] play  [z/x] octave  [1/2/3] mono/poly/unison  [n] steal  [ [ ] ] glide  [-/=] detune  [space] release  [esc] quit   held: {}",
            held.join(" ")
        ))
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, rows[3]);
    }
}

fn next_strategy(current: AllocationStrategy) -> AllocationStrategy {
    match current {
        AllocationStrategy::RoundRobin => AllocationStrategy::OldestNote,
        AllocationStrategy::OldestNote => AllocationStrategy::FirstAvailable,
        AllocationStrategy::FirstAvailable => AllocationStrategy::ReleaseFirst,
        AllocationStrategy::ReleaseFirst => AllocationStrategy::RoundRobin,
    }
}
