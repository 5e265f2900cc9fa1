//! Status bar - engine mode, allocation strategy, glide and output levels

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use voicebank::{AllocationStrategy, VoiceMode};

use super::state::EngineSnapshot;

pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

fn mode_label(mode: VoiceMode) -> &'static str {
    match mode {
        VoiceMode::Monophonic => "MONO",
        VoiceMode::Polyphonic => "POLY",
        VoiceMode::Unison => "UNISON",
    }
}

fn strategy_label(strategy: AllocationStrategy) -> &'static str {
    match strategy {
        AllocationStrategy::RoundRobin => "round robin",
        AllocationStrategy::OldestNote => "oldest note",
        AllocationStrategy::FirstAvailable => "first available",
        AllocationStrategy::ReleaseFirst => "release first",
    }
}

pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    snapshot: &EngineSnapshot,
    sample_rate: f32,
    octave: i8,
    stats: &AudioStats,
) {
    let block = Block::default().title(" voicebank ").borders(Borders::ALL);

    let line = Line::from(vec![
        Span::styled(
            format!(" {}  ", mode_label(snapshot.mode)),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("steal: {}  ", strategy_label(snapshot.strategy)),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("glide: {:.0} ms  ", snapshot.portamento_ms),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("detune: {:.0} ct  ", snapshot.unison_detune),
            Style::default().fg(Color::White),
        ),
        Span::styled(format!("oct {octave}  "), Style::default().fg(Color::Yellow)),
        Span::styled(
            format!("{:.1}kHz  mixed {}  ", sample_rate / 1000.0, snapshot.mixed_voices),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
            Style::default().fg(if stats.peak > 1.0 {
                Color::Red
            } else {
                Color::Magenta
            }),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
