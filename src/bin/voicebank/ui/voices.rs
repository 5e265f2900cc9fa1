//! Voice pool meter - one row per voice slot

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::state::{EngineSnapshot, VoiceView};

const METER_WIDTH: usize = 24;
const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

pub fn note_name(note: u8) -> String {
    let octave = i32::from(note) / 12 - 1;
    format!("{}{}", NOTE_NAMES[usize::from(note % 12)], octave)
}

fn voice_line(index: usize, voice: &VoiceView) -> Line<'static> {
    let (marker, colour) = match (voice.active, voice.gate) {
        (true, true) => ("●", Color::LightGreen),
        (true, false) => ("◐", Color::Yellow),
        _ => ("○", Color::DarkGray),
    };

    let filled = ((voice.level.clamp(0.0, 1.0) * METER_WIDTH as f32).round() as usize).min(METER_WIDTH);
    let meter = format!("{}{}", "█".repeat(filled), "·".repeat(METER_WIDTH - filled));

    let label = if voice.active {
        format!(
            "{:<4} {:>7.1} Hz  vel {:.2} ",
            note_name(voice.note),
            voice.pitch_hz,
            voice.velocity
        )
    } else {
        format!("{:<4} {:>7} Hz  vel {:>4} ", "--", "--", "--")
    };

    Line::from(vec![
        Span::styled(format!(" {index:>2} {marker} "), Style::default().fg(colour)),
        Span::styled(label, Style::default().fg(Color::White)),
        Span::styled(meter, Style::default().fg(colour)),
    ])
}

pub fn render_voices(frame: &mut Frame, area: Rect, snapshot: &EngineSnapshot) {
    let title = format!(
        " Voices {}/{} ",
        snapshot.voices().iter().filter(|v| v.active).count(),
        snapshot.num_voices
    );
    let block = Block::default()
        .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL);

    let lines: Vec<Line> = snapshot
        .voices()
        .iter()
        .enumerate()
        .map(|(i, v)| voice_line(i, v))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
