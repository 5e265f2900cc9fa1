//! Offline render of a short demo phrase.

use std::collections::VecDeque;
use std::path::Path;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::debug;
use voicebank::io::converter::midi_to_synth;
use voicebank::io::midi::MidiEvent;
use voicebank::{BasicEngine, EngineConfig, SynthMessage};

const BLOCK: usize = 64;
const BPM: f32 = 110.0;
const TAIL_SECONDS: f32 = 1.5;

/// (beat, event). Overlapping notes so every mode has something to decide.
fn phrase() -> Vec<(f32, MidiEvent)> {
    let on = |key, velocity| MidiEvent::NoteOn {
        channel: 0,
        key,
        velocity,
    };
    let off = |key| MidiEvent::NoteOff {
        channel: 0,
        key,
        velocity: 0,
    };

    vec![
        (0.0, on(48, 100)),
        (0.0, on(55, 90)),
        (0.0, on(64, 90)),
        (1.0, on(67, 110)),
        (1.5, on(71, 100)),
        (2.0, off(71)),
        (2.0, on(72, 120)),
        (3.0, off(72)),
        (3.0, off(67)),
        (3.5, on(74, 100)),
        (4.0, off(74)),
        (4.0, off(64)),
        (4.0, on(65, 100)),
        (5.5, off(65)),
        (6.0, off(55)),
        (6.0, off(48)),
        (6.0, on(60, 110)),
        (6.5, on(62, 110)),
        (7.0, off(62)),
        (7.5, off(60)),
    ]
}

pub fn run(config: &EngineConfig, output: &Path) -> EyreResult<()> {
    let mut engine = BasicEngine::from_config(config)?;
    let sample_rate = config.sample_rate;
    let frames_per_beat = sample_rate * 60.0 / BPM;

    let mut events: VecDeque<(usize, SynthMessage)> = phrase()
        .into_iter()
        .filter_map(|(beat, event)| {
            midi_to_synth(event, 0).map(|msg| ((beat * frames_per_beat) as usize, msg))
        })
        .collect();
    let last = events.back().map_or(0, |(frame, _)| *frame);
    let total = last + (TAIL_SECONDS * sample_rate) as usize;

    let spec = WavSpec {
        channels: 2,
        sample_rate: sample_rate as u32,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(output, spec)
        .wrap_err_with(|| format!("failed to create {}", output.display()))?;

    let mut left = [0.0f32; BLOCK];
    let mut right = [0.0f32; BLOCK];
    let mut pending = VecDeque::new();
    let mut frame = 0;
    let mut peak = 0.0f32;

    while frame < total {
        while events.front().is_some_and(|(at, _)| *at <= frame) {
            if let Some((_, msg)) = events.pop_front() {
                pending.push_back(msg);
            }
        }
        engine.process_messages(&mut pending);

        let len = BLOCK.min(total - frame);
        engine.render(&mut left[..len], &mut right[..len]);

        for (&l, &r) in left[..len].iter().zip(&right[..len]) {
            writer.write_sample(l)?;
            writer.write_sample(r)?;
            peak = peak.max(l.abs()).max(r.abs());
        }
        frame += len;
    }

    writer.finalize().wrap_err("failed to finalize WAV file")?;
    debug!(frames = total, peak, "bounce complete");
    println!(
        "Wrote {} ({:.2}s, {:?}, peak {:.2})",
        output.display(),
        total as f32 / sample_rate,
        config.mode,
        peak
    );
    Ok(())
}
