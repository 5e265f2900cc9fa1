//! Live session: cpal output stream driving the engine, ratatui in front.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use tracing::{error, info};
use voicebank::{BasicEngine, EngineConfig, SynthMessage, MAX_BLOCK_SIZE};

use crate::ui::{EngineSnapshot, UiApp, VIS_BUFFER_SIZE};

/// Capacity in blocks for the audio-to-UI sample ring.
const AUDIO_RING_BLOCKS: usize = 8;
const CONTROL_QUEUE_LEN: usize = 256;
const SNAPSHOT_QUEUE_LEN: usize = 16;

pub fn run(mut config: EngineConfig) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let stream_config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    config.sample_rate = stream_config.sample_rate().0 as f32;
    let channels = usize::from(stream_config.channels());
    info!(sample_rate = config.sample_rate, channels, "opened output device");

    let mut engine = BasicEngine::from_config(&config)?;
    let initial = EngineSnapshot::capture(&engine);

    // --- Cross-thread rings ---
    let (msg_tx, mut msg_rx) = RingBuffer::<SynthMessage>::new(CONTROL_QUEUE_LEN);
    let (mut audio_tx, audio_rx) = RingBuffer::<f32>::new(VIS_BUFFER_SIZE * AUDIO_RING_BLOCKS);
    let (mut state_tx, state_rx) = RingBuffer::<EngineSnapshot>::new(SNAPSHOT_QUEUE_LEN);

    let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut right = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device
        .build_output_stream(
            &stream_config.into(),
            move |data: &mut [f32], _| {
                engine.process_messages(&mut msg_rx);

                let total_frames = data.len() / channels;
                let mut frames_written = 0;
                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let (l, r) = (&mut left[..frames], &mut right[..frames]);
                    engine.render(l, r);

                    let out = &mut data[frames_written * channels..(frames_written + frames) * channels];
                    for ((frame, &sl), &sr) in out.chunks_mut(channels).zip(l.iter()).zip(r.iter()) {
                        match frame {
                            [mono] => *mono = 0.5 * (sl + sr),
                            [fl, fr, rest @ ..] => {
                                *fl = sl;
                                *fr = sr;
                                rest.fill(0.0);
                            }
                            [] => {}
                        }
                    }

                    // Drop the remainder if the UI is behind.
                    for (&sl, &sr) in l.iter().zip(r.iter()) {
                        if audio_tx.push(0.5 * (sl + sr)).is_err() {
                            break;
                        }
                    }

                    frames_written += frames;
                }

                let _ = state_tx.push(EngineSnapshot::capture(&engine));
            },
            |err| error!("stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    stream.play().wrap_err("failed to start output stream")?;

    let mut terminal = ratatui::init();
    let result = UiApp::new(msg_tx, audio_rx, state_rx, initial, config.sample_rate).run(&mut terminal);
    ratatui::restore();

    info!("session ended");
    result
}
