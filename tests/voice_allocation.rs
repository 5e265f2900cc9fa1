//! Allocation behaviour seen from outside the crate: the pure allocator and
//! the engine that drives real voices with it.

use voicebank::engine::{AllocatorCore, HeldNoteStack, VoiceMask};
use voicebank::io::converter::midi_to_synth;
use voicebank::io::midi::MidiEvent;
use voicebank::synth::Transition;
use voicebank::{AllocationStrategy, BasicEngine, EngineConfig, SynthMessage, VoiceMode};

fn poly(max_voices: usize, strategy: AllocationStrategy) -> AllocatorCore {
    let mut core = AllocatorCore::new(max_voices);
    core.set_mode(VoiceMode::Polyphonic);
    core.set_allocation_strategy(strategy);
    core
}

#[test]
fn active_voices_never_exceed_pool() {
    for strategy in [
        AllocationStrategy::RoundRobin,
        AllocationStrategy::OldestNote,
        AllocationStrategy::FirstAvailable,
        AllocationStrategy::ReleaseFirst,
    ] {
        let mut core = poly(7, strategy);
        for i in 0..200u32 {
            core.note_on((i * 5 % 88 + 21) as u8, 100);
            if i % 4 == 3 {
                core.note_off((i * 5 % 88 + 21) as u8);
            }
            assert!(core.active_voice_count() <= 7, "{strategy:?}");
        }
    }
}

#[test]
fn fifth_note_steals_index_one_round_robin() {
    let mut core = poly(4, AllocationStrategy::RoundRobin);
    let first: Vec<_> = [60, 62, 64, 65]
        .into_iter()
        .map(|n| core.note_on(n, 100).voice_index)
        .collect();
    assert_eq!(first, vec![Some(0), Some(1), Some(2), Some(3)]);

    let steal = core.note_on(67, 100);
    assert_eq!(steal.voice_index, Some(1));
    assert!(steal.stolen);

    assert_eq!(core.note_on(69, 100).voice_index, Some(2));
}

#[test]
fn release_first_keeps_held_chord() {
    let mut core = poly(4, AllocationStrategy::ReleaseFirst);
    for note in [48, 52, 55, 60] {
        core.note_on(note, 100);
    }
    core.note_off(52); // voice 1 now ringing out

    let steal = core.note_on(64, 100);

    assert_eq!(steal.voice_index, Some(1));
    assert!(core.pool().iter().all(|v| v.gate));
}

#[test]
fn mono_walks_back_through_held_notes() {
    let mut core = AllocatorCore::new(4);
    core.set_mode(VoiceMode::Monophonic);
    for note in [60, 64, 67] {
        core.note_on(note, 100);
    }

    let off = core.note_off(67);
    assert_eq!(off.retrigger_note, Some(64));

    let off = core.note_off(64);
    assert_eq!(off.retrigger_note, Some(60));

    let off = core.note_off(60);
    assert!(!off.retrigger);
    assert!(!off.has_held_notes);
    assert_eq!(off.released.iter().collect::<Vec<_>>(), vec![0]);
}

#[test]
fn held_note_overflow_only_drops_tracking() {
    let mut core = AllocatorCore::new(1);
    core.set_mode(VoiceMode::Monophonic);
    for note in 40..60 {
        core.note_on(note, 100);
    }

    // the 17th+ keys still sound, they just are not remembered
    assert_eq!(core.voice(0).map(|v| v.note), Some(59));
    assert_eq!(core.held_notes().len(), voicebank::engine::MAX_HELD_NOTES);
}

#[test]
fn held_stack_is_a_set() {
    let mut stack = HeldNoteStack::new();
    stack.push(60);
    stack.push(60);
    assert_eq!(stack.as_slice(), &[60]);
    assert!(VoiceMask::EMPTY.is_empty());
}

#[test]
fn engine_mono_legato_and_glide() {
    let mut engine = BasicEngine::from_config(&EngineConfig {
        mode: VoiceMode::Monophonic,
        portamento_ms: 50.0,
        ..EngineConfig::default()
    })
    .unwrap();

    assert_eq!(engine.note_on(60, 100), Some(Transition::Retrigger));
    assert_eq!(engine.note_on(67, 100), Some(Transition::Glide));

    engine.set_portamento_time(0.0);
    assert_eq!(engine.note_on(72, 100), Some(Transition::Legato));
}

#[test]
fn engine_poly_steal_is_a_hard_retrigger() {
    let mut engine = BasicEngine::from_config(&EngineConfig {
        max_voices: 2,
        portamento_ms: 100.0,
        ..EngineConfig::default()
    })
    .unwrap();

    engine.note_on(60, 100);
    engine.note_on(64, 100);
    assert_eq!(engine.note_on(67, 100), Some(Transition::Retrigger));
    assert_eq!(engine.voice(1).map(|v| v.slot.note), Some(67));
}

#[test]
fn mode_switch_does_not_hang_old_voices() {
    let mut engine = BasicEngine::from_config(&EngineConfig::default()).unwrap();
    for note in [60, 64, 67] {
        engine.note_on(note, 100);
    }

    engine.set_mode(VoiceMode::Monophonic);
    engine.note_off(64);
    engine.note_off(67);

    assert!(engine.voice(1).is_some_and(|v| !v.slot.gate));
    assert!(engine.voice(2).is_some_and(|v| !v.slot.gate));

    // the first mono render drops the leftovers
    let mut left = [0.0; 64];
    let mut right = [0.0; 64];
    engine.render(&mut left, &mut right);
    assert_eq!(engine.active_voice_count(), 1);
}

#[test]
fn midi_stream_drives_engine() {
    let mut engine = BasicEngine::from_config(&EngineConfig::default()).unwrap();
    let events = [
        MidiEvent::NoteOn {
            channel: 0,
            key: 60,
            velocity: 100,
        },
        MidiEvent::NoteOn {
            channel: 0,
            key: 64,
            velocity: 100,
        },
        MidiEvent::NoteOn {
            channel: 0,
            key: 60,
            velocity: 0,
        },
        MidiEvent::ControlChange {
            channel: 0,
            controller: 103,
            value: 200,
        },
    ];

    let mut queue: std::collections::VecDeque<SynthMessage> =
        events.into_iter().filter_map(|e| midi_to_synth(e, 0)).collect();
    engine.process_messages(&mut queue);

    assert!(engine.voice(0).is_some_and(|v| !v.slot.gate));
    assert!(engine.voice(1).is_some_and(|v| v.slot.gate && v.slot.note == 64));
    assert_eq!(engine.allocation_strategy(), AllocationStrategy::RoundRobin);
}
