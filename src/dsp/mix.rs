//! Voice summing and gain compensation.

/*
Summing Voices
==============

Every polyphonic block is built by ADDING the active voices together. Four
voices that each peak at 1.0 can sum to 4.0, so the sum has to be scaled
back down. The question is by how much.

Equal-Amplitude (1/N)
---------------------

    gain = 1 / N

Guarantees the peak never exceeds one voice's peak, but makes every voice get
quieter as the chord grows: a single note at full level, a four-note chord
where each note is at 25%. It sounds like the synth ducks whenever you add a
finger.

Equal-Power (1/sqrt N)  <- what the engine uses
------------------------

    gain = 1 / sqrt(N)

Uncorrelated signals add in POWER, not amplitude: the RMS of N independent
voices grows like sqrt(N). Dividing by sqrt(N) keeps the perceived loudness
roughly constant as the chord size changes.

    N   1/N     1/sqrt(N)
    1   1.000   1.000
    2   0.500   0.707
    3   0.333   0.577
    4   0.250   0.500

The cost is that correlated voices (same note twice, in phase) can still peak
above 1.0. That is accepted; the unit's output stage clips or limits.
*/

/// Gain that keeps perceived loudness constant for `voices` uncorrelated sources.
///
/// Zero or one voice returns unity gain.
#[inline]
pub fn equal_power_gain(voices: usize) -> f32 {
    if voices <= 1 {
        1.0
    } else {
        1.0 / (voices as f32).sqrt()
    }
}

/// Add signal B into signal A in-place (summing).
///
/// Can exceed [-1.0, +1.0]; scale afterwards.
#[inline]
pub fn sum_in_place(a: &mut [f32], b: &[f32]) {
    debug_assert_eq!(a.len(), b.len());

    for (sa, &sb) in a.iter_mut().zip(b.iter()) {
        *sa += sb;
    }
}

/// Multiply every sample by `gain`.
#[inline]
pub fn scale_in_place(buffer: &mut [f32], gain: f32) {
    if gain == 1.0 {
        return;
    }
    for sample in buffer.iter_mut() {
        *sample *= gain;
    }
}

/// Zero both channels.
#[inline]
pub fn clear_stereo(left: &mut [f32], right: &mut [f32]) {
    left.fill(0.0);
    right.fill(0.0);
}

/// Constant-power pan law. `pan` runs from -1.0 (left) to +1.0 (right).
#[inline]
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * std::f32::consts::FRAC_PI_4;
    (angle.cos(), angle.sin())
}
