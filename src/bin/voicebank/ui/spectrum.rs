//! Spectrum analyzer widget
//!
//! Hann-windowed FFT of the output, read at log-spaced frequencies so each
//! octave gets the same width on screen. Detuned unison stacks show up as a
//! smear around each partial; a stolen voice shows up as a partial vanishing.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Points along the x axis.
const SPECTRUM_BINS: usize = 64;
const MIN_FREQ: f32 = 30.0;
const FLOOR_DB: f64 = -100.0;
/// Per-frame fall of the displayed level, in dB.
const FALLOFF_DB: f64 = 3.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// FFT bin read for each display point.
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 Hz, dB) ready for the chart.
    points: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(fft_len: usize, sample_rate: f32) -> Self {
        let fft_len = fft_len.max(2);
        let fft = FftPlanner::<f32>::new().plan_fft_forward(fft_len);

        let denom = (fft_len - 1) as f32;
        let window = (0..fft_len)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        let max_freq = (sample_rate * 0.5).min(20_000.0).max(MIN_FREQ * 2.0);
        let ratio = max_freq / MIN_FREQ;
        let last_bin = fft_len / 2 - 1;

        let mut bin_indices = Vec::with_capacity(SPECTRUM_BINS);
        let mut points = Vec::with_capacity(SPECTRUM_BINS);
        for i in 0..SPECTRUM_BINS {
            let t = i as f32 / (SPECTRUM_BINS - 1) as f32;
            let freq = MIN_FREQ * ratio.powf(t);
            let index = (freq * fft_len as f32 / sample_rate).round() as usize;
            bin_indices.push(index.min(last_bin));
            points.push((f64::from(freq).log10(), FLOOR_DB));
        }

        Self {
            window,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_len],
            points,
        }
    }

    pub fn fft_len(&self) -> usize {
        self.window.len()
    }

    /// Analyse the newest `fft_len` samples. Shorter buffers are ignored.
    pub fn update(&mut self, buffer: &[f32]) {
        let len = self.window.len();
        let Some(start) = buffer.len().checked_sub(len) else {
            return;
        };

        for ((bin, &sample), &w) in self.scratch.iter_mut().zip(&buffer[start..]).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let norm = 2.0 / len as f32;
        for (point, &index) in self.points.iter_mut().zip(&self.bin_indices) {
            let magnitude = self.scratch[index].norm() * norm;
            let db = 20.0 * f64::from(magnitude.max(1e-6)).log10();
            point.1 = db.max(point.1 - FALLOFF_DB).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.points
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let (min_x, max_x) = match (spectrum.first(), spectrum.last()) {
        (Some(first), Some(last)) => (first.0, last.0),
        _ => (1.0, 4.0),
    };

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([min_x, max_x])
                .labels(vec!["30", "300", "3k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
