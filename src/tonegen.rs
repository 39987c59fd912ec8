//! Square-wave tone generator
//!
//! Synthesizes the classic arcade beeps as signed 16-bit mono PCM. The
//! generator holds one tone at a time; retriggering cuts the current tone off,
//! matching how the original cabinets sounded. The host pulls samples out in
//! sink-sized chunks with [`ToneGen::generate`], so no audio callback or
//! platform plumbing lives in this crate.

use crate::config::ConfigError;

/// Output sample rate in Hz (signed 16-bit mono)
pub const SAMPLE_RATE: u32 = 44_100;
/// Internal chunk size: a tenth of a second of audio
pub const BUFFER_MAX_SAMPLES: usize = (SAMPLE_RATE / 10) as usize;

/// A pitch and duration pair describing one beep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub freq: u32,
    pub duration_ms: u32,
}

impl Tone {
    pub const fn new(freq: u32, duration_ms: u32) -> Self {
        Self { freq, duration_ms }
    }
}

/// Single-voice square wave synthesizer
pub struct ToneGen {
    freq: u32,
    amplitude: i16,
    /// Monotonic sample counter within the current tone
    sample_idx: u64,
    remaining_samples: usize,
    buffer: [i16; BUFFER_MAX_SAMPLES],
    buffer_len: usize,
    muted: bool,
}

impl ToneGen {
    /// Create a generator with the given amplitude as a percentage of full
    /// scale. The beeps are meant to sit under the action, so a couple of
    /// percent is plenty.
    pub fn new(volume_percentage: f32) -> Result<Self, ConfigError> {
        if !(0.0..=100.0).contains(&volume_percentage) {
            return Err(ConfigError::VolumeOutOfRange(volume_percentage));
        }
        Ok(Self {
            freq: 0,
            amplitude: (i16::MAX as f32 * volume_percentage / 100.0) as i16,
            sample_idx: 0,
            remaining_samples: 0,
            buffer: [0; BUFFER_MAX_SAMPLES],
            buffer_len: 0,
            muted: false,
        })
    }

    /// Mute without stopping playback; the tone keeps counting down so
    /// unmuting mid-beep resumes at the right place.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    /// Start a new tone, cutting off whatever is still playing
    pub fn set_tone(&mut self, tone: Tone) {
        self.freq = tone.freq;
        self.sample_idx = 0;
        self.remaining_samples = (tone.duration_ms as usize * SAMPLE_RATE as usize) / 1000;
    }

    /// True while the current tone still has samples to emit
    pub fn playing(&self) -> bool {
        self.remaining_samples > 0
    }

    /// Fill the internal buffer with at most `sink_capacity` samples and
    /// return how many were produced. Produces zero once the tone has run
    /// out; the host simply queues whatever [`ToneGen::samples`] holds.
    pub fn generate(&mut self, sink_capacity: usize) -> usize {
        let len = self
            .remaining_samples
            .min(BUFFER_MAX_SAMPLES)
            .min(sink_capacity);
        for slot in &mut self.buffer[..len] {
            *slot = if self.muted {
                0
            } else {
                square_wave_sample(self.sample_idx, self.freq, self.amplitude)
            };
            self.sample_idx += 1;
        }
        self.remaining_samples -= len;
        self.buffer_len = len;
        len
    }

    /// Samples produced by the last [`ToneGen::generate`] call
    pub fn samples(&self) -> &[i16] {
        &self.buffer[..self.buffer_len]
    }
}

/// One sample of an ideal square wave: the half-period the index falls in
/// decides the polarity.
fn square_wave_sample(idx: u64, freq: u32, amplitude: i16) -> i16 {
    if freq == 0 {
        return 0;
    }
    let half_periods = idx * 2 * freq as u64 / SAMPLE_RATE as u64;
    if half_periods % 2 == 0 {
        amplitude
    } else {
        -amplitude
    }
}
