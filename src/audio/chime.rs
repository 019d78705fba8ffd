use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

/// Single synthesized chime: a sine burst with a linear fade-out so the
/// tail stays click-free.
pub struct Chime {
    freq: f32,
    sample_rate: u32,
    num_sample: usize,
    total_samples: usize,
}

impl Chime {
    pub fn new(freq: f32, duration_ms: u64) -> Self {
        let sample_rate = 44_100u32;
        Self {
            freq,
            sample_rate,
            num_sample: 0,
            total_samples: (u64::from(sample_rate) * duration_ms / 1000) as usize,
        }
    }
}

impl Iterator for Chime {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples {
            return None;
        }
        self.num_sample += 1;

        let t = self.num_sample as f32 / self.sample_rate as f32;
        let envelope = 1.0 - self.num_sample as f32 / self.total_samples as f32;
        let sample = (2.0 * PI * self.freq * t).sin();

        Some(sample * envelope * 0.2) // Lower amplitude to prevent clipping
    }
}

impl Source for Chime {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_samples.saturating_sub(self.num_sample))
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_millis(
            self.total_samples as u64 * 1000 / u64::from(self.sample_rate),
        ))
    }
}
