use crate::error::SignalError;

/// Immutable planar audio buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// One sample vector per channel, all the same length
    channels: Vec<Vec<f32>>,

    /// Samples per second (always positive)
    sample_rate: u32,
}

impl Signal {
    /// Create a signal from planar channel data
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, SignalError> {
        if sample_rate == 0 {
            return Err(SignalError::ZeroSampleRate);
        }
        let expected = channels.first().map(Vec::len).ok_or(SignalError::NoChannels)?;

        for (channel, data) in channels.iter().enumerate() {
            if data.len() != expected {
                return Err(SignalError::RaggedChannels {
                    channel,
                    expected,
                    found: data.len(),
                });
            }
            if let Some(index) = data.iter().position(|s| !s.is_finite()) {
                return Err(SignalError::NonFinite { channel, index });
            }
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Create a single-channel signal
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self, SignalError> {
        Self::new(vec![samples], sample_rate)
    }

    /// Create a signal from interleaved samples
    ///
    /// Trailing samples that do not fill a whole frame are dropped.
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self, SignalError> {
        if channel_count == 0 {
            return Err(SignalError::NoChannels);
        }
        let frames = samples.len() / channel_count;
        let channels = (0..channel_count)
            .map(|ch| {
                samples
                    .iter()
                    .skip(ch)
                    .step_by(channel_count)
                    .take(frames)
                    .copied()
                    .collect()
            })
            .collect();
        Self::new(channels, sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Samples of one channel
    ///
    /// Panics if `index` is not a valid channel.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// The first channel, used by all single-channel analyzers
    pub fn first_channel(&self) -> &[f32] {
        &self.channels[0]
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }
}
