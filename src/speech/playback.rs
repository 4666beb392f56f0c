//! Audio playback to speakers
//!
//! Compiled in with the `audio-playback` feature. Without it,
//! [`AudioPlayback::new`] reports the dependency as unavailable so the
//! speech facade falls back to the native voice.

pub use imp::AudioPlayback;

#[cfg(feature = "audio-playback")]
mod imp {
    use std::io::Cursor;
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::{Duration, Instant};

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{SampleRate, StreamConfig};

    use crate::{Error, Result};

    /// Sample rate for playback (matches common TTS output)
    const PLAYBACK_SAMPLE_RATE: u32 = 24000;

    /// Plays audio to the default output device
    pub struct AudioPlayback {
        config: StreamConfig,
    }

    impl AudioPlayback {
        /// Open the default output device
        ///
        /// # Errors
        ///
        /// Returns [`Error::DependencyUnavailable`] if no usable device exists
        pub fn new() -> Result<Self> {
            let host = cpal::default_host();

            let device = host.default_output_device().ok_or_else(|| {
                Error::DependencyUnavailable("no output device available".to_string())
            })?;

            let supports_rate = |c: &cpal::SupportedStreamConfigRange, channels: u16| {
                c.channels() == channels
                    && c.min_sample_rate() <= SampleRate(PLAYBACK_SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(PLAYBACK_SAMPLE_RATE)
            };

            let supported_config = device
                .supported_output_configs()
                .map_err(|e| Error::Audio(e.to_string()))?
                .find(|c| supports_rate(c, 1))
                .or_else(|| {
                    // Fallback: try stereo
                    device
                        .supported_output_configs()
                        .ok()?
                        .find(|c| supports_rate(c, 2))
                })
                .ok_or_else(|| {
                    Error::DependencyUnavailable("no suitable output config found".to_string())
                })?;

            let config = supported_config
                .with_sample_rate(SampleRate(PLAYBACK_SAMPLE_RATE))
                .config();

            tracing::debug!(
                device = device.name().unwrap_or_default(),
                sample_rate = PLAYBACK_SAMPLE_RATE,
                channels = config.channels,
                "audio playback initialized"
            );

            Ok(Self { config })
        }

        /// Decode MP3 bytes and play them, blocking until done
        ///
        /// # Errors
        ///
        /// Returns error if decoding or playback fails
        pub fn play_mp3(&mut self, mp3_data: &[u8]) -> Result<()> {
            let samples = decode_mp3(mp3_data)?;
            self.play_samples_blocking(samples)
        }

        fn play_samples_blocking(&self, samples: Vec<f32>) -> Result<()> {
            if samples.is_empty() {
                return Ok(());
            }

            let device = cpal::default_host()
                .default_output_device()
                .ok_or_else(|| Error::Audio("no output device".to_string()))?;

            let channels = self.config.channels as usize;
            let sample_count = samples.len();
            let cursor = Arc::new(Mutex::new((samples, 0usize, false)));
            let callback_cursor = Arc::clone(&cursor);

            let stream = device
                .build_output_stream(
                    &self.config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        let mut guard =
                            callback_cursor.lock().unwrap_or_else(PoisonError::into_inner);
                        let (samples, pos, finished) = &mut *guard;

                        for frame in data.chunks_mut(channels) {
                            let sample = samples.get(*pos).copied().unwrap_or_else(|| {
                                *finished = true;
                                0.0
                            });
                            frame.fill(sample);
                            if *pos < samples.len() {
                                *pos += 1;
                            }
                        }
                    },
                    |err| {
                        tracing::error!(error = %err, "audio playback error");
                    },
                    None,
                )
                .map_err(|e| Error::Audio(e.to_string()))?;

            stream.play().map_err(|e| Error::Audio(e.to_string()))?;

            let duration_ms = (sample_count as u64 * 1000) / u64::from(PLAYBACK_SAMPLE_RATE);
            let deadline = Instant::now() + Duration::from_millis(duration_ms + 500);

            while !cursor.lock().unwrap_or_else(PoisonError::into_inner).2 {
                if Instant::now() > deadline {
                    break;
                }
                std::thread::sleep(Duration::from_millis(50));
            }

            // Let the device drain its last buffer
            std::thread::sleep(Duration::from_millis(100));

            drop(stream);
            tracing::debug!(samples = sample_count, "playback complete");

            Ok(())
        }
    }

    /// Decode MP3 bytes to mono f32 samples
    fn decode_mp3(mp3_data: &[u8]) -> Result<Vec<f32>> {
        let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
        let mut samples = Vec::new();

        loop {
            match decoder.next_frame() {
                Ok(frame) if frame.channels == 2 => {
                    samples.extend(frame.data.chunks(2).map(|chunk| {
                        let left = f32::from(chunk[0]) / 32768.0;
                        let right = f32::from(chunk.get(1).copied().unwrap_or(chunk[0])) / 32768.0;
                        f32::midpoint(left, right)
                    }));
                }
                Ok(frame) => {
                    samples.extend(frame.data.iter().map(|&s| f32::from(s) / 32768.0));
                }
                Err(minimp3::Error::Eof) => break,
                Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
            }
        }

        Ok(samples)
    }
}

#[cfg(not(feature = "audio-playback"))]
mod imp {
    use crate::{Error, Result};

    /// Placeholder for builds without audio output
    pub struct AudioPlayback {
        _private: (),
    }

    impl AudioPlayback {
        /// Always unavailable in this build
        ///
        /// # Errors
        ///
        /// Always returns [`Error::DependencyUnavailable`]
        pub fn new() -> Result<Self> {
            Err(Error::DependencyUnavailable(
                "built without the audio-playback feature".to_string(),
            ))
        }

        /// Never reached: no instance can be constructed
        ///
        /// # Errors
        ///
        /// Always returns [`Error::DependencyUnavailable`]
        #[allow(clippy::unused_self)]
        pub fn play_mp3(&mut self, _mp3_data: &[u8]) -> Result<()> {
            Err(Error::DependencyUnavailable(
                "built without the audio-playback feature".to_string(),
            ))
        }
    }

}
