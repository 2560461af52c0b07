// In-memory WAV capture sink
//
// Reference CaptureSink implementation: collects the mono f32 samples the
// host pushes while a session is open and encodes them as 16-bit PCM WAV
// on stop(). Real hosts wrap their platform recorder instead.

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::backend::{AudioClip, CaptureError, CaptureSink};

pub struct MemoryCaptureSink {
    sample_rate: u32,
    recording: bool,
    samples: Vec<f32>,
}

impl MemoryCaptureSink {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            recording: false,
            samples: Vec::new(),
        }
    }

    /// Feed captured samples; ignored while no session is open.
    pub fn push_samples(&mut self, samples: &[f32]) {
        if self.recording {
            self.samples.extend_from_slice(samples);
        }
    }
}

impl CaptureSink for MemoryCaptureSink {
    fn start(&mut self) -> Result<(), CaptureError> {
        self.samples.clear();
        self.recording = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<AudioClip, CaptureError> {
        self.recording = false;
        if self.samples.is_empty() {
            // The recorder maps a data-less capture to its own error.
            return Ok(AudioClip {
                mime_type: "audio/wav",
                data: Vec::new(),
            });
        }

        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec)
                .map_err(|e| CaptureError::Failed(e.to_string()))?;
            for &sample in &self.samples {
                let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
                writer
                    .write_sample(value)
                    .map_err(|e| CaptureError::Failed(e.to_string()))?;
            }
            writer
                .finalize()
                .map_err(|e| CaptureError::Failed(e.to_string()))?;
        }
        self.samples.clear();

        Ok(AudioClip {
            mime_type: "audio/wav",
            data: cursor.into_inner(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_outside_a_session_are_dropped() {
        let mut sink = MemoryCaptureSink::new(44_100);
        sink.push_samples(&[0.5, -0.5]);

        sink.start().unwrap();
        let clip = sink.stop().unwrap();
        assert!(clip.is_empty());
    }

    #[test]
    fn test_capture_encodes_wav() {
        let mut sink = MemoryCaptureSink::new(44_100);
        sink.start().unwrap();
        sink.push_samples(&[0.0, 0.25, -0.25, 1.0]);
        let clip = sink.stop().unwrap();

        assert_eq!(clip.mime_type, "audio/wav");
        assert!(!clip.is_empty());
        assert_eq!(&clip.data[..4], b"RIFF");
        assert_eq!(&clip.data[8..12], b"WAVE");
    }

    #[test]
    fn test_sessions_do_not_bleed_into_each_other() {
        let mut sink = MemoryCaptureSink::new(44_100);
        sink.start().unwrap();
        sink.push_samples(&[0.5; 64]);
        let first = sink.stop().unwrap();

        sink.start().unwrap();
        let second = sink.stop().unwrap();

        assert!(!first.is_empty());
        assert!(second.is_empty());
    }
}
