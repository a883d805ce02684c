//! Speech extraction stage.
//!
//! Audio is pulled out of the video, streamed through the recognizer in
//! fixed-size chunks, and turned into a transcript plus a subtitle track.
//! Every failure is contained here and reported as a sentinel transcript.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use vlens_media::{
    copy_file, file_len, AudioTranscoder, RecognizedSegment, SpeechRecognizer, WavChunkReader,
};
use vlens_models::sentinel::{NO_SPEECH, SPEECH_ERROR};
use vlens_models::TranscriptFragment;

use crate::error::{PipelineError, PipelineResult};
use crate::layout::DebugLayout;
use crate::subtitles::{persist_timings, write_srt, write_transcript};

/// Extraction attempts before giving up on an empty audio file.
const EXTRACTION_ATTEMPTS: u32 = 2;

/// What the speech stage hands to the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOutcome {
    pub transcript: String,
    pub audio_path: Option<PathBuf>,
    pub srt_path: Option<PathBuf>,
}

impl SpeechOutcome {
    fn no_speech(audio_path: Option<PathBuf>) -> Self {
        Self {
            transcript: NO_SPEECH.to_string(),
            audio_path,
            srt_path: None,
        }
    }

    fn error() -> Self {
        Self {
            transcript: SPEECH_ERROR.to_string(),
            audio_path: None,
            srt_path: None,
        }
    }
}

/// Accumulates recognizer output across chunks.
#[derive(Debug, Default)]
struct Recognition {
    texts: Vec<String>,
    fragments: Vec<TranscriptFragment>,
}

impl Recognition {
    fn push(&mut self, segment: RecognizedSegment) {
        let text = segment.text.trim();
        if !text.is_empty() {
            self.texts.push(text.to_string());
        }
        self.fragments.extend(segment.words);
    }

    /// Segment texts joined by spaces, or the words when no text came back.
    fn transcript(&self) -> String {
        if self.texts.is_empty() {
            let words: Vec<&str> = self.fragments.iter().map(|f| f.text.as_str()).collect();
            return words.join(" ");
        }
        self.texts.join(" ")
    }
}

/// Speech-to-transcript stage.
pub struct SpeechStage {
    transcoder: Arc<dyn AudioTranscoder>,
    recognizer: Arc<dyn SpeechRecognizer>,
    layout: DebugLayout,
    chunk_frames: usize,
}

impl SpeechStage {
    pub fn new(
        transcoder: Arc<dyn AudioTranscoder>,
        recognizer: Arc<dyn SpeechRecognizer>,
        layout: DebugLayout,
        chunk_frames: usize,
    ) -> Self {
        Self {
            transcoder,
            recognizer,
            layout,
            chunk_frames: chunk_frames.max(1),
        }
    }

    /// Run the stage. Never fails; errors become sentinel transcripts.
    pub async fn extract(&self, video: &Path) -> SpeechOutcome {
        match self.try_extract(video).await {
            Ok(outcome) => outcome,
            Err(PipelineError::AudioExtractionFailed(msg)) => {
                warn!("Audio extraction failed: {}", msg);
                SpeechOutcome::no_speech(None)
            }
            Err(e) => {
                warn!(error = %e, "Error in speech extraction");
                SpeechOutcome::error()
            }
        }
    }

    async fn try_extract(&self, video: &Path) -> PipelineResult<SpeechOutcome> {
        self.recognizer
            .ensure_ready()
            .await
            .map_err(|e| PipelineError::recognizer_unavailable(e.to_string()))?;

        let audio_path = self.extract_audio(video).await?;

        let mut reader = WavChunkReader::open(&audio_path, self.chunk_frames)?;
        if reader.total_frames() == 0 {
            warn!(path = %audio_path.display(), "Extracted audio contains no frames");
            return Ok(SpeechOutcome::no_speech(Some(audio_path)));
        }

        let mut session = self.recognizer.start(reader.sample_rate()).await?;
        let mut recognition = Recognition::default();
        let mut chunks = 0usize;

        while let Some(chunk) = reader.next_chunk()? {
            chunks += 1;
            if let Some(segment) = session.accept_chunk(&chunk).await? {
                recognition.push(segment);
            }
        }
        if let Some(segment) = session.finish().await? {
            recognition.push(segment);
        }

        info!(
            recognizer = self.recognizer.name(),
            chunks,
            words = recognition.fragments.len(),
            "Speech recognition complete"
        );

        let transcript = recognition.transcript();
        if recognition.fragments.is_empty() {
            write_transcript(&self.layout.transcript_text(), NO_SPEECH).await?;
            return Ok(SpeechOutcome::no_speech(Some(audio_path)));
        }

        write_transcript(&self.layout.transcript_text(), &transcript).await?;
        persist_timings(&self.layout.transcript_json(), &recognition.fragments).await;

        let srt_path = self.layout.subtitles();
        let srt_path = match write_srt(&srt_path, &recognition.fragments).await {
            Ok(_) => Some(srt_path),
            Err(e) => {
                warn!(path = %srt_path.display(), error = %e, "Error writing SRT file");
                None
            }
        };

        if let Err(e) = copy_file(&audio_path, self.layout.final_audio()).await {
            warn!(error = %e, "Failed to copy extracted audio to output");
        }

        Ok(SpeechOutcome {
            transcript,
            audio_path: Some(audio_path),
            srt_path,
        })
    }

    /// Extract audio to the debug location, retrying once on empty output.
    async fn extract_audio(&self, video: &Path) -> PipelineResult<PathBuf> {
        let output = self.layout.extracted_audio();

        for attempt in 1..=EXTRACTION_ATTEMPTS {
            // stale output from an earlier run must not count as success
            if let Err(e) = tokio::fs::remove_file(&output).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    return Err(e.into());
                }
            }

            if let Err(e) = self.transcoder.extract_audio(video, &output).await {
                warn!(attempt, transcoder = self.transcoder.name(), error = %e, "Audio transcoder failed");
            }

            if file_len(&output).await > 0 {
                info!(path = %output.display(), attempt, "Audio extracted");
                return Ok(output);
            }

            if attempt < EXTRACTION_ATTEMPTS {
                warn!("Extracted audio is empty, retrying extraction");
            }
        }

        Err(PipelineError::audio_extraction_failed(format!(
            "no audio written to {} after {} attempts",
            output.display(),
            EXTRACTION_ATTEMPTS
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognition_joins_segment_texts() {
        let mut recognition = Recognition::default();
        recognition.push(RecognizedSegment {
            text: "hi there".to_string(),
            words: vec![
                TranscriptFragment::new("hi", 0.0, 1.0),
                TranscriptFragment::new("there", 1.0, 2.0),
            ],
        });
        recognition.push(RecognizedSegment {
            text: "  ".to_string(),
            words: vec![],
        });
        recognition.push(RecognizedSegment {
            text: "world".to_string(),
            words: vec![TranscriptFragment::open_ended("world", 2.0)],
        });

        assert_eq!(recognition.transcript(), "hi there world");
        assert_eq!(recognition.fragments.len(), 3);
    }

    #[test]
    fn test_recognition_falls_back_to_words() {
        let mut recognition = Recognition::default();
        recognition.push(RecognizedSegment {
            text: String::new(),
            words: vec![
                TranscriptFragment::new("good", 0.0, 0.5),
                TranscriptFragment::new("morning", 0.5, 1.0),
            ],
        });
        assert_eq!(recognition.transcript(), "good morning");
    }

    #[test]
    fn test_sentinel_outcomes() {
        let none = SpeechOutcome::no_speech(Some(PathBuf::from("a.wav")));
        assert_eq!(none.transcript, "No speech detected.");
        assert!(none.srt_path.is_none());

        let error = SpeechOutcome::error();
        assert_eq!(error.transcript, "Error processing speech.");
        assert!(error.audio_path.is_none());
    }
}
