//! Pipeline orchestration.

use std::path::Path;
use std::sync::Arc;

use tracing::Instrument;
use vlens_media::{
    AudioTranscoder, EmotionClassifier, FfmpegAudioTranscoder, FfmpegFrameDecoder, FrameDecoder,
    FrameOverlay, HistogramSceneDetector, ObjectDetector, SceneDetector, SpeechRecognizer,
    Summarizer,
};
use vlens_ml_client::MlClient;
use vlens_models::{AnalysisOutcome, AnalysisResult, ErrorReport, SamplingPolicy};

use crate::aggregate::aggregate;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::frames::FrameAnalyzer;
use crate::layout::DebugLayout;
use crate::logging::{RunLogger, Stage};
use crate::scenes;
use crate::speech::SpeechStage;
use crate::summarize::{summarize_transcript, LsaSummarizer};

/// The capability providers a run is wired to.
#[derive(Clone)]
pub struct Providers {
    pub frame_decoder: Arc<dyn FrameDecoder>,
    pub audio_transcoder: Arc<dyn AudioTranscoder>,
    pub speech_recognizer: Arc<dyn SpeechRecognizer>,
    pub object_detector: Arc<dyn ObjectDetector>,
    pub emotion_classifier: Arc<dyn EmotionClassifier>,
    pub scene_detector: Arc<dyn SceneDetector>,
    pub summarizer: Arc<dyn Summarizer>,
}

impl Providers {
    /// FFmpeg decoding and transcoding, native scene detection and
    /// summarization, and the inference sidecar for the trained models.
    pub fn production(config: &PipelineConfig, ml: MlClient) -> Self {
        let ml = Arc::new(ml);
        Self {
            frame_decoder: Arc::new(FfmpegFrameDecoder::new()),
            audio_transcoder: Arc::new(FfmpegAudioTranscoder::new(config.ffmpeg_timeout_secs)),
            speech_recognizer: ml.clone(),
            object_detector: ml.clone(),
            emotion_classifier: ml,
            scene_detector: Arc::new(HistogramSceneDetector::new(config.scene_config())),
            summarizer: Arc::new(LsaSummarizer::default()),
        }
    }
}

/// Runs the whole analysis for one video at a time.
pub struct VideoAnalyzer {
    config: PipelineConfig,
    layout: DebugLayout,
    providers: Providers,
}

impl VideoAnalyzer {
    pub fn new(config: PipelineConfig, providers: Providers) -> Self {
        let layout = config.layout();
        Self {
            config,
            layout,
            providers,
        }
    }

    pub fn layout(&self) -> &DebugLayout {
        &self.layout
    }

    /// Analyze a video, turning fatal errors into an error report.
    pub async fn run(&self, video: &Path) -> AnalysisOutcome {
        let logger = RunLogger::new(video);
        let span = logger.span();

        match self.analyze_with_logger(video, &logger).instrument(span.clone()).await {
            Ok(result) => AnalysisOutcome::Completed(result),
            Err(e) => {
                span.in_scope(|| logger.failed(&e));
                AnalysisOutcome::Failed(ErrorReport::new(e.report_message()))
            }
        }
    }

    /// Analyze a video.
    ///
    /// Fails only with `NotFound` or `Unreadable`, and only before any stage
    /// runs. Everything later degrades to sentinel values.
    pub async fn analyze(&self, video: &Path) -> PipelineResult<AnalysisResult> {
        let logger = RunLogger::new(video);
        self.analyze_with_logger(video, &logger)
            .instrument(logger.span())
            .await
    }

    async fn analyze_with_logger(
        &self,
        video: &Path,
        logger: &RunLogger,
    ) -> PipelineResult<AnalysisResult> {
        logger.started();

        if !video.exists() {
            return Err(PipelineError::NotFound(video.to_path_buf()));
        }

        let timer = logger.stage(Stage::Open);
        let mut source = self.providers.frame_decoder.open(video).await.map_err(|e| {
            if e.is_not_found() {
                PipelineError::NotFound(video.to_path_buf())
            } else {
                PipelineError::unreadable(e.to_string())
            }
        })?;
        let info = source.info().clone();
        logger.video_opened(&info);
        timer.finish();

        self.layout.prepare().await?;

        let timer = logger.stage(Stage::Speech);
        let speech = SpeechStage::new(
            self.providers.audio_transcoder.clone(),
            self.providers.speech_recognizer.clone(),
            self.layout.clone(),
            self.config.audio_chunk_frames,
        )
        .extract(video)
        .await;
        logger.speech_extracted(&speech);
        timer.finish();

        let timer = logger.stage(Stage::Scenes);
        let scene_changes = scenes::segment(self.providers.scene_detector.as_ref(), video).await;
        logger.scenes_segmented(&scene_changes);
        timer.finish();

        let timer = logger.stage(Stage::Frames);
        let frame_analyzer = FrameAnalyzer::new(
            self.providers.object_detector.clone(),
            self.providers.emotion_classifier.clone(),
            FrameOverlay::from_font_file(&self.config.overlay_font),
            self.layout.clone(),
        );
        let policy = SamplingPolicy::from_frame_rate(info.frame_rate);
        let (frame_analysis, frame_stats) =
            frame_analyzer.annotate_all(source.as_mut(), policy).await;
        drop(source);
        timer.finish();

        let timer = logger.stage(Stage::Summary);
        let summary = summarize_transcript(
            self.providers.summarizer.as_ref(),
            &speech.transcript,
            self.config.summary_sentences,
        );
        timer.finish();

        let result = aggregate(
            speech.transcript,
            speech.audio_path,
            speech.srt_path,
            scene_changes,
            frame_analysis,
            summary,
        );

        logger.completed(&result, &frame_stats);
        Ok(result)
    }
}
