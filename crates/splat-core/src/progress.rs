use serde::{Deserialize, Serialize};

/// The five user-visible stages of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Extract,
    Resize,
    Poses,
    Train,
    Collect,
}

impl PipelineStage {
    pub const COUNT: usize = 5;

    /// 1-based position used in `[n/5]` progress lines.
    #[must_use]
    pub const fn number(self) -> usize {
        match self {
            Self::Extract => 1,
            Self::Resize => 2,
            Self::Poses => 3,
            Self::Train => 4,
            Self::Collect => 5,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Extract => "Extracting frames",
            Self::Resize => "Resizing images",
            Self::Poses => "Estimating camera poses",
            Self::Train => "Training Gaussian splat",
            Self::Collect => "Collecting results",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    StageStarted { stage: PipelineStage, detail: String },
    StageSkipped { stage: PipelineStage, reason: String },
    StageFinished { stage: PipelineStage, detail: String },
    Note { message: String },
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

/// Plain stdout rendering in the `[n/5]` style.
#[derive(Debug, Default)]
pub struct StdoutProgressSink;

impl ProgressSink for StdoutProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StageStarted { stage, detail } => {
                println!("[{}/{}] {}... {detail}", stage.number(), PipelineStage::COUNT, stage.label());
            }
            ProgressEvent::StageSkipped { stage, reason } => {
                println!(
                    "[{}/{}] Skipping: {} ({reason})",
                    stage.number(),
                    PipelineStage::COUNT,
                    stage.label()
                );
            }
            ProgressEvent::StageFinished { stage, detail } => {
                println!("    {} done. {detail}", stage.label());
            }
            ProgressEvent::Note { message } => println!("    {message}"),
        }
    }
}

/// Sink that drops everything (used by tests).
#[derive(Debug, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn on_event(&self, _event: ProgressEvent) {}
}
