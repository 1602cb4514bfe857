//! Inbound job requests and terminal job results.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ErrorKind};
use crate::reference::{InputReference, OutputReference};

/// Wire field naming the output destination.
pub const OUTPUT_FIELD: &str = "output_s3_bucket";

/// Fields that must be present on every request, in the order they are checked.
pub const REQUIRED_FIELDS: &[&str] = &["audio_s3", "transcript_s3", "image_s3", OUTPUT_FIELD];

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Raw invocation body as sent by clients.
///
/// Every field is optional at this level so that a missing field can be
/// reported by name instead of failing JSON decoding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvocationRequest {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub audio_s3: Option<String>,
    #[serde(default)]
    pub transcript_s3: Option<String>,
    #[serde(default)]
    pub image_s3: Option<String>,
    #[serde(default)]
    pub output_s3_bucket: Option<String>,
}

/// Named input slot of a job, bound to one workflow parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSlot {
    Audio,
    Transcript,
    Image,
}

impl InputSlot {
    pub const ALL: [InputSlot; 3] = [InputSlot::Audio, InputSlot::Transcript, InputSlot::Image];

    /// Request field carrying this input.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Audio => "audio_s3",
            Self::Transcript => "transcript_s3",
            Self::Image => "image_s3",
        }
    }

    /// Workflow node input parameter that receives the resolved path.
    pub fn workflow_param(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Transcript => "text_file",
            Self::Image => "image",
        }
    }
}

/// A validated job request.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub job_id: String,
    /// Declared inputs in [`InputSlot::ALL`] order.
    pub inputs: Vec<(InputSlot, InputReference)>,
    pub output: OutputReference,
}

impl InvocationRequest {
    /// The caller-supplied job id, or a fresh UUID v4.
    pub fn assign_job_id(&self) -> String {
        self.job_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }

    /// Validate presence and format of every required field.
    ///
    /// Performs no I/O: a request that fails here has caused no side effect.
    pub fn validate(&self, job_id: String) -> Result<JobRequest, CoreError> {
        for field in REQUIRED_FIELDS {
            if self.field(field).is_none() {
                return Err(CoreError::Validation(format!(
                    "Missing required field: {field}"
                )));
            }
        }

        let mut inputs = Vec::with_capacity(InputSlot::ALL.len());
        for slot in InputSlot::ALL {
            let raw = self.field(slot.field_name()).unwrap_or_default();
            inputs.push((slot, InputReference::parse(raw)?));
        }

        let output = OutputReference::parse(self.field(OUTPUT_FIELD).unwrap_or_default())?;

        Ok(JobRequest {
            job_id,
            inputs,
            output,
        })
    }

    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "audio_s3" => &self.audio_s3,
            "transcript_s3" => &self.transcript_s3,
            "image_s3" => &self.image_s3,
            OUTPUT_FIELD => &self.output_s3_bucket,
            _ => return None,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Completed,
    Failed,
}

/// Media category of a produced artifact, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Images,
    Videos,
    Audio,
}

impl MediaKind {
    /// Scan order used when collecting outputs.
    pub const ALL: [MediaKind; 3] = [MediaKind::Images, MediaKind::Videos, MediaKind::Audio];

    /// Key of this category inside a node's output record.
    pub fn output_key(self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Videos => "videos",
            Self::Audio => "audio",
        }
    }
}

/// A published output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub filename: String,
    /// Presigned URL or local path, depending on the destination.
    pub url: String,
}

/// Terminal record of one job. Same shape for success and failure.
#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    pub job_id: Option<String>,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Artifact>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Unix epoch seconds.
    pub timestamp: f64,
    #[serde(skip)]
    pub error_kind: Option<ErrorKind>,
}

impl JobResult {
    pub fn completed(
        job_id: String,
        prompt_id: String,
        outputs: Vec<Artifact>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            job_id: Some(job_id),
            status: JobStatus::Completed,
            prompt_id: Some(prompt_id),
            outputs: Some(outputs),
            error: None,
            warnings,
            timestamp: epoch_seconds(),
            error_kind: None,
        }
    }

    pub fn failed(job_id: Option<String>, error: &CoreError) -> Self {
        Self {
            job_id,
            status: JobStatus::Failed,
            prompt_id: None,
            outputs: None,
            error: Some(error.to_string()),
            warnings: Vec::new(),
            timestamp: epoch_seconds(),
            error_kind: Some(error.kind()),
        }
    }

    pub fn with_prompt_id(mut self, prompt_id: Option<String>) -> Self {
        self.prompt_id = prompt_id;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// True when the job was rejected before any side effect.
    pub fn is_rejected(&self) -> bool {
        self.error_kind == Some(ErrorKind::Validation)
    }
}

/// Current time as fractional Unix epoch seconds.
pub fn epoch_seconds() -> f64 {
    let now = chrono::Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}
