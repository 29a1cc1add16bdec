//! `flac | lame` pipeline with `metaflac` tag transfer.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Output, Stdio};
use std::time::Instant;
use tempfile::NamedTempFile;
use tokio::process::{Child, Command};
use tracing::debug;

use super::error::{ConverterError, Stage};
use super::traits::Converter;
use super::types::{ConversionJob, ConversionReport};
use crate::config::ToolsConfig;
use crate::encoding::EncodingOptions;
use crate::staging;
use crate::tags::{parse_vorbis_comments, Id3Tags};

/// Source tags, read up front because `lame` embeds them while encoding.
struct Tagged {
    tags: Id3Tags,
}

/// Decoder running with its PCM output not yet consumed.
struct Decoded {
    child: Child,
}

/// Tagged MP3 in a temp file beside the destination.
struct Encoded {
    audio: NamedTempFile,
}

/// Converter driving the `flac`, `lame` and `metaflac` command-line tools.
pub struct LameConverter {
    tools: ToolsConfig,
}

impl LameConverter {
    pub fn new(tools: ToolsConfig) -> Self {
        Self { tools }
    }

    pub fn with_defaults() -> Self {
        Self::new(ToolsConfig::default())
    }

    /// Lists the source's Vorbis comments with `metaflac`.
    async fn read_tags(&self, input: &Path) -> Result<Tagged, ConverterError> {
        let listing = Command::new(&self.tools.metaflac)
            .args(["--list", "--block-type=VORBIS_COMMENT"])
            .arg(input)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| spawn_error("metaflac", &self.tools.metaflac, e))?;
        if !listing.status.success() {
            return Err(output_error(Stage::ReadTags, &listing));
        }

        let comments = parse_vorbis_comments(&String::from_utf8_lossy(&listing.stdout));
        debug!("Read {} comments from {:?}", comments.len(), input);
        Ok(Tagged {
            tags: Id3Tags::from_comments(&comments),
        })
    }

    /// Starts `flac` writing raw PCM to its stdout.
    fn decode(&self, input: &Path) -> Result<Decoded, ConverterError> {
        let child = Command::new(&self.tools.flac)
            .args(decoder_args(input))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error("flac", &self.tools.flac, e))?;
        Ok(Decoded { child })
    }

    /// Feeds the decoder output to `lame` and waits for both processes.
    async fn encode(
        &self,
        mut decoded: Decoded,
        tagged: &Tagged,
        options: &EncodingOptions,
        dir: &Path,
    ) -> Result<Encoded, ConverterError> {
        let audio = staging::temp_file(dir, ".mp3.part")
            .map_err(|e| ConverterError::stage_error(Stage::Encode, e))?;

        let pcm: Stdio = decoded
            .child
            .stdout
            .take()
            .ok_or_else(|| {
                ConverterError::stage_error(Stage::Decode, "decoder stdout not captured")
            })?
            .try_into()
            .map_err(|e: io::Error| ConverterError::stage_error(Stage::Decode, e))?;
        let sink = audio
            .reopen()
            .map_err(|e| ConverterError::stage_error(Stage::Encode, e))?;

        let encoder = Command::new(&self.tools.lame)
            .args(encoder_args(options, &tagged.tags))
            .stdin(pcm)
            .stdout(Stdio::from(sink))
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error("lame", &self.tools.lame, e))?;

        let (decoder_out, encoder_out) =
            tokio::join!(decoded.child.wait_with_output(), encoder.wait_with_output());
        let decoder_out = decoder_out.map_err(|e| ConverterError::stage_error(Stage::Decode, e))?;
        let encoder_out = encoder_out.map_err(|e| ConverterError::stage_error(Stage::Encode, e))?;

        match failed_stage(&decoder_out.status, &encoder_out.status) {
            None => Ok(Encoded { audio }),
            Some(Stage::Decode) => Err(output_error(Stage::Decode, &decoder_out)),
            Some(stage) => Err(output_error(stage, &encoder_out)),
        }
    }

    /// Moves the finished file to its destination.
    fn store(encoded: Encoded, output: &Path, overwrite: bool) -> Result<u64, ConverterError> {
        let file = staging::persist(encoded.audio, output, overwrite)
            .map_err(|e| ConverterError::stage_error(Stage::Store, e))?;
        let size = file
            .metadata()
            .map_err(|e| ConverterError::stage_error(Stage::Store, e))?
            .len();
        Ok(size)
    }
}

#[async_trait]
impl Converter for LameConverter {
    fn name(&self) -> &str {
        "lame"
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        let tools = [
            ("flac", &self.tools.flac),
            ("metaflac", &self.tools.metaflac),
            ("lame", &self.tools.lame),
        ];
        for (tool, path) in tools {
            Command::new(path)
                .arg("--version")
                .stdin(Stdio::null())
                .output()
                .await
                .map_err(|e| spawn_error(tool, path, e))?;
        }
        Ok(())
    }

    async fn convert(&self, job: &ConversionJob) -> Result<ConversionReport, ConverterError> {
        let start = Instant::now();
        let dir = staging::parent_dir(&job.output_path);
        tokio::fs::create_dir_all(&dir).await?;

        let tagged = self.read_tags(job.input_path()).await?;
        let decoded = self.decode(job.input_path())?;
        let encoded = self.encode(decoded, &tagged, &job.options, &dir).await?;
        let output_size_bytes = Self::store(encoded, &job.output_path, job.options.overwrite())?;

        Ok(ConversionReport {
            input_path: job.input_path().to_path_buf(),
            output_path: job.output_path.clone(),
            output_size_bytes,
            tag_fields: tagged.tags.field_count(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

fn decoder_args(input: &Path) -> Vec<std::ffi::OsString> {
    vec![
        "--silent".into(),
        "--stdout".into(),
        "--decode".into(),
        input.as_os_str().to_os_string(),
    ]
}

fn encoder_args(options: &EncodingOptions, tags: &Id3Tags) -> Vec<String> {
    let mut args = options.encoder_args();
    args.extend(tags.encoder_args());
    args.extend(["--silent".to_string(), "-".to_string(), "-".to_string()]);
    args
}

/// Decides which stage to blame when the pipeline exits.
///
/// A decoder killed by a signal while the encoder failed was cut off by the
/// encoder closing the pipe, so the encoder is reported.
fn failed_stage(decoder: &ExitStatus, encoder: &ExitStatus) -> Option<Stage> {
    match (decoder.success(), encoder.success()) {
        (true, true) => None,
        (false, false) if decoder.code().is_none() => Some(Stage::Encode),
        (false, _) => Some(Stage::Decode),
        (true, false) => Some(Stage::Encode),
    }
}

fn output_error(stage: Stage, output: &Output) -> ConverterError {
    ConverterError::stage_failed(
        stage,
        output.status.code(),
        String::from_utf8_lossy(&output.stderr).trim(),
    )
}

fn spawn_error(tool: &str, path: &Path, e: io::Error) -> ConverterError {
    if e.kind() == io::ErrorKind::NotFound {
        ConverterError::ToolNotFound {
            tool: tool.to_string(),
            path: path.to_path_buf(),
        }
    } else {
        ConverterError::Io(e)
    }
}
