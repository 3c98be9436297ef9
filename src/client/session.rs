//! Upload/run session: the state behind the upload, run and download controls.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::client::api::RelayApi;
use crate::error::{Result, GENERIC_FAILURE_MESSAGE};
use crate::image::{decode_data_url, Upload};

/// File name the result is saved under.
pub const DOWNLOAD_FILE_NAME: &str = "cowified-pfp.png";

const READY_STATUS: &str = "Ready to cowify.";
const NO_FILE_STATUS: &str = "Upload an image first.";
const RUNNING_STATUS: &str = "Cowifying...";
const DONE_STATUS: &str = "Cowified!";

/// Where the session is in the select/run cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing selected yet.
    #[default]
    Idle,
    /// A file is selected and can be run.
    Ready,
    /// A relay request is in flight.
    Running,
    /// The last run produced an image.
    Done,
    /// The last run failed.
    Error,
}

/// Status line shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

impl Status {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// A transient reference to a local file used as an image source, like a
/// browser object URL. Must be released through the store that created it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewUrl(String);

impl PreviewUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Creates and releases preview references.
pub trait PreviewStore {
    fn create(&mut self, upload: &Upload) -> PreviewUrl;
    fn release(&mut self, url: &PreviewUrl);
}

/// In-memory [`PreviewStore`] that tracks which references are still live.
#[derive(Debug, Default)]
pub struct MemoryPreviewStore {
    next_id: u64,
    live: HashSet<PreviewUrl>,
}

impl MemoryPreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of references created and not yet released.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, url: &PreviewUrl) -> bool {
        self.live.contains(url)
    }
}

impl PreviewStore for MemoryPreviewStore {
    fn create(&mut self, upload: &Upload) -> PreviewUrl {
        self.next_id += 1;
        let name = upload.file_name.as_deref().unwrap_or("upload");
        let url = PreviewUrl(format!("blob:cowify/{}/{name}", self.next_id));
        self.live.insert(url.clone());
        url
    }

    fn release(&mut self, url: &PreviewUrl) {
        self.live.remove(url);
    }
}

/// Receives the finished image when the user downloads it.
pub trait DownloadSink {
    /// Saves the image behind `data_url` under `file_name`.
    fn save(&mut self, file_name: &str, data_url: &str) -> Result<()>;
}

/// [`DownloadSink`] that decodes the data URL and writes it into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    last_saved: Option<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last_saved: None,
        }
    }

    /// Path of the most recently written file.
    pub fn last_saved(&self) -> Option<&Path> {
        self.last_saved.as_deref()
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, file_name: &str, data_url: &str) -> Result<()> {
        let (_, data) = decode_data_url(data_url)?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, &data)?;

        tracing::debug!(path = %path.display(), bytes = data.len(), "saved cowified image");
        self.last_saved = Some(path);
        Ok(())
    }
}

/// State of one user's upload/run/download flow.
///
/// Only one run is in flight at a time: while busy, [`begin_run`] refuses and
/// [`select_file`] ignores new selections, like a disabled upload control.
///
/// [`begin_run`]: UploadSession::begin_run
/// [`select_file`]: UploadSession::select_file
#[derive(Debug)]
pub struct UploadSession<S: PreviewStore = MemoryPreviewStore> {
    store: S,
    selected: Option<Upload>,
    input_preview: Option<PreviewUrl>,
    output: Option<String>,
    displayed: Option<String>,
    status: Status,
    phase: Phase,
    busy: bool,
    loading: bool,
    download_enabled: bool,
}

impl Default for UploadSession<MemoryPreviewStore> {
    fn default() -> Self {
        Self::new(MemoryPreviewStore::new())
    }
}

impl<S: PreviewStore> UploadSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            selected: None,
            input_preview: None,
            output: None,
            displayed: None,
            status: Status::default(),
            phase: Phase::Idle,
            busy: false,
            loading: false,
            download_enabled: false,
        }
    }

    /// Handles a file selection. `None` (selection cancelled) changes nothing,
    /// and neither does a selection made while a run is in flight.
    pub fn select_file(&mut self, upload: Option<Upload>) {
        if self.busy {
            return;
        }
        let Some(upload) = upload else {
            return;
        };

        self.release_input_preview();
        let preview = self.store.create(&upload);
        self.displayed = Some(preview.as_str().to_string());
        self.input_preview = Some(preview);
        self.selected = Some(upload);

        self.output = None;
        self.download_enabled = false;
        self.status = Status::info(READY_STATUS);
        self.phase = Phase::Ready;
    }

    /// Starts a run, returning the upload to send.
    ///
    /// Returns `None` without side effects while a run is in flight, and
    /// `None` with an error status when nothing is selected.
    pub fn begin_run(&mut self) -> Option<Upload> {
        if self.busy {
            return None;
        }
        let Some(upload) = self.selected.clone() else {
            self.status = Status::error(NO_FILE_STATUS);
            return None;
        };

        self.busy = true;
        self.loading = true;
        self.status = Status::info(RUNNING_STATUS);
        self.phase = Phase::Running;
        Some(upload)
    }

    /// Completes a run started with [`begin_run`](Self::begin_run).
    pub fn finish_run(&mut self, result: Result<String>) {
        match result {
            Ok(image) => {
                self.displayed = Some(image.clone());
                self.output = Some(image);
                self.release_input_preview();
                self.download_enabled = true;
                self.status = Status::info(DONE_STATUS);
                self.phase = Phase::Done;
            }
            Err(err) => {
                let message = err.to_string();
                let message = if message.trim().is_empty() {
                    GENERIC_FAILURE_MESSAGE.to_string()
                } else {
                    message
                };
                tracing::debug!(error = %message, "cowify run failed");
                self.status = Status::error(message);
                self.phase = Phase::Error;
            }
        }

        self.busy = false;
        self.loading = false;
    }

    /// Runs the selected upload through `api`. Returns true on success.
    pub async fn run(&mut self, api: &dyn RelayApi) -> bool {
        let Some(upload) = self.begin_run() else {
            return false;
        };
        let result = api.cowify(&upload).await;
        self.finish_run(result);
        self.phase == Phase::Done
    }

    /// Hands the result to `sink` as [`DOWNLOAD_FILE_NAME`].
    ///
    /// Returns `Ok(false)` when there is no result yet.
    pub fn download(&self, sink: &mut dyn DownloadSink) -> Result<bool> {
        let Some(output) = &self.output else {
            return Ok(false);
        };
        sink.save(DOWNLOAD_FILE_NAME, output)?;
        Ok(true)
    }

    fn release_input_preview(&mut self) {
        if let Some(preview) = self.input_preview.take() {
            self.store.release(&preview);
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn selected_file(&self) -> Option<&Upload> {
        self.selected.as_ref()
    }

    /// Source of the image currently shown, preview or result.
    pub fn displayed_image(&self) -> Option<&str> {
        self.displayed.as_deref()
    }

    /// The placeholder shows until the first image is displayed.
    pub fn shows_placeholder(&self) -> bool {
        self.displayed.is_none()
    }

    pub fn input_preview(&self) -> Option<&PreviewUrl> {
        self.input_preview.as_ref()
    }

    /// The result data URL, if the last run succeeded.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// True while a run is in flight; run and upload controls are disabled.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn can_download(&self) -> bool {
        self.download_enabled
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
