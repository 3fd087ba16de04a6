use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelCacheError {
    #[error("could not determine cache directory")]
    NoCacheDir,
    #[error("failed to create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("download failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("I/O error while saving {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("download of {url} ended after {received} of {expected} bytes")]
    Truncated {
        url: String,
        received: u64,
        expected: u64,
    },
}

/// Observable steps of a model download.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DownloadEvent {
    /// Bytes written so far; `total` is `None` without a Content-Length.
    Progress { downloaded: u64, total: Option<u64> },
    /// The download stopped, successfully or not. Always the last event.
    Finished,
}

pub type ProgressFn = Box<dyn Fn(DownloadEvent) + Send>;

/// Directory of downloaded model files, keyed by file name.
#[derive(Clone, Debug)]
pub struct ModelCache {
    dir: PathBuf,
}

impl ModelCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Per-user location:
    ///
    /// - macOS: `~/Library/Application Support/Transcriber/models/`
    /// - Linux: `$XDG_CACHE_HOME/Transcriber/models/` or `~/.cache/Transcriber/models/`
    /// - Windows: `%LOCALAPPDATA%/Transcriber/models/`
    pub fn user_default() -> Result<Self, ModelCacheError> {
        #[cfg(target_os = "macos")]
        let base = dirs::data_dir();
        #[cfg(not(target_os = "macos"))]
        let base = dirs::cache_dir();

        base.map(|d| Self::new(d.join("Transcriber").join("models")))
            .ok_or(ModelCacheError::NoCacheDir)
    }

    /// Path of `name` in the cache, downloading it from `url` on a miss.
    pub fn fetch(
        &self,
        name: &str,
        url: &str,
        progress: Option<ProgressFn>,
    ) -> Result<PathBuf, ModelCacheError> {
        let path = self.dir.join(name);
        if path.is_file() {
            log::debug!("Using cached model {}", path.display());
            return Ok(path);
        }

        fs::create_dir_all(&self.dir).map_err(|source| ModelCacheError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        log::info!("Downloading {url} to {}", path.display());
        let progress = progress.as_deref();
        let result = download(url, &self.dir, &path, progress);
        if let Some(cb) = progress {
            cb(DownloadEvent::Finished);
        }
        result?;
        Ok(path)
    }
}

/// Streams `url` into a temp file inside `dir`, renamed onto `dest` once
/// complete. The temp file is removed when any step fails.
fn download(
    url: &str,
    dir: &Path,
    dest: &Path,
    progress: Option<&(dyn Fn(DownloadEvent) + Send)>,
) -> Result<(), ModelCacheError> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|source| ModelCacheError::Request {
            url: url.to_string(),
            source,
        })?;
    let total = response.content_length();

    let io_error = |source: io::Error| ModelCacheError::Io {
        path: dest.to_path_buf(),
        source,
    };

    let mut staged = NamedTempFile::new_in(dir).map_err(io_error)?;
    let received = {
        let counter = ProgressWriter::new(staged.as_file_mut(), total, progress);
        // Batch socket reads so the callback fires per megabyte, not per 8KB.
        let mut writer = BufWriter::with_capacity(1024 * 1024, counter);
        io::copy(&mut response, &mut writer).map_err(io_error)?;
        writer.flush().map_err(io_error)?;
        writer.get_ref().written
    };

    if let Some(expected) = total {
        if received != expected {
            return Err(ModelCacheError::Truncated {
                url: url.to_string(),
                received,
                expected,
            });
        }
    }

    staged.persist(dest).map_err(|e| io_error(e.error))?;
    Ok(())
}

/// Counts bytes passing through and reports them as `DownloadEvent::Progress`.
struct ProgressWriter<'a, W> {
    inner: W,
    written: u64,
    total: Option<u64>,
    progress: Option<&'a (dyn Fn(DownloadEvent) + Send)>,
}

impl<'a, W: Write> ProgressWriter<'a, W> {
    fn new(
        inner: W,
        total: Option<u64>,
        progress: Option<&'a (dyn Fn(DownloadEvent) + Send)>,
    ) -> Self {
        Self {
            inner,
            written: 0,
            total,
            progress,
        }
    }
}

impl<W: Write> Write for ProgressWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        if let Some(cb) = self.progress {
            cb(DownloadEvent::Progress {
                downloaded: self.written,
                total: self.total,
            });
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
