use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write cascade to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("configured cascade does not exist: {0}")]
    MissingExplicit(PathBuf),
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Where a cascade file should come from.
pub struct CascadeSource<'a> {
    /// Path set in configuration; wins over everything else and is never
    /// replaced by a download.
    pub explicit: Option<&'a Path>,
    pub name: &'a str,
    pub url: &'a str,
    /// Directory searched before downloading (e.g. an OpenCV install's
    /// `haarcascades` folder).
    pub bundled_dir: Option<&'a Path>,
}

/// Resolves a cascade file using the platform cache directory.
pub fn resolve(
    source: &CascadeSource<'_>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    if let Some(path) = source.explicit {
        return check_explicit(path);
    }
    resolve_in(&model_cache_dir()?, source, progress)
}

/// Resolution order:
/// 1. Explicit path (must exist)
/// 2. `cache_dir`
/// 3. Bundled directory
/// 4. Download from URL into `cache_dir`
pub fn resolve_in(
    cache_dir: &Path,
    source: &CascadeSource<'_>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    if let Some(path) = source.explicit {
        return check_explicit(path);
    }

    let cached_path = cache_dir.join(source.name);
    if cached_path.is_file() {
        return Ok(cached_path);
    }

    if let Some(dir) = source.bundled_dir {
        let bundled_path = dir.join(source.name);
        if bundled_path.is_file() {
            return Ok(bundled_path);
        }
    }

    log::info!("Downloading {} from {}", source.name, source.url);
    fs::create_dir_all(cache_dir).map_err(ModelResolveError::CacheDir)?;
    download(source.url, &cached_path, progress)?;
    Ok(cached_path)
}

fn check_explicit(path: &Path) -> Result<PathBuf, ModelResolveError> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(ModelResolveError::MissingExplicit(path.to_path_buf()))
    }
}

/// Platform-specific cascade cache directory.
///
/// - macOS: `~/Library/Application Support/FaceCam/cascades/`
/// - Linux: `$XDG_CACHE_HOME/FaceCam/cascades/` or `~/.cache/FaceCam/cascades/`
/// - Windows: `%LOCALAPPDATA%/FaceCam/cascades/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("FaceCam").join("cascades"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("FaceCam").join("cascades"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let temp_path = dest.with_extension("part");

    let result = download_inner(url, dest, &temp_path, progress);

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn download_inner(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ModelResolveError> {
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| ModelResolveError::Write { path, source }
    };

    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;
    let mut file = fs::File::create(temp_path).map_err(write_err(temp_path))?;

    // Cascades are small (~1MB) so a 64KB buffer keeps progress granular.
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = response.read(&mut buf).map_err(write_err(temp_path))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(write_err(temp_path))?;
        downloaded += n as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }

    file.flush().map_err(write_err(temp_path))?;
    drop(file);

    fs::rename(temp_path, dest).map_err(write_err(dest))?;
    Ok(())
}
