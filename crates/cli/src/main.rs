use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};

use facecam_core::capture::domain::frame_display::FrameDisplay;
use facecam_core::capture::domain::frame_source::{CaptureError, FrameSource};
use facecam_core::capture::infrastructure::camera_source::CameraSource;
use facecam_core::capture::infrastructure::headless_display::HeadlessDisplay;
use facecam_core::capture::infrastructure::highgui_display::HighguiDisplay;
use facecam_core::capture::infrastructure::image_file_source::ImageFileSource;
use facecam_core::detection::domain::face_eye_detector::{FaceEyeDetector, FaceInput};
use facecam_core::detection::infrastructure::detector_factory::create_detector;
use facecam_core::detection::infrastructure::model_resolver::{self, CascadeSource};
use facecam_core::overlay::infrastructure::opencv_overlay_renderer::OpencvOverlayRenderer;
use facecam_core::pipeline::live_detection_use_case::{EscapeAction, LiveDetectionUseCase};
use facecam_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use facecam_core::shared::config::AppConfig;
use facecam_core::shared::constants::{
    EYE_CASCADE_NAME, EYE_CASCADE_URL, FACE_CASCADE_NAME, FACE_CASCADE_URL, IMAGE_EXTENSIONS,
    WINDOW_TITLE,
};

/// Live face and eye detection on a webcam feed.
#[derive(Parser)]
#[command(name = "facecam")]
struct Cli {
    /// JSON config file (default: <config dir>/FaceCam/config.json if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Camera device index.
    #[arg(long)]
    device: Option<i32>,

    /// Face cascade XML file.
    #[arg(long)]
    face_cascade: Option<PathBuf>,

    /// Eye cascade XML file.
    #[arg(long)]
    eye_cascade: Option<PathBuf>,

    /// Directory searched for cascades by name before downloading.
    #[arg(long)]
    cascade_dir: Option<PathBuf>,

    /// Display width in pixels.
    #[arg(long)]
    width: Option<i32>,

    /// Display height in pixels.
    #[arg(long)]
    height: Option<i32>,

    /// Milliseconds to wait for a key after each frame.
    #[arg(long)]
    key_poll_ms: Option<i32>,

    /// Stop when Escape is pressed instead of logging a warning.
    #[arg(long)]
    quit_on_escape: bool,

    /// Image the face classifier runs on.
    #[arg(long, value_enum)]
    face_input: Option<FaceInputArg>,

    /// Replay a still image instead of opening the camera.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Number of times --image is replayed.
    #[arg(long, default_value = "1")]
    frames: usize,

    /// Do not open a window.
    #[arg(long)]
    headless: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FaceInputArg {
    Color,
    Equalized,
}

impl From<FaceInputArg> for FaceInput {
    fn from(arg: FaceInputArg) -> Self {
        match arg {
            FaceInputArg::Color => FaceInput::Color,
            FaceInputArg::Equalized => FaceInput::Equalized,
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        let code = exit_code(e.as_ref());
        if code == 0 {
            log::error!("{e}");
        } else {
            eprintln!("Error: {e}");
        }
        process::exit(code);
    }
}

/// No camera is a normal end of session (status 0); anything else is 1.
fn exit_code(e: &(dyn std::error::Error + 'static)) -> i32 {
    match e.downcast_ref::<CaptureError>() {
        Some(CaptureError::DeviceUnavailable { .. }) => 0,
        _ => 1,
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = merge_config(&cli, AppConfig::load_or_default(cli.config.as_deref())?);
    config.validate()?;

    let detector = build_detector(&config)?;
    let source = open_source(&cli, &config);
    let display: Box<dyn FrameDisplay> = if cli.headless {
        Box::new(HeadlessDisplay::new())
    } else {
        Box::new(HighguiDisplay::new(WINDOW_TITLE))
    };

    let mut use_case = LiveDetectionUseCase::new(
        source,
        detector,
        Box::new(OpencvOverlayRenderer::default()),
        display,
        Box::new(StdoutPipelineLogger::default()),
        config.loop_settings(),
    );
    let report = use_case.execute()?;
    log::info!(
        "Processed {} frames ({} faces, {} eyes)",
        report.frames_processed,
        report.faces_detected,
        report.eyes_detected
    );
    Ok(())
}

/// Command-line flags override the config file.
fn merge_config(cli: &Cli, mut config: AppConfig) -> AppConfig {
    if let Some(device) = cli.device {
        config.device_index = device;
    }
    if let Some(path) = &cli.face_cascade {
        config.face_cascade = Some(path.clone());
    }
    if let Some(path) = &cli.eye_cascade {
        config.eye_cascade = Some(path.clone());
    }
    if let Some(dir) = &cli.cascade_dir {
        config.cascade_dir = Some(dir.clone());
    }
    if let Some(width) = cli.width {
        config.display_width = width;
    }
    if let Some(height) = cli.height {
        config.display_height = height;
    }
    if let Some(ms) = cli.key_poll_ms {
        config.key_poll_ms = ms;
    }
    if cli.quit_on_escape {
        config.escape_action = EscapeAction::Quit;
    }
    if let Some(input) = cli.face_input {
        config.face_input = input.into();
    }
    config
}

fn build_detector(config: &AppConfig) -> Result<FaceEyeDetector, Box<dyn std::error::Error>> {
    let face_path = resolve_cascade(
        config.face_cascade.as_deref(),
        FACE_CASCADE_NAME,
        FACE_CASCADE_URL,
        config.cascade_dir.as_deref(),
    )?;
    let eye_path = resolve_cascade(
        config.eye_cascade.as_deref(),
        EYE_CASCADE_NAME,
        EYE_CASCADE_URL,
        config.cascade_dir.as_deref(),
    )?;
    Ok(create_detector(
        &face_path,
        &eye_path,
        &config.detector_settings(),
    )?)
}

fn resolve_cascade(
    explicit: Option<&Path>,
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    log::info!("Resolving cascade: {name}");
    let source = CascadeSource {
        explicit,
        name,
        url,
        bundled_dir,
    };
    let path = model_resolver::resolve(&source, Some(Box::new(download_progress)))?;
    Ok(path)
}

fn open_source(cli: &Cli, config: &AppConfig) -> Box<dyn FrameSource> {
    match &cli.image {
        Some(path) => Box::new(ImageFileSource::new(path, cli.frames)),
        None => Box::new(CameraSource::new(config.device_index)),
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.image.is_some() && cli.device.is_some() {
        return Err("--image and --device are mutually exclusive".into());
    }
    if cli.frames == 0 {
        return Err("--frames must be at least 1".into());
    }
    if let Some(image) = &cli.image {
        if !image.exists() {
            return Err(format!("Input file not found: {}", image.display()).into());
        }
        if !is_image(image) {
            return Err(format!(
                "Unsupported image format: {} (expected one of {})",
                image.display(),
                IMAGE_EXTENSIONS.join(", ")
            )
            .into());
        }
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading cascade... {pct}%");
    } else {
        eprint!("\rDownloading cascade... {downloaded} bytes");
    }
    if total > 0 && downloaded >= total {
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facecam_core::detection::infrastructure::cascade_classifier::ModelLoadError;
    use facecam_core::shared::config::ConfigError;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("facecam").chain(args.iter().copied()))
    }

    fn file_config() -> AppConfig {
        AppConfig {
            device_index: 2,
            display_width: 800,
            display_height: 600,
            key_poll_ms: 30,
            face_cascade: Some(PathBuf::from("/etc/facecam/face.xml")),
            face_input: FaceInput::Equalized,
            ..AppConfig::default()
        }
    }

    // --- Config layering ---

    #[test]
    fn test_flags_override_file_values() {
        let merged = merge_config(
            &cli(&["--device", "5", "--width", "1280", "--face-input", "color"]),
            file_config(),
        );
        assert_eq!(merged.device_index, 5);
        assert_eq!(merged.display_width, 1280);
        assert_eq!(merged.face_input, FaceInput::Color);
    }

    #[test]
    fn test_absent_flags_keep_file_values() {
        let merged = merge_config(&cli(&["--device", "5"]), file_config());
        assert_eq!(merged.display_height, 600);
        assert_eq!(merged.key_poll_ms, 30);
        assert_eq!(merged.face_cascade, Some(PathBuf::from("/etc/facecam/face.xml")));
        assert_eq!(merged.escape_action, EscapeAction::Warn);
    }

    #[test]
    fn test_no_flags_leave_config_unchanged() {
        assert_eq!(merge_config(&cli(&[]), file_config()), file_config());
    }

    #[test]
    fn test_quit_on_escape_selects_quit() {
        let merged = merge_config(&cli(&["--quit-on-escape"]), AppConfig::default());
        assert_eq!(merged.escape_action, EscapeAction::Quit);
        assert_eq!(merged.loop_settings().escape_action, EscapeAction::Quit);
    }

    #[test]
    fn test_cascade_flags_override_paths() {
        let merged = merge_config(
            &cli(&["--face-cascade", "a.xml", "--eye-cascade", "b.xml", "--cascade-dir", "d"]),
            file_config(),
        );
        assert_eq!(merged.face_cascade, Some(PathBuf::from("a.xml")));
        assert_eq!(merged.eye_cascade, Some(PathBuf::from("b.xml")));
        assert_eq!(merged.cascade_dir, Some(PathBuf::from("d")));
    }

    // --- Exit codes ---

    #[test]
    fn test_missing_camera_exits_zero() {
        let e: Box<dyn std::error::Error> = Box::new(CaptureError::DeviceUnavailable { index: 0 });
        assert_eq!(exit_code(e.as_ref()), 0);
    }

    #[test]
    fn test_other_errors_exit_one() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(ModelLoadError::NotFound(PathBuf::from("face.xml"))),
            Box::new(ConfigError::Invalid("display size must be positive".to_string())),
            Box::new(CaptureError::FrameCapture {
                frame_index: 3,
                reason: "device returned no frame".to_string(),
            }),
            "Input file not found".into(),
        ];
        for e in &errors {
            assert_eq!(exit_code(e.as_ref()), 1, "{e}");
        }
    }

    // --- Validation ---

    #[test]
    fn test_image_and_device_are_exclusive() {
        let err = validate(&cli(&["--image", "face.png", "--device", "1"])).unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn test_zero_frames_rejected() {
        let err = validate(&cli(&["--frames", "0"])).unwrap_err();
        assert!(err.to_string().contains("--frames"));
    }

    #[test]
    fn test_missing_image_rejected() {
        let err = validate(&cli(&["--image", "/nonexistent/face.png"])).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_camera_defaults_are_valid() {
        assert!(validate(&cli(&[])).is_ok());
    }
}
