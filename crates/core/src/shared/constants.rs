pub const FACE_CASCADE_NAME: &str = "haarcascade_frontalface_alt.xml";
pub const FACE_CASCADE_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/4.x/data/haarcascades/haarcascade_frontalface_alt.xml";

pub const EYE_CASCADE_NAME: &str = "haarcascade_eye_tree_eyeglasses.xml";
pub const EYE_CASCADE_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/4.x/data/haarcascades/haarcascade_eye_tree_eyeglasses.xml";

pub const WINDOW_TITLE: &str = "Face Detection";

pub const DEFAULT_DEVICE_INDEX: i32 = 0;

/// Size every frame is resized to before it is shown.
pub const DEFAULT_DISPLAY_WIDTH: i32 = 2050;
pub const DEFAULT_DISPLAY_HEIGHT: i32 = 1500;

pub const DEFAULT_KEY_POLL_MS: i32 = 10;
pub const ESCAPE_KEY: i32 = 27;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
