pub mod camera_source;
pub mod headless_display;
pub mod highgui_display;
pub mod image_file_source;
