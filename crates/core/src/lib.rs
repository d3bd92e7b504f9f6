pub mod capture {
    pub mod domain {
        pub mod frame_display;
        pub mod frame_source;
    }
    pub mod infrastructure;
}

pub mod detection {
    pub mod domain {
        pub mod face_eye_detector;
        pub mod object_classifier;
    }
    pub mod infrastructure;
}

pub mod overlay {
    pub mod domain {
        pub mod eye_marker;
        pub mod overlay_renderer;
    }
    pub mod infrastructure {
        pub mod opencv_overlay_renderer;
    }
}

pub mod pipeline {
    pub mod live_detection_use_case;
    pub mod pipeline_logger;
}

pub mod shared {
    pub mod config;
    pub mod constants;
    pub mod frame;
    pub mod region;
}
