use std::fmt;

#[cfg(test)]
use ndarray::ArrayView3;
use opencv::core::{Mat, Scalar, Size, StsBadArg, CV_8UC3};
use opencv::imgproc;
use opencv::prelude::*;

/// A single camera/image frame: an OpenCV matrix in BGR (or grayscale) order.
///
/// Conversion from other pixel layouts happens at I/O boundaries only;
/// the rest of the crate hands the matrix straight to OpenCV.
pub struct Frame {
    mat: Mat,
    index: usize,
}

impl Frame {
    pub fn new(mat: Mat, index: usize) -> Self {
        Self { mat, index }
    }

    /// Builds a BGR frame from tightly packed RGB bytes.
    pub fn from_rgb(data: &[u8], width: u32, height: u32, index: usize) -> opencv::Result<Self> {
        let expected = (width as usize) * (height as usize) * 3;
        if data.len() != expected {
            return Err(opencv::Error::new(
                StsBadArg,
                format!(
                    "data length {} does not match {width}x{height} RGB ({expected})",
                    data.len()
                ),
            ));
        }
        let mut mat = Mat::new_rows_cols_with_default(
            height as i32,
            width as i32,
            CV_8UC3,
            Scalar::all(0.0),
        )?;
        let bytes = mat.data_bytes_mut()?;
        for (dst, src) in bytes.chunks_exact_mut(3).zip(data.chunks_exact(3)) {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
        }
        Ok(Self::new(mat, index))
    }

    pub fn mat(&self) -> &Mat {
        &self.mat
    }

    pub fn mat_mut(&mut self) -> &mut Mat {
        &mut self.mat
    }

    pub fn width(&self) -> i32 {
        self.mat.cols()
    }

    pub fn height(&self) -> i32 {
        self.mat.rows()
    }

    pub fn channels(&self) -> i32 {
        self.mat.channels()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.mat.empty()
    }

    pub fn try_clone(&self) -> opencv::Result<Self> {
        Ok(Self::new(self.mat.try_clone()?, self.index))
    }

    /// Returns a copy scaled to exactly `width` x `height`.
    pub fn resized(&self, width: i32, height: i32) -> opencv::Result<Self> {
        let mut out = Mat::default();
        imgproc::resize(
            &self.mat,
            &mut out,
            Size::new(width, height),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )?;
        Ok(Self::new(out, self.index))
    }

    /// Pixel view shaped `(height, width, channels)`.
    #[cfg(test)]
    pub fn as_ndarray(&self) -> Result<ArrayView3<'_, u8>, Box<dyn std::error::Error>> {
        let shape = (
            self.height() as usize,
            self.width() as usize,
            self.channels() as usize,
        );
        Ok(ArrayView3::from_shape(shape, self.mat.data_bytes()?)?)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("channels", &self.channels())
            .field("index", &self.index)
            .finish()
    }
}
