//! Frame transformation utilities.

use opencv::{
    core::{self, Mat},
    imgproc,
    prelude::*,
};

use super::types::Resolution;

/// Mirror a frame horizontally (flip left-right) for selfie mode.
pub fn mirror_horizontal(frame: &Mat) -> opencv::Result<Mat> {
    let mut mirrored = Mat::default();
    core::flip(frame, &mut mirrored, 1)?;
    Ok(mirrored)
}

/// Convert a BGR frame to a single-channel intensity image.
pub fn to_grayscale(frame: &Mat) -> opencv::Result<Mat> {
    let mut gray = Mat::default();
    imgproc::cvt_color_def(frame, &mut gray, imgproc::COLOR_BGR2GRAY)?;
    Ok(gray)
}

/// Size of a frame as a [`Resolution`].
#[allow(clippy::cast_sign_loss)]
pub fn frame_resolution(frame: &Mat) -> Resolution {
    Resolution {
        width: frame.cols().max(0) as u32,
        height: frame.rows().max(0) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, Vec3b, CV_8UC3};
    use opencv::prelude::*;

    fn blank(rows: i32, cols: i32) -> Mat {
        Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::all(0.0)).unwrap()
    }

    #[test]
    fn test_mirror_horizontal_2x1() {
        // Two pixels: A (1,2,3) then B (4,5,6)
        let mut frame = blank(1, 2);
        *frame.at_2d_mut::<Vec3b>(0, 0).unwrap() = Vec3b::from_array([1, 2, 3]);
        *frame.at_2d_mut::<Vec3b>(0, 1).unwrap() = Vec3b::from_array([4, 5, 6]);

        let mirrored = mirror_horizontal(&frame).unwrap();

        // After mirroring: B, A
        assert_eq!(*mirrored.at_2d::<Vec3b>(0, 0).unwrap(), Vec3b::from_array([4, 5, 6]));
        assert_eq!(*mirrored.at_2d::<Vec3b>(0, 1).unwrap(), Vec3b::from_array([1, 2, 3]));
    }

    #[test]
    fn test_mirror_keeps_rows_in_place() {
        let mut frame = blank(2, 3);
        *frame.at_2d_mut::<Vec3b>(1, 0).unwrap() = Vec3b::from_array([9, 9, 9]);

        let mirrored = mirror_horizontal(&frame).unwrap();

        assert_eq!(*mirrored.at_2d::<Vec3b>(1, 2).unwrap(), Vec3b::from_array([9, 9, 9]));
        assert_eq!(*mirrored.at_2d::<Vec3b>(0, 2).unwrap(), Vec3b::from_array([0, 0, 0]));
    }

    #[test]
    fn test_to_grayscale_single_channel() {
        let frame = blank(4, 6);
        let gray = to_grayscale(&frame).unwrap();
        assert_eq!(gray.channels(), 1);
        assert_eq!(gray.rows(), 4);
        assert_eq!(gray.cols(), 6);
    }

    #[test]
    fn test_frame_resolution() {
        let frame = blank(480, 640);
        assert_eq!(frame_resolution(&frame), Resolution::MEDIUM);
    }
}
