//! Detection overlays drawn onto preview and saved frames.
//!
//! Overlays are planned first ([`detection_overlays`], [`status_overlay`]) and
//! then rendered ([`draw_overlays`]), so what gets drawn can be checked
//! without pixels.

use opencv::{
    core::{Mat, Point, Rect, Scalar},
    imgproc,
};

/// Text placed above every detected region.
pub const DETECTION_LABEL: &str = "Cat Detected!";

/// Anchor of the running detection count.
pub const STATUS_ORIGIN: (i32, i32) = (10, 30);

/// Label baseline offset above the box's top edge.
const LABEL_OFFSET: i32 = 10;

const THICKNESS: i32 = 2;

/// A single thing to draw on a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Bounding box around a detection
    Box(Rect),
    /// Text label anchored just above a detection
    Label { text: String, origin: (i32, i32) },
    /// Running count of detections in the current frame
    Status { text: String, origin: (i32, i32) },
}

/// Status line text for a detection count.
pub fn status_text(count: usize) -> String {
    format!("Cats detected: {}", count)
}

/// A box and a label per detection.
pub fn detection_overlays(detections: &[Rect]) -> Vec<Overlay> {
    let mut overlays = Vec::with_capacity(detections.len() * 2);
    for rect in detections {
        overlays.push(Overlay::Box(*rect));
        overlays.push(Overlay::Label {
            text: DETECTION_LABEL.to_string(),
            origin: (rect.x, rect.y - LABEL_OFFSET),
        });
    }
    overlays
}

/// Status line for `count` detections.
pub fn status_overlay(count: usize) -> Overlay {
    Overlay::Status {
        text: status_text(count),
        origin: STATUS_ORIGIN,
    }
}

/// Render planned overlays onto `frame` in place.
pub fn draw_overlays(frame: &mut Mat, overlays: &[Overlay]) -> opencv::Result<()> {
    let green = Scalar::new(0.0, 255.0, 0.0, 0.0);
    let white = Scalar::new(255.0, 255.0, 255.0, 0.0);

    for overlay in overlays {
        match overlay {
            Overlay::Box(rect) => {
                imgproc::rectangle(frame, *rect, green, THICKNESS, imgproc::LINE_8, 0)?;
            }
            Overlay::Label { text, origin } => {
                imgproc::put_text(
                    frame,
                    text,
                    Point::new(origin.0, origin.1),
                    imgproc::FONT_HERSHEY_SIMPLEX,
                    0.7,
                    green,
                    THICKNESS,
                    imgproc::LINE_8,
                    false,
                )?;
            }
            Overlay::Status { text, origin } => {
                imgproc::put_text(
                    frame,
                    text,
                    Point::new(origin.0, origin.1),
                    imgproc::FONT_HERSHEY_SIMPLEX,
                    1.0,
                    white,
                    THICKNESS,
                    imgproc::LINE_8,
                    false,
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Vec3b, CV_8UC3};
    use opencv::prelude::*;

    fn count_boxes(overlays: &[Overlay]) -> usize {
        overlays.iter().filter(|o| matches!(o, Overlay::Box(_))).count()
    }

    fn count_labels(overlays: &[Overlay]) -> usize {
        overlays
            .iter()
            .filter(|o| matches!(o, Overlay::Label { .. }))
            .count()
    }

    #[test]
    fn test_no_detections_no_overlays() {
        assert!(detection_overlays(&[]).is_empty());
    }

    #[test]
    fn test_status_overlay() {
        assert_eq!(
            status_overlay(0),
            Overlay::Status {
                text: "Cats detected: 0".to_string(),
                origin: STATUS_ORIGIN,
            }
        );
        assert!(matches!(
            status_overlay(3),
            Overlay::Status { text, .. } if text == "Cats detected: 3"
        ));
    }

    #[test]
    fn test_one_box_and_label_per_detection() {
        let detections = [
            Rect::new(10, 40, 50, 50),
            Rect::new(100, 100, 30, 30),
            Rect::new(200, 20, 80, 80),
        ];
        let overlays = detection_overlays(&detections);
        assert_eq!(overlays.len(), 6);
        assert_eq!(count_boxes(&overlays), 3);
        assert_eq!(count_labels(&overlays), 3);
        assert!(!overlays
            .iter()
            .any(|o| matches!(o, Overlay::Status { .. })));
    }

    #[test]
    fn test_label_sits_above_box() {
        let overlays = detection_overlays(&[Rect::new(12, 40, 30, 30)]);
        assert_eq!(
            overlays,
            vec![
                Overlay::Box(Rect::new(12, 40, 30, 30)),
                Overlay::Label {
                    text: DETECTION_LABEL.to_string(),
                    origin: (12, 30),
                },
            ]
        );
    }

    #[test]
    fn test_draw_box_paints_green_edge() {
        let mut frame =
            Mat::new_rows_cols_with_default(120, 160, CV_8UC3, Scalar::all(0.0)).unwrap();
        draw_overlays(&mut frame, &detection_overlays(&[Rect::new(60, 60, 40, 40)])).unwrap();

        // Top-left corner of the rectangle outline
        let px = *frame.at_2d::<Vec3b>(60, 60).unwrap();
        assert_eq!(px, Vec3b::from_array([0, 255, 0]));
        // Centre of the box stays untouched
        let inside = *frame.at_2d::<Vec3b>(80, 80).unwrap();
        assert_eq!(inside, Vec3b::from_array([0, 0, 0]));
    }
}
