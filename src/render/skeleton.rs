//! Skeleton rendering - draws detected hands over the camera frame

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use super::surface::{Color, Path2D, Point, Surface};
use crate::hand::{finger_path, Finger, Hand, Handedness, Keypoint};
use crate::source::Frame;

/// Keypoint marker radius in pixels.
pub const POINT_RADIUS: f32 = 4.0;
/// Finger path stroke width in pixels.
pub const LINE_WIDTH: f32 = 2.0;
/// Horizontal offset of a keypoint label from its marker.
pub const LABEL_OFFSET_X: f32 = 10.0;

pub const STROKE_COLOR: Color = Color::WHITE;

/// Renderer options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Draw each keypoint's name next to its marker.
    pub show_labels: bool,
}

/// Marker fill color for a hand.
pub fn hand_color(handedness: Handedness) -> Color {
    match handedness {
        Handedness::Left => Color::BLACK,
        Handedness::Right => Color::BLUE,
    }
}

/// Hands in draw order: descending handedness label, so "Right" draws
/// before "Left". Equal labels keep their detector order.
pub fn draw_order(hands: &[Hand]) -> Vec<&Hand> {
    let mut ordered: Vec<&Hand> = hands.iter().collect();
    ordered.sort_by(|a, b| b.handedness.label().cmp(a.handedness.label()));
    ordered
}

/// Clear the surface and draw `frame` as background.
pub fn present_frame<S: Surface + ?Sized>(surface: &mut S, frame: &Frame) {
    let (width, height) = (frame.width as f32, frame.height as f32);
    surface.clear_rect(0.0, 0.0, width, height);
    surface.draw_image(frame, 0.0, 0.0, width, height);
}

/// Draw every hand: keypoint markers, optional labels, then one open path
/// per finger.
pub fn render_hands<S: Surface + ?Sized>(hands: &[Hand], surface: &mut S, options: &RenderOptions) {
    if hands.is_empty() {
        return;
    }

    for hand in draw_order(hands) {
        surface.set_fill_color(hand_color(hand.handedness));
        surface.set_stroke_color(STROKE_COLOR);
        surface.set_line_width(LINE_WIDTH);

        for keypoint in &hand.keypoints {
            surface.fill_circle(Point::new(keypoint.x, keypoint.y), POINT_RADIUS);
            if options.show_labels {
                draw_inverted_text(keypoint, surface);
            }
        }

        for finger in Finger::ALL {
            let points: Vec<Point> = finger_path(hand, finger)
                .iter()
                .map(|k| Point::new(k.x, k.y))
                .collect();
            draw_path(&points, surface, false);
        }
    }
}

/// Stroke a polyline through `points`.
pub fn draw_path<S: Surface + ?Sized>(points: &[Point], surface: &mut S, close: bool) {
    if points.is_empty() {
        return;
    }
    surface.stroke_path(&Path2D::new(points.to_vec(), close));
}

/// Label drawn upside-down and mirrored so it reads correctly once the whole
/// output is flipped horizontally.
fn draw_inverted_text<S: Surface + ?Sized>(keypoint: &Keypoint, surface: &mut S) {
    surface.save();
    surface.translate(keypoint.x - LABEL_OFFSET_X, keypoint.y);
    surface.rotate(-PI);
    surface.scale(1.0, -1.0);
    surface.fill_text(&keypoint.name, 0.0, 0.0);
    surface.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::HAND_KEYPOINT_COUNT;
    use crate::render::surface::{DrawCommand, RecordingSurface};

    fn make_hand(handedness: Handedness, offset: f32) -> Hand {
        let mut positions = [(0.0, 0.0); HAND_KEYPOINT_COUNT];
        for (i, pos) in positions.iter_mut().enumerate() {
            *pos = (offset + i as f32, offset);
        }
        Hand::from_positions(handedness, &positions)
    }

    fn count(surface: &RecordingSurface, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        surface.commands().iter().filter(|c| pred(c)).count()
    }

    #[test]
    fn empty_hands_draw_nothing() {
        let mut surface = RecordingSurface::new(640, 480);
        render_hands(&[], &mut surface, &RenderOptions { show_labels: true });
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn right_then_left_keeps_order() {
        let hands = [make_hand(Handedness::Right, 0.0), make_hand(Handedness::Left, 100.0)];
        let order: Vec<Handedness> = draw_order(&hands).iter().map(|h| h.handedness).collect();
        assert_eq!(order, [Handedness::Right, Handedness::Left]);
    }

    #[test]
    fn left_then_right_draws_right_first() {
        let hands = [make_hand(Handedness::Left, 0.0), make_hand(Handedness::Right, 100.0)];
        let order: Vec<Handedness> = draw_order(&hands).iter().map(|h| h.handedness).collect();
        assert_eq!(order, [Handedness::Right, Handedness::Left]);
    }

    #[test]
    fn equal_handedness_preserves_input_order() {
        let hands = [make_hand(Handedness::Left, 1.0), make_hand(Handedness::Left, 2.0)];
        let order = draw_order(&hands);
        assert_eq!(order[0].keypoints[0].y, 1.0);
        assert_eq!(order[1].keypoints[0].y, 2.0);
    }

    #[test]
    fn sorting_twice_yields_same_order() {
        let hands = [
            make_hand(Handedness::Left, 1.0),
            make_hand(Handedness::Right, 2.0),
            make_hand(Handedness::Left, 3.0),
            make_hand(Handedness::Right, 4.0),
        ];
        let once: Vec<Hand> = draw_order(&hands).into_iter().cloned().collect();
        let twice: Vec<Hand> = draw_order(&once).into_iter().cloned().collect();
        assert_eq!(once, twice);

        let ys: Vec<f32> = once.iter().map(|h| h.keypoints[0].y).collect();
        assert_eq!(ys, [2.0, 4.0, 1.0, 3.0]);
    }

    #[test]
    fn draw_order_does_not_reorder_input() {
        let hands = [make_hand(Handedness::Left, 0.0), make_hand(Handedness::Right, 1.0)];
        let _ = draw_order(&hands);
        assert_eq!(hands[0].handedness, Handedness::Left);
    }

    #[test]
    fn fill_color_follows_handedness() {
        let mut surface = RecordingSurface::new(640, 480);
        let hands = [make_hand(Handedness::Left, 0.0), make_hand(Handedness::Right, 50.0)];
        render_hands(&hands, &mut surface, &RenderOptions::default());
        assert_eq!(surface.fill_colors(), [Color::BLUE, Color::BLACK]);
    }

    #[test]
    fn one_hand_draws_21_points_and_5_open_paths() {
        let mut surface = RecordingSurface::new(640, 480);
        render_hands(
            &[make_hand(Handedness::Right, 0.0)],
            &mut surface,
            &RenderOptions::default(),
        );

        let circles = count(&surface, |c| {
            matches!(c, DrawCommand::FillCircle { radius, .. } if *radius == POINT_RADIUS)
        });
        assert_eq!(circles, HAND_KEYPOINT_COUNT);

        let paths: Vec<&Path2D> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokePath(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(paths.len(), 5);
        assert!(paths.iter().all(|p| !p.closed && p.points.len() == 5));
        // thumb path is drawn first and runs wrist -> thumb tip
        assert_eq!(paths[0].points[4], Point::new(4.0, 0.0));
        assert!(count(&surface, |c| matches!(c, DrawCommand::FillText { .. })) == 0);
    }

    #[test]
    fn stroke_style_is_shared_by_all_hands() {
        let mut surface = RecordingSurface::new(640, 480);
        let hands = [make_hand(Handedness::Left, 0.0), make_hand(Handedness::Right, 50.0)];
        render_hands(&hands, &mut surface, &RenderOptions::default());
        let strokes = count(&surface, |c| *c == DrawCommand::SetStrokeColor(Color::WHITE));
        let widths = count(&surface, |c| *c == DrawCommand::SetLineWidth(LINE_WIDTH));
        assert_eq!(strokes, 2);
        assert_eq!(widths, 2);
    }

    #[test]
    fn labels_are_mirrored_inside_scoped_transform() {
        let mut surface = RecordingSurface::new(640, 480);
        let hand = Hand::new(Handedness::Left, vec![Keypoint::new("wrist", 50.0, 60.0)]);
        render_hands(&[hand], &mut surface, &RenderOptions { show_labels: true });

        let cmds = surface.commands();
        let start = cmds.iter().position(|c| *c == DrawCommand::Save).unwrap();
        assert_eq!(
            cmds[start..start + 6],
            [
                DrawCommand::Save,
                DrawCommand::Translate { dx: 40.0, dy: 60.0 },
                DrawCommand::Rotate(-PI),
                DrawCommand::Scale { sx: 1.0, sy: -1.0 },
                DrawCommand::FillText {
                    text: "wrist".to_string(),
                    x: 0.0,
                    y: 0.0
                },
                DrawCommand::Restore,
            ]
        );
        assert_eq!(surface.open_saves(), 0);
    }

    #[test]
    fn present_frame_clears_then_draws_frame() {
        let mut surface = RecordingSurface::new(4, 2);
        let frame = Frame::filled(4, 2, 0, 77);
        present_frame(&mut surface, &frame);
        assert_eq!(
            surface.commands(),
            [
                DrawCommand::ClearRect {
                    x: 0.0,
                    y: 0.0,
                    width: 4.0,
                    height: 2.0
                },
                DrawCommand::DrawImage {
                    timestamp_us: 77,
                    x: 0.0,
                    y: 0.0,
                    width: 4.0,
                    height: 2.0
                },
            ]
        );
    }

    #[test]
    fn draw_path_can_close() {
        let mut surface = RecordingSurface::new(1, 1);
        let points = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
        draw_path(&points, &mut surface, true);
        assert!(matches!(&surface.commands()[0], DrawCommand::StrokePath(p) if p.closed));
    }

    #[test]
    fn draw_path_with_no_points_is_noop() {
        let mut surface = RecordingSurface::new(1, 1);
        draw_path(&[], &mut surface, false);
        assert!(surface.commands().is_empty());
    }
}
