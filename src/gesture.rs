//! Transform gestures: move, scale and rotate of the selected shape.
//!
//! A gesture captures an immutable copy of the shape's geometry on press and
//! recomputes the live geometry from that origin on every move, so repeated
//! pointer events never accumulate floating-point drift.

use mapscribe_core::{Shape, ShapeId};
use mapscribe_geometry::transform::{self, Geometry};
use mapscribe_geometry::{LatLng, Point, Projection};

/// An active gesture (no gesture means idle)
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Body drag
    Move {
        shape_id: ShapeId,
        start: Point,
        origin: Geometry,
    },
    /// Corner handle drag
    Scale {
        shape_id: ShapeId,
        center: LatLng,
        start_dist: f64,
        origin: Geometry,
        /// Rotation frozen at press time
        base_angle: f64,
    },
    /// Rotation handle drag
    Rotate {
        shape_id: ShapeId,
        center: LatLng,
        start_angle: f64,
        origin: Geometry,
        base_angle: f64,
    },
}

impl Gesture {
    pub fn begin_move(shape: &Shape, pos: Point) -> Self {
        Gesture::Move {
            shape_id: shape.id,
            start: pos,
            origin: shape.geometry(),
        }
    }

    /// Start a scale gesture; `None` for shapes without extent
    pub fn begin_scale<P: Projection + ?Sized>(shape: &Shape, proj: &P, pos: Point) -> Option<Self> {
        let origin = shape.geometry();
        if !origin.can_scale() {
            return None;
        }
        let center = origin.pivot()?;
        let start_dist = pos.distance_to(proj.project(center)).max(1.0);
        Some(Gesture::Scale {
            shape_id: shape.id,
            center,
            start_dist,
            origin,
            base_angle: shape.rotation(),
        })
    }

    /// Start a rotate gesture; `None` for markers and circles
    pub fn begin_rotate<P: Projection + ?Sized>(shape: &Shape, proj: &P, pos: Point) -> Option<Self> {
        let origin = shape.geometry();
        if !origin.can_rotate() {
            return None;
        }
        let center = origin.pivot()?;
        Some(Gesture::Rotate {
            shape_id: shape.id,
            center,
            start_angle: pos.angle_from(proj.project(center)),
            origin,
            base_angle: shape.rotation(),
        })
    }

    pub fn shape_id(&self) -> ShapeId {
        match self {
            Gesture::Move { shape_id, .. } | Gesture::Scale { shape_id, .. } | Gesture::Rotate { shape_id, .. } => {
                *shape_id
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Move { .. } => "move",
            Gesture::Scale { .. } => "scale",
            Gesture::Rotate { .. } => "rotate",
        }
    }

    /// Apply the gesture for pointer position `pos` to the live shape
    pub fn update<P: Projection + ?Sized>(&self, shape: &mut Shape, proj: &P, pos: Point) {
        match self {
            Gesture::Move { start, origin, .. } => {
                let d = pos.sub(*start);
                shape.set_geometry(transform::translate(proj, origin, d.x, d.y));
            }
            Gesture::Scale {
                center,
                start_dist,
                origin,
                base_angle,
                ..
            } => {
                let dist = pos.distance_to(proj.project(*center)).max(1.0);
                let factor = dist / start_dist;
                shape.set_geometry(transform::scale(proj, origin, *center, factor, *base_angle));
                shape.set_rotation(*base_angle);
            }
            Gesture::Rotate {
                center,
                start_angle,
                origin,
                base_angle,
                ..
            } => {
                let delta = pos.angle_from(proj.project(*center)) - start_angle;
                shape.set_geometry(transform::rotate(proj, origin, *center, delta));
                shape.set_rotation(base_angle + delta);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mapscribe_core::{PathKind, Style};
    use mapscribe_geometry::WebMercatorView;
    use proptest::prelude::*;

    use super::*;

    fn view() -> WebMercatorView {
        WebMercatorView::centered(LatLng::new(30.0, 30.0), 9.0, Point::new(800.0, 600.0))
    }

    fn square(proj: &WebMercatorView) -> Shape {
        let ring = [(300.0, 200.0), (400.0, 200.0), (400.0, 300.0), (300.0, 300.0)]
            .into_iter()
            .map(|(x, y)| proj.unproject(Point::new(x, y)))
            .collect();
        Shape::path(PathKind::Polygon, vec![ring], Style::default())
    }

    fn px(proj: &WebMercatorView, shape: &Shape) -> Vec<Point> {
        shape.geometry().vertices().map(|ll| proj.project(*ll)).collect()
    }

    #[test]
    fn move_recomputes_from_origin() {
        let proj = view();
        let mut shape = square(&proj);
        let g = Gesture::begin_move(&shape, Point::new(350.0, 250.0));
        for step in 1..=10 {
            g.update(&mut shape, &proj, Point::new(350.0 + step as f64 * 3.3, 250.0));
        }
        let first = px(&proj, &shape)[0];
        assert!((first.x - 333.0).abs() < 1e-6 && (first.y - 200.0).abs() < 1e-6);
    }

    #[test]
    fn rotate_and_rotate_back_restores_angle() {
        let proj = view();
        let mut shape = square(&proj);
        let (start, theta, r) = (0.3_f64, 0.7_f64, 90.0);
        let at = |c: Point, a: f64| c.add(Point::new(r * a.cos(), r * a.sin()));

        let center = proj.project(shape.pivot().unwrap());
        let g = Gesture::begin_rotate(&shape, &proj, at(center, start)).unwrap();
        g.update(&mut shape, &proj, at(center, start + theta));
        assert!((shape.rotation() - theta).abs() < 1e-9);

        // Press where the last gesture ended and swing back
        let center = proj.project(shape.pivot().unwrap());
        let g = Gesture::begin_rotate(&shape, &proj, at(center, start + theta)).unwrap();
        g.update(&mut shape, &proj, at(center, start));
        assert!(shape.rotation().abs() < 1e-9, "rotation {}", shape.rotation());
    }

    #[test]
    fn rotate_accumulates_angle_and_scale_keeps_it() {
        let proj = view();
        let mut shape = square(&proj);
        let center = proj.project(shape.pivot().unwrap());

        let press = Point::new(center.x + 80.0, center.y);
        let rot = Gesture::begin_rotate(&shape, &proj, press).unwrap();
        rot.update(&mut shape, &proj, Point::new(center.x, center.y + 80.0));
        assert!((shape.rotation() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);

        // Second rotate gesture continues from the stored angle
        let center = proj.project(shape.pivot().unwrap());
        let rot = Gesture::begin_rotate(&shape, &proj, Point::new(center.x, center.y + 80.0)).unwrap();
        rot.update(&mut shape, &proj, Point::new(center.x - 80.0, center.y));
        assert!((shape.rotation() - std::f64::consts::PI).abs() < 1e-9);

        let center = proj.project(shape.pivot().unwrap());
        let scale = Gesture::begin_scale(&shape, &proj, Point::new(center.x + 50.0, center.y + 50.0)).unwrap();
        scale.update(&mut shape, &proj, Point::new(center.x + 100.0, center.y + 100.0));
        assert!((shape.rotation() - std::f64::consts::PI).abs() < 1e-9);
        let pts = px(&proj, &shape);
        assert!((pts[0].distance_to(pts[1]) - 200.0).abs() < 1e-4);
    }

    #[test]
    fn unsupported_kinds_refuse_to_start() {
        let proj = view();
        let marker = Shape::marker(LatLng::new(30.0, 30.0), None, "#fff", 1.0);
        let circle = Shape::circle(LatLng::new(30.0, 30.0), 500.0, Style::default());
        let p = Point::new(10.0, 10.0);
        assert!(Gesture::begin_scale(&marker, &proj, p).is_none());
        assert!(Gesture::begin_rotate(&marker, &proj, p).is_none());
        assert!(Gesture::begin_rotate(&circle, &proj, p).is_none());
        assert!(Gesture::begin_scale(&circle, &proj, p).is_some());
    }

    proptest! {
        #[test]
        fn intermediate_moves_do_not_drift(
            path in prop::collection::vec((-300.0f64..300.0, -300.0f64..300.0), 1..40),
            scale_press in 20.0f64..80.0,
        ) {
            let proj = view();
            let end = path.last().map(|(x, y)| Point::new(350.0 + x, 250.0 + y)).unwrap();

            for kind in 0..3 {
                let base = square(&proj);
                let center = proj.project(base.pivot().unwrap());
                let press = Point::new(center.x + scale_press, center.y + 10.0);
                let g = match kind {
                    0 => Gesture::begin_move(&base, press),
                    1 => Gesture::begin_scale(&base, &proj, press).unwrap(),
                    _ => Gesture::begin_rotate(&base, &proj, press).unwrap(),
                };

                let mut walked = base.clone();
                for (x, y) in &path {
                    g.update(&mut walked, &proj, Point::new(350.0 + x, 250.0 + y));
                }
                let mut direct = base.clone();
                g.update(&mut direct, &proj, end);

                prop_assert_eq!(walked, direct);
            }
        }
    }
}
