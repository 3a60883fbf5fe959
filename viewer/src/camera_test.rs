#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn rect_approx_eq(a: Rect, b: Rect) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.width, b.width) && approx_eq(a.height, b.height)
}

fn container() -> ContainerMetrics {
    ContainerMetrics::new(800.0, 600.0)
}

fn fitted_camera() -> Camera {
    let mut cam = Camera::default();
    assert!(cam.load(Rect::new(0.0, 0.0, 400.0, 300.0)));
    assert!(cam.fit(DEFAULT_PADDING, container()).is_some());
    cam
}

const DEFAULT_PADDING: f64 = 0.04;

// --- Rect ---

#[test]
fn rect_valid_requires_positive_finite_size() {
    assert!(Rect::new(0.0, 0.0, 1.0, 1.0).is_valid());
    assert!(Rect::new(-5.0, -5.0, 1.0, 1.0).is_valid());
    assert!(!Rect::new(0.0, 0.0, 0.0, 1.0).is_valid());
    assert!(!Rect::new(0.0, 0.0, 1.0, -1.0).is_valid());
    assert!(!Rect::new(f64::NAN, 0.0, 1.0, 1.0).is_valid());
    assert!(!Rect::new(0.0, 0.0, f64::INFINITY, 1.0).is_valid());
}

#[test]
fn rect_expanded_splits_padding_across_sides() {
    let r = Rect::new(0.0, 0.0, 400.0, 300.0).expanded(0.04);
    assert!(rect_approx_eq(r, Rect::new(-8.0, -6.0, 416.0, 312.0)));
}

#[test]
fn rect_expanded_keeps_center() {
    let r = Rect::new(10.0, 20.0, 100.0, 50.0);
    assert!(point_approx_eq(r.expanded(0.5).center(), r.center()));
}

#[test]
fn rect_translated_keeps_size() {
    let r = Rect::new(1.0, 2.0, 3.0, 4.0).translated(10.0, -2.0);
    assert_eq!(r, Rect::new(11.0, 0.0, 3.0, 4.0));
}

// --- Projection ---

#[test]
fn projection_rejects_degenerate_inputs() {
    let view = Rect::new(0.0, 0.0, 100.0, 100.0);
    assert!(Projection::new(view, ContainerMetrics::new(0.0, 600.0)).is_none());
    assert!(Projection::new(view, ContainerMetrics::new(800.0, -1.0)).is_none());
    assert!(Projection::new(Rect::new(0.0, 0.0, 0.0, 100.0), container()).is_none());
}

#[test]
fn projection_matching_aspect_has_no_letterbox() {
    let p = Projection::new(Rect::new(-8.0, -6.0, 416.0, 312.0), container()).unwrap();
    assert!(approx_eq(p.scale, 800.0 / 416.0));
    assert!(approx_eq(p.offset_x, 0.0));
    assert!(approx_eq(p.offset_y, 0.0));
}

#[test]
fn projection_wide_container_letterboxes_horizontally() {
    let p = Projection::new(Rect::new(-8.0, -6.0, 416.0, 312.0), ContainerMetrics::new(800.0, 300.0)).unwrap();
    assert!(approx_eq(p.scale, 300.0 / 312.0));
    assert!(approx_eq(p.offset_x, 200.0));
    assert!(approx_eq(p.offset_y, 0.0));
}

#[test]
fn projection_tall_container_letterboxes_vertically() {
    let p = Projection::new(Rect::new(0.0, 0.0, 100.0, 100.0), ContainerMetrics::new(200.0, 400.0)).unwrap();
    assert!(approx_eq(p.scale, 2.0));
    assert!(approx_eq(p.offset_x, 0.0));
    assert!(approx_eq(p.offset_y, 100.0));
}

#[test]
fn projection_screen_world_roundtrip() {
    let p = Projection::new(Rect::new(-8.0, -6.0, 416.0, 312.0), ContainerMetrics::new(640.0, 480.0)).unwrap();
    let screen = Point::new(123.0, 456.0);
    assert!(point_approx_eq(p.world_to_screen(p.screen_to_world(screen)), screen));
}

#[test]
fn projection_view_origin_maps_to_content_corner() {
    let p = Projection::new(Rect::new(50.0, 50.0, 100.0, 100.0), ContainerMetrics::new(400.0, 200.0)).unwrap();
    let corner = p.world_to_screen(Point::new(50.0, 50.0));
    assert!(point_approx_eq(corner, Point::new(p.offset_x, p.offset_y)));
}

// --- Fit ---

#[test]
fn fit_without_image_is_noop() {
    let mut cam = Camera::default();
    assert!(cam.fit(0.04, container()).is_none());
    assert!(cam.view().is_none());
}

#[test]
fn fit_pads_intrinsic_box() {
    let cam = fitted_camera();
    assert!(rect_approx_eq(cam.view().unwrap(), Rect::new(-8.0, -6.0, 416.0, 312.0)));
    assert_eq!(cam.base(), cam.view());
    assert!(!cam.user_moved());
}

#[test]
fn fit_is_idempotent() {
    let mut cam = fitted_camera();
    let first = cam.view();
    cam.fit(DEFAULT_PADDING, container());
    assert_eq!(cam.view(), first);
}

#[test]
fn fit_zero_padding_shows_exact_box() {
    let mut cam = fitted_camera();
    let view = cam.fit(0.0, container()).unwrap();
    assert_eq!(view, Rect::new(0.0, 0.0, 400.0, 300.0));
}

#[test]
fn fit_invalid_padding_falls_back_to_zero() {
    let mut cam = fitted_camera();
    let view = cam.fit(f64::NAN, container()).unwrap();
    assert_eq!(view, Rect::new(0.0, 0.0, 400.0, 300.0));
    assert_eq!(cam.fit_padding(), 0.0);
}

#[test]
fn fit_degenerate_container_keeps_previous_view() {
    let mut cam = fitted_camera();
    cam.apply_pan(10.0, 0.0, container());
    let before = cam.view();
    assert!(cam.fit(0.04, ContainerMetrics::new(0.0, 0.0)).is_none());
    assert_eq!(cam.view(), before);
    assert!(cam.user_moved());
}

#[test]
fn fit_clears_user_moved() {
    let mut cam = fitted_camera();
    cam.apply_zoom(2.0, Point::new(100.0, 100.0), container());
    assert!(cam.user_moved());
    cam.refit(container());
    assert!(!cam.user_moved());
}

#[test]
fn load_invalid_box_leaves_camera_empty() {
    let mut cam = fitted_camera();
    assert!(!cam.load(Rect::new(0.0, 0.0, 0.0, 10.0)));
    assert!(cam.intrinsic().is_none());
    assert!(cam.view().is_none());
}

// --- Pan ---

#[test]
fn pan_right_moves_view_left() {
    let mut cam = fitted_camera();
    let view = cam.apply_pan(100.0, 0.0, container()).unwrap();
    // 100px at 800/416 px per unit is 52 units.
    assert!(approx_eq(view.x, -60.0));
    assert!(approx_eq(view.y, -6.0));
    assert!(cam.user_moved());
}

#[test]
fn pan_keeps_view_size() {
    let mut cam = fitted_camera();
    let before = cam.view().unwrap();
    let after = cam.apply_pan(-37.0, 91.0, container()).unwrap();
    assert_eq!(after.width, before.width);
    assert_eq!(after.height, before.height);
}

#[test]
fn pan_from_snapshot_ignores_intermediate_moves() {
    let mut cam = fitted_camera();
    let snapshot = cam.view().unwrap();
    for step in 1..=10 {
        cam.pan_from(snapshot, f64::from(step) * 10.0, f64::from(step) * 5.0, container());
    }
    let stepped = cam.view().unwrap();

    let mut direct = fitted_camera();
    direct.pan_from(snapshot, 100.0, 50.0, container());
    assert!(rect_approx_eq(stepped, direct.view().unwrap()));
}

#[test]
fn pan_is_additive() {
    let mut a = fitted_camera();
    a.apply_pan(30.0, -20.0, container());
    a.apply_pan(70.0, -40.0, container());

    let mut b = fitted_camera();
    b.apply_pan(100.0, -60.0, container());
    assert!(rect_approx_eq(a.view().unwrap(), b.view().unwrap()));
}

#[test]
fn pan_non_finite_delta_is_ignored() {
    let mut cam = fitted_camera();
    let before = cam.view();
    assert!(cam.apply_pan(f64::NAN, 0.0, container()).is_none());
    assert_eq!(cam.view(), before);
    assert!(!cam.user_moved());
}

// --- Zoom ---

#[test]
fn zoom_keeps_anchor_point_fixed() {
    let mut cam = fitted_camera();
    let anchor = Point::new(200.0, 150.0);
    let before = cam.projection(container()).unwrap().screen_to_world(anchor);
    cam.apply_zoom(2.0, anchor, container()).unwrap();
    let after = cam.projection(container()).unwrap().screen_to_world(anchor);
    assert!(point_approx_eq(before, after));
}

#[test]
fn zoom_anchor_fixed_with_letterbox() {
    let mut cam = fitted_camera();
    let wide = ContainerMetrics::new(1200.0, 300.0);
    let anchor = Point::new(1000.0, 40.0);
    let before = cam.projection(wide).unwrap().screen_to_world(anchor);
    cam.apply_zoom(1.7, anchor, wide).unwrap();
    cam.apply_zoom(0.4, anchor, wide).unwrap();
    let after = cam.projection(wide).unwrap().screen_to_world(anchor);
    assert!(point_approx_eq(before, after));
}

#[test]
fn zoom_in_halves_width() {
    let mut cam = fitted_camera();
    let view = cam.apply_zoom(2.0, Point::new(400.0, 300.0), container()).unwrap();
    assert!(approx_eq(view.width, 208.0));
    assert!(approx_eq(view.height, 156.0));
}

#[test]
fn zoom_about_center_keeps_center() {
    let mut cam = fitted_camera();
    let center = cam.view().unwrap().center();
    let view = cam.apply_zoom(3.0, Point::new(400.0, 300.0), container()).unwrap();
    assert!(point_approx_eq(view.center(), center));
}

#[test]
fn zoom_preserves_aspect() {
    let mut cam = fitted_camera();
    let view = cam.apply_zoom(1.3, Point::new(10.0, 590.0), container()).unwrap();
    assert!(approx_eq(view.height / view.width, 312.0 / 416.0));
}

#[test]
fn zoom_in_clamps_to_min_box() {
    let mut cam = fitted_camera();
    for _ in 0..50 {
        cam.apply_zoom(2.0, Point::new(400.0, 300.0), container());
    }
    let view = cam.view().unwrap();
    assert!(approx_eq(view.width, 416.0 * 0.08));
    assert!(view.width > 0.0);
}

#[test]
fn zoom_out_clamps_to_max_box() {
    let mut cam = fitted_camera();
    for _ in 0..50 {
        cam.apply_zoom(0.5, Point::new(400.0, 300.0), container());
    }
    assert!(approx_eq(cam.view().unwrap().width, 416.0 * 20.0));
}

#[test]
fn zoom_at_limit_still_preserves_anchor() {
    let mut cam = fitted_camera();
    let anchor = Point::new(123.0, 321.0);
    for _ in 0..50 {
        cam.apply_zoom(2.0, anchor, container());
    }
    let before = cam.projection(container()).unwrap().screen_to_world(anchor);
    cam.apply_zoom(2.0, anchor, container());
    let after = cam.projection(container()).unwrap().screen_to_world(anchor);
    assert!(point_approx_eq(before, after));
}

#[test]
fn zoom_invalid_factor_is_ignored() {
    let mut cam = fitted_camera();
    let before = cam.view();
    assert!(cam.apply_zoom(0.0, Point::new(1.0, 1.0), container()).is_none());
    assert!(cam.apply_zoom(-2.0, Point::new(1.0, 1.0), container()).is_none());
    assert!(cam.apply_zoom(f64::INFINITY, Point::new(1.0, 1.0), container()).is_none());
    assert!(cam.apply_zoom(2.0, Point::new(f64::NAN, 1.0), container()).is_none());
    assert_eq!(cam.view(), before);
}

#[test]
fn zoom_bounds_follow_config() {
    let config = ViewerConfig { min_box_factor: 0.5, max_box_factor: 2.0, ..ViewerConfig::default() };
    let mut cam = Camera::new(&config);
    cam.load(Rect::new(0.0, 0.0, 100.0, 100.0));
    cam.fit(0.0, ContainerMetrics::new(100.0, 100.0));
    cam.apply_zoom(10.0, Point::new(50.0, 50.0), ContainerMetrics::new(100.0, 100.0));
    assert!(approx_eq(cam.view().unwrap().width, 50.0));
    cam.apply_zoom(0.01, Point::new(50.0, 50.0), ContainerMetrics::new(100.0, 100.0));
    assert!(approx_eq(cam.view().unwrap().width, 200.0));
}

#[test]
fn zoom_bounds_order_swapped_factors() {
    let bounds = ZoomBounds::new(20.0, 0.08);
    assert_eq!(bounds, ZoomBounds { min_box_factor: 0.08, max_box_factor: 20.0 });
}

#[test]
fn zoom_bounds_replace_unusable_factors() {
    let bounds = ZoomBounds::new(f64::NAN, -3.0);
    assert_eq!(bounds, ZoomBounds { min_box_factor: 0.08, max_box_factor: 20.0 });
    let bounds = ZoomBounds::new(0.0, 4.0);
    assert_eq!(bounds, ZoomBounds { min_box_factor: 0.08, max_box_factor: 4.0 });
}

#[test]
fn zoom_with_swapped_config_bounds_clamps() {
    let config = ViewerConfig { min_box_factor: 2.0, max_box_factor: 0.5, ..ViewerConfig::default() };
    let square = ContainerMetrics::new(100.0, 100.0);
    let mut cam = Camera::new(&config);
    cam.load(Rect::new(0.0, 0.0, 100.0, 100.0));
    cam.fit(0.0, square);
    cam.apply_zoom(10.0, Point::new(50.0, 50.0), square);
    assert!(approx_eq(cam.view().unwrap().width, 50.0));
    cam.apply_zoom(0.01, Point::new(50.0, 50.0), square);
    assert!(approx_eq(cam.view().unwrap().width, 200.0));
}

// --- Resize ---

#[test]
fn resize_refits_untouched_view() {
    let mut cam = fitted_camera();
    let view = cam.on_resize(ContainerMetrics::new(1024.0, 200.0));
    assert!(view.is_some());
    assert!(rect_approx_eq(cam.view().unwrap(), Rect::new(-8.0, -6.0, 416.0, 312.0)));
}

#[test]
fn resize_keeps_user_view() {
    let mut cam = fitted_camera();
    cam.apply_zoom(2.0, Point::new(50.0, 50.0), container());
    let before = cam.view();
    assert!(cam.on_resize(ContainerMetrics::new(300.0, 300.0)).is_none());
    assert_eq!(cam.view(), before);
}

#[test]
fn resize_after_reset_refits_again() {
    let mut cam = fitted_camera();
    cam.apply_pan(40.0, 40.0, container());
    cam.refit(container());
    assert!(cam.on_resize(ContainerMetrics::new(300.0, 300.0)).is_some());
}

#[test]
fn zoom_pinned_by_bounds_is_not_a_user_move() {
    let config = ViewerConfig { min_box_factor: 1.0, max_box_factor: 1.0, ..ViewerConfig::default() };
    let square = ContainerMetrics::new(100.0, 100.0);
    let mut cam = Camera::new(&config);
    cam.load(Rect::new(0.0, 0.0, 100.0, 100.0));
    cam.fit(0.0, square);
    cam.apply_zoom(2.0, Point::new(0.0, 0.0), square);
    assert_eq!(cam.view(), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
    assert!(!cam.user_moved());
}
