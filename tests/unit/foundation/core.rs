use super::*;

#[test]
fn mask_denormalizes_against_box() {
    let r = Mask::new(0.1, 0.2, 0.3, 0.4).to_css_rect(Size::new(200.0, 100.0));
    assert!((r.x0 - 20.0).abs() < 1e-9);
    assert!((r.y0 - 20.0).abs() < 1e-9);
    assert!((r.width() - 60.0).abs() < 1e-9);
    assert!((r.height() - 40.0).abs() < 1e-9);
}

#[test]
fn active_index_coercion() {
    assert_eq!(ActiveIndex::from_f64(2.0), ActiveIndex(Some(2)));
    assert_eq!(ActiveIndex::from_f64(f64::NAN), ActiveIndex(Some(0)));
    assert_eq!(ActiveIndex::from_f64(f64::INFINITY), ActiveIndex(Some(0)));
    assert_eq!(ActiveIndex::from_f64(-1.0), ActiveIndex(None));
    assert_eq!(ActiveIndex::from_f64(1.5), ActiveIndex(None));
    assert!(ActiveIndex::default().matches(0));
    assert!(!ActiveIndex(None).matches(0));
}

#[test]
fn backing_size_scales_and_rounds() {
    let ctx = RenderContext::new(Size::new(200.0, 100.0), 2.0);
    assert_eq!(ctx.backing_size(), (400, 200));

    let ctx = RenderContext::new(Size::new(100.3, 50.2), 1.5);
    assert_eq!(ctx.backing_size(), (150, 75));

    let ctx = RenderContext::new(Size::new(0.2, 0.0), 1.0);
    assert_eq!(ctx.backing_size(), (1, 1));
}

#[test]
fn bad_pixel_ratio_falls_back_to_one() {
    assert_eq!(
        RenderContext::new(Size::new(10.0, 10.0), 0.0).device_pixel_ratio,
        1.0
    );
    assert_eq!(
        RenderContext::new(Size::new(10.0, 10.0), f64::NAN).device_pixel_ratio,
        1.0
    );
}

#[test]
fn layout_threshold() {
    let ctx = RenderContext::new(Size::new(0.0, 0.0), 1.0);
    assert!(!ctx.is_laid_out(2.0));
    let ctx = RenderContext::new(Size::new(200.0, 1.0), 1.0);
    assert!(!ctx.is_laid_out(2.0));
    let ctx = RenderContext::new(Size::new(200.0, 100.0), 1.0);
    assert!(ctx.is_laid_out(2.0));
}
