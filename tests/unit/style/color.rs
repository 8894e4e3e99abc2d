use super::*;

#[test]
fn parses_hex_forms() {
    assert_eq!(
        parse_css_color("#ff0000").unwrap(),
        Rgba::rgba(1.0, 0.0, 0.0, 1.0)
    );
    assert_eq!(parse_css_color("#f00").unwrap().to_rgba8(), [255, 0, 0, 255]);

    let c = parse_css_color("#0000ff80").unwrap();
    assert!((c.b - 1.0).abs() < 1e-9);
    assert!((c.a - (128.0 / 255.0)).abs() < 1e-9);

    assert!(parse_css_color("#12345").is_none());
    assert!(parse_css_color("#gg0000").is_none());
}

#[test]
fn parses_default_overlay_colors() {
    assert_eq!(
        parse_css_color("rgba(0,0,0,0.65)").unwrap().to_rgba8(),
        [0, 0, 0, 166]
    );
    assert_eq!(
        parse_css_color("rgba(40,40,40,0.85)").unwrap().to_rgba8(),
        [40, 40, 40, 217]
    );
    assert_eq!(
        parse_css_color("rgba(255,215,0,0.35)").unwrap().to_rgba8(),
        [255, 215, 0, 89]
    );
    assert_eq!(
        parse_css_color("rgba(245,179,39,1)").unwrap().to_rgba8(),
        [245, 179, 39, 255]
    );
}

#[test]
fn parses_space_separated_and_percent_alpha() {
    assert_eq!(
        parse_css_color("rgb(255 0 0 / 50%)").unwrap().to_rgba8(),
        [255, 0, 0, 128]
    );
    assert_eq!(
        parse_css_color("RGB(0, 128, 0)").unwrap().to_rgba8(),
        [0, 128, 0, 255]
    );
}

#[test]
fn parses_hsl() {
    let c = parse_css_color("hsl(0, 100%, 50%)").unwrap();
    assert!((c.r - 1.0).abs() < 1e-9);
    assert!(c.g.abs() < 1e-9);
    assert!(c.b.abs() < 1e-9);

    let c = parse_css_color("hsla(120deg 100% 25% / 0.5)").unwrap();
    assert!((c.a - 0.5).abs() < 1e-9);
}

#[test]
fn keywords_and_garbage() {
    assert_eq!(parse_css_color("gold").unwrap().to_rgba8(), [255, 215, 0, 255]);
    assert_eq!(parse_css_color("transparent").unwrap().a, 0.0);
    assert!(parse_css_color("not-a-color").is_none());
    assert!(parse_css_color("rgb(1,2)").is_none());
    assert!(parse_css_color("rgba(1,2,3,4,5)").is_none());
}
