use super::*;

#[test]
fn inches_convert_to_exact_twips() {
    assert_eq!(Length::inches(0.5).twips(), 720);
    assert_eq!(Length::inches(0.8).twips(), 1152);
    assert_eq!(Length::inches(3.0).twips(), 4320);
    assert_eq!(Length::inches(0.6).twips(), 864);
    assert_eq!(Length::inches(1.0).twips(), 1440);
    assert_eq!(Length::inches(0.75).emu(), 685_800);
}

#[test]
fn scale_keeps_aspect_ratio() {
    let w = Length::inches(7.0);
    assert_eq!(w.scale(1, 2), Length::inches(3.5));
    assert_eq!(w.scale(200, 400).emu(), w.emu() / 2);
    assert_eq!(w.scale(5, 0), Length::ZERO);
}

#[test]
fn lengths_sum() {
    let total: Length = [0.5, 0.8, 3.0, 0.8, 0.6, 1.0]
        .into_iter()
        .map(Length::inches)
        .sum();
    assert_eq!(total.twips(), 9648);
}

#[test]
fn font_sizes_are_half_points() {
    assert_eq!(Pt(14).half_points(), 28);
    assert_eq!(Pt(9).half_points(), 18);
}

#[test]
fn colors_render_as_hex() {
    assert_eq!(Rgb8::BLUE.to_hex(), "0000FF");
    assert_eq!(Rgb8::new(18, 171, 255).to_hex(), "12ABFF");
}
