use super::*;

use image::GenericImageView;

fn decode(signature: &EncodedImage) -> image::DynamicImage {
    assert_eq!(signature.mime_type(), Some("image/png"));
    let bytes = signature.decode().expect("base64 payload");
    image::load_from_memory_with_format(&bytes, image::ImageFormat::Png).expect("png")
}

#[test]
fn untouched_pad_has_no_signature() {
    let mut pad = SignaturePad::new(320).expect("pad");
    assert_eq!((pad.width(), pad.height()), (320, SIGNATURE_HEIGHT));
    assert!(pad.signature().is_none());

    pad.end_stroke().expect("end without stroke");
    assert!(pad.signature().is_none());
}

#[test]
fn zero_width_surface_is_rejected() {
    assert!(matches!(
        SignaturePad::new(0),
        Err(SignatureError::InvalidSize { width: 0, .. })
    ));
}

#[test]
fn completed_stroke_captures_png_with_ink() {
    let mut pad = SignaturePad::new(300).expect("pad");
    pad.begin_stroke(Pos2::new(20.0, 100.0));
    pad.extend_stroke(Pos2::new(150.0, 60.0));
    pad.extend_stroke(Pos2::new(280.0, 140.0));
    assert!(pad.is_drawing());
    pad.end_stroke().expect("end");
    assert!(!pad.is_drawing());

    let image = decode(pad.signature().expect("signature"));
    assert_eq!(image.dimensions(), (300, SIGNATURE_HEIGHT));
    assert_eq!(image.get_pixel(0, 0).0[3], 0, "background stays transparent");
    assert!(image.pixels().any(|(_, _, px)| px.0[3] > 0));
}

#[test]
fn second_end_is_a_no_op() {
    let mut pad = SignaturePad::new(200).expect("pad");
    pad.begin_stroke(Pos2::new(10.0, 10.0));
    pad.extend_stroke(Pos2::new(50.0, 50.0));
    pad.end_stroke().expect("first end");
    let first = pad.signature().cloned().expect("signature");

    pad.end_stroke().expect("second end");
    assert_eq!(pad.signature(), Some(&first));
}

#[test]
fn moves_without_a_stroke_draw_nothing() {
    let mut pad = SignaturePad::new(200).expect("pad");
    let before = pad.revision();
    pad.extend_stroke(Pos2::new(50.0, 50.0));
    assert_eq!(pad.revision(), before);
    assert!(pad.pixels().iter().all(|byte| *byte == 0));
}

#[test]
fn clear_drops_signature_and_capture_yields_blank_png() {
    let mut pad = SignaturePad::new(240).expect("pad");
    pad.begin_stroke(Pos2::new(10.0, 10.0));
    pad.extend_stroke(Pos2::new(200.0, 180.0));
    pad.end_stroke().expect("end");
    assert!(pad.signature().is_some());

    pad.clear();
    assert!(pad.signature().is_none());

    pad.begin_stroke(Pos2::new(30.0, 30.0));
    pad.end_stroke().expect("tap without movement");
    assert!(pad.signature().is_none());

    let blank = pad.capture().expect("capture").clone();
    let image = decode(&blank);
    assert_eq!(image.dimensions(), (240, SIGNATURE_HEIGHT));
    assert!(image.pixels().all(|(_, _, px)| px.0[3] == 0));
}

fn held_at(origin: Pos2, position: Pos2) -> PointerSample {
    PointerSample {
        held: true,
        press_origin: Some(origin),
        position: Some(position),
    }
}

fn has_ink_near(pad: &SignaturePad, at: (u32, u32)) -> bool {
    let width = pad.width() as usize;
    (at.1 - 2..=at.1 + 2).any(|y| {
        (at.0 - 2..=at.0 + 2).any(|x| pad.pixels()[(y as usize * width + x as usize) * 4 + 3] > 0)
    })
}

#[test]
fn stroke_starts_where_the_button_went_down() {
    let mut pad = SignaturePad::new(300).expect("pad");
    // The first frame that sees the press already has the pointer further along.
    pad.track_pointer(held_at(Pos2::new(10.0, 100.0), Pos2::new(60.0, 100.0)))
        .expect("press");
    assert!(pad.is_drawing());
    assert!(has_ink_near(&pad, (12, 100)));

    pad.track_pointer(PointerSample::default()).expect("release");
    assert!(!pad.is_drawing());
    assert!(pad.signature().is_some());
}

#[test]
fn leaving_the_surface_ends_the_stroke_until_release() {
    let mut pad = SignaturePad::new(200).expect("pad");
    let origin = Pos2::new(20.0, 20.0);
    pad.track_pointer(held_at(origin, Pos2::new(80.0, 80.0))).expect("press");
    pad.track_pointer(held_at(origin, Pos2::new(250.0, 80.0))).expect("leave");
    assert!(!pad.is_drawing());
    let captured = pad.signature().cloned().expect("captured on leave");

    let revision = pad.revision();
    pad.track_pointer(held_at(origin, Pos2::new(100.0, 100.0))).expect("re-enter");
    assert!(!pad.is_drawing());
    assert_eq!(pad.revision(), revision);
    assert_eq!(pad.signature(), Some(&captured));

    pad.track_pointer(PointerSample::default()).expect("release");
    pad.track_pointer(held_at(Pos2::new(100.0, 100.0), Pos2::new(150.0, 150.0)))
        .expect("second press");
    assert!(pad.is_drawing());
    assert!(pad.revision() > revision);
}

#[test]
fn tap_without_movement_leaves_no_signature() {
    let mut pad = SignaturePad::new(200).expect("pad");
    let at = Pos2::new(40.0, 40.0);
    pad.track_pointer(held_at(at, at)).expect("press");
    pad.track_pointer(held_at(at, at)).expect("hold");
    pad.track_pointer(PointerSample::default()).expect("release");
    assert!(pad.signature().is_none());
    assert!(pad.pixels().iter().all(|byte| *byte == 0));
}
