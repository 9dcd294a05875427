use super::*;

#[test]
fn rotation_parses_degrees() {
    assert_eq!("90".parse::<Rotation>().unwrap(), Rotation::Deg90);
    assert_eq!(Rotation::try_from(270).unwrap(), Rotation::Deg270);
    assert_eq!(u16::from(Rotation::Deg180), 180);
    assert!(matches!(
        "45".parse::<Rotation>(),
        Err(FlipbookError::Validation(_))
    ));
    assert!("ninety".parse::<Rotation>().is_err());
}

#[test]
fn quarter_turns_swap_dimensions() {
    assert_eq!(Rotation::Deg0.display_dimensions(4, 3), (4, 3));
    assert_eq!(Rotation::Deg90.display_dimensions(4, 3), (3, 4));
    assert_eq!(Rotation::Deg180.display_dimensions(4, 3), (4, 3));
    assert_eq!(Rotation::Deg270.display_dimensions(4, 3), (3, 4));
}

#[test]
fn source_coords_rotate_counter_clockwise() {
    let (w, h) = (4, 3);
    // Top-left of a CCW-rotated image is the source's top-right corner.
    assert_eq!(Rotation::Deg90.source_coords(0, 0, w, h), (3, 0));
    assert_eq!(Rotation::Deg90.source_coords(2, 1, w, h), (2, 2));
    assert_eq!(Rotation::Deg180.source_coords(0, 0, w, h), (3, 2));
    assert_eq!(Rotation::Deg270.source_coords(0, 0, w, h), (0, 2));
    assert_eq!(Rotation::Deg270.source_coords(2, 3, w, h), (3, 0));
}

#[test]
fn enum_names_parse_leniently() {
    assert_eq!("Reinhard".parse::<ToneMapMode>().unwrap(), ToneMapMode::Reinhard);
    assert_eq!(
        "swap-red-blue".parse::<ChannelSwizzle>().unwrap(),
        ChannelSwizzle::SwapRedBlue
    );
    assert!("sepia".parse::<ChannelSwizzle>().is_err());
    assert!("filmic".parse::<ToneMapMode>().is_err());
}

#[test]
fn default_state_is_identity() {
    let state = TransformState::default();
    assert!(state.is_identity());
    assert!(state.validate().is_ok());

    let rotated = TransformState {
        rotation: Rotation::Deg90,
        ..state
    };
    assert!(!rotated.is_identity());
    // Tone mapping only touches HDR frames.
    let tone_mapped = TransformState {
        tone_map: ToneMapMode::Drago,
        ..state
    };
    assert!(tone_mapped.is_identity());
}

#[test]
fn gamma_must_be_positive_and_finite() {
    assert!(validate_gamma(2.2).is_ok());
    for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(validate_gamma(bad), Err(FlipbookError::Validation(_))));
    }
}

#[test]
fn rotation_serializes_as_degrees() {
    let json = serde_json::to_string(&TransformState {
        rotation: Rotation::Deg270,
        ..TransformState::default()
    })
    .unwrap();
    assert!(json.contains("\"rotation\":270"));
    assert!(json.contains("\"swizzle\":\"identity\""));
}
