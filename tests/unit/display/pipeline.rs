use std::sync::atomic::AtomicUsize;

use super::*;
use crate::{
    cache::Player,
    foundation::{
        config::PlayerConfig,
        core::AnimationMeta,
        error::{FlipbookError, FlipbookResult},
    },
    pixels::raw::{RawBitmap, RawPixels},
    source::memory::MemorySource,
};

/// 3x2 gray page holding 0..6 row-major, followed by an all-white page.
fn gray_player() -> Player<MemorySource> {
    let src = MemorySource::new(false)
        .with_page(
            RawBitmap::gray8(3, 2, vec![0, 1, 2, 3, 4, 5]).unwrap(),
            AnimationMeta::default(),
        )
        .with_page(
            RawBitmap::gray8(3, 2, vec![255; 6]).unwrap(),
            AnimationMeta::default(),
        );
    Player::open(src, &PlayerConfig::default()).unwrap()
}

fn single_page_player(bitmap: RawBitmap) -> Player<MemorySource> {
    let src = MemorySource::new(false).with_page(bitmap, AnimationMeta::default());
    Player::open(src, &PlayerConfig::default()).unwrap()
}

#[derive(Default)]
struct Counter(AtomicUsize);

impl Counter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl InvalidationListener for Counter {
    fn invalidated(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn subscribe_counter(hub: &Listeners) -> Arc<Counter> {
    let counter = Arc::new(Counter::default());
    let listener: Arc<dyn InvalidationListener> = counter.clone();
    hub.subscribe(Arc::downgrade(&listener));
    counter
}

struct EmptyProvider {
    listeners: Listeners,
}

impl FrameProvider for EmptyProvider {
    fn current_entry(&self) -> FlipbookResult<&CacheEntry> {
        Err(FlipbookError::NoFramesAvailable)
    }

    fn listeners(&self) -> &Listeners {
        &self.listeners
    }
}

#[test]
fn identity_output_shares_the_frame_buffer() {
    let player = single_page_player(RawBitmap::rgba8(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap());
    let mut pipeline = DisplayPipeline::new(TransformState::default()).unwrap();
    pipeline.attach(&player);

    let out = pipeline.output(&player).unwrap();
    let frame = player.current_effective_bitmap().unwrap();
    assert_eq!(out, frame);
    assert!(out.shares_samples_with(frame));
}

#[test]
fn quarter_turn_is_counter_clockwise() {
    let player = gray_player();
    let mut pipeline = DisplayPipeline::new(TransformState {
        rotation: Rotation::Deg90,
        ..TransformState::default()
    })
    .unwrap();

    let out = pipeline.output(&player).unwrap();
    assert_eq!((out.width(), out.height()), (2, 3));
    // Display row 0 is the source's right-hand column, read top to bottom.
    assert_eq!(out.pixel_string(0, 0).unwrap(), "L(2)");
    assert_eq!(out.pixel_string(1, 0).unwrap(), "L(5)");
    assert_eq!(out.pixel_string(0, 2).unwrap(), "L(0)");
}

#[test]
fn probe_inverts_quarter_turn() {
    let player = gray_player();
    let pipeline = DisplayPipeline::new(TransformState {
        rotation: Rotation::Deg90,
        ..TransformState::default()
    })
    .unwrap();

    // srcY = x, srcX = W - 1 - y
    let probe = pipeline.probe(&player, 1, 0).unwrap();
    assert_eq!((probe.source_x, probe.source_y), (1, 0));
    assert_eq!(probe.value, "L(1)");

    let probe = pipeline.probe(&player, 2, 1).unwrap();
    assert_eq!((probe.source_x, probe.source_y), (0, 1));
    assert_eq!(probe.value, "L(3)");

    assert!(pipeline.probe(&player, 3, 0).is_none());
    assert!(pipeline.probe(&player, 0, 2).is_none());
}

#[test]
fn probe_agrees_with_output_for_every_geometry() {
    let player = gray_player();
    let rotations = [Rotation::Deg0, Rotation::Deg90, Rotation::Deg180, Rotation::Deg270];
    for rotation in rotations {
        for (flip_horizontal, flip_vertical) in [(false, false), (true, false), (false, true), (true, true)] {
            let mut pipeline = DisplayPipeline::new(TransformState {
                rotation,
                flip_horizontal,
                flip_vertical,
                ..TransformState::default()
            })
            .unwrap();
            let out = pipeline.output(&player).unwrap().clone();
            for y in 0..out.height() {
                for x in 0..out.width() {
                    let probe = pipeline.probe(&player, y, x).unwrap();
                    assert_eq!(
                        Some(probe.value),
                        out.pixel_string(x, y),
                        "{rotation:?} h={flip_horizontal} v={flip_vertical} at ({x}, {y})"
                    );
                }
            }
        }
    }
}

#[test]
fn navigation_invalidates_attached_pipeline() {
    let mut player = gray_player();
    let mut pipeline = DisplayPipeline::new(TransformState::default()).unwrap();
    pipeline.attach(&player);
    let widget = subscribe_counter(pipeline.listeners());

    assert_eq!(pipeline.output(&player).unwrap().pixel_string(1, 0).unwrap(), "L(1)");
    assert!(pipeline.is_valid());

    player.next().unwrap();
    assert!(!pipeline.is_valid());
    assert_eq!(widget.count(), 1);
    assert_eq!(pipeline.output(&player).unwrap().pixel_string(1, 0).unwrap(), "L(255)");
    assert!(pipeline.is_valid());
}

#[test]
fn detached_pipeline_is_not_notified() {
    let mut player = gray_player();
    let mut pipeline = DisplayPipeline::new(TransformState::default()).unwrap();
    pipeline.attach(&player);
    assert!(pipeline.detach(&player));
    assert!(!pipeline.detach(&player));

    pipeline.output(&player).unwrap();
    player.next().unwrap();
    assert!(pipeline.is_valid());
    assert!(player.listeners().is_empty());
}

#[test]
fn setters_invalidate_only_on_change() {
    let player = gray_player();
    let mut pipeline = DisplayPipeline::new(TransformState::default()).unwrap();
    let widget = subscribe_counter(pipeline.listeners());
    pipeline.output(&player).unwrap();

    assert!(!pipeline.set_rotation(Rotation::Deg0));
    assert!(!pipeline.set_flip_vertical(false));
    assert!(pipeline.is_valid());
    assert_eq!(widget.count(), 0);

    assert!(pipeline.set_rotation(Rotation::Deg180));
    assert!(!pipeline.is_valid());
    assert!(pipeline.set_swizzle(ChannelSwizzle::Red));
    assert!(pipeline.set_tone_map(ToneMapMode::Reinhard));
    assert!(pipeline.set_flip_horizontal(true));
    assert!(pipeline.set_gamma(2.2).unwrap());
    assert!(!pipeline.set_gamma(2.2).unwrap());
    assert_eq!(widget.count(), 5);

    assert!(matches!(pipeline.set_gamma(0.0), Err(FlipbookError::Validation(_))));
    assert_eq!(pipeline.state().gamma, 2.2);

    let state = *pipeline.state();
    assert!(!pipeline.set_state(state).unwrap());
    assert!(pipeline.set_state(TransformState::default()).unwrap());
    assert_eq!(widget.count(), 6);
}

#[test]
fn gamma_brightens_integer_frames() {
    let player = single_page_player(RawBitmap::gray8(1, 1, vec![64]).unwrap());
    let mut pipeline = DisplayPipeline::new(TransformState {
        gamma: 2.0,
        ..TransformState::default()
    })
    .unwrap();
    assert_eq!(pipeline.output(&player).unwrap().pixel_string(0, 0).unwrap(), "L(128)");
}

#[test]
fn hdr_frames_are_tone_mapped_without_gamma() {
    let raw = RawBitmap::new(1, 1, RawPixels::GrayF32(Arc::new(vec![0.25]))).unwrap();
    let player = single_page_player(raw);
    let mut pipeline = DisplayPipeline::new(TransformState {
        gamma: 2.2,
        ..TransformState::default()
    })
    .unwrap();

    let out = pipeline.output(&player).unwrap();
    assert_eq!(out.pixel_string(0, 0).unwrap(), "L(64)");
    // probing reads the untransformed source value
    assert_eq!(pipeline.probe(&player, 0, 0).unwrap().value, "L(0.2500)");
}

#[test]
fn alpha_swizzle_on_rgb_is_opaque_gray() {
    let player = single_page_player(
        RawBitmap::new(1, 1, RawPixels::Rgb8(Arc::new(vec![10, 20, 30]))).unwrap(),
    );
    let mut pipeline = DisplayPipeline::new(TransformState {
        swizzle: ChannelSwizzle::Alpha,
        ..TransformState::default()
    })
    .unwrap();
    assert_eq!(pipeline.output(&player).unwrap().pixel_string(0, 0).unwrap(), "L(255)");

    pipeline.set_swizzle(ChannelSwizzle::SwapRedBlue);
    assert_eq!(
        pipeline.output(&player).unwrap().pixel_string(0, 0).unwrap(),
        "RGB(30, 20, 10)"
    );
}

#[test]
fn missing_frame_yields_no_result() {
    let provider = EmptyProvider {
        listeners: Listeners::new(),
    };
    let mut pipeline = DisplayPipeline::new(TransformState::default()).unwrap();
    pipeline.attach(&provider);
    assert!(pipeline.output(&provider).is_none());
    assert!(pipeline.probe(&provider, 0, 0).is_none());
    assert!(!pipeline.is_valid());
}

#[test]
fn invalid_initial_state_is_rejected() {
    let err = DisplayPipeline::new(TransformState {
        gamma: f64::NAN,
        ..TransformState::default()
    })
    .unwrap_err();
    assert!(matches!(err, FlipbookError::Validation(_)));
}
