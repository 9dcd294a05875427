use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    cache::{CacheEntry, FrameProvider},
    display::{
        tonemap::tone_map,
        transform::{ChannelSwizzle, Rotation, ToneMapMode, TransformState, validate_gamma},
    },
    foundation::{
        error::FlipbookResult,
        observe::{InvalidationListener, Listeners, SubscriptionId},
    },
    pixels::buffer::PixelBuffer,
};

/// Run every display stage over `entry`'s effective bitmap.
///
/// Stages that would not change anything are skipped, so an identity `state` returns a buffer
/// sharing memory with the entry.
#[tracing::instrument(skip_all, fields(page = entry.index()))]
pub fn render(entry: &CacheEntry, state: &TransformState) -> PixelBuffer {
    let source = entry.effective();
    let hdr = entry.frame().flags().hdr || source.format().is_hdr();

    let mut out = if hdr {
        tone_map(source, state.tone_map)
    } else {
        source.clone()
    };
    if state.rotation != Rotation::Deg0 {
        out = out.rotated(state.rotation);
    }
    if state.flip_horizontal {
        out.flip_horizontal();
    }
    if state.flip_vertical {
        out.flip_vertical();
    }
    if !hdr && state.gamma != 1.0 {
        out.apply_gamma(state.gamma);
    }
    out.swizzled(state.swizzle)
}

/// A pixel read back through the display transform.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PixelProbe {
    pub source_x: u32,
    pub source_y: u32,
    /// Untransformed value, e.g. `RGBA(255, 0, 0, 255)`.
    pub value: String,
}

/// Map display position `(x, y)` back to `entry`'s effective bitmap and read it.
///
/// `None` when the position lies outside the displayed image.
pub fn probe_entry(entry: &CacheEntry, state: &TransformState, y: u32, x: u32) -> Option<PixelProbe> {
    let source = entry.effective();
    let (w, h) = (source.width(), source.height());
    let (dw, dh) = state.rotation.display_dimensions(w, h);
    if x >= dw || y >= dh {
        return None;
    }

    let rx = if state.flip_horizontal { dw - 1 - x } else { x };
    let ry = if state.flip_vertical { dh - 1 - y } else { y };
    let (source_x, source_y) = state.rotation.source_coords(rx, ry, w, h);
    let value = source.pixel_string(source_x, source_y)?;
    Some(PixelProbe {
        source_x,
        source_y,
        value,
    })
}

/// Shared between the pipeline and the provider it is attached to.
#[derive(Debug, Default)]
struct PipelineSignal {
    stale: AtomicBool,
    listeners: Listeners,
}

impl InvalidationListener for PipelineSignal {
    fn invalidated(&self) {
        self.stale.store(true, Ordering::SeqCst);
        self.listeners.notify_invalidated();
    }
}

/// Lazily rendered view of a [`FrameProvider`]'s current entry.
///
/// The pipeline does not own the provider: it is handed one on every call and learns about
/// frame changes through the subscription made in [`DisplayPipeline::attach`]. The rendered
/// output is cached until a parameter changes or the provider reports a new frame.
#[derive(Debug)]
pub struct DisplayPipeline {
    state: TransformState,
    signal: Arc<PipelineSignal>,
    subscription: Option<SubscriptionId>,
    output: Option<PixelBuffer>,
}

impl DisplayPipeline {
    pub fn new(state: TransformState) -> FlipbookResult<Self> {
        state.validate()?;
        Ok(Self {
            state,
            signal: Arc::new(PipelineSignal::default()),
            subscription: None,
            output: None,
        })
    }

    /// Subscribe to `provider`'s invalidations, replacing any earlier subscription on it.
    pub fn attach<P: FrameProvider + ?Sized>(&mut self, provider: &P) {
        if let Some(id) = self.subscription.take() {
            provider.listeners().unsubscribe(id);
        }
        let signal: Arc<dyn InvalidationListener> = self.signal.clone();
        self.subscription = Some(provider.listeners().subscribe(Arc::downgrade(&signal)));
        self.invalidate();
    }

    /// Returns whether a subscription was removed.
    pub fn detach<P: FrameProvider + ?Sized>(&mut self, provider: &P) -> bool {
        match self.subscription.take() {
            Some(id) => provider.listeners().unsubscribe(id),
            None => false,
        }
    }

    /// Hub notified whenever the output goes stale.
    pub fn listeners(&self) -> &Listeners {
        &self.signal.listeners
    }

    pub fn state(&self) -> &TransformState {
        &self.state
    }

    /// True when [`DisplayPipeline::output`] would return the cached buffer.
    pub fn is_valid(&self) -> bool {
        self.output.is_some() && !self.signal.stale.load(Ordering::SeqCst)
    }

    pub fn invalidate(&self) {
        self.signal.invalidated();
    }

    pub fn set_rotation(&mut self, rotation: Rotation) -> bool {
        self.update(|s| &mut s.rotation, rotation)
    }

    pub fn set_flip_horizontal(&mut self, flip: bool) -> bool {
        self.update(|s| &mut s.flip_horizontal, flip)
    }

    pub fn set_flip_vertical(&mut self, flip: bool) -> bool {
        self.update(|s| &mut s.flip_vertical, flip)
    }

    pub fn set_tone_map(&mut self, mode: ToneMapMode) -> bool {
        self.update(|s| &mut s.tone_map, mode)
    }

    pub fn set_gamma(&mut self, gamma: f64) -> FlipbookResult<bool> {
        validate_gamma(gamma)?;
        Ok(self.update(|s| &mut s.gamma, gamma))
    }

    pub fn set_swizzle(&mut self, swizzle: ChannelSwizzle) -> bool {
        self.update(|s| &mut s.swizzle, swizzle)
    }

    pub fn set_state(&mut self, state: TransformState) -> FlipbookResult<bool> {
        state.validate()?;
        Ok(self.update(|s| s, state))
    }

    fn update<T: PartialEq>(
        &mut self,
        field: impl FnOnce(&mut TransformState) -> &mut T,
        value: T,
    ) -> bool {
        let slot = field(&mut self.state);
        if *slot == value {
            return false;
        }
        *slot = value;
        self.invalidate();
        true
    }

    /// The rendered current frame, recomputed if stale. `None` when the provider has no frame.
    pub fn output<P: FrameProvider + ?Sized>(&mut self, provider: &P) -> Option<&PixelBuffer> {
        let stale = self.signal.stale.swap(false, Ordering::SeqCst);
        if stale || self.output.is_none() {
            self.output = provider
                .current_entry()
                .ok()
                .map(|entry| render(entry, &self.state));
        }
        self.output.as_ref()
    }

    /// Read the source pixel under display position `(x, y)` of the current frame.
    pub fn probe<P: FrameProvider + ?Sized>(&self, provider: &P, y: u32, x: u32) -> Option<PixelProbe> {
        let entry = provider.current_entry().ok()?;
        probe_entry(entry, &self.state, y, x)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/pipeline.rs"]
mod tests;
