use std::collections::VecDeque;

use crate::{
    animation::compose::compose,
    cache::{
        FrameProvider,
        entry::{CacheEntry, Frame},
    },
    foundation::{
        config::PlayerConfig,
        error::{FlipbookError, FlipbookResult},
        observe::Listeners,
    },
    pixels::{
        buffer::PixelBuffer,
        normalize::{Storage, normalize},
    },
    source::{DecodedPage, FrameSource},
};

/// Counters for diagnostics. They only ever grow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PlayerStats {
    pub pages_decoded: u64,
    pub frames_composited: u64,
    /// Entries dropped from the window to stay within `max_cache_size`.
    pub entries_evicted: u64,
    /// Entries produced during a rebuild only to serve as a compositing base.
    pub entries_discarded: u64,
}

/// Cyclic frame navigation over a [`FrameSource`] with a bounded window of decoded entries.
///
/// The window holds consecutive pages in playback order (wrapping from the last page to page
/// 0) and never exceeds [`Player::max_cache_size`] entries. Stepping forward past the window
/// decodes one page; stepping backward past it replays pages forward to rebuild a segment,
/// because residual frames can only be composited in order.
pub struct Player<S: FrameSource> {
    source: S,
    window: VecDeque<CacheEntry>,
    cursor: usize,
    max_cache_size: usize,
    page_count: u32,
    residual: bool,
    listeners: Listeners,
    stats: PlayerStats,
}

impl<S: FrameSource> Player<S> {
    /// Decode page 0 and size the window from it.
    ///
    /// The window holds `max(1, budget / first_entry_bytes)` entries.
    #[tracing::instrument(skip_all, fields(budget = config.cache_budget_bytes))]
    pub fn open(mut source: S, config: &PlayerConfig) -> FlipbookResult<Self> {
        let page_count = source.page_count();
        if page_count == 0 {
            return Err(FlipbookError::NoFramesAvailable);
        }
        let residual = source.stores_residual_frames();
        let mut stats = PlayerStats::default();

        let first = produce_entry(&mut source, 0, None, residual, &mut stats)?;
        if first.index() != 0 {
            let got = first.index();
            release_entry(&mut source, first);
            return Err(FlipbookError::cache_corruption(format!(
                "source returned page {got} when asked for page 0"
            )));
        }

        let first_bytes = first.memory_size().max(1);
        let max_cache_size = (config.cache_budget_bytes / first_bytes).max(1);
        tracing::debug!(
            page_count,
            residual,
            first_bytes,
            max_cache_size,
            "player opened"
        );

        let mut window = VecDeque::new();
        window.push_back(first);
        Ok(Self {
            source,
            window,
            cursor: 0,
            max_cache_size,
            page_count,
            residual,
            listeners: Listeners::new(),
            stats,
        })
    }

    /// Step to the following page, wrapping to page 0 after the last one.
    #[tracing::instrument(skip(self), fields(window = self.window.len()))]
    pub fn next(&mut self) -> FlipbookResult<&CacheEntry> {
        let current = self.current_entry()?.index();
        let target = (current + 1) % self.page_count;
        let len = self.window.len();

        if self.cursor + 1 < len && self.window[self.cursor + 1].index() == target {
            self.cursor += 1;
        } else if len == self.page_count as usize && self.window[0].index() == target {
            self.cursor = 0;
        } else if self.cursor + 1 == len {
            self.decode_forward(target)?;
        } else {
            return Err(FlipbookError::cache_corruption(format!(
                "cursor {} of {len} has no successor for page {target}",
                self.cursor
            )));
        }

        self.listeners.notify_invalidated();
        self.current_entry()
    }

    /// Step to the preceding page, wrapping to the last page before page 0.
    #[tracing::instrument(skip(self), fields(window = self.window.len()))]
    pub fn prev(&mut self) -> FlipbookResult<&CacheEntry> {
        let current = self.current_entry()?.index();
        let target = if current == 0 {
            self.page_count - 1
        } else {
            current - 1
        };
        let len = self.window.len();

        if self.cursor > 0 && self.window[self.cursor - 1].index() == target {
            self.cursor -= 1;
        } else if len == self.page_count as usize
            && self.window.back().map(CacheEntry::index) == Some(target)
        {
            self.cursor = len - 1;
        } else if self.cursor == 0 {
            self.rebuild(target)?;
        } else {
            return Err(FlipbookError::cache_corruption(format!(
                "cursor {} of {len} has no predecessor for page {target}",
                self.cursor
            )));
        }

        self.listeners.notify_invalidated();
        self.current_entry()
    }

    fn decode_forward(&mut self, target: u32) -> FlipbookResult<()> {
        let base = if target == 0 {
            None
        } else {
            self.window.back()
        };
        let entry = produce_entry(
            &mut self.source,
            target,
            base,
            self.residual,
            &mut self.stats,
        )?;
        if entry.index() != target {
            let got = entry.index();
            release_entry(&mut self.source, entry);
            return Err(FlipbookError::cache_corruption(format!(
                "source returned page {got} when asked for page {target}"
            )));
        }

        self.window.push_back(entry);
        while self.window.len() > self.max_cache_size {
            if let Some(old) = self.window.pop_front() {
                tracing::debug!(page = old.index(), "evict front");
                release_entry(&mut self.source, old);
                self.stats.entries_evicted += 1;
            }
        }
        self.cursor = self.window.len() - 1;
        Ok(())
    }

    /// Replay pages forward so the window gains a segment ending at `target`, then prepend it.
    ///
    /// Replay continues from the back entry when `target` lies after it, otherwise it
    /// restarts at page 0. Only pages from `target - count_to_cache` on are kept.
    fn rebuild(&mut self, target: u32) -> FlipbookResult<()> {
        let back_index = self
            .window
            .back()
            .map(CacheEntry::index)
            .ok_or(FlipbookError::NoFramesAvailable)?;
        let continue_from_back = target > back_index;

        let max = self.max_cache_size;
        let count_to_cache = (2 * max / 3).max(max.saturating_sub(self.window.len()));
        let cache_from = target.saturating_sub(u32::try_from(count_to_cache).unwrap_or(u32::MAX));

        let mut start = if continue_from_back { back_index + 1 } else { 0 };
        // Full frames need no compositing base, so there is nothing to replay.
        if !self.residual {
            start = start.max(cache_from);
        }
        tracing::debug!(
            target,
            start,
            cache_from,
            continue_from_back,
            "rebuild window segment"
        );

        let mut segment: Vec<CacheEntry> = Vec::new();
        let mut scratch: Option<CacheEntry> = None;
        for index in start..=target {
            let base = if index == 0 {
                None
            } else if let Some(last) = segment.last() {
                Some(last)
            } else if let Some(s) = scratch.as_ref() {
                Some(s)
            } else if continue_from_back {
                self.window.back()
            } else {
                None
            };
            let produced = produce_entry(
                &mut self.source,
                index,
                base,
                self.residual,
                &mut self.stats,
            );
            let produced = match produced {
                Ok(entry) => entry,
                Err(err) => {
                    release_all(&mut self.source, segment.into_iter().chain(scratch));
                    return Err(err);
                }
            };
            if index >= cache_from {
                segment.push(produced);
            } else if let Some(old) = scratch.replace(produced) {
                release_entry(&mut self.source, old);
                self.stats.entries_discarded += 1;
            }
        }
        if let Some(old) = scratch.take() {
            release_entry(&mut self.source, old);
            self.stats.entries_discarded += 1;
        }

        let last = segment.last().map(CacheEntry::index);
        if last != Some(target) {
            release_all(&mut self.source, segment);
            return Err(FlipbookError::cache_corruption(format!(
                "rebuild ended on page {last:?} instead of page {target}"
            )));
        }

        while !self.window.is_empty() && self.window.len() + segment.len() > max {
            if let Some(old) = self.window.pop_back() {
                tracing::debug!(page = old.index(), "evict back");
                release_entry(&mut self.source, old);
                self.stats.entries_evicted += 1;
            }
        }
        if segment.len() > max {
            let excess = segment.len() - max;
            release_all(&mut self.source, segment.drain(..excess));
            self.stats.entries_discarded += excess as u64;
        }

        let seg_len = segment.len();
        for entry in segment.into_iter().rev() {
            self.window.push_front(entry);
        }
        self.cursor = seg_len - 1;
        Ok(())
    }

    pub fn current_entry(&self) -> FlipbookResult<&CacheEntry> {
        self.window
            .get(self.cursor)
            .ok_or(FlipbookError::NoFramesAvailable)
    }

    pub fn current_frame(&self) -> FlipbookResult<&Frame> {
        self.current_entry().map(CacheEntry::frame)
    }

    pub fn current_effective_bitmap(&self) -> FlipbookResult<&PixelBuffer> {
        self.current_entry().map(CacheEntry::effective)
    }

    pub fn frames_number(&self) -> u32 {
        self.page_count
    }

    pub fn width(&self) -> FlipbookResult<u32> {
        self.current_effective_bitmap().map(PixelBuffer::width)
    }

    pub fn height(&self) -> FlipbookResult<u32> {
        self.current_effective_bitmap().map(PixelBuffer::height)
    }

    pub fn max_cache_size(&self) -> usize {
        self.max_cache_size
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Page indices held by the window, front to back.
    pub fn window_indices(&self) -> Vec<u32> {
        self.window.iter().map(CacheEntry::index).collect()
    }

    /// Page index under the cursor.
    pub fn cursor_index(&self) -> Option<u32> {
        self.window.get(self.cursor).map(CacheEntry::index)
    }

    pub fn stats(&self) -> PlayerStats {
        self.stats
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return every held page lease and hand the source back.
    pub fn into_source(mut self) -> S {
        let window = std::mem::take(&mut self.window);
        release_all(&mut self.source, window);
        self.source
    }
}

impl<S: FrameSource> FrameProvider for Player<S> {
    fn current_entry(&self) -> FlipbookResult<&CacheEntry> {
        Player::current_entry(self)
    }

    fn listeners(&self) -> &Listeners {
        &self.listeners
    }
}

impl<S: FrameSource> std::fmt::Debug for Player<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("page_count", &self.page_count)
            .field("residual", &self.residual)
            .field("max_cache_size", &self.max_cache_size)
            .field("window", &self.window_indices())
            .field("cursor", &self.cursor)
            .field("stats", &self.stats)
            .finish()
    }
}

/// Decode, normalize and (for residual sources) composite one page.
///
/// The page lease is returned as soon as normalization owns its pixels, and on every error
/// path.
fn produce_entry<S: FrameSource>(
    source: &mut S,
    index: u32,
    base: Option<&CacheEntry>,
    residual: bool,
    stats: &mut PlayerStats,
) -> FlipbookResult<CacheEntry> {
    let DecodedPage {
        index: decoded,
        bitmap,
        meta,
        lease,
    } = source.decode_page(index)?;
    stats.pages_decoded += 1;

    let normalized = match normalize(&bitmap) {
        Ok(n) => n,
        Err(err) => {
            source.release_page(lease);
            return Err(err);
        }
    };
    drop(bitmap);
    let lease = match normalized.storage {
        Storage::Owned => {
            source.release_page(lease);
            None
        }
        Storage::Borrowed => Some(lease),
    };
    let mut frame = Frame::new(decoded, normalized, meta, lease);

    let composited = match base {
        Some(prev) if residual && decoded != 0 => match compose(prev, &frame) {
            Ok(canvas) => canvas,
            Err(err) => {
                if let Some(lease) = frame.take_lease() {
                    source.release_page(lease);
                }
                return Err(err);
            }
        },
        _ => None,
    };
    if composited.is_some() {
        stats.frames_composited += 1;
    }
    tracing::trace!(
        page = decoded,
        borrowed = frame.is_borrowed(),
        composited = composited.is_some(),
        "produced entry"
    );
    Ok(CacheEntry::new(frame, composited))
}

fn release_entry<S: FrameSource>(source: &mut S, entry: CacheEntry) {
    if let Some(lease) = entry.into_lease() {
        source.release_page(lease);
    }
}

fn release_all<S: FrameSource>(source: &mut S, entries: impl IntoIterator<Item = CacheEntry>) {
    for entry in entries {
        release_entry(source, entry);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/player.rs"]
mod tests;
