//! Visibility-based pagination trigger.
//!
//! A [`TriggerSensor`] watches a sentinel element placed after the last
//! rendered item and fires once when it scrolls into view. The platform side
//! is abstracted behind [`VisibilityObserver`]; any host that can report
//! viewport visibility (an intersection API, scroll offsets in a terminal)
//! can drive a sensor.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Handle for a sentinel element in the host's render tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SentinelId(pub u64);

#[derive(Debug, Clone, Copy)]
pub struct ObserverConfig {
    /// Intersection ratio at which the sensor fires.
    pub threshold: f64,
    /// Extra rows/pixels beyond the viewport edge that still count as
    /// visible, so a fetch can start slightly before the sentinel shows.
    pub root_margin: f64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: 0.0,
        }
    }
}

/// One-shot "near end of list" signal.
///
/// `on_intersection` may be invoked by the observer any number of times while
/// the sentinel stays visible; the trigger flips false→true at most once per
/// arm cycle. [`TriggerSensor::reset`] re-arms it, after which a sentinel that
/// is still (or again) visible can re-fire on the next callback.
#[derive(Clone)]
pub struct TriggerSensor {
    threshold: f64,
    state: Arc<SensorState>,
}

struct SensorState {
    triggered: AtomicBool,
    intersecting: AtomicBool,
}

impl TriggerSensor {
    pub fn new(config: ObserverConfig) -> Self {
        Self {
            threshold: config.threshold,
            state: Arc::new(SensorState {
                triggered: AtomicBool::new(false),
                intersecting: AtomicBool::new(false),
            }),
        }
    }

    /// Observer callback entry point.
    pub fn on_intersection(&self, ratio: f64) {
        let visible = ratio >= self.threshold;
        self.state.intersecting.store(visible, Ordering::Relaxed);
        if visible {
            self.state.triggered.store(true, Ordering::Relaxed);
        }
    }

    pub fn has_triggered(&self) -> bool {
        self.state.triggered.load(Ordering::Relaxed)
    }

    pub fn is_intersecting(&self) -> bool {
        self.state.intersecting.load(Ordering::Relaxed)
    }

    /// Re-arm the sensor so the next intersection can fire again.
    pub fn reset(&self) {
        self.state.triggered.store(false, Ordering::Relaxed);
    }

    /// Callback suitable for [`VisibilityObserver::observe`].
    pub fn callback(&self) -> Box<dyn FnMut(f64) + Send> {
        let sensor = self.clone();
        Box::new(move |ratio| sensor.on_intersection(ratio))
    }
}

/// Capability for platforms that can report sentinel visibility.
pub trait VisibilityObserver {
    /// Start observing a sentinel; the callback receives the intersection
    /// ratio whenever visibility may have changed.
    fn observe(&mut self, sentinel: SentinelId, config: ObserverConfig, callback: ObserverCallback);

    /// Stop observing; the callback must not be invoked afterwards.
    fn unobserve(&mut self, sentinel: SentinelId);
}

pub type ObserverCallback = Box<dyn FnMut(f64) + Send>;

/// Scroll-offset observer for hosts without a native intersection API.
///
/// Sentinels are placed at a row in a virtual list; visibility is derived
/// from the current scroll offset and viewport height. The ratio is binary:
/// a one-row sentinel is either inside the (margin-extended) viewport or not.
#[derive(Default)]
pub struct OffsetObserver {
    viewport_rows: f64,
    scroll_offset: f64,
    targets: HashMap<SentinelId, Target>,
}

struct Target {
    row: f64,
    config: ObserverConfig,
    callback: ObserverCallback,
}

impl OffsetObserver {
    pub fn new(viewport_rows: f64) -> Self {
        Self {
            viewport_rows,
            scroll_offset: 0.0,
            targets: HashMap::new(),
        }
    }

    /// Move a sentinel to a new row, e.g. after more items rendered above it.
    pub fn place(&mut self, sentinel: SentinelId, row: f64) {
        if let Some(target) = self.targets.get_mut(&sentinel) {
            target.row = row;
        }
        self.notify();
    }

    pub fn set_viewport(&mut self, rows: f64) {
        self.viewport_rows = rows;
        self.notify();
    }

    pub fn set_scroll(&mut self, offset: f64) {
        self.scroll_offset = offset;
        self.notify();
    }

    fn notify(&mut self) {
        for target in self.targets.values_mut() {
            let top = self.scroll_offset - target.config.root_margin;
            let bottom = self.scroll_offset + self.viewport_rows + target.config.root_margin;
            let ratio = if target.row >= top && target.row < bottom {
                1.0
            } else {
                0.0
            };
            (target.callback)(ratio);
        }
    }
}

impl VisibilityObserver for OffsetObserver {
    fn observe(&mut self, sentinel: SentinelId, config: ObserverConfig, callback: ObserverCallback) {
        self.targets.insert(
            sentinel,
            Target {
                row: f64::INFINITY,
                config,
                callback,
            },
        );
    }

    fn unobserve(&mut self, sentinel: SentinelId) {
        self.targets.remove(&sentinel);
    }
}
