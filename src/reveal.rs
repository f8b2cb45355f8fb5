use std::time::Duration;

use bevy::prelude::Resource;

use crate::page::{PageLayout, HEADER_HEIGHT, NAV_LINKS};

pub const REVEAL_TRIGGER: f32 = 0.8;
pub const SOLUTIONS_TRIGGER: f32 = 0.6;
pub const SCROLLED_THRESHOLD: f32 = 5.0;
pub const THROTTLE: Duration = Duration::from_millis(50);
/// First reveal pass after mount.
pub const INITIAL_PASS_DELAY: Duration = Duration::from_millis(300);
/// Solutions elements get their extra, earlier rule this long after the first pass.
pub const SOLUTIONS_ARM_DELAY: Duration = Duration::from_millis(500);
pub const INITIAL_VIEW_DELAY: Duration = Duration::from_millis(100);

/// `top` and `bottom` are relative to the top of the viewport.
pub fn is_revealed(top: f32, bottom: f32, viewport_height: f32, trigger: f32) -> bool {
    top < viewport_height * trigger && bottom > 0.0
}

/// Admits one pass `interval` after the first request of a burst; requests
/// made while a pass is pending are folded into it.
#[derive(Clone, Debug)]
pub struct Throttle {
    interval: Duration,
    pending: Option<Duration>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Throttle {
        Throttle {
            interval,
            pending: None,
        }
    }

    pub fn request(&mut self, now: Duration) {
        if self.pending.is_none() {
            self.pending = Some(now + self.interval);
        }
    }

    pub fn poll(&mut self, now: Duration) -> bool {
        match self.pending {
            Some(due) if now >= due => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

/// One sticky flag per page element.
#[derive(Clone, Debug)]
pub struct RevealTracker {
    revealed: Vec<bool>,
    mounted_at: Duration,
    initial_pass_done: bool,
}

impl RevealTracker {
    pub fn new(elements: usize, now: Duration) -> RevealTracker {
        RevealTracker {
            revealed: vec![false; elements],
            mounted_at: now,
            initial_pass_done: false,
        }
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|r| **r).count()
    }

    fn solutions_armed(&self, now: Duration) -> bool {
        now >= self.mounted_at + INITIAL_PASS_DELAY + SOLUTIONS_ARM_DELAY
    }

    /// Whether the delayed first pass is due now.
    fn take_initial_pass(&mut self, now: Duration) -> bool {
        if !self.initial_pass_done && now >= self.mounted_at + INITIAL_PASS_DELAY {
            self.initial_pass_done = true;
            return true;
        }
        false
    }

    /// Reveals every element currently inside its trigger band. Returns how
    /// many elements were newly revealed.
    pub fn pass(&mut self, layout: &PageLayout, scroll_y: f32, viewport_height: f32, now: Duration) -> usize {
        let armed = self.solutions_armed(now);
        let mut newly = 0;
        for (element, revealed) in layout.elements.iter().zip(self.revealed.iter_mut()) {
            if *revealed {
                continue;
            }
            let top = element.top - scroll_y;
            let bottom = element.bottom - scroll_y;
            // Solutions elements follow the general rule too; once armed they
            // also reveal anywhere above 0.6 of the viewport.
            let visible = is_revealed(top, bottom, viewport_height, REVEAL_TRIGGER)
                || (element.in_solutions() && armed && top < viewport_height * SOLUTIONS_TRIGGER);
            if visible {
                *revealed = true;
                newly += 1;
            }
        }
        newly
    }
}

#[derive(Clone, Debug)]
pub struct HeaderState {
    pub scrolled: bool,
    initial_view: bool,
    clear_at: Option<Duration>,
}

impl HeaderState {
    pub fn new() -> HeaderState {
        HeaderState {
            scrolled: false,
            initial_view: true,
            clear_at: None,
        }
    }

    /// True until shortly after the first scroll; never comes back.
    pub fn initial_view(&self) -> bool {
        self.initial_view
    }

    pub fn update(&mut self, scroll_y: f32, now: Duration) {
        self.scrolled = scroll_y > SCROLLED_THRESHOLD;
        if self.scrolled && self.initial_view && self.clear_at.is_none() {
            self.clear_at = Some(now + INITIAL_VIEW_DELAY);
        }
        if self.clear_at.is_some_and(|at| now >= at) {
            self.initial_view = false;
        }
    }
}

impl Default for HeaderState {
    fn default() -> Self {
        HeaderState::new()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MobileNav {
    pub open: bool,
}

impl MobileNav {
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Closes the menu and returns the scroll position that puts the linked
    /// section just below the header.
    pub fn follow(&mut self, link: usize, layout: &PageLayout) -> Option<f32> {
        let (_, id) = NAV_LINKS.get(link)?;
        self.close();
        layout.section_top(id).map(|top| (top - HEADER_HEIGHT).max(0.0))
    }
}

/// Everything the page shell tracks between frames.
#[derive(Resource, Clone, Debug)]
pub struct PageState {
    pub layout: PageLayout,
    pub tracker: RevealTracker,
    pub header: HeaderState,
    pub nav: MobileNav,
    throttle: Throttle,
    last_scroll: f32,
}

impl PageState {
    pub fn new(viewport_height: f32, now: Duration) -> PageState {
        let layout = PageLayout::new(viewport_height);
        PageState {
            tracker: RevealTracker::new(layout.elements.len(), now),
            layout,
            header: HeaderState::new(),
            nav: MobileNav::default(),
            throttle: Throttle::new(THROTTLE),
            last_scroll: 0.0,
        }
    }

    /// Recomputes the layout for a new viewport height. Reveal flags carry
    /// over since the element list does not change.
    pub fn relayout(&mut self, viewport_height: f32) {
        self.layout = PageLayout::new(viewport_height);
    }

    /// Returns the number of newly revealed elements.
    pub fn update(&mut self, scroll_y: f32, viewport_height: f32, now: Duration) -> usize {
        self.header.update(scroll_y, now);
        if scroll_y != self.last_scroll {
            self.last_scroll = scroll_y;
            self.throttle.request(now);
        }
        let initial = self.tracker.take_initial_pass(now);
        let throttled = self.throttle.poll(now);
        if initial || throttled {
            self.tracker.pass(&self.layout, scroll_y, viewport_height, now)
        } else {
            0
        }
    }
}
