use std::time::Duration;

use bevy::math::Vec2;
use bevy::prelude::Resource;

use crate::settings::GridSettings;

/// Tracks whether the pointer is "moving": every move re-arms a deadline and
/// the flag drops once the deadline passes without another move.
#[derive(Clone, Debug, Default)]
pub struct PointerActivity {
    position: Vec2,
    moving: bool,
    deadline: Duration,
}

impl PointerActivity {
    pub fn pointer_moved(&mut self, position: Vec2, now: Duration, debounce: Duration) {
        self.position = position;
        self.moving = true;
        self.deadline = now + debounce;
    }

    pub fn update(&mut self, now: Duration) {
        if self.moving && now >= self.deadline {
            self.moving = false;
        }
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLine {
    pub from: Vec2,
    pub to: Vec2,
    pub alpha: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightCell {
    /// Grid intersection, in window pixels.
    pub at: Vec2,
    pub opacity: f32,
    /// Opacity of the small glow marker, for intersections very close to the pointer.
    pub glow: Option<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Highlight {
    /// Degrees, 0..360 across the viewport width.
    pub hue: f32,
    pub cells: Vec<HighlightCell>,
}

/// `max` at the pointer, falling linearly to 0 at `radius`.
pub fn highlight_opacity(distance: f32, radius: f32, max: f32) -> f32 {
    if radius <= 0.0 || distance >= radius {
        0.0
    } else {
        max * (1.0 - distance / radius)
    }
}

/// Two-tier background grid in window pixel coordinates, with a highlight that
/// follows the pointer while it is moving.
#[derive(Resource, Clone, Debug)]
pub struct InteractiveGrid {
    pub activity: PointerActivity,
    viewport: Vec2,
    settings: GridSettings,
}

impl InteractiveGrid {
    pub fn new(settings: &GridSettings, viewport: Vec2) -> InteractiveGrid {
        InteractiveGrid {
            activity: PointerActivity::default(),
            viewport,
            settings: settings.clone(),
        }
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn pointer_moved(&mut self, position: Vec2, now: Duration) {
        let debounce = Duration::from_millis(self.settings.debounce_millis);
        self.activity.pointer_moved(position, now, debounce);
    }

    pub fn tick(&mut self, now: Duration) {
        self.activity.update(now);
    }

    /// Fine lines first, then the coarse ones over them.
    pub fn lines(&self) -> Vec<GridLine> {
        let mut lines = Vec::new();
        for (spacing, alpha) in [
            (self.settings.cell_size, self.settings.fine_alpha),
            (self.settings.coarse_cell_size, self.settings.coarse_alpha),
        ] {
            if spacing <= 0.0 {
                continue;
            }
            let mut x = 0.0;
            while x < self.viewport.x {
                lines.push(GridLine {
                    from: Vec2::new(x, 0.0),
                    to: Vec2::new(x, self.viewport.y),
                    alpha,
                });
                x += spacing;
            }
            let mut y = 0.0;
            while y < self.viewport.y {
                lines.push(GridLine {
                    from: Vec2::new(0.0, y),
                    to: Vec2::new(self.viewport.x, y),
                    alpha,
                });
                y += spacing;
            }
        }
        lines
    }

    pub fn highlight(&self) -> Option<Highlight> {
        if !self.activity.is_moving() || self.settings.cell_size <= 0.0 {
            return None;
        }
        let s = &self.settings;
        let pointer = self.activity.position();
        let hue = if self.viewport.x > 0.0 {
            (pointer.x / self.viewport.x * 360.0).clamp(0.0, 360.0)
        } else {
            0.0
        };

        let reach = (s.highlight_radius / s.cell_size).ceil() as i32;
        let nearest = (pointer / s.cell_size).round() * s.cell_size;
        let mut cells = Vec::new();
        for i in -reach..=reach {
            for j in -reach..=reach {
                let at = nearest + Vec2::new(i as f32, j as f32) * s.cell_size;
                let distance = at.distance(pointer);
                if distance > s.highlight_radius {
                    continue;
                }
                let opacity = highlight_opacity(distance, s.highlight_radius, s.max_opacity);
                let glow = (distance < s.glow_distance).then_some(opacity * 0.5);
                cells.push(HighlightCell { at, opacity, glow });
            }
        }
        Some(Highlight { hue, cells })
    }
}
