use std::time::{Duration, Instant};

use bevy::prelude::*;

/// A transient line of text shown in the bottom-left corner.
pub struct MessageText {
    pub text: String,
    pub start_time: Instant,
    pub duration: Duration,
}

impl MessageText {
    pub fn new(text: impl Into<String>, duration: Duration) -> MessageText {
        MessageText {
            text: text.into(),
            start_time: Instant::now(),
            duration,
        }
    }

    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.start_time) >= self.duration
    }
}

/// Toasts currently on screen, oldest first. Lives on the overlay text entity.
#[derive(Component, Default)]
pub struct Messages {
    pub messages: Vec<MessageText>,
}

impl Messages {
    pub fn show(&mut self, text: impl Into<String>) {
        self.messages.push(MessageText::new(text, Duration::from_secs(1)));
    }

    /// Drops expired messages and returns what is left, one per line.
    fn prune(&mut self, now: Instant) -> String {
        self.messages.retain(|m| !m.expired(now));
        self.messages
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_overlay)
            .add_systems(Update, show_messages);
    }
}

fn spawn_overlay(mut commands: Commands) {
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::srgb(0.0, 0.94, 1.0)),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
        GlobalZIndex(10),
        Messages::default(),
    ));
}

fn show_messages(mut overlay: Query<(&mut Text, &mut Messages)>) {
    let now = Instant::now();
    for (mut text, mut messages) in &mut overlay {
        let shown = messages.prune(now);
        if text.0 != shown {
            text.0 = shown;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_messages_are_dropped() {
        let now = Instant::now();
        let mut messages = Messages::default();
        messages.messages.push(MessageText {
            text: "old".into(),
            start_time: now - Duration::from_secs(2),
            duration: Duration::from_secs(1),
        });
        messages.messages.push(MessageText {
            text: "Paused".into(),
            start_time: now,
            duration: Duration::from_secs(1),
        });
        messages.messages.push(MessageText {
            text: "Network".into(),
            start_time: now,
            duration: Duration::from_secs(5),
        });
        assert_eq!(messages.prune(now), "Paused\nNetwork");
        assert_eq!(messages.messages.len(), 2);
    }
}
