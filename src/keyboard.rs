use std::collections::HashMap;
use std::time::{Duration, Instant};

use bevy::app::AppExit;
use bevy::input::ButtonInput;
use bevy::prelude::*;

use crate::backdrop::{Backdrop, FrameBudget, PageScroll, ResetBackdrop, Viewport};
use crate::digit_keys::{key_number, DIGIT_KEYS};
use crate::overlay::{MessageText, Messages};
use crate::page::NAV_LINKS;
use crate::reveal::PageState;

/// Defines a keyboard command to associate with a keypress.
/// Each command can have a different repeat rate.
pub struct KeyboardCommand {
    pub description: String,
    pub last_action_time: Instant,
    pub interval: Duration,
    pub action: KeyboardAction,
}

/// What a keyboard action can see and change. Backdrop switches and resets are
/// collected here and applied by [`handle_keypress`] afterwards.
pub struct KeyContext<'a> {
    pub budget: &'a mut FrameBudget,
    pub backdrop: Backdrop,
    pub switch_to: Option<Backdrop>,
    pub reset: bool,
    pub page: Option<&'a mut PageState>,
    pub scroll: &'a mut PageScroll,
    pub viewport_height: f32,
}

type KeyboardAction = fn(ctx: &mut KeyContext, key: KeyCode, shift: bool, messages: &mut Messages);

/// Contains the collection of keyboard commands.
#[derive(Component)]
pub struct KeyboardCommands {
    pub commands: HashMap<KeyCode, KeyboardCommand>,
}

impl KeyboardCommands {
    pub fn create() -> Self {
        let mut kb_cmds = KeyboardCommands {
            commands: HashMap::new(),
        };

        // Space: freeze / unfreeze the backdrop.
        kb_cmds.add_command(KeyCode::Space, "Pause", 250, pause);
        // N: advance 1 frame.
        kb_cmds.add_command(KeyCode::KeyN, "Advance 1 frame", 250, |ctx, _, _, _| ctx.budget.step(1));
        for key in DIGIT_KEYS {
            kb_cmds.add_command(key, "Select backdrop (menu open: follow link)", 250, select_number);
        }
        kb_cmds.add_command(KeyCode::Tab, "Next backdrop", 250, cycle_backdrop);
        kb_cmds.add_command(KeyCode::KeyR, "Reset backdrop", 250, |ctx, _, _, msgs| {
            ctx.reset = true;
            msgs.show(format!("{} reset", ctx.backdrop.label()));
        });
        kb_cmds.add_command(KeyCode::KeyM, "Toggle navigation menu", 250, toggle_menu);

        kb_cmds
    }

    pub fn add_command(&mut self, key: KeyCode, description: &str, interval_millis: u64, action: KeyboardAction) {
        self.commands.insert(
            key,
            KeyboardCommand {
                description: description.into(),
                last_action_time: Instant::now(),
                interval: Duration::from_millis(interval_millis),
                action,
            },
        );
    }

    /// One line per command, sorted so the listing is stable.
    fn help_text(&self) -> String {
        let mut lines: Vec<String> = self
            .commands
            .iter()
            .map(|(key, cmd)| format!("{key:?} - {}", cmd.description))
            .collect();
        lines.sort();
        format!("{HELP_HEADER}\n{}", lines.join("\n"))
    }
}

const HELP_HEADER: &str = "Keyboard commands:";

fn pause(ctx: &mut KeyContext, _key: KeyCode, _shift: bool, msgs: &mut Messages) {
    ctx.budget.toggle_pause();
    msgs.show(if ctx.budget.is_paused() { "Paused" } else { "Running" });
}

fn select_number(ctx: &mut KeyContext, key: KeyCode, _shift: bool, msgs: &mut Messages) {
    let Some(n) = key_number(&key) else {
        return;
    };
    let menu_open = ctx.page.as_ref().is_some_and(|page| page.nav.open);
    if menu_open {
        if let Some(page) = ctx.page.as_deref_mut() {
            let link = n as usize - 1;
            if let Some(target) = page.nav.follow(link, &page.layout) {
                ctx.scroll.y = target.min(page.layout.max_scroll(ctx.viewport_height));
                msgs.show(NAV_LINKS[link].0);
            }
        }
        return;
    }
    if let Some(backdrop) = Backdrop::from_number(n) {
        if backdrop != ctx.backdrop {
            ctx.switch_to = Some(backdrop);
            msgs.show(backdrop.label());
        }
    }
}

fn cycle_backdrop(ctx: &mut KeyContext, _key: KeyCode, _shift: bool, msgs: &mut Messages) {
    let next = ctx.backdrop.next();
    ctx.switch_to = Some(next);
    msgs.show(next.label());
}

fn toggle_menu(ctx: &mut KeyContext, _key: KeyCode, _shift: bool, _msgs: &mut Messages) {
    if let Some(page) = ctx.page.as_deref_mut() {
        page.nav.toggle();
    }
}

pub struct KeyboardPlugin;

impl Plugin for KeyboardPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, |mut commands: Commands| {
            commands.spawn(KeyboardCommands::create());
        })
        .add_systems(Update, handle_keypress);
    }
}

#[allow(clippy::too_many_arguments)]
pub fn handle_keypress(
    kb: Res<ButtonInput<KeyCode>>,
    mut app_exit: MessageWriter<AppExit>,
    mut budget: ResMut<FrameBudget>,
    state: Res<State<Backdrop>>,
    mut next_state: ResMut<NextState<Backdrop>>,
    mut resets: MessageWriter<ResetBackdrop>,
    mut page: Option<ResMut<PageState>>,
    mut scroll: ResMut<PageScroll>,
    viewport: Res<Viewport>,
    mut kb_cmds: Single<&mut KeyboardCommands>,
    mut messages: Single<&mut Messages>,
) {
    // Esc: quit the app
    if kb.just_pressed(KeyCode::Escape) {
        app_exit.write(AppExit::Success);
    }

    let shift = kb.pressed(KeyCode::ShiftLeft) || kb.pressed(KeyCode::ShiftRight);

    // ?: display help
    if kb.just_pressed(KeyCode::Slash) && shift {
        // Are we already displaying it?
        if !messages.messages.iter().any(|m| m.text.starts_with(HELP_HEADER)) {
            let mut help = kb_cmds.help_text();
            help.push_str("\nEscape - Quit");
            messages
                .messages
                .push(MessageText::new(help, Duration::from_secs(5)));
        }
    }

    let now = Instant::now();
    let mut ctx = KeyContext {
        budget: &mut budget,
        backdrop: *state.get(),
        switch_to: None,
        reset: false,
        page: page.as_deref_mut(),
        scroll: &mut scroll,
        viewport_height: viewport.size.y,
    };

    for key in kb.get_pressed() {
        if let Some(command) = kb_cmds.commands.get_mut(key) {
            if now.duration_since(command.last_action_time) >= command.interval {
                command.last_action_time = now;
                (command.action)(&mut ctx, *key, shift, &mut messages);
            }
        }
    }

    if let Some(backdrop) = ctx.switch_to {
        info!("Switching backdrop to {}", backdrop.label());
        next_state.set(backdrop);
    }
    if ctx.reset {
        resets.write(ResetBackdrop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(action: KeyboardAction, key: KeyCode, page: Option<&mut PageState>, backdrop: Backdrop) -> (KeyOutcome, Messages) {
        let mut budget = FrameBudget::default();
        let mut scroll = PageScroll::default();
        let mut messages = Messages::default();
        let mut ctx = KeyContext {
            budget: &mut budget,
            backdrop,
            switch_to: None,
            reset: false,
            page,
            scroll: &mut scroll,
            viewport_height: 800.0,
        };
        action(&mut ctx, key, false, &mut messages);
        let outcome = KeyOutcome {
            switch_to: ctx.switch_to,
            reset: ctx.reset,
            paused: budget.is_paused(),
            scroll: scroll.y,
        };
        (outcome, messages)
    }

    struct KeyOutcome {
        switch_to: Option<Backdrop>,
        reset: bool,
        paused: bool,
        scroll: f32,
    }

    fn command(key: KeyCode) -> KeyboardAction {
        KeyboardCommands::create().commands[&key].action
    }

    #[test]
    fn digits_select_backdrops() {
        let (outcome, messages) = run(command(KeyCode::Digit2), KeyCode::Digit2, None, Backdrop::Network);
        assert_eq!(outcome.switch_to, Some(Backdrop::Helix));
        assert_eq!(messages.messages[0].text, "Helix");

        let (outcome, _) = run(command(KeyCode::Numpad4), KeyCode::Numpad4, None, Backdrop::Network);
        assert_eq!(outcome.switch_to, None);
    }

    #[test]
    fn digits_follow_links_while_menu_is_open() {
        let mut page = PageState::new(800.0, Duration::ZERO);
        page.nav.toggle();
        let (outcome, messages) = run(command(KeyCode::Digit3), KeyCode::Digit3, Some(&mut page), Backdrop::Grid);
        assert_eq!(outcome.switch_to, None);
        assert!(outcome.scroll > 0.0);
        assert!(!page.nav.open);
        assert_eq!(messages.messages[0].text, "Platform");
    }

    #[test]
    fn pause_toggles_and_reset_requests() {
        let (outcome, messages) = run(command(KeyCode::Space), KeyCode::Space, None, Backdrop::Field);
        assert!(outcome.paused);
        assert_eq!(messages.messages[0].text, "Paused");

        let (outcome, _) = run(command(KeyCode::KeyR), KeyCode::KeyR, None, Backdrop::Field);
        assert!(outcome.reset);

        let (outcome, _) = run(command(KeyCode::Tab), KeyCode::Tab, None, Backdrop::Network);
        assert_eq!(outcome.switch_to, Some(Backdrop::Field));
    }

    #[test]
    fn help_lists_every_command() {
        let kb_cmds = KeyboardCommands::create();
        let help = kb_cmds.help_text();
        assert!(help.starts_with(HELP_HEADER));
        assert_eq!(help.lines().count(), kb_cmds.commands.len() + 1);
    }
}
