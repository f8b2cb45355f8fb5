use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::backdrop::{BackdropSet, PageScroll, Viewport};
use crate::page::{ElementKind, BRAND, HEADER_HEIGHT, NAV_LINKS, SCROLL_HINT, TAGLINE};
use crate::reveal::PageState;

const LINE_SCROLL: f32 = 40.0;
/// Fraction of the remaining fade covered per frame.
const FADE_RATE: f32 = 0.08;
const ACCENT: Color = Color::srgb(0.0, 0.94, 1.0);

#[derive(Component)]
struct PageText(usize);

#[derive(Component)]
struct HeaderBar;

/// Hero brand and scroll hint; hidden for good once the page has been scrolled.
#[derive(Component)]
struct InitialOnly;

#[derive(Component)]
struct MenuPanel;

/// The landing page drawn as a UI layer over the backdrop.
pub struct PageUiPlugin;

impl Plugin for PageUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_page).add_systems(
            Update,
            (scroll_page, update_page, (place_page_text, style_header, show_menu))
                .chain()
                .before(BackdropSet::Simulate),
        );
    }
}

fn spawn_page(mut commands: Commands, viewport: Res<Viewport>, time: Res<Time>) {
    let page = PageState::new(viewport.size.y, time.elapsed());

    for (index, element) in page.layout.elements.iter().enumerate() {
        commands.spawn((
            Text::new(element.text()),
            TextFont {
                font_size: if element.kind == ElementKind::Heading { 22.0 } else { 15.0 },
                ..default()
            },
            TextColor(Color::WHITE.with_alpha(0.0)),
            Node {
                position_type: PositionType::Absolute,
                ..default()
            },
            PageText(index),
        ));
    }

    commands.spawn((
        Text::new(format!("{BRAND}\n{TAGLINE}")),
        TextFont {
            font_size: 48.0,
            ..default()
        },
        TextColor(ACCENT),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(22.0),
            left: Val::Percent(10.0),
            ..default()
        },
        InitialOnly,
    ));
    commands.spawn((
        Text::new(SCROLL_HINT),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgba(1.0, 1.0, 1.0, 0.6)),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(24.0),
            left: Val::Percent(45.0),
            ..default()
        },
        InitialOnly,
    ));

    let links = NAV_LINKS.map(|(label, _)| label).join("    ");
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(0.0),
                width: Val::Percent(100.0),
                height: Val::Px(HEADER_HEIGHT),
                padding: UiRect::horizontal(Val::Px(32.0)),
                justify_content: JustifyContent::SpaceBetween,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::NONE),
            GlobalZIndex(5),
            HeaderBar,
        ))
        .with_children(|header| {
            header.spawn((
                Text::new(BRAND),
                TextFont {
                    font_size: 26.0,
                    ..default()
                },
                TextColor(ACCENT),
            ));
            header.spawn((Text::new(format!("{links}      [M] Menu")), TextColor(Color::WHITE)));
        });

    let menu = NAV_LINKS
        .iter()
        .enumerate()
        .map(|(i, (label, _))| format!("{}  {label}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    commands.spawn((
        Text::new(menu),
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(HEADER_HEIGHT),
            right: Val::Px(0.0),
            padding: UiRect::all(Val::Px(24.0)),
            ..default()
        },
        BackgroundColor(Color::srgba(0.1, 0.1, 0.1, 0.95)),
        GlobalZIndex(6),
        Visibility::Hidden,
        MenuPanel,
    ));

    commands.insert_resource(page);
}

fn scroll_page(
    mut wheel: MessageReader<MouseWheel>,
    mut scroll: ResMut<PageScroll>,
    page: Option<Res<PageState>>,
    viewport: Res<Viewport>,
) {
    let Some(page) = page else {
        return;
    };
    let mut delta = 0.0;
    for event in wheel.read() {
        delta += match event.unit {
            MouseScrollUnit::Line => event.y * LINE_SCROLL,
            MouseScrollUnit::Pixel => event.y,
        };
    }
    if delta != 0.0 {
        scroll.y = (scroll.y - delta).clamp(0.0, page.layout.max_scroll(viewport.size.y));
    }
}

fn update_page(
    page: Option<ResMut<PageState>>,
    scroll: Res<PageScroll>,
    viewport: Res<Viewport>,
    time: Res<Time>,
    mut laid_out_for: Local<f32>,
) {
    let Some(mut page) = page else {
        return;
    };
    if *laid_out_for != viewport.size.y {
        *laid_out_for = viewport.size.y;
        page.relayout(viewport.size.y);
    }
    let newly = page.update(scroll.y, viewport.size.y, time.elapsed());
    if newly > 0 {
        debug!("Revealed {newly} page elements ({} total)", page.tracker.revealed_count());
    }
}

fn place_page_text(
    page: Option<Res<PageState>>,
    scroll: Res<PageScroll>,
    mut texts: Query<(&PageText, &mut Node, &mut TextColor)>,
) {
    let Some(page) = page else {
        return;
    };
    for (text, mut node, mut color) in &mut texts {
        let Some(element) = page.layout.elements.get(text.0) else {
            continue;
        };
        let column_width = 80.0 / element.columns as f32;
        node.top = Val::Px(element.top - scroll.y);
        node.left = Val::Percent(10.0 + column_width * element.column as f32);
        node.width = Val::Percent(column_width - 2.0);

        let target = if page.tracker.is_revealed(text.0) { 1.0 } else { 0.0 };
        let alpha = color.0.alpha();
        if alpha != target {
            let next = alpha + (target - alpha) * FADE_RATE;
            let next = if (target - next).abs() < 0.01 { target } else { next };
            color.0 = color.0.with_alpha(next);
        }
    }
}

fn style_header(
    page: Option<Res<PageState>>,
    mut bars: Query<&mut BackgroundColor, With<HeaderBar>>,
    mut initial: Query<&mut Visibility, With<InitialOnly>>,
) {
    let Some(page) = page else {
        return;
    };
    let background = if page.header.scrolled {
        Color::srgba(0.1, 0.1, 0.1, 0.8)
    } else {
        Color::NONE
    };
    for mut bar in &mut bars {
        if bar.0 != background {
            bar.0 = background;
        }
    }
    let shown = if page.header.initial_view() {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut visibility in &mut initial {
        visibility.set_if_neq(shown);
    }
}

fn show_menu(page: Option<Res<PageState>>, mut panels: Query<&mut Visibility, With<MenuPanel>>) {
    let Some(page) = page else {
        return;
    };
    let shown = if page.nav.open {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut visibility in &mut panels {
        visibility.set_if_neq(shown);
    }
}
