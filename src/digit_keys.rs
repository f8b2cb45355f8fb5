use bevy::prelude::KeyCode;

/// Keys that pick a backdrop, or a navigation link while the menu is open.
pub const DIGIT_KEYS: [KeyCode; 8] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Numpad1,
    KeyCode::Numpad2,
    KeyCode::Numpad3,
    KeyCode::Numpad4,
];

pub fn key_number(key: &KeyCode) -> Option<u32> {
    match key {
        KeyCode::Digit1 | KeyCode::Numpad1 => Some(1),
        KeyCode::Digit2 | KeyCode::Numpad2 => Some(2),
        KeyCode::Digit3 | KeyCode::Numpad3 => Some(3),
        KeyCode::Digit4 | KeyCode::Numpad4 => Some(4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_digit_key_has_a_number() {
        for key in DIGIT_KEYS {
            assert!(matches!(key_number(&key), Some(1..=4)));
        }
        assert_eq!(key_number(&KeyCode::Numpad3), Some(3));
        assert_eq!(key_number(&KeyCode::Digit5), None);
    }
}
