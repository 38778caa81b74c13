use egui::Key;

use super::ramp::DirectionFlags;

/// Keys for each direction. Arrows plus the AZERTY ZQSD cluster.
pub const FORWARD_KEYS: [Key; 2] = [Key::ArrowUp, Key::Z];
pub const LEFT_KEYS: [Key; 2] = [Key::ArrowLeft, Key::Q];
pub const RIGHT_KEYS: [Key; 2] = [Key::ArrowRight, Key::D];
pub const BACKWARD_KEYS: [Key; 2] = [Key::ArrowDown, Key::S];
pub const STOP_KEY: Key = Key::Space;

/// Builds direction flags from a "is this key held" query.
pub fn flags_from_keys(is_down: impl Fn(Key) -> bool) -> DirectionFlags {
    let any = |keys: &[Key]| keys.iter().any(|&k| is_down(k));
    DirectionFlags {
        forward: any(&FORWARD_KEYS),
        left: any(&LEFT_KEYS),
        right: any(&RIGHT_KEYS),
        backward: any(&BACKWARD_KEYS),
    }
}

/// Reads the keyboard for this frame. Returns the held directions and
/// whether stop was pressed. Ignored while a text field has focus.
pub fn read_keyboard(ctx: &egui::Context) -> (DirectionFlags, bool) {
    if ctx.wants_keyboard_input() {
        return (DirectionFlags::NONE, false);
    }
    ctx.input(|i| (flags_from_keys(|k| i.key_down(k)), i.key_pressed(STOP_KEY)))
}

/// Key binding help, shared by the instructions panel.
pub const KEY_BINDINGS: [(&str, &str); 5] = [
    ("↑ or z", "Forward"),
    ("← or q", "Rotate Left"),
    ("→ or d", "Rotate Right"),
    ("↓ or s", "Backward"),
    ("space", "Stop"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keys() {
        assert_eq!(flags_from_keys(|_| false), DirectionFlags::NONE);
    }

    #[test]
    fn test_arrows_and_letters_are_equivalent() {
        let arrows = flags_from_keys(|k| matches!(k, Key::ArrowUp | Key::ArrowLeft));
        let letters = flags_from_keys(|k| matches!(k, Key::Z | Key::Q));
        assert_eq!(arrows, letters);
        assert!(arrows.forward && arrows.left);
        assert!(!arrows.right && !arrows.backward);
    }

    #[test]
    fn test_backward_right() {
        let flags = flags_from_keys(|k| matches!(k, Key::S | Key::ArrowRight));
        assert!(flags.backward && flags.right);
        assert!(!flags.forward && !flags.left);
    }

    #[test]
    fn test_unrelated_keys_ignored() {
        let flags = flags_from_keys(|k| matches!(k, Key::W | Key::A | Key::Space));
        assert!(!flags.any());
    }
}
