use std::str::FromStr;

/// Front-end neutral keyboard keys.
///
/// Only the keys an emulator actually maps are listed; everything else
/// arrives as `Key::None`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Key {
    A,
    S,
    X,
    Z,
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    None,
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.to_ascii_lowercase().as_str() {
            "a" => Key::A,
            "s" => Key::S,
            "x" => Key::X,
            "z" => Key::Z,
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "enter" | "return" => Key::Enter,
            "escape" | "esc" => Key::Escape,
            other => return Err(format!("unknown key '{other}'")),
        };
        log::trace!("parsed key {key:?}");
        Ok(key)
    }
}
