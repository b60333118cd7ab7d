use crate::game::geometry::Direction;

/// A decoded participant command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Quit,
}

const KEY_CTRL_C: u8 = 0x03;
const KEY_ESCAPE: u8 = 0x1b;

/// Map a raw input byte to a command. Three movement key sets are
/// recognized (WASD, vim HJKL, and Dvorak ,aoe); Ctrl-C and Escape quit.
/// Anything else is ignored.
pub fn decode(byte: u8) -> Option<Command> {
    match byte {
        b'w' | b'k' | b',' => Some(Command::Move(Direction::Up)),
        b'a' | b'h' => Some(Command::Move(Direction::Left)),
        b's' | b'j' | b'o' => Some(Command::Move(Direction::Down)),
        b'd' | b'l' | b'e' => Some(Command::Move(Direction::Right)),
        KEY_CTRL_C | KEY_ESCAPE => Some(Command::Quit),
        _ => None,
    }
}
