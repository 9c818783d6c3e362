use crate::cpu::Interrupt;

pub const JOYP_ADDR: u16 = 0xFF00;

/// DMG buttons, split across the action and direction groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Input {
    A,
    B,
    Select,
    Start,
    Right,
    Left,
    Up,
    Down,
}

impl Input {
    /// Bit of this button inside its group nibble.
    #[inline]
    pub const fn bit(self) -> u8 {
        match self {
            Input::A | Input::Right => 0,
            Input::B | Input::Left => 1,
            Input::Select | Input::Up => 2,
            Input::Start | Input::Down => 3,
        }
    }

    #[inline]
    pub const fn is_action(self) -> bool {
        matches!(self, Input::A | Input::B | Input::Select | Input::Start)
    }
}

/// P1/JOYP register state. Both button nibbles are active-low.
#[derive(Clone, Debug)]
pub struct Joypad {
    /// Bits 4 (direction) and 5 (action) as last written; 0 selects.
    select: u8,
    action: u8,
    direction: u8,
}

impl Default for Joypad {
    fn default() -> Self {
        Self {
            select: 0x30,
            action: 0x0F,
            direction: 0x0F,
        }
    }
}

impl Joypad {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn action_selected(&self) -> bool {
        self.select & 0x20 == 0
    }

    #[inline]
    fn direction_selected(&self) -> bool {
        self.select & 0x10 == 0
    }

    pub fn read(&self) -> u8 {
        let nibble = if self.action_selected() {
            self.action
        } else if self.direction_selected() {
            self.direction
        } else {
            0x0F
        };
        0xC0 | self.select | nibble
    }

    pub fn write(&mut self, value: u8) {
        self.select = value & 0x30;
    }

    /// Mark `input` as held. Requests the joypad interrupt when the press
    /// is visible through the selected group.
    pub fn press(&mut self, input: Input, if_reg: &mut u8) {
        log::debug!("{input:?} pressed");
        let mask = 1 << input.bit();
        if input.is_action() {
            self.action &= !mask;
        } else {
            self.direction &= !mask;
        }

        let visible = (self.action_selected() && self.action != 0x0F)
            || (self.direction_selected() && self.direction != 0x0F);
        if visible {
            *if_reg |= Interrupt::Joypad.mask();
        }
    }

    pub fn release(&mut self, input: Input) {
        log::debug!("{input:?} released");
        let mask = 1 << input.bit();
        if input.is_action() {
            self.action |= mask;
        } else {
            self.direction |= mask;
        }
    }
}
