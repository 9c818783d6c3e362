use gbz80_common::app::App;
use gbz80_common::key::Key;

use crate::machine::Input;
use crate::{GameBoy, SCREEN_HEIGHT, SCREEN_SCALE, SCREEN_WIDTH};

/// Front-end adapter for the Game Boy machine.
///
/// Implements the shared `App` trait so any presenter can drive the core
/// one frame per `update` call.
pub struct GameBoyApp {
    pub gb: GameBoy,
    should_exit: bool,
    frame_counter: u64,
    last_pc: u16,
    pc_stagnant_frames: u32,
}

impl GameBoyApp {
    pub fn new(gb: GameBoy) -> Self {
        Self {
            gb,
            should_exit: false,
            frame_counter: 0,
            last_pc: 0,
            pc_stagnant_frames: 0,
        }
    }

    #[inline]
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    /// Keyboard layout: Z=A, X=B, A=Select, S=Start, arrows for the D-pad.
    pub fn map_key(key: Key) -> Option<Input> {
        match key {
            Key::Z => Some(Input::A),
            Key::X => Some(Input::B),
            Key::A => Some(Input::Select),
            Key::S => Some(Input::Start),
            Key::Up => Some(Input::Up),
            Key::Down => Some(Input::Down),
            Key::Left => Some(Input::Left),
            Key::Right => Some(Input::Right),
            Key::Enter | Key::Escape | Key::None => None,
        }
    }
}

impl App for GameBoyApp {
    fn init(&mut self) {
        log::info!("Game Boy init");
        self.last_pc = self.gb.cpu.regs.pc;
    }

    fn update(&mut self, screen: &mut [u8]) {
        if self.should_exit {
            return;
        }

        if let Err(err) = self.gb.step_frame() {
            log::error!("emulation halted: {err}");
            self.should_exit = true;
            return;
        }

        let frame = self.gb.visible_frame();
        let len = frame.len().min(screen.len());
        screen[..len].copy_from_slice(&frame[..len]);

        self.frame_counter = self.frame_counter.wrapping_add(1);

        let pc = self.gb.cpu.regs.pc;
        if pc == self.last_pc {
            self.pc_stagnant_frames = self.pc_stagnant_frames.saturating_add(1);
        } else {
            self.pc_stagnant_frames = 0;
            self.last_pc = pc;
        }

        if self.frame_counter == 1 || self.frame_counter % 60 == 0 {
            let mmu = self.gb.mmu();
            log::info!(
                "GB: frame={} pc=0x{:04X} state={:?} ime={} IF=0x{:02X} IE=0x{:02X} LCDC=0x{:02X} LY={}",
                self.frame_counter,
                pc,
                self.gb.cpu.state(),
                self.gb.cpu.ime,
                mmu.interrupt_flag(),
                mmu.read8(0xFFFF),
                mmu.read8(0xFF40),
                mmu.ppu().ly(),
            );
        }

        if self.pc_stagnant_frames == 600 {
            log::warn!(
                "GB: PC unchanged for ~600 frames at 0x{:04X} (state={:?})",
                pc,
                self.gb.cpu.state(),
            );
        }
    }

    fn handle_key_event(&mut self, key: Key, is_down: bool) {
        log::debug!("GB key event: {key:?} pressed={is_down}");
        match (key, Self::map_key(key)) {
            (Key::Escape, _) if is_down => self.should_exit = true,
            (_, Some(input)) if is_down => self.gb.press(input),
            (_, Some(input)) => self.gb.release(input),
            (_, None) => {}
        }
    }

    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn exit(&mut self) {
        log::info!("Game Boy exit after {} frames", self.frame_counter);
        self.should_exit = true;
    }

    fn width(&self) -> u32 {
        SCREEN_WIDTH as u32
    }

    fn height(&self) -> u32 {
        SCREEN_HEIGHT as u32
    }

    fn scale(&self) -> u32 {
        SCREEN_SCALE
    }

    fn title(&self) -> String {
        match self.gb.mmu().cartridge() {
            Some(cart) if !cart.title().is_empty() => format!("gbz80 - {}", cart.title()),
            _ => "gbz80".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::NINTENDO_LOGO;

    fn looping_rom() -> Vec<u8> {
        let mut rom = vec![0u8; 0x8000];
        rom[0x0104..0x0134].copy_from_slice(&NINTENDO_LOGO);
        rom[0x0134..0x0138].copy_from_slice(b"LOOP");
        // JR -2 at the entry point.
        rom[0x0100] = 0x18;
        rom[0x0101] = 0xFE;
        rom
    }

    fn app() -> GameBoyApp {
        let mut app = GameBoyApp::new(GameBoy::new(looping_rom()).unwrap());
        app.init();
        app
    }

    #[test]
    fn keyboard_layout() {
        assert_eq!(GameBoyApp::map_key(Key::Z), Some(Input::A));
        assert_eq!(GameBoyApp::map_key(Key::X), Some(Input::B));
        assert_eq!(GameBoyApp::map_key(Key::A), Some(Input::Select));
        assert_eq!(GameBoyApp::map_key(Key::S), Some(Input::Start));
        assert_eq!(GameBoyApp::map_key(Key::Left), Some(Input::Left));
        assert_eq!(GameBoyApp::map_key(Key::Enter), None);
    }

    #[test]
    fn update_fills_screen_buffer() {
        let mut app = app();
        let mut screen = vec![0u8; (app.width() * app.height() * 3) as usize];

        app.update(&mut screen);

        assert_eq!(app.frame_counter(), 1);
        assert!(!app.should_exit());
        assert_eq!(&screen[..3], &[0xE0, 0xF8, 0xD0]);
    }

    #[test]
    fn key_events_drive_joypad() {
        let mut app = app();
        app.gb.mmu_mut().write8(0xFF00, 0x20);

        app.handle_key_event(Key::Up, true);
        assert_eq!(app.gb.mmu().read8(0xFF00) & 0x0F, 0x0B);
        app.handle_key_event(Key::Up, false);
        assert_eq!(app.gb.mmu().read8(0xFF00) & 0x0F, 0x0F);

        app.handle_key_event(Key::Escape, false);
        assert!(!app.should_exit());
        app.handle_key_event(Key::Escape, true);
        assert!(app.should_exit());
    }

    #[test]
    fn title_includes_cartridge_name() {
        assert_eq!(app().title(), "gbz80 - LOOP");
    }
}
