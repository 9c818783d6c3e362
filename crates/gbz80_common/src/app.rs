use crate::key::Key;

/// Contract between an emulator core and whatever presents it.
///
/// A front end calls `init` once, then alternates key delivery and `update`
/// until `should_exit` reports true, and finally calls `exit`. The screen
/// buffer handed to `update` is RGB24, `width * height * 3` bytes.
pub trait App {
    fn init(&mut self);
    fn update(&mut self, screen: &mut [u8]);
    fn handle_key_event(&mut self, key: Key, is_down: bool);
    fn should_exit(&self) -> bool;
    fn exit(&mut self);

    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn scale(&self) -> u32;
    fn title(&self) -> String;
}
