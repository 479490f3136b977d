pub mod renderer;

pub use renderer::{Hud, Renderer, notification_text};
