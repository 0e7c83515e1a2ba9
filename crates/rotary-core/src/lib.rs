pub mod calibration;
pub mod constants;
pub mod controller;
pub mod dwell;
pub mod effects;
pub mod idle;
pub mod link;
pub mod motion;
pub mod prefs;
pub mod rotator;
pub mod scene;
pub mod state;
pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");

pub use calibration::*;
pub use constants::*;
pub use controller::*;
pub use link::*;
pub use prefs::{PrefValue, PrefsError, PrefsStore};
pub use scene::*;
pub use state::*;
