// Shared tuning constants used by the core behaviours and the native frontend.

// Serial link
pub const DEFAULT_PORT_NAME: &str = "COM4";
pub const DEFAULT_BAUD_RATE: u32 = 9600;
pub const SERIAL_READ_TIMEOUT_MS: u64 = 100;

// Calibration
pub const RANGE_EPSILON: f32 = 1.0e-6; // below this the window is treated as empty
pub const FALLBACK_HALF_WIDTH: f32 = 1.0; // boundary half-width around the raw sample

// Camera smoothing
pub const DEFAULT_SMOOTHING_RATE: f32 = 5.0;
pub const SMOOTHING_RATE_MAX: f32 = 40.0;
pub const SMOOTHING_RATE_STEP: f32 = 1.0;
pub const MANUAL_MOVE_SPEED: f32 = 5.0; // world units per second for arrow keys
pub const SMOOTHING_PRESETS: [f32; 5] = [0.0, 5.0, 10.0, 20.0, 40.0];
pub const BOUND_STEPS: [f32; 3] = [1.0, 0.1, 0.01];

// Default orthographic camera
pub const DEFAULT_ORTHO_SIZE: f32 = 5.0;
pub const DEFAULT_SCREEN_SIZE: [u32; 2] = [1280, 720];

// Idle fade
pub const IDLE_TIME_SEC: f32 = 5.0;
pub const FADE_IN_SEC: f32 = 1.0;
pub const FADE_OUT_SEC: f32 = 1.0;
pub const IDLE_TARGET_ALPHA: f32 = 1.0;
pub const IDLE_MOVEMENT_THRESHOLD: f32 = 0.01;
pub const IDLE_ALPHA_TOLERANCE: f32 = 0.01;
pub const IDLE_TIME_PRESETS: [f32; 5] = [5.0, 10.0, 30.0, 60.0, 120.0];
pub const FADE_PRESETS: [f32; 5] = [0.3, 0.5, 1.0, 1.5, 2.0];

// Waypoint rotation
pub const ROTATION_SPEED: f32 = 0.8;
pub const ROTATION_SMOOTHNESS: f32 = 5.0;

// Glow pulse
pub const GLOW_SPEED: f32 = 2.0;
pub const GLOW_MIN: f32 = 0.0;
pub const GLOW_MAX: f32 = 5.0;

// Trails
pub const TRAIL_SPAWN_INTERVAL_SEC: f32 = 0.1;
pub const TRAIL_LIFETIME_SEC: f32 = 1.0;

// Centre dwell and modals
pub const CENTER_THRESHOLD: f32 = 0.05; // viewport units around (0.5, 0.5)
pub const CENTER_REQUIRED_SEC: f32 = 1.0;
pub const MODAL_FADE_SEC: f32 = 1.0;
