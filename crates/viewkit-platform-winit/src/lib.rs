mod app;
mod events;
mod signals;

pub use app::run_winit_app;
pub use events::viewport_from_physical;
pub use signals::ShutdownFlag;
