pub mod episode_state;
pub mod returns_window;
