pub mod button;
pub mod progress_bar;
