pub mod layout;
pub mod screen_view;
pub mod theme;
