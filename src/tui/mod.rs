//! Terminal UI: the Elm-style event loop, view states, theme, and shared
//! widgets.

pub mod app;
pub mod events;
pub mod services;
pub mod theme;
pub mod views;
pub mod widgets;
