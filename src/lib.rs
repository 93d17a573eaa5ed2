pub mod board;
pub mod dnd;
pub mod fixtures;
pub mod model;
pub mod output;
pub mod store;
pub mod subgoal;
pub mod sync;
pub mod tui;
pub mod view;
pub mod watch;
