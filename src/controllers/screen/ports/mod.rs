//! Port definitions for the screen controller.
//!
//! The widget tree is the only collaborator the pumps call into.

pub mod widget_tree;

pub use widget_tree::WidgetTree;
