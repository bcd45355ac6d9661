//! TUI widgets

pub mod comparison;
pub mod coverage_detail;
pub mod help;
pub mod popup;
pub mod spinner;
pub mod tabs;
