//! Car insurance quote comparator for HDI, Mapfre, GNP, Chubb and AXA

pub mod cli;
pub mod config;
pub mod insurers;
pub mod services;
pub mod telemetry;
pub mod tui;
pub mod types;
