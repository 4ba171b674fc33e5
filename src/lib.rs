pub mod action;
pub mod activity;
pub mod app;
pub mod config;
pub mod event;
pub mod format;
pub mod menu;
pub mod report;
pub mod system;
pub mod ui;
