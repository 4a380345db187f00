pub mod browser;
pub mod chromium;
