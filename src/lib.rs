//! tickr library exports for testing

pub mod core;
pub mod screens;
pub mod tui;

#[cfg(test)]
pub mod test_support;
