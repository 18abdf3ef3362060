//! Imgforge: Interactive Image & PDF Wizard
//!
//! A full-screen terminal application that walks users through PDF-to-image
//! conversion, image format conversion and image/PDF compression, delegating
//! the heavy lifting to ImageMagick.

pub mod cli;
pub mod deps;
pub mod files;
pub mod jobs;
pub mod logging;
pub mod settings;
pub mod tui;
