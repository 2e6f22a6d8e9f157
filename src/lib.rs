//! Design studio - turns a prompt and reference images into a generated image
//!
//! Assembles multimodal requests for a hosted image-generation model, extracts
//! the returned image and drives the whole exchange through a small
//! generation state machine.

pub mod ai;
pub mod app;
pub mod assembler;
pub mod controller;
pub mod download;
pub mod encoder;
pub mod error;
pub mod extractor;
pub mod form;
pub mod gate;
pub mod models;
pub mod pipeline;
pub mod preview;
pub mod prompts;

pub use error::{Error, Result};
