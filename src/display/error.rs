/*
 *  display/error.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error type for display surface operations
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::error::Error;
use std::fmt;

use crate::ui::ImageId;

/// Error type for all display surface operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    /// Unsupported operation for this kind of display
    UnsupportedOperation,

    /// No bitmap registered under this image id
    UnknownImage(ImageId),

    /// Image bitmap does not match its declared dimensions
    ImageSizeMismatch { expected: usize, actual: usize },

    /// Coordinates outside the panel
    OutOfBounds { x: u32, y: u32 },

    /// Invalid surface geometry
    InvalidConfiguration(String),

    /// Drawing operation failed
    DrawingError(String),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::UnsupportedOperation =>
                write!(f, "Operation not supported by this display"),
            DisplayError::UnknownImage(id) =>
                write!(f, "No image registered with id {}", id.0),
            DisplayError::ImageSizeMismatch { expected, actual } =>
                write!(f, "Image size mismatch: expected {} bytes, got {}", expected, actual),
            DisplayError::OutOfBounds { x, y } =>
                write!(f, "Position ({}, {}) is outside the display", x, y),
            DisplayError::InvalidConfiguration(msg) =>
                write!(f, "Invalid configuration: {}", msg),
            DisplayError::DrawingError(msg) =>
                write!(f, "Drawing error: {}", msg),
        }
    }
}

impl Error for DisplayError {}

// Framebuffer draws are infallible
impl From<core::convert::Infallible> for DisplayError {
    fn from(err: core::convert::Infallible) -> Self {
        match err {}
    }
}
