//! Terminal helpers for urban coverage tools
//!
//! - Status messages and headers
//! - Distance, score and severity formatting
//! - Progress bars for bulk imports

#![warn(missing_docs)]

pub mod output;
pub mod progress;
