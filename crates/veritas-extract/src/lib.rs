//! Page context: reads visible article text out of the current document
//! and answers `GET_PAGE` requests from the popup.
//!
//! Text is pulled from the parsed DOM with `scraper`; visibility comes from
//! a [`StyleProbe`], so a host with a real layout engine can plug in its
//! computed styles while the default probe reads inline declarations.

pub mod extractor;
pub mod page;
pub mod style;

pub use extractor::{Extractor, MAX_TEXT_CHARS, SKIPPED_TAGS};
pub use page::{PageContext, PageDocument};
pub use style::{ComputedStyle, InlineStyleProbe, StyleProbe, Visibility};
