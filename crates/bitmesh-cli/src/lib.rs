//! Scripted frontend for the bitmesh runtime.
//!
//! Reads a line-oriented event script, feeds it through
//! [`bitmesh_app::Runtime`] and logs the resulting status view after every
//! render.
//!
//! # Script format
//!
//! One command per line. Blank lines and lines starting with `//` are
//! skipped.
//!
//! ```text
//! transport on
//! peers alice bob self
//! group g1 eu alice Weekend hikers
//! join general
//! select 9q8yy
//! participants 9q8yy carol dave
//! message @alice
//! open-latest private
//! quit
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod driver;
mod script;
mod view;

pub use driver::ScriptDriver;
pub use script::{ScriptError, parse_line, parse_script};
pub use view::StatusView;
