//! # dupe-browse CLI
//!
//! Command-line shell for the duplicate browser.
//!
//! ## Usage
//! ```bash
//! dupe-browse list ~/Downloads
//! dupe-browse delete ~/Downloads --rows 1,3 --yes
//! ```

mod cli;

use dupe_browser::Result;

fn main() -> Result<()> {
    dupe_browser::init_tracing();
    cli::run()
}
