//! Output files of a run.
//!
//! # Submodules
//!
//! - [`xlsx`]: the spreadsheet of exported articles
//! - [`json`]: the output work item summarising the run
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── news_data_20240310_143000.xlsx
//! ├── news_data_20240310_143000.json
//! └── 6f1c…e2.jpg                    # one per downloaded image
//! ```

pub mod json;
pub mod xlsx;
