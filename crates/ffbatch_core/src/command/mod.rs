//! External command construction.
//!
//! - [`ToolCommand`]: a structured argument vector, executed once
//! - [`CommandBuilder`]: every encoder invocation the pipeline makes
//! - Filter-graph synthesis for masked regions
//! - The output path rule

mod builder;
mod filter;
mod output;
mod tool_command;

pub use builder::{format_seconds, CommandBuilder};
pub use filter::{delogo, mask_filter, window_start, TimeWindow};
pub use output::{output_dir, output_file_name, plan_output_path, prepare_output_path};
pub use tool_command::ToolCommand;
