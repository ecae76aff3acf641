// Copyright 2024 The DocAssert Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use sameish::{LineDiff, NumericMode, PathReport, Sameish, Snapshot, Tree};

#[doc(hidden)]
#[macro_export]
macro_rules! handle_error {
    ($code:expr, $msg:expr, $($arg:tt)*) => {
        eprintln!($msg, $($arg)*);
        std::process::exit($code);
    };

    ($code:expr, $msg:expr) => {
        eprintln!($msg);
        std::process::exit($code);
    };
}

#[doc(hidden)]
struct Code;

impl Code {
    const SAME: i32 = 0;
    const INTERNAL_ERROR: i32 = 1;
    const INVALID_ARGUMENT: i32 = 2;
    const DIFFERENT: i32 = 3;
}

#[doc(hidden)]
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Renderer {
    /// Line-oriented diff of the pretty-printed values
    Lines,
    /// One entry per differing path
    Paths,
    /// Both values side by side in one JSON document
    Snapshot,
}

#[doc(hidden)]
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON file holding the "before" value
    before: PathBuf,

    /// JSON file holding the "after" value
    after: PathBuf,

    /// Only compare this dotted path (repeatable)
    #[clap(short, long = "compare-path")]
    compare_paths: Vec<String>,

    /// Treat the array at this dotted path as unordered (repeatable)
    #[clap(short, long = "ignore-order-path")]
    ignore_order_paths: Vec<String>,

    /// Print a diff of the normalized values
    #[clap(short, long)]
    log_diff: bool,

    /// How the diff is rendered
    #[clap(short, long, value_enum, default_value = "lines")]
    renderer: Renderer,

    /// Compare all numbers as floats, so 1 equals 1.0
    #[clap(long)]
    assume_float: bool,
}

#[doc(hidden)]
fn read_tree(path: &Path) -> Tree {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) => {
            handle_error!(
                Code::INTERNAL_ERROR,
                "Error reading {}: {}",
                path.display(),
                err
            );
        }
    };

    match serde_json::from_str(&data) {
        Ok(tree) => tree,
        Err(err) => {
            handle_error!(
                Code::INVALID_ARGUMENT,
                "Error parsing {}: {}",
                path.display(),
                err
            );
        }
    }
}

#[doc(hidden)]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let before = read_tree(&cli.before);
    let after = read_tree(&cli.after);

    let numeric_mode = if cli.assume_float {
        NumericMode::AssumeFloat
    } else {
        NumericMode::Strict
    };

    let sameish = Sameish::new(&before, &after)
        .compare_paths(cli.compare_paths.iter().map(String::as_str))
        .ignore_order_paths(cli.ignore_order_paths.iter().map(String::as_str))
        .numeric_mode(numeric_mode)
        .log_diff(cli.log_diff);

    let sameish = match cli.renderer {
        Renderer::Lines => sameish.with_renderer(LineDiff),
        Renderer::Paths => sameish.with_renderer(PathReport),
        Renderer::Snapshot => sameish.with_renderer(Snapshot),
    };

    match sameish.compare() {
        Ok(true) => {
            println!("same");
            std::process::exit(Code::SAME);
        }
        Ok(false) => {
            println!("different");
            std::process::exit(Code::DIFFERENT);
        }
        Err(err) => {
            handle_error!(Code::INVALID_ARGUMENT, "Error: {}", err);
        }
    }
}
