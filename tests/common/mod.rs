#![allow(dead_code, unused_imports)]

pub use sheepdog_test_utils::builders;
pub use sheepdog_test_utils::init_tracing;
pub use sheepdog_test_utils::ticker;

use sheepdog::process::ProcessNode;
use sheepdog::types::LogLevel;

/// `command` split on whitespace, for nodes built directly in tests.
pub fn argv(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

/// `sh -c <script>` as an argv.
pub fn sh(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string()]
}

/// A program name that no `PATH` will ever contain.
pub const MISSING_PROGRAM: &str = "sheepdog-test-no-such-program";

/// Messages of a node's log at the given level.
pub fn messages(node: &ProcessNode, level: LogLevel) -> Vec<String> {
    node.log()
        .iter()
        .filter(|e| e.level == level)
        .map(|e| e.message.clone())
        .collect()
}
