//! Construction of the argument vector handed to the operating system.

/// Builds the argument vector for launching `target_path` through `program`.
///
/// `program_args` is inserted as a single token between the program and the
/// target when it is non-empty. It is never split on whitespace.
pub fn build_command(program: &str, program_args: &str, target_path: &str) -> Vec<String> {
    let mut argv = Vec::with_capacity(3);
    argv.push(program.to_string());
    if !program_args.is_empty() {
        argv.push(program_args.to_string());
    }
    argv.push(target_path.to_string());
    argv
}

/// Renders an argument vector shell-quoted, for logs and status messages.
pub fn format_command(argv: &[String]) -> String {
    shell_words::join(argv)
}
