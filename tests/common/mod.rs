#![allow(dead_code)]

use pre_rs::{Config, Error, FileNode, MemoryLoader, Parser};

/// Parse `root` out of an in-memory file set.
pub fn parse_files(config: Config, files: &[(&str, &str)], root: &str) -> Result<FileNode, Error> {
    let loader = files
        .iter()
        .fold(MemoryLoader::new(), |loader, (path, content)| {
            loader.file(path, *content)
        });
    Parser::with_loader(config, loader).parse(root)
}

/// Parse and render, panicking with the error on failure.
pub fn render(config: Config, files: &[(&str, &str)], root: &str) -> String {
    parse_files(config, files, root)
        .unwrap_or_else(|e| panic!("failed to parse {root}: {e}"))
        .render()
}

/// Assert that text without directives passes through untouched.
pub fn passthrough(config: Config, input: &str) {
    let root = Parser::with_loader(config, MemoryLoader::new())
        .parse_str("input", input)
        .unwrap_or_else(|e| panic!("failed to parse: {e}"));
    let output = root.render();
    assert_eq!(
        output, input,
        "passthrough mismatch:\n--- expected ---\n{input}\n--- got ---\n{output}"
    );
}
