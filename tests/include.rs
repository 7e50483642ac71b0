//! Include and require resolution, in memory and on disk.

mod common;

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use common::{parse_files, render};
use pre_rs::{Config, Error, Loader, MemoryLoader, Node, ParseErrorKind, Parser, parse_file};

/// In-memory loader that counts successful reads.
struct CountingLoader {
    inner: MemoryLoader,
    reads: Cell<usize>,
}

impl Loader for CountingLoader {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let bytes = self.inner.read(path)?;
        self.reads.set(self.reads.get() + 1);
        Ok(bytes)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        self.inner.canonicalize(path)
    }
}

// -----------------------------------------------------------
// In-memory resolution.
// -----------------------------------------------------------

#[test]
fn include_twice_gives_two_copies() {
    let root = parse_files(
        Config::default(),
        &[
            ("main", "# include \"part\"\n# include \"part\"\n"),
            ("part", "P\n"),
        ],
        "main",
    )
    .expect("parse failed");
    assert_eq!(root.render(), "P\nP\n");
    assert_eq!(root.nodes.len(), 2);
    let (Node::File(first), Node::File(second)) = (&root.nodes[0], &root.nodes[1]) else {
        panic!("expected two file nodes");
    };
    assert_eq!(first.nodes, second.nodes);
    assert_eq!(first.pos.line, 1);
    assert_eq!(second.pos.line, 2);
}

#[test]
fn require_through_different_spellings() {
    let out = render(
        Config::default(),
        &[
            ("src/main", "# require \"lib/a\"\n# include \"other\"\n"),
            ("src/other", "# require \"../src/lib/a\"\nO\n"),
            ("src/lib/a", "A\n"),
        ],
        "src/main",
    );
    assert_eq!(out, "A\nO\n");
}

#[test]
fn include_after_require_still_parses() {
    let out = render(
        Config::default(),
        &[
            ("main", "# require \"a\"\n# include \"a\"\n# require \"a\"\n"),
            ("a", "A"),
        ],
        "main",
    );
    assert_eq!(out, "AA");
}

#[test]
fn diamond_require() {
    let out = render(
        Config::default(),
        &[
            ("main", "# include \"left\"\n# include \"right\"\n"),
            ("left", "# require \"base\"\nL\n"),
            ("right", "# require \"base\"\nR\n"),
            ("base", "B\n"),
        ],
        "main",
    );
    assert_eq!(out, "B\nL\nR\n");
}

#[test]
fn self_include_stops_at_configured_depth() {
    for max in [0, 1, 5] {
        let err = parse_files(
            Config::new().with_max_include_depth(max),
            &[("loop", "x\n# include \"loop\"\n")],
            "loop",
        )
        .unwrap_err();
        let Error::Parse(err) = err else {
            panic!("expected parse error");
        };
        assert_eq!(err.kind, ParseErrorKind::IncludeDepthExceeded { max });
    }
}

#[test]
fn nesting_up_to_the_limit_succeeds() {
    let out = render(
        Config::new().with_max_include_depth(2),
        &[
            ("a", "# include \"b\"\n"),
            ("b", "# include \"c\"\n"),
            ("c", "C"),
        ],
        "a",
    );
    assert_eq!(out, "C");
}

#[test]
fn nesting_past_the_limit_fails_in_deepest_file() {
    let err = parse_files(
        Config::new().with_max_include_depth(2),
        &[
            ("a", "# include \"b\"\n"),
            ("b", "# include \"c\"\n"),
            ("c", "# include \"d\"\n"),
            ("d", "D"),
        ],
        "a",
    )
    .unwrap_err();
    let Error::Parse(err) = err else {
        panic!("expected parse error");
    };
    assert_eq!(err.kind, ParseErrorKind::IncludeDepthExceeded { max: 2 });
    assert_eq!(err.pos.to_string(), "c:1:1");
}

#[test]
fn self_include_reads_exactly_max_nested_files() {
    for max in [0, 1, 3, 8] {
        let loader = CountingLoader {
            inner: MemoryLoader::new().file("loop", "# include \"loop\"\n"),
            reads: Cell::new(0),
        };
        let parser = Parser::with_loader(Config::new().with_max_include_depth(max), loader);
        let err = parser.parse("loop").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ref e) if e.kind == ParseErrorKind::IncludeDepthExceeded { max }
        ));
        // the root plus one read per nested level
        assert_eq!(parser.loader().reads.get(), max + 1);
        assert_eq!(parser.config().max_include_depth, max);
    }
}

#[test]
fn mutual_include_fails() {
    let err = parse_files(
        Config::new().with_max_include_depth(10),
        &[("a", "# include \"b\"\n"), ("b", "# include \"a\"\n")],
        "a",
    )
    .unwrap_err();
    assert!(err.to_string().contains("maximum include depth of 10"));
}

#[test]
fn mutual_require_terminates() {
    let out = render(
        Config::default(),
        &[
            ("a", "A\n# require \"b\"\n"),
            ("b", "B\n# require \"a\"\n# require \"b\"\n"),
        ],
        "a",
    );
    // the root itself is not marked as required
    assert_eq!(out, "A\nB\nA\n");
}

#[test]
fn missing_include_fails_whole_parse() {
    let err = parse_files(
        Config::default(),
        &[("main", "ok\n# include \"mid\"\n"), ("mid", "# include \"gone\"\n")],
        "main",
    )
    .unwrap_err();
    let Error::Parse(err) = err else {
        panic!("expected parse error");
    };
    assert!(matches!(err.kind, ParseErrorKind::Unreadable { .. }));
    assert_eq!(err.pos.to_string(), "mid:1:1");
}

#[test]
fn included_file_node_records_directive_position() {
    let root = parse_files(
        Config::default(),
        &[("main", "a\n  # include \"b\"\n"), ("b", "B")],
        "main",
    )
    .expect("parse failed");
    let Node::File(child) = &root.nodes[1] else {
        panic!("expected file node");
    };
    assert_eq!(child.name, "b");
    assert_eq!(child.pos.to_string(), "main:2:3");
}

// -----------------------------------------------------------
// Filesystem resolution.
// -----------------------------------------------------------

#[test]
fn fs_relative_to_including_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("sub")).expect("mkdir");
    fs::write(dir.path().join("main.txt"), "# include \"sub/a.txt\"\n").expect("write");
    fs::write(dir.path().join("sub/a.txt"), "# include \"b.txt\"\n").expect("write");
    fs::write(dir.path().join("sub/b.txt"), "deep\n").expect("write");

    let root = parse_file(dir.path().join("main.txt")).expect("parse failed");
    assert_eq!(root.render(), "deep\n");
    assert_eq!(
        root.files()[2].path,
        fs::canonicalize(dir.path().join("sub/b.txt")).expect("canonicalize")
    );
}

#[test]
fn fs_missing_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = parse_file(dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(
        err,
        Error::Parse(pre_rs::ParseError {
            kind: ParseErrorKind::Unreadable { .. },
            ..
        })
    ));
}

#[test]
fn fs_parse_str_resolves_against_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("x.txt"), "X").expect("write");
    let name = dir.path().join("virtual.txt");
    let root = Parser::new(Config::default())
        .parse_str(&name.display().to_string(), "# include \"x.txt\"\n")
        .expect("parse failed");
    assert_eq!(root.render(), "X");
}

#[cfg(unix)]
#[test]
fn fs_require_dedups_symlinks() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("real.txt"), "R\n").expect("write");
    std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
        .expect("symlink");
    fs::write(
        dir.path().join("main.txt"),
        "# require \"real.txt\"\n# require \"link.txt\"\n",
    )
    .expect("write");

    let root = parse_file(dir.path().join("main.txt")).expect("parse failed");
    assert_eq!(root.render(), "R\n");
}

#[cfg(unix)]
#[test]
fn fs_parent_of_symlinked_dir_follows_the_link() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("real/sub")).expect("mkdir");
    fs::write(dir.path().join("real/x.txt"), "REAL").expect("write");
    fs::write(dir.path().join("x.txt"), "WRONG").expect("write");
    std::os::unix::fs::symlink(dir.path().join("real/sub"), dir.path().join("link"))
        .expect("symlink");
    fs::write(
        dir.path().join("main.txt"),
        "# include \"link/../x.txt\"\n# require \"real/x.txt\"\n# require \"link/../x.txt\"\n",
    )
    .expect("write");

    let root = parse_file(dir.path().join("main.txt")).expect("parse failed");
    assert_eq!(root.render(), "REALREAL");
    assert_eq!(
        root.files()[1].path,
        fs::canonicalize(dir.path().join("real/x.txt")).expect("canonicalize")
    );
}
