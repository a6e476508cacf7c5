//! Capture filtering with chunked text providers
//!
//! Runs real Go queries through providers that hand out tiny chunks, stop
//! early, or overrun, and checks which captures survive.

use ast_grep_language::SupportLang;
use chunked_captures::provider::{from_fn, ReaderProvider, SliceProvider, TextProvider};
use chunked_captures::ts::{ParsedSource, PredicateCursor, PredicateQuery, SourceParser};
use chunked_captures::{CursorConfig, PredicateCondition, StreamingIterator};
use std::fs;
use std::io::Cursor;
use tempfile::TempDir;

fn parse(source: &[u8]) -> ParsedSource<'_> {
    let mut parser = SourceParser::new(SupportLang::Go).unwrap();
    parser.parse_with_source(source).unwrap()
}

fn compile(source: &str) -> PredicateQuery {
    let parser = SourceParser::new(SupportLang::Go).unwrap();
    PredicateQuery::new(&parser.language(), source).unwrap()
}

fn identifier_equals(literal: &str) -> PredicateQuery {
    let parser = SourceParser::new(SupportLang::Go).unwrap();
    PredicateQuery::builder(&parser.language(), "((identifier) @id)")
        .unwrap()
        .equals(0, "id", literal)
        .unwrap()
        .build()
}

/// Collect the text of every accepted capture, read straight from `parsed`.
fn capture_texts<P: TextProvider>(
    query: &PredicateQuery,
    parsed: &ParsedSource<'_>,
    cursor: &mut PredicateCursor,
    provider: P,
) -> Vec<String> {
    let mut captures = cursor.matches(query, parsed.root_node(), provider);
    let mut results = Vec::new();
    while let Some(m) = captures.next() {
        for capture in m.captures() {
            results.push(String::from_utf8_lossy(parsed.node_text(capture.node)).into_owned());
        }
    }
    results
}

#[test]
fn string_literal_with_two_byte_chunks() {
    let source = br#"package main; func test() string { return "hello"; }"#;
    let parsed = parse(source);
    let parser = SourceParser::new(SupportLang::Go).unwrap();
    let query = PredicateQuery::builder(
        &parser.language(),
        "((interpreted_string_literal) @string)",
    )
    .unwrap()
    .equals(0, "string", "\"hello\"")
    .unwrap()
    .build();

    let mut calls = 0;
    let provider = from_fn(|offset: usize, _| {
        calls += 1;
        if offset >= source.len() {
            return &[][..];
        }
        let end = (offset + 2).min(source.len());
        &source[offset..end]
    });

    let results = capture_texts(&query, &parsed, &mut PredicateCursor::new(), provider);
    assert_eq!(results, vec![r#""hello""#]);
    assert!(calls > 1, "expected the literal to arrive over several chunks");
}

#[test]
fn identifier_with_single_byte_chunks() {
    let source = b"package main; func test() {}";
    let parsed = parse(source);
    let query = identifier_equals("test");

    let provider = from_fn(|offset: usize, _| {
        source.get(offset..offset + 1).unwrap_or_default()
    });

    let results = capture_texts(&query, &parsed, &mut PredicateCursor::new(), provider);
    assert_eq!(results, vec!["test"]);
}

#[test]
fn provider_running_dry_rejects_the_match() {
    let source = b"package main; func main() {}";
    let parsed = parse(source);
    let query = identifier_equals("main");

    let mut calls = 0;
    let provider = from_fn(|offset: usize, _| {
        calls += 1;
        if calls == 1 && offset < source.len() {
            let end = (offset + 2).min(source.len());
            return &source[offset..end];
        }
        &[][..]
    });

    // "ma" is all the predicate ever sees.
    let results = capture_texts(&query, &parsed, &mut PredicateCursor::new(), provider);
    assert!(results.is_empty());
}

#[test]
fn provider_that_always_overruns() {
    let source = b"package main\nfunc alpha() {}\nfunc beta() {}\n";
    let parsed = parse(source);
    let query = identifier_equals("beta");

    // Hands back everything from the offset to the end of the file.
    let results = capture_texts(
        &query,
        &parsed,
        &mut PredicateCursor::new(),
        SliceProvider::new(source),
    );
    assert_eq!(results, vec!["beta"]);
}

#[test]
fn positions_track_rows() {
    let source = b"package main\n\nfunc one() {}\nfunc two() {}\n";
    let parsed = parse(source);
    let query = identifier_equals("two");

    let mut positions = Vec::new();
    let provider = from_fn(|offset: usize, position| {
        positions.push((offset, position));
        source.get(offset..offset + 1).unwrap_or_default()
    });
    let results = capture_texts(&query, &parsed, &mut PredicateCursor::new(), provider);
    assert_eq!(results, vec!["two"]);

    // Every request for `two` is on row 3, one column per byte.
    let two_start = 33;
    let rows: Vec<_> = positions
        .iter()
        .filter(|(offset, _)| *offset >= two_start)
        .map(|(offset, position)| (position.row, position.column, *offset - two_start + 5))
        .collect();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|&(row, column, expected)| row == 3 && column == expected));
}

#[test]
fn several_patterns_with_mixed_predicates() {
    let source = b"package main\nfunc helper() {}\nfunc main() { helper(); other() }\n";
    let parsed = parse(source);
    let parser = SourceParser::new(SupportLang::Go).unwrap();
    let query = PredicateQuery::builder(
        &parser.language(),
        "(function_declaration name: (identifier) @decl)
         (call_expression function: (identifier) @call)",
    )
    .unwrap()
    .equals(0, "decl", "main")
    .unwrap()
    .predicate(1, PredicateCondition::text_equals(1, "helper").negated())
    .unwrap()
    .build();

    let results = capture_texts(
        &query,
        &parsed,
        &mut PredicateCursor::new(),
        SliceProvider::with_max_chunk(source, 3),
    );
    assert_eq!(results, vec!["main", "other"]);
}

#[test]
fn capture_to_capture_equality() {
    let source = b"package main\nfunc f() { a := a; b := c }\n";
    let parsed = parse(source);
    let parser = SourceParser::new(SupportLang::Go).unwrap();
    let query = PredicateQuery::builder(
        &parser.language(),
        "(short_var_declaration
           left: (expression_list (identifier) @left)
           right: (expression_list (identifier) @right))",
    )
    .unwrap()
    .equals_capture(0, "left", "right")
    .unwrap()
    .build();

    let results = capture_texts(
        &query,
        &parsed,
        &mut PredicateCursor::new(),
        SliceProvider::with_max_chunk(source, 1),
    );
    assert_eq!(results, vec!["a", "a"]);
}

#[test]
fn file_backed_provider() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("main.go");
    let source = b"package main\n\nfunc serve() {}\n\nfunc main() { serve() }\n";
    fs::write(&path, source).unwrap();

    let parsed = parse(source);
    let query = identifier_equals("serve");
    let provider = ReaderProvider::with_chunk_size(fs::File::open(&path).unwrap(), 3);

    let mut cursor = PredicateCursor::new();
    let mut captures = cursor.matches(&query, parsed.root_node(), provider);
    let mut count = 0;
    while let Some(m) = captures.next() {
        for capture in m.captures() {
            assert_eq!(parsed.node_text(capture.node), b"serve");
            count += 1;
        }
    }
    assert_eq!(count, 2);
    assert_eq!(captures.rejected(), 1);
    assert!(captures.provider().with(|provider| provider.last_error().is_none()));
}

#[test]
fn byte_range_limits_candidates() {
    let source = b"package main\nfunc keep() {}\nfunc skip() {}\n";
    let parsed = parse(source);
    let parser = SourceParser::new(SupportLang::Go).unwrap();
    let query = PredicateQuery::builder(&parser.language(), "((identifier) @id)")
        .unwrap()
        .matches(0, "id", "^(keep|skip)$")
        .unwrap()
        .build();

    let mut cursor = PredicateCursor::with_config(&CursorConfig {
        byte_range: Some(0..27),
        ..Default::default()
    });
    let results = capture_texts(&query, &parsed, &mut cursor, SliceProvider::new(source));
    assert_eq!(results, vec!["keep"]);
}

#[test]
fn stream_of_truncated_reads_terminates() {
    // Larger source so the provider runs dry half way through the file.
    let mut source = b"package main\n".to_vec();
    for i in 0..50 {
        source.extend_from_slice(format!("func f{i}() {{ f{i}() }}\n").as_bytes());
    }
    let parsed = parse(&source);
    let query = identifier_equals("f49");
    let half = source.len() / 2;

    let provider = from_fn(|offset: usize, _| {
        if offset >= half {
            return &[][..];
        }
        &source[offset..(offset + 1).min(source.len())]
    });

    let mut cursor = PredicateCursor::new();
    let mut captures = cursor.matches(&query, parsed.root_node(), provider);
    assert!(captures.next().is_none());
    assert!(captures.next().is_none());
    assert_eq!(captures.accepted(), 0);
    assert_eq!(captures.rejected(), 100);
}

#[test]
fn in_memory_cursor_source_behaves_like_a_file() {
    let source = b"package main; func test() {}";
    let parsed = parse(source);
    let query = identifier_equals("test");
    let provider = ReaderProvider::with_chunk_size(Cursor::new(source.to_vec()), 1);

    let results = capture_texts(&query, &parsed, &mut PredicateCursor::new(), provider);
    assert_eq!(results, vec!["test"]);
}

#[test]
fn string_literal_predicate_in_query_source() {
    let source = br#"package main; func test() string { return "hello"; }"#;
    let parsed = parse(source);
    let query = compile(r#"((interpreted_string_literal) @string (#eq? @string "\"hello\""))"#);

    let provider = from_fn(|offset: usize, _| {
        source.get(offset..(offset + 2).min(source.len())).unwrap_or_default()
    });
    let results = capture_texts(&query, &parsed, &mut PredicateCursor::new(), provider);
    assert_eq!(results, vec![r#""hello""#]);
}

#[test]
fn identifier_predicate_in_query_source() {
    let source = b"package main; func test() {}";
    let parsed = parse(source);

    let mut calls = 0;
    let provider = from_fn(|offset: usize, _| {
        calls += 1;
        source.get(offset..offset + 1).unwrap_or_default()
    });
    let query = compile(r#"((identifier) @id (#eq? @id "test"))"#);
    let results = capture_texts(&query, &parsed, &mut PredicateCursor::new(), provider);
    assert_eq!(results, vec!["test"]);
    assert!(calls > 0);

    let negated = compile(r#"((identifier) @id (#not-eq? @id "test"))"#);
    let results = capture_texts(
        &negated,
        &parsed,
        &mut PredicateCursor::new(),
        SliceProvider::with_max_chunk(source, 1),
    );
    assert!(results.is_empty());
}

#[test]
fn predicate_in_query_source_with_dry_provider() {
    let source = b"package main; func main() {}";
    let parsed = parse(source);
    let query = compile(r#"((identifier) @id (#eq? @id "main"))"#);

    let mut calls = 0;
    let provider = from_fn(|offset: usize, _| {
        calls += 1;
        if calls == 1 && offset < source.len() {
            return &source[offset..(offset + 2).min(source.len())];
        }
        &[][..]
    });
    let results = capture_texts(&query, &parsed, &mut PredicateCursor::new(), provider);
    assert!(results.is_empty());
}
