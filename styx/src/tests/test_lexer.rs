use crate::ParseError;
use crate::lexer::{Lexer, Token, TokenKind};

fn tokens(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut out = Vec::new();
    loop {
        let token = lexer.next_token().unwrap();
        let done = token.kind == TokenKind::Eof;
        out.push(token);
        if done {
            break;
        }
    }
    out
}

fn kinds(input: &str) -> Vec<TokenKind> {
    tokens(input).into_iter().map(|t| t.kind).collect()
}

fn texts(input: &str) -> Vec<String> {
    tokens(input).into_iter().map(|t| t.text).collect()
}

fn spans(input: &str) -> Vec<(i32, i32)> {
    tokens(input)
        .into_iter()
        .map(|t| (t.span.start, t.span.end))
        .collect()
}

fn lex_err(input: &str) -> ParseError {
    let mut lexer = Lexer::new(input);
    loop {
        match lexer.next_token() {
            Ok(token) if token.kind == TokenKind::Eof => {
                panic!("expected a lex error for {input:?}")
            }
            Ok(_) => {}
            Err(err) => return err,
        }
    }
}

#[test]
fn test_single_char_tokens() {
    let input = "{}(),>";
    assert_eq!(
        kinds(input),
        vec![
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::Comma,
            TokenKind::Gt,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        spans(input),
        vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 6)]
    );
}

#[test]
fn test_at_and_tags() {
    let input = "@ @name @_x @a-b_9 @1";
    let toks = tokens(input);
    assert_eq!(
        toks.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::At,
            TokenKind::Tag,
            TokenKind::Tag,
            TokenKind::Tag,
            TokenKind::At,
            TokenKind::Scalar,
            TokenKind::Eof,
        ]
    );
    assert_eq!(toks[1].text, "name");
    assert_eq!(toks[2].text, "_x");
    assert_eq!(toks[3].text, "a-b_9");
    // The tag span covers the `@` through the last identifier byte.
    assert_eq!((toks[1].span.start, toks[1].span.end), (2, 7));
    // `@1` is a bare at; the digit starts its own scalar with no gap.
    assert_eq!((toks[4].span.start, toks[4].span.end), (19, 20));
    assert_eq!((toks[5].span.start, toks[5].span.end), (20, 21));
    assert!(!toks[5].had_whitespace_before);
}

#[test]
fn test_whitespace_and_newline_flags() {
    let toks = tokens("a b\nc // x\nd");
    assert_eq!(toks.len(), 5);

    assert!(!toks[0].had_whitespace_before && !toks[0].had_newline_before);
    assert!(toks[1].had_whitespace_before && !toks[1].had_newline_before);
    assert!(toks[2].had_whitespace_before && toks[2].had_newline_before);
    // `d` sits after a comment plus a newline.
    assert!(toks[3].had_whitespace_before && toks[3].had_newline_before);
}

#[test]
fn test_comment_at_eof_without_newline() {
    let toks = tokens("a // trailing");
    assert_eq!(toks.len(), 2);
    assert_eq!(toks[0].kind, TokenKind::Scalar);
    assert_eq!(toks[1].kind, TokenKind::Eof);
    assert_eq!((toks[1].span.start, toks[1].span.end), (13, 13));
    assert!(toks[1].had_whitespace_before);
}

#[test]
fn test_empty_and_blank_input() {
    let toks = tokens("");
    assert_eq!(toks.len(), 1);
    assert_eq!((toks[0].span.start, toks[0].span.end), (0, 0));

    let toks = tokens("  // x\n");
    assert_eq!(toks.len(), 1);
    assert_eq!(toks[0].kind, TokenKind::Eof);
    assert_eq!((toks[0].span.start, toks[0].span.end), (7, 7));
}

#[test]
fn test_bare_scalar_nonspecial_interior() {
    // `@`, `<`, `/`, `#` are only special at token start.
    assert_eq!(texts("a@b<c/d#e"), vec!["a@b<c/d#e", ""]);
    assert_eq!(kinds("a@b<c/d#e"), vec![TokenKind::Scalar, TokenKind::Eof]);

    assert_eq!(
        kinds("x{y"),
        vec![TokenKind::Scalar, TokenKind::LBrace, TokenKind::Scalar, TokenKind::Eof]
    );
}

#[test]
fn test_lt_without_second_lt_is_scalar() {
    assert_eq!(texts("<a"), vec!["<a", ""]);
    assert_eq!(texts("a<b"), vec!["a<b", ""]);
}

#[test]
fn test_quoted_basic_and_escapes() {
    let toks = tokens(r#""hello""#);
    assert_eq!(toks[0].kind, TokenKind::Quoted);
    assert_eq!(toks[0].text, "hello");
    assert_eq!((toks[0].span.start, toks[0].span.end), (0, 7));

    let toks = tokens(r#""a\nb\tc\\d\"e""#);
    assert_eq!(toks[0].text, "a\nb\tc\\d\"e");
}

#[test]
fn test_quoted_unicode_escapes() {
    let toks = tokens(r#""A\u{1F600}""#);
    assert_eq!(toks[0].text, "A\u{1F600}");

    let toks = tokens(r#""\u{7a}""#);
    assert_eq!(toks[0].text, "z");
}

#[test]
fn test_quoted_decodes_to_itself_without_escapes() {
    for inner in ["", "plain", "with spaces", "über"] {
        let input = format!("\"{inner}\"");
        let toks = tokens(&input);
        assert_eq!(toks[0].text, inner, "input: {input:?}");
    }
}

#[test]
fn test_invalid_escape() {
    let err = lex_err(r#""\x""#);
    assert_eq!(err.message, "invalid escape sequence: \\x");
    assert_eq!((err.span.start, err.span.end), (1, 3));
}

#[test]
fn test_invalid_unicode_escape() {
    let err = lex_err(r#""\u00zz""#);
    assert_eq!(err.message, "invalid escape sequence: \\u");
    assert_eq!((err.span.start, err.span.end), (1, 3));

    let err = lex_err(r#""\u{}""#);
    assert_eq!(err.message, "invalid escape sequence: \\u");
}

#[test]
fn test_backslash_at_eof() {
    let err = lex_err("\"abc\\");
    assert_eq!(err.message, "invalid escape sequence: \\");
    assert_eq!((err.span.start, err.span.end), (4, 5));
}

#[test]
fn test_quoted_unterminated_by_newline() {
    let err = lex_err("\"abc\ndef");
    assert_eq!(err.message, "unexpected token");
    assert_eq!((err.span.start, err.span.end), (0, 5));

    // A CRLF pair belongs to the span as a whole.
    let err = lex_err("\"a\r\nb");
    assert_eq!((err.span.start, err.span.end), (0, 4));
}

#[test]
fn test_quoted_unterminated_by_eof() {
    let err = lex_err("\"unterminated");
    assert_eq!(err.message, "unexpected token");
    assert_eq!((err.span.start, err.span.end), (0, 13));
}

#[test]
fn test_raw_strings() {
    let toks = tokens("r\"a\"");
    assert_eq!(toks[0].kind, TokenKind::Raw);
    assert_eq!(toks[0].text, "a");
    assert_eq!((toks[0].span.start, toks[0].span.end), (0, 4));

    // A quote inside the fence does not close a hashed raw string.
    let toks = tokens(r##"r#"a"b"#"##);
    assert_eq!(toks[0].text, "a\"b");
    assert_eq!((toks[0].span.start, toks[0].span.end), (0, 8));

    // No escape processing at all.
    let toks = tokens(r#"r"a\nb""#);
    assert_eq!(toks[0].text, "a\\nb");
}

#[test]
fn test_raw_string_unclosed() {
    let err = lex_err("r\"abc");
    assert_eq!(err.message, "unclosed raw string");
    assert_eq!((err.span.start, err.span.end), (0, 5));

    let err = lex_err("r##\"abc\"#");
    assert_eq!(err.message, "unclosed raw string");
    assert_eq!(err.span.start, 0);
}

#[test]
fn test_heredoc_basic() {
    let toks = tokens("<<END\nhello\nEND\n");
    assert_eq!(toks[0].kind, TokenKind::Heredoc);
    assert_eq!(toks[0].text, "hello");
    assert_eq!((toks[0].span.start, toks[0].span.end), (0, 15));
}

#[test]
fn test_heredoc_multiline_round_trip() {
    // With no dedent, the text is exactly the body lines joined by `\n`.
    let toks = tokens("<<EOT\nline one\n\nline three\nEOT\n");
    assert_eq!(toks[0].text, "line one\n\nline three");
}

#[test]
fn test_heredoc_dedent() {
    let toks = tokens("<<END\n  hello\n  END\n");
    assert_eq!(toks[0].text, "hello");

    // Lines keep whatever indentation exceeds the closing line's.
    let toks = tokens("<<E\n    a\n  b\n  E\n");
    assert_eq!(toks[0].text, "  a\nb");

    // Lines with less leading whitespace than the close lose what they have.
    let toks = tokens("<<E\na\n  E\n");
    assert_eq!(toks[0].text, "a");
}

#[test]
fn test_heredoc_comma_delimiter_suffix() {
    let toks = tokens("<<END,rust\nx\nEND\n");
    assert_eq!(toks[0].kind, TokenKind::Heredoc);
    assert_eq!(toks[0].text, "x");
}

#[test]
fn test_heredoc_unclosed() {
    let err = lex_err("<<END\nabc\n");
    assert_eq!(err.message, "unexpected token");
    // The span covers the body, from just after the opening line to EOF.
    assert_eq!((err.span.start, err.span.end), (6, 10));
}

#[test]
fn test_heredoc_requires_uppercase() {
    let err = lex_err("<<foo\nx");
    assert_eq!(err.message, "unexpected token");
    assert_eq!((err.span.start, err.span.end), (0, 2));

    let err = lex_err("<<");
    assert_eq!((err.span.start, err.span.end), (0, 2));
}

#[test]
fn test_multibyte_spans() {
    // Spans are byte offsets, not character counts.
    let toks = tokens("Ä b");
    assert_eq!((toks[0].span.start, toks[0].span.end), (0, 2));
    assert_eq!((toks[1].span.start, toks[1].span.end), (3, 4));
}
