use logmatch::filter::{
    CompileErrors, ErrorCategory, ExpressionNode, FilterError, TokenKind, compile,
    parse_match_spec,
};
use logmatch::parser::Record;
use logmatch::schema::FieldSchema;

fn compile_combined(expression: &str) -> Result<ExpressionNode, CompileErrors> {
    compile(expression, &FieldSchema::combined())
}

fn record(method: &str, url: &str) -> Record {
    let mut fields = vec![String::new(); 10];
    fields[3] = method.to_string();
    fields[4] = url.to_string();
    Record::new(fields)
}

#[test]
fn test_shell_quotes_inside_expression_are_ignored() {
    let quoted = compile_combined(r#""method"='/GET/' && 'url'~"/x/""#).unwrap();
    let plain = compile_combined("method=/GET/ && url~/x/").unwrap();
    assert_eq!(quoted, plain);
}

#[test]
fn test_trailing_newlines_are_accepted() {
    assert!(compile_combined("method=/GET/\n").is_ok());
    assert!(compile_combined("method=/GET/\r\n\n").is_ok());
}

#[test]
fn test_newline_ends_the_expression() {
    let errors = compile_combined("method=/GET/\n&& url=/x/").unwrap_err();
    assert!(matches!(
        errors.first(),
        FilterError::TrailingInput { found } if found.kind == TokenKind::And
    ));
}

#[test]
fn test_empty_expression_is_rejected() {
    for source in ["", "   ", "\n"] {
        let errors = compile_combined(source).unwrap_err();
        assert!(
            matches!(errors.first(), FilterError::UnexpectedToken { found, .. } if found.kind == TokenKind::EndOfInput || found.kind == TokenKind::EndOfLine),
            "{source:?}: {errors}"
        );
    }
}

#[test]
fn test_single_ampersand_is_a_lexical_error() {
    let errors = compile_combined("method=/GET/ & url=/x/").unwrap_err();
    let first = errors.first();
    assert!(matches!(
        first,
        FilterError::IncompleteOperator { lexeme, offset: 13 } if lexeme == "&"
    ));
    assert_eq!(first.category(), ErrorCategory::Lexical);
}

#[test]
fn test_unterminated_pattern_is_reported() {
    let errors = compile_combined("url=/abc").unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, FilterError::UnterminatedPattern { offset: 4 }))
    );
}

#[test]
fn test_escaped_backslash_before_closing_delimiter() {
    let tree = compile_combined(r"url~/a\\/ && method=/GET/").unwrap();
    assert!(tree.matches(&record("GET", r"a\b")));
    assert!(!tree.matches(&record("GET", "ab")));
}

#[test]
fn test_exact_match_does_not_treat_value_as_regex() {
    let tree = compile_combined("url=/.*/").unwrap();
    assert!(tree.matches(&record("GET", ".*")));
    assert!(!tree.matches(&record("GET", "/index.html")));
}

#[test]
fn test_empty_pattern() {
    let exact = compile_combined("method=//").unwrap();
    assert!(exact.matches(&record("", "/")));
    assert!(!exact.matches(&record("GET", "/")));

    let regex = compile_combined("method~//").unwrap();
    assert!(regex.matches(&record("GET", "/")));
}

#[test]
fn test_double_negation() {
    let tree = compile_combined("--method=/GET/").unwrap();
    assert!(tree.matches(&record("GET", "/")));
    assert!(!tree.matches(&record("POST", "/")));
}

#[test]
fn test_match_spec_forms() {
    let schema = FieldSchema::combined();

    let exact = parse_match_spec("method=GET", &schema).unwrap();
    assert_eq!(exact, compile_combined("method=/GET/").unwrap());

    let regex = parse_match_spec("url~/^\\/api/", &schema).unwrap();
    assert!(regex.matches(&record("GET", "/api/v1")));

    assert!(matches!(
        parse_match_spec("method", &schema),
        Err(FilterError::InvalidMatchSpec(_))
    ));
    assert!(matches!(
        parse_match_spec("a=b=c", &schema),
        Err(FilterError::InvalidMatchSpec(_))
    ));
    assert!(matches!(
        parse_match_spec("verb=GET", &schema),
        Err(FilterError::UnknownField(name)) if name == "verb"
    ));
    assert!(matches!(
        parse_match_spec("url~(", &schema),
        Err(FilterError::InvalidRegex { .. })
    ));
}
