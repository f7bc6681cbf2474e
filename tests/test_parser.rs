#[cfg(test)]
mod tests {
    use logmatch::parser::{LineParseError, parse_combined_entry, parse_combined_line};
    use logmatch::schema::FieldSchema;

    #[test]
    fn test_parse_apache_combined_line() {
        let line = r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326 "http://www.example.com/start.html" "Mozilla/4.08 [en] (Win98; I ;Nav)""#;
        let record = parse_combined_line(line).expect("Failed to parse combined line");
        let schema = FieldSchema::combined();

        let value = |name: &str| {
            let index = schema.index_of(name).expect("known field");
            record.field(index).expect("field present").to_string()
        };

        assert_eq!(value("ipaddr"), "127.0.0.1");
        assert_eq!(value("garbage"), "frank");
        assert_eq!(value("timestamp"), "[10/Oct/2000:13:55:36 -0700]");
        assert_eq!(value("method"), "GET");
        assert_eq!(value("url"), "/apache_pb.gif");
        assert_eq!(value("version"), "HTTP/1.0");
        assert_eq!(value("code"), "200");
        assert_eq!(value("size"), "2326");
        assert_eq!(value("referrer"), "http://www.example.com/start.html");
        assert_eq!(value("useragent"), "Mozilla/4.08 [en] (Win98; I ;Nav)");
    }

    #[test]
    fn test_request_with_extra_words_keeps_first_three() {
        let line = r#"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET /a b HTTP/1.1" 200 1 "-" "-""#;
        let record = parse_combined_line(line).expect("Failed to parse line");
        assert_eq!(&record[3], "GET");
        assert_eq!(&record[4], "/a");
        assert_eq!(&record[5], "b");
    }

    #[test]
    fn test_empty_request_section() {
        let line = r#"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "" 408 0 "-" "-""#;
        let record = parse_combined_line(line).expect("Failed to parse line");
        assert_eq!(record.len(), 10);
        assert!(record.fields()[3..6].iter().all(String::is_empty));
        assert_eq!(&record[6], "408");
    }

    #[test]
    fn test_non_numeric_size_is_rejected() {
        let line = r#"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 - "-" "-""#;
        assert_eq!(
            parse_combined_line(line),
            Err(LineParseError::Partial("ip address, timestamp, request and code"))
        );
    }

    #[test]
    fn test_common_log_format_is_partial() {
        let line = r#"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 512"#;
        let err = parse_combined_line(line).unwrap_err();
        assert_eq!(
            err,
            LineParseError::Partial("ip address, timestamp, request, code and size")
        );
        assert!(err.to_string().contains("code and size"));
    }

    #[test]
    fn test_blank_line_is_rejected() {
        assert_eq!(parse_combined_line(""), Err(LineParseError::NoMatch));
    }

    #[test]
    fn test_entry_line_is_not_rewritten() {
        let line = r#"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 5 "-" "say \"hi\"""#;
        let entry = parse_combined_entry(line).expect("Failed to parse line");
        assert_eq!(entry.line, line);
        assert_eq!(&entry.record[9], "say ''hi''");
    }
}
