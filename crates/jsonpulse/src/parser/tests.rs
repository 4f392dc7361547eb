use alloc::{
    boxed::Box,
    string::{String, ToString},
    vec,
    vec::Vec,
};

use quickcheck_macros::quickcheck;
use rstest::rstest;

use crate::{
    ErrorAction, ErrorKind, ErrorPolicy, JsonParser, JsonVisitor, ParseContext, ParseError,
    ParseOptions, SemanticTag, VisitError, VisitResult,
};

#[derive(Debug, Clone, PartialEq)]
enum Ev {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Key(String),
    Str(String, SemanticTag),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Null,
}

#[derive(Debug, Default)]
struct Recorder {
    events: Vec<Ev>,
    flushed: bool,
}

impl JsonVisitor for Recorder {
    fn begin_object(&mut self, _tag: SemanticTag, _ctx: &ParseContext) -> VisitResult {
        self.events.push(Ev::BeginObject);
        Ok(())
    }

    fn end_object(&mut self, _ctx: &ParseContext) -> VisitResult {
        self.events.push(Ev::EndObject);
        Ok(())
    }

    fn begin_array(&mut self, _tag: SemanticTag, _ctx: &ParseContext) -> VisitResult {
        self.events.push(Ev::BeginArray);
        Ok(())
    }

    fn end_array(&mut self, _ctx: &ParseContext) -> VisitResult {
        self.events.push(Ev::EndArray);
        Ok(())
    }

    fn key(&mut self, name: &str, _ctx: &ParseContext) -> VisitResult {
        self.events.push(Ev::Key(name.to_string()));
        Ok(())
    }

    fn string_value(&mut self, value: &str, tag: SemanticTag, _ctx: &ParseContext) -> VisitResult {
        self.events.push(Ev::Str(value.to_string(), tag));
        Ok(())
    }

    fn int64_value(&mut self, value: i64, _tag: SemanticTag, _ctx: &ParseContext) -> VisitResult {
        self.events.push(Ev::I64(value));
        Ok(())
    }

    fn uint64_value(&mut self, value: u64, _tag: SemanticTag, _ctx: &ParseContext) -> VisitResult {
        self.events.push(Ev::U64(value));
        Ok(())
    }

    fn double_value(&mut self, value: f64, _tag: SemanticTag, _ctx: &ParseContext) -> VisitResult {
        self.events.push(Ev::F64(value));
        Ok(())
    }

    fn bool_value(&mut self, value: bool, _tag: SemanticTag, _ctx: &ParseContext) -> VisitResult {
        self.events.push(Ev::Bool(value));
        Ok(())
    }

    fn null_value(&mut self, _tag: SemanticTag, _ctx: &ParseContext) -> VisitResult {
        self.events.push(Ev::Null);
        Ok(())
    }

    fn flush(&mut self) {
        self.flushed = true;
    }
}

fn parse_all(input: &[u8], options: ParseOptions) -> Result<Vec<Ev>, ParseError> {
    let mut parser = JsonParser::new(options);
    let mut recorder = Recorder::default();
    parser.feed(input);
    parser.finish(&mut recorder)?;
    Ok(recorder.events)
}

fn parse_with_policy(
    input: &[u8],
    options: ParseOptions,
    policy: ErrorPolicy,
) -> Result<Vec<Ev>, ParseError> {
    let mut parser = JsonParser::with_error_policy(options, policy);
    let mut recorder = Recorder::default();
    parser.feed(input);
    parser.finish(&mut recorder)?;
    Ok(recorder.events)
}

fn permissive() -> ErrorPolicy {
    Box::new(|_, _| ErrorAction::Continue)
}

#[test]
fn object_with_nested_array() {
    let events = parse_all(br#"{"a":1,"b":[true,false,null]}"#, ParseOptions::default()).unwrap();
    assert_eq!(
        events,
        vec![
            Ev::BeginObject,
            Ev::Key("a".to_string()),
            Ev::I64(1),
            Ev::Key("b".to_string()),
            Ev::BeginArray,
            Ev::Bool(true),
            Ev::Bool(false),
            Ev::Null,
            Ev::EndArray,
            Ev::EndObject,
        ]
    );
}

#[test]
fn flush_runs_once_at_document_end() {
    let mut parser = JsonParser::new(ParseOptions::default());
    let mut recorder = Recorder::default();
    parser.feed(b"[]");
    parser.finish(&mut recorder).unwrap();
    assert!(recorder.flushed);
    assert!(parser.is_complete());
}

#[test]
fn integers_classify_by_magnitude() {
    let events = parse_all(
        br#"[0,-42,9223372036854775807,-9223372036854775808,9223372036854775808,18446744073709551615]"#,
        ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(
        events,
        vec![
            Ev::BeginArray,
            Ev::I64(0),
            Ev::I64(-42),
            Ev::I64(i64::MAX),
            Ev::I64(i64::MIN),
            Ev::U64(9_223_372_036_854_775_808),
            Ev::U64(u64::MAX),
            Ev::EndArray,
        ]
    );
}

#[test]
fn oversized_integer_passes_through_as_text() {
    let text = "123456789012345678901234567890";
    let events = parse_all(text.as_bytes(), ParseOptions::default()).unwrap();
    assert_eq!(events, vec![Ev::Str(text.to_string(), SemanticTag::BigInt)]);

    let events = parse_all(b"-9223372036854775809", ParseOptions::default()).unwrap();
    assert_eq!(
        events,
        vec![Ev::Str("-9223372036854775809".to_string(), SemanticTag::BigInt)]
    );
}

#[test]
fn fraction_narrows_to_double_by_default() {
    let events = parse_all(b"0.1", ParseOptions::default()).unwrap();
    assert_eq!(events, vec![Ev::F64(0.1)]);
}

#[test]
fn fraction_stays_text_in_lossless_mode() {
    let options = ParseOptions {
        lossless_number: true,
        ..ParseOptions::default()
    };
    let events = parse_all(b"0.1", options).unwrap();
    assert_eq!(events, vec![Ev::Str("0.1".to_string(), SemanticTag::BigDec)]);
}

#[test]
fn double_overflow_saturates_to_infinity() {
    let events = parse_all(b"[1e400,-1e400]", ParseOptions::default()).unwrap();
    assert_eq!(
        events,
        vec![
            Ev::BeginArray,
            Ev::F64(f64::INFINITY),
            Ev::F64(f64::NEG_INFINITY),
            Ev::EndArray,
        ]
    );
}

#[test]
fn double_overflow_stays_text_with_lossless_bignum() {
    let options = ParseOptions {
        lossless_bignum: true,
        ..ParseOptions::default()
    };
    let events = parse_all(b"1e400", options).unwrap();
    assert_eq!(
        events,
        vec![Ev::Str("1e400".to_string(), SemanticTag::BigDec)]
    );
}

#[test]
fn two_chunk_object_matches_whole_parse() {
    let whole = parse_all(br#"{"k":1}"#, ParseOptions::default()).unwrap();

    let mut parser = JsonParser::new(ParseOptions::default());
    let mut recorder = Recorder::default();
    parser.feed(br#"{"k""#);
    parser.parse_step(&mut recorder).unwrap();
    assert!(parser.needs_more_input());
    parser.feed(br#":1}"#);
    parser.finish(&mut recorder).unwrap();

    assert_eq!(recorder.events, whole);
}

#[test]
fn number_split_across_three_chunks() {
    let mut parser = JsonParser::new(ParseOptions::default());
    let mut recorder = Recorder::default();
    for chunk in [&b"12"[..], b"3.4", b"e2"] {
        parser.feed(chunk);
        parser.parse_step(&mut recorder).unwrap();
    }
    parser.finish(&mut recorder).unwrap();
    assert_eq!(recorder.events, vec![Ev::F64(12340.0)]);
}

#[test]
fn carriage_return_split_across_chunks() {
    let mut parser = JsonParser::new(ParseOptions::default());
    let mut recorder = Recorder::default();
    parser.feed(b"[1,\r");
    parser.parse_step(&mut recorder).unwrap();
    parser.feed(b"\n2]");
    parser.finish(&mut recorder).unwrap();
    assert_eq!(
        recorder.events,
        vec![Ev::BeginArray, Ev::I64(1), Ev::I64(2), Ev::EndArray]
    );
    assert_eq!(parser.line(), 2);
}

#[quickcheck]
fn chunk_partition_is_invariant(cuts: Vec<usize>) -> bool {
    let doc: &[u8] =
        r#"{"k":[1,2.5,true,null,"sé😀",{"n":-3}],"big":123456789012345678901234567890}"#
            .as_bytes();
    let whole = parse_all(doc, ParseOptions::default()).unwrap();

    let mut cuts: Vec<usize> = cuts.into_iter().map(|c| c % (doc.len() + 1)).collect();
    cuts.sort_unstable();

    let mut parser = JsonParser::new(ParseOptions::default());
    let mut recorder = Recorder::default();
    let mut prev = 0;
    for cut in cuts {
        parser.feed(&doc[prev..cut]);
        parser.parse_step(&mut recorder).unwrap();
        prev = cut;
    }
    parser.feed(&doc[prev..]);
    parser.finish(&mut recorder).unwrap();
    recorder.events == whole
}

#[test]
fn byte_at_a_time_matches_whole_parse() {
    let doc: &[u8] = br#"[{"aA":[1.5e-3,"x"]},false]"#;
    let whole = parse_all(doc, ParseOptions::default()).unwrap();

    let mut parser = JsonParser::new(ParseOptions::default());
    let mut recorder = Recorder::default();
    for b in doc {
        parser.feed(core::slice::from_ref(b));
        parser.parse_step(&mut recorder).unwrap();
    }
    parser.finish(&mut recorder).unwrap();
    assert_eq!(recorder.events, whole);
}

#[test]
fn escapes_decode_into_string_content() {
    let events = parse_all(br#""a\"\\\/\b\f\n\r\tA""#, ParseOptions::default()).unwrap();
    assert_eq!(
        events,
        vec![Ev::Str(
            "a\"\\/\u{8}\u{c}\n\r\tA".to_string(),
            SemanticTag::None
        )]
    );
}

#[test]
fn surrogate_pair_escape_decodes_to_one_scalar() {
    let events = parse_all(br#""\ud83d\ude00""#, ParseOptions::default()).unwrap();
    assert_eq!(
        events,
        vec![Ev::Str("\u{1F600}".to_string(), SemanticTag::None)]
    );
}

#[test]
fn raw_multibyte_utf8_passes_through() {
    let events = parse_all(r#""sé😀""#.as_bytes(), ParseOptions::default()).unwrap();
    assert_eq!(events, vec![Ev::Str("sé😀".to_string(), SemanticTag::None)]);
}

#[test]
fn control_byte_in_string_rejected_by_default() {
    let err = parse_all(b"\"a\x01b\"", ParseOptions::default()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::IllegalControlCharacter));
    assert_eq!(err.offset(), 2);
}

#[test]
fn raw_newline_in_string_rejected_by_default() {
    let err = parse_all(b"\"a\nb\"", ParseOptions::default()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::IllegalCharacterInString));
}

#[test]
fn policy_can_skip_illegal_string_bytes() {
    let events =
        parse_with_policy(b"\"a\x01b\"", ParseOptions::default(), permissive()).unwrap();
    assert_eq!(events, vec![Ev::Str("ab".to_string(), SemanticTag::None)]);

    let events = parse_with_policy(b"\"a\nb\"", ParseOptions::default(), permissive()).unwrap();
    assert_eq!(events, vec![Ev::Str("ab".to_string(), SemanticTag::None)]);
}

#[test]
fn overlong_utf8_is_rejected() {
    let input = [b'"', 0xC0, 0x80, b'"'];
    let err = parse_all(&input, ParseOptions::default()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::OverlongUtf8Sequence));
}

#[test]
fn encoded_surrogate_is_rejected() {
    let input = [b'"', 0xED, 0xA0, 0x80, b'"'];
    let err = parse_all(&input, ParseOptions::default()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::IllegalSurrogateValue));
}

#[rstest]
#[case(&b"01"[..], ErrorKind::LeadingZero)]
#[case(&b"-"[..], ErrorKind::UnexpectedEof)]
#[case(&b"1e"[..], ErrorKind::UnexpectedEof)]
#[case(&b"1e+"[..], ErrorKind::UnexpectedEof)]
#[case(&b"1."[..], ErrorKind::UnexpectedEof)]
#[case(&b"1.e3"[..], ErrorKind::InvalidNumber)]
#[case(&b"tru"[..], ErrorKind::UnexpectedEof)]
#[case(&b"trux"[..], ErrorKind::InvalidValue)]
#[case(&b"nil"[..], ErrorKind::InvalidValue)]
#[case(&b"]"[..], ErrorKind::UnexpectedRightBracket)]
#[case(&b"}"[..], ErrorKind::UnexpectedRightBrace)]
#[case(&b"[1}"[..], ErrorKind::ExpectedCommaOrRightBracket)]
#[case(br#"{"a":1]"#, ErrorKind::ExpectedCommaOrRightBrace)]
#[case(br#"{"a" 1}"#, ErrorKind::ExpectedColon)]
#[case(br#"{"a":1"#, ErrorKind::UnexpectedEof)]
#[case(br#"{"a":}"#, ErrorKind::ExpectedValue)]
#[case(br#""\x""#, ErrorKind::IllegalEscapedCharacter)]
#[case(br#""\uZZZZ""#, ErrorKind::InvalidUnicodeEscape)]
#[case(br#""\udc00""#, ErrorKind::InvalidUnicodeEscape)]
#[case(br#""\ud800""#, ErrorKind::ExpectedSurrogatePair)]
#[case(br#""\ud800\udb00""#, ErrorKind::ExpectedSurrogatePair)]
#[case(br#""open"#, ErrorKind::UnexpectedEof)]
#[case(&b"'a'"[..], ErrorKind::SingleQuote)]
#[case(&b"[,1]"[..], ErrorKind::ExpectedValue)]
#[case(&b"\x01"[..], ErrorKind::IllegalControlCharacter)]
#[case(&b"{\x02}"[..], ErrorKind::IllegalControlCharacter)]
#[case(&b"[1\x03]"[..], ErrorKind::IllegalControlCharacter)]
#[case(&b""[..], ErrorKind::UnexpectedEof)]
#[case(&b"[1,2,]"[..], ErrorKind::ExtraComma)]
#[case(br#"{"a":1,}"#, ErrorKind::ExtraComma)]
#[case(&b"{} x"[..], ErrorKind::ExtraCharacter)]
fn malformed_input_is_rejected(#[case] input: &[u8], #[case] kind: ErrorKind) {
    let err = parse_all(input, ParseOptions::default()).unwrap_err();
    assert_eq!(err.kind(), Some(kind));
}

#[test]
fn expected_key_error_points_at_the_comma() {
    let err = parse_all(b"{,}", ParseOptions::default()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::ExpectedKey));
    assert_eq!(err.offset(), 1);
    assert_eq!(err.line(), 1);
    assert_eq!(err.column(), 2);
}

#[test]
fn error_position_tracks_lines() {
    let err = parse_all(b"[\n  1,\n  x\n]", ParseOptions::default()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::ExpectedValue));
    assert_eq!(err.line(), 3);
    assert_eq!(err.column(), 3);
}

#[test]
fn depth_at_limit_succeeds() {
    let options = ParseOptions {
        max_nesting_depth: 3,
        ..ParseOptions::default()
    };
    let events = parse_all(b"[[[]]]", options).unwrap();
    assert_eq!(events.len(), 6);
}

#[test]
fn depth_beyond_limit_fails_at_the_bracket() {
    let options = ParseOptions {
        max_nesting_depth: 3,
        ..ParseOptions::default()
    };
    let err = parse_all(b"[[[[]]]]", options).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::MaxNestingDepthExceeded));
    assert_eq!(err.offset(), 3);
}

#[test]
fn trailing_comma_accepted_when_allowed() {
    let options = ParseOptions {
        allow_trailing_comma: true,
        ..ParseOptions::default()
    };
    let events = parse_all(b"[1,2,]", options.clone()).unwrap();
    assert_eq!(
        events,
        vec![Ev::BeginArray, Ev::I64(1), Ev::I64(2), Ev::EndArray]
    );

    let events = parse_all(br#"{"a":1,}"#, options).unwrap();
    assert_eq!(
        events,
        vec![Ev::BeginObject, Ev::Key("a".to_string()), Ev::I64(1), Ev::EndObject]
    );
}

#[test]
fn comments_rejected_by_default() {
    let err = parse_all(br#"/* c */ {"a":1}"#, ParseOptions::default()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::IllegalComment));
}

#[test]
fn comments_skipped_when_allowed() {
    let options = ParseOptions {
        allow_comments: true,
        ..ParseOptions::default()
    };
    let events = parse_all(br#"/* c */ {"a": /* mid */ 1} "#, options.clone()).unwrap();
    assert_eq!(
        events,
        vec![Ev::BeginObject, Ev::Key("a".to_string()), Ev::I64(1), Ev::EndObject]
    );

    let events = parse_all(b"[1, // one\n 2]", options.clone()).unwrap();
    assert_eq!(
        events,
        vec![Ev::BeginArray, Ev::I64(1), Ev::I64(2), Ev::EndArray]
    );

    // A star run still closes the comment.
    let events = parse_all(b"/* ** */ 1", options).unwrap();
    assert_eq!(events, vec![Ev::I64(1)]);
}

#[test]
fn policy_can_recover_from_extra_comma() {
    let events =
        parse_with_policy(b"[1,2,]", ParseOptions::default(), permissive()).unwrap();
    assert_eq!(
        events,
        vec![Ev::BeginArray, Ev::I64(1), Ev::I64(2), Ev::EndArray]
    );
}

#[test]
fn policy_can_recover_from_a_leading_comma_in_array() {
    let events = parse_with_policy(b"[,1]", ParseOptions::default(), permissive()).unwrap();
    assert_eq!(events, vec![Ev::BeginArray, Ev::I64(1), Ev::EndArray]);
}

#[test]
fn policy_can_skip_a_bad_member_name() {
    let events = parse_with_policy(b"{,}", ParseOptions::default(), permissive()).unwrap();
    assert_eq!(events, vec![Ev::BeginObject, Ev::EndObject]);
}

#[test]
fn policy_can_skip_trailing_characters() {
    let events =
        parse_with_policy(b"{} trailing", ParseOptions::default(), permissive()).unwrap();
    assert_eq!(events, vec![Ev::BeginObject, Ev::EndObject]);
}

#[test]
fn policy_sees_the_condition_and_position() {
    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = seen.clone();
    let policy: ErrorPolicy = Box::new(move |kind, ctx| {
        if let Ok(mut log) = sink.lock() {
            log.push((kind, ctx.offset));
        }
        ErrorAction::Continue
    });
    parse_with_policy(b"[1,2,]", ParseOptions::default(), policy).unwrap();
    let log = seen.lock().unwrap();
    assert_eq!(&*log, &[(ErrorKind::ExtraComma, 5)]);
}

#[test]
fn policy_cannot_recover_from_depth_overflow() {
    let options = ParseOptions {
        max_nesting_depth: 1,
        ..ParseOptions::default()
    };
    let err = parse_with_policy(b"[[1]]", options, permissive()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::MaxNestingDepthExceeded));
}

#[test]
fn visitor_error_aborts_the_parse() {
    struct Refuser;
    impl JsonVisitor for Refuser {
        fn int64_value(
            &mut self,
            _value: i64,
            _tag: SemanticTag,
            _ctx: &ParseContext,
        ) -> VisitResult {
            Err(VisitError::new("no integers here"))
        }
    }

    let mut parser = JsonParser::new(ParseOptions::default());
    let mut visitor = Refuser;
    parser.feed(b"[1]");
    let err = parser.finish(&mut visitor).unwrap_err();
    assert_eq!(err.kind(), None);
}

#[test]
fn cursor_mode_pauses_after_each_event() {
    let mut parser = JsonParser::new(ParseOptions::default());
    parser.set_cursor_mode(true);
    let mut recorder = Recorder::default();
    parser.feed(b"[1,2]");

    parser.parse_step(&mut recorder).unwrap();
    assert_eq!(recorder.events, vec![Ev::BeginArray]);
    parser.parse_step(&mut recorder).unwrap();
    assert_eq!(recorder.events.len(), 2);
    parser.parse_step(&mut recorder).unwrap();
    assert_eq!(recorder.events.len(), 3);
    parser.parse_step(&mut recorder).unwrap();
    assert_eq!(recorder.events.len(), 4);
    assert!(parser.is_complete());
}

#[test]
fn nan_and_infinity_literal_mappings() {
    let options = ParseOptions {
        nan_str: Some("NaN".to_string()),
        inf_str: Some("Infinity".to_string()),
        neginf_str: Some("-Infinity".to_string()),
        ..ParseOptions::default()
    };
    let events = parse_all(br#"["NaN","Infinity","-Infinity","plain"]"#, options).unwrap();
    assert!(matches!(events[1], Ev::F64(d) if d.is_nan()));
    assert_eq!(events[2], Ev::F64(f64::INFINITY));
    assert_eq!(events[3], Ev::F64(f64::NEG_INFINITY));
    assert_eq!(events[4], Ev::Str("plain".to_string(), SemanticTag::None));
}

#[test]
fn mapped_literal_is_not_applied_to_member_names() {
    let options = ParseOptions {
        nan_str: Some("NaN".to_string()),
        ..ParseOptions::default()
    };
    let events = parse_all(br#"{"NaN":"NaN"}"#, options).unwrap();
    assert_eq!(events[1], Ev::Key("NaN".to_string()));
    assert!(matches!(events[2], Ev::F64(d) if d.is_nan()));
}

#[test]
fn reset_allows_reuse_for_a_new_document() {
    let mut parser = JsonParser::new(ParseOptions::default());
    let mut recorder = Recorder::default();
    parser.feed(b"[1]");
    parser.finish(&mut recorder).unwrap();
    assert!(parser.is_complete());

    parser.reset();
    assert!(!parser.is_complete());
    assert_eq!(parser.line(), 1);
    assert_eq!(parser.offset(), 0);

    let mut second = Recorder::default();
    parser.feed(b"2");
    parser.finish(&mut second).unwrap();
    assert_eq!(second.events, vec![Ev::I64(2)]);
}

#[test]
fn level_tracks_open_containers() {
    let mut parser = JsonParser::new(ParseOptions::default());
    let mut recorder = Recorder::default();
    parser.feed(br#"[{"a":["#);
    parser.parse_step(&mut recorder).unwrap();
    assert_eq!(parser.level(), 3);
    parser.feed(b"]}]");
    parser.finish(&mut recorder).unwrap();
    assert_eq!(parser.level(), 0);
}

#[test]
fn trailing_crlf_split_across_chunks_counts_one_line() {
    let mut parser = JsonParser::new(ParseOptions::default());
    let mut recorder = Recorder::default();
    parser.feed(b"1 \r");
    parser.parse_step(&mut recorder).unwrap();
    parser.check_done().unwrap();
    parser.feed(b"\n");
    parser.check_done().unwrap();
    assert_eq!(recorder.events, vec![Ev::I64(1)]);
    assert_eq!(parser.line(), 2);
}

#[test]
fn whitespace_around_document_is_ignored() {
    let events = parse_all(b" \t\r\n true \n", ParseOptions::default()).unwrap();
    assert_eq!(events, vec![Ev::Bool(true)]);
}
