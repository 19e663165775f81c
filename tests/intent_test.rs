use codeport::services::intent::{classify, detect_code, detect_translation_request, CodeDetection, MessageIntent};
use codeport::services::translator::extract_code;

#[test]
fn test_fenced_block_reports_tag_and_trimmed_body() {
    let detection = detect_code("look at this:\n```rust\n  fn main() {}  \n```\nthanks");

    assert_eq!(
        detection,
        CodeDetection::FencedBlock {
            code: "fn main() {}".to_string(),
            language: Some("rust".to_string()),
        }
    );
    assert_eq!(detection.language(), Some("rust"));
}

#[test]
fn test_untagged_fence_has_no_language() {
    let detection = detect_code("```\nx = 1\n```");
    assert_eq!(detection.code(), Some("x = 1"));
    assert_eq!(detection.language(), None);
}

#[test]
fn test_inline_span_without_fence() {
    assert_eq!(
        detect_code("what does `len(xs)` return?"),
        CodeDetection::InlineSpan {
            code: "len(xs)".to_string()
        }
    );
}

#[test]
fn test_keyword_heuristic_takes_whole_message() {
    let message = "def add(a, b): return a + b";
    assert_eq!(
        detect_code(message),
        CodeDetection::KeywordHeuristic {
            code: message.to_string()
        }
    );
    assert_eq!(detect_code("how are you today?"), CodeDetection::None);
}

#[test]
fn test_translate_template_classifies_as_translation() {
    assert_eq!(
        classify("translate this from python to javascript: ```print('hi')```"),
        MessageIntent::Translate {
            code: "print('hi')".to_string(),
            source_language: "python".to_string(),
            target_language: "javascript".to_string(),
        }
    );
}

#[test]
fn test_template_drops_the_fence_tag_line() {
    let intent = classify("translate this from python to javascript:\n```python\nprint('hi')\n```");
    assert_eq!(
        intent,
        MessageIntent::Translate {
            code: "print('hi')".to_string(),
            source_language: "python".to_string(),
            target_language: "javascript".to_string(),
        }
    );

    let crlf = detect_translation_request("convert from cpp to rust ```cpp\r\nint x = 1;\r\n```").unwrap();
    assert_eq!(crlf.code, "int x = 1;");
}

#[test]
fn test_convert_template_and_case_insensitivity() {
    let intent = detect_translation_request("Convert the code FROM Java TO Go - `System.out.println(1);`").unwrap();
    assert_eq!(intent.language_pair(), Some(("Java", "Go")));
    assert_eq!(intent.code, "System.out.println(1);");
}

#[test]
fn test_loose_pair_is_paired_with_detected_code() {
    let intent = detect_translation_request("I wrote this in ruby, can you move it into python?\n```ruby\nputs 1\n```")
        .unwrap();
    assert_eq!(intent.language_pair(), Some(("ruby", "python")));
    assert_eq!(intent.code, "puts 1");
}

#[test]
fn test_code_without_language_pair_is_not_a_translation() {
    let intent = classify("can you explain ```python\nprint(1)\n```");
    assert!(!intent.is_translation());
    assert!(matches!(intent, MessageIntent::ContainsCode(CodeDetection::FencedBlock { .. })));

    // Template matched, but no pair: falls through.
    assert!(!classify("translate this: `x = 1`").is_translation());
    assert_eq!(classify("hello there"), MessageIntent::Chat);
}

#[test]
fn test_extraction_takes_first_block_and_is_idempotent() {
    let reply = "Here you go:\n```go\nfmt.Println(1)\n```\nand also\n```go\nfmt.Println(2)\n```";
    let extracted = extract_code(reply);
    assert_eq!(extracted, "fmt.Println(1)");

    let refenced = format!("```go\n{extracted}\n```");
    assert_eq!(extract_code(&refenced), extracted);
}

#[test]
fn test_extraction_falls_back_to_whole_reply() {
    assert_eq!(extract_code("  console.log(1);\n"), "console.log(1);");
    assert_eq!(extract_code(&extract_code("  console.log(1);\n")), "console.log(1);");
}
