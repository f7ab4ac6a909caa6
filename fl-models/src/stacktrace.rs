//! Stack trace parsing.
//!
//! Extracts a best-effort source location from raw stack trace text,
//! independent of which runtime produced it. Lines are scanned top to
//! bottom; the first line that matches a known frame dialect and whose
//! file path is not an internal/vendor path wins.

use lazy_static::lazy_static;
use regex::Regex;

use crate::event::SourceContext;

lazy_static! {
    /// `at name (file:line:col)` - V8 style with an explicit function name.
    static ref FRAME_NAMED: Regex =
        Regex::new(r"^\s*at\s+(.+?)\s+\((.+?):(\d+):(\d+)\)\s*$").unwrap();
    /// `at file:line:col` - V8 style without a function name; also matches
    /// the location lines of Rust backtraces.
    static ref FRAME_BARE: Regex =
        Regex::new(r"^\s*at\s+(.+?):(\d+):(\d+)\s*$").unwrap();
    /// `name@file:line:col` - SpiderMonkey/JavaScriptCore style.
    static ref FRAME_AT_SIGN: Regex =
        Regex::new(r"^\s*(.*?)@(.+?):(\d+):(\d+)\s*$").unwrap();
}

/// Path fragments identifying frames inside the runtime or vendored code.
/// Frames matching any of these are skipped in favor of application frames.
const DENYLIST: &[&str] = &[
    "node_modules/",
    "internal/",
    "webpack/runtime",
    "__vite",
    "chrome-extension://",
];

/// Protocol prefixes stripped from file paths.
const PROTOCOL_PREFIXES: &[&str] = &["webpack://", "file://"];

/// Deployment root prefixes stripped from file paths.
const ROOT_PREFIXES: &[&str] = &["/var/task/", "/app/"];

/// Function-name prefixes added by module wrappers, stripped during cleaning.
const WRAPPER_PREFIXES: &[&str] = &["Object.", "Module.", "exports.", "async "];

/// Parse a raw stack trace into a best-effort source location.
///
/// Returns `None` when there is no stack text or no line survives
/// filtering and matching. Never panics; parsing the same text twice
/// yields identical results.
pub fn parse(stack: Option<&str>) -> Option<SourceContext> {
    let stack = stack?;
    for line in stack.lines() {
        if line.trim().is_empty() {
            continue;
        }
        // The leading error-message line matches no frame dialect and
        // falls through here like any other non-frame line.
        let Some(frame) = match_frame(line) else {
            continue;
        };
        if is_denied(&frame.file) {
            continue;
        }
        return Some(SourceContext {
            file_name: Some(normalize_path(&frame.file)),
            line_number: Some(frame.line),
            column_number: Some(frame.column),
            function_name: frame.function.as_deref().and_then(clean_function_name),
        });
    }
    None
}

/// A frame as matched, before path normalization and name cleaning.
struct RawFrame {
    function: Option<String>,
    file: String,
    line: u32,
    column: u32,
}

/// Try each frame dialect in order against a single line.
fn match_frame(line: &str) -> Option<RawFrame> {
    if let Some(caps) = FRAME_NAMED.captures(line) {
        return build_frame(
            Some(caps.get(1)?.as_str()),
            caps.get(2)?.as_str(),
            caps.get(3)?.as_str(),
            caps.get(4)?.as_str(),
        );
    }
    if let Some(caps) = FRAME_BARE.captures(line) {
        return build_frame(
            None,
            caps.get(1)?.as_str(),
            caps.get(2)?.as_str(),
            caps.get(3)?.as_str(),
        );
    }
    if let Some(caps) = FRAME_AT_SIGN.captures(line) {
        return build_frame(
            Some(caps.get(1)?.as_str()),
            caps.get(2)?.as_str(),
            caps.get(3)?.as_str(),
            caps.get(4)?.as_str(),
        );
    }
    None
}

fn build_frame(function: Option<&str>, file: &str, line: &str, column: &str) -> Option<RawFrame> {
    Some(RawFrame {
        function: function.map(str::to_string),
        file: file.to_string(),
        line: line.parse().ok()?,
        column: column.parse().ok()?,
    })
}

/// Whether a raw file path points into internal/vendor code.
fn is_denied(file: &str) -> bool {
    DENYLIST.iter().any(|fragment| file.contains(fragment))
}

/// Clean a raw function name: strip wrapper prefixes, trim, and collapse
/// unresolved names to absent.
fn clean_function_name(raw: &str) -> Option<String> {
    let mut name = raw.trim();
    let mut stripped = true;
    while stripped {
        stripped = false;
        for prefix in WRAPPER_PREFIXES {
            if let Some(rest) = name.strip_prefix(prefix) {
                name = rest;
                stripped = true;
            }
        }
    }
    let name = name.trim();
    if name.is_empty() || name == "<anonymous>" {
        None
    } else {
        Some(name.to_string())
    }
}

/// Normalize a raw file path: strip protocol prefixes, convert backslashes,
/// strip deployment roots, strip a leading slash.
fn normalize_path(raw: &str) -> String {
    let mut path = raw.trim().to_string();
    for prefix in PROTOCOL_PREFIXES {
        if let Some(rest) = path.strip_prefix(prefix) {
            path = rest.to_string();
        }
    }
    path = path.replace('\\', "/");
    for prefix in ROOT_PREFIXES {
        if let Some(rest) = path.strip_prefix(prefix) {
            path = rest.to_string();
        }
    }
    path.trim_start_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const V8_STACK: &str = "TypeError: x is not a function\n    at Object.run (/var/task/src/handlers/ingest.js:42:13)\n    at processTicksAndRejections (internal/process/task_queues.js:95:5)";

    #[test]
    fn test_parse_v8_named_frame() {
        let ctx = parse(Some(V8_STACK)).unwrap();
        assert_eq!(ctx.file_name.as_deref(), Some("src/handlers/ingest.js"));
        assert_eq!(ctx.line_number, Some(42));
        assert_eq!(ctx.column_number, Some(13));
        assert_eq!(ctx.function_name.as_deref(), Some("run"));
    }

    #[test]
    fn test_parse_skips_denylisted_frames() {
        let stack = "Error: boom\n    at wrap (/srv/node_modules/express/lib/router.js:3:1)\n    at handler (/app/src/routes.js:7:9)";
        let ctx = parse(Some(stack)).unwrap();
        assert_eq!(ctx.file_name.as_deref(), Some("src/routes.js"));
        assert_eq!(ctx.function_name.as_deref(), Some("handler"));
    }

    #[test]
    fn test_parse_at_sign_dialect() {
        let stack = "boom\nonClick@https://cdn.example.com/bundle.js:120:7";
        let ctx = parse(Some(stack)).unwrap();
        assert_eq!(ctx.file_name.as_deref(), Some("https://cdn.example.com/bundle.js"));
        assert_eq!(ctx.line_number, Some(120));
        assert_eq!(ctx.function_name.as_deref(), Some("onClick"));
    }

    #[test]
    fn test_parse_at_sign_anonymous() {
        let stack = "@file:///home/user/app/main.js:3:11";
        let ctx = parse(Some(stack)).unwrap();
        assert_eq!(ctx.file_name.as_deref(), Some("home/user/app/main.js"));
        assert!(ctx.function_name.is_none());
    }

    #[test]
    fn test_parse_bare_location_frame() {
        let stack = "Error\n    at /app/dist/server.js:10:2";
        let ctx = parse(Some(stack)).unwrap();
        assert_eq!(ctx.file_name.as_deref(), Some("dist/server.js"));
        assert!(ctx.function_name.is_none());
    }

    #[test]
    fn test_parse_rust_backtrace_location_line() {
        let stack = "panicked at 'boom'\n   3: app::handler\n             at ./src/handler.rs:27:14";
        let ctx = parse(Some(stack)).unwrap();
        assert_eq!(ctx.file_name.as_deref(), Some("./src/handler.rs"));
        assert_eq!(ctx.line_number, Some(27));
    }

    #[test]
    fn test_parse_none_and_empty() {
        assert!(parse(None).is_none());
        assert!(parse(Some("")).is_none());
        assert!(parse(Some("just a message\nwith another line")).is_none());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let first = parse(Some(V8_STACK));
        let second = parse(Some(V8_STACK));
        assert_eq!(first, second);
    }

    #[test]
    fn test_clean_function_name() {
        assert_eq!(clean_function_name("Object.run").as_deref(), Some("run"));
        assert_eq!(
            clean_function_name("async Module.exports.handler").as_deref(),
            Some("handler")
        );
        assert!(clean_function_name("<anonymous>").is_none());
        assert!(clean_function_name("   ").is_none());
    }

    #[test]
    fn test_normalize_path_windows_and_protocol() {
        assert_eq!(normalize_path("webpack://my-app/./src/index.ts"), "my-app/./src/index.ts");
        assert_eq!(normalize_path("C:\\builds\\app\\main.js"), "C:/builds/app/main.js");
        assert_eq!(normalize_path("/var/task/handler.js"), "handler.js");
        assert_eq!(normalize_path("/srv/web/index.js"), "srv/web/index.js");
    }
}
