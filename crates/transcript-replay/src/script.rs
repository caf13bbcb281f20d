//! Step-event scripts: JSONL files with one `StepEvent` per line.

use std::path::Path;

use anyhow::{Context as _, bail};
use transcript_core::StepEvent;

/// Parses a JSONL script. Blank lines and lines starting with `#` are skipped.
pub fn parse_script(raw: &str) -> anyhow::Result<Vec<StepEvent>> {
    let mut events = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event: StepEvent = serde_json::from_str(line)
            .with_context(|| format!("invalid step event on line {}", idx + 1))?;
        events.push(event);
    }
    if events.is_empty() {
        bail!("script contains no step events");
    }
    Ok(events)
}

pub fn load_script(path: &Path) -> anyhow::Result<Vec<StepEvent>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    parse_script(&raw).with_context(|| format!("failed to parse script {}", path.display()))
}

/// The sunset demo: think, call the image tool, answer with two images.
pub fn demo_script() -> Vec<StepEvent> {
    vec![
        StepEvent::thought("Analyzing request..."),
        StepEvent::tool_call("fal_image_generation"),
        StepEvent::final_answer("Here are your images!", ["/tmp/a.png", "/tmp/b.png"]),
    ]
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn parses_lines_skipping_comments_and_blanks() {
        let events = parse_script(
            "# sunset run\n\
             {\"kind\":\"thought\",\"text\":\"Analyzing request...\"}\n\
             \n\
             {\"kind\":\"tool_result\",\"media_refs\":[\"Error: rate limit exceeded\"]}\n\
             {\"kind\":\"error\"}\n",
        )
        .expect("parse");
        assert_eq!(
            events,
            vec![
                StepEvent::thought("Analyzing request..."),
                StepEvent::tool_result(["Error: rate limit exceeded"]),
                StepEvent::Error { text: None },
            ]
        );
    }

    #[test]
    fn reports_line_number_of_bad_event() {
        let err = parse_script("{\"kind\":\"thought\"}\n{\"kind\":\"dance\"}\n").expect_err("bad");
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn bundled_scripts_parse() {
        let sunset = parse_script(include_str!("../scripts/sunset.jsonl")).expect("sunset");
        assert_eq!(sunset, demo_script());
        let video =
            parse_script(include_str!("../scripts/rate_limited_video.jsonl")).expect("video");
        assert_eq!(video.len(), 7);
        assert_eq!(video[3], StepEvent::tool_result(["Error: rate limit exceeded"]));
    }

    #[test]
    fn empty_script_is_rejected() {
        assert!(parse_script("# nothing here\n\n").is_err());
    }

    #[test]
    fn loads_script_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(
            file,
            "{{\"kind\":\"final_answer\",\"text\":\"ok\",\"media_refs\":[\"/tmp/v.mp4\"]}}"
        )
        .expect("write");
        let events = load_script(file.path()).expect("load");
        assert_eq!(events, vec![StepEvent::final_answer("ok", ["/tmp/v.mp4"])]);

        let missing = load_script(Path::new("/definitely/not/here.jsonl")).expect_err("missing");
        assert!(missing.to_string().contains("failed to read script"));
    }
}
