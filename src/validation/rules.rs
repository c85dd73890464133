use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

use crate::models::Category;

static YOUTUBE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("valid regex"));

static COURSE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s\-_.,()&+#]+$").expect("valid regex"));
static EXCESSIVE_SPECIAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s]{3,}").expect("valid regex"));
static MULTIPLE_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{3,}").expect("valid regex"));

const PLACEHOLDER_WORDS: &[&str] = &[
    "test", "testing", "dummy", "sample", "lorem", "ipsum", "asdf", "qwerty",
];

pub const LESSON_NAME_MIN_LENGTH: usize = 5;
pub const LESSON_NAME_MAX_LENGTH: usize = 100;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("not_blank", "must not be blank"));
    }
    Ok(())
}

/// Content rules for course names.
pub fn course_name(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    let trimmed = value.trim();

    if !COURSE_NAME_CHARS.is_match(trimmed) {
        return Err(error("course_name", "Course name contains invalid characters"));
    }
    if EXCESSIVE_SPECIAL_CHARS.is_match(trimmed) {
        return Err(error(
            "course_name",
            "Course name contains too many consecutive special characters",
        ));
    }
    if MULTIPLE_SPACES.is_match(trimmed) {
        return Err(error("course_name", "Course name contains excessive spaces"));
    }
    if trimmed.len() != value.len() {
        return Err(error(
            "course_name",
            "Course name cannot start or end with spaces",
        ));
    }

    let lower = trimmed.to_lowercase();
    let has_placeholder = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| PLACEHOLDER_WORDS.contains(&word));
    if has_placeholder {
        return Err(error(
            "course_name",
            "Course name appears to contain test or placeholder content",
        ));
    }

    let mut words = trimmed.split_whitespace();
    if let (Some(only), None) = (words.next(), words.next()) {
        if only.chars().all(|c| c.is_ascii_digit()) {
            return Err(error(
                "course_name",
                "Course name must contain meaningful text, not just numbers",
            ));
        }
    }

    Ok(())
}

/// Lesson names are stored trimmed, so the length bounds apply to the
/// trimmed value.
pub fn lesson_name(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    let length = value.trim().chars().count();
    if !(LESSON_NAME_MIN_LENGTH..=LESSON_NAME_MAX_LENGTH).contains(&length) {
        return Err(error(
            "length",
            "Lesson name must be between 5 and 100 characters",
        ));
    }
    Ok(())
}

pub fn category(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Category>()
        .map(|_| ())
        .map_err(|_| error("category", "Category must be one of: Front-end, Back-end"))
}

pub fn youtube_video(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    if is_video_id(&extract_video_id(value)) {
        Ok(())
    } else {
        Err(error(
            "youtube_video",
            "Invalid YouTube URL format. Must be a valid YouTube video ID (11 characters)",
        ))
    }
}

pub fn is_video_id(value: &str) -> bool {
    YOUTUBE_ID.is_match(value)
}

/// Pulls the video id out of a bare id, a `youtu.be/` short link or a
/// `youtube.com/watch?v=` link. Anything else comes back trimmed, unchanged.
pub fn extract_video_id(input: &str) -> String {
    let trimmed = input.trim();

    if is_video_id(trimmed) {
        return trimmed.to_string();
    }

    if let Some(pos) = trimmed.find("youtu.be/") {
        return id_until_delimiter(&trimmed[pos + "youtu.be/".len()..], trimmed);
    }

    if trimmed.contains("youtube.com/watch") {
        if let Some(pos) = trimmed.find("v=") {
            return id_until_delimiter(&trimmed[pos + 2..], trimmed);
        }
    }

    trimmed.to_string()
}

fn id_until_delimiter(rest: &str, whole: &str) -> String {
    if rest.is_empty() {
        return whole.to_string();
    }
    let end = rest.find(['&', '?', '#']).unwrap_or(rest.len());
    rest[..end].to_string()
}
