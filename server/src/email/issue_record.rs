use google_gmail1::api::Message;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const RE_WHITESPACE_STR: &str = r"[\r\t\n]+";
const RE_LONG_SPACE_STR: &str = r" {2,}";

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(RE_WHITESPACE_STR).unwrap());
static RE_LONG_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(RE_LONG_SPACE_STR).unwrap());

pub const NO_SUBJECT: &str = "(No Subject)";
pub const UNKNOWN_SENDER: &str = "(Unknown)";

/// One maintenance request, normalized from a mailbox entry. Immutable once fetched.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub id: String,
    pub subject: String,
    pub sender: String,
    /// Display string from the Date header, never parsed
    pub date: String,
    pub snippet: String,
}

impl IssueRecord {
    /// Build from a message fetched in `metadata` format.
    pub fn from_gmail_message(msg: &Message) -> Self {
        let header = |name: &str| get_message_header(msg, name);

        IssueRecord {
            id: msg.id.clone().unwrap_or_default(),
            subject: header("Subject").unwrap_or_else(|| NO_SUBJECT.to_string()),
            sender: header("From").unwrap_or_else(|| UNKNOWN_SENDER.to_string()),
            date: header("Date").unwrap_or_default(),
            snippet: msg
                .snippet
                .as_deref()
                .map(clean_snippet)
                .unwrap_or_default(),
        }
    }
}

fn get_message_header(message: &Message, name: &str) -> Option<String> {
    message
        .payload
        .as_ref()?
        .headers
        .as_ref()?
        .iter()
        .find(|h| {
            h.name
                .as_deref()
                .map(|n| n.eq_ignore_ascii_case(name))
                .unwrap_or(false)
        })
        .and_then(|h| h.value.clone())
}

/// Gmail snippets arrive HTML-escaped; decode entities and flatten whitespace.
fn clean_snippet(snippet: &str) -> String {
    let s: String = html2text::from_read(snippet.as_bytes(), 400);
    let s = RE_WHITESPACE.replace_all(&s, " ");
    let s = RE_LONG_SPACE.replace_all(&s, " ");
    s.trim().to_string()
}
