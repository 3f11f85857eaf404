//! Who performs a task: vendor, client, both, or unknown.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::RawTask;

pub const VENDOR_LABEL: &str = "ベンダー";
pub const CLIENT_LABEL: &str = "顧客";
pub const BOTH_LABEL: &str = "全体";

/// Party responsible for a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Role {
    Vendor,
    Client,
    Both,
    #[default]
    Unknown,
}

impl Role {
    /// Map an explicit actor label. Unrecognized labels are `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            VENDOR_LABEL => Role::Vendor,
            CLIENT_LABEL => Role::Client,
            BOTH_LABEL => Role::Both,
            _ => Role::Unknown,
        }
    }

    /// Display label used by the task table badge. Empty for `Unknown`.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Vendor => VENDOR_LABEL,
            Role::Client => CLIENT_LABEL,
            Role::Both => BOTH_LABEL,
            Role::Unknown => "",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Vendor => write!(f, "vendor"),
            Role::Client => write!(f, "client"),
            Role::Both => write!(f, "both"),
            Role::Unknown => write!(f, "unknown"),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "vendor" => Role::Vendor,
            "client" => Role::Client,
            "both" => Role::Both,
            other => Role::from_label(other),
        }
    }
}

fn vendor_raci_re() -> &'static Regex {
    static VENDOR_RACI_RE: OnceLock<Regex> = OnceLock::new();
    VENDOR_RACI_RE.get_or_init(|| Regex::new(r"V:\s*([A-Za-z,]+)").expect("valid vendor raci regex"))
}

fn client_raci_re() -> &'static Regex {
    static CLIENT_RACI_RE: OnceLock<Regex> = OnceLock::new();
    CLIENT_RACI_RE.get_or_init(|| Regex::new(r"C:\s*([A-Za-z,]+)").expect("valid client raci regex"))
}

/// True when the first capture of `re` in `raci` holds an `A` or an `R`.
fn accountable_or_responsible(re: &Regex, raci: &str) -> bool {
    re.captures(raci)
        .and_then(|caps| caps.get(1))
        .map(|letters| letters.as_str().contains(|c: char| c == 'A' || c == 'R'))
        .unwrap_or(false)
}

/// Infer a role from a RACI annotation such as `"V: A,R / C: C"`.
pub fn classify_raci(raci: &str) -> Role {
    let vendor = accountable_or_responsible(vendor_raci_re(), raci);
    let client = accountable_or_responsible(client_raci_re(), raci);

    match (vendor, client) {
        (true, true) => Role::Both,
        (true, false) => Role::Vendor,
        (false, true) => Role::Client,
        // Neither party is A/R. Generated data treats this as a shared task.
        (false, false) => Role::Both,
    }
}

/// Decide which party performs `task`.
///
/// A non-empty `actor` always wins; otherwise the RACI string is parsed;
/// with neither the role is `Unknown`. Total: every task gets a role.
pub fn classify(task: &RawTask) -> Role {
    if let Some(actor) = task.actor.as_deref().filter(|a| !a.is_empty()) {
        return Role::from_label(actor);
    }

    match task.raci.as_deref().filter(|r| !r.is_empty()) {
        Some(raci) => classify_raci(raci),
        None => Role::Unknown,
    }
}
