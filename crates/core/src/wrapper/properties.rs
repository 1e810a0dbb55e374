use std::collections::BTreeMap;
use std::path::Path;

use super::GradleVersion;
use crate::error::Result;
use crate::params::DistributionType;

/// Parsed `gradle-wrapper.properties`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrapperProperties {
    entries: BTreeMap<String, String>,
}

impl WrapperProperties {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::parse(&contents))
    }

    /// Parse the `key=value` format, including `:` separators and backslash escapes
    pub fn parse(contents: &str) -> Self {
        let mut entries = BTreeMap::new();
        let mut pending = String::new();

        for line in contents.lines() {
            let line = line.trim_start();
            let is_comment = line.starts_with('#') || line.starts_with('!');
            if pending.is_empty() && (line.is_empty() || is_comment) {
                continue;
            }

            // An odd number of trailing backslashes continues the entry on the next line
            let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
            if trailing % 2 == 1 {
                pending.push_str(&line[..line.len() - 1]);
                continue;
            }
            pending.push_str(line);

            let (key, value) = split_entry(&pending);
            entries.insert(unescape(key), unescape(value));
            pending.clear();
        }

        if !pending.is_empty() {
            let (key, value) = split_entry(&pending);
            entries.insert(unescape(key), unescape(value));
        }

        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn distribution_url(&self) -> Option<&str> {
        self.get("distributionUrl")
    }

    pub fn distribution_sha256_sum(&self) -> Option<&str> {
        self.get("distributionSha256Sum")
    }

    pub fn network_timeout(&self) -> Option<u32> {
        self.get("networkTimeout").and_then(|value| value.parse().ok())
    }

    /// Gradle version and distribution type encoded in the distribution URL
    pub fn distribution(&self) -> Option<(GradleVersion, DistributionType)> {
        self.distribution_url()
            .and_then(GradleVersion::from_distribution_url)
    }
}

fn split_entry(entry: &str) -> (&str, &str) {
    let mut escaped = false;
    for (index, c) in entry.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                return (entry[..index].trim_end(), entry[index + 1..].trim_start());
            }
            c if c.is_whitespace() => {
                let rest = entry[index..].trim_start();
                let rest = rest
                    .strip_prefix('=')
                    .or_else(|| rest.strip_prefix(':'))
                    .unwrap_or(rest);
                return (&entry[..index], rest.trim_start());
            }
            _ => {}
        }
    }
    (entry, "")
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
