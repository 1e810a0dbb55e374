//! Discovery of included builds from Gradle settings scripts

use crate::build::BuildNode;
use crate::error::Result;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Settings scripts, in the order Gradle prefers them
pub const SETTINGS_FILE_NAMES: [&str; 2] = ["settings.gradle.kts", "settings.gradle"];

/// Which inclusion mechanisms are visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryScope {
    /// The root build also sees builds included from `pluginManagement { }`
    Root,
    /// Nested builds only see plain `includeBuild` entries
    Nested,
}

/// One `includeBuild` entry of a settings script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDeclaration {
    pub path: String,
    pub in_plugin_management: bool,
}

fn include_build_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r#"\bincludeBuild\s*\(?\s*(?:(?:file|File)\s*\(\s*)?(?:"([^"]+)"|'([^']+)')"#,
        )
        .expect("includeBuild regex is valid")
    })
}

/// Any `includeBuild` call, resolvable or not
fn include_build_call_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\bincludeBuild\b").expect("includeBuild regex is valid"))
}

fn plugin_management_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"\bpluginManagement\s*\{").expect("pluginManagement regex is valid")
    })
}

/// Settings script of a build directory, if it has one
pub fn find_settings_file(build_dir: &Path) -> Option<PathBuf> {
    SETTINGS_FILE_NAMES
        .iter()
        .map(|name| build_dir.join(name))
        .find(|path| path.is_file())
}

/// Extract `includeBuild` entries from settings script source
pub fn parse_settings(source: &str) -> Vec<IncludeDeclaration> {
    let source = strip_comments(source);
    let plugin_management = plugin_management_span(&source);

    let declarations: Vec<(usize, IncludeDeclaration)> = include_build_regex()
        .captures_iter(&source)
        .filter_map(|captures| {
            let start = captures.get(0)?.start();
            let path = captures.get(1).or_else(|| captures.get(2))?.as_str();
            let declaration = IncludeDeclaration {
                path: path.to_string(),
                in_plugin_management: plugin_management
                    .as_ref()
                    .is_some_and(|span| span.contains(&start)),
            };
            Some((start, declaration))
        })
        .collect();

    for call in include_build_call_regex().find_iter(&source) {
        if !declarations.iter().any(|(start, _)| *start == call.start()) {
            let line = source[call.start()..].lines().next().unwrap_or_default();
            warn!("Skipping includeBuild without a literal path: {}", line.trim());
        }
    }

    declarations
        .into_iter()
        .map(|(_, declaration)| declaration)
        .collect()
}

/// Direct includes of a build, as declared in its settings script
pub fn discover_included_builds(build_dir: &Path, scope: DiscoveryScope) -> Result<Vec<BuildNode>> {
    let Some(settings) = find_settings_file(build_dir) else {
        debug!("No settings script in {}", build_dir.display());
        return Ok(Vec::new());
    };

    let source = std::fs::read_to_string(&settings)?;
    let mut seen = HashSet::new();
    let mut builds = Vec::new();

    for declaration in parse_settings(&source) {
        if declaration.in_plugin_management && scope == DiscoveryScope::Nested {
            debug!(
                "Skipping {} from pluginManagement in nested build {}",
                declaration.path,
                build_dir.display()
            );
            continue;
        }

        let dir = normalize(&build_dir.join(&declaration.path));
        if seen.insert(dir.clone()) {
            debug!("Discovered included build {}", dir.display());
            builds.push(BuildNode::new(dir));
        }
    }

    Ok(builds)
}

/// Follow direct includes down the whole tree. Used for reporting only, updates
/// reach nested builds through the init script instead.
pub fn walk_tree(root_dir: &Path) -> Result<BuildNode> {
    let root_dir = normalize(root_dir);
    let mut visited = HashSet::new();
    walk(&root_dir, DiscoveryScope::Root, &mut visited)
}

fn walk(dir: &Path, scope: DiscoveryScope, visited: &mut HashSet<PathBuf>) -> Result<BuildNode> {
    visited.insert(dir.to_path_buf());
    let mut children = Vec::new();
    for child in discover_included_builds(dir, scope)? {
        if visited.contains(&child.root_dir) {
            continue;
        }
        children.push(walk(&child.root_dir, DiscoveryScope::Nested, visited)?);
    }
    Ok(BuildNode::new(dir).with_included_builds(children))
}

/// Resolve `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn plugin_management_span(source: &str) -> Option<std::ops::Range<usize>> {
    let found = plugin_management_regex().find(source)?;
    let mut depth = 0usize;
    for (offset, c) in source[found.end() - 1..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(found.start()..found.end() + offset);
                }
            }
            _ => {}
        }
    }
    Some(found.start()..source.len())
}

/// Drop `//` and `/* */` comments, leaving string literals intact
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q || c == '\n' {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                    }
                    if previous == '*' && skipped == '/' {
                        break;
                    }
                    previous = skipped;
                }
            }
            _ => out.push(c),
        }
    }
    out
}
