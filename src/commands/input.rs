//! Console input parsing
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.0.0

use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Split a line into words, keeping double-quoted runs together
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    tokens
}

/// One parsed console line: a command name and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandInvocation {
    /// None for blank lines
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = tokenize(line).into_iter();
        let name = tokens.next()?.to_lowercase();
        Some(CommandInvocation {
            name,
            args: tokens.collect(),
        })
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Positional argument that must be present
    pub fn require(&self, index: usize, what: &str) -> Result<&str> {
        self.arg(index)
            .ok_or_else(|| anyhow!("Missing {} parameter", what))
    }

    /// Positional argument parsed into `T`
    pub fn parse_arg<T>(&self, index: usize, what: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.require(index, what)?;
        raw.parse()
            .map_err(|e| anyhow!("Invalid {} '{}': {}", what, raw, e))
    }

    /// Everything from `index` on, joined with spaces
    pub fn rest_from(&self, index: usize) -> String {
        self.args.get(index..).map(|a| a.join(" ")).unwrap_or_default()
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    /// Arguments with `--flags` removed
    pub fn positional(&self) -> Vec<&str> {
        self.args
            .iter()
            .map(String::as_str)
            .filter(|a| !a.starts_with("--"))
            .collect()
    }
}
