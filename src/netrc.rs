// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Minimal netrc reader for the local credential store
//!
//! Understands `machine`, `default`, `login`, `account`, `password` and skips
//! `macdef` bodies. A token starting with `#` comments out the rest of its
//! line; `#` inside a token (e.g. a password) is kept.

use std::collections::HashMap;
use std::path::Path;

/// Credentials of one machine entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetrcEntry {
    pub login: Option<String>,
    pub account: Option<String>,
    pub password: Option<String>,
}

impl NetrcEntry {
    fn usable_password(&self) -> Option<String> {
        self.password.clone().filter(|p| !p.is_empty())
    }
}

/// Parsed netrc file
#[derive(Debug, Clone, Default)]
pub struct Netrc {
    machines: HashMap<String, NetrcEntry>,
    default: Option<NetrcEntry>,
}

impl Netrc {
    pub fn parse(content: &str) -> Self {
        let mut netrc = Netrc::default();
        let mut current: Option<(Option<String>, NetrcEntry)> = None;

        let mut lines = content.lines();
        while let Some(line) = lines.next() {
            let mut tokens = line.split_whitespace();
            while let Some(tok) = tokens.next() {
                if tok.starts_with('#') {
                    // rest of the line is a comment
                    break;
                }
                match tok {
                    "machine" | "default" => {
                        if let Some((name, entry)) = current.take() {
                            netrc.store(name, entry);
                        }
                        let name = if tok == "machine" {
                            tokens.next().map(str::to_string)
                        } else {
                            None
                        };
                        current = Some((name, NetrcEntry::default()));
                    }
                    "login" | "account" | "password" => {
                        let value = tokens.next().map(str::to_string);
                        if let Some((_, entry)) = current.as_mut() {
                            match tok {
                                "login" => entry.login = value,
                                "account" => entry.account = value,
                                _ => entry.password = value,
                            }
                        }
                    }
                    "macdef" => {
                        // body runs until the next blank line
                        for body in lines.by_ref() {
                            if body.trim().is_empty() {
                                break;
                            }
                        }
                        break;
                    }
                    _ => {}
                }
            }
        }
        if let Some((name, entry)) = current.take() {
            netrc.store(name, entry);
        }
        netrc
    }

    fn store(&mut self, name: Option<String>, entry: NetrcEntry) {
        match name {
            Some(name) => {
                self.machines.entry(name).or_insert(entry);
            }
            None => self.default = Some(entry),
        }
    }

    /// Read and parse a netrc file; `None` when it does not exist or cannot be read
    pub fn load(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&content))
    }

    /// Entry for a machine, without falling back to `default`
    pub fn machine(&self, name: &str) -> Option<&NetrcEntry> {
        self.machines.get(name)
    }

    /// First non-empty password among the given machines, else the `default` entry's
    pub fn password_for<'a, I>(&self, machines: I) -> Option<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        machines
            .into_iter()
            .find_map(|m| self.machine(m).and_then(NetrcEntry::usable_password))
            .or_else(|| self.default.as_ref().and_then(NetrcEntry::usable_password))
    }
}
