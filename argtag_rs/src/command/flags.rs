//! Per-command flag sets, parsed with the clap builder API.
//!
//! Flags are declared as `--name`, with a `-n` short form for single-letter
//! names. The single-dash long spelling (`-limit 8`, `-help`) is accepted
//! too and rewritten before clap sees it. Parsing stops at the first operand
//! or at `--`; everything after that is handed back untouched.

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ColorChoice};

use crate::coerce::Parser;
use crate::error::RegistrationError;
use crate::value::Value;

/// Clap id of the operand list. Reserved as a flag name.
pub(crate) const OPERANDS: &str = "__operands";

const RESERVED: &[&str] = &["h", "help", OPERANDS];

/// A named optional parameter of one command.
#[derive(Debug, Clone)]
pub struct Flag {
    pub(crate) name: String,
    pub(crate) field: &'static str,
    pub(crate) usage: String,
    pub(crate) default: Value,
    pub(crate) toggle: bool,
    pub(crate) choices: Option<Vec<String>>,
    pub(crate) parser: Parser,
}

impl Flag {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared usage, including any "(default ...)" suffix.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Field value at registration time.
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Whether this is a boolean flag that takes no separate value.
    pub fn is_toggle(&self) -> bool {
        self.toggle
    }

    pub fn choices(&self) -> Option<&[String]> {
        self.choices.as_deref()
    }

    fn is_short(&self) -> bool {
        self.name.chars().count() == 1
    }

    /// Split the usage into a value placeholder and the text to print. A
    /// back-quoted word names the placeholder; otherwise value flags get
    /// `value` and toggles get none.
    pub(crate) fn unquote_usage(&self) -> (String, String) {
        if let Some(start) = self.usage.find('`') {
            if let Some(len) = self.usage[start + 1..].find('`') {
                let name = &self.usage[start + 1..start + 1 + len];
                let text = format!(
                    "{}{}{}",
                    &self.usage[..start],
                    name,
                    &self.usage[start + len + 2..]
                );
                return (name.to_string(), text);
            }
        }
        let placeholder = if self.toggle { "" } else { "value" };
        (placeholder.to_string(), self.usage.clone())
    }

    fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone()).long(self.name.clone());
        if self.is_short() {
            if let Some(c) = self.name.chars().next() {
                arg = arg.short(c);
            }
        }
        if self.toggle {
            arg.num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .action(ArgAction::Set)
        } else {
            arg.num_args(1)
                .allow_hyphen_values(true)
                .action(ArgAction::Set)
        }
    }
}

/// Why a flag set failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FlagError {
    Help,
    Invalid(String),
}

/// Coerced flag values, keyed by record field, plus the unconsumed operands.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParsedFlags {
    pub(crate) values: Vec<(&'static str, Value)>,
    pub(crate) operands: Vec<String>,
}

/// All flags of one command.
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    flags: Vec<Flag>,
}

impl FlagSet {
    pub(crate) fn add(&mut self, flag: Flag) -> Result<(), RegistrationError> {
        if flag.name.is_empty() {
            return Err(RegistrationError::EmptyFlagName);
        }
        if RESERVED.contains(&flag.name.as_str()) {
            return Err(RegistrationError::ReservedFlag(flag.name));
        }
        if self.lookup(&flag.name).is_some() {
            return Err(RegistrationError::DuplicateFlag(flag.name));
        }
        self.flags.push(flag);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Flag names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.flags.iter().map(|f| f.name.as_str()).collect()
    }

    fn clap_command(&self, command: &str) -> clap::Command {
        let operands = Arg::new(OPERANDS)
            .num_args(0..)
            .trailing_var_arg(true)
            .allow_negative_numbers(true)
            .action(ArgAction::Append);
        self.flags.iter().fold(
            clap::Command::new(command.to_string())
                .no_binary_name(true)
                .disable_version_flag(true)
                .args_override_self(true)
                .color(ColorChoice::Never)
                .arg(operands),
            |cmd, flag| cmd.arg(flag.to_arg()),
        )
    }

    /// Rewrite single-dash long flags to the `--` form clap expects.
    fn normalize(&self, args: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(args.len());
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--" || arg == "-" || !arg.starts_with('-') {
                out.push(arg.clone());
                break;
            }
            let double = arg.starts_with("--");
            let body = if double { &arg[2..] } else { &arg[1..] };
            let (name, inline_value) = match body.split_once('=') {
                Some((name, _)) => (name, true),
                None => (body, false),
            };
            let flag = self.lookup(name);
            if !double && flag.is_none() && body.parse::<f64>().is_ok() {
                // A negative number is the first operand.
                out.push(arg.clone());
                break;
            }
            if !double && name.chars().count() > 1 {
                out.push(format!("-{arg}"));
            } else {
                out.push(arg.clone());
            }
            if let Some(flag) = flag {
                if !flag.toggle && !inline_value {
                    if let Some(value) = iter.next() {
                        out.push(value.clone());
                    }
                }
            }
        }
        out.extend(iter.cloned());
        out
    }

    /// Parse leading flags off `args` and coerce their values.
    pub(crate) fn parse(&self, command: &str, args: &[String]) -> Result<ParsedFlags, FlagError> {
        let matches = self
            .clap_command(command)
            .try_get_matches_from(self.normalize(args))
            .map_err(|err| match err.kind() {
                ErrorKind::DisplayHelp => FlagError::Help,
                _ => FlagError::Invalid(clap_message(&err)),
            })?;

        let mut values = Vec::new();
        for flag in &self.flags {
            let Some(raw) = matches.get_one::<String>(&flag.name) else {
                continue;
            };
            let value = flag.parser.parse(raw).map_err(|err| {
                FlagError::Invalid(format!(
                    "invalid value {raw:?} for flag -{}: {err}",
                    flag.name
                ))
            })?;
            tracing::trace!(flag = %flag.name, %value, "flag value");
            values.push((flag.field, value));
        }

        let operands = matches
            .get_many::<String>(OPERANDS)
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default();
        Ok(ParsedFlags { values, operands })
    }

    /// Classic flag listing: sorted by name, each flag on its own line with
    /// its usage indented below it.
    pub fn render_defaults(&self) -> String {
        let mut flags: Vec<&Flag> = self.flags.iter().collect();
        flags.sort_by(|a, b| a.name.cmp(&b.name));

        let mut out = String::new();
        for flag in flags {
            let mut line = format!("  -{}", flag.name);
            let (placeholder, usage) = flag.unquote_usage();
            if !placeholder.is_empty() {
                line.push(' ');
                line.push_str(&placeholder);
            }
            if line.len() <= 4 {
                line.push('\t');
            } else {
                line.push_str("\n    \t");
            }
            line.push_str(&usage.replace('\n', "\n    \t"));
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

fn clap_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}
