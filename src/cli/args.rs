use std::collections::HashMap;

use crate::AppError;

/// Positional arguments plus `--flag value` options. Flags named in
/// `switches` take no value. Repeated options keep every value.
#[derive(Debug, Default)]
pub struct ParsedArgs {
    pub positional: Vec<String>,
    options: HashMap<String, Vec<String>>,
}

impl ParsedArgs {
    pub fn parse(args: &[String], switches: &[&str]) -> Result<Self, AppError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let Some(name) = arg.strip_prefix("--") else {
                parsed.positional.push(arg.clone());
                continue;
            };
            let value = if switches.contains(&name) {
                String::new()
            } else {
                iter.next()
                    .cloned()
                    .ok_or_else(|| AppError::usage(format!("--{name} expects a value")))?
            };
            parsed.options.entry(name.to_string()).or_default().push(value);
        }
        Ok(parsed)
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    pub fn flag(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Last value given for `name`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.options
            .get(name)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    pub fn values(&self, name: &str) -> &[String] {
        self.options.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn require(&self, index: usize, what: &str) -> Result<&str, AppError> {
        self.positional
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| AppError::usage(format!("missing {what}")))
    }
}
