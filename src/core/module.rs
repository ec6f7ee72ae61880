//! Module tags and the module mask
//!
//! A message carries a [`Module`] tag, normally a single flag. The active
//! configuration carries a mask of the same type; a message passes only when
//! the two intersect.

use std::fmt;

bitflags::bitflags! {
    /// Subsystem flags. Unnamed bits are valid and pass through parsing and
    /// filtering untouched, so applications can define their own modules
    /// with [`Module::from_bits_retain`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Module: u32 {
        const GENERIC = 0x01;
        const PAGE_TRACKER = 0x02;
    }
}

impl Default for Module {
    fn default() -> Self {
        Module::GENERIC
    }
}

impl Module {
    /// Canonical textual names, in bit order.
    const NAMES: [(&'static str, Module); 2] = [
        ("Generic", Module::GENERIC),
        ("PageTracker", Module::PAGE_TRACKER),
    ];

    fn from_token(token: &str) -> Option<Module> {
        let normalized: String = token
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "generic" => Some(Module::GENERIC),
            "pagetracker" => Some(Module::PAGE_TRACKER),
            "all" | "*" => Some(Module::all()),
            _ => {
                let hex = normalized.strip_prefix("0x")?;
                u32::from_str_radix(hex, 16).ok().map(Module::from_bits_retain)
            }
        }
    }
}

impl fmt::Display for Module {
    /// Comma separated names, unnamed bits as a trailing hex token.
    /// The output parses back with [`module_mask_from_string`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut separator = |f: &mut fmt::Formatter<'_>| {
            let result = if first { Ok(()) } else { f.write_str(",") };
            first = false;
            result
        };

        for (name, flag) in Module::NAMES {
            if self.contains(flag) {
                separator(f)?;
                f.write_str(name)?;
            }
        }

        let unnamed = self.bits() & !Module::all().bits();
        if unnamed != 0 {
            separator(f)?;
            write!(f, "{:#x}", unnamed)?;
        }
        Ok(())
    }
}

/// Parse a delimiter separated list of module names into a mask.
///
/// Tokens may be separated by `,` `|` `;` or whitespace and are matched
/// case-insensitively (`PageTracker`, `page_tracker`). `All` selects every
/// named module and `0x..` tokens contribute raw bits. Unrecognized tokens
/// are skipped; the rest of the list is still parsed.
///
/// ```
/// use gpa_logger::{module_mask_from_string, Module};
///
/// assert_eq!(
///     module_mask_from_string("Generic,PageTracker"),
///     Module::GENERIC | Module::PAGE_TRACKER
/// );
/// ```
pub fn module_mask_from_string(text: &str) -> Module {
    text.split(|c: char| matches!(c, ',' | '|' | ';') || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .filter_map(Module::from_token)
        .fold(Module::empty(), |mask, module| mask | module)
}
