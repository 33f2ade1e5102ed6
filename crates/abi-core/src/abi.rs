//! ABI documents — an ordered collection of fragments
//!
//! An `Abi` is what a compiler emits for one contract: a JSON array of
//! fragment objects, or the equivalent list of human-readable signatures.
//! Lookups accept either a bare name or a full sighash, so overloaded
//! functions can be disambiguated with `"transfer(address,uint256)"`.

use std::str::FromStr;

use crate::formatter::FormatType;
use crate::fragment::{
    ConstructorFragment, ErrorFragment, EventFragment, FallbackFragment, Fragment,
    FunctionFragment, JsonFragment, StructFragment,
};
use crate::{Error, Result};

/// An ordered list of fragments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Abi {
    fragments: Vec<Fragment>,
}

impl Abi {
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Abi { fragments }
    }

    /// Parse a JSON ABI document (an array of fragment objects)
    ///
    /// # Errors
    /// Returns `JsonError` for malformed text and the first fragment error
    /// otherwise.
    pub fn from_json(text: &str) -> Result<Self> {
        let objects: Vec<JsonFragment> = serde_json::from_str(text)?;
        let fragments = objects
            .iter()
            .map(Fragment::from_json)
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(fragments = fragments.len(), "parsed json abi");
        Ok(Abi::new(fragments))
    }

    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let objects: Vec<JsonFragment> = serde_json::from_value(value.clone())?;
        let fragments = objects
            .iter()
            .map(Fragment::from_json)
            .collect::<Result<Vec<_>>>()?;
        Ok(Abi::new(fragments))
    }

    /// Parse one human-readable signature per item; blank items are skipped
    pub fn from_human_readable<I, S>(signatures: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fragments = signatures
            .into_iter()
            .filter(|line| !line.as_ref().trim().is_empty())
            .map(|line| Fragment::parse(line.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(fragments = fragments.len(), "parsed human-readable abi");
        Ok(Abi::new(fragments))
    }

    /// JSON when the text starts with `[`, else one signature per line
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim_start().starts_with('[') {
            Abi::from_json(text)
        } else {
            Abi::from_human_readable(text.lines())
        }
    }

    // ── Lookups ────────────────────────────────────────

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn constructor(&self) -> Option<&ConstructorFragment> {
        self.fragments.iter().find_map(|f| match f {
            Fragment::Constructor(c) => Some(c),
            _ => None,
        })
    }

    pub fn fallback(&self) -> Option<&FallbackFragment> {
        self.fragments.iter().find_map(|f| match f {
            Fragment::Fallback(fb) if !fb.is_receive() => Some(fb),
            _ => None,
        })
    }

    pub fn receive(&self) -> Option<&FallbackFragment> {
        self.fragments.iter().find_map(|f| match f {
            Fragment::Fallback(fb) if fb.is_receive() => Some(fb),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionFragment> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Function(func) => Some(func),
            _ => None,
        })
    }

    pub fn events(&self) -> impl Iterator<Item = &EventFragment> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Event(event) => Some(event),
            _ => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = &ErrorFragment> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Error(error) => Some(error),
            _ => None,
        })
    }

    pub fn structs(&self) -> impl Iterator<Item = &StructFragment> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Struct(s) => Some(s),
            _ => None,
        })
    }

    /// Find a function by name or sighash
    ///
    /// # Errors
    /// Returns `InvalidArgument` when nothing matches, or when a bare name
    /// matches several overloads.
    pub fn function(&self, key: &str) -> Result<&FunctionFragment> {
        lookup("function", key, self.functions(), FunctionFragment::name, |f| {
            f.format(FormatType::Sighash)
        })
    }

    /// Find an event by name or sighash
    pub fn event(&self, key: &str) -> Result<&EventFragment> {
        lookup("event", key, self.events(), EventFragment::name, |e| {
            e.format(FormatType::Sighash)
        })
    }

    /// Find a custom error by name or sighash
    pub fn error(&self, key: &str) -> Result<&ErrorFragment> {
        lookup("error", key, self.errors(), ErrorFragment::name, |e| {
            e.format(FormatType::Sighash)
        })
    }

    // ── Output ─────────────────────────────────────────

    /// Render every fragment, one string each
    ///
    /// Constructors and fallback functions have no sighash and are left
    /// out of `FormatType::Sighash` output.
    pub fn format(&self, format: FormatType) -> Result<Vec<String>> {
        self.fragments
            .iter()
            .filter(|f| {
                format != FormatType::Sighash
                    || !matches!(f, Fragment::Constructor(_) | Fragment::Fallback(_))
            })
            .map(|f| f.format(format))
            .collect()
    }

    /// The JSON ABI array
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.fragments.iter().map(Fragment::to_json).collect())
    }
}

fn lookup<'a, T: 'a>(
    kind: &str,
    key: &str,
    items: impl Iterator<Item = &'a T>,
    name_of: impl Fn(&T) -> &str,
    sighash_of: impl Fn(&T) -> String,
) -> Result<&'a T> {
    let matches: Vec<&T> = if key.contains('(') {
        items.filter(|item| sighash_of(*item) == key).collect()
    } else {
        items.filter(|item| name_of(*item) == key).collect()
    };
    match matches.as_slice() {
        [single] => Ok(*single),
        [] => Err(Error::argument(format!("no matching {}", kind), "key", key)),
        _ => Err(Error::argument(
            format!("ambiguous {} description", kind),
            "key",
            key,
        )),
    }
}

impl FromStr for Abi {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Abi::parse(s)
    }
}

impl FromIterator<Fragment> for Abi {
    fn from_iter<I: IntoIterator<Item = Fragment>>(iter: I) -> Self {
        Abi::new(iter.into_iter().collect())
    }
}
