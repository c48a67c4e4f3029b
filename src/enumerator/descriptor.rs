// Csputil — Provider descriptors

use std::fmt;

/// A selectable provider type or provider name.
///
/// Type `0` is the "(Default)" sentinel: it carries no name, and acquiring
/// with it leaves the choice to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameAndType {
    name: String,
    provider_type: u32,
}

impl NameAndType {
    pub fn new(name: impl Into<String>, provider_type: u32) -> Self {
        Self {
            name: name.into(),
            provider_type,
        }
    }

    /// The "(Default)" entry heading every list.
    pub fn sentinel() -> Self {
        Self::default()
    }

    pub fn is_default(&self) -> bool {
        self.provider_type == 0
    }

    /// Name to pass when acquiring; `None` for the sentinel.
    pub fn name(&self) -> Option<&str> {
        if self.is_default() {
            None
        } else {
            Some(&self.name)
        }
    }

    pub fn provider_type(&self) -> u32 {
        self.provider_type
    }

    pub fn display_name(&self) -> String {
        if self.is_default() {
            "(Default)".to_string()
        } else {
            format!("{}  (type: {})", self.name, self.provider_type)
        }
    }
}

impl fmt::Display for NameAndType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}
