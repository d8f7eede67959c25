//! Receiver names and file placement.

use resync_core::Config;

/// Naming conventions for receivers and generated files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    pub root_contract: String,
    pub root_receiver: String,
    pub suffix: String,
    pub base_file: String,
}

impl Default for Naming {
    fn default() -> Self {
        Naming::from_config(&Config::default())
    }
}

impl Naming {
    pub fn from_config(config: &Config) -> Self {
        Naming {
            root_contract: config.root_contract.clone(),
            root_receiver: config.root_receiver.clone(),
            suffix: config.suffix.clone(),
            base_file: config.base_file.clone(),
        }
    }

    /// `ResolverRoot` → `Resolver`; `QueryResolver` → `queryResolver`.
    pub fn receiver_name(&self, contract: &str) -> String {
        if contract == self.root_contract {
            return self.root_receiver.clone();
        }
        let stem = contract.strip_suffix(self.suffix.as_str()).unwrap_or(contract);
        format!("{}{}", lc_first(stem), self.suffix)
    }

    /// Interfaces that are reconciled: the root and `*<suffix>` names.
    pub fn is_contract(&self, interface: &str) -> bool {
        interface == self.root_contract || interface.ends_with(self.suffix.as_str())
    }

    pub fn is_root_receiver(&self, receiver: &str) -> bool {
        receiver == self.root_receiver
    }

    /// File a new method on `receiver` goes into, relative to the
    /// implementation directory.
    pub fn file_for(&self, receiver: &str, method: &str) -> String {
        if self.is_root_receiver(receiver) {
            return self.base_file.clone();
        }
        let stem = receiver.strip_suffix(self.suffix.as_str()).unwrap_or(receiver);
        format!("{}_{}.go", stem.to_lowercase(), snake(method))
    }
}

fn lc_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Insert `_` wherever a lowercase character is followed by a
/// non-lowercase one, then lower-case everything.
pub fn snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        let lower = ch.is_lowercase();
        if prev_lower && !lower {
            out.push('_');
        }
        out.extend(ch.to_lowercase());
        prev_lower = lower;
    }
    out
}
