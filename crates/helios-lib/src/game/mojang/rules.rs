//! Library applicability rules.

use super::types::{Library, Rule, RuleAction};
use crate::utils::platform::{Arch, OsType};
use std::collections::HashMap;

/// Decide whether a library applies to the given platform.
///
/// With rules present the library starts out included only if no rule is an
/// `allow` rule; then every matching rule sets the outcome in order, so the
/// last match wins. Without rules a library applies unless it declares
/// natives and none exist for this OS.
pub fn is_library_compatible(
    rules: Option<&[Rule]>,
    natives: Option<&HashMap<String, String>>,
    os: OsType,
    arch: Arch,
) -> bool {
    if let Some(natives) = natives {
        if !natives.contains_key(os.as_str()) {
            return false;
        }
    }

    let Some(rules) = rules else {
        return true;
    };

    let mut include = !rules.iter().any(|r| r.action == RuleAction::Allow);
    for rule in rules {
        if rule_matches(rule, os, arch) {
            include = rule.action == RuleAction::Allow;
        }
    }
    include
}

pub fn library_applies(library: &Library, os: OsType, arch: Arch) -> bool {
    is_library_compatible(library.rules.as_deref(), library.natives.as_ref(), os, arch)
}

/// Classifier for the native artifact of this OS, with `${arch}` expanded
pub fn native_classifier(library: &Library, os: OsType, arch: Arch) -> Option<String> {
    library
        .natives
        .as_ref()?
        .get(os.as_str())
        .map(|c| c.replace("${arch}", arch.as_str()))
}

fn rule_matches(rule: &Rule, os: OsType, arch: Arch) -> bool {
    if let Some(ref os_rule) = rule.os {
        if let Some(ref os_name) = os_rule.name {
            if os_name != os.as_str() {
                return false;
            }
        }

        if let Some(ref rule_arch) = os_rule.arch {
            let matches = match rule_arch.as_str() {
                "x64" | "amd64" | "x86_64" => arch == Arch::X64,
                "arm64" | "aarch64" => arch == Arch::Arm64,
                "arm" | "arm32" => arch == Arch::Arm32,
                _ => false,
            };
            if !matches {
                return false;
            }
        }
    }

    // Launcher features are never enabled here
    if let Some(ref features) = rule.features {
        if features.values().any(|required| *required) {
            return false;
        }
    }

    true
}
