// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Renders policy rules into Vault's HCL policy language.
//!
//! Vault stores the policy text verbatim, so the output must be a pure
//! function of the rule list: same rules in, byte-identical text out. Rule
//! order and capability order are kept exactly as given.

use std::fmt::Write;

use crate::types::{Policy, PolicyRule};

/// Render `rules` as an HCL policy document.
///
/// Each rule becomes
///
/// ```text
/// path "secret/data/app/*" {
/// 	capabilities = ["read", "list"]
/// }
/// ```
///
/// An empty rule list renders as an empty document, which Vault accepts as a
/// policy granting nothing.
pub fn render_policy(rules: &[PolicyRule]) -> String {
	let mut out = String::new();
	for rule in rules {
		out.push_str("path ");
		push_quoted(&mut out, &rule.path);
		out.push_str(" {\n\tcapabilities = [");
		for (i, capability) in rule.capabilities.iter().enumerate() {
			if i > 0 {
				out.push_str(", ");
			}
			push_quoted(&mut out, capability);
		}
		out.push_str("]\n}\n");
	}
	out
}

impl Policy {
	/// The HCL document Vault should hold for this policy.
	pub fn to_hcl(&self) -> String {
		render_policy(&self.rules)
	}
}

/// Append `value` as an HCL string literal.
fn push_quoted(out: &mut String, value: &str) {
	out.push('"');
	for c in value.chars() {
		match c {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'\t' => out.push_str("\\t"),
			c if c.is_control() => {
				// Writing to a String cannot fail.
				let _ = write!(out, "\\u{:04x}", c as u32);
			}
			c => out.push(c),
		}
	}
	out.push('"');
}
