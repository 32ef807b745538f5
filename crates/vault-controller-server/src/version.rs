// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

/// Format version info for display.
pub fn format_version_info() -> String {
	format!(
		"vault-controller version: {}\n\
         User-Agent:               {}\n\
         Platform:                 {}-{}",
		env!("CARGO_PKG_VERSION"),
		vault_controller_vault::user_agent(),
		std::env::consts::OS,
		std::env::consts::ARCH,
	)
}
