// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Platform command that opens a URL in the default browser.
fn opener() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(target_os = "windows") {
        ("cmd", &["/C", "start", ""])
    } else {
        ("xdg-open", &[])
    }
}

/// Try to open `url`. Returns false when no browser could be launched;
/// the caller has already printed the URL for manual use.
pub fn open(url: &str) -> bool {
    let (cmd, args) = opener();
    match std::process::Command::new(cmd)
        .args(args)
        .arg(url)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
    {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(cmd, err = %e, "could not launch browser");
            false
        }
    }
}
