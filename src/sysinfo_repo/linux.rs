// Linux-specific helpers: /proc, /etc/os-release, sysfs operstate.

/// Read first "model name" from /proc/cpuinfo (Linux). Prefer over sysinfo when it returns "cpu0" etc.
pub(super) fn read_cpu_model_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        for line in content.lines() {
            if line.starts_with("model name") {
                let name = line
                    .find(": ")
                    .map(|i| line[i + 2..].trim())
                    .filter(|s| !s.is_empty() && *s != "cpu0")?;
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Read distro name from /etc/os-release (Linux).
pub(super) fn read_os_pretty_name() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/etc/os-release").ok()?;
        for key in ["PRETTY_NAME=", "NAME="] {
            for line in content.lines() {
                if let Some(v) = line.strip_prefix(key) {
                    let v = v.trim_matches('"');
                    if !v.is_empty() {
                        return Some(v.to_string());
                    }
                }
            }
        }
    }
    None
}

/// Read link state from /sys/class/net/<interface>/operstate (Linux).
/// Returns "unknown" when unavailable; loopback reports "unknown" on many
/// kernels, which selection treats as not-up.
pub(super) fn read_operstate(interface_name: &str) -> String {
    #[cfg(target_os = "linux")]
    {
        let path = format!("/sys/class/net/{}/operstate", interface_name);
        if let Ok(content) = std::fs::read_to_string(&path) {
            let state = content.trim();
            if !state.is_empty() {
                return state.to_string();
            }
        }
    }
    "unknown".to_string()
}
