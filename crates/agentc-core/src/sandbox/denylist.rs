//! Fixed denylist of destructive command names.

use std::path::Path;

/// Command-name substrings refused unless the caller explicitly opts out.
///
/// Grouped by the class of damage they can do.
pub const DENYLIST: &[&str] = &[
    // file deletion, move and permission changes
    "rm", "rmdir", "unlink", "shred", "del", "mv", "chmod", "chown", "chgrp",
    // privilege escalation
    "sudo", "su", "doas",
    // process and service control
    "kill", "pkill", "killall", "systemctl", "service", "shutdown", "reboot", "halt",
    "poweroff",
    // firewall
    "iptables", "nft", "ufw", "firewall-cmd",
    // disk control
    "mkfs", "fdisk", "parted", "dd", "mount", "umount", "format",
];

/// Return the denylist entry matching `command`, if any.
///
/// Only the command's file name is inspected, so `/bin/rm` and `RM` both
/// match while a directory such as `/opt/farm/bin/tool` does not. Matching is
/// a case-insensitive substring test, so it over-matches
/// (`sum` contains `su`).
pub fn matched(command: &str) -> Option<&'static str> {
    let name = Path::new(command)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(command)
        .to_lowercase();

    DENYLIST.iter().copied().find(|entry| name.contains(entry))
}
