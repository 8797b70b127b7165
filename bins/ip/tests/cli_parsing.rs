//! CLI argument parsing tests for the ip command.
//!
//! Every invocation here fails or finishes before a netlink socket is
//! opened, so no network access or privileges are needed.

use assert_cmd::Command;
use predicates::prelude::*;

fn ip_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ip"))
}

mod global_flags {
    use super::*;

    #[test]
    fn test_help() {
        ip_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Network configuration tool"));
    }

    #[test]
    fn test_version() {
        ip_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("ip"));
    }

    #[test]
    fn test_invalid_subcommand() {
        ip_cmd()
            .arg("invalid_command")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }
}

mod link_command {
    use super::*;

    #[test]
    fn test_link_help() {
        ip_cmd()
            .args(["link", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Manage network interfaces"));
    }

    #[test]
    fn test_link_alias_l() {
        ip_cmd()
            .args(["l", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Manage network interfaces"));
    }

    #[test]
    fn test_link_usage() {
        ip_cmd()
            .args(["link", "help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ip link set [dev] DEVICE"));
    }

    #[test]
    fn test_kind_usage() {
        ip_cmd()
            .args(["link", "help", "bridge_slave"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[ hairpin {on | off} ]"));
    }

    #[test]
    fn test_unknown_kind_usage() {
        ip_cmd()
            .args(["link", "help", "nosuch"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("no help for \"nosuch\""));
    }

    #[test]
    fn test_set_requires_arguments() {
        ip_cmd().args(["link", "set"]).assert().failure();
    }

    #[test]
    fn test_set_requires_dev() {
        ip_cmd()
            .args(["link", "set", "up"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("\"dev\" argument is required"));
    }

    #[test]
    fn test_invalid_on_off_value() {
        ip_cmd()
            .args(["link", "set", "eth0", "type", "bridge_slave", "hairpin", "maybe"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("should be \"on\" or \"off\""));
    }

    #[test]
    fn test_unknown_kind_option_prints_usage() {
        ip_cmd()
            .args(["link", "set", "eth0", "type", "bridge_slave", "bogus"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("bridge_slave: unknown option \"bogus\"?"))
            .stderr(predicate::str::contains("[ fdb_flush ]"));
    }

    #[test]
    fn test_kind_option_help() {
        ip_cmd()
            .args(["link", "set", "eth0", "type", "bridge_slave", "help"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("Usage: ... bridge_slave"));
    }

    #[test]
    fn test_abbreviated_keywords_resolve() {
        ip_cmd()
            .args(["link", "set", "eth0", "t", "bridge_slave", "hair", "maybe"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("for \"hairpin\""));
    }

    #[test]
    fn test_abbreviated_keyword_missing_value() {
        ip_cmd()
            .args(["link", "set", "eth0", "type", "bridge_slave", "prio"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("option \"priority\" requires an argument"));
    }

    #[test]
    fn test_xdp_off_must_be_last() {
        ip_cmd()
            .args(["link", "set", "eth0", "xdp", "off", "mtu", "1500"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("must be the last argument"));
    }

    #[test]
    fn test_xdp_object_not_supported() {
        ip_cmd()
            .args(["link", "set", "eth0", "xdp", "object", "prog.o"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("not supported"));
    }

    #[test]
    fn test_xdp_requires_mode_argument() {
        ip_cmd()
            .args(["link", "set", "eth0", "xdpgeneric", "fd"])
            .assert()
            .code(255);
    }

    #[test]
    fn test_xstats_requires_type() {
        ip_cmd()
            .args(["link", "xstats"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("type KIND"));
    }

    #[test]
    fn test_xstats_unsupported_kind() {
        ip_cmd()
            .args(["link", "xstats", "type", "fou"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("extended statistics"));
    }

    #[test]
    fn test_xstats_help() {
        ip_cmd()
            .args(["link", "xstats", "type", "bridge_slave", "help"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("[ stp | mcast | igmp ]"));
    }
}

mod fou_command {
    use super::*;

    #[test]
    fn test_fou_help() {
        ip_cmd()
            .args(["fou", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("foo-over-UDP"));
    }

    #[test]
    fn test_fou_usage() {
        ip_cmd()
            .args(["fou", "help"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("ip fou add port PORT"));
    }

    #[test]
    fn test_add_requires_port() {
        ip_cmd()
            .args(["fou", "add", "gue"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("fou: missing port"));
    }

    #[test]
    fn test_add_requires_encapsulation() {
        ip_cmd()
            .args(["fou", "add", "port", "4739"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("fou: must set ipproto or gue"));
    }

    #[test]
    fn test_add_rejects_both_encapsulations() {
        ip_cmd()
            .args(["fou", "add", "port", "4739", "gue", "ipproto", "4"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("fou: cannot set ipproto and gue"));
    }

    #[test]
    fn test_add_rejects_port_zero() {
        ip_cmd()
            .args(["fou", "add", "port", "0", "gue"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("invalid port"));
    }

    #[test]
    fn test_abbreviated_keywords() {
        ip_cmd()
            .args(["fou", "add", "p", "0", "g"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("invalid port"));

        ip_cmd()
            .args(["fou", "add", "po", "4739", "ipp"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("option \"ipproto\" requires an argument"));

        ip_cmd()
            .args(["fou", "add", "port", "4739", "g", "ipp", "4"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("fou: cannot set ipproto and gue"));
    }

    #[test]
    fn test_del_alias_checks_port() {
        ip_cmd()
            .args(["fou", "del", "port", "65536"])
            .assert()
            .code(255);
    }

    #[test]
    fn test_show_rejects_arguments() {
        ip_cmd()
            .args(["fou", "show", "port", "1"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("unknown option"));
    }
}
