use std::cell::RefCell;
use std::fs;
use std::path::Path;

use linux_distro::{CommandRunner, Config, LinuxDistribution, SourceError};
use tempfile::TempDir;

/// Canned `lsb_release`/`uname` output that records every invocation.
#[derive(Default)]
struct FakeRunner {
    lsb_release: Option<Vec<&'static str>>,
    uname: Option<Vec<&'static str>>,
    invoked: RefCell<Vec<String>>,
}

impl FakeRunner {
    fn with_lsb(mut self, lines: &[&'static str]) -> Self {
        self.lsb_release = Some(lines.to_vec());
        self
    }

    fn with_uname(mut self, line: &'static str) -> Self {
        self.uname = Some(vec![line]);
        self
    }

    fn count(&self, program: &str) -> usize {
        self.invoked.borrow().iter().filter(|p| *p == program).count()
    }
}

impl CommandRunner for FakeRunner {
    fn stdout_lines(&self, program: &str, _args: &[&str]) -> Result<Vec<String>, SourceError> {
        self.invoked.borrow_mut().push(program.to_string());
        let output = match program {
            "lsb_release" => &self.lsb_release,
            "uname" => &self.uname,
            _ => &None,
        };
        output
            .as_ref()
            .map(|lines| lines.iter().map(|l| l.to_string()).collect())
            .ok_or_else(|| SourceError::NotFound(program.to_string()))
    }
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn distro(dir: &TempDir, runner: FakeRunner) -> LinuxDistribution<FakeRunner> {
    LinuxDistribution::with_runner(Config::default().with_unix_conf_dir(dir.path()), runner)
}

const UBUNTU_LSB: &[&str] = &[
    "Distributor ID:\tUbuntu",
    "Description:\tUbuntu 16.04.1 LTS",
    "Release:\t16.04",
    "Codename:\txenial",
];

#[test]
fn nothing_available_yields_empty_strings() {
    let dir = TempDir::new().unwrap();
    let d = distro(&dir, FakeRunner::default());

    assert_eq!(d.id(), "");
    assert_eq!(d.name(false), "");
    assert_eq!(d.name(true), "");
    assert_eq!(d.version(true, true), "");
    assert_eq!(d.codename(), "");
    assert_eq!(d.like(), "");
    assert!(d.distro_release_file().is_none());
}

#[test]
fn id_precedence_falls_through_sources_in_order() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "os-release", "ID=ubuntu\n");
    write(
        dir.path(),
        "centos-release",
        "CentOS release 7.2.1511 (Core)\n",
    );
    let full = || {
        FakeRunner::default()
            .with_lsb(&["Distributor ID:\tDebian"])
            .with_uname("FreeBSD 11.1-RELEASE")
    };

    assert_eq!(distro(&dir, full()).id(), "ubuntu");

    fs::remove_file(dir.path().join("os-release")).unwrap();
    assert_eq!(distro(&dir, full()).id(), "debian");

    let no_lsb = FakeRunner::default().with_uname("FreeBSD 11.1-RELEASE");
    assert_eq!(distro(&dir, no_lsb).id(), "centos");

    fs::remove_file(dir.path().join("centos-release")).unwrap();
    let uname_only = FakeRunner::default().with_uname("FreeBSD 11.1-RELEASE");
    assert_eq!(distro(&dir, uname_only).id(), "freebsd");
}

#[test]
fn ids_are_normalized_per_source() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "os-release", "ID=ol\n");
    assert_eq!(distro(&dir, FakeRunner::default()).id(), "oracle");

    fs::remove_file(dir.path().join("os-release")).unwrap();
    let lsb = FakeRunner::default().with_lsb(&["Distributor ID:\tRedHatEnterpriseServer"]);
    assert_eq!(distro(&dir, lsb).id(), "rhel");

    write(
        dir.path(),
        "redhat-release",
        "Red Hat Enterprise Linux Server release 7.5 (Maipo)\n",
    );
    let d = distro(&dir, FakeRunner::default());
    assert_eq!(d.distro_release_attr("id"), "redhat");
    assert_eq!(d.id(), "rhel");
}

#[test]
fn os_release_codename_from_version() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "os-release",
        "NAME=\"Ubuntu\"\nVERSION=\"18.04 (Bionic Beaver)\"\nID=ubuntu\nID_LIKE=debian\n",
    );
    let d = distro(&dir, FakeRunner::default().with_lsb(UBUNTU_LSB));

    assert_eq!(d.codename(), "Bionic Beaver");
    assert_eq!(d.os_release_attr("codename"), "Bionic Beaver");
    assert_eq!(d.like(), "debian");
}

#[test]
fn codename_falls_back_to_lsb() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "os-release",
        "ID=ubuntu\nVERSION_ID=\"16.04\"\n",
    );
    let d = distro(&dir, FakeRunner::default().with_lsb(UBUNTU_LSB));
    assert_eq!(d.codename(), "xenial");
}

#[test]
fn linux_kernel_never_becomes_the_distribution() {
    let dir = TempDir::new().unwrap();
    let d = distro(&dir, FakeRunner::default().with_uname("Linux 6.1.0-18-amd64"));

    assert!(d.uname_info().is_empty());
    assert_eq!(d.id(), "");
    assert_eq!(d.version(false, false), "");
}

#[test]
fn locator_prefers_alphabetically_first_release_file() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "redhat-release",
        "Red Hat Enterprise Linux Server release 7.5 (Maipo)\n",
    );
    write(
        dir.path(),
        "centos-release",
        "CentOS Linux release 7.5.1804 (Core)\n",
    );
    let d = distro(&dir, FakeRunner::default());

    assert_eq!(
        d.distro_release_file(),
        Some(dir.path().join("centos-release").as_path())
    );
    assert_eq!(d.id(), "centos");
    assert_eq!(d.distro_release_attr("name"), "CentOS Linux");
    assert_eq!(d.distro_release_attr("version_id"), "7.5.1804");
    assert_eq!(d.codename(), "Core");
}

#[test]
fn locator_skips_ignored_and_nameless_files() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "debian_version", "9.4\n");
    write(dir.path(), "lsb-release", "DISTRIB_ID=Ubuntu\n");
    write(dir.path(), "oem-release", "Some OEM 1.0\n");
    write(dir.path(), "system-release", "Amazon Linux release 2\n");
    write(dir.path(), "arch-release", "");
    write(
        dir.path(),
        "fedora-release",
        "Fedora release 27 (Twenty Seven)\n",
    );
    write(dir.path(), "hostname", "box 1.0\n");
    let d = distro(&dir, FakeRunner::default());

    assert_eq!(
        d.distro_release_file(),
        Some(dir.path().join("fedora-release").as_path())
    );
    assert_eq!(d.distro_release_attr("id"), "fedora");
    assert_eq!(d.distro_release_attr("codename"), "Twenty Seven");
}

#[test]
fn only_ignored_files_means_no_distro_release() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "os-release", "ID=debian\n");
    write(dir.path(), "debian_version", "9.4\n");
    let d = distro(&dir, FakeRunner::default());

    assert!(d.distro_release_info().is_empty());
    assert!(d.distro_release_file().is_none());
}

#[test]
fn unlistable_directory_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("no-such-etc");
    let d = LinuxDistribution::with_runner(
        Config::default().with_unix_conf_dir(&missing),
        FakeRunner::default(),
    );

    assert!(d.distro_release_info().is_empty());
    assert_eq!(d.id(), "");
}

#[test]
fn explicit_release_file_is_parsed_whatever_its_name() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "custom", "CentOS release 7.2.1511 (Core)\n");
    let config = Config::default()
        .with_unix_conf_dir(dir.path())
        .with_distro_release_file(dir.path().join("custom"));
    let d = LinuxDistribution::with_runner(config, FakeRunner::default());

    assert_eq!(d.distro_release_attr("name"), "CentOS");
    assert_eq!(d.distro_release_attr("id"), "");
    assert_eq!(d.distro_release_file(), Some(dir.path().join("custom").as_path()));
}

#[test]
fn explicit_release_file_id_from_name_or_cloudlinux() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "redhat-release",
        "CloudLinux Server release 7.4 (Georgy Grechko)\n",
    );
    write(
        dir.path(),
        "oracle-release",
        "Oracle Linux Server release 7.5\n",
    );

    let explicit = |name: &str| {
        let config = Config::default()
            .with_unix_conf_dir(dir.path())
            .with_distro_release_file(dir.path().join(name));
        LinuxDistribution::with_runner(config, FakeRunner::default())
    };

    assert_eq!(explicit("redhat-release").id(), "cloudlinux");
    assert_eq!(explicit("oracle-release").id(), "oracle");

    let missing = explicit("gentoo-release");
    assert_eq!(missing.id(), "gentoo");
    assert_eq!(missing.distro_release_attr("name"), "");
    assert_eq!(
        missing.distro_release_file(),
        Some(dir.path().join("gentoo-release").as_path())
    );
}

#[test]
fn empty_explicit_release_file_still_names_the_vendor() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "centos-release", "");
    let config = Config::default()
        .with_unix_conf_dir(dir.path())
        .with_distro_release_file(dir.path().join("centos-release"));
    let d = LinuxDistribution::with_runner(config, FakeRunner::default());

    assert_eq!(d.id(), "centos");
    assert_eq!(d.distro_release_info().len(), 1);
    assert_eq!(d.version(false, false), "");
}

#[test]
fn explicit_os_release_file_overrides_conf_dir() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "os-release", "ID=debian\n");
    write(dir.path(), "elsewhere", "ID=arch\n");
    let config = Config::default()
        .with_unix_conf_dir(dir.path())
        .with_os_release_file(dir.path().join("elsewhere"));
    let d = LinuxDistribution::with_runner(config, FakeRunner::default());

    assert_eq!(d.id(), "arch");
}

#[test]
fn sources_are_read_once_per_instance() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "os-release",
        "ID=ubuntu\nVERSION_ID=\"16.04\"\n",
    );
    let d = distro(
        &dir,
        FakeRunner::default()
            .with_lsb(UBUNTU_LSB)
            .with_uname("FreeBSD 11.1-RELEASE"),
    );

    let first = d.info(true, true);
    fs::remove_file(dir.path().join("os-release")).unwrap();
    for _ in 0..3 {
        assert_eq!(d.info(true, true), first);
        assert_eq!(d.name(true), "Ubuntu 16.04.1 LTS");
        let _ = d.lsb_release_info();
        let _ = d.uname_info();
    }

    assert_eq!(d.id(), "ubuntu");
    assert_eq!(d.runner().count("lsb_release"), 1);
    assert_eq!(d.runner().count("uname"), 1);
}

#[test]
fn disabled_sources_are_never_invoked() {
    let dir = TempDir::new().unwrap();
    let runner = FakeRunner::default()
        .with_lsb(UBUNTU_LSB)
        .with_uname("FreeBSD 11.1-RELEASE");
    let config = Config::default()
        .with_unix_conf_dir(dir.path())
        .include_lsb(false)
        .include_uname(false);
    let d = LinuxDistribution::with_runner(config, runner);

    assert_eq!(d.id(), "");
    assert!(d.lsb_release_info().is_empty());
    assert!(d.uname_info().is_empty());
    assert_eq!(d.runner().count("lsb_release"), 0);
    assert_eq!(d.runner().count("uname"), 0);
}

#[test]
fn failing_lsb_release_counts_as_absent() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "centos-release", "CentOS release 6.9 (Final)\n");
    let d = distro(&dir, FakeRunner::default());

    assert!(d.lsb_release_info().is_empty());
    assert_eq!(d.id(), "centos");
}

#[test]
fn version_best_and_pretty() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "os-release",
        "ID=centos\nVERSION_ID=\"7\"\nNAME=\"CentOS Linux\"\n",
    );
    write(
        dir.path(),
        "centos-release",
        "CentOS Linux release 7.2.1511 (Core)\n",
    );
    let d = distro(&dir, FakeRunner::default());

    assert_eq!(d.version(false, false), "7");
    assert_eq!(d.version(false, true), "7.2.1511");
    assert_eq!(d.version(true, true), "7.2.1511 (Core)");
    assert_eq!(d.major_version(true), "7");
    assert_eq!(d.minor_version(true), "2");
    assert_eq!(d.build_number(true), "1511");
    assert_eq!(d.minor_version(false), "");
    assert_eq!(
        d.linux_distribution(true),
        ("CentOS Linux".to_string(), "7".to_string(), "Core".to_string())
    );
    assert_eq!(d.linux_distribution(false).0, "centos");
}

#[test]
fn version_from_pretty_name_when_nothing_else() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "os-release",
        "ID=debian\nPRETTY_NAME=\"Debian GNU/Linux 9.4 (stretch)\"\n",
    );
    let d = distro(&dir, FakeRunner::default());
    assert_eq!(d.version(false, false), "9.4");
}

#[test]
fn pretty_name_built_from_distro_release() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "centos-release",
        "CentOS release 7.2.1511 (Core)\n",
    );
    let d = distro(&dir, FakeRunner::default());

    assert_eq!(d.name(false), "CentOS");
    assert_eq!(d.name(true), "CentOS 7.2.1511 (Core)");
}

#[test]
fn info_serializes_to_json() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "os-release",
        "ID=ubuntu\nID_LIKE=debian\nVERSION_ID=\"18.04\"\nVERSION_CODENAME=bionic\n",
    );
    let d = distro(&dir, FakeRunner::default());
    let json = serde_json::to_value(d.info(false, false)).unwrap();

    assert_eq!(json["id"], "ubuntu");
    assert_eq!(json["version"], "18.04");
    assert_eq!(json["version_parts"]["major"], "18");
    assert_eq!(json["version_parts"]["minor"], "04");
    assert_eq!(json["version_parts"]["build_number"], "");
    assert_eq!(json["like"], "debian");
    assert_eq!(json["codename"], "bionic");
}

#[test]
fn id_from_os_release_does_not_run_commands() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "os-release", "ID=fedora\nNAME=Fedora\n");
    let d = distro(
        &dir,
        FakeRunner::default()
            .with_lsb(UBUNTU_LSB)
            .with_uname("FreeBSD 11.1-RELEASE"),
    );

    assert_eq!(d.id(), "fedora");
    assert_eq!(d.name(false), "Fedora");
    assert!(d.runner().invoked.borrow().is_empty());
}
