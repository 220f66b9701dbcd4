use linux_distro::{Config, LinuxDistribution};

fn main() -> anyhow::Result<()> {
    let distro = LinuxDistribution::new(Config::from_env());

    let mut keys: Vec<_> = distro.os_release_info().keys().collect();
    keys.sort();
    for key in keys {
        println!("{}={}", key.to_uppercase(), distro.os_release_attr(key));
    }
    println!();

    let id = distro.id();
    println!("ID={}", if id.is_empty() { "<missing>" } else { id.as_str() });
    let codename = distro.codename();
    println!(
        "CODENAME={}",
        if codename.is_empty() { "<missing>" } else { codename.as_str() }
    );

    Ok(())
}
