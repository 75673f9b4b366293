use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=Cargo.toml");

    let output = Command::new("git").args(["rev-parse", "HEAD"]).output();
    let output = match output {
        Ok(output) if output.status.success() => output,
        Ok(_) => return println!("cargo::warning=`git rev-parse` exited with non-success error code"),
        Err(why) => return println!("cargo::warning=cannot find git commit hash: {why}"),
    };

    let Ok(git_hash) = String::from_utf8(output.stdout) else {
        return println!("cargo::warning=`git rev-parse` output is invalid utf-8");
    };

    println!("cargo::rustc-env=GIT_HASH={}", git_hash.trim());
}
