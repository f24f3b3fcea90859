use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("voiceprint")
        .version("0.1.0")
        .author("Voiceprint Contributors")
        .about("Build a writing-style prompt from a publication's feed")
        .arg(clap::arg!([INPUT] "Publication URL or name, or '-' to read a feed from stdin"))
        .arg(
            clap::arg!(--file <PATH> "Read a previously downloaded feed instead of fetching one")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (text, json)")
                .value_name("FORMAT")
                .default_value("text")
                .value_parser(["text", "json"]),
        )
        .arg(
            clap::arg!(--instruction <FILE> "Instruction template file")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--budget <NUM> "Maximum corpus size in characters"))
        .arg(clap::arg!(--min_chars <NUM> "Minimum cleaned length for a post to count as a sample").default_value("40"))
        .arg(
            clap::arg!(--platform_domain <DOMAIN> "Hosting platform used to guess the canonical feed host")
                .default_value("substack.com"),
        )
        .arg(clap::arg!(--timeout <SECS> "Deadline in seconds for the whole run"))
        .arg(clap::arg!(--user_agent <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(clap::arg!(--no_boilerplate_strip "Keep subscribe and share widgets in the samples"))
        .arg(clap::arg!(--generate_with <COMMAND> "Shell command that reads the prompt on stdin and prints a stylesheet"))
        .arg(clap::arg!(--no_prompt "Leave the prompt text out of JSON output"))
        .arg(clap::arg!(--compact "Print JSON on a single line"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"))
        .arg(
            clap::arg!(--completions <SHELL> "Generate shell completion script")
                .value_name("SHELL")
                .value_parser(["bash", "zsh", "fish", "powershell", "elvish"]),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "voiceprint", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "voiceprint", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "voiceprint", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "voiceprint", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
