//! Application orchestrator.
//! Loads/merges config, initializes logging, and dispatches the subcommand to
//! the library. Returns the process exit code.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::io::{self, Read, Write};
use tracing::{debug, info, warn};

use osrt::cli::{Args, Command};
use osrt::config::{create_template_config, load_config, CONFIG_ENV};
use osrt::output as out;
use osrt::{default_config_path, os_error_with_context, os_error_with_help, Config};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<i32> {
    // Handle --print-config before logging init
    if args.print_config {
        print_config_location();
        return Ok(0);
    }

    let loaded = load_config()?;
    let mut cfg = loaded.config;
    args.apply_overrides(&mut cfg);

    let guard = init_tracing(cfg.log_level, cfg.log_file.as_deref(), args.json)
        .context("initialize logging")?;

    for w in &loaded.warnings {
        warn!("{w}");
    }
    if let Some(src) = &loaded.source {
        debug!(path = %src.display(), "loaded config");
    }
    debug!(?args, ?cfg, "starting osrt");

    let result = match &args.command {
        Some(cmd) => dispatch(cmd, &cfg),
        None => {
            out::print_error("no command given; run `osrt --help` for the list");
            Ok(2)
        }
    };

    // Ensure logs are flushed before exit
    drop(guard);
    result
}

fn print_config_location() {
    if let Some(p) = env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        out::print_info(&format!(
            "Using {CONFIG_ENV} (explicit):\n  {}",
            p.to_string_lossy()
        ));
        return;
    }
    match default_config_path() {
        Some(p) => {
            out::print_info(&format!("Default osrt config path:\n  {}", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info("No config file exists there yet. Run `osrt init-config` to create a template.");
            }
        }
        None => out::print_error("Could not determine a default config path"),
    }
}

fn dispatch(cmd: &Command, cfg: &Config) -> Result<i32> {
    match cmd {
        Command::Cat { path } => {
            let bytes = osrt::read_whole_file(path).map_err(os_error_with_help("read file", path))?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes).context("write to stdout")?;
            stdout.flush().context("flush stdout")?;
        }
        Command::Write { path, text } => {
            let contents = match text {
                Some(t) => t.clone().into_bytes(),
                None => {
                    let mut buf = Vec::new();
                    io::stdin().read_to_end(&mut buf).context("read stdin")?;
                    buf
                }
            };
            osrt::write_whole_file(path, &contents).map_err(os_error_with_help("write file", path))?;
            info!(path = %path.display(), bytes = contents.len(), "wrote file");
        }
        Command::Ls { path } => {
            let listing = osrt::list_directory(path);
            for name in &listing.names {
                out::print_user(&name.to_string_lossy());
            }
            listing.status.map_err(os_error_with_help("list directory", path))?;
        }
        Command::Cp { src, dst, .. } => {
            let report = osrt::copy_file(src, dst, cfg.preserve_timestamps).map_err(
                os_error_with_context(format!("copy '{}' -> '{}'", src.display(), dst.display())),
            )?;
            info!(
                src = %src.display(),
                dst = %dst.display(),
                tier = %report.tier,
                bytes = report.bytes,
                "copy completed"
            );
            if cfg.preserve_timestamps && !report.timestamps_preserved {
                out::print_warn("timestamps could not be preserved");
            }
        }
        Command::Mkdir { path, .. } => {
            osrt::ensure_dir(path, cfg.dir_mode).map_err(os_error_with_help("create directory", path))?;
        }
        Command::Realpath { path } => {
            out::print_user(&osrt::realpath(path).display().to_string());
        }
        Command::Which { name } => {
            let paths = env::var_os("PATH").unwrap_or_default();
            match osrt::search_path(&paths, name) {
                Some(found) => out::print_user(&found.display().to_string()),
                None => {
                    out::print_error(&format!("{} not found on PATH", name.to_string_lossy()));
                    return Ok(1);
                }
            }
        }
        Command::AppPath => {
            let p = osrt::app_path().ok_or_else(|| anyhow!("could not determine the executable path"))?;
            out::print_user(&p.display().to_string());
        }
        Command::Env => {
            for pair in osrt::get_env() {
                out::print_user(&format!(
                    "{}={}",
                    pair.name.to_string_lossy(),
                    pair.value.to_string_lossy()
                ));
            }
        }
        Command::ShowArgs { .. } => {
            for arg in osrt::get_args() {
                out::print_user(&arg.to_string_lossy());
            }
        }
        Command::Info => print_info(),
        Command::Run { cmd, capture } => {
            if *capture {
                let output = osrt::run_capture(cmd).map_err(|e| anyhow!(e).context(format!("run '{cmd}'")))?;
                print!("{}", output.stdout);
                io::stdout().flush().context("flush stdout")?;
                return Ok(output.exit_code);
            }
            return osrt::run(cmd).map_err(|e| anyhow!(e).context(format!("run '{cmd}'")));
        }
        Command::InitConfig => {
            let path = default_config_path().ok_or_else(|| anyhow!("could not determine a config path"))?;
            create_template_config(&path)?;
            out::print_success(&format!("A template osrt config was written to: {}", path.display()));
            out::print_info(&format!("To use a different location set {CONFIG_ENV}."));
        }
    }
    Ok(0)
}

fn print_info() {
    let lines = [
        ("kernel", osrt::kernel_name().to_string()),
        ("arch", osrt::arch_name().to_string()),
        ("processors", osrt::processor_count().to_string()),
        ("path_separator", osrt::path_separator().to_string()),
        ("dir_separator", osrt::dir_separator().to_string()),
        ("path_max", osrt::path_max().to_string()),
        ("home", osrt::home_dir().display().to_string()),
        ("temp", osrt::temp_dir().display().to_string()),
    ];
    for (k, v) in lines {
        out::print_user(&format!("{k}: {v}"));
    }
}
