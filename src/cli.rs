use anyhow::{Context, Result, anyhow};
use pico_args::Arguments;
use std::{env, fs::File, io::BufReader};

use crate::config::ProfileStore;
use crate::{live, replay};

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    // Flags-based help (-h/--help)
    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    // First free arg is the subcommand
    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            if let Some(t) = topic {
                print_subcmd_help(&t);
            } else {
                print_help();
            }
            Ok(())
        }

        Some("replay") => {
            let profile_name: Option<String> = pargs.opt_value_from_str("--profile")?;
            let path: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: pinchzoom replay <trace.jsonl> [--profile NAME]"))?;
            let store = ProfileStore::load_or_install_default()?;
            let profile = store.resolve(profile_name.as_deref())?;

            let file = File::open(&path).with_context(|| format!("failed to open {path}"))?;
            let entries = replay::read_trace(BufReader::new(file))
                .with_context(|| format!("bad trace {path}"))?;
            let records = replay::replay(&profile, &entries);
            replay::write_records(&mut std::io::stdout().lock(), &records)
        }

        Some("live") => {
            let profile_name: Option<String> = pargs.opt_value_from_str("--profile")?;
            let device: Option<String> = pargs.opt_value_from_str("--device")?;
            let store = ProfileStore::load_or_install_default()?;
            let profile = store.resolve(profile_name.as_deref())?;
            live::run_live(&profile, device.as_deref())
        }

        Some("use") => {
            let name: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: pinchzoom use <profile_name>"))?;
            let mut store = ProfileStore::load_or_install_default()?;
            store.set_active(&name)?;
            print_response(&serde_json::json!({"ok": true, "active_profile": store.active_name}));
            Ok(())
        }

        Some("list") => {
            let store = ProfileStore::load_or_install_default()?;
            let profiles: Vec<String> = store
                .list_profiles()
                .into_iter()
                .map(|p| {
                    if p == store.active_name {
                        format!("*{p}")
                    } else {
                        p
                    }
                })
                .collect();
            print_response(&serde_json::json!({"ok": true, "profiles": profiles}));
            Ok(())
        }

        Some("show") => {
            let name: Option<String> = pargs.free_from_str().ok();
            let store = ProfileStore::load_or_install_default()?;
            let profile = store.resolve(name.as_deref())?;
            print_response(&serde_json::to_value(&profile)?);
            Ok(())
        }

        Some("doctor") => {
            let store = ProfileStore::load_or_install_default()?;
            print_response(&store.doctor_report());
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!(
        r#"pinchzoom - pinch-zoom, drag and double-tap transform controller

USAGE:
  pinchzoom help [command]                        Show general or command-specific help
  pinchzoom replay <trace.jsonl> [--profile NAME] Replay a touch trace, print JSON lines
  pinchzoom live [--device PATH] [--profile NAME] Drive the controller from a touchscreen
  pinchzoom use <name>                            Switch active profile
  pinchzoom list                                  List profiles
  pinchzoom show [name]                           Print a profile as JSON
  pinchzoom doctor                                Diagnose permissions/devices

TIPS:
  - Profiles: ~/.config/pinchzoom/profiles
  - Active profile pointer: ~/.config/pinchzoom/active
  - RUST_LOG=debug shows every recognized gesture
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "replay" => println!(
            "usage: pinchzoom replay <trace.jsonl> [--profile NAME]\nFeeds a JSON-lines touch trace through a simulated page and prints one record per event and per fired single tap."
        ),
        "live" => println!(
            "usage: pinchzoom live [--device PATH] [--profile NAME]\nReads a multitouch device and logs transforms until Ctrl-C."
        ),
        "use" => {
            println!("usage: pinchzoom use <name>\nValidates <name> and makes it the active profile.")
        }
        "list" => {
            println!("usage: pinchzoom list\nLists available profiles; marks active with '*'.")
        }
        "show" => println!("usage: pinchzoom show [name]\nPrints the named or active profile."),
        "doctor" => println!(
            "usage: pinchzoom doctor\nChecks permissions and lists detected multitouch devices."
        ),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}

fn print_response(v: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(v).unwrap_or_default());
}
